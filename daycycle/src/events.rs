//! Defines all public event types raised by the clock and its engine.
//!
//! Clock events are delivered synchronously to registered subscribers and,
//! when the clock runs inside a [`ClockEngine`](crate::engine::ClockEngine),
//! rebroadcast on a channel for asynchronous listeners.

use crate::common::SubscriberId;
use crate::season::Season;
use crate::state::TimeRecord;
use chrono::{DateTime, Utc};

/// A boundary crossed by the simulated time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClockEvent {
    /// The hour wrapped past midnight. `day` and `season` are the values after
    /// any season rollover, so day 31 is never observed.
    DayStarted { day: u8, season: Season },
    /// The season advanced, or the clock was initialised.
    SeasonChanged { season: Season },
    /// The resolved period of day changed.
    PeriodStarted { period: String, hour: u8 },
}

/// Events related to the lifecycle and state of the engine itself.
#[derive(Debug, Clone)]
pub enum SystemEvent {
    /// Fired once when the engine's tick loop begins.
    EngineStarted { at: DateTime<Utc> },
    /// Fired once when the engine's tick loop is about to exit.
    EngineShutdown,
    /// Ticks stopped reaching the clock.
    Paused,
    /// Ticks reach the clock again.
    Resumed,
    /// A saved state was adopted.
    StateImported { record: TimeRecord },
    SubscriberAdded { id: SubscriberId },
    SubscriberRemoved { id: SubscriberId },
}
