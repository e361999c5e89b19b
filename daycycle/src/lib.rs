//! # Daycycle
//!
//! A deterministic day, period and season clock for tick-driven games.
//!
//! Daycycle owns simulated time (minute, hour, day, season), advances it one
//! minute per tick, resolves the current "period of day" from configured hour
//! windows, and tells subscribers when a boundary is crossed.
//!
//! ## Core Concepts
//!
//! - **Clock**: The single-threaded state machine. `advance(n)` processes every
//!   hour, day and season boundary in order, so catching up after a pause
//!   fires exactly the notifications `n` single ticks would have.
//! - **Periods**: Named half-open hour windows that may wrap past midnight
//!   (`Night = [21, 6)`). The first matching window in priority order wins.
//! - **Subscribers**: Callbacks registered for day starts, season changes, the
//!   start of a named period, or everything. They receive a read-only view.
//! - **Engine**: An async handle that feeds the clock from real time at a
//!   configured rate, honours pause/resume, and rebroadcasts events.
//!
//! ## Example Usage
//!
//! ```rust
//! use daycycle::prelude::*;
//!
//! let mut clock = Clock::new(PeriodTable::default());
//! clock.on_period_start("Night", |_event, view| {
//!     println!("Night falls on day {}", view.current_day());
//! });
//! clock.initialize(&StartConfig::Defaults).unwrap();
//!
//! // Fifteen hours later it is 21:00 on day 1.
//! clock.advance(15 * 60);
//! assert_eq!(clock.current_period_name(), Some("Night"));
//!
//! // Save and restore without replaying any rollovers.
//! let saved = clock.export_state();
//! clock.import_state(saved).unwrap();
//! ```

pub const ENGINE_NAME: &str = "Daycycle";
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Declare all the modules in the crate.
pub mod clock;
pub mod common;
pub mod components;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod period;
pub mod season;
pub mod state;

/// A prelude module for easy importing of the most common Daycycle types.
pub mod prelude {
    pub use crate::clock::{Clock, ClockView};
    pub use crate::common::SubscriberId;
    pub use crate::config::{ClockConfig, StartAt, StartConfig};
    pub use crate::engine::ClockEngine;
    pub use crate::error::{ClockError, StateValidationError};
    pub use crate::events::{ClockEvent, SystemEvent};
    pub use crate::period::{PeriodTable, PeriodWindow};
    pub use crate::season::Season;
    pub use crate::state::{ClockSnapshot, ClockState, TimeRecord};
}
