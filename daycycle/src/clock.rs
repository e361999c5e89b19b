//! The clock state machine: simulated minute, hour, day and season.
//!
//! A [`Clock`] is advanced by whole ticks (one simulated minute each). It
//! resolves the current period of day from its [`PeriodTable`] and notifies
//! subscribers exactly once per boundary crossed, however many ticks a single
//! [`Clock::advance`] call covers.

use crate::common::{SubscriberId, DAYS_PER_SEASON, HOURS_PER_DAY, MINUTES_PER_HOUR};
use crate::components::subscriber::{ClockCallback, Hook, SubscriberRegistry};
use crate::config::{ClockConfig, StartAt, StartConfig};
use crate::error::{ClockError, StateValidationError};
use crate::events::ClockEvent;
use crate::period::PeriodTable;
use crate::season::Season;
use crate::state::{ClockSnapshot, ClockState, TimeRecord};
use std::fmt;
use tracing::{debug, info, trace, warn};

/// Read-only access to a clock, handed to subscribers while they are being
/// notified.
#[derive(Clone, Copy)]
pub struct ClockView<'a> {
    state: &'a ClockState,
    period: Option<&'a str>,
    periods: &'a PeriodTable,
}

impl<'a> ClockView<'a> {
    pub fn current_minute(&self) -> u8 {
        self.state.minute
    }

    pub fn current_hour(&self) -> u8 {
        self.state.hour
    }

    pub fn current_day(&self) -> u8 {
        self.state.day
    }

    pub fn current_season(&self) -> Season {
        self.state.season
    }

    /// The active period, or `None` if no window has ever matched.
    pub fn current_period_name(&self) -> Option<&'a str> {
        self.period
    }

    /// Fraction of the day elapsed, in `[0.0, 1.0)`.
    pub fn time_of_day(&self) -> f32 {
        let hours = f32::from(self.state.hour) + f32::from(self.state.minute) / f32::from(MINUTES_PER_HOUR);
        hours / f32::from(HOURS_PER_DAY)
    }

    /// Fraction of the active period elapsed.
    ///
    /// `None` if there is no active period, or if the current hour lies outside
    /// it (an hour no window covers keeps the previous period active).
    pub fn period_progress(&self) -> Option<f32> {
        let name = self.period?;
        self.periods
            .windows()
            .iter()
            .filter(|window| window.name == name)
            .find_map(|window| window.progress(self.state.hour, self.state.minute))
    }

    pub fn snapshot(&self) -> ClockSnapshot {
        ClockSnapshot {
            minute: self.state.minute,
            hour: self.state.hour,
            day: self.state.day,
            season: self.state.season,
            period: self.period.map(str::to_string),
        }
    }
}

/// The simulated clock.
///
/// Construct one per simulation session, register subscribers, then call
/// [`Clock::initialize`]. The clock is single-threaded: callbacks run inside
/// the call that crossed the boundary and cannot reach back into the clock.
pub struct Clock {
    state: ClockState,
    periods: PeriodTable,
    active_period: Option<String>,
    subscribers: SubscriberRegistry,
}

// Core implementation block for the state machine.
impl Clock {
    /// Creates a clock over the given period table.
    ///
    /// The clock holds the default start time but has no active period and has
    /// notified nobody until [`Clock::initialize`] runs.
    pub fn new(periods: PeriodTable) -> Self {
        Self {
            state: ClockState::default(),
            periods,
            active_period: None,
            subscribers: SubscriberRegistry::default(),
        }
    }

    /// Creates an uninitialised clock from a configuration's period table.
    pub fn with_config(config: &ClockConfig) -> Result<Self, ClockError> {
        Ok(Self::new(config.period_table()?))
    }

    /// Sets the starting time, resolves the period and announces the season.
    ///
    /// The season notification fires unconditionally so subscribers can set up
    /// season-dependent state. A forced start that names an unknown period or
    /// holds out-of-range values is rejected and leaves the clock untouched.
    pub fn initialize(&mut self, start: &StartConfig) -> Result<(), ClockError> {
        let state = match start {
            StartConfig::Defaults => ClockState::default(),
            StartConfig::Forced {
                season,
                day,
                at,
                minute,
            } => {
                // A named period starts on the hour; the configured minute only
                // applies to an explicit hour.
                let (hour, minute) = match at {
                    StartAt::Hour(hour) => (*hour, *minute),
                    StartAt::Period(name) => {
                        let window = self
                            .periods
                            .get(name)
                            .ok_or_else(|| ClockError::UnknownPeriod(name.clone()))?;
                        (window.start_hour, 0)
                    }
                };
                ClockState::new(minute, hour, *day, *season)?
            }
        };

        self.state = state;
        info!(%state, "clock initialized");
        self.recompute_period();
        self.emit(ClockEvent::SeasonChanged {
            season: state.season,
        });
        Ok(())
    }

    /// Advances the clock by `ticks` simulated minutes.
    ///
    /// Every hour, day and season boundary inside the span is processed in
    /// order, so `advance(n)` is indistinguishable from `n` calls to
    /// `advance(1)`, notifications included.
    pub fn advance(&mut self, ticks: u64) {
        if ticks == 0 {
            return;
        }
        trace!(ticks, "advancing clock");
        let mut remaining = ticks;
        while remaining > 0 {
            let to_next_hour = u64::from(MINUTES_PER_HOUR - self.state.minute);
            if remaining < to_next_hour {
                // remaining < 60 here, so the sum stays below 60.
                self.state.minute += remaining as u8;
                break;
            }
            remaining -= to_next_hour;
            self.state.minute = 0;
            self.roll_hour();
        }
    }

    /// Resolves the period for the current hour and fires its start
    /// notification if it differs from the active one.
    ///
    /// Returns `true` if the period changed. Calling this again without an
    /// hour change never fires twice. If no window covers the hour, the
    /// previous period stays active and nothing fires.
    pub fn recompute_period(&mut self) -> bool {
        let hour = self.state.hour;
        let Some(window) = self.periods.resolve(hour) else {
            warn!(
                hour,
                active = ?self.active_period,
                "no period window covers this hour; keeping the active period"
            );
            return false;
        };
        if self.active_period.as_deref() == Some(window.name.as_str()) {
            return false;
        }

        let period = window.name.clone();
        debug!(%period, hour, "period started");
        self.active_period = Some(period.clone());
        self.emit(ClockEvent::PeriodStarted { period, hour });
        true
    }

    /// Returns the current time in its persistence form.
    pub fn export_state(&self) -> TimeRecord {
        TimeRecord::from(self.state)
    }

    /// Adopts a saved time.
    ///
    /// The period is recomputed (and announced if it actually changes), but
    /// day and season notifications are never replayed: loading is not a
    /// boundary crossing. On error the clock keeps its previous state.
    pub fn import_state(&mut self, record: TimeRecord) -> Result<(), StateValidationError> {
        let state = ClockState::try_from(record)?;
        self.state = state;
        info!(%state, "clock state imported");
        self.recompute_period();
        Ok(())
    }

    fn roll_hour(&mut self) {
        self.state.hour += 1;
        if self.state.hour >= HOURS_PER_DAY {
            self.state.hour = 0;
            self.roll_day();
        }
        self.recompute_period();
    }

    fn roll_day(&mut self) {
        self.state.day += 1;
        let season_rolled = self.state.day > DAYS_PER_SEASON;
        if season_rolled {
            self.state.day = 1;
            self.state.season = self.state.season.next();
        }

        let ClockState { day, season, .. } = self.state;
        debug!(day, %season, "day started");
        self.emit(ClockEvent::DayStarted { day, season });
        if season_rolled {
            info!(%season, "season changed");
            self.emit(ClockEvent::SeasonChanged { season });
        }
    }

    fn emit(&mut self, event: ClockEvent) {
        let view = ClockView {
            state: &self.state,
            period: self.active_period.as_deref(),
            periods: &self.periods,
        };
        let notified = self.subscribers.dispatch(&event, &view);
        trace!(?event, notified, "clock event dispatched");
    }
}

// Queries.
impl Clock {
    pub fn view(&self) -> ClockView<'_> {
        ClockView {
            state: &self.state,
            period: self.active_period.as_deref(),
            periods: &self.periods,
        }
    }

    pub fn current_minute(&self) -> u8 {
        self.state.minute
    }

    pub fn current_hour(&self) -> u8 {
        self.state.hour
    }

    pub fn current_day(&self) -> u8 {
        self.state.day
    }

    pub fn current_season(&self) -> Season {
        self.state.season
    }

    pub fn current_period_name(&self) -> Option<&str> {
        self.active_period.as_deref()
    }

    pub fn state(&self) -> ClockState {
        self.state
    }

    pub fn periods(&self) -> &PeriodTable {
        &self.periods
    }

    pub fn time_of_day(&self) -> f32 {
        self.view().time_of_day()
    }

    pub fn period_progress(&self) -> Option<f32> {
        self.view().period_progress()
    }

    pub fn snapshot(&self) -> ClockSnapshot {
        self.view().snapshot()
    }
}

// Subscriber registration.
impl Clock {
    /// Registers a callback for each day rollover.
    pub fn on_day_start(
        &mut self,
        callback: impl FnMut(&ClockEvent, &ClockView<'_>) + Send + Sync + 'static,
    ) -> SubscriberId {
        self.subscribe(Hook::DayStart, Box::new(callback))
    }

    /// Registers a callback for each season change, including the one raised
    /// by [`Clock::initialize`].
    pub fn on_season_change(
        &mut self,
        callback: impl FnMut(&ClockEvent, &ClockView<'_>) + Send + Sync + 'static,
    ) -> SubscriberId {
        self.subscribe(Hook::SeasonChange, Box::new(callback))
    }

    /// Registers a callback for the start of one named period.
    pub fn on_period_start(
        &mut self,
        period: impl Into<String>,
        callback: impl FnMut(&ClockEvent, &ClockView<'_>) + Send + Sync + 'static,
    ) -> SubscriberId {
        self.subscribe(Hook::PeriodStart(period.into()), Box::new(callback))
    }

    /// Registers a callback for every clock event.
    pub fn on_any(
        &mut self,
        callback: impl FnMut(&ClockEvent, &ClockView<'_>) + Send + Sync + 'static,
    ) -> SubscriberId {
        self.subscribe(Hook::Any, Box::new(callback))
    }

    pub fn subscribe(&mut self, hook: Hook, callback: ClockCallback) -> SubscriberId {
        let id = self.subscribers.insert(hook, callback);
        debug!(?id, "subscriber added");
        id
    }

    /// Removes a subscriber. Returns `true` if it was registered.
    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        let removed = self.subscribers.remove(id);
        if removed {
            debug!(?id, "subscriber removed");
        }
        removed
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new(PeriodTable::default())
    }
}

impl fmt::Debug for Clock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Clock")
            .field("state", &self.state)
            .field("active_period", &self.active_period)
            .field("periods", &self.periods)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
