//! Error types for the `daycycle` crate.
//!
//! Only loading state and loading configuration can fail. Advancing the clock
//! and resolving periods are total over their inputs.

use crate::common::DAYS_PER_SEASON;

/// A loaded or forced clock state that falls outside the calendar bounds.
///
/// Always recoverable: the clock keeps its previous valid state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum StateValidationError {
    #[error("minute {0} is out of range (expected 0..60)")]
    MinuteOutOfRange(i32),

    #[error("hour {0} is out of range (expected 0..24)")]
    HourOutOfRange(i32),

    #[error("day {0} is out of range (expected 1..={max})", max = DAYS_PER_SEASON)]
    DayOutOfRange(i32),

    #[error("unknown season ordinal {0}")]
    UnknownSeason(i32),
}

/// Errors raised while building or configuring a clock.
#[derive(Debug, thiserror::Error)]
pub enum ClockError {
    #[error("invalid clock state: {0}")]
    InvalidState(#[from] StateValidationError),

    /// A forced start named a period the table does not define.
    #[error("unknown period: {0}")]
    UnknownPeriod(String),

    #[error("unknown season name: {0}")]
    UnknownSeasonName(String),

    /// The period table is unusable (hours off the wheel, or an incomplete
    /// partition when strict checking is on).
    #[error("invalid period table: {reason}")]
    InvalidPeriods { reason: String },

    #[error("invalid tick rate: {0} ticks per second")]
    InvalidTickRate(f64),

    #[error("failed to load configuration: {0}")]
    Config(#[from] config::ConfigError),
}
