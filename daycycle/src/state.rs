//! The clock's owned time fields and the shapes they are exported in.

use crate::common::{DAYS_PER_SEASON, HOURS_PER_DAY, MINUTES_PER_HOUR};
use crate::error::StateValidationError;
use crate::season::Season;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The simulated time a clock owns.
///
/// Fields are only reachable through the validating constructor, so a
/// `ClockState` always satisfies `minute < 60`, `hour < 24` and
/// `1 <= day <= 30`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClockState {
    pub(crate) minute: u8,
    pub(crate) hour: u8,
    pub(crate) day: u8,
    pub(crate) season: Season,
}

impl ClockState {
    pub fn new(minute: u8, hour: u8, day: u8, season: Season) -> Result<Self, StateValidationError> {
        if minute >= MINUTES_PER_HOUR {
            return Err(StateValidationError::MinuteOutOfRange(i32::from(minute)));
        }
        if hour >= HOURS_PER_DAY {
            return Err(StateValidationError::HourOutOfRange(i32::from(hour)));
        }
        if day < 1 || day > DAYS_PER_SEASON {
            return Err(StateValidationError::DayOutOfRange(i32::from(day)));
        }
        Ok(Self {
            minute,
            hour,
            day,
            season,
        })
    }

    pub const fn minute(&self) -> u8 {
        self.minute
    }

    pub const fn hour(&self) -> u8 {
        self.hour
    }

    pub const fn day(&self) -> u8 {
        self.day
    }

    pub const fn season(&self) -> Season {
        self.season
    }
}

impl Default for ClockState {
    /// Day 1 of Summer, 06:00.
    fn default() -> Self {
        Self {
            minute: 0,
            hour: 6,
            day: 1,
            season: Season::Summer,
        }
    }
}

impl fmt::Display for ClockState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:02} {:02}:{:02}",
            self.season, self.day, self.hour, self.minute
        )
    }
}

/// The persistence-facing form of a [`ClockState`].
///
/// Fields are plain signed integers, the season being its cycle ordinal, so
/// that whatever a save file holds can be represented and then checked by
/// `TryFrom`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeRecord {
    pub minute: i32,
    pub hour: i32,
    pub day: i32,
    pub season: i32,
}

impl From<ClockState> for TimeRecord {
    fn from(state: ClockState) -> Self {
        Self {
            minute: i32::from(state.minute),
            hour: i32::from(state.hour),
            day: i32::from(state.day),
            season: i32::from(state.season.ordinal()),
        }
    }
}

impl TryFrom<TimeRecord> for ClockState {
    type Error = StateValidationError;

    fn try_from(record: TimeRecord) -> Result<Self, Self::Error> {
        let minute = u8::try_from(record.minute)
            .map_err(|_| StateValidationError::MinuteOutOfRange(record.minute))?;
        let hour = u8::try_from(record.hour)
            .map_err(|_| StateValidationError::HourOutOfRange(record.hour))?;
        let day =
            u8::try_from(record.day).map_err(|_| StateValidationError::DayOutOfRange(record.day))?;
        let season = Season::from_ordinal(record.season)
            .ok_or(StateValidationError::UnknownSeason(record.season))?;
        ClockState::new(minute, hour, day, season)
    }
}

/// An owned copy of everything a subscriber can query, for handing across
/// threads or printing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClockSnapshot {
    pub minute: u8,
    pub hour: u8,
    pub day: u8,
    pub season: Season,
    pub period: Option<String>,
}

impl fmt::Display for ClockSnapshot {
    /// Formats as the time HUD shows it, e.g. `Summer 01 06:00 (Morning)`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:02} {:02}:{:02} ({})",
            self.season,
            self.day,
            self.hour,
            self.minute,
            self.period.as_deref().unwrap_or("-")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(minute: i32, hour: i32, day: i32, season: i32) -> TimeRecord {
        TimeRecord {
            minute,
            hour,
            day,
            season,
        }
    }

    #[test]
    fn accepts_bounds() {
        let state = ClockState::try_from(record(59, 23, 30, 3)).unwrap();
        assert_eq!(state.minute(), 59);
        assert_eq!(state.hour(), 23);
        assert_eq!(state.day(), 30);
        assert_eq!(state.season(), Season::Spring);
        assert!(ClockState::try_from(record(0, 0, 1, 0)).is_ok());
    }

    #[test]
    fn rejects_each_field() {
        assert_eq!(
            ClockState::try_from(record(60, 6, 1, 0)),
            Err(StateValidationError::MinuteOutOfRange(60))
        );
        assert_eq!(
            ClockState::try_from(record(-1, 6, 1, 0)),
            Err(StateValidationError::MinuteOutOfRange(-1))
        );
        assert_eq!(
            ClockState::try_from(record(0, 24, 1, 0)),
            Err(StateValidationError::HourOutOfRange(24))
        );
        assert_eq!(
            ClockState::try_from(record(0, 6, 0, 0)),
            Err(StateValidationError::DayOutOfRange(0))
        );
        assert_eq!(
            ClockState::try_from(record(0, 6, 31, 0)),
            Err(StateValidationError::DayOutOfRange(31))
        );
        assert_eq!(
            ClockState::try_from(record(0, 6, 1, 4)),
            Err(StateValidationError::UnknownSeason(4))
        );
    }

    #[test]
    fn record_uses_season_ordinal() {
        let state = ClockState::new(15, 20, 12, Season::Autumn).unwrap();
        let record = TimeRecord::from(state);
        assert_eq!(record, self::record(15, 20, 12, 2));
        assert_eq!(ClockState::try_from(record), Ok(state));
    }

    #[test]
    fn record_serializes_as_plain_fields() {
        let json = serde_json::to_string(&record(5, 7, 9, 1)).unwrap();
        assert_eq!(json, r#"{"minute":5,"hour":7,"day":9,"season":1}"#);
    }

    #[test]
    fn snapshot_formats_like_the_hud() {
        let snapshot = ClockSnapshot {
            minute: 5,
            hour: 6,
            day: 1,
            season: Season::Summer,
            period: Some("Morning".to_string()),
        };
        assert_eq!(snapshot.to_string(), "Summer 01 06:05 (Morning)");
    }
}
