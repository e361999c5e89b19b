//! Named hour windows on the 24-hour wheel and the table that resolves them.
//!
//! Every consumer that cares about "what part of the day is it" reads the
//! name resolved here, through the clock. Nothing else re-implements the
//! wraparound matching.

use crate::common::{HOURS_PER_DAY, MINUTES_PER_HOUR};
use crate::error::ClockError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A named, half-open hour range `[start_hour, end_hour)`.
///
/// When `start_hour > end_hour` the window wraps past midnight, so
/// `Night = [21, 6)` covers 21, 22, 23, 0, .., 5. A window whose start and end
/// are equal covers no hours at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodWindow {
    pub name: String,
    pub start_hour: u8,
    pub end_hour: u8,
}

impl PeriodWindow {
    pub fn new(name: impl Into<String>, start_hour: u8, end_hour: u8) -> Self {
        Self {
            name: name.into(),
            start_hour,
            end_hour,
        }
    }

    /// Returns `true` if `hour` falls inside this window.
    pub fn contains(&self, hour: u8) -> bool {
        if self.start_hour <= self.end_hour {
            hour >= self.start_hour && hour < self.end_hour
        } else {
            hour >= self.start_hour || hour < self.end_hour
        }
    }

    /// Number of whole hours the window spans on the wheel.
    pub fn span_hours(&self) -> u8 {
        (self.end_hour + HOURS_PER_DAY - self.start_hour) % HOURS_PER_DAY
    }

    /// How far through this window the given time is, from `0.0` at its start
    /// hour towards `1.0` at its end hour.
    ///
    /// Returns `None` if the time is outside the window.
    pub fn progress(&self, hour: u8, minute: u8) -> Option<f32> {
        if !self.contains(hour) {
            return None;
        }
        let minutes_per_hour = u32::from(MINUTES_PER_HOUR);
        let hours_in = u32::from((hour + HOURS_PER_DAY - self.start_hour) % HOURS_PER_DAY);
        let elapsed = hours_in * minutes_per_hour + u32::from(minute);
        let total = u32::from(self.span_hours()) * minutes_per_hour;
        Some(elapsed as f32 / total as f32)
    }
}

impl fmt::Display for PeriodWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{:02}:00, {:02}:00)",
            self.name, self.start_hour, self.end_hour
        )
    }
}

/// How well a table covers the wheel. Produced by [`PeriodTable::coverage`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Coverage {
    /// Hours no window covers.
    pub gaps: Vec<u8>,
    /// Hours claimed by more than one window.
    pub overlaps: Vec<u8>,
}

impl Coverage {
    /// Every hour belongs to exactly one window.
    pub fn is_partition(&self) -> bool {
        self.gaps.is_empty() && self.overlaps.is_empty()
    }
}

impl fmt::Display for Coverage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_partition() {
            return f.write_str("every hour covered exactly once");
        }
        write!(f, "gaps at hours {:?}, overlaps at hours {:?}", self.gaps, self.overlaps)
    }
}

/// The ordered list of period windows a clock matches hours against.
///
/// Windows are checked in the order given; the first match wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodTable {
    windows: Vec<PeriodWindow>,
}

impl PeriodTable {
    /// Builds a table, rejecting any window whose bounds are off the wheel.
    pub fn new(windows: Vec<PeriodWindow>) -> Result<Self, ClockError> {
        if let Some(bad) = windows
            .iter()
            .find(|w| w.start_hour >= HOURS_PER_DAY || w.end_hour >= HOURS_PER_DAY)
        {
            return Err(ClockError::InvalidPeriods {
                reason: format!(
                    "window '{}' uses hours {}..{}, expected 0..{}",
                    bad.name, bad.start_hour, bad.end_hour, HOURS_PER_DAY
                ),
            });
        }
        Ok(Self { windows })
    }

    pub fn windows(&self) -> &[PeriodWindow] {
        &self.windows
    }

    /// The first window, in priority order, that contains `hour`.
    pub fn resolve(&self, hour: u8) -> Option<&PeriodWindow> {
        self.windows.iter().find(|window| window.contains(hour))
    }

    /// The first window carrying the given name.
    pub fn get(&self, name: &str) -> Option<&PeriodWindow> {
        self.windows.iter().find(|window| window.name == name)
    }

    /// Whether `current` lies in the cyclic span of periods `[from, to)`, in
    /// table order. `from == to` matches only that period.
    ///
    /// With the default table, `in_range("Night", "Evening", "Morning")` is
    /// `true`: the span wraps from Evening through Night back to Morning.
    /// Unknown names never match.
    pub fn in_range(&self, current: &str, from: &str, to: &str) -> bool {
        let (Some(current), Some(from), Some(to)) =
            (self.position(current), self.position(from), self.position(to))
        else {
            return false;
        };
        if from == to {
            current == from
        } else if from < to {
            current >= from && current < to
        } else {
            current >= from || current < to
        }
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.windows.iter().position(|window| window.name == name)
    }

    pub fn coverage(&self) -> Coverage {
        let mut coverage = Coverage::default();
        for hour in 0..HOURS_PER_DAY {
            match self.windows.iter().filter(|w| w.contains(hour)).count() {
                0 => coverage.gaps.push(hour),
                1 => {}
                _ => coverage.overlaps.push(hour),
            }
        }
        coverage
    }

    /// Strict check that the table partitions the wheel.
    pub fn validate(&self) -> Result<(), ClockError> {
        let coverage = self.coverage();
        if coverage.is_partition() {
            Ok(())
        } else {
            Err(ClockError::InvalidPeriods {
                reason: coverage.to_string(),
            })
        }
    }
}

impl Default for PeriodTable {
    /// Morning, Afternoon, Evening and Night, as the game ships them.
    fn default() -> Self {
        Self {
            windows: default_windows(),
        }
    }
}

pub(crate) fn default_windows() -> Vec<PeriodWindow> {
    vec![
        PeriodWindow::new("Morning", 6, 12),
        PeriodWindow::new("Afternoon", 12, 18),
        PeriodWindow::new("Evening", 18, 21),
        PeriodWindow::new("Night", 21, 6),
    ]
}
