//! Defines all configuration structures for the clock.
//!
//! These structs are deserialized with `serde` through the `config` crate, so
//! the tick rate, start time and period table can be defined in a TOML file
//! and overridden from `DAYCYCLE__*` environment variables.

use crate::error::ClockError;
use crate::period::{default_windows, PeriodTable, PeriodWindow};
use crate::season::Season;
use serde::Deserialize;
use std::path::Path;
use tracing::warn;

/// The top-level configuration for a clock and its engine.
#[derive(Debug, Clone, Deserialize)]
pub struct ClockConfig {
    /// Real-time rate at which the engine feeds ticks (simulated minutes).
    #[serde(default = "default_ticks_per_second")]
    pub ticks_per_second: f64,

    /// Refuse a period table that does not partition the 24-hour wheel,
    /// instead of only warning about it.
    #[serde(default)]
    pub strict_periods: bool,

    /// Where the clock starts.
    #[serde(default)]
    pub start: StartConfig,

    /// Period windows, in priority order.
    #[serde(default = "default_windows")]
    pub periods: Vec<PeriodWindow>,
}

/// How a clock chooses its initial time.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum StartConfig {
    /// Day 1 of Summer, 06:00.
    #[default]
    Defaults,
    /// An explicit start.
    Forced {
        #[serde(default)]
        season: Season,
        #[serde(default = "default_start_day")]
        day: u8,
        #[serde(default = "default_start_at")]
        at: StartAt,
        /// Ignored when `at` names a period; periods start on the hour.
        #[serde(default)]
        minute: u8,
    },
}

/// The start hour, given directly or as the first hour of a named period.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum StartAt {
    Hour(u8),
    Period(String),
}

impl ClockConfig {
    /// Loads a configuration file, then applies environment overrides such as
    /// `DAYCYCLE__TICKS_PER_SECOND=30`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ClockError> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(Self::environment())
            .build()?;
        Ok(settings.try_deserialize()?)
    }

    /// Parses a TOML document. Environment overrides are not applied.
    pub fn from_toml_str(toml: &str) -> Result<Self, ClockError> {
        let settings = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?;
        Ok(settings.try_deserialize()?)
    }

    fn environment() -> config::Environment {
        config::Environment::with_prefix("DAYCYCLE")
            .separator("__")
            .try_parsing(true)
    }

    /// Builds the period table, checking how well it covers the wheel.
    ///
    /// An imperfect partition is only logged unless `strict_periods` is set.
    pub fn period_table(&self) -> Result<PeriodTable, ClockError> {
        let table = PeriodTable::new(self.periods.clone())?;
        let coverage = table.coverage();
        if !coverage.is_partition() {
            if self.strict_periods {
                return Err(ClockError::InvalidPeriods {
                    reason: coverage.to_string(),
                });
            }
            warn!(%coverage, "period table does not partition the day; unmatched hours keep the previous period");
        }
        Ok(table)
    }
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            ticks_per_second: default_ticks_per_second(),
            strict_periods: false,
            start: StartConfig::default(),
            periods: default_windows(),
        }
    }
}

// --- Default value functions for serde ---

fn default_ticks_per_second() -> f64 {
    1.0
}

fn default_start_day() -> u8 {
    1
}

fn default_start_at() -> StartAt {
    StartAt::Hour(6)
}
