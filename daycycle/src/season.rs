//! The fixed, cyclic order of seasons.

use crate::error::ClockError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the four 30-day eras of the simulated year.
///
/// The cycle order is `Summer -> Winter -> Autumn -> Spring -> Summer`, and
/// the ordinal of each variant is its position in that cycle. Saved games
/// store the ordinal, so the order must never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Season {
    #[default]
    Summer,
    Winter,
    Autumn,
    Spring,
}

impl Season {
    /// Every season in cycle order.
    pub const ALL: [Season; 4] = [Season::Summer, Season::Winter, Season::Autumn, Season::Spring];

    /// The season that follows this one, wrapping after `Spring`.
    pub const fn next(self) -> Self {
        match self {
            Season::Summer => Season::Winter,
            Season::Winter => Season::Autumn,
            Season::Autumn => Season::Spring,
            Season::Spring => Season::Summer,
        }
    }

    /// Position of this season in the cycle (`Summer` is 0).
    pub const fn ordinal(self) -> u8 {
        self as u8
    }

    /// Looks a season up by its ordinal. Returns `None` outside `0..4`.
    pub fn from_ordinal(ordinal: i32) -> Option<Self> {
        usize::try_from(ordinal)
            .ok()
            .and_then(|index| Self::ALL.get(index).copied())
    }

    pub const fn name(self) -> &'static str {
        match self {
            Season::Summer => "Summer",
            Season::Winter => "Winter",
            Season::Autumn => "Autumn",
            Season::Spring => "Spring",
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Season {
    type Err = ClockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "summer" => Ok(Season::Summer),
            "winter" => Ok(Season::Winter),
            "autumn" | "fall" => Ok(Season::Autumn),
            "spring" => Ok(Season::Spring),
            _ => Err(ClockError::UnknownSeasonName(s.to_string())),
        }
    }
}

impl TryFrom<String> for Season {
    type Error = ClockError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
