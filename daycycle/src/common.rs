//! Contains common, primitive types and constants shared across the crate.
//!
//! The calendar bounds live here so that the clock, the period table and the
//! state validation all agree on the shape of a simulated day.

use slotmap::new_key_type;

/// Minutes in one simulated hour. One tick advances one minute.
pub const MINUTES_PER_HOUR: u8 = 60;

/// Hours on the period wheel.
pub const HOURS_PER_DAY: u8 = 24;

/// Days in a season. Day numbers run `1..=DAYS_PER_SEASON`.
pub const DAYS_PER_SEASON: u8 = 30;

new_key_type! {
    /// Uniquely and safely identifies a subscriber registered on a clock.
    ///
    /// This key is returned by every `on_*` registration method. It is
    /// guaranteed to be unique and will not be reused, so a stale id can
    /// never remove somebody else's subscription.
    pub struct SubscriberId;
}
