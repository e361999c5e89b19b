//! Contains the building blocks the clock and engine are assembled from.
//!
//! This module provides the subscriber registry (which delivers clock events
//! to callbacks) and the tick accumulator (which turns real elapsed time into
//! whole simulation ticks).

pub mod subscriber;
pub mod ticker;
