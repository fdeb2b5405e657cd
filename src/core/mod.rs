//! Simulator core.
//!
//! Holds the per-level cache model. Levels are chained together by
//! [`crate::soc::Hierarchy`], never by each other.

/// Cache level implementation and its building blocks.
pub mod units;

pub use units::cache::{AccessOutcome, CacheSim};
