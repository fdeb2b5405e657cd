//! Hierarchy assembly.
//!
//! Owns cache levels and backing memory, links them together, and exposes
//! the instruction and data entry ports used by the trace harness.

/// Builds a `System` from a configuration.
pub mod builder;

/// Level registry and request routing.
pub mod interconnect;

/// Main memory behind the last level.
pub mod memory;

pub use builder::System;
pub use interconnect::{Downstream, Hierarchy, LevelId};
