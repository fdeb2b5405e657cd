//! Common utilities and types used throughout the cache simulator.
//!
//! This module provides the access classification, error types, and
//! geometry constants that are shared across the cache core, the
//! hierarchy assembly, and the trace harness.

/// Common constants used throughout the simulator.
pub mod constants;

/// Memory access type definitions.
pub mod data;

/// Error types for configuration and trace input.
pub mod error;

pub use data::AccessType;
pub use error::{ConfigError, TraceError};
