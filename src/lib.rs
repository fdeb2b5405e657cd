//! Multi-Level Memory Cache Simulator Library.
//!
//! This crate models the behavior of a hierarchy of hardware caches fed by a
//! stream of loads, stores and instruction fetches. It classifies hits and
//! misses, tracks dirty lines, selects victims, propagates writebacks and
//! fills down the chain, and accumulates per-level traffic statistics.
//!
//! # Architecture
//!
//! * **Core**: one [`CacheSim`] per level, with set-associative or sparse
//!   fully-associative tag storage and random or LFU replacement.
//! * **Hierarchy**: a registry owning all levels and main memory, wiring each
//!   level to the one below by handle.
//! * **Harness**: TOML/CLI configuration, text trace replay and reporting.
//!
//! # Modules
//!
//! * `common`: Shared types, constants, and error handling.
//! * `config`: Configuration loading and parsing.
//! * `core`: Cache level implementation.
//! * `sim`: Trace loading, replay and logging.
//! * `soc`: Hierarchy assembly and main memory.
//! * `stats`: Statistics collection and reporting.

/// Shared types, constants and error handling.
///
/// Provides the access classification and the error types used throughout
/// the simulator.
pub mod common;

/// Configuration system for cache geometries, policies and wiring.
///
/// Loads TOML files or assembles a hierarchy from `sets:ways:blocksize`
/// command-line geometries.
pub mod config;

/// Cache level implementation.
///
/// Address decoding, tag storage, replacement policies and the per-level
/// access and clean/invalidate protocol.
pub mod core;

/// Simulation harness.
///
/// Parses access traces, replays them in program order and provides the
/// stderr logger used by the binary.
pub mod sim;

/// Hierarchy assembly.
///
/// Owns levels and backing memory, links levels by handle, and routes
/// fetches and data accesses to their entry ports.
pub mod soc;

/// Statistics collection and reporting.
///
/// Per-level counters, miss rates, and text or JSON reports.
pub mod stats;

pub use crate::config::Config;
pub use crate::core::CacheSim;
pub use crate::soc::{Hierarchy, System};
