//! Simulation harness: trace input, replay, and the command-line logger.

pub mod loader;
pub mod logger;
pub mod replay;

pub use loader::{open_trace, read_trace, TraceOp};
pub use replay::{replay, ReplaySummary};
