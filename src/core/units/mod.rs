//! Functional units of the simulator core.

/// Single-level cache model: geometry, address decoding, tag storage and
/// replacement policies.
pub mod cache;
