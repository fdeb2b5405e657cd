//! Backing memory behind the cache hierarchy.

/// Memory controller trait and the counting main memory.
pub mod controller;

pub use controller::{MainMemory, MemoryController, MemoryStats};
