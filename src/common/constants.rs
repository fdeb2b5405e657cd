//! Simulator-wide constants.

/// Smallest line size accepted for any cache level, in bytes.
pub const MIN_LINE_BYTES: usize = 8;

/// Above this many ways, a single-set cache uses sparse tag storage.
pub const SPARSE_WAY_THRESHOLD: usize = 4;

/// Initial LFSR state used by the random replacement policy.
pub const DEFAULT_LFSR_SEED: u32 = 1;

/// Feedback taps of the 32-bit Galois LFSR (x^32 + x^31 + x^29 + x + 1).
pub const LFSR_TAPS: u32 = 0xd000_0001;

/// Size assumed for a trace access that does not state one.
pub const DEFAULT_ACCESS_BYTES: usize = 8;

/// Name under which a level links to main memory in a configuration file.
pub const MEMORY_LINK_NAME: &str = "memory";
