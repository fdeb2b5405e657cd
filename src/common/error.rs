use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while building a cache hierarchy.
///
/// Every variant describes a geometry or wiring that would make index
/// computation or forwarding unsound, so none of them is recoverable at
/// simulation time.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Malformed cache configuration '{0}'")]
    Malformed(String),

    #[error("Invalid set count {0}: must be a non-zero power of two")]
    InvalidSets(usize),

    #[error("Invalid way count {0}: must be at least 1")]
    InvalidWays(usize),

    #[error("Invalid block size {0}: must be a power of two and at least 8")]
    InvalidLineSize(usize),

    #[error("Cache geometry {0} is too large to simulate")]
    TooLarge(String),

    #[error("Sparse tag storage requires a single set, got {0} sets")]
    SparseNeedsSingleSet(usize),

    #[error("LFSR seed must be non-zero")]
    ZeroSeed,

    #[error("Unknown cache level '{0}'")]
    UnknownLevel(String),

    #[error("Duplicate cache level name '{0}'")]
    DuplicateLevel(String),

    #[error("Linking '{0}' to '{1}' would create a cycle")]
    LinkCycle(String, String),

    #[error("No cache levels configured")]
    Empty,

    #[error("Failed to read config file '{0}': {1}")]
    FileRead(PathBuf, #[source] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Errors raised while reading an access trace.
#[derive(Error, Debug)]
pub enum TraceError {
    #[error("Failed to read trace: {0}")]
    Io(#[from] std::io::Error),

    #[error("Trace line {line}: {msg}")]
    Parse { line: usize, msg: String },
}
