//! Cache Geometry.
//!
//! A geometry is the `sets:ways:blocksize` triple that fixes the shape of a
//! cache level. It is validated once, at construction, so that every later
//! index computation can rely on the power-of-two mask/shift decomposition.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::common::constants::{MIN_LINE_BYTES, SPARSE_WAY_THRESHOLD};
use crate::common::ConfigError;

/// Validated shape of one cache level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct Geometry {
    sets: usize,
    ways: usize,
    line_bytes: usize,
}

impl Geometry {
    /// Creates a geometry after checking its constraints.
    ///
    /// # Arguments
    ///
    /// * `sets` - Number of sets; a non-zero power of two.
    /// * `ways` - Associativity; at least 1.
    /// * `line_bytes` - Line size; a power of two of at least 8 bytes.
    pub fn new(sets: usize, ways: usize, line_bytes: usize) -> Result<Self, ConfigError> {
        if !sets.is_power_of_two() {
            return Err(ConfigError::InvalidSets(sets));
        }
        if ways == 0 {
            return Err(ConfigError::InvalidWays(ways));
        }
        if line_bytes < MIN_LINE_BYTES || !line_bytes.is_power_of_two() {
            return Err(ConfigError::InvalidLineSize(line_bytes));
        }
        // Line count and capacity must both be representable.
        if sets
            .checked_mul(ways)
            .and_then(|lines| lines.checked_mul(line_bytes))
            .is_none()
        {
            return Err(ConfigError::TooLarge(format!("{}:{}:{}", sets, ways, line_bytes)));
        }
        Ok(Self {
            sets,
            ways,
            line_bytes,
        })
    }

    pub fn sets(&self) -> usize {
        self.sets
    }

    pub fn ways(&self) -> usize {
        self.ways
    }

    pub fn line_bytes(&self) -> usize {
        self.line_bytes
    }

    /// Total capacity in bytes.
    pub fn size_bytes(&self) -> usize {
        self.sets * self.ways * self.line_bytes
    }

    /// Returns `true` when automatic storage selection picks the sparse store.
    pub fn prefers_sparse(&self) -> bool {
        self.ways > SPARSE_WAY_THRESHOLD && self.sets == 1
    }
}

impl FromStr for Geometry {
    type Err = ConfigError;

    /// Parses a `sets:ways:blocksize` string.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || ConfigError::Malformed(s.to_string());
        let mut fields = s.trim().split(':');
        let mut next = || -> Result<usize, ConfigError> {
            fields
                .next()
                .and_then(|f| f.trim().parse().ok())
                .ok_or_else(malformed)
        };
        let sets = next()?;
        let ways = next()?;
        let line_bytes = next()?;
        if fields.next().is_some() {
            return Err(malformed());
        }
        Self::new(sets, ways, line_bytes)
    }
}

impl TryFrom<String> for Geometry {
    type Error = ConfigError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl fmt::Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.sets, self.ways, self.line_bytes)
    }
}
