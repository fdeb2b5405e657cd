//! Cache Replacement Policies.
//!
//! A policy decides which line of a full set is evicted on a miss. The set of
//! policies is closed: [`Policy`] holds one of them by value and dispatches
//! with a `match`, so the hot path never goes through a vtable.

use super::store::CacheLine;
use crate::common::ConfigError;
use crate::config;

pub use self::lfu::LfuPolicy;
pub use self::random::{Lfsr, RandomPolicy};

mod lfu;
mod random;

/// Interface shared by all replacement policies.
pub trait ReplacementPolicy {
    /// Records a hit on `line`.
    fn update(&mut self, line: &mut CacheLine);

    /// Prepares `line` after it has been installed for a new block.
    fn install(&mut self, line: &mut CacheLine);

    /// Identifies the victim among `candidates`.
    ///
    /// # Arguments
    ///
    /// * `ways` - The associativity of the cache.
    /// * `candidates` - The lines eligible for eviction, in way order.
    ///
    /// # Returns
    ///
    /// The position of the victim within `candidates`.
    fn get_victim(&mut self, ways: usize, candidates: &mut dyn Iterator<Item = &CacheLine>)
        -> usize;
}

/// The replacement policy owned by a cache level.
#[derive(Clone, Debug)]
pub enum Policy {
    Random(RandomPolicy),
    Lfu(LfuPolicy),
}

impl Policy {
    /// Creates the policy named by `kind`.
    ///
    /// `seed` initializes the LFSR of the random policy and must be non-zero,
    /// since an all-zero LFSR never leaves that state.
    pub fn new(kind: config::ReplacementPolicy, seed: u32) -> Result<Self, ConfigError> {
        Ok(match kind {
            config::ReplacementPolicy::Random => Policy::Random(RandomPolicy::new(seed)?),
            config::ReplacementPolicy::Lfu => Policy::Lfu(LfuPolicy),
        })
    }

    pub fn kind(&self) -> config::ReplacementPolicy {
        match self {
            Policy::Random(_) => config::ReplacementPolicy::Random,
            Policy::Lfu(_) => config::ReplacementPolicy::Lfu,
        }
    }
}

impl ReplacementPolicy for Policy {
    fn update(&mut self, line: &mut CacheLine) {
        match self {
            Policy::Random(p) => p.update(line),
            Policy::Lfu(p) => p.update(line),
        }
    }

    fn install(&mut self, line: &mut CacheLine) {
        match self {
            Policy::Random(p) => p.install(line),
            Policy::Lfu(p) => p.install(line),
        }
    }

    fn get_victim(
        &mut self,
        ways: usize,
        candidates: &mut dyn Iterator<Item = &CacheLine>,
    ) -> usize {
        match self {
            Policy::Random(p) => p.get_victim(ways, candidates),
            Policy::Lfu(p) => p.get_victim(ways, candidates),
        }
    }
}
