//! Random Replacement Policy.
//!
//! Evicts a pseudo-randomly chosen way, ignoring usage history entirely. The
//! sequence comes from a 32-bit Galois LFSR, so two caches
//! started from the same seed and fed the same accesses evict identically.

use super::ReplacementPolicy;
use crate::common::constants::{DEFAULT_LFSR_SEED, LFSR_TAPS};
use crate::common::ConfigError;
use crate::core::units::cache::store::CacheLine;

/// 32-bit Galois linear-feedback shift register.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Lfsr {
    reg: u32,
}

impl Lfsr {
    /// Creates an LFSR in state `seed`, which must be non-zero.
    pub fn new(seed: u32) -> Result<Self, ConfigError> {
        if seed == 0 {
            return Err(ConfigError::ZeroSeed);
        }
        Ok(Self { reg: seed })
    }

    /// Advances the register and returns its new state.
    pub fn next(&mut self) -> u32 {
        let feedback = (self.reg & 1).wrapping_neg() & LFSR_TAPS;
        self.reg = (self.reg >> 1) ^ feedback;
        self.reg
    }
}

impl Default for Lfsr {
    fn default() -> Self {
        Self {
            reg: DEFAULT_LFSR_SEED,
        }
    }
}

/// Random policy state.
#[derive(Clone, Debug, Default)]
pub struct RandomPolicy {
    lfsr: Lfsr,
}

impl RandomPolicy {
    pub fn new(seed: u32) -> Result<Self, ConfigError> {
        Ok(Self {
            lfsr: Lfsr::new(seed)?,
        })
    }
}

impl ReplacementPolicy for RandomPolicy {
    /// Hits leave no history.
    fn update(&mut self, _line: &mut CacheLine) {}

    /// Installation leaves no history.
    fn install(&mut self, _line: &mut CacheLine) {}

    /// Draws the next LFSR value modulo `ways`. Empty ways get no preference.
    fn get_victim(
        &mut self,
        ways: usize,
        _candidates: &mut dyn Iterator<Item = &CacheLine>,
    ) -> usize {
        self.lfsr.next() as usize % ways
    }
}
