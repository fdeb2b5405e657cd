//! Least Frequently Used (LFU) Replacement Policy.
//!
//! Each line carries a usage counter that is reset to 1 when the line is
//! installed and incremented on every hit. The victim is the line with the
//! smallest counter in the set; ties go to the lowest way. Never-filled ways
//! start at 0 and are therefore picked before any resident line.

use super::ReplacementPolicy;
use crate::core::units::cache::store::CacheLine;

/// LFU policy. All state lives in the lines' usage counters.
#[derive(Clone, Debug, Default)]
pub struct LfuPolicy;

impl ReplacementPolicy for LfuPolicy {
    /// Counts one more use of the hit line.
    fn update(&mut self, line: &mut CacheLine) {
        line.usage += 1;
    }

    /// Starts a freshly installed line at one use.
    fn install(&mut self, line: &mut CacheLine) {
        line.usage = 1;
    }

    /// Identifies the least used way, the lowest one on ties.
    fn get_victim(
        &mut self,
        _ways: usize,
        candidates: &mut dyn Iterator<Item = &CacheLine>,
    ) -> usize {
        let mut victim = 0;
        let mut min_usage = u64::MAX;
        for (way, line) in candidates.enumerate() {
            if line.usage < min_usage {
                min_usage = line.usage;
                victim = way;
            }
        }
        victim
    }
}
