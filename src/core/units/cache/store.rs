//! Tag Storage.
//!
//! Holds the metadata of every line in a cache level. Two layouts are
//! available and behave identically from the outside:
//!
//! * **Fixed**: a flat `sets * ways` array, scanned way by way.
//! * **Sparse**: an ordered map keyed by block tag, for single-set caches
//!   with many ways where a linear scan is wasteful.
//!
//! Lookups return a [`LineHandle`] rather than a reference so that the
//! caller can locate a line once and mutate it through an explicit call.

use std::collections::BTreeMap;

use super::geometry::Geometry;
use super::policies::{Policy, ReplacementPolicy};
use crate::common::ConfigError;
use crate::config::Storage;

/// Metadata of one cache line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheLine {
    /// Block number (address shifted right by the index shift).
    pub tag: u64,
    pub valid: bool,
    pub dirty: bool,
    /// Use counter, maintained only by the LFU policy.
    pub usage: u64,
}

/// Position of a line inside a [`TagStore`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineHandle {
    /// Index into the fixed array.
    Slot(usize),
    /// Key in the sparse map.
    Tag(u64),
}

/// Line metadata storage for one cache level.
#[derive(Clone, Debug)]
pub enum TagStore {
    Fixed { lines: Vec<CacheLine>, ways: usize },
    Sparse { lines: BTreeMap<u64, CacheLine>, ways: usize },
}

impl TagStore {
    /// Creates the storage for `geometry`.
    ///
    /// `Storage::Auto` picks the sparse layout when the geometry has a single
    /// set and more ways than the sparse threshold.
    pub fn new(geometry: &Geometry, storage: Storage) -> Result<Self, ConfigError> {
        let sparse = match storage {
            Storage::Auto => geometry.prefers_sparse(),
            Storage::Fixed => false,
            Storage::Sparse => {
                if geometry.sets() != 1 {
                    return Err(ConfigError::SparseNeedsSingleSet(geometry.sets()));
                }
                true
            }
        };

        let ways = geometry.ways();
        if sparse {
            return Ok(TagStore::Sparse {
                lines: BTreeMap::new(),
                ways,
            });
        }

        let count = geometry.sets() * ways;
        let mut lines = Vec::new();
        lines
            .try_reserve_exact(count)
            .map_err(|_| ConfigError::TooLarge(geometry.to_string()))?;
        lines.resize(count, CacheLine::default());
        Ok(TagStore::Fixed { lines, ways })
    }

    pub fn is_sparse(&self) -> bool {
        matches!(self, TagStore::Sparse { .. })
    }

    /// Finds the valid line holding `tag` in `set`.
    pub fn find(&self, set: usize, tag: u64) -> Option<LineHandle> {
        match self {
            TagStore::Fixed { lines, ways } => {
                let base = set * ways;
                lines[base..base + ways]
                    .iter()
                    .position(|l| l.valid && l.tag == tag)
                    .map(|way| LineHandle::Slot(base + way))
            }
            TagStore::Sparse { lines, .. } => lines
                .get(&tag)
                .filter(|l| l.valid)
                .map(|_| LineHandle::Tag(tag)),
        }
    }

    pub fn line(&self, handle: LineHandle) -> Option<&CacheLine> {
        match (self, handle) {
            (TagStore::Fixed { lines, .. }, LineHandle::Slot(i)) => lines.get(i),
            (TagStore::Sparse { lines, .. }, LineHandle::Tag(t)) => lines.get(&t),
            _ => None,
        }
    }

    pub fn line_mut(&mut self, handle: LineHandle) -> Option<&mut CacheLine> {
        match (self, handle) {
            (TagStore::Fixed { lines, .. }, LineHandle::Slot(i)) => lines.get_mut(i),
            (TagStore::Sparse { lines, .. }, LineHandle::Tag(t)) => lines.get_mut(&t),
            _ => None,
        }
    }

    /// Evicts a victim from `set` and installs `tag` in its place.
    ///
    /// The new line is valid and clean when this returns. The returned line is
    /// whatever occupied the slot before; it is invalid if the slot was empty.
    pub fn replace(&mut self, set: usize, tag: u64, policy: &mut Policy) -> (LineHandle, CacheLine) {
        match self {
            TagStore::Fixed { lines, ways } => {
                let base = set * *ways;
                let slots = &mut lines[base..base + *ways];
                let way = policy.get_victim(*ways, &mut slots.iter());
                let slot = &mut slots[way];
                let evicted = *slot;

                slot.tag = tag;
                slot.valid = true;
                slot.dirty = false;
                policy.install(slot);

                (LineHandle::Slot(base + way), evicted)
            }
            TagStore::Sparse { lines, ways } => {
                let mut evicted = CacheLine::default();
                if lines.len() >= *ways {
                    let pos = policy.get_victim(*ways, &mut lines.values());
                    let victim_tag = lines.keys().nth(pos).copied();
                    if let Some(old) = victim_tag.and_then(|t| lines.remove(&t)) {
                        evicted = old;
                    }
                }

                let mut line = CacheLine {
                    tag,
                    valid: true,
                    dirty: false,
                    usage: 0,
                };
                policy.install(&mut line);
                lines.insert(tag, line);

                (LineHandle::Tag(tag), evicted)
            }
        }
    }

    /// Drops the line at `handle`. Its data is discarded, dirty or not.
    pub fn invalidate(&mut self, handle: LineHandle) {
        match (self, handle) {
            (TagStore::Fixed { lines, .. }, LineHandle::Slot(i)) => {
                if let Some(line) = lines.get_mut(i) {
                    line.valid = false;
                    line.dirty = false;
                }
            }
            (TagStore::Sparse { lines, .. }, LineHandle::Tag(t)) => {
                lines.remove(&t);
            }
            _ => {}
        }
    }

    /// Number of valid lines currently held.
    pub fn resident(&self) -> usize {
        match self {
            TagStore::Fixed { lines, .. } => lines.iter().filter(|l| l.valid).count(),
            TagStore::Sparse { lines, .. } => lines.values().filter(|l| l.valid).count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReplacementPolicy as Kind;

    #[test]
    fn test_auto_selection() {
        let g = Geometry::new(1, 8, 64).unwrap();
        assert!(TagStore::new(&g, Storage::Auto).unwrap().is_sparse());
        assert!(!TagStore::new(&g, Storage::Fixed).unwrap().is_sparse());

        let g = Geometry::new(16, 8, 64).unwrap();
        assert!(!TagStore::new(&g, Storage::Auto).unwrap().is_sparse());
        assert!(matches!(
            TagStore::new(&g, Storage::Sparse),
            Err(ConfigError::SparseNeedsSingleSet(16))
        ));
    }

    #[test]
    fn test_unallocatable_fixed_store_is_an_error() {
        let g = Geometry::new(1 << 40, 1 << 20, 8).unwrap();
        assert!(matches!(
            TagStore::new(&g, Storage::Fixed),
            Err(ConfigError::TooLarge(_))
        ));
    }

    #[test]
    fn test_fixed_replace_and_find() {
        let g = Geometry::new(2, 2, 16).unwrap();
        let mut store = TagStore::new(&g, Storage::Fixed).unwrap();
        let mut policy = Policy::new(Kind::Lfu, 1).unwrap();

        let (h, evicted) = store.replace(1, 0x21, &mut policy);
        assert!(!evicted.valid);
        assert_eq!(store.find(1, 0x21), Some(h));
        assert_eq!(store.find(0, 0x21), None);
        assert_eq!(store.line(h).map(|l| l.usage), Some(1));

        store.invalidate(h);
        assert_eq!(store.find(1, 0x21), None);
        assert_eq!(store.resident(), 0);
    }

    #[test]
    fn test_sparse_fills_before_evicting() {
        let g = Geometry::new(1, 8, 64).unwrap();
        let mut store = TagStore::new(&g, Storage::Auto).unwrap();
        let mut policy = Policy::new(Kind::Random, 1).unwrap();

        for tag in 0..8 {
            let (_, evicted) = store.replace(0, tag, &mut policy);
            assert!(!evicted.valid);
        }
        assert_eq!(store.resident(), 8);

        // First LFSR draw is 0xd0000001, i.e. position 1 in tag order.
        let (_, evicted) = store.replace(0, 100, &mut policy);
        assert!(evicted.valid);
        assert_eq!(evicted.tag, 1);
        assert_eq!(store.resident(), 8);
    }
}
