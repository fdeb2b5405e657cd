//! Cache Level Simulator.
//!
//! A [`CacheSim`] models one tier of a memory hierarchy: it classifies each
//! access as a hit or a miss, tracks dirty lines, picks victims through its
//! replacement policy, and counts traffic in its [`CacheStats`].
//!
//! A level never talks to the level below it directly. Instead, every access
//! returns an [`AccessOutcome`] naming the writeback and the fill that should
//! be forwarded downstream; the hierarchy that owns the levels does the
//! forwarding. Because levels form an acyclic chain, all local state is final
//! by the time a forwarded request runs.

use log::{debug, info, trace};

use self::decoder::AddressDecoder;
use self::geometry::Geometry;
use self::policies::{Policy, ReplacementPolicy};
use self::store::{CacheLine, LineHandle, TagStore};
use crate::common::ConfigError;
use crate::config::{self, CacheConfig, Storage};
use crate::stats::CacheStats;

pub mod decoder;
pub mod geometry;
pub mod policies;
pub mod store;

/// Result of a single access, including the requests for the next level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AccessOutcome {
    /// Whether the addressed line was already present.
    pub hit: bool,
    /// Line address of the valid line displaced by this access, if any.
    pub evicted: Option<u64>,
    /// Line address to write back (a dirty victim), as a `line_bytes` store.
    pub writeback: Option<u64>,
    /// Line address to fetch, as a `line_bytes` read.
    pub fill: Option<u64>,
}

/// One level of a cache hierarchy.
pub struct CacheSim {
    name: String,
    geometry: Geometry,
    decoder: AddressDecoder,
    store: TagStore,
    policy: Policy,
    stats: CacheStats,
    log_misses: bool,
}

impl CacheSim {
    /// Creates a cache level from its configuration entry.
    pub fn new(config: &CacheConfig) -> Result<Self, ConfigError> {
        let policy = Policy::new(config.policy, config.seed)?;
        let mut cache = Self::with_policy(&config.name, config.geometry, policy, config.storage)?;
        cache.set_log(config.log_misses);
        Ok(cache)
    }

    /// Creates a cache level from explicit parts.
    ///
    /// # Arguments
    ///
    /// * `name` - Display name used in logs and reports.
    /// * `geometry` - Validated `sets:ways:blocksize` shape.
    /// * `policy` - Replacement policy instance, owned by the level.
    /// * `storage` - Tag storage layout; `Storage::Auto` chooses by geometry.
    pub fn with_policy(
        name: &str,
        geometry: Geometry,
        policy: Policy,
        storage: Storage,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            name: name.to_string(),
            geometry,
            decoder: AddressDecoder::new(&geometry),
            store: TagStore::new(&geometry, storage)?,
            policy,
            stats: CacheStats::default(),
            log_misses: cfg!(feature = "always-trace"),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn decoder(&self) -> &AddressDecoder {
        &self.decoder
    }

    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats.reset();
    }

    pub fn policy(&self) -> config::ReplacementPolicy {
        self.policy.kind()
    }

    pub fn is_sparse(&self) -> bool {
        self.store.is_sparse()
    }

    /// Enables or disables logging of every miss at `info` level.
    pub fn set_log(&mut self, enabled: bool) {
        self.log_misses = enabled || cfg!(feature = "always-trace");
    }

    /// Checks if the line holding `addr` is present.
    pub fn contains(&self, addr: u64) -> bool {
        self.check_tag(addr).is_some()
    }

    /// Returns a copy of the valid line holding `addr`, if present.
    pub fn line(&self, addr: u64) -> Option<CacheLine> {
        self.check_tag(addr)
            .and_then(|h| self.store.line(h))
            .copied()
    }

    /// Number of valid lines currently held.
    pub fn resident_lines(&self) -> usize {
        self.store.resident()
    }

    fn check_tag(&self, addr: u64) -> Option<LineHandle> {
        let set = self.decoder.set_index(addr);
        let tag = self.decoder.block_tag(addr);
        self.store.find(set, tag)
    }

    /// Simulates an access of `bytes` bytes at `addr`.
    ///
    /// On a hit the line's use is recorded and a store marks it dirty. On a
    /// miss a victim is evicted and the new block installed in one step; a
    /// dirty victim is counted as a writeback and reported in the outcome,
    /// together with the line fill for the new block. A store miss leaves the
    /// new line dirty.
    pub fn access(&mut self, addr: u64, bytes: usize, store: bool) -> AccessOutcome {
        self.stats.record_access(bytes, store);

        let set = self.decoder.set_index(addr);
        let tag = self.decoder.block_tag(addr);

        if let Some(handle) = self.store.find(set, tag) {
            if let Some(line) = self.store.line_mut(handle) {
                self.policy.update(line);
                if store {
                    line.dirty = true;
                }
            }
            return AccessOutcome {
                hit: true,
                ..AccessOutcome::default()
            };
        }

        self.stats.record_miss(store);
        if self.log_misses {
            info!(
                "{} {} miss {:#x}",
                self.name,
                if store { "write" } else { "read" },
                addr
            );
        }

        let (_, victim) = self.store.replace(set, tag, &mut self.policy);
        let evicted = victim
            .valid
            .then(|| self.decoder.block_addr(victim.tag));

        let writeback = if victim.valid && victim.dirty {
            self.stats.writebacks += 1;
            debug!("{} writeback {:#x}", self.name, self.decoder.block_addr(victim.tag));
            evicted
        } else {
            None
        };

        let fill = self.decoder.line_base(addr);
        debug!("{} fill {:#x}", self.name, fill);

        if store {
            if let Some(handle) = self.check_tag(addr) {
                if let Some(line) = self.store.line_mut(handle) {
                    line.dirty = true;
                }
            }
        }

        AccessOutcome {
            hit: false,
            evicted,
            writeback,
            fill: Some(fill),
        }
    }

    /// Cleans and/or invalidates every line overlapping `[addr, addr + bytes)`.
    ///
    /// Cleaning a dirty line counts a writeback and clears its dirty bit.
    /// Invalidating drops the line. Absent lines are skipped.
    ///
    /// # Returns
    ///
    /// The number of present lines the range covered.
    pub fn clean_invalidate(&mut self, addr: u64, bytes: usize, clean: bool, inval: bool) -> usize {
        let decoder = self.decoder;
        let mut touched = 0;

        for line_addr in decoder.lines_in_range(addr, bytes) {
            let Some(handle) = self.check_tag(line_addr) else {
                continue;
            };
            touched += 1;

            if clean {
                if let Some(line) = self.store.line_mut(handle) {
                    if line.dirty {
                        self.stats.writebacks += 1;
                        line.dirty = false;
                    }
                }
            }

            if inval {
                self.store.invalidate(handle);
            }
        }

        trace!(
            "{} clean_invalidate {:#x}+{} clean={} inval={} lines={}",
            self.name,
            addr,
            bytes,
            clean,
            inval,
            touched
        );
        touched
    }
}
