//! Cache Hierarchy Interconnect.
//!
//! This module implements the registry that owns every cache level and the
//! backing memory, and routes the requests each level emits to the target
//! below it. Levels refer to each other only through [`LevelId`] values
//! handed out by the registry, so no level ever owns or outlives another.

use log::info;

use super::memory::{MainMemory, MemoryController};
use crate::common::ConfigError;
use crate::core::{AccessOutcome, CacheSim};
use crate::stats::{LevelReport, SimReport};

/// Handle of a level registered in a [`Hierarchy`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LevelId(usize);

impl LevelId {
    /// Position of the level in registration order.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Where a level sends its writebacks, fills and maintenance requests.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Downstream {
    Level(LevelId),
    Memory,
}

/// Owner of a chain (or tree) of cache levels and the memory behind them.
pub struct Hierarchy {
    levels: Vec<CacheSim>,
    next: Vec<Option<Downstream>>,
    memory: Box<dyn MemoryController>,
}

impl Default for Hierarchy {
    fn default() -> Self {
        Self::new()
    }
}

impl Hierarchy {
    /// Creates an empty hierarchy backed by a counting [`MainMemory`].
    pub fn new() -> Self {
        Self::with_memory(Box::new(MainMemory::new()))
    }

    pub fn with_memory(memory: Box<dyn MemoryController>) -> Self {
        Self {
            levels: Vec::new(),
            next: Vec::new(),
            memory,
        }
    }

    /// Registers a level. It starts unlinked, i.e. as a sink.
    ///
    /// # Returns
    ///
    /// The handle of the new level, or an error if the name is taken.
    pub fn add_level(&mut self, level: CacheSim) -> Result<LevelId, ConfigError> {
        if self.find(level.name()).is_some() {
            return Err(ConfigError::DuplicateLevel(level.name().to_string()));
        }
        info!(
            "[Hierarchy] Registered level: {:<8} {} ({} bytes, {:?}{})",
            level.name(),
            level.geometry(),
            level.geometry().size_bytes(),
            level.policy(),
            if level.is_sparse() { ", sparse" } else { "" }
        );
        self.levels.push(level);
        self.next.push(None);
        Ok(LevelId(self.levels.len() - 1))
    }

    /// Sets the downstream target of `upper`, or makes it a sink with `None`.
    ///
    /// Links that would let a request come back to `upper` are rejected.
    pub fn set_next(&mut self, upper: LevelId, target: Option<Downstream>) -> Result<(), ConfigError> {
        let mut cursor = target;
        while let Some(Downstream::Level(id)) = cursor {
            if id == upper {
                let below = match target {
                    Some(Downstream::Level(t)) => self.levels[t.0].name().to_string(),
                    _ => String::new(),
                };
                return Err(ConfigError::LinkCycle(
                    self.levels[upper.0].name().to_string(),
                    below,
                ));
            }
            cursor = self.next[id.0];
        }
        self.next[upper.0] = target;
        Ok(())
    }

    pub fn next_of(&self, id: LevelId) -> Option<Downstream> {
        self.next[id.0]
    }

    /// Looks a level up by name.
    pub fn find(&self, name: &str) -> Option<LevelId> {
        self.levels
            .iter()
            .position(|l| l.name() == name)
            .map(LevelId)
    }

    pub fn level(&self, id: LevelId) -> &CacheSim {
        &self.levels[id.0]
    }

    pub fn level_mut(&mut self, id: LevelId) -> &mut CacheSim {
        &mut self.levels[id.0]
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn levels(&self) -> impl Iterator<Item = (LevelId, &CacheSim)> {
        self.levels.iter().enumerate().map(|(i, l)| (LevelId(i), l))
    }

    pub fn memory(&self) -> &dyn MemoryController {
        self.memory.as_ref()
    }

    /// Performs an access at level `id` and forwards its consequences.
    ///
    /// A dirty victim is written back as a `line_bytes` store before the new
    /// line is fetched as a `line_bytes` read, both at the downstream target.
    /// A level without a target absorbs both.
    pub fn access(&mut self, id: LevelId, addr: u64, bytes: usize, store: bool) -> AccessOutcome {
        let outcome = self.levels[id.0].access(addr, bytes, store);

        if let Some(target) = self.next[id.0] {
            let line_bytes = self.levels[id.0].geometry().line_bytes();
            if let Some(victim) = outcome.writeback {
                self.forward(target, victim, line_bytes, true);
            }
            if let Some(fill) = outcome.fill {
                self.forward(target, fill, line_bytes, false);
            }
        }
        outcome
    }

    fn forward(&mut self, target: Downstream, addr: u64, bytes: usize, store: bool) {
        match target {
            Downstream::Level(id) => {
                self.access(id, addr, bytes, store);
            }
            Downstream::Memory => self.memory.access(addr, bytes, store),
        }
    }

    /// Cleans and/or invalidates `[addr, addr + bytes)` at `id` and every
    /// level below it, whether or not a level held any of the lines.
    pub fn clean_invalidate(&mut self, id: LevelId, addr: u64, bytes: usize, clean: bool, inval: bool) {
        let mut cursor = Some(Downstream::Level(id));
        while let Some(target) = cursor {
            match target {
                Downstream::Level(level) => {
                    self.levels[level.0].clean_invalidate(addr, bytes, clean, inval);
                    cursor = self.next[level.0];
                }
                Downstream::Memory => {
                    self.memory.clean_invalidate(addr, bytes, clean, inval);
                    cursor = None;
                }
            }
        }
    }

    pub fn reset_stats(&mut self) {
        for level in &mut self.levels {
            level.reset_stats();
        }
        self.memory.reset_stats();
    }

    /// Snapshots the counters of every level, in registration order.
    pub fn report(&self) -> SimReport {
        let levels = self
            .levels
            .iter()
            .map(|l| LevelReport {
                name: l.name().to_string(),
                geometry: l.geometry().to_string(),
                policy: format!("{:?}", l.policy()),
                sparse: l.is_sparse(),
                stats: *l.stats(),
                miss_rate: l.stats().miss_rate(),
            })
            .collect();

        SimReport {
            levels,
            memory: self.memory.stats(),
        }
    }
}
