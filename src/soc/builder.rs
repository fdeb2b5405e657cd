//! Cache System Builder.
//!
//! This module defines the `System` structure, which owns the assembled
//! hierarchy and its two entry ports. It creates every level listed in the
//! configuration, wires the downstream links, and routes each access to the
//! port matching its type.

use super::interconnect::{Downstream, Hierarchy, LevelId};
use crate::common::constants::MEMORY_LINK_NAME;
use crate::common::{AccessType, ConfigError};
use crate::config::Config;
use crate::core::{AccessOutcome, CacheSim};
use crate::stats::SimReport;

/// A configured cache hierarchy with instruction and data entry points.
pub struct System {
    /// All levels and the memory behind them.
    pub hierarchy: Hierarchy,
    /// Level receiving instruction fetches, if any.
    pub icache: Option<LevelId>,
    /// Level receiving loads and stores, if any.
    pub dcache: Option<LevelId>,
}

impl System {
    /// Creates a new system from the specified configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - Level geometries, links and ports
    ///
    /// # Returns
    ///
    /// The assembled system, or the first configuration problem found.
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        if config.caches.is_empty() {
            return Err(ConfigError::Empty);
        }

        let mut hierarchy = Hierarchy::new();
        for cache_config in &config.caches {
            let mut level = CacheSim::new(cache_config)?;
            if config.general.log_misses {
                level.set_log(true);
            }
            hierarchy.add_level(level)?;
        }

        for cache_config in &config.caches {
            let id = lookup(&hierarchy, &cache_config.name)?;
            let target = match cache_config.next.as_deref() {
                None => None,
                Some(_) if cache_config.links_to_memory() => Some(Downstream::Memory),
                Some(name) => Some(Downstream::Level(lookup(&hierarchy, name)?)),
            };
            hierarchy.set_next(id, target)?;
        }

        let port = |name: &Option<String>| -> Result<Option<LevelId>, ConfigError> {
            name.as_deref().map(|n| lookup(&hierarchy, n)).transpose()
        };
        let icache = port(&config.ports.icache)?;
        let mut dcache = port(&config.ports.dcache)?;
        if icache.is_none() && dcache.is_none() {
            dcache = hierarchy.levels().next().map(|(id, _)| id);
        }

        Ok(Self {
            hierarchy,
            icache,
            dcache,
        })
    }

    /// Feeds one access into the port matching `kind`.
    ///
    /// # Returns
    ///
    /// The outcome at the entry level, or `None` if that port is not
    /// configured and the access was dropped.
    pub fn access(&mut self, kind: AccessType, addr: u64, bytes: usize) -> Option<AccessOutcome> {
        let port = if kind.is_fetch() {
            self.icache
        } else {
            self.dcache
        };
        port.map(|id| self.hierarchy.access(id, addr, bytes, kind.is_store()))
    }

    /// Applies a clean/invalidate through both ports.
    ///
    /// A level shared by both ports is only walked once per port chain.
    pub fn clean_invalidate(&mut self, addr: u64, bytes: usize, clean: bool, inval: bool) {
        let ports = [self.icache, self.dcache];
        for (i, port) in ports.iter().enumerate() {
            let Some(id) = *port else {
                continue;
            };
            if ports[..i].contains(&Some(id)) {
                continue;
            }
            self.hierarchy.clean_invalidate(id, addr, bytes, clean, inval);
        }
    }

    pub fn report(&self) -> SimReport {
        self.hierarchy.report()
    }
}

fn lookup(hierarchy: &Hierarchy, name: &str) -> Result<LevelId, ConfigError> {
    if name.eq_ignore_ascii_case(MEMORY_LINK_NAME) {
        return Err(ConfigError::UnknownLevel(name.to_string()));
    }
    hierarchy
        .find(name)
        .ok_or_else(|| ConfigError::UnknownLevel(name.to_string()))
}
