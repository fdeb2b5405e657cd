//! Hierarchy configuration.
//!
//! A [`Config`] lists the cache levels, how they are chained, and which
//! levels receive instruction fetches and data accesses. It is either
//! deserialized from a TOML file or assembled from `sets:ways:blocksize`
//! command-line geometries.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::common::constants::{DEFAULT_LFSR_SEED, MEMORY_LINK_NAME};
use crate::common::ConfigError;
pub use crate::core::units::cache::geometry::Geometry;

/// Usage text printed when a cache configuration is rejected.
pub const GEOMETRY_HELP: &str = "Cache configurations must be of the form
  sets:ways:blocksize
where sets, ways, and blocksize are positive integers, with
sets and blocksize both powers of two and blocksize at least 8.";

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(rename = "cache", default)]
    pub caches: Vec<CacheConfig>,

    #[serde(default)]
    pub ports: PortConfig,
}

#[derive(Debug, Default, Deserialize)]
pub struct GeneralConfig {
    /// Log every miss of every level.
    #[serde(default)]
    pub log_misses: bool,
}

/// Entry levels for the two access streams.
///
/// When both are left unset, data accesses go to the first listed level and
/// instruction fetches are not simulated.
#[derive(Debug, Default, Deserialize)]
pub struct PortConfig {
    pub icache: Option<String>,
    pub dcache: Option<String>,
}

/// Cache replacement policy algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "PascalCase")]
pub enum ReplacementPolicy {
    /// Evicts a way chosen by the level's LFSR.
    #[default]
    #[serde(alias = "random", alias = "RANDOM")]
    Random,
    /// Evicts the way with the fewest recorded uses.
    #[serde(alias = "lfu", alias = "LFU")]
    Lfu,
}

/// Tag storage layout of a level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub enum Storage {
    /// Sparse for single-set levels with more than four ways, fixed otherwise.
    #[default]
    Auto,
    Fixed,
    /// Only valid for single-set levels.
    Sparse,
}

/// Individual cache level configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    pub name: String,

    /// `sets:ways:blocksize`
    pub geometry: Geometry,

    #[serde(default)]
    pub policy: ReplacementPolicy,

    #[serde(default)]
    pub storage: Storage,

    #[serde(default = "default_seed")]
    pub seed: u32,

    /// Name of the level below, `"memory"`, or unset for a sink.
    #[serde(default)]
    pub next: Option<String>,

    #[serde(default)]
    pub log_misses: bool,
}

fn default_seed() -> u32 {
    DEFAULT_LFSR_SEED
}

impl CacheConfig {
    /// Creates a level entry with default policy, storage and seed.
    pub fn new(name: &str, geometry: Geometry) -> Self {
        Self {
            name: name.to_string(),
            geometry,
            policy: ReplacementPolicy::default(),
            storage: Storage::default(),
            seed: default_seed(),
            next: None,
            log_misses: false,
        }
    }

    /// Returns `true` if this level forwards to main memory.
    pub fn links_to_memory(&self) -> bool {
        self.next
            .as_deref()
            .is_some_and(|n| n.eq_ignore_ascii_case(MEMORY_LINK_NAME))
    }
}

impl Config {
    /// Reads and parses a TOML configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            fs::read_to_string(path).map_err(|e| ConfigError::FileRead(path.to_path_buf(), e))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Returns `true` if any level will log its misses, whether enabled
    /// globally, per level, or by the `always-trace` feature.
    pub fn logs_misses(&self) -> bool {
        self.general.log_misses
            || self.caches.iter().any(|c| c.log_misses)
            || cfg!(feature = "always-trace")
    }

    /// Builds the classic split-L1 layout from command-line geometries.
    ///
    /// `I$` and `D$` forward to `L2$` when it is given, otherwise to memory;
    /// `L2$` forwards to memory.
    pub fn from_geometries(
        ic: Option<Geometry>,
        dc: Option<Geometry>,
        l2: Option<Geometry>,
        policy: ReplacementPolicy,
        seed: u32,
    ) -> Self {
        let below = if l2.is_some() { "L2$" } else { MEMORY_LINK_NAME };
        let mut caches = Vec::new();
        let mut ports = PortConfig::default();

        let levels = [("I$", ic, below), ("D$", dc, below), ("L2$", l2, MEMORY_LINK_NAME)];
        for (name, geometry, next) in levels {
            let Some(geometry) = geometry else {
                continue;
            };
            let mut cache = CacheConfig::new(name, geometry);
            cache.policy = policy;
            cache.seed = seed;
            cache.next = Some(next.to_string());
            caches.push(cache);

            match name {
                "I$" => ports.icache = Some(name.to_string()),
                "D$" => ports.dcache = Some(name.to_string()),
                _ => {}
            }
        }

        Self {
            general: GeneralConfig::default(),
            caches,
            ports,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_toml() {
        let config = Config::from_toml(
            r#"
            [general]
            log_misses = true

            [[cache]]
            name = "L1"
            geometry = "64:4:64"
            policy = "Lfu"
            next = "L2"

            [[cache]]
            name = "L2"
            geometry = "1:8:64"
            storage = "Sparse"
            seed = 7
            next = "memory"

            [ports]
            dcache = "L1"
            "#,
        )
        .unwrap();

        assert!(config.general.log_misses);
        assert_eq!(config.caches.len(), 2);
        assert_eq!(config.caches[0].policy, ReplacementPolicy::Lfu);
        assert_eq!(config.caches[0].seed, DEFAULT_LFSR_SEED);
        assert_eq!(config.caches[0].geometry.sets(), 64);
        assert_eq!(config.caches[1].storage, Storage::Sparse);
        assert_eq!(config.caches[1].seed, 7);
        assert!(config.caches[1].links_to_memory());
        assert_eq!(config.ports.dcache.as_deref(), Some("L1"));
        assert_eq!(config.ports.icache, None);
    }

    #[test]
    fn test_per_level_miss_logging() {
        let config = Config::from_toml(
            r#"
            [[cache]]
            name = "D$"
            geometry = "16:1:64"
            log_misses = true

            [[cache]]
            name = "L2$"
            geometry = "64:4:64"
            "#,
        )
        .unwrap();
        assert!(!config.general.log_misses);
        assert!(config.logs_misses());

        let quiet = Config::from_toml(
            r#"
            [[cache]]
            name = "D$"
            geometry = "16:1:64"
            "#,
        )
        .unwrap();
        assert_eq!(quiet.logs_misses(), cfg!(feature = "always-trace"));
    }

    #[test]
    fn test_bad_geometry_in_toml() {
        let err = Config::from_toml(
            r#"
            [[cache]]
            name = "L1"
            geometry = "3:4:64"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_from_geometries() {
        let g: Geometry = "64:2:64".parse().unwrap();
        let config = Config::from_geometries(Some(g), Some(g), None, ReplacementPolicy::Random, 1);
        assert_eq!(config.caches.len(), 2);
        assert!(config.caches.iter().all(|c| c.links_to_memory()));
        assert_eq!(config.ports.icache.as_deref(), Some("I$"));
        assert_eq!(config.ports.dcache.as_deref(), Some("D$"));

        let config = Config::from_geometries(None, Some(g), Some(g), ReplacementPolicy::Lfu, 1);
        assert_eq!(config.caches[0].next.as_deref(), Some("L2$"));
        assert!(config.caches[1].links_to_memory());
        assert_eq!(config.caches[1].policy, ReplacementPolicy::Lfu);
    }
}
