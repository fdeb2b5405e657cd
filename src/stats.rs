//! Simulation statistics collection and reporting.
//!
//! Each cache level owns a [`CacheStats`] that it updates on every access.
//! The reporting side is read-only: it formats the counters as the classic
//! per-level text block or serializes them as JSON.

use std::io::{self, Write};

use serde::Serialize;

/// Per-level traffic counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub bytes_read: u64,
    pub bytes_written: u64,
    pub read_accesses: u64,
    pub write_accesses: u64,
    pub read_misses: u64,
    pub write_misses: u64,
    pub writebacks: u64,
}

impl CacheStats {
    /// Counts one access of `bytes` bytes.
    pub fn record_access(&mut self, bytes: usize, store: bool) {
        if store {
            self.write_accesses += 1;
            self.bytes_written += bytes as u64;
        } else {
            self.read_accesses += 1;
            self.bytes_read += bytes as u64;
        }
    }

    pub fn record_miss(&mut self, store: bool) {
        if store {
            self.write_misses += 1;
        } else {
            self.read_misses += 1;
        }
    }

    pub fn accesses(&self) -> u64 {
        self.read_accesses + self.write_accesses
    }

    pub fn misses(&self) -> u64 {
        self.read_misses + self.write_misses
    }

    /// Miss rate in percent, or `None` before the first access.
    pub fn miss_rate(&self) -> Option<f64> {
        let accesses = self.accesses();
        if accesses == 0 {
            return None;
        }
        Some(100.0 * self.misses() as f64 / accesses as f64)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Writes the text report of a level named `name`.
    ///
    /// Every line is prefixed with the level name. A level that saw no
    /// accesses writes nothing, since its miss rate is undefined.
    pub fn write_report(&self, name: &str, out: &mut dyn Write) -> io::Result<()> {
        let Some(miss_rate) = self.miss_rate() else {
            return Ok(());
        };

        let rows = [
            ("Bytes Read:", self.bytes_read),
            ("Bytes Written:", self.bytes_written),
            ("Read Accesses:", self.read_accesses),
            ("Write Accesses:", self.write_accesses),
            ("Read Misses:", self.read_misses),
            ("Write Misses:", self.write_misses),
            ("Writebacks:", self.writebacks),
        ];
        for (label, value) in rows {
            writeln!(out, "{} {:<23}{}", name, label, value)?;
        }
        writeln!(out, "{} {:<23}{:.3}%", name, "Miss Rate:", miss_rate)
    }
}

/// Report entry for one cache level.
#[derive(Clone, Debug, Serialize)]
pub struct LevelReport {
    pub name: String,
    pub geometry: String,
    pub policy: String,
    pub sparse: bool,
    #[serde(flatten)]
    pub stats: CacheStats,
    pub miss_rate: Option<f64>,
}

/// Report of a whole hierarchy run.
#[derive(Clone, Debug, Serialize)]
pub struct SimReport {
    pub levels: Vec<LevelReport>,
    pub memory: crate::soc::memory::MemoryStats,
}

impl SimReport {
    /// Prints every level's text block followed by main memory traffic.
    pub fn write_text(&self, out: &mut dyn Write) -> io::Result<()> {
        for level in &self.levels {
            level.stats.write_report(&level.name, out)?;
        }
        self.memory.write_report(out)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_miss_rate() {
        let mut s = CacheStats::default();
        assert_eq!(s.miss_rate(), None);
        s.record_access(4, false);
        s.record_access(4, true);
        s.record_access(4, true);
        s.record_access(4, false);
        s.record_miss(true);
        assert_eq!(s.miss_rate(), Some(25.0));
        assert_eq!(s.bytes_read, 8);
        assert_eq!(s.bytes_written, 8);
    }

    #[test]
    fn test_report_format() {
        let mut s = CacheStats::default();
        s.record_access(8, false);
        s.record_access(8, false);
        s.record_access(8, true);
        s.record_miss(false);

        let mut buf = Vec::new();
        s.write_report("D$", &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 8);
        assert_eq!(lines[0], "D$ Bytes Read:            16");
        assert_eq!(lines[6], "D$ Writebacks:            0");
        assert_eq!(lines[7], "D$ Miss Rate:             33.333%");
    }

    #[test]
    fn test_report_skipped_without_accesses() {
        let mut buf = Vec::new();
        CacheStats::default().write_report("L2$", &mut buf).unwrap();
        assert!(buf.is_empty());
    }
}
