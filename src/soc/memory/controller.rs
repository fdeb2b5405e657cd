//! Main Memory Controller.
//!
//! This module defines the `MemoryController` trait for the terminal target
//! of a cache hierarchy, and [`MainMemory`], which simply counts the line
//! traffic that reaches it. No latency is modeled.

use std::io::{self, Write};

use serde::Serialize;

/// Traffic counters of the backing memory.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MemoryStats {
    pub reads: u64,
    pub writes: u64,
    pub bytes_read: u64,
    pub bytes_written: u64,
}

impl MemoryStats {
    /// Writes the memory traffic block. Nothing is written if no request
    /// reached memory.
    pub fn write_report(&self, out: &mut dyn Write) -> io::Result<()> {
        if self.reads + self.writes == 0 {
            return Ok(());
        }
        writeln!(out, "Memory {:<23}{}", "Reads:", self.reads)?;
        writeln!(out, "Memory {:<23}{}", "Writes:", self.writes)?;
        writeln!(out, "Memory {:<23}{}", "Bytes Read:", self.bytes_read)?;
        writeln!(out, "Memory {:<23}{}", "Bytes Written:", self.bytes_written)
    }
}

/// Trait for the memory behind the last cache level.
pub trait MemoryController {
    /// Handles a line fill (`store == false`) or a writeback (`store == true`).
    ///
    /// # Arguments
    ///
    /// * `addr` - Line-aligned physical address.
    /// * `bytes` - Transfer size, normally the line size of the caller.
    /// * `store` - Whether data is written to memory.
    fn access(&mut self, addr: u64, bytes: usize, store: bool);

    /// Receives a clean/invalidate request that fell through every level.
    ///
    /// Memory holds no cached copies, so the default does nothing.
    fn clean_invalidate(&mut self, _addr: u64, _bytes: usize, _clean: bool, _inval: bool) {}

    /// Returns the traffic seen so far.
    fn stats(&self) -> MemoryStats;

    fn reset_stats(&mut self);
}

/// Ideal main memory that accepts every request and counts it.
#[derive(Debug, Default)]
pub struct MainMemory {
    stats: MemoryStats,
}

impl MainMemory {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MemoryController for MainMemory {
    fn access(&mut self, _addr: u64, bytes: usize, store: bool) {
        if store {
            self.stats.writes += 1;
            self.stats.bytes_written += bytes as u64;
        } else {
            self.stats.reads += 1;
            self.stats.bytes_read += bytes as u64;
        }
    }

    fn stats(&self) -> MemoryStats {
        self.stats
    }

    fn reset_stats(&mut self) {
        self.stats = MemoryStats::default();
    }
}
