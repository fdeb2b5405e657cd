//! Memory Access Types.
//!
//! This module defines the classification of memory accesses fed to the
//! simulator. The classification decides which entry level of the hierarchy
//! sees an access and whether the access counts as a read or a write there.

/// Type of memory access operation.
///
/// Used to distinguish between instruction fetches, data reads,
/// and data writes so that the hierarchy can route fetches to the
/// instruction cache and data accesses to the data cache.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessType {
    /// Instruction fetch access.
    ///
    /// Routed to the instruction cache port and counted as a read.
    Fetch,

    /// Data read access.
    ///
    /// Routed to the data cache port.
    Read,

    /// Data write access.
    ///
    /// Routed to the data cache port. Marks the touched line dirty.
    Write,
}

impl AccessType {
    /// Returns `true` if the access modifies memory.
    pub fn is_store(self) -> bool {
        matches!(self, AccessType::Write)
    }

    /// Returns `true` if the access is an instruction fetch.
    pub fn is_fetch(self) -> bool {
        matches!(self, AccessType::Fetch)
    }
}
