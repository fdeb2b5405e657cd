//! Trace Replay.
//!
//! Drives a [`System`] with trace operations in strict program order. Every
//! operation completes, including all forwarding down the hierarchy, before
//! the next one is applied.

use super::loader::TraceOp;
use crate::common::TraceError;
use crate::soc::System;

/// Counts of what a replay did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    /// Accesses delivered to a configured port.
    pub accesses: u64,
    /// Accesses whose port is not configured.
    pub dropped: u64,
    /// Clean/invalidate operations.
    pub maintenance: u64,
}

/// Replays `ops` into `system`, stopping at the first trace error.
pub fn replay<I>(system: &mut System, ops: I) -> Result<ReplaySummary, TraceError>
where
    I: IntoIterator<Item = Result<TraceOp, TraceError>>,
{
    let mut summary = ReplaySummary::default();
    for op in ops {
        match op? {
            TraceOp::Access { kind, addr, bytes } => match system.access(kind, addr, bytes) {
                Some(_) => summary.accesses += 1,
                None => summary.dropped += 1,
            },
            TraceOp::CleanInvalidate {
                addr,
                bytes,
                clean,
                inval,
            } => {
                system.clean_invalidate(addr, bytes, clean, inval);
                summary.maintenance += 1;
            }
        }
    }
    Ok(summary)
}
