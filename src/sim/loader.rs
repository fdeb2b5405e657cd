//! Access Trace Loader.
//!
//! Reads the text traces replayed by the simulator. Each non-empty line is
//! one operation:
//!
//! ```text
//! # op     address     [bytes]
//! r        0x80001000  4        load
//! w        0x80001008  8        store
//! x        0x80000000  4        instruction fetch
//! clean    0x80001000  64       write back dirty lines
//! inval    0x80001000  64       drop lines
//! flush    0x80001000  64       clean, then drop
//! ```
//!
//! Addresses are hexadecimal with a `0x` prefix or decimal. The byte count
//! defaults to 8. Anything after a `#` is ignored.

use std::fs::File;
use std::io::{self, BufRead, BufReader};

use crate::common::constants::DEFAULT_ACCESS_BYTES;
use crate::common::{AccessType, TraceError};

/// One replayable trace operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TraceOp {
    Access {
        kind: AccessType,
        addr: u64,
        bytes: usize,
    },
    CleanInvalidate {
        addr: u64,
        bytes: usize,
        clean: bool,
        inval: bool,
    },
}

/// Opens a trace file, or standard input for `-`.
pub fn open_trace(path: &str) -> Result<Box<dyn BufRead>, TraceError> {
    if path == "-" {
        return Ok(Box::new(BufReader::new(io::stdin())));
    }
    Ok(Box::new(BufReader::new(File::open(path)?)))
}

/// Parses a trace lazily, yielding operations in file order.
pub fn read_trace<R: BufRead>(reader: R) -> impl Iterator<Item = Result<TraceOp, TraceError>> {
    reader
        .lines()
        .enumerate()
        .filter_map(|(i, line)| match line {
            Ok(line) => parse_line(&line, i + 1).transpose(),
            Err(e) => Some(Err(TraceError::Io(e))),
        })
}

/// Parses a single trace line. Blank and comment-only lines yield `None`.
pub fn parse_line(line: &str, line_no: usize) -> Result<Option<TraceOp>, TraceError> {
    let content = line.split('#').next().unwrap_or("");
    let mut fields = content.split_whitespace();
    let Some(op) = fields.next() else {
        return Ok(None);
    };

    let err = |msg: String| TraceError::Parse { line: line_no, msg };

    let addr = fields
        .next()
        .ok_or_else(|| err(format!("missing address for '{}'", op)))
        .and_then(|a| parse_number(a).ok_or_else(|| err(format!("bad address '{}'", a))))?;

    let bytes = match fields.next() {
        Some(b) => parse_number(b)
            .and_then(|n| usize::try_from(n).ok())
            .ok_or_else(|| err(format!("bad byte count '{}'", b)))?,
        None => DEFAULT_ACCESS_BYTES,
    };

    if let Some(extra) = fields.next() {
        return Err(err(format!("unexpected field '{}'", extra)));
    }

    let access = |kind| TraceOp::Access { kind, addr, bytes };
    let maintenance = |clean, inval| TraceOp::CleanInvalidate {
        addr,
        bytes,
        clean,
        inval,
    };

    let parsed = match op.to_ascii_lowercase().as_str() {
        "r" | "load" => access(AccessType::Read),
        "w" | "store" => access(AccessType::Write),
        "x" | "fetch" => access(AccessType::Fetch),
        "clean" => maintenance(true, false),
        "inval" => maintenance(false, true),
        "flush" => maintenance(true, true),
        _ => return Err(err(format!("unknown operation '{}'", op))),
    };
    Ok(Some(parsed))
}

fn parse_number(s: &str) -> Option<u64> {
    match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => s.parse().ok(),
    }
}
