//! Cache Simulator CLI.
//!
//! The main executable for the simulator. It builds a cache hierarchy,
//! replays an access trace through it, and prints per-level statistics.
//!
//! # Usage
//!
//! The hierarchy can be described in two ways:
//! 1. **Flag Mode**: `--ic`, `--dc` and `--l2` geometries build split L1
//!    caches in front of an optional shared L2 and main memory.
//! 2. **Config Mode**: `--config` loads an arbitrary hierarchy from TOML.

use clap::Parser;
use std::io::{self, Write};
use std::process;

extern crate cachesim;

use cachesim::config::{Config, Geometry, ReplacementPolicy, GEOMETRY_HELP};
use cachesim::sim::{self, logger};
use cachesim::soc::System;

/// Command-line arguments for the cache simulator.
#[derive(Parser, Debug)]
#[command(author, version, about = "Multi-Level Cache Simulator")]
struct Args {
    /// Trace file to replay, or `-` for standard input.
    trace: String,

    /// TOML hierarchy description; overrides the geometry flags.
    #[arg(short, long)]
    config: Option<String>,

    /// Instruction cache geometry, `sets:ways:blocksize`.
    #[arg(long)]
    ic: Option<String>,

    /// Data cache geometry, `sets:ways:blocksize`.
    #[arg(long)]
    dc: Option<String>,

    /// Shared L2 geometry, `sets:ways:blocksize`.
    #[arg(long)]
    l2: Option<String>,

    #[arg(long, value_enum, default_value_t = ReplacementPolicy::Random)]
    policy: ReplacementPolicy,

    /// Initial LFSR state for random replacement.
    #[arg(long, default_value_t = 1)]
    seed: u32,

    /// Log every cache miss to stderr.
    #[arg(long)]
    log_misses: bool,

    /// Print statistics as JSON.
    #[arg(long)]
    json: bool,

    /// Increase diagnostic output (repeatable).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Prints a configuration error with the geometry help text and exits.
fn config_fatal(err: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", err);
    eprintln!("{}", GEOMETRY_HELP);
    process::exit(1);
}

fn parse_geometry(flag: &Option<String>) -> Option<Geometry> {
    flag.as_deref()
        .map(|s| s.parse().unwrap_or_else(|e| config_fatal(e)))
}

/// Main entry point for the cache simulator.
///
/// # Behavior
///
/// 1. **Configuration**: Parses arguments and builds the `Config`, either
///    from TOML or from the geometry flags. Any invalid geometry is fatal.
/// 2. **Initialization**: Assembles the `System` (levels, links, ports).
/// 3. **Replay**: Streams the trace through the system in order.
/// 4. **Teardown**: Prints the statistics of every level and of memory.
fn main() {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::load(path).unwrap_or_else(|e| config_fatal(e)),
        None => {
            let ic = parse_geometry(&args.ic);
            let dc = parse_geometry(&args.dc);
            let l2 = parse_geometry(&args.l2);
            if ic.is_none() && dc.is_none() && l2.is_none() {
                config_fatal("no cache levels given (use --ic, --dc, --l2 or --config)");
            }
            Config::from_geometries(ic, dc, l2, args.policy, args.seed)
        }
    };
    config.general.log_misses |= args.log_misses;

    if let Err(e) = logger::init(logger::level_for(args.verbose, config.logs_misses())) {
        eprintln!("Warning: logger unavailable: {}", e);
    }

    let mut system = System::new(&config).unwrap_or_else(|e| config_fatal(e));

    let reader = sim::open_trace(&args.trace).unwrap_or_else(|e| {
        eprintln!("\n[!] FATAL: Could not read trace '{}': {}", args.trace, e);
        process::exit(1);
    });

    let summary = match sim::replay(&mut system, sim::read_trace(reader)) {
        Ok(summary) => summary,
        Err(e) => {
            eprintln!("\n[!] FATAL: {}", e);
            process::exit(1);
        }
    };
    log::info!(
        "replayed {} accesses ({} dropped), {} maintenance ops",
        summary.accesses,
        summary.dropped,
        summary.maintenance
    );

    let report = system.report();
    let mut out = io::stdout().lock();
    let written = if args.json {
        match report.to_json() {
            Ok(json) => writeln!(out, "{}", json),
            Err(e) => {
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        }
    } else {
        report.write_text(&mut out)
    };
    if let Err(e) = written.and_then(|_| out.flush()) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
