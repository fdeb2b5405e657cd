//! Stderr log sink for the command-line simulator.
//!
//! Library code only emits records through the `log` facade; the binary
//! installs this logger so that miss logs and diagnostics reach the error
//! stream without disturbing the statistics printed on stdout.

use std::io::Write;

use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};

struct StderrLogger;

static LOGGER: StderrLogger = StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let mut err = std::io::stderr().lock();
        writeln!(err, "[{:<5}] {}", record.level(), record.args()).ok();
    }

    fn flush(&self) {
        std::io::stderr().flush().ok();
    }
}

/// Installs the stderr logger with the given maximum level.
///
/// Fails if another logger was installed first.
pub fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
    log::set_logger(&LOGGER)?;
    log::set_max_level(level);
    Ok(())
}

/// Maps a `-v` repetition count to a level filter.
///
/// Miss logging needs at least `Info`, so it raises the floor.
pub fn level_for(verbosity: u8, log_misses: bool) -> LevelFilter {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    if log_misses {
        level.max(LevelFilter::Info)
    } else {
        level
    }
}
