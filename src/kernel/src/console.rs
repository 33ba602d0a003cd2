//! Console logging with colored status indicators.
//!
//! Every keyword reports through the `log` facade. The `rtsim` binary installs
//! [`ConsoleLogger`], which prints boot-style status brackets to stderr.

use std::io::Write;

use log::{Level, LevelFilter, Log, Metadata, Record};
use rtsim_common::{Result, SimError};

/// Status indicators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Success - `[ OK ]` in green
    Ok,
    /// Failure - `[FAIL]` in red
    Fail,
    /// Warning - `[WARN]` in yellow
    Warn,
    /// Informational - `[INFO]` in cyan
    Info,
    /// Detail - `[ .. ]` uncolored
    Detail,
}

impl Status {
    /// Status used for a log record of `level`.
    pub fn for_level(level: Level) -> Self {
        match level {
            Level::Error => Status::Fail,
            Level::Warn => Status::Warn,
            Level::Info => Status::Ok,
            Level::Debug => Status::Info,
            Level::Trace => Status::Detail,
        }
    }

    fn text(self) -> &'static str {
        match self {
            Status::Ok => "[ OK ]",
            Status::Fail => "[FAIL]",
            Status::Warn => "[WARN]",
            Status::Info => "[INFO]",
            Status::Detail => "[ .. ]",
        }
    }

    fn color(self) -> &'static str {
        match self {
            Status::Ok => "\x1b[92m",
            Status::Fail => "\x1b[91m",
            Status::Warn => "\x1b[93m",
            Status::Info => "\x1b[96m",
            Status::Detail => "",
        }
    }
}

/// Format one status line: `[ OK ] Message text`.
pub fn format_line(status: Status, message: &str, color: bool) -> String {
    if color && !status.color().is_empty() {
        format!("{}{}\x1b[0m {}", status.color(), status.text(), message)
    } else {
        format!("{} {}", status.text(), message)
    }
}

/// `log` backend writing status lines to stderr.
pub struct ConsoleLogger {
    level: LevelFilter,
    color: bool,
}

impl ConsoleLogger {
    /// Create a logger that passes records up to `level`.
    pub fn new(level: LevelFilter, color: bool) -> Self {
        Self { level, color }
    }
}

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format_line(
            Status::for_level(record.level()),
            &record.args().to_string(),
            self.color,
        );
        let _ = writeln!(std::io::stderr().lock(), "{}", line);
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

/// Install [`ConsoleLogger`] as the global logger.
pub fn init(level: LevelFilter, color: bool) -> Result<()> {
    log::set_boxed_logger(Box::new(ConsoleLogger::new(level, color)))
        .map_err(|e| SimError::InvalidArgument(e.to_string()))?;
    log::set_max_level(level);
    Ok(())
}

/// Print a status line to stdout.
pub fn report(status: Status, message: &str) {
    println!("{}", format_line(status, message, false));
}
