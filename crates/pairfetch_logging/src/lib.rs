#![deny(missing_docs)]
//! Shared logging utilities for the pairfetch workspace.
//!
//! This crate provides the `pf_*` logging macros used across the codebase,
//! the logger setup used by the binary, and a minimal test initializer.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use log::LevelFilter;
use simplelog::{
    ColorChoice, CombinedLogger, Config, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};

/// Default log file path used by the binary.
pub const LOG_FILE: &str = "./pairfetch.log";

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! pf_trace {
    ($($arg:tt)*) => {{
        log::trace!($($arg)*);
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! pf_debug {
    ($($arg:tt)*) => {{
        log::debug!($($arg)*);
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! pf_info {
    ($($arg:tt)*) => {{
        log::info!($($arg)*);
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! pf_warn {
    ($($arg:tt)*) => {{
        log::warn!($($arg)*);
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! pf_error {
    ($($arg:tt)*) => {{
        log::error!($($arg)*);
    }};
}

/// Where log records go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogDestination {
    /// Terminal only (stderr).
    Terminal,
    /// The given file only; it is truncated on start.
    File(PathBuf),
    /// Terminal plus the given file.
    Both(PathBuf),
}

impl LogDestination {
    /// File destination at the default [`LOG_FILE`] path.
    pub fn default_file() -> Self {
        Self::File(PathBuf::from(LOG_FILE))
    }

    /// Terminal plus the default [`LOG_FILE`] path.
    pub fn default_both() -> Self {
        Self::Both(PathBuf::from(LOG_FILE))
    }

    fn file(&self) -> Option<&Path> {
        match self {
            Self::Terminal => None,
            Self::File(path) | Self::Both(path) => Some(path),
        }
    }

    fn to_terminal(&self) -> bool {
        !matches!(self, Self::File(_))
    }
}

/// Installs the global logger.
///
/// Fails when the log file cannot be created. With [`LogDestination::Both`]
/// the terminal logger is still installed before the error is returned.
/// A logger that is already installed is left in place.
pub fn initialize(destination: &LogDestination, level: LevelFilter) -> io::Result<()> {
    let (loggers, file_error) = build_loggers(destination, level);
    if !loggers.is_empty() {
        let _ = CombinedLogger::init(loggers);
    }
    match file_error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Initializes a simple terminal logger for use in tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    let level = if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}

fn build_loggers(
    destination: &LogDestination,
    level: LevelFilter,
) -> (Vec<Box<dyn SharedLogger>>, Option<io::Error>) {
    let config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Error)
        .build();

    let mut loggers: Vec<Box<dyn SharedLogger>> = Vec::new();
    if destination.to_terminal() {
        loggers.push(TermLogger::new(
            level,
            config.clone(),
            TerminalMode::Stderr,
            ColorChoice::Auto,
        ));
    }

    let mut file_error = None;
    if let Some(path) = destination.file() {
        match File::create(path) {
            Ok(file) => loggers.push(WriteLogger::new(level, config, file)),
            Err(err) => {
                file_error = Some(io::Error::new(
                    err.kind(),
                    format!("cannot create log file {}: {err}", path.display()),
                ));
            }
        }
    }
    (loggers, file_error)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_only_creates_the_file_and_skips_the_terminal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.log");

        let (loggers, error) = build_loggers(&LogDestination::File(path.clone()), LevelFilter::Info);
        assert!(error.is_none());
        assert_eq!(loggers.len(), 1);
        assert!(path.exists());
    }

    #[test]
    fn both_keeps_the_terminal_when_the_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("run.log");

        let (loggers, error) = build_loggers(&LogDestination::Both(path), LevelFilter::Info);
        assert_eq!(loggers.len(), 1);
        let error = error.unwrap();
        assert_eq!(error.kind(), io::ErrorKind::NotFound);
        assert!(error.to_string().contains("run.log"));
    }

    #[test]
    fn terminal_writes_no_file() {
        let destination = LogDestination::Terminal;
        assert!(destination.file().is_none());
        let (loggers, error) = build_loggers(&destination, LevelFilter::Debug);
        assert!(error.is_none());
        assert_eq!(loggers.len(), 1);
    }
}
