mod config;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::mpsc;

use anyhow::Context;
use clap::Parser;
use log::LevelFilter;
use pairfetch_engine::PairFetchHandle;
use pairfetch_logging::{pf_error, LogDestination};

use crate::config::AppConfig;

/// Fetch two resources concurrently and print them as a pair.
#[derive(Debug, Parser)]
#[command(name = "pairfetch", version)]
struct Cli {
    /// Parameter passed along with the first resource request.
    #[arg(long, default_value_t = 1)]
    param: i64,

    /// Optional RON configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Also write logs to ./pairfetch.log.
    #[arg(long)]
    log_file: bool,

    /// Write logs to ./pairfetch.log and keep the terminal for the result.
    #[arg(long, conflicts_with = "log_file")]
    log_file_only: bool,

    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn log_destination(&self) -> LogDestination {
        if self.log_file_only {
            LogDestination::default_file()
        } else if self.log_file {
            LogDestination::default_both()
        } else {
            LogDestination::Terminal
        }
    }

    fn log_level(&self) -> LevelFilter {
        if self.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(err) = pairfetch_logging::initialize(&cli.log_destination(), cli.log_level()) {
        eprintln!("Warning: {err}");
    }

    match run(cli) {
        Ok((first, second)) => {
            println!("\n****************************");
            println!("{first}\n{second}");
            println!("****************************");
            ExitCode::SUCCESS
        }
        Err(err) => {
            pf_error!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<(String, String)> {
    let config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };

    let runtime = tokio::runtime::Runtime::new().context("failed to start tokio runtime")?;
    let engine = PairFetchHandle::new(config.into_settings(), runtime.handle().clone())?;

    let (tx, rx) = mpsc::channel();
    let _subscription = engine.start_paired_fetch(cli.param, move |outcome| {
        let _ = tx.send(outcome);
    });

    let outcome = rx.recv().context("paired fetch ended without a result")?;
    Ok(outcome?)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use clap::Parser;
    use log::LevelFilter;
    use pairfetch_logging::{LogDestination, LOG_FILE};
    use pretty_assertions::assert_eq;

    use super::Cli;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("pairfetch").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn logs_go_to_the_terminal_by_default() {
        let cli = parse(&[]);
        assert_eq!(cli.log_destination(), LogDestination::Terminal);
        assert_eq!(cli.log_level(), LevelFilter::Info);
        assert_eq!(cli.param, 1);
    }

    #[test]
    fn log_file_adds_the_file() {
        let cli = parse(&["--log-file", "-v"]);
        assert_eq!(cli.log_destination(), LogDestination::Both(PathBuf::from(LOG_FILE)));
        assert_eq!(cli.log_level(), LevelFilter::Debug);
    }

    #[test]
    fn log_file_only_drops_the_terminal() {
        let cli = parse(&["--log-file-only", "--param", "9"]);
        assert_eq!(cli.log_destination(), LogDestination::File(PathBuf::from(LOG_FILE)));
        assert_eq!(cli.param, 9);
    }

    #[test]
    fn log_file_flags_conflict() {
        let result = Cli::try_parse_from(["pairfetch", "--log-file", "--log-file-only"]);
        assert!(result.is_err());
    }
}
