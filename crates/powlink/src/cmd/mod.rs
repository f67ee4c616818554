use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Subcommand};

use crate::exit::{CliError, CliResult, USAGE};
use crate::logging::{LogFormat, LogLevel};
use crate::output::OutputFormat;

pub mod info;
pub mod pow;
pub mod serve;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the broker daemon.
    Serve(ServeArgs),
    /// Probe a broker and print its version and engine identity.
    Info(InfoArgs),
    /// Submit one proof-of-work job and print the nonce.
    Pow(PowArgs),
    /// Show version information.
    Version(VersionArgs),
}

/// Log settings resolved from the global flags; `serve` additionally folds
/// in the configuration file's `log.level`.
#[derive(Debug, Clone, Copy)]
pub struct LogSettings {
    pub format: LogFormat,
    pub level: Option<LogLevel>,
}

pub fn run(command: Command, format: OutputFormat, log: LogSettings) -> CliResult<i32> {
    match command {
        Command::Serve(args) => serve::run(args, log),
        Command::Info(args) => info::run(args, format, log),
        Command::Pow(args) => pow::run(args, format, log),
        Command::Version(args) => version::run(args, log),
    }
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// TOML configuration file.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
    /// Local endpoint path (overrides config).
    #[arg(long, value_name = "PATH")]
    pub endpoint: Option<PathBuf>,
    /// Engine implementation selector (overrides config).
    #[arg(long, value_name = "TYPE")]
    pub engine: Option<String>,
    /// Difficulty ceiling per work request (overrides config).
    #[arg(long, value_name = "N")]
    pub max_difficulty: Option<u8>,
    /// Engine device path (overrides config).
    #[arg(long, value_name = "PATH")]
    pub device_path: Option<PathBuf>,
    /// Engine firmware file (overrides config).
    #[arg(long, value_name = "FILE")]
    pub firmware_file: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct InfoArgs {
    /// Broker endpoint: socket path, or URL for a remote bridge.
    pub endpoint: String,
    /// Receive timeout (e.g. 5s, 500ms).
    #[arg(long, default_value = "5s")]
    pub timeout: String,
}

#[derive(Args, Debug)]
pub struct PowArgs {
    /// Broker endpoint: socket path, or URL for a remote bridge.
    pub endpoint: String,
    /// Difficulty (minimum weight magnitude).
    #[arg(long, short = 'm', default_value = "14")]
    pub mwm: u8,
    /// Tryte input string.
    #[arg(long, conflicts_with = "file")]
    pub trytes: Option<String>,
    /// Read the tryte input from a file.
    #[arg(long, conflicts_with = "trytes")]
    pub file: Option<PathBuf>,
    /// Receive timeout (e.g. 60s).
    #[arg(long, default_value = "60s")]
    pub timeout: String,
}

#[derive(Args, Debug, Default)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

pub(crate) fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "s")
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        "s" => Ok(Duration::from_secs(value)),
        _ => Err(CliError::new(
            USAGE,
            format!("unsupported duration unit: {unit}"),
        )),
    }
}
