//! Command-line argument definitions for the Pylontech exporter
//!
//! Every exporter setting can also come from the environment, which is how
//! the exporter is usually deployed next to the device.

use crate::config::{Config, UnitNaming};
use crate::constants::{
    DEFAULT_BAT_COMMAND_FORMAT, DEFAULT_BAT_LABEL_FORMAT, DEFAULT_DEVICE_PORT,
    DEFAULT_METRICS_PORT, DEFAULT_NAMESPACE, DEFAULT_POWER_COMMAND, DEFAULT_REFRESH_SECS,
    DEFAULT_REQUEST_TIMEOUT_SECS,
};
use crate::{Error, RecordKind, Result};
use clap::builder::BoolishValueParser;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// CLI arguments for the Pylontech exporter
#[derive(Debug, Clone, Parser)]
#[command(
    name = "pylontech-exporter",
    version,
    about = "Export Pylontech battery console status as Prometheus metrics",
    long_about = "Polls the `pwr` and `bat` tables of a Pylontech battery-management console \
                  through its HTTP bridge, parses the whitespace-delimited dumps into typed \
                  records, and serves them as Prometheus gauges on /metrics."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Poll the device periodically and serve /metrics
    Serve(ServeArgs),
    /// Parse a captured console dump offline and print JSON
    Parse(ParseArgs),
    /// Run a single scrape cycle against the device and print JSON
    ScrapeOnce(ScrapeOnceArgs),
}

/// Logging flags shared by every subcommand
#[derive(Debug, Clone, Default, clap::Args)]
pub struct LogArgs {
    /// Enable debug logging
    ///
    /// `LOG_VERBOSE` accepts true/false, yes/no, on/off or 1/0 in any case.
    #[arg(
        short = 'v',
        long = "verbose",
        env = "LOG_VERBOSE",
        value_parser = BoolishValueParser::new()
    )]
    pub verbose: bool,

    /// Only log errors; overrides verbose
    #[arg(short = 'q', long = "quiet")]
    pub quiet: bool,
}

impl LogArgs {
    /// Determine the log level from the verbosity flags
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else if self.verbose {
            "debug"
        } else {
            "info"
        }
    }
}

/// Device connection and naming settings
#[derive(Debug, Clone, clap::Args)]
pub struct DeviceArgs {
    /// Host name or address of the console's HTTP bridge
    #[arg(long = "device-ip", env = "DEVICE_IP", value_name = "HOST")]
    pub device_ip: Option<String>,

    /// HTTP port of the console's bridge
    #[arg(long = "device-port", env = "DEVICE_PORT", default_value_t = DEFAULT_DEVICE_PORT)]
    pub device_port: u16,

    /// Per-request timeout in seconds
    #[arg(
        long = "request-timeout",
        env = "REQUEST_TIMEOUT_SECONDS",
        value_name = "SECONDS",
        default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS
    )]
    pub request_timeout_secs: u64,

    /// Prometheus namespace prefixed to every metric
    #[arg(long = "namespace", env = "PROM_NAMESPACE", default_value = DEFAULT_NAMESPACE)]
    pub namespace: String,

    /// Console command returning the power-supply table
    #[arg(long = "power-command", env = "POWER_COMMAND", default_value = DEFAULT_POWER_COMMAND)]
    pub power_command: String,

    /// Console command per battery unit; `{unit}` is replaced by the unit number
    #[arg(
        long = "bat-command-format",
        env = "BAT_COMMAND_FORMAT",
        value_name = "FORMAT",
        default_value = DEFAULT_BAT_COMMAND_FORMAT
    )]
    pub bat_command_format: String,

    /// Metric label per battery unit; `{unit}` is replaced by the unit number
    #[arg(
        long = "bat-label-format",
        env = "BAT_LABEL_FORMAT",
        value_name = "FORMAT",
        default_value = DEFAULT_BAT_LABEL_FORMAT
    )]
    pub bat_label_format: String,
}

impl DeviceArgs {
    /// Build a configuration carrying these device settings
    pub fn to_config(&self) -> Config {
        Config {
            device_ip: self.device_ip.clone().unwrap_or_default(),
            device_port: self.device_port,
            request_timeout_secs: self.request_timeout_secs,
            namespace: self.namespace.clone(),
            power_command: self.power_command.clone(),
            unit_naming: UnitNaming {
                command_format: self.bat_command_format.clone(),
                label_format: self.bat_label_format.clone(),
            },
            ..Config::default()
        }
    }
}

/// Arguments for the serve command
#[derive(Debug, Clone, Parser)]
pub struct ServeArgs {
    #[command(flatten)]
    pub device: DeviceArgs,

    /// Port the /metrics endpoint listens on
    #[arg(long = "port", env = "PORT", default_value_t = DEFAULT_METRICS_PORT)]
    pub port: u16,

    /// Seconds between scrape cycles
    #[arg(
        long = "refresh",
        env = "REFRESH_SECONDS",
        value_name = "SECONDS",
        default_value_t = DEFAULT_REFRESH_SECS
    )]
    pub refresh_secs: u64,

    #[command(flatten)]
    pub log: LogArgs,
}

impl ServeArgs {
    pub fn to_config(&self) -> Config {
        Config {
            metrics_port: self.port,
            refresh_secs: self.refresh_secs,
            ..self.device.to_config()
        }
    }
}

/// Arguments for the scrape-once command
#[derive(Debug, Clone, Parser)]
pub struct ScrapeOnceArgs {
    #[command(flatten)]
    pub device: DeviceArgs,

    /// Print compact JSON instead of pretty-printed
    #[arg(long = "compact")]
    pub compact: bool,

    #[command(flatten)]
    pub log: LogArgs,
}

impl ScrapeOnceArgs {
    pub fn to_config(&self) -> Config {
        self.device.to_config()
    }
}

/// Which console table a dump holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DumpKind {
    /// Per-cell `bat` table
    Battery,
    /// Per-unit `pwr` table
    Power,
}

impl From<DumpKind> for RecordKind {
    fn from(kind: DumpKind) -> Self {
        match kind {
            DumpKind::Battery => RecordKind::Battery,
            DumpKind::Power => RecordKind::Power,
        }
    }
}

/// Arguments for the parse command
#[derive(Debug, Clone, Parser)]
pub struct ParseArgs {
    /// Table layout of the dump
    #[arg(short = 'k', long = "kind", value_enum)]
    pub kind: DumpKind,

    /// File holding the captured console output; stdin when omitted
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Print compact JSON instead of pretty-printed
    #[arg(long = "compact")]
    pub compact: bool,

    #[command(flatten)]
    pub log: LogArgs,
}

impl ParseArgs {
    /// Validate the parse command arguments
    pub fn validate(&self) -> Result<()> {
        if let Some(file) = &self.file {
            if !file.is_file() {
                return Err(Error::configuration(format!(
                    "Input file does not exist: {}",
                    file.display()
                )));
            }
        }
        Ok(())
    }
}

impl Commands {
    /// Logging flags of whichever subcommand was chosen
    pub fn log_args(&self) -> &LogArgs {
        match self {
            Commands::Serve(args) => &args.log,
            Commands::Parse(args) => &args.log,
            Commands::ScrapeOnce(args) => &args.log,
        }
    }
}
