//! Command implementations for the Pylontech exporter CLI
//!
//! This module wires configuration, logging, the console source, the metrics
//! registry and the scheduler together for each subcommand.

use crate::app::services::console_parser::{parse_battery_lines, parse_power_lines};
use crate::app::services::console_source::HttpConsoleSource;
use crate::app::services::metrics::ExporterMetrics;
use crate::app::services::metrics_server::start_metrics_server;
use crate::app::services::scrape::Scraper;
use crate::cli::args::{Args, Commands, DumpKind, LogArgs, ParseArgs, ScrapeOnceArgs, ServeArgs};
use crate::{Error, RecordKind, Result};
use serde::Serialize;
use std::path::Path;
use tokio::io::AsyncReadExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Main command runner
///
/// Cancelling `shutdown` stops `serve` gracefully and interrupts the
/// one-shot commands.
pub async fn run(args: Args, shutdown: CancellationToken) -> Result<()> {
    let Some(command) = args.command else {
        return Err(Error::configuration("No command given"));
    };

    setup_logging(command.log_args())?;
    debug!("Command line arguments: {:?}", command);

    match command {
        Commands::Serve(serve) => run_serve(serve, shutdown).await,
        Commands::Parse(parse) => run_parse(parse, shutdown).await,
        Commands::ScrapeOnce(scrape) => run_scrape_once(scrape, shutdown).await,
    }
}

/// Set up structured logging to stderr
///
/// `RUST_LOG` wins over the verbosity flags.
fn setup_logging(log: &LogArgs) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = log.get_log_level();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("pylontech_exporter={}", log_level)));

    let result = if log.quiet {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr),
            )
            .try_init()
    };
    result.map_err(|e| Error::configuration(format!("Failed to initialize logging: {}", e)))?;

    debug!("Logging initialized at level: {}", log_level);
    Ok(())
}

/// Serve /metrics and scrape the device until shutdown
async fn run_serve(args: ServeArgs, shutdown: CancellationToken) -> Result<()> {
    let config = args.to_config();
    config.validate()?;

    info!(
        "Starting Pylontech exporter for {}:{} (refresh {}s)",
        config.device_ip, config.device_port, config.refresh_secs
    );

    let metrics = ExporterMetrics::new(&config.namespace)?;
    let source = HttpConsoleSource::from_config(&config)?;
    let server = start_metrics_server(config.metrics_port, metrics.clone(), shutdown.clone())?;

    let scraper = Scraper::new(source, &config).with_metrics(metrics);
    scraper.run(config.refresh_interval(), shutdown.clone()).await;

    // The scheduler only returns once shutdown is cancelled
    shutdown.cancel();
    server
        .await
        .map_err(|e| Error::server(format!("Metrics server task failed: {}", e)))?;

    info!("Exporter stopped");
    Ok(())
}

/// Run one scrape cycle and print its report
async fn run_scrape_once(args: ScrapeOnceArgs, shutdown: CancellationToken) -> Result<()> {
    let config = args.to_config();
    config.validate()?;

    let source = HttpConsoleSource::from_config(&config)?;
    let scraper = Scraper::new(source, &config);

    let report = tokio::select! {
        report = scraper.run_cycle() => report,
        _ = shutdown.cancelled() => {
            return Err(Error::processing_interrupted("Scrape interrupted by user"));
        }
    };

    if report.power_fetch_failed {
        warn!("Power table could not be fetched from {}", config.device_ip);
    }

    println!("{}", to_json(&report, args.compact)?);
    Ok(())
}

/// Parse a captured dump and print records plus diagnostics
async fn run_parse(args: ParseArgs, shutdown: CancellationToken) -> Result<()> {
    args.validate()?;

    let text = tokio::select! {
        text = read_input(args.file.as_deref()) => text?,
        _ = shutdown.cancelled() => {
            return Err(Error::processing_interrupted("Parse interrupted by user"));
        }
    };

    println!("{}", render_dump(args.kind, &text, args.compact)?);
    Ok(())
}

/// Read a dump from a file, or stdin when no path is given
async fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .map_err(|e| Error::io(format!("Failed to read {}", path.display()), e)),
        None => {
            let mut text = String::new();
            tokio::io::stdin()
                .read_to_string(&mut text)
                .await
                .map_err(|e| Error::io("Failed to read stdin", e))?;
            Ok(text)
        }
    }
}

#[derive(Serialize)]
struct DumpOutput<T: Serialize> {
    kind: RecordKind,
    #[serde(flatten)]
    result: T,
}

/// Parse dump text as `kind` and render it as JSON
///
/// Line numbers in the diagnostics refer to lines of `text`.
pub fn render_dump(kind: DumpKind, text: &str, compact: bool) -> Result<String> {
    let lines: Vec<&str> = text.lines().collect();

    match kind {
        DumpKind::Battery => {
            let result = parse_battery_lines(&lines);
            info!("{}", result.stats.summary());
            to_json(
                &DumpOutput {
                    kind: kind.into(),
                    result,
                },
                compact,
            )
        }
        DumpKind::Power => {
            let result = parse_power_lines(&lines);
            info!("{}", result.stats.summary());
            to_json(
                &DumpOutput {
                    kind: kind.into(),
                    result,
                },
                compact,
            )
        }
    }
}

fn to_json<T: Serialize>(value: &T, compact: bool) -> Result<String> {
    let json = if compact {
        serde_json::to_string(value)
    } else {
        serde_json::to_string_pretty(value)
    };
    json.map_err(|e| Error::io("Failed to serialize output", e.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const BATTERY_DUMP: &str = "bat\n\
        @\n\
        Battery  Volt     Curr     Tempr    Base State   Volt. State  Curr. State  Temp. State  SOC          Coulomb      BAL\n\
        0        3312     0        250      Idle         Normal       Normal       Normal       87%          43500 mAH    N\n\
        1        3311     0        250      Idle         Normal       Normal       Normal       87%          43500 mAH    N\n\
        2        3310     0\n\
        $$\n\
        pylon>\n";

    #[tokio::test]
    async fn test_read_input_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", BATTERY_DUMP).unwrap();

        let text = read_input(Some(file.path())).await.unwrap();
        assert_eq!(text, BATTERY_DUMP);
    }

    #[tokio::test]
    async fn test_read_input_missing_file() {
        let err = read_input(Some(Path::new("/nonexistent/dump.txt")))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn test_render_battery_dump() {
        let json = render_dump(DumpKind::Battery, BATTERY_DUMP, true).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["kind"], "battery");
        assert_eq!(value["records"].as_array().unwrap().len(), 2);
        assert_eq!(value["records"][1]["volt"], 3311);
        assert_eq!(value["stats"]["skipped_structural"], 1);

        let structural = value["stats"]["diagnostics"]
            .as_array()
            .unwrap()
            .iter()
            .find(|d| d["kind"] == "structural")
            .unwrap();
        assert_eq!(structural["line_number"], 6);
    }

    #[test]
    fn test_render_power_dump_with_only_noise() {
        let json = render_dump(DumpKind::Power, "pwr\n@\n1 - - - Absent\npylon>", false).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["kind"], "power");
        assert!(value["records"].as_array().unwrap().is_empty());
        assert_eq!(value["stats"]["empty_batch_warning"], false);
    }
}
