//! Scrape cycle orchestration
//!
//! One cycle fetches the power table, takes its record count as the number
//! of battery units, then fetches and parses each unit's cell table. Parsing
//! is independent per unit and per cycle; nothing is carried between cycles.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::console_parser::{ParseStats, parse_battery_lines, parse_power_lines};
use super::console_source::ConsoleSource;
use super::metrics::{ExporterMetrics, fetch_error_type};
use crate::app::models::{BatteryRecord, PowerRecord, RecordKind};
use crate::config::{Config, UnitNaming};
use crate::constants::POWER_UNIT_LABEL;

/// Parsed cell table of one battery unit
#[derive(Debug, Clone, Serialize)]
pub struct UnitReport {
    pub unit: usize,
    pub label: String,
    pub command: String,
    pub records: Vec<BatteryRecord>,
    pub stats: ParseStats,
}

/// Outcome of one scrape cycle
#[derive(Debug, Clone, Serialize)]
pub struct ScrapeReport {
    pub started_at: DateTime<Utc>,
    pub power_records: Vec<PowerRecord>,
    pub power_stats: Option<ParseStats>,
    pub units: Vec<UnitReport>,
    /// Labels of units whose fetch failed
    pub failed_units: Vec<String>,
    /// Set when the power table itself could not be fetched
    pub power_fetch_failed: bool,
}

impl ScrapeReport {
    fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            power_records: Vec::new(),
            power_stats: None,
            units: Vec::new(),
            failed_units: Vec::new(),
            power_fetch_failed: false,
        }
    }

    pub fn battery_record_count(&self) -> usize {
        self.units.iter().map(|u| u.records.len()).sum()
    }

    /// Whether the cycle produced anything worth publishing
    pub fn has_records(&self) -> bool {
        !self.power_records.is_empty() || self.battery_record_count() > 0
    }
}

/// Runs scrape cycles against a console source
pub struct Scraper<S> {
    source: S,
    metrics: Option<ExporterMetrics>,
    power_command: String,
    unit_naming: UnitNaming,
}

impl<S: ConsoleSource> Scraper<S> {
    pub fn new(source: S, config: &Config) -> Self {
        Self {
            source,
            metrics: None,
            power_command: config.power_command.clone(),
            unit_naming: config.unit_naming.clone(),
        }
    }

    /// Publish each cycle's records and diagnostics to `metrics`
    pub fn with_metrics(mut self, metrics: ExporterMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Run one fetch, parse and publish cycle
    pub async fn run_cycle(&self) -> ScrapeReport {
        let mut report = ScrapeReport::new(Utc::now());
        debug!("Fetching and processing device data...");

        self.process_power(&mut report).await;
        let unit_count = report.power_records.len();

        if unit_count == 0 {
            info!("No power units available; skipping battery tables");
        } else {
            for unit in 1..=unit_count {
                self.process_battery_unit(unit, &mut report).await;
            }
            if report.units.is_empty() {
                warn!("Attempted to process BAT data, but no units were successfully fetched");
            }
        }

        if report.has_records() {
            if let Some(metrics) = &self.metrics {
                metrics.mark_success(report.started_at);
            }
        }

        debug!(
            "Cycle complete: {} power record(s), {} battery record(s) across {} unit(s)",
            report.power_records.len(),
            report.battery_record_count(),
            report.units.len()
        );
        report
    }

    async fn process_power(&self, report: &mut ScrapeReport) {
        let lines = match self.source.fetch_lines(&self.power_command).await {
            Ok(lines) => lines,
            Err(e) => {
                error!("Error fetching PWR data: {}", e);
                self.record_error(&fetch_error_type(RecordKind::Power), POWER_UNIT_LABEL);
                report.power_fetch_failed = true;
                return;
            }
        };

        let result = parse_power_lines(&lines);
        if result.is_empty() {
            info!("No PWR data parsed");
        }

        if let Some(metrics) = &self.metrics {
            metrics.record_parse_diagnostics(RecordKind::Power, POWER_UNIT_LABEL, &result.stats);
            for record in &result.records {
                metrics.update_power(record);
            }
        }

        debug!("Processed {} PWR record(s)", result.record_count());
        report.power_records = result.records;
        report.power_stats = Some(result.stats);
    }

    async fn process_battery_unit(&self, unit: usize, report: &mut ScrapeReport) {
        let command = self.unit_naming.command(unit);
        let label = self.unit_naming.label(unit);
        debug!("Fetching BAT data for unit {} (command: {})", label, command);

        let lines = match self.source.fetch_lines(&command).await {
            Ok(lines) => lines,
            Err(e) => {
                error!("Error fetching BAT data for unit {}: {}", label, e);
                self.record_error(&fetch_error_type(RecordKind::Battery), &label);
                report.failed_units.push(label);
                return;
            }
        };

        let result = parse_battery_lines(&lines);
        if result.is_empty() {
            info!("No BAT data parsed for unit {}", label);
        }

        if let Some(metrics) = &self.metrics {
            metrics.record_parse_diagnostics(RecordKind::Battery, &label, &result.stats);
            for record in &result.records {
                metrics.update_battery(&label, record);
            }
        }

        debug!("Processed {} BAT record(s) for unit {}", result.record_count(), label);
        report.units.push(UnitReport {
            unit,
            label,
            command,
            records: result.records,
            stats: result.stats,
        });
    }

    fn record_error(&self, error_type: &str, unit: &str) {
        if let Some(metrics) = &self.metrics {
            metrics.record_error(error_type, unit);
        }
    }

    /// Run cycles every `interval` until `shutdown` is cancelled
    ///
    /// The first cycle runs one full interval after start. A cycle that
    /// overruns the interval does not cause a burst of catch-up cycles.
    pub async fn run(&self, interval: Duration, shutdown: CancellationToken) {
        let mut ticker = tokio::time::interval(interval);
        // Ticks missed during a slow cycle are dropped, not replayed
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // An interval's first tick completes immediately
        ticker.tick().await;

        info!("Scraping every {:?}", interval);
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("Scraper stopping");
                    break;
                }
                _ = ticker.tick() => {
                    let report = self.run_cycle().await;
                    if !report.has_records() {
                        warn!("Scrape cycle produced no records");
                    }
                }
            }
        }
    }
}
