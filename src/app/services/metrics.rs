//! Prometheus metrics for parsed console records
//!
//! All gauges and counters live in a registry owned by [`ExporterMetrics`],
//! which is passed explicitly to whatever needs to publish or serve them.
//!
//! # Metrics Exposed
//!
//! ## Battery gauges (labels `unit`, `id`)
//! - `{ns}_battery_volt`, `{ns}_battery_curr`, `{ns}_battery_temp_celsius`
//! - `{ns}_battery_base_state`, `{ns}_battery_soc`, `{ns}_battery_coulomb`
//! - `{ns}_battery_bal_active_count`
//!
//! ## Power gauges (label `id`)
//! - `{ns}_power_volt`, `{ns}_power_curr`, `{ns}_power_temp_celsius`
//! - `{ns}_power_base_state`, `{ns}_power_soc_percent`, `{ns}_power_mos_temp_celsius`
//!
//! ## Scraper
//! - `{ns}_scraper_errors_total` (labels `type`, `unit`)
//! - `{ns}_scraper_last_success_timestamp_seconds`

use chrono::{DateTime, Utc};
use prometheus::{Gauge, GaugeVec, IntCounterVec, Opts, Registry, TextEncoder};
use tracing::debug;

use super::console_parser::{DiagnosticCounter, ParseStats};
use crate::app::models::{BatteryRecord, PowerRecord, RecordKind};
use crate::constants::TEMPERATURE_DIVISOR;
use crate::{Error, Result};

const BATTERY_LABELS: &[&str] = &["unit", "id"];
const POWER_LABELS: &[&str] = &["id"];

/// Gauges for `bat` records
#[derive(Clone)]
struct BatteryGauges {
    volt: GaugeVec,
    curr: GaugeVec,
    temp: GaugeVec,
    base_state: GaugeVec,
    soc: GaugeVec,
    coulomb: GaugeVec,
    bal_active_count: GaugeVec,
}

/// Gauges for `pwr` records
#[derive(Clone)]
struct PowerGauges {
    volt: GaugeVec,
    curr: GaugeVec,
    temp: GaugeVec,
    base_state: GaugeVec,
    soc: GaugeVec,
    mos_temp: GaugeVec,
}

/// Exporter metrics collection
///
/// Cloning shares the underlying registry and collectors.
#[derive(Clone)]
pub struct ExporterMetrics {
    registry: Registry,
    scrape_errors: IntCounterVec,
    last_success: Gauge,
    battery: BatteryGauges,
    power: PowerGauges,
}

/// Registers collectors under one namespace
struct Builder<'a> {
    registry: &'a Registry,
    namespace: &'a str,
}

impl Builder<'_> {
    fn gauge_vec(
        &self,
        subsystem: &str,
        name: &str,
        help: &str,
        labels: &[&str],
    ) -> Result<GaugeVec> {
        let opts = Opts::new(name, help)
            .namespace(self.namespace)
            .subsystem(subsystem);
        let gauge = GaugeVec::new(opts, labels)
            .map_err(|e| Error::metrics(format!("Failed to create {}_{}", subsystem, name), e))?;
        self.registry
            .register(Box::new(gauge.clone()))
            .map_err(|e| Error::metrics(format!("Failed to register {}_{}", subsystem, name), e))?;
        Ok(gauge)
    }
}

impl ExporterMetrics {
    /// Create the metric collection in a fresh registry
    pub fn new(namespace: &str) -> Result<Self> {
        Self::with_registry(Registry::new(), namespace)
    }

    /// Create the metric collection in the given registry
    pub fn with_registry(registry: Registry, namespace: &str) -> Result<Self> {
        let builder = Builder {
            registry: &registry,
            namespace,
        };

        let scrape_errors = IntCounterVec::new(
            Opts::new(
                "errors_total",
                "Total number of errors encountered during data scraping or parsing.",
            )
            .namespace(namespace)
            .subsystem("scraper"),
            &["type", "unit"],
        )?;
        registry.register(Box::new(scrape_errors.clone()))?;

        let last_success = Gauge::with_opts(
            Opts::new(
                "last_success_timestamp_seconds",
                "Unix time of the last scrape cycle that produced records.",
            )
            .namespace(namespace)
            .subsystem("scraper"),
        )?;
        registry.register(Box::new(last_success.clone()))?;

        let battery = BatteryGauges {
            volt: builder.gauge_vec("battery", "volt", "Battery voltage in millivolts.", BATTERY_LABELS)?,
            curr: builder.gauge_vec("battery", "curr", "Battery current in milliamps.", BATTERY_LABELS)?,
            temp: builder.gauge_vec(
                "battery",
                "temp_celsius",
                "Battery temperature in degrees Celsius.",
                BATTERY_LABELS,
            )?,
            base_state: builder.gauge_vec(
                "battery",
                "base_state",
                "Battery base state code (0: Charge, 1: Dischg, 2: Idle, 3: Balance, -1: Unknown).",
                BATTERY_LABELS,
            )?,
            soc: builder.gauge_vec(
                "battery",
                "soc",
                "Battery State of Charge in percent (-1 when unparseable).",
                BATTERY_LABELS,
            )?,
            coulomb: builder.gauge_vec(
                "battery",
                "coulomb",
                "Battery remaining capacity in milliampere-hours (-1 when unparseable).",
                BATTERY_LABELS,
            )?,
            bal_active_count: builder.gauge_vec(
                "battery",
                "bal_active_count",
                "Number of active balancing channels.",
                BATTERY_LABELS,
            )?,
        };

        let power = PowerGauges {
            volt: builder.gauge_vec("power", "volt", "Power supply voltage in millivolts.", POWER_LABELS)?,
            curr: builder.gauge_vec("power", "curr", "Power supply current in milliamps.", POWER_LABELS)?,
            temp: builder.gauge_vec(
                "power",
                "temp_celsius",
                "Power supply board temperature in degrees Celsius.",
                POWER_LABELS,
            )?,
            base_state: builder.gauge_vec(
                "power",
                "base_state",
                "Power supply base state code (0: Charge, 1: Dischg, 2: Idle, 3: Balance, -1: Unknown).",
                POWER_LABELS,
            )?,
            soc: builder.gauge_vec(
                "power",
                "soc_percent",
                "Power supply state of charge in percent, from the Coulomb column (-1 when unparseable).",
                POWER_LABELS,
            )?,
            mos_temp: builder.gauge_vec(
                "power",
                "mos_temp_celsius",
                "Power supply MOS temperature in degrees Celsius.",
                POWER_LABELS,
            )?,
        };

        Ok(Self {
            registry,
            scrape_errors,
            last_success,
            battery,
            power,
        })
    }

    /// Registry holding every collector
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Publish one cell record under a unit label
    pub fn update_battery(&self, unit: &str, record: &BatteryRecord) {
        let id = record.id.to_string();
        let labels = [unit, id.as_str()];
        let g = &self.battery;

        g.volt.with_label_values(&labels).set(f64::from(record.volt));
        g.curr.with_label_values(&labels).set(f64::from(record.curr));
        g.temp
            .with_label_values(&labels)
            .set(f64::from(record.temp) / TEMPERATURE_DIVISOR);
        g.base_state
            .with_label_values(&labels)
            .set(f64::from(record.base_state.code()));
        g.soc
            .with_label_values(&labels)
            .set(f64::from(record.soc_or_sentinel()));
        g.coulomb
            .with_label_values(&labels)
            .set(f64::from(record.coulomb_or_sentinel()));
        g.bal_active_count
            .with_label_values(&labels)
            .set(record.active_balance_channels() as f64);
    }

    /// Publish one power-supply record
    pub fn update_power(&self, record: &PowerRecord) {
        let id = record.id.to_string();
        let labels = [id.as_str()];
        let g = &self.power;

        g.volt.with_label_values(&labels).set(f64::from(record.volt));
        g.curr.with_label_values(&labels).set(f64::from(record.curr));
        g.temp
            .with_label_values(&labels)
            .set(f64::from(record.temp) / TEMPERATURE_DIVISOR);
        g.base_state
            .with_label_values(&labels)
            .set(f64::from(record.base_state.code()));
        g.soc
            .with_label_values(&labels)
            .set(f64::from(record.coulomb_or_sentinel()));

        match record.mos_temp.parse::<f64>() {
            Ok(mos_temp) => g
                .mos_temp
                .with_label_values(&labels)
                .set(mos_temp / TEMPERATURE_DIVISOR),
            Err(e) => debug!(
                "Could not parse MosTemp '{}' for power_id {}: {}",
                record.mos_temp, id, e
            ),
        }
    }

    /// Increment the error counter
    pub fn record_error(&self, error_type: &str, unit: &str) {
        self.scrape_errors
            .with_label_values(&[error_type, unit])
            .inc();
    }

    /// Add a batch's error counters to the error metric
    ///
    /// Types are `{bat|pwr}_parse_{structural|critical|empty}`. Noise and
    /// degraded fields are never counted.
    pub fn record_parse_diagnostics(&self, kind: RecordKind, unit: &str, stats: &ParseStats) {
        for (counter, count) in stats.error_counters() {
            let error_type = parse_error_type(kind, counter);
            self.scrape_errors
                .with_label_values(&[error_type.as_str(), unit])
                .inc_by(count as u64);
        }
    }

    /// Current value of an error counter
    pub fn error_count(&self, error_type: &str, unit: &str) -> u64 {
        self.scrape_errors
            .with_label_values(&[error_type, unit])
            .get()
    }

    /// Stamp the time of a productive scrape cycle
    pub fn mark_success(&self, at: DateTime<Utc>) {
        self.last_success.set(at.timestamp() as f64);
    }

    /// Encode the registry in the Prometheus text exposition format
    pub fn encode(&self) -> Result<String> {
        TextEncoder::new()
            .encode_to_string(&self.registry.gather())
            .map_err(|e| Error::metrics("Failed to encode metrics", e))
    }
}

/// Error counter type for a parse diagnostic counter
pub fn parse_error_type(kind: RecordKind, counter: DiagnosticCounter) -> String {
    format!("{}_parse_{}", kind.metric_prefix(), counter.as_str())
}

/// Error counter type for a fetch failure
pub fn fetch_error_type(kind: RecordKind) -> String {
    format!("{}_fetch", kind.metric_prefix())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::models::BaseState;
    use crate::app::services::console_parser::{parse_battery_lines, parse_power_lines};

    fn battery_record() -> BatteryRecord {
        BatteryRecord {
            id: 4,
            volt: 3312,
            curr: -1200,
            temp: 251,
            base_state: BaseState::Discharge,
            volt_state: "Normal".to_string(),
            curr_state: "Normal".to_string(),
            temp_state: "Normal".to_string(),
            soc: None,
            coulomb: Some(43500),
            bal: "0000000000000110".to_string(),
        }
    }

    fn power_record(mos_temp: &str) -> PowerRecord {
        PowerRecord {
            id: 1,
            volt: 49923,
            curr: -3500,
            temp: 260,
            base_state: BaseState::Idle,
            volt_state: "Normal".to_string(),
            curr_state: "Normal".to_string(),
            temp_state: "Normal".to_string(),
            coulomb: Some(86),
            bv_state: "Normal".to_string(),
            bt_state: "Normal".to_string(),
            mos_temp: mos_temp.to_string(),
            mt_state: "Normal".to_string(),
        }
    }

    #[test]
    fn test_metrics_creation() {
        let metrics = ExporterMetrics::new("pylontech").unwrap();
        metrics.record_error("pwr_fetch", "pwr");

        let text = metrics.encode().unwrap();
        assert!(text.contains("pylontech_scraper_errors_total"));
    }

    #[test]
    fn test_duplicate_registration_fails() {
        let registry = Registry::new();
        ExporterMetrics::with_registry(registry.clone(), "dup").unwrap();

        assert!(ExporterMetrics::with_registry(registry, "dup").is_err());
    }

    #[test]
    fn test_update_battery() {
        let metrics = ExporterMetrics::new("test").unwrap();
        metrics.update_battery("bat1", &battery_record());

        let labels = ["bat1", "4"];
        let g = &metrics.battery;
        assert_eq!(g.volt.with_label_values(&labels).get(), 3312.0);
        assert_eq!(g.curr.with_label_values(&labels).get(), -1200.0);
        assert!((g.temp.with_label_values(&labels).get() - 25.1).abs() < 1e-9);
        assert_eq!(g.base_state.with_label_values(&labels).get(), 1.0);
        assert_eq!(g.soc.with_label_values(&labels).get(), -1.0);
        assert_eq!(g.coulomb.with_label_values(&labels).get(), 43500.0);
        assert_eq!(g.bal_active_count.with_label_values(&labels).get(), 2.0);
    }

    #[test]
    fn test_update_power() {
        let metrics = ExporterMetrics::new("test").unwrap();
        metrics.update_power(&power_record("270"));

        let labels = ["1"];
        let g = &metrics.power;
        assert_eq!(g.volt.with_label_values(&labels).get(), 49923.0);
        assert!((g.temp.with_label_values(&labels).get() - 26.0).abs() < 1e-9);
        assert_eq!(g.base_state.with_label_values(&labels).get(), 2.0);
        assert_eq!(g.soc.with_label_values(&labels).get(), 86.0);
        assert!((g.mos_temp.with_label_values(&labels).get() - 27.0).abs() < 1e-9);
    }

    #[test]
    fn test_unparseable_mos_temp_is_not_published() {
        let metrics = ExporterMetrics::new("test").unwrap();
        metrics.update_power(&power_record("N/A"));

        let text = metrics.encode().unwrap();
        assert!(text.contains("test_power_volt"));
        assert!(!text.contains("test_power_mos_temp_celsius{"));
    }

    #[test]
    fn test_record_parse_diagnostics() {
        let metrics = ExporterMetrics::new("test").unwrap();
        let lines = vec![
            "@",
            "1 3750mV 0 301 Charge Normal Normal Normal 85% 3450 mAH N",
            "2 3700 0",
        ];
        let result = parse_battery_lines(&lines);
        metrics.record_parse_diagnostics(RecordKind::Battery, "bat1", &result.stats);

        assert_eq!(metrics.error_count("bat_parse_structural", "bat1"), 1);
        assert_eq!(metrics.error_count("bat_parse_critical", "bat1"), 1);
        assert_eq!(metrics.error_count("bat_parse_empty", "bat1"), 1);
    }

    #[test]
    fn test_noise_is_never_counted() {
        let metrics = ExporterMetrics::new("test").unwrap();
        let lines = vec!["@", "Power Volt Curr", "2 - - - Absent", "pylon>"];
        let result = parse_power_lines(&lines);
        metrics.record_parse_diagnostics(RecordKind::Power, "pwr", &result.stats);

        let text = metrics.encode().unwrap();
        assert!(!text.contains("pwr_parse"));
    }

    #[test]
    fn test_mark_success() {
        let metrics = ExporterMetrics::new("test").unwrap();
        let at = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        metrics.mark_success(at);

        assert_eq!(metrics.last_success.get(), 1_700_000_000.0);
    }

    #[test]
    fn test_error_type_names() {
        assert_eq!(
            parse_error_type(RecordKind::Battery, DiagnosticCounter::Structural),
            "bat_parse_structural"
        );
        assert_eq!(fetch_error_type(RecordKind::Power), "pwr_fetch");
    }
}
