//! Integration tests driving the public API end to end
//!
//! A canned console stands in for the device so the scrape cycle, parser,
//! metrics registry and HTTP handler run together without a network.

use hyper::{Body, Method, Request, StatusCode};
use pylontech_exporter::app::services::console_parser::{
    DiagnosticKind, NoiseReason, parse_battery_lines, parse_power_lines,
};
use pylontech_exporter::app::services::console_source::{ConsoleSource, split_console_lines};
use pylontech_exporter::app::services::metrics::ExporterMetrics;
use pylontech_exporter::app::services::metrics_server::handle_request;
use pylontech_exporter::app::services::scrape::Scraper;
use pylontech_exporter::{BaseState, Config, Error, Result};
use std::collections::HashMap;

/// Raw `pwr` response as the HTTP bridge returns it
const PWR_RESPONSE: &str = "pwr\r\n\
@\r\n\
Power Volt   Curr   Tempr  Tlow   Thigh  Vlow   Vhigh  Base.St  Volt.St  Curr.St  Temp.St  Coulomb  Time                 B.V.St   B.T.St   MosTempr M.T.St\r\n\
1     49923  -3500  260    240    250    3326   3331   Dischg   Normal   Normal   Normal   86%      2023-03-11 14:21:23  Normal   Normal   270      Normal\r\n\
2     49911  -3400  255    240    250    3325   3330   Dischg   Normal   Normal   Normal   85%      2023-03-11 14:21:23  Normal   Normal   265      Normal\r\n\
3     -      -      -      -      -      -      -      Absent   -        -        -        -        -                    -        -        -        -\r\n\
Command completed successfully\r\n\
$$\r\n\
pylon>";

const BAT1_RESPONSE: &str = "bat 1\r\n\
@\r\n\
Battery  Volt     Curr     Tempr    Base State   Volt. State  Curr. State  Temp. State  SOC          Coulomb      BAL\r\n\
0        3312     -1200    250      Dischg       Normal       Normal       Normal       87%          43500 mAH    N\r\n\
1        3313     -1200    251      Dischg       Normal       Normal       Normal       87%          43510 mAH    Y\r\n\
$$\r\n\
pylon>";

/// Second unit: one degraded cell and one truncated row
const BAT2_RESPONSE: &str = "@\r\n\
0        3300     -1100    248      Dischg       Normal       Normal       Normal       --%          43000 mAH    N\r\n\
1        3301     -1100\r\n\
2        3302     -1100    249      Balance      Normal       Normal       Normal       86%          43100 mAH    0000000000000011\r\n\
pylon>";

struct CannedConsole {
    responses: HashMap<&'static str, &'static str>,
}

impl CannedConsole {
    fn new() -> Self {
        let responses = HashMap::from([
            ("pwr", PWR_RESPONSE),
            ("bat+1", BAT1_RESPONSE),
            ("bat+2", BAT2_RESPONSE),
        ]);
        Self { responses }
    }
}

impl ConsoleSource for CannedConsole {
    async fn fetch_lines(&self, command: &str) -> Result<Vec<String>> {
        self.responses
            .get(command)
            .map(|body| split_console_lines(body))
            .ok_or_else(|| Error::transport_message(command, "no such command"))
    }
}

fn config() -> Config {
    Config {
        device_ip: "192.0.2.10".to_string(),
        namespace: "pylontech".to_string(),
        ..Config::default()
    }
}

#[test]
fn test_power_dump_counts_units_and_skips_absent_slots() {
    let lines = split_console_lines(PWR_RESPONSE);
    let result = parse_power_lines(&lines);

    assert_eq!(result.record_count(), 2);
    assert_eq!(result.records[0].base_state, BaseState::Discharge);
    assert_eq!(result.records[1].coulomb, Some(85));
    assert_eq!(result.records[1].mos_temp, "265");
    assert_eq!(result.stats.error_count(), 0);
    assert!(result.stats.diagnostics.iter().any(|d| matches!(
        d.kind,
        DiagnosticKind::Noise {
            reason: NoiseReason::Absent
        }
    )));
}

#[test]
fn test_battery_dump_with_degraded_and_truncated_rows() {
    let lines = split_console_lines(BAT2_RESPONSE);
    let result = parse_battery_lines(&lines);

    assert_eq!(result.record_count(), 2);
    assert_eq!(result.records[0].soc, None);
    assert_eq!(result.records[0].soc_or_sentinel(), -1);
    assert_eq!(result.records[1].id, 2);
    assert_eq!(result.records[1].active_balance_channels(), 2);
    assert_eq!(result.stats.skipped_structural, 1);
    assert_eq!(result.stats.degraded_records, 1);
    assert!(!result.stats.empty_batch_warning);
}

#[tokio::test]
async fn test_scrape_cycle_publishes_metrics_endpoint() {
    let metrics = ExporterMetrics::new("pylontech").unwrap();
    let scraper = Scraper::new(CannedConsole::new(), &config()).with_metrics(metrics.clone());

    let report = scraper.run_cycle().await;

    assert_eq!(report.power_records.len(), 2);
    assert_eq!(report.units.len(), 2);
    assert_eq!(report.battery_record_count(), 4);
    assert!(report.failed_units.is_empty());

    let request = Request::builder()
        .method(Method::GET)
        .uri("/metrics")
        .body(Body::empty())
        .unwrap();
    let response = handle_request(&metrics, request);
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
    let body = String::from_utf8(bytes.to_vec()).unwrap();

    assert!(body.contains("pylontech_battery_volt{id=\"1\",unit=\"bat1\"} 3313"));
    assert!(body.contains("pylontech_battery_soc{id=\"0\",unit=\"bat2\"} -1"));
    assert!(body.contains("pylontech_battery_bal_active_count{id=\"1\",unit=\"bat1\"} 1"));
    assert!(body.contains("pylontech_power_mos_temp_celsius{id=\"1\"} 27"));
    assert!(body.contains(
        "pylontech_scraper_errors_total{type=\"bat_parse_structural\",unit=\"bat2\"} 1"
    ));
    assert!(!body.contains("pwr_parse"));
    assert!(body.contains("pylontech_scraper_last_success_timestamp_seconds"));
}

#[tokio::test]
async fn test_report_serializes_to_json() {
    let scraper = Scraper::new(CannedConsole::new(), &config());
    let report = scraper.run_cycle().await;

    let value = serde_json::to_value(&report).unwrap();
    assert_eq!(value["units"][0]["label"], "bat1");
    assert_eq!(value["units"][1]["stats"]["skipped_structural"], 1);
    assert_eq!(value["power_records"][0]["id"], 1);
}
