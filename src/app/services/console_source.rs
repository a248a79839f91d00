//! Console transport for the device's HTTP bridge
//!
//! The bridge runs a console command and returns its raw output. This module
//! turns that into an ordered sequence of non-empty, trimmed lines, or an
//! error when the fetch itself failed. A successful fetch with nothing but
//! noise is not an error; that is for the parser to judge.

use reqwest::StatusCode;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

use crate::config::Config;
use crate::{Error, Result};

/// Source of raw console lines for a command
pub trait ConsoleSource: Send + Sync {
    /// Run `command` on the console and return its output lines
    fn fetch_lines(&self, command: &str) -> impl Future<Output = Result<Vec<String>>> + Send;
}

/// Console source backed by the device's `/req?code=<command>` endpoint
#[derive(Debug, Clone)]
pub struct HttpConsoleSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpConsoleSource {
    /// Create a source for `http://{host}:{port}` with the given request timeout
    pub fn new(host: &str, port: u16, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::transport("<client>", e))?;

        Ok(Self {
            client,
            base_url: format!("http://{}:{}", host, port),
        })
    }

    /// Create a source from exporter configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            &config.device_ip,
            config.device_port,
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    /// URL the bridge is queried at for a command
    pub fn command_url(&self, command: &str) -> String {
        format!("{}/req?code={}", self.base_url, command)
    }
}

impl ConsoleSource for HttpConsoleSource {
    async fn fetch_lines(&self, command: &str) -> Result<Vec<String>> {
        let url = self.command_url(command);
        debug!("Fetching console output from {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::transport(command, e))?;

        check_status(response.status(), &url)?;

        let body = response
            .text()
            .await
            .map_err(|e| Error::transport(command, e))?;

        let lines = split_console_lines(&body);
        debug!("Received {} line(s) for '{}'", lines.len(), command);
        Ok(lines)
    }
}

/// The bridge answers a command with exactly 200; anything else is a failure
fn check_status(status: StatusCode, url: &str) -> Result<()> {
    if status != StatusCode::OK {
        return Err(Error::DeviceStatus {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }
    Ok(())
}

/// Split a console response body into trimmed, non-empty lines
pub fn split_console_lines(body: &str) -> Vec<String> {
    body.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_console_lines() {
        let body = "pwr\r\n@\r\n\r\n  1  49923  -3500  \r\n\n$$\npylon>";
        let lines = split_console_lines(body);

        assert_eq!(lines, vec!["pwr", "@", "1  49923  -3500", "$$", "pylon>"]);
    }

    #[test]
    fn test_split_empty_body() {
        assert!(split_console_lines("").is_empty());
        assert!(split_console_lines("\n \n\t\n").is_empty());
    }

    #[test]
    fn test_only_200_is_accepted() {
        let url = "http://192.168.1.50:80/req?code=pwr";

        assert!(check_status(StatusCode::OK, url).is_ok());
        for status in [
            StatusCode::NO_CONTENT,
            StatusCode::ACCEPTED,
            StatusCode::NOT_FOUND,
            StatusCode::INTERNAL_SERVER_ERROR,
        ] {
            let err = check_status(status, url).unwrap_err();
            assert!(
                matches!(err, Error::DeviceStatus { status: code, .. } if code == status.as_u16())
            );
            assert!(err.is_transport());
        }
    }

    #[test]
    fn test_command_url() {
        let source = HttpConsoleSource::new("192.168.1.50", 8080, Duration::from_secs(5)).unwrap();

        assert_eq!(
            source.command_url("bat+1"),
            "http://192.168.1.50:8080/req?code=bat+1"
        );
        assert_eq!(source.command_url("pwr"), "http://192.168.1.50:8080/req?code=pwr");
    }

    #[tokio::test]
    async fn test_unreachable_device_is_transport_error() {
        // Port 9 on localhost is expected to refuse the connection
        let source = HttpConsoleSource::new("127.0.0.1", 9, Duration::from_secs(2)).unwrap();
        let err = source.fetch_lines("pwr").await.unwrap_err();

        assert!(err.is_transport());
    }
}
