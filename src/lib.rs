//! Pylontech Exporter Library
//!
//! A Rust library for polling a Pylontech battery-management console and
//! republishing its cell and power-supply status as Prometheus metrics.
//!
//! This library provides tools for:
//! - Parsing the whitespace-delimited `bat` and `pwr` console dumps into typed records
//! - Tolerating noise, truncated rows and unparseable sub-fields without dropping the batch
//! - Fetching console output from the device's HTTP bridge
//! - Publishing records through an explicitly owned Prometheus registry
//! - Running the periodic scrape cycle behind a `/metrics` endpoint

pub mod config;
pub mod constants;

// Core application modules
pub mod app {
    pub mod models;
    pub mod services {
        pub mod console_parser;
        pub mod console_source;
        pub mod metrics;
        pub mod metrics_server;
        pub mod scrape;
    }
}

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use app::models::{BaseState, BatteryRecord, PowerRecord, RecordKind};
pub use config::Config;

/// Result type alias for the exporter
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for exporter operations
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A single console field could not be decoded
    #[error("Failed to decode {field} from '{token}': {reason}")]
    FieldDecode {
        field: String,
        token: String,
        reason: String,
    },

    /// A data row has fewer tokens than its layout requires
    #[error("Insufficient fields (got {found}, expected at least {required})")]
    IncompleteRow { found: usize, required: usize },

    /// The console request itself failed
    #[error("Transport error for command '{command}': {message}")]
    Transport {
        command: String,
        message: String,
        #[source]
        source: Option<reqwest::Error>,
    },

    /// The device answered with a non-success status
    #[error("Received non-200 status code {status} from {url}")]
    DeviceStatus { status: u16, url: String },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Metric registration or encoding failed
    #[error("Metrics error: {message}")]
    Metrics {
        message: String,
        #[source]
        source: prometheus::Error,
    },

    /// Metrics HTTP server failure
    #[error("Metrics server error: {message}")]
    Server { message: String },

    /// I/O operation failed
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Processing interrupted
    #[error("Processing interrupted: {reason}")]
    ProcessingInterrupted { reason: String },
}

impl Error {
    /// Create a field decode error
    pub fn field_decode(
        field: impl Into<String>,
        token: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::FieldDecode {
            field: field.into(),
            token: token.into(),
            reason: reason.into(),
        }
    }

    /// Create an incomplete row error
    pub fn incomplete_row(found: usize, required: usize) -> Self {
        Self::IncompleteRow { found, required }
    }

    /// Create a transport error with the underlying HTTP failure
    pub fn transport(command: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Transport {
            command: command.into(),
            message: source.to_string(),
            source: Some(source),
        }
    }

    /// Create a transport error without an underlying source
    pub fn transport_message(command: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transport {
            command: command.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a metrics error
    pub fn metrics(message: impl Into<String>, source: prometheus::Error) -> Self {
        Self::Metrics {
            message: message.into(),
            source,
        }
    }

    /// Create a metrics server error
    pub fn server(message: impl Into<String>) -> Self {
        Self::Server {
            message: message.into(),
        }
    }

    /// Create an I/O error with context
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a processing interrupted error
    pub fn processing_interrupted(reason: impl Into<String>) -> Self {
        Self::ProcessingInterrupted {
            reason: reason.into(),
        }
    }

    /// Whether this error came from the device transport rather than local state
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::DeviceStatus { .. })
    }
}

// Automatic conversions from common error types
impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            message: "I/O operation failed".to_string(),
            source: error,
        }
    }
}

impl From<prometheus::Error> for Error {
    fn from(error: prometheus::Error) -> Self {
        Self::Metrics {
            message: "Prometheus operation failed".to_string(),
            source: error,
        }
    }
}
