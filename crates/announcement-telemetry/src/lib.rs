//! # Announcement Telemetry
//!
//! Structured logging for processes hosting announcers.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use announcement_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() {
//!     let _guard = init_telemetry(TelemetryConfig::from_env()).expect("Failed to init telemetry");
//!     // Announcer logs are now written to stdout
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `ANNOUNCEMENTS_SERVICE_NAME` | `announcements` | Service name in logs |
//! | `ANNOUNCEMENTS_LOG_LEVEL` | `info` | Log level filter (falls back to `RUST_LOG`) |
//! | `ANNOUNCEMENTS_CONSOLE_OUTPUT` | `true` | Write logs to stdout |
//! | `ANNOUNCEMENTS_JSON_LOGS` | `false` | JSON instead of pretty logs |

mod config;
mod logging;

pub use config::TelemetryConfig;
pub use logging::{build_filter, init_logging};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to install tracing subscriber: {0}")]
    SubscriberInit(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Initialize logging for the process.
///
/// Returns a guard to hold for the lifetime of the application. Fails if a
/// global subscriber is already installed.
pub fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    logging::init_logging(&config)?;
    tracing::info!(service = %config.service_name, "Telemetry initialized");
    Ok(TelemetryGuard {
        service_name: config.service_name,
    })
}

/// Guard that keeps telemetry active. Logs the shutdown when dropped.
pub struct TelemetryGuard {
    service_name: String,
}

impl TelemetryGuard {
    pub fn service_name(&self) -> &str {
        &self.service_name
    }
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!(service = %self.service_name, "Shutting down telemetry...");
    }
}

/// Span carrying the announcer name, for grouping everything logged while
/// one announcer is busy.
///
/// ```rust,ignore
/// let _span = announcer_span!("announce", announcer = %announcer.name()).entered();
/// ```
#[macro_export]
macro_rules! announcer_span {
    ($name:expr, $($field:tt)*) => {
        tracing::info_span!($name, $($field)*)
    };
}
