//! # Signer Telemetry
//!
//! Logging and metrics for the warp signer.
//!
//! ## Components
//!
//! - **Logging**: `tracing-subscriber` with an `EnvFilter`, plain or JSON output
//! - **Metrics**: Prometheus counters registered into a caller-owned `Registry`
//!
//! Nothing here touches process-wide state except [`init_logging`], which the
//! binary calls exactly once. Metrics are always registered into a registry
//! the caller constructs and passes by reference.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use signer_telemetry::{init_logging, AggregationMetrics, TelemetryConfig};
//!
//! let config = TelemetryConfig::from_env();
//! init_logging(&config)?;
//!
//! let registry = prometheus::Registry::new();
//! let metrics = AggregationMetrics::new(&registry)?;
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `WS_LOG_LEVEL` / `RUST_LOG` | `warn` | Log level filter |
//! | `WS_JSON_LOGS` | `false` | Emit JSON log lines |

mod config;
mod logging;
mod metrics;

pub use config::TelemetryConfig;
pub use logging::init_logging;
pub use metrics::{encode_metrics, AggregationMetrics, RunOutcome};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),
}

impl From<prometheus::Error> for TelemetryError {
    fn from(err: prometheus::Error) -> Self {
        TelemetryError::MetricsInit(err.to_string())
    }
}
