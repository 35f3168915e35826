//! Tracing setup and refresh counters.
//!
//! The library only emits `tracing` events; binaries call [`init`] once at
//! startup. With the `telemetry` feature, refresh outcomes are also counted
//! and can be rendered in prometheus text format.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

#[cfg(feature = "telemetry")]
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
#[cfg(feature = "telemetry")]
use std::sync::OnceLock;

#[cfg(feature = "telemetry")]
static PROMETHEUS_HANDLE: OnceLock<Option<PrometheusHandle>> = OnceLock::new();

/// Telemetry configuration
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Service name for labeling (e.g. "session-probe")
    pub service_name: String,
    /// Console log level (default: INFO, DEBUG in debug builds)
    pub console_level: Level,
}

impl TelemetryConfig {
    /// `RUST_LOG` overrides `console_level` when set.
    pub fn from_env(service_name: impl Into<String>) -> Self {
        let console_level = if cfg!(debug_assertions) {
            Level::DEBUG
        } else {
            Level::INFO
        };

        Self {
            service_name: service_name.into(),
            console_level,
        }
    }
}

/// Install the console subscriber (and the metrics recorder, if enabled).
///
/// Safe to call more than once; later calls leave the first subscriber in place.
pub fn init(config: TelemetryConfig) {
    #[cfg(feature = "telemetry")]
    let _ = handle();

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.console_level.as_str().to_lowercase()));

    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .with_filter(env_filter);

    if tracing_subscriber::registry()
        .with(console_layer)
        .try_init()
        .is_ok()
    {
        tracing::debug!(service = %config.service_name, "telemetry initialized");
    }
}

#[cfg(feature = "telemetry")]
fn handle() -> Option<&'static PrometheusHandle> {
    PROMETHEUS_HANDLE
        .get_or_init(|| match PrometheusBuilder::new().install_recorder() {
            Ok(handle) => Some(handle),
            Err(e) => {
                tracing::warn!(error = %e, "failed to install prometheus recorder");
                None
            }
        })
        .as_ref()
}

/// Render metrics in prometheus text format.
#[cfg(feature = "telemetry")]
pub fn render() -> String {
    handle().map(PrometheusHandle::render).unwrap_or_default()
}

/// Count one finished refresh. `outcome` is "ok" or a failure kind.
pub(crate) fn record_refresh(op: &'static str, outcome: &'static str) {
    #[cfg(feature = "telemetry")]
    metrics::counter!("session_refresh_total", "op" => op, "outcome" => outcome).increment(1);
    #[cfg(not(feature = "telemetry"))]
    let _ = (op, outcome);
}
