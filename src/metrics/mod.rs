//! # Metrics
//!
//! Observability for warming runs. The only metric with cross-run meaning is
//! the active-chains gauge; everything else is reported through the
//! [`RunSummary`](crate::orchestration::RunSummary) and structured logs.

pub mod gauge;

use prometheus::{Encoder, Registry, TextEncoder};

use crate::error::{Result, WarmerError};

pub use gauge::{AtomicGauge, PrometheusGauge, ProgressGauge};

/// Render every metric in `registry` in the Prometheus text exposition format
pub fn export_metrics(registry: &Registry) -> Result<String> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder.encode(&registry.gather(), &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| WarmerError::metrics(e.to_string()))
}
