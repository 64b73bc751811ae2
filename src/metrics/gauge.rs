//! # Active Chains Gauge
//!
//! Counts chains that were submitted and have not yet run their terminal
//! decrement step. Handles are injected into the scheduler and the chain
//! worker so tests can observe the counter directly.

use prometheus::{IntGauge, Registry};
use std::fmt::Debug;
use std::sync::atomic::{AtomicI64, Ordering};

use crate::constants::{ACTIVE_CHAINS_GAUGE_HELP, ACTIVE_CHAINS_GAUGE_NAME};
use crate::error::Result;

/// Shared, thread-safe in-flight chain counter
pub trait ProgressGauge: Send + Sync + Debug {
    /// Record a submitted chain
    fn increment(&self);

    /// Record a completed chain
    fn decrement(&self);

    /// Current value
    fn value(&self) -> i64;
}

/// In-process gauge backed by an atomic integer
#[derive(Debug, Default)]
pub struct AtomicGauge {
    value: AtomicI64,
}

impl AtomicGauge {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressGauge for AtomicGauge {
    fn increment(&self) {
        self.value.fetch_add(1, Ordering::AcqRel);
    }

    fn decrement(&self) {
        self.value.fetch_sub(1, Ordering::AcqRel);
    }

    fn value(&self) -> i64 {
        self.value.load(Ordering::Acquire)
    }
}

/// Gauge exported through a Prometheus registry
#[derive(Debug, Clone)]
pub struct PrometheusGauge {
    gauge: IntGauge,
}

impl PrometheusGauge {
    /// Create the active-chains gauge and register it with `registry`
    pub fn register(registry: &Registry) -> Result<Self> {
        let gauge = IntGauge::new(ACTIVE_CHAINS_GAUGE_NAME, ACTIVE_CHAINS_GAUGE_HELP)?;
        registry.register(Box::new(gauge.clone()))?;
        Ok(Self { gauge })
    }
}

impl ProgressGauge for PrometheusGauge {
    fn increment(&self) {
        self.gauge.inc();
    }

    fn decrement(&self) {
        self.gauge.dec();
    }

    fn value(&self) -> i64 {
        self.gauge.get()
    }
}
