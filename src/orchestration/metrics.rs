//! # Service Latency Metrics
//!
//! Per-service invocation counts and latency aggregates fed by the
//! invocation wrapper. Observability only; nothing in the dispatch path
//! reads these back for decisions.

use std::collections::HashMap;
use std::time::Duration;

use dashmap::DashMap;

/// Aggregate for one named statistic.
#[derive(Debug, Clone, Default)]
pub struct ServiceStat {
    pub invocations: u64,
    pub failures: u64,
    pub total_latency: Duration,
    pub max_latency: Duration,
}

impl ServiceStat {
    pub fn mean_latency(&self) -> Duration {
        if self.invocations == 0 {
            return Duration::ZERO;
        }
        self.total_latency / self.invocations as u32
    }
}

/// Named statistics sink. Keys are service slot names plus a few
/// flow-level markers (the CSO join records under its own name).
#[derive(Debug, Default)]
pub struct ServiceMetrics {
    stats: DashMap<&'static str, ServiceStat>,
}

impl ServiceMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one completed invocation under `name`.
    pub fn record(&self, name: &'static str, latency: Duration, success: bool) {
        let mut entry = self.stats.entry(name).or_default();
        entry.invocations += 1;
        if !success {
            entry.failures += 1;
        }
        entry.total_latency += latency;
        if latency > entry.max_latency {
            entry.max_latency = latency;
        }
    }

    /// Point-in-time copy of all aggregates.
    pub fn snapshot(&self) -> HashMap<&'static str, ServiceStat> {
        self.stats
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect()
    }

    pub fn stat(&self, name: &str) -> Option<ServiceStat> {
        self.stats.get(name).map(|entry| entry.value().clone())
    }
}
