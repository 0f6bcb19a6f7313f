use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};

use crate::error::AppError;

/// Counters exported on `/metrics`. Owns its registry so tests and parallel
/// app instances never collide on global state.
pub struct ApiMetrics {
    registry: Registry,
    cache_lookups: IntCounterVec,
    chain_reads: IntCounterVec,
}

impl ApiMetrics {
    pub fn new() -> Result<Self, AppError> {
        let registry = Registry::new();

        let cache_lookups = IntCounterVec::new(
            Opts::new("dashboard_cache_lookups_total", "Cache lookups by entity and outcome"),
            &["entity", "outcome"],
        )?;
        let chain_reads = IntCounterVec::new(
            Opts::new("dashboard_chain_reads_total", "On-chain reads by call and outcome"),
            &["call", "outcome"],
        )?;

        registry.register(Box::new(cache_lookups.clone()))?;
        registry.register(Box::new(chain_reads.clone()))?;

        Ok(Self {
            registry,
            cache_lookups,
            chain_reads,
        })
    }

    pub fn record_cache_hit(&self, entity: &str) {
        self.cache_lookups.with_label_values(&[entity, "hit"]).inc();
    }

    pub fn record_cache_miss(&self, entity: &str) {
        self.cache_lookups.with_label_values(&[entity, "miss"]).inc();
    }

    pub fn record_chain_read(&self, call: &str, success: bool) {
        let outcome = if success { "ok" } else { "error" };
        self.chain_reads.with_label_values(&[call, outcome]).inc();
    }

    pub fn cache_lookups(&self, entity: &str, outcome: &str) -> u64 {
        self.cache_lookups.with_label_values(&[entity, outcome]).get()
    }

    /// Prometheus text exposition of every registered metric.
    pub fn render(&self) -> Result<String, AppError> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer)
            .map_err(|e| AppError::InternalError(format!("Metrics are not valid UTF-8: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_render() {
        let metrics = ApiMetrics::new().unwrap();
        metrics.record_cache_hit("reserve");
        metrics.record_cache_miss("reserve");
        metrics.record_cache_miss("reserve");
        metrics.record_chain_read("getReserveData", false);

        assert_eq!(metrics.cache_lookups("reserve", "hit"), 1);
        assert_eq!(metrics.cache_lookups("reserve", "miss"), 2);

        let text = metrics.render().unwrap();
        assert!(text.contains("dashboard_cache_lookups_total{entity=\"reserve\",outcome=\"miss\"} 2"));
        assert!(text.contains("dashboard_chain_reads_total{call=\"getReserveData\",outcome=\"error\"} 1"));
    }

    #[test]
    fn test_instances_are_independent() {
        let first = ApiMetrics::new().unwrap();
        let second = ApiMetrics::new().unwrap();
        first.record_cache_hit("user");
        assert_eq!(second.cache_lookups("user", "hit"), 0);
    }
}
