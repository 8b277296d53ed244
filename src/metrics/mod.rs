use crate::logging::{LogEvent, LogFields, LogLevel};
use serde_json::json;

#[derive(Debug, Default, Clone)]
pub struct ServiceMetrics {
    layouts_loaded: u64,
    layouts_rejected: u64,
    reconciliations: u64,
    sections_inserted: u64,
    rewrites: u64,
    cache_hits: u64,
    cache_misses: u64,
}

impl ServiceMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_load(&mut self, loaded: usize, rejected: usize) {
        self.layouts_loaded = self.layouts_loaded.saturating_add(loaded as u64);
        self.layouts_rejected = self.layouts_rejected.saturating_add(rejected as u64);
    }

    pub fn record_reconciliation(&mut self) {
        self.reconciliations = self.reconciliations.saturating_add(1);
    }

    pub fn record_rewrite(&mut self, inserted: usize) {
        self.rewrites = self.rewrites.saturating_add(1);
        self.sections_inserted = self.sections_inserted.saturating_add(inserted as u64);
    }

    pub fn record_cache(&mut self, hit: bool) {
        if hit {
            self.cache_hits = self.cache_hits.saturating_add(1);
        } else {
            self.cache_misses = self.cache_misses.saturating_add(1);
        }
    }

    pub fn snapshot(&self) -> MetricSnapshot {
        MetricSnapshot {
            layouts_loaded: self.layouts_loaded,
            layouts_rejected: self.layouts_rejected,
            reconciliations: self.reconciliations,
            sections_inserted: self.sections_inserted,
            rewrites: self.rewrites,
            cache_hits: self.cache_hits,
            cache_misses: self.cache_misses,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricSnapshot {
    pub layouts_loaded: u64,
    pub layouts_rejected: u64,
    pub reconciliations: u64,
    pub sections_inserted: u64,
    pub rewrites: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
}

impl MetricSnapshot {
    pub fn to_log_event(&self, target: &str) -> LogEvent {
        LogEvent::with_fields(LogLevel::Info, target, "service_metrics", self.as_fields())
    }

    pub fn as_fields(&self) -> LogFields {
        let mut map = LogFields::new();
        map.insert("layouts_loaded".to_string(), json!(self.layouts_loaded));
        map.insert("layouts_rejected".to_string(), json!(self.layouts_rejected));
        map.insert("reconciliations".to_string(), json!(self.reconciliations));
        map.insert("sections_inserted".to_string(), json!(self.sections_inserted));
        map.insert("rewrites".to_string(), json!(self.rewrites));
        map.insert("cache_hits".to_string(), json!(self.cache_hits));
        map.insert("cache_misses".to_string(), json!(self.cache_misses));
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_reflects_recorded_counters() {
        let mut metrics = ServiceMetrics::new();
        metrics.record_load(3, 1);
        metrics.record_reconciliation();
        metrics.record_rewrite(2);
        metrics.record_cache(true);
        metrics.record_cache(false);
        metrics.record_cache(false);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.layouts_loaded, 3);
        assert_eq!(snapshot.layouts_rejected, 1);
        assert_eq!(snapshot.sections_inserted, 2);
        assert_eq!(snapshot.cache_misses, 2);

        let event = snapshot.to_log_event("gridnote::service.metrics");
        assert_eq!(event.message, "service_metrics");
        assert_eq!(event.fields["rewrites"], json!(1));
    }
}
