use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::logging::Logger;
use crate::metrics::ServiceMetrics;
use crate::reconcile::ReconcileOptions;

/// Configuration knobs for [`LayoutService`](super::LayoutService).
#[derive(Clone, Debug)]
pub struct ServiceConfig {
    /// Rewrite policy applied by `sync_document`.
    pub reconcile: ReconcileOptions,
    /// Lifetime of cached parsed documents.
    pub cache_ttl: Duration,
    /// Interval of the background cache sweep. Zero disables it.
    pub sweep_interval: Duration,
    /// Front-matter key naming a document's layout.
    pub layout_field: String,
    /// Ask the host to show the layout view after a sync.
    pub switch_view_after_sync: bool,
    /// Optional structured logger used by the service.
    pub logger: Option<Logger>,
    /// Metrics accumulator used for snapshots.
    pub metrics: Option<Arc<Mutex<ServiceMetrics>>>,
    /// Target field used when emitting metrics snapshots.
    pub metrics_target: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            reconcile: ReconcileOptions::default(),
            cache_ttl: Duration::from_secs(300),
            sweep_interval: Duration::from_secs(60),
            layout_field: "layout".to_string(),
            switch_view_after_sync: false,
            logger: None,
            metrics: None,
            metrics_target: "gridnote::service.metrics".to_string(),
        }
    }
}

impl ServiceConfig {
    /// Enable metrics collection if it has not already been configured.
    pub fn enable_metrics(&mut self) {
        if self.metrics.is_none() {
            self.metrics = Some(Arc::new(Mutex::new(ServiceMetrics::new())));
        }
    }

    /// Disable metrics collection and prevent further snapshots.
    pub fn disable_metrics(&mut self) {
        self.metrics = None;
    }

    /// Access the shared metrics handle if metrics are enabled.
    pub fn metrics_handle(&self) -> Option<Arc<Mutex<ServiceMetrics>>> {
        self.metrics.as_ref().map(Arc::clone)
    }
}
