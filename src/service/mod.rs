//! Application-facing entry points.
//!
//! `LayoutService` wires the registry, reconciler, parse cache and the host
//! collaborators together: "reconcile file X against its declared layout",
//! "validate and load layout set Y", "create a document for layout Z".

mod config;

pub use config::ServiceConfig;

use std::path::Path;
use std::sync::Arc;

use serde_json::json;

use crate::cache::{MemoCache, SourceVersion};
use crate::error::{GridnoteError, Result};
use crate::logging::{LogLevel, Logger, TARGET_SERVICE, json_kv, json_str};
use crate::metrics::{MetricSnapshot, ServiceMetrics};
use crate::reconcile::{ReconciliationResult, SectionReconciler, diff};
use crate::registry::{LayoutDefinition, LayoutRegistry, LoadReport};
use crate::sections::ParsedDocument;
use crate::store::{Document, DocumentStore, FrontmatterMetadataProvider, MetadataProvider};
use crate::view::{NullViewSwitcher, ViewMode, ViewSwitcher};

/// Parsed document kept in the cache together with the text it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedDocument {
    pub text: String,
    pub parsed: ParsedDocument,
}

/// What a sync did to a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOutcome {
    pub layout: String,
    /// Sections that were missing before the rewrite, in layout order.
    pub inserted: Vec<String>,
    /// False when the document already matched and nothing was written.
    pub written: bool,
}

pub struct LayoutService {
    registry: LayoutRegistry,
    reconciler: SectionReconciler,
    store: Arc<dyn DocumentStore>,
    metadata: Box<dyn MetadataProvider>,
    view: Box<dyn ViewSwitcher>,
    cache: MemoCache<Arc<CachedDocument>>,
    config: ServiceConfig,
    logger: Logger,
}

impl LayoutService {
    pub fn new(registry: LayoutRegistry, store: Arc<dyn DocumentStore>, config: ServiceConfig) -> Self {
        let logger = config.logger.clone().unwrap_or_else(Logger::null);
        let mut cache = MemoCache::new(config.cache_ttl).with_logger(logger.clone());
        cache.start_sweeper(config.sweep_interval);

        Self {
            registry,
            reconciler: SectionReconciler::new().with_logger(logger.clone()),
            store,
            metadata: Box::new(FrontmatterMetadataProvider::new(config.layout_field.clone())),
            view: Box::new(NullViewSwitcher),
            cache,
            config,
            logger,
        }
    }

    pub fn with_metadata_provider<M>(mut self, provider: M) -> Self
    where
        M: MetadataProvider + 'static,
    {
        self.metadata = Box::new(provider);
        self
    }

    pub fn with_view_switcher<V>(mut self, switcher: V) -> Self
    where
        V: ViewSwitcher + 'static,
    {
        self.view = Box::new(switcher);
        self
    }

    pub fn with_reconciler(mut self, reconciler: SectionReconciler) -> Self {
        self.reconciler = reconciler;
        self
    }

    pub fn registry(&self) -> &LayoutRegistry {
        &self.registry
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn cache(&self) -> &MemoCache<Arc<CachedDocument>> {
        &self.cache
    }

    /// Validate a JSON layout set and make it the registry's content.
    pub fn validate_layout_set(&mut self, json: &str) -> Result<LoadReport> {
        let report = self.registry.load_json(json)?;
        self.after_load(&report);
        Ok(report)
    }

    /// Reload the registry from its bound definition source.
    pub fn reload_layouts(&mut self) -> Result<LoadReport> {
        let report = self.registry.reload()?;
        self.after_load(&report);
        Ok(report)
    }

    /// Layout name declared by the document at `path`.
    pub fn declared_layout(&self, path: &Path) -> Result<String> {
        let (document, _) = self.load_document(path)?;
        self.layout_of(path, &document.text)
    }

    /// Diff the document at `path` against its declared layout. Read-only.
    pub fn reconcile_document(&self, path: &Path) -> Result<ReconciliationResult> {
        let (document, _) = self.load_document(path)?;
        let layout = self.resolve(&self.layout_of(path, &document.text)?)?;
        self.with_metrics(ServiceMetrics::record_reconciliation);
        Ok(diff(layout, &document.parsed.sections))
    }

    /// Rewrite the document at `path` so every section of its layout exists.
    ///
    /// The new text is computed completely before the single write, which is
    /// a compare-and-swap against the version observed when reading. A
    /// failed write leaves the stored document as it was.
    pub fn sync_document(&self, path: &Path) -> Result<SyncOutcome> {
        let (document, version) = self.load_document(path)?;
        let layout_name = self.layout_of(path, &document.text)?;
        let layout = self.resolve(&layout_name)?;

        let result = diff(layout, &document.parsed.sections);
        self.with_metrics(ServiceMetrics::record_reconciliation);

        let rewritten = self.reconciler.rewrite(
            layout,
            &document.parsed,
            &document.text,
            &self.config.reconcile,
        )?;

        let written = rewritten != document.text;
        if written {
            self.store.write_if_unchanged(path, version, &rewritten)?;
            self.cache.invalidate(&cache_key(path));
            let inserted = result.missing_sections.len();
            self.with_metrics(|m| m.record_rewrite(inserted));
        }

        self.logger.emit(
            LogLevel::Info,
            TARGET_SERVICE,
            "document_synced",
            [
                json_str("path", path.display().to_string()),
                json_str("layout", layout_name.clone()),
                json_kv("inserted", json!(result.missing_sections)),
                json_kv("written", written),
            ],
        );

        if self.config.switch_view_after_sync {
            self.view.switch_to(path, ViewMode::Layout);
        }

        Ok(SyncOutcome {
            layout: layout_name,
            inserted: result.missing_sections,
            written,
        })
    }

    /// Create a new document at `path` holding every section of `layout_name`.
    pub fn create_document(&self, path: &Path, layout_name: &str) -> Result<Document> {
        let layout = self.resolve(layout_name)?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !self.store.exists(parent) {
                self.store.create_folder(parent)?;
            }
        }

        let title = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| layout.name.clone());
        let preamble = vec![
            "---".to_string(),
            format!("{}: {}", self.config.layout_field, layout.name),
            "---".to_string(),
            format!("# {title}"),
        ];
        let text = self
            .reconciler
            .render_new_document(layout, &preamble, &self.config.reconcile);
        let document = self.store.create(path, &text)?;

        self.logger.emit(
            LogLevel::Info,
            TARGET_SERVICE,
            "document_created",
            [
                json_str("path", path.display().to_string()),
                json_str("layout", layout.name.clone()),
            ],
        );
        Ok(document)
    }

    pub fn metrics_snapshot(&self) -> Option<MetricSnapshot> {
        let handle = self.config.metrics.as_ref()?;
        let snapshot = handle.lock().ok()?.snapshot();
        Some(snapshot)
    }

    /// Log the current metrics snapshot, if metrics are enabled.
    pub fn emit_metrics(&self) {
        if let Some(snapshot) = self.metrics_snapshot() {
            let _ = self
                .logger
                .log_event(snapshot.to_log_event(&self.config.metrics_target));
        }
    }

    /// Stop the cache sweeper and drop cached documents.
    pub fn shutdown(&mut self) {
        self.cache.dispose();
    }

    fn load_document(&self, path: &Path) -> Result<(Arc<CachedDocument>, SourceVersion)> {
        let version = self.store.version(path)?;
        let key = cache_key(path);

        if let Some(hit) = self.cache.get(&key, version) {
            self.with_metrics(|m| m.record_cache(true));
            return Ok((hit, version));
        }

        self.with_metrics(|m| m.record_cache(false));
        let text = self.store.read(path)?;
        let parsed = ParsedDocument::parse(&text);
        let document = Arc::new(CachedDocument { text, parsed });
        self.cache.insert(key, version, Arc::clone(&document));
        Ok((document, version))
    }

    fn layout_of(&self, path: &Path, text: &str) -> Result<String> {
        self.metadata
            .layout_name(text)
            .ok_or_else(|| GridnoteError::MissingLayoutField {
                path: path.to_path_buf(),
            })
    }

    fn resolve(&self, name: &str) -> Result<&LayoutDefinition> {
        self.registry
            .get(name)
            .ok_or_else(|| GridnoteError::LayoutNotFound(name.to_string()))
    }

    fn after_load(&self, report: &LoadReport) {
        self.with_metrics(|m| m.record_load(report.loaded.len(), report.rejected.len()));
        // Cached parses stay valid; only layout lookups changed.
        for rejected in &report.rejected {
            self.logger.emit(
                LogLevel::Warn,
                TARGET_SERVICE,
                "layout_set_rejected_entry",
                [
                    json_str("layout", rejected.name.clone()),
                    json_kv("violations", rejected.violations.len()),
                ],
            );
        }
    }

    fn with_metrics<F>(&self, update: F)
    where
        F: FnOnce(&mut ServiceMetrics),
    {
        if let Some(handle) = self.config.metrics.as_ref() {
            if let Ok(mut metrics) = handle.lock() {
                update(&mut metrics);
            }
        }
    }
}

fn cache_key(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
