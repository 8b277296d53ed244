use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use gridnote::logging::MemorySink;
use gridnote::registry::builtin;
use gridnote::{
    Document, DocumentStore, GridnoteError, InsertPosition, LayoutRegistry, LayoutService, Logger,
    MemoryDocumentStore, ReconcileOptions, Result, ServiceConfig, SourceVersion,
};

const LAYOUTS: &str = r#"{
    "layout-standup": [
        {"title": "Yesterday", "x": 0, "y": 0, "w": 8, "h": 10},
        {"title": "Today", "x": 8, "y": 0, "w": 8, "h": 10},
        {"title": "Blockers", "x": 16, "y": 0, "w": 8, "h": 10}
    ],
    "layout-overlapping": [
        {"title": "A", "x": 0, "y": 0, "w": 12, "h": 12},
        {"title": "B", "x": 6, "y": 6, "w": 12, "h": 12}
    ]
}"#;

fn config() -> ServiceConfig {
    ServiceConfig {
        sweep_interval: Duration::ZERO,
        ..ServiceConfig::default()
    }
}

fn standup_service(store: Arc<dyn DocumentStore>, config: ServiceConfig) -> LayoutService {
    let mut service = LayoutService::new(LayoutRegistry::new(), store, config);
    let report = service.validate_layout_set(LAYOUTS).unwrap();
    assert_eq!(report.loaded, vec!["layout-standup".to_string()]);
    assert_eq!(report.rejected.len(), 1);
    service
}

#[test]
fn sync_restores_layout_order_and_keeps_extras() {
    let store = Arc::new(MemoryDocumentStore::new().with_document(
        "standup.md",
        "---\nlayout: layout-standup\n---\n# Standup\n\n## Blockers\nnone\n\n## Random\nkeep me\n",
    ));
    let service = standup_service(store.clone(), config());
    let path = Path::new("standup.md");

    let before = service.reconcile_document(path).unwrap();
    assert_eq!(before.missing_sections, vec!["Yesterday", "Today"]);
    assert_eq!(before.extra_sections, vec!["Random"]);

    let outcome = service.sync_document(path).unwrap();
    assert!(outcome.written);

    let text = store.read(path).unwrap();
    let headings: Vec<&str> = text.lines().filter(|l| l.starts_with("## ")).collect();
    assert_eq!(
        headings,
        vec!["## Yesterday", "## Today", "## Blockers", "## Random"]
    );
    assert!(text.starts_with("---\nlayout: layout-standup\n---\n# Standup\n"));
    assert!(text.contains("## Blockers\nnone\n"));
    assert!(text.contains("keep me"));
    assert!(text.ends_with('\n') && !text.ends_with("\n\n"));

    let after = service.reconcile_document(path).unwrap();
    assert!(after.missing_sections.is_empty());
    assert!(!service.sync_document(path).unwrap().written);
    assert_eq!(store.read(path).unwrap(), text);
}

#[test]
fn end_position_appends_without_moving_existing_sections() {
    let original = "---\nlayout: layout-standup\n---\n## Today\nship it\n";
    let store = Arc::new(MemoryDocumentStore::new().with_document("s.md", original));
    let mut cfg = config();
    cfg.reconcile = ReconcileOptions::default()
        .with_position(InsertPosition::End)
        .without_default_content();
    let service = standup_service(store.clone(), cfg);

    service.sync_document(Path::new("s.md")).unwrap();
    let text = store.read(Path::new("s.md")).unwrap();
    assert!(text.starts_with(original));
    let headings: Vec<&str> = text.lines().filter(|l| l.starts_with("## ")).collect();
    assert_eq!(headings, vec!["## Today", "## Yesterday", "## Blockers"]);
}

#[test]
fn duplicate_tracked_sections_abort_layout_order_sync() {
    let original = "---\nlayout: layout-standup\n---\n## Today\none\n## Today\ntwo\n";
    let store = Arc::new(MemoryDocumentStore::new().with_document("dup.md", original));
    let service = standup_service(store.clone(), config());

    let err = service.sync_document(Path::new("dup.md")).unwrap_err();
    match err {
        GridnoteError::DuplicateSections { names, .. } => assert_eq!(names, vec!["Today"]),
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(store.read(Path::new("dup.md")).unwrap(), original);
}

#[test]
fn create_then_sync_is_a_no_op() {
    let store = Arc::new(MemoryDocumentStore::new());
    let registry = LayoutRegistry::from_source(gridnote::BuiltinDefinitions).unwrap();
    let service = LayoutService::new(registry, store.clone(), config());
    let path = Path::new("boards/sprint.md");

    let Document { version, .. } = service.create_document(path, builtin::KANBAN).unwrap();
    assert_eq!(store.version(path).unwrap(), version);
    assert!(service.reconcile_document(path).unwrap().is_complete());
    assert!(!service.sync_document(path).unwrap().written);
    assert_eq!(store.version(path).unwrap(), version);

    let err = service.create_document(path, builtin::KANBAN).unwrap_err();
    assert!(err.is_io_failure());
}

/// Store that lets another writer land between the sync's read and write.
struct RacingStore {
    inner: MemoryDocumentStore,
    raced: AtomicBool,
}

impl DocumentStore for RacingStore {
    fn read(&self, path: &Path) -> Result<String> {
        self.inner.read(path)
    }

    fn write(&self, path: &Path, text: &str) -> Result<()> {
        self.inner.write(path, text)
    }

    fn exists(&self, path: &Path) -> bool {
        self.inner.exists(path)
    }

    fn create(&self, path: &Path, text: &str) -> Result<Document> {
        self.inner.create(path, text)
    }

    fn create_folder(&self, path: &Path) -> Result<()> {
        self.inner.create_folder(path)
    }

    fn version(&self, path: &Path) -> Result<SourceVersion> {
        self.inner.version(path)
    }

    fn write_if_unchanged(&self, path: &Path, expected: SourceVersion, text: &str) -> Result<()> {
        if !self.raced.swap(true, Ordering::SeqCst) {
            self.inner.write(path, "---\nlayout: layout-standup\n---\n## Today\nuser edit\n")?;
        }
        self.inner.write_if_unchanged(path, expected, text)
    }
}

#[test]
fn concurrent_edit_surfaces_write_conflict() {
    let store = Arc::new(RacingStore {
        inner: MemoryDocumentStore::new()
            .with_document("race.md", "---\nlayout: layout-standup\n---\n## Today\n"),
        raced: AtomicBool::new(false),
    });
    let service = standup_service(store.clone(), config());
    let path = Path::new("race.md");

    let err = service.sync_document(path).unwrap_err();
    assert!(matches!(err, GridnoteError::WriteConflict { .. }));
    assert!(store.read(path).unwrap().contains("user edit"));

    // The next attempt sees the new version and succeeds.
    let outcome = service.sync_document(path).unwrap();
    assert!(outcome.written);
    let text = store.read(path).unwrap();
    assert!(text.contains("user edit"));
    assert!(text.contains("## Yesterday"));
}

#[test]
fn service_logs_sync_events() {
    let sink = MemorySink::new();
    let store = Arc::new(
        MemoryDocumentStore::new()
            .with_document("s.md", "---\nlayout: layout-standup\n---\n## Today\n"),
    );
    let mut cfg = config();
    cfg.logger = Some(Logger::new(sink.clone()));
    let service = standup_service(store, cfg);

    service.sync_document(Path::new("s.md")).unwrap();
    let synced = sink
        .events()
        .into_iter()
        .find(|event| event.message == "document_synced")
        .expect("sync event");
    assert_eq!(synced.target, "gridnote::service");
    assert_eq!(synced.fields["written"], serde_json::json!(true));
    assert_eq!(
        synced.fields["inserted"],
        serde_json::json!(["Yesterday", "Blockers"])
    );
}
