//! Grid layouts for markdown notes.
//!
//! A layout is a named set of titled blocks on a 24-column grid. Each block
//! corresponds to a `## <title>` section of a note; the crate validates
//! layout geometry, diffs a note's sections against its declared layout and
//! rewrites the note so every section exists in the layout's order.

pub mod cache;
pub mod error;
pub mod geometry;
pub mod layout;
pub mod logging;
pub mod metrics;
pub mod reconcile;
pub mod registry;
pub mod sections;
pub mod service;
pub mod store;
pub mod view;

pub use cache::{CacheStats, Clock, ManualClock, MemoCache, SourceVersion, SystemClock};
pub use error::{GridnoteError, Result};
pub use geometry::{Block, Cell, GRID_COLS, GRID_ROWS, MIN_SIZE};
pub use layout::{GridBounds, ValidationReport, Violation, validate_layout, validate_raw};
pub use logging::{LogEvent, LogFields, LogLevel, Logger, LoggingError, LoggingResult};
pub use metrics::{MetricSnapshot, ServiceMetrics};
pub use reconcile::{
    InsertPosition, PlaceholderTable, ReconcileOptions, ReconciliationResult, SectionReconciler,
};
pub use registry::{
    BuiltinDefinitions, DefinitionSource, LayoutDefinition, LayoutMetadata, LayoutRegistry,
    LoadReport, MetadataCatalog, RejectedLayout,
};
pub use sections::{ParsedDocument, ParsedSection};
pub use service::{CachedDocument, LayoutService, ServiceConfig, SyncOutcome};
pub use store::{
    Document, DocumentStore, FrontmatterMetadataProvider, FsDocumentStore, MemoryDocumentStore,
    MetadataProvider,
};
pub use view::{NullViewSwitcher, ViewMode, ViewSwitcher};
