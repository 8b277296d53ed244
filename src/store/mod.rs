//! Collaborator interfaces consumed by the service layer.
//!
//! `DocumentStore` persists document text; `MetadataProvider` tells which
//! layout a document declares.

mod fs;
mod memory;

pub use fs::FsDocumentStore;
pub use memory::MemoryDocumentStore;

use std::path::{Path, PathBuf};

use crate::cache::SourceVersion;
use crate::error::{GridnoteError, Result};
use crate::sections::frontmatter_value;

/// Handle returned when a document is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub path: PathBuf,
    pub version: SourceVersion,
}

pub trait DocumentStore: Send + Sync {
    fn read(&self, path: &Path) -> Result<String>;
    fn write(&self, path: &Path, text: &str) -> Result<()>;
    fn exists(&self, path: &Path) -> bool;
    fn create(&self, path: &Path, text: &str) -> Result<Document>;
    fn create_folder(&self, path: &Path) -> Result<()>;

    /// Monotonic modification marker of the document at `path`.
    fn version(&self, path: &Path) -> Result<SourceVersion>;

    /// Write only if the document is still at `expected`.
    ///
    /// The default compares versions and then writes, so a change landing
    /// between those two steps is overwritten. Stores that can check and
    /// write atomically override this.
    fn write_if_unchanged(&self, path: &Path, expected: SourceVersion, text: &str) -> Result<()> {
        if self.version(path)? != expected {
            return Err(GridnoteError::WriteConflict {
                path: path.to_path_buf(),
            });
        }
        self.write(path, text)
    }
}

pub trait MetadataProvider: Send + Sync {
    /// Layout declared by a document, if any.
    fn layout_name(&self, text: &str) -> Option<String>;
}

/// Reads the layout name from a key of the leading `---` block.
#[derive(Debug, Clone)]
pub struct FrontmatterMetadataProvider {
    key: String,
}

impl Default for FrontmatterMetadataProvider {
    fn default() -> Self {
        Self::new("layout")
    }
}

impl FrontmatterMetadataProvider {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl MetadataProvider for FrontmatterMetadataProvider {
    fn layout_name(&self, text: &str) -> Option<String> {
        frontmatter_value(text, &self.key)
    }
}
