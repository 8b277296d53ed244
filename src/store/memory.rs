use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use blake3::Hash;

use crate::cache::SourceVersion;
use crate::error::{GridnoteError, Result};

use super::{Document, DocumentStore};

#[derive(Debug, Clone)]
struct StoredDocument {
    text: String,
    hash: Hash,
    version: SourceVersion,
}

#[derive(Debug, Default)]
struct State {
    documents: HashMap<PathBuf, StoredDocument>,
    folders: HashSet<PathBuf>,
    clock: SourceVersion,
}

impl State {
    fn tick(&mut self) -> SourceVersion {
        self.clock += 1;
        self.clock
    }

    fn parent_exists(&self, path: &Path) -> bool {
        match path.parent() {
            None => true,
            Some(parent) if parent.as_os_str().is_empty() => true,
            Some(parent) => self.folders.contains(parent),
        }
    }

    fn store(&mut self, path: &Path, text: &str) -> SourceVersion {
        let hash = blake3::hash(text.as_bytes());
        if let Some(existing) = self.documents.get(path) {
            if existing.hash == hash {
                return existing.version;
            }
        }
        let version = self.tick();
        self.documents.insert(
            path.to_path_buf(),
            StoredDocument {
                text: text.to_string(),
                hash,
                version,
            },
        );
        version
    }
}

/// In-process store with atomic compare-and-swap writes.
///
/// Versions come from a store-wide counter and only advance when content
/// actually changes (compared by blake3 fingerprint).
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    state: Mutex<State>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a document (and its parent folders) directly.
    pub fn with_document(self, path: impl AsRef<Path>, text: &str) -> Self {
        {
            let mut state = self.lock();
            let path = path.as_ref();
            for ancestor in path.ancestors().skip(1) {
                if !ancestor.as_os_str().is_empty() {
                    state.folders.insert(ancestor.to_path_buf());
                }
            }
            state.store(path, text);
        }
        self
    }

    /// Make subsequent reads fail with an I/O error.
    pub fn fail_reads(&self, enabled: bool) {
        self.fail_reads.store(enabled, Ordering::SeqCst);
    }

    /// Make subsequent writes fail with an I/O error.
    pub fn fail_writes(&self, enabled: bool) {
        self.fail_writes.store(enabled, Ordering::SeqCst);
    }

    pub fn paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<_> = self.lock().documents.keys().cloned().collect();
        paths.sort();
        paths
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_writable(&self, path: &Path) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(GridnoteError::io(
                path,
                io::Error::new(io::ErrorKind::Other, "simulated write failure"),
            ));
        }
        Ok(())
    }
}

fn not_found(path: &Path) -> GridnoteError {
    GridnoteError::io(
        path,
        io::Error::new(io::ErrorKind::NotFound, "no such document"),
    )
}

impl DocumentStore for MemoryDocumentStore {
    fn read(&self, path: &Path) -> Result<String> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(GridnoteError::io(
                path,
                io::Error::new(io::ErrorKind::Other, "simulated read failure"),
            ));
        }
        self.lock()
            .documents
            .get(path)
            .map(|doc| doc.text.clone())
            .ok_or_else(|| not_found(path))
    }

    fn write(&self, path: &Path, text: &str) -> Result<()> {
        self.check_writable(path)?;
        let mut state = self.lock();
        if !state.documents.contains_key(path) {
            return Err(not_found(path));
        }
        state.store(path, text);
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        let state = self.lock();
        state.documents.contains_key(path) || state.folders.contains(path)
    }

    fn create(&self, path: &Path, text: &str) -> Result<Document> {
        self.check_writable(path)?;
        let mut state = self.lock();
        if state.documents.contains_key(path) || state.folders.contains(path) {
            return Err(GridnoteError::io(
                path,
                io::Error::new(io::ErrorKind::AlreadyExists, "document already exists"),
            ));
        }
        if !state.parent_exists(path) {
            return Err(GridnoteError::Store {
                path: path.to_path_buf(),
                message: "parent folder does not exist".to_string(),
            });
        }
        let version = state.store(path, text);
        Ok(Document {
            path: path.to_path_buf(),
            version,
        })
    }

    fn create_folder(&self, path: &Path) -> Result<()> {
        self.check_writable(path)?;
        let mut state = self.lock();
        for ancestor in path.ancestors() {
            if !ancestor.as_os_str().is_empty() {
                state.folders.insert(ancestor.to_path_buf());
            }
        }
        Ok(())
    }

    fn version(&self, path: &Path) -> Result<SourceVersion> {
        self.lock()
            .documents
            .get(path)
            .map(|doc| doc.version)
            .ok_or_else(|| not_found(path))
    }

    fn write_if_unchanged(&self, path: &Path, expected: SourceVersion, text: &str) -> Result<()> {
        self.check_writable(path)?;
        let mut state = self.lock();
        let current = state
            .documents
            .get(path)
            .map(|doc| doc.version)
            .ok_or_else(|| not_found(path))?;
        if current != expected {
            return Err(GridnoteError::WriteConflict {
                path: path.to_path_buf(),
            });
        }
        state.store(path, text);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn versions_advance_only_on_change() {
        let store = MemoryDocumentStore::new().with_document("a.md", "one");
        let path = Path::new("a.md");
        let v1 = store.version(path).unwrap();
        store.write(path, "one").unwrap();
        assert_eq!(store.version(path).unwrap(), v1);
        store.write(path, "two").unwrap();
        assert!(store.version(path).unwrap() > v1);
        assert_eq!(store.read(path).unwrap(), "two");
    }

    #[test]
    fn compare_and_swap_rejects_stale_versions() {
        let store = MemoryDocumentStore::new().with_document("a.md", "one");
        let path = Path::new("a.md");
        let seen = store.version(path).unwrap();
        store.write(path, "edited elsewhere").unwrap();

        let err = store.write_if_unchanged(path, seen, "mine").unwrap_err();
        assert!(matches!(err, GridnoteError::WriteConflict { .. }));
        assert_eq!(store.read(path).unwrap(), "edited elsewhere");
    }

    #[test]
    fn create_requires_parent_folder() {
        let store = MemoryDocumentStore::new();
        let path = Path::new("notes/week.md");
        assert!(matches!(
            store.create(path, "x"),
            Err(GridnoteError::Store { .. })
        ));
        store.create_folder(Path::new("notes")).unwrap();
        let doc = store.create(path, "x").unwrap();
        assert_eq!(doc.path, path);
        assert!(store.exists(path));
        assert!(store.create(path, "y").unwrap_err().is_io_failure());
    }

    #[test]
    fn missing_documents_surface_io_failures() {
        let store = MemoryDocumentStore::new();
        let err = store.read(Path::new("ghost.md")).unwrap_err();
        assert!(err.is_io_failure());
        assert!(store.write(Path::new("ghost.md"), "x").is_err());
    }

    #[test]
    fn injected_failures_leave_content_alone() {
        let store = MemoryDocumentStore::new().with_document("a.md", "one");
        store.fail_writes(true);
        assert!(store.write(Path::new("a.md"), "two").unwrap_err().is_io_failure());
        store.fail_writes(false);
        assert_eq!(store.read(Path::new("a.md")).unwrap(), "one");
    }
}
