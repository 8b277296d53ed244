use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use crate::cache::SourceVersion;
use crate::error::{GridnoteError, Result};

use super::{Document, DocumentStore};

/// Store backed by files under a root directory.
///
/// Versions are modification times in nanoseconds. Compare-and-swap uses the
/// trait's default check-then-write.
#[derive(Debug, Clone)]
pub struct FsDocumentStore {
    root: PathBuf,
}

impl FsDocumentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }
}

impl DocumentStore for FsDocumentStore {
    fn read(&self, path: &Path) -> Result<String> {
        fs::read_to_string(self.resolve(path)).map_err(|err| GridnoteError::io(path, err))
    }

    fn write(&self, path: &Path, text: &str) -> Result<()> {
        fs::write(self.resolve(path), text).map_err(|err| GridnoteError::io(path, err))
    }

    fn exists(&self, path: &Path) -> bool {
        self.resolve(path).exists()
    }

    fn create(&self, path: &Path, text: &str) -> Result<Document> {
        use std::io::Write;

        let full = self.resolve(path);
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&full)
            .map_err(|err| GridnoteError::io(path, err))?;
        file.write_all(text.as_bytes())
            .map_err(|err| GridnoteError::io(path, err))?;
        drop(file);

        Ok(Document {
            path: path.to_path_buf(),
            version: self.version(path)?,
        })
    }

    fn create_folder(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(self.resolve(path)).map_err(|err| GridnoteError::io(path, err))
    }

    fn version(&self, path: &Path) -> Result<SourceVersion> {
        let modified = fs::metadata(self.resolve(path))
            .and_then(|meta| meta.modified())
            .map_err(|err| GridnoteError::io(path, err))?;
        let since_epoch = modified
            .duration_since(UNIX_EPOCH)
            .map_err(|err| GridnoteError::io(path, io::Error::new(io::ErrorKind::InvalidData, err)))?;
        Ok(since_epoch.as_nanos() as SourceVersion)
    }
}
