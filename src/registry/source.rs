use std::path::PathBuf;

use serde_json::{Map, Value};

use crate::error::{GridnoteError, Result};

use super::core::LayoutName;

/// Raw, not yet validated definitions in source order.
pub type Definitions = Vec<(LayoutName, Value)>;

/// Static source of layout definitions consulted by
/// [`LayoutRegistry::reload`](super::LayoutRegistry::reload).
pub trait DefinitionSource: std::fmt::Debug + Send + Sync {
    fn definitions(&self) -> Result<Definitions>;
}

/// Parse `{ "name": [ {title, x, y, w, h}, ... ], ... }` keeping key order.
pub fn parse_definitions(text: &str) -> Result<Definitions> {
    let map: Map<String, Value> = serde_json::from_str(text)?;
    Ok(map.into_iter().collect())
}

/// Definitions held as JSON text.
#[derive(Debug, Clone)]
pub struct JsonDefinitions {
    text: String,
}

impl JsonDefinitions {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl DefinitionSource for JsonDefinitions {
    fn definitions(&self) -> Result<Definitions> {
        parse_definitions(&self.text)
    }
}

/// Definitions read from a JSON file on every reload.
#[derive(Debug, Clone)]
pub struct FileDefinitions {
    path: PathBuf,
}

impl FileDefinitions {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DefinitionSource for FileDefinitions {
    fn definitions(&self) -> Result<Definitions> {
        let text = std::fs::read_to_string(&self.path)
            .map_err(|err| GridnoteError::io(&self.path, err))?;
        parse_definitions(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_source_reads_on_demand() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("layouts.json");
        std::fs::write(&path, r#"{"a": [], "b": []}"#).unwrap();

        let source = FileDefinitions::new(&path);
        let names: Vec<_> = source
            .definitions()
            .unwrap()
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(names, vec!["a".to_string(), "b".to_string()]);

        std::fs::remove_file(&path).unwrap();
        let err = source.definitions().unwrap_err();
        assert!(err.is_io_failure());
    }

    #[test]
    fn top_level_must_be_an_object() {
        assert!(matches!(
            parse_definitions("[1, 2]"),
            Err(GridnoteError::Definitions(_))
        ));
    }
}
