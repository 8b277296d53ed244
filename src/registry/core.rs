use std::collections::HashMap;

use serde_json::{Value, json};

use crate::error::Result;
use crate::geometry::Block;
use crate::layout::{GridBounds, ValidationReport, Violation, validate_raw_in};
use crate::logging::{LogLevel, Logger, TARGET_REGISTRY, json_kv, json_str};

use super::metadata::{LayoutMetadata, MetadataCatalog};
use super::source::{DefinitionSource, Definitions};

/// Layout name used as the registry key.
pub type LayoutName = String;

/// Validated, immutable layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutDefinition {
    pub name: LayoutName,
    pub blocks: Vec<Block>,
}

impl LayoutDefinition {
    /// Required section titles in layout order.
    ///
    /// A title carried by several blocks is required once, at its first block.
    pub fn section_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::with_capacity(self.blocks.len());
        for block in &self.blocks {
            if !names.contains(&block.title.as_str()) {
                names.push(block.title.as_str());
            }
        }
        names
    }
}

/// A definition that failed validation during load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedLayout {
    pub name: LayoutName,
    pub violations: Vec<Violation>,
}

/// Summary of one load pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub loaded: Vec<LayoutName>,
    pub rejected: Vec<RejectedLayout>,
}

/// Owns the set of valid layout definitions.
///
/// Built explicitly and passed by reference to consumers. State only changes
/// through [`LayoutRegistry::load`] or [`LayoutRegistry::reload`].
#[derive(Debug)]
pub struct LayoutRegistry {
    layouts: Vec<LayoutDefinition>,
    index: HashMap<LayoutName, usize>,
    rejected: Vec<RejectedLayout>,
    catalog: MetadataCatalog,
    bounds: GridBounds,
    source: Option<Box<dyn DefinitionSource>>,
    logger: Logger,
}

impl Default for LayoutRegistry {
    fn default() -> Self {
        Self {
            layouts: Vec::new(),
            index: HashMap::new(),
            rejected: Vec::new(),
            catalog: MetadataCatalog::default(),
            bounds: GridBounds::default(),
            source: None,
            logger: Logger::null(),
        }
    }
}

impl LayoutRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry bound to a definition source, loaded immediately.
    pub fn from_source<S>(source: S) -> Result<Self>
    where
        S: DefinitionSource + 'static,
    {
        let mut registry = Self::new();
        registry.source = Some(Box::new(source));
        registry.reload()?;
        Ok(registry)
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = logger;
        self
    }

    pub fn with_catalog(mut self, catalog: MetadataCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_bounds(mut self, bounds: GridBounds) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn catalog_mut(&mut self) -> &mut MetadataCatalog {
        &mut self.catalog
    }

    /// Replace all layouts with the valid subset of `definitions`.
    ///
    /// Never fails: invalid definitions are logged and recorded in
    /// [`LayoutRegistry::rejected`], the rest are kept in input order.
    pub fn load<I>(&mut self, definitions: I) -> LoadReport
    where
        I: IntoIterator<Item = (LayoutName, Value)>,
    {
        self.layouts.clear();
        self.index.clear();
        self.rejected.clear();

        let mut report = LoadReport::default();
        for (name, raw) in definitions {
            match self.validate_definition(&raw) {
                Ok(blocks) => {
                    self.insert(LayoutDefinition {
                        name: name.clone(),
                        blocks,
                    });
                    if !report.loaded.contains(&name) {
                        report.loaded.push(name);
                    }
                }
                Err(validation) => {
                    self.logger.emit(
                        LogLevel::Warn,
                        TARGET_REGISTRY,
                        "layout_rejected",
                        [
                            json_str("layout", name.clone()),
                            json_kv("violations", json!(validation.violations)),
                        ],
                    );
                    let rejected = RejectedLayout {
                        name,
                        violations: validation.violations,
                    };
                    self.rejected.push(rejected.clone());
                    report.rejected.push(rejected);
                }
            }
        }

        self.logger.emit(
            LogLevel::Info,
            TARGET_REGISTRY,
            "layouts_loaded",
            [
                json_kv("loaded", self.layouts.len()),
                json_kv("rejected", self.rejected.len()),
            ],
        );
        report
    }

    /// Parse a JSON object of `name -> [block, ...]` and load it.
    pub fn load_json(&mut self, text: &str) -> Result<LoadReport> {
        let definitions = super::source::parse_definitions(text)?;
        Ok(self.load(definitions))
    }

    /// Re-read the bound definition source and replace the current layouts.
    ///
    /// Without a bound source this keeps the registry's current contents and
    /// returns an empty report.
    pub fn reload(&mut self) -> Result<LoadReport> {
        let definitions: Definitions = match self.source.as_ref() {
            Some(source) => source.definitions()?,
            None => return Ok(LoadReport::default()),
        };
        Ok(self.load(definitions))
    }

    pub fn get(&self, name: &str) -> Option<&LayoutDefinition> {
        self.index.get(name).map(|&idx| &self.layouts[idx])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Layout names in the order they were first loaded.
    pub fn list_names(&self) -> Vec<&str> {
        self.layouts.iter().map(|l| l.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.layouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layouts.is_empty()
    }

    /// Definitions dropped by the most recent load.
    pub fn rejected(&self) -> &[RejectedLayout] {
        &self.rejected
    }

    /// Curated metadata when available, otherwise metadata derived from the
    /// layout's blocks. `None` only for unknown layouts.
    pub fn get_metadata(&self, name: &str) -> Option<LayoutMetadata> {
        let layout = self.get(name)?;
        Some(self.catalog.describe(layout))
    }

    fn insert(&mut self, layout: LayoutDefinition) {
        match self.index.get(&layout.name) {
            Some(&idx) => self.layouts[idx] = layout,
            None => {
                self.index.insert(layout.name.clone(), self.layouts.len());
                self.layouts.push(layout);
            }
        }
    }

    fn validate_definition(&self, raw: &Value) -> std::result::Result<Vec<Block>, ValidationReport> {
        let Some(entries) = raw.as_array() else {
            return Err(ValidationReport {
                valid: false,
                violations: vec![Violation::MalformedBlock {
                    index: 0,
                    reason: "layout definition must be an array of blocks".to_string(),
                }],
            });
        };

        let (report, blocks) = validate_raw_in(entries, self.bounds);
        if report.valid { Ok(blocks) } else { Err(report) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::MemorySink;
    use crate::registry::source::JsonDefinitions;

    fn definitions() -> Vec<(LayoutName, Value)> {
        vec![
            (
                "A".to_string(),
                json!([
                    {"title": "Left", "x": 0, "y": 0, "w": 12, "h": 10},
                    {"title": "Right", "x": 12, "y": 0, "w": 12, "h": 10},
                ]),
            ),
            (
                "Broken".to_string(),
                json!([
                    {"title": "Left", "x": 0, "y": 0, "w": 12, "h": 10},
                    {"title": "Right", "x": 10, "y": 0, "w": 12, "h": 10},
                ]),
            ),
            (
                "Single".to_string(),
                json!([{"title": "Only", "x": 0, "y": 0, "w": 24, "h": 100}]),
            ),
        ]
    }

    #[test]
    fn load_keeps_valid_and_drops_invalid() {
        let sink = MemorySink::new();
        let mut registry = LayoutRegistry::new().with_logger(Logger::new(sink.clone()));
        let report = registry.load(definitions());

        assert_eq!(report.loaded, vec!["A".to_string(), "Single".to_string()]);
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.rejected[0].name, "Broken");
        assert_eq!(registry.list_names(), vec!["A", "Single"]);
        assert!(registry.get("Broken").is_none());
        assert!(sink.messages().contains(&"layout_rejected".to_string()));
    }

    #[test]
    fn load_clears_previous_state() {
        let mut registry = LayoutRegistry::new();
        registry.load(definitions());
        registry.load(vec![(
            "Fresh".to_string(),
            json!([{"title": "X", "x": 0, "y": 0, "w": 4, "h": 4}]),
        )]);
        assert_eq!(registry.list_names(), vec!["Fresh"]);
        assert!(registry.rejected().is_empty());
        assert!(!registry.contains("A"));
    }

    #[test]
    fn non_array_definition_is_rejected() {
        let mut registry = LayoutRegistry::new();
        let report = registry.load(vec![("Odd".to_string(), json!({"title": "x"}))]);
        assert!(report.loaded.is_empty());
        assert!(matches!(
            report.rejected[0].violations[0],
            Violation::MalformedBlock { .. }
        ));
    }

    #[test]
    fn unknown_layout_lookups_are_absent() {
        let registry = LayoutRegistry::new();
        assert!(registry.get("nope").is_none());
        assert!(registry.get_metadata("nope").is_none());
    }

    #[test]
    fn metadata_falls_back_to_block_titles() {
        let mut registry = LayoutRegistry::new();
        registry.load(definitions());
        let meta = registry.get_metadata("A").unwrap();
        assert_eq!(meta.sections, vec!["Left".to_string(), "Right".to_string()]);
        assert_eq!(meta.block_count, 2);
        assert_eq!(meta.category, "custom");
        assert_eq!(meta.display_name, "A");
    }

    #[test]
    fn reload_rereads_bound_source() {
        let source = JsonDefinitions::new(r#"{"One": [{"title": "T", "x": 0, "y": 0, "w": 3, "h": 3}]}"#);
        let mut registry = LayoutRegistry::from_source(source).unwrap();
        assert_eq!(registry.list_names(), vec!["One"]);

        registry.load(definitions());
        assert_eq!(registry.len(), 2);
        let report = registry.reload().unwrap();
        assert_eq!(report.loaded, vec!["One".to_string()]);
        assert_eq!(registry.list_names(), vec!["One"]);
    }

    #[test]
    fn load_json_preserves_document_order() {
        let mut registry = LayoutRegistry::new();
        registry
            .load_json(
                r#"{
                    "zeta": [{"title": "Z", "x": 0, "y": 0, "w": 3, "h": 3}],
                    "alpha": [{"title": "A", "x": 0, "y": 0, "w": 3, "h": 3}]
                }"#,
            )
            .unwrap();
        assert_eq!(registry.list_names(), vec!["zeta", "alpha"]);
    }

    #[test]
    fn load_json_rejects_malformed_text() {
        let mut registry = LayoutRegistry::new();
        assert!(registry.load_json("{not json").is_err());
    }
}
