use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::core::LayoutDefinition;

/// Category assigned to layouts without curated metadata.
pub const DEFAULT_CATEGORY: &str = "custom";

/// Descriptive information about a registered layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutMetadata {
    pub display_name: String,
    pub description: String,
    pub sections: Vec<String>,
    pub block_count: usize,
    pub category: String,
}

/// Hand-written descriptive fields. Structural fields always come from the
/// layout itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CuratedMetadata {
    pub display_name: String,
    pub description: String,
    pub category: String,
}

impl CuratedMetadata {
    pub fn new(
        display_name: impl Into<String>,
        description: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            display_name: display_name.into(),
            description: description.into(),
            category: category.into(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MetadataCatalog {
    entries: HashMap<String, CuratedMetadata>,
}

impl MetadataCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, layout: impl Into<String>, metadata: CuratedMetadata) {
        self.entries.insert(layout.into(), metadata);
    }

    pub fn with(mut self, layout: impl Into<String>, metadata: CuratedMetadata) -> Self {
        self.insert(layout, metadata);
        self
    }

    pub fn curated(&self, layout: &str) -> Option<&CuratedMetadata> {
        self.entries.get(layout)
    }

    pub fn describe(&self, layout: &LayoutDefinition) -> LayoutMetadata {
        let sections: Vec<String> = layout
            .section_names()
            .into_iter()
            .map(str::to_string)
            .collect();
        let block_count = layout.blocks.len();

        match self.curated(&layout.name) {
            Some(curated) => LayoutMetadata {
                display_name: curated.display_name.clone(),
                description: curated.description.clone(),
                sections,
                block_count,
                category: curated.category.clone(),
            },
            None => LayoutMetadata {
                display_name: display_name_from(&layout.name),
                description: format!("{} sections: {}", sections.len(), sections.join(", ")),
                sections,
                block_count,
                category: DEFAULT_CATEGORY.to_string(),
            },
        }
    }
}

/// `weekly-planner` becomes `Weekly Planner`.
fn display_name_from(name: &str) -> String {
    let words: Vec<String> = name
        .split(['-', '_', ' '])
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect();

    if words.is_empty() {
        name.to_string()
    } else {
        words.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Block;

    fn layout(name: &str) -> LayoutDefinition {
        LayoutDefinition {
            name: name.to_string(),
            blocks: vec![
                Block::new("Goals", 0, 0, 24, 6),
                Block::new("Tasks", 0, 6, 24, 6),
            ],
        }
    }

    #[test]
    fn fallback_synthesizes_from_blocks() {
        let meta = MetadataCatalog::new().describe(&layout("project_board-v2"));
        assert_eq!(meta.display_name, "Project Board V2");
        assert_eq!(meta.description, "2 sections: Goals, Tasks");
        assert_eq!(meta.category, DEFAULT_CATEGORY);
        assert_eq!(meta.block_count, 2);
    }

    #[test]
    fn curated_fields_override_description_only() {
        let catalog = MetadataCatalog::new().with(
            "board",
            CuratedMetadata::new("Board", "Track goals and tasks", "planning"),
        );
        let meta = catalog.describe(&layout("board"));
        assert_eq!(meta.display_name, "Board");
        assert_eq!(meta.category, "planning");
        assert_eq!(meta.sections, vec!["Goals".to_string(), "Tasks".to_string()]);
    }

    #[test]
    fn fallback_never_fails_on_empty_layouts() {
        let empty = LayoutDefinition {
            name: "--".to_string(),
            blocks: Vec::new(),
        };
        let meta = MetadataCatalog::new().describe(&empty);
        assert_eq!(meta.display_name, "--");
        assert_eq!(meta.block_count, 0);
    }
}
