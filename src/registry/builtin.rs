//! Layouts shipped with the crate.

use crate::error::Result;

use super::metadata::{CuratedMetadata, MetadataCatalog};
use super::source::{DefinitionSource, Definitions, parse_definitions};

pub const KANBAN: &str = "layout-kanban";
pub const EISENHOWER: &str = "layout-eisenhower";
pub const WEEKLY_PLANNER: &str = "layout-weekly-planner";
pub const CORNELL: &str = "layout-cornell";
pub const TWO_COLUMNS: &str = "layout-two-columns";
pub const DASHBOARD: &str = "layout-dashboard";

const BUILTIN_LAYOUTS: &str = r#"{
  "layout-kanban": [
    {"title": "To Do", "x": 0, "y": 0, "w": 8, "h": 24},
    {"title": "In Progress", "x": 8, "y": 0, "w": 8, "h": 24},
    {"title": "Done", "x": 16, "y": 0, "w": 8, "h": 24}
  ],
  "layout-eisenhower": [
    {"title": "Urgent & Important", "x": 0, "y": 0, "w": 12, "h": 12},
    {"title": "Important, Not Urgent", "x": 12, "y": 0, "w": 12, "h": 12},
    {"title": "Urgent, Not Important", "x": 0, "y": 12, "w": 12, "h": 12},
    {"title": "Not Urgent & Not Important", "x": 12, "y": 12, "w": 12, "h": 12}
  ],
  "layout-weekly-planner": [
    {"title": "Monday", "x": 0, "y": 0, "w": 6, "h": 12},
    {"title": "Tuesday", "x": 6, "y": 0, "w": 6, "h": 12},
    {"title": "Wednesday", "x": 12, "y": 0, "w": 6, "h": 12},
    {"title": "Thursday", "x": 18, "y": 0, "w": 6, "h": 12},
    {"title": "Friday", "x": 0, "y": 12, "w": 6, "h": 12},
    {"title": "Saturday", "x": 6, "y": 12, "w": 6, "h": 12},
    {"title": "Sunday", "x": 12, "y": 12, "w": 6, "h": 12},
    {"title": "Notes", "x": 18, "y": 12, "w": 6, "h": 12}
  ],
  "layout-cornell": [
    {"title": "Cues", "x": 0, "y": 0, "w": 6, "h": 30},
    {"title": "Notes", "x": 6, "y": 0, "w": 18, "h": 30},
    {"title": "Summary", "x": 0, "y": 30, "w": 24, "h": 8}
  ],
  "layout-two-columns": [
    {"title": "Left", "x": 0, "y": 0, "w": 12, "h": 20},
    {"title": "Right", "x": 12, "y": 0, "w": 12, "h": 20}
  ],
  "layout-dashboard": [
    {"title": "Goals", "x": 0, "y": 0, "w": 24, "h": 6},
    {"title": "Tasks", "x": 0, "y": 6, "w": 12, "h": 14},
    {"title": "Resources", "x": 12, "y": 6, "w": 12, "h": 14},
    {"title": "Review", "x": 0, "y": 20, "w": 24, "h": 6}
  ]
}"#;

/// The layouts bundled with the crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinDefinitions;

impl DefinitionSource for BuiltinDefinitions {
    fn definitions(&self) -> Result<Definitions> {
        parse_definitions(BUILTIN_LAYOUTS)
    }
}

/// Curated descriptions for the bundled layouts.
pub fn builtin_catalog() -> MetadataCatalog {
    MetadataCatalog::new()
        .with(
            KANBAN,
            CuratedMetadata::new("Kanban", "Three-column task board", "productivity"),
        )
        .with(
            EISENHOWER,
            CuratedMetadata::new(
                "Eisenhower Matrix",
                "Prioritise tasks by urgency and importance",
                "productivity",
            ),
        )
        .with(
            WEEKLY_PLANNER,
            CuratedMetadata::new("Weekly Planner", "One block per weekday plus notes", "planning"),
        )
        .with(
            CORNELL,
            CuratedMetadata::new("Cornell Notes", "Cues, notes and a closing summary", "study"),
        )
        .with(
            TWO_COLUMNS,
            CuratedMetadata::new("Two Columns", "Side-by-side comparison", "basic"),
        )
        .with(
            DASHBOARD,
            CuratedMetadata::new("Project Dashboard", "Goals, tasks, resources and review", "planning"),
        )
}
