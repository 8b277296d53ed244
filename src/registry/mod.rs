//! Layout registry.
//!
//! Owns validated layout definitions, their descriptive metadata and the
//! sources they are loaded from.

pub mod builtin;
mod core;
mod metadata;
mod source;

pub use builtin::{BuiltinDefinitions, builtin_catalog};
pub use self::core::{LayoutDefinition, LayoutName, LayoutRegistry, LoadReport, RejectedLayout};
pub use metadata::{CuratedMetadata, DEFAULT_CATEGORY, LayoutMetadata, MetadataCatalog};
pub use source::{DefinitionSource, Definitions, FileDefinitions, JsonDefinitions, parse_definitions};
