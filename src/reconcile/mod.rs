//! Section reconciliation.
//!
//! Compares a document's `##` sections against the titles a layout requires
//! and rewrites the document so every required section exists.

mod core;
mod options;
pub mod placeholder;

pub use self::core::{ReconciliationResult, SectionReconciler, diff};
pub use options::{InsertPosition, ReconcileOptions};
pub use placeholder::{GENERIC_PLACEHOLDER, PlaceholderContext, PlaceholderRule, PlaceholderTable};
