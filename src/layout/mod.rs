//! Layout geometry validation.
//!
//! Downstream modules import validation types from here while the
//! implementation lives in `grid`.

pub mod grid;

pub use grid::{
    GridBounds, ValidationReport, Violation, validate_layout, validate_layout_in, validate_raw,
    validate_raw_in,
};
