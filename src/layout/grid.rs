//! Grid validation - bounds checking and overlap detection for layout blocks
//!
//! Every block of a layout is placed on a fixed grid (24 columns × 100 rows by
//! default). Validation is exhaustive rather than fail-fast: all violations of
//! a layout are collected in a single pass so authors see every conflict.
//!
//! # Example
//! ```
//! use gridnote::geometry::Block;
//! use gridnote::layout::grid::validate_layout;
//!
//! let report = validate_layout(&[
//!     Block::new("Left", 0, 0, 12, 10),
//!     Block::new("Right", 12, 0, 12, 10),
//! ]);
//! assert!(report.valid);
//! ```

use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;

use crate::geometry::{Block, Cell, GRID_COLS, GRID_ROWS, MIN_SIZE};

/// Dimensions and minimum block size of the validation grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridBounds {
    pub cols: i64,
    pub rows: i64,
    /// Blocks must be strictly wider and taller than this.
    pub min_size: i64,
}

impl Default for GridBounds {
    fn default() -> Self {
        Self {
            cols: GRID_COLS,
            rows: GRID_ROWS,
            min_size: MIN_SIZE,
        }
    }
}

impl GridBounds {
    pub fn contains(&self, block: &Block) -> bool {
        block.x >= 0
            && block.y >= 0
            && block.w > self.min_size
            && block.h > self.min_size
            && block.right() <= self.cols
            && block.bottom() <= self.rows
    }
}

/// A single geometry problem found while validating a layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    /// Block is missing a field or a field has the wrong primitive kind.
    MalformedBlock { index: usize, reason: String },
    /// Block leaves the grid or is too small.
    OutOfBounds { index: usize, block: Block },
    /// Block covers a cell already claimed by an earlier block.
    Overlap {
        index: usize,
        title: String,
        conflicting: String,
        cell: Cell,
    },
}

impl Violation {
    pub fn index(&self) -> usize {
        match self {
            Self::MalformedBlock { index, .. }
            | Self::OutOfBounds { index, .. }
            | Self::Overlap { index, .. } => *index,
        }
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedBlock { index, reason } => {
                write!(f, "block #{index} is malformed: {reason}")
            }
            Self::OutOfBounds { index, block } => write!(
                f,
                "block #{index} `{}` out of bounds (x={}, y={}, w={}, h={})",
                block.title, block.x, block.y, block.w, block.h
            ),
            Self::Overlap {
                index,
                title,
                conflicting,
                cell,
            } => write!(
                f,
                "block #{index} `{title}` overlaps `{conflicting}` at ({}, {})",
                cell.x, cell.y
            ),
        }
    }
}

/// Outcome of validating one layout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    fn from_violations(violations: Vec<Violation>) -> Self {
        Self {
            valid: violations.is_empty(),
            violations,
        }
    }

    pub fn overlaps(&self) -> impl Iterator<Item = &Violation> {
        self.violations
            .iter()
            .filter(|v| matches!(v, Violation::Overlap { .. }))
    }
}

/// Cells claimed so far, keyed by cell, remembering which block came first.
///
/// Sparse, so memory follows the placed blocks rather than the grid bounds.
#[derive(Default)]
struct Occupancy<'a> {
    owners: HashMap<Cell, &'a str>,
}

impl<'a> Occupancy<'a> {
    /// Marks every cell of `block`, returning the first conflicting cell per
    /// earlier owner in scan order.
    fn place(&mut self, block: &'a Block) -> Vec<(&'a str, Cell)> {
        let mut conflicts: Vec<(&'a str, Cell)> = Vec::new();
        for cell in block.cells() {
            match self.owners.get(&cell) {
                Some(&owner) => {
                    if !conflicts.iter().any(|(seen, _)| *seen == owner) {
                        conflicts.push((owner, cell));
                    }
                }
                None => {
                    self.owners.insert(cell, block.title.as_str());
                }
            }
        }
        conflicts
    }
}

/// Validate typed blocks against the default 24×100 grid.
pub fn validate_layout(blocks: &[Block]) -> ValidationReport {
    validate_layout_in(blocks, GridBounds::default())
}

/// Validate typed blocks against custom grid bounds.
pub fn validate_layout_in(blocks: &[Block], bounds: GridBounds) -> ValidationReport {
    let mut violations = Vec::new();
    check_blocks(blocks.iter().enumerate(), bounds, &mut violations);
    violations.sort_by_key(Violation::index);
    ValidationReport::from_violations(violations)
}

/// Validate untyped definition entries, reporting structural problems as
/// [`Violation::MalformedBlock`] before running bounds and overlap checks.
pub fn validate_raw(raw: &[Value]) -> (ValidationReport, Vec<Block>) {
    validate_raw_in(raw, GridBounds::default())
}

pub fn validate_raw_in(raw: &[Value], bounds: GridBounds) -> (ValidationReport, Vec<Block>) {
    let mut violations = Vec::new();
    let mut parsed = Vec::with_capacity(raw.len());

    for (index, value) in raw.iter().enumerate() {
        match block_from_value(value) {
            Ok(block) => parsed.push((index, block)),
            Err(reason) => violations.push(Violation::MalformedBlock { index, reason }),
        }
    }

    check_blocks(parsed.iter().map(|(i, b)| (*i, b)), bounds, &mut violations);
    violations.sort_by_key(Violation::index);
    let blocks = parsed.into_iter().map(|(_, block)| block).collect();
    (ValidationReport::from_violations(violations), blocks)
}

fn check_blocks<'a>(
    blocks: impl Iterator<Item = (usize, &'a Block)>,
    bounds: GridBounds,
    violations: &mut Vec<Violation>,
) {
    let mut grid = Occupancy::default();
    for (index, block) in blocks {
        if !bounds.contains(block) {
            violations.push(Violation::OutOfBounds {
                index,
                block: block.clone(),
            });
            continue;
        }

        for (owner, cell) in grid.place(block) {
            violations.push(Violation::Overlap {
                index,
                title: block.title.clone(),
                conflicting: owner.to_string(),
                cell,
            });
        }
    }
}

fn block_from_value(value: &Value) -> std::result::Result<Block, String> {
    let object = value
        .as_object()
        .ok_or_else(|| format!("expected an object, found {}", kind_of(value)))?;

    let title = match object.get("title") {
        Some(Value::String(title)) => title.clone(),
        Some(other) => return Err(format!("`title` must be a string, found {}", kind_of(other))),
        None => return Err("missing field `title`".to_string()),
    };

    let int_field = |name: &str| -> std::result::Result<i64, String> {
        match object.get(name) {
            Some(Value::Number(n)) => n
                .as_i64()
                .ok_or_else(|| format!("`{name}` must be an integer, found {n}")),
            Some(other) => Err(format!("`{name}` must be an integer, found {}", kind_of(other))),
            None => Err(format!("missing field `{name}`")),
        }
    };

    Ok(Block {
        x: int_field("x")?,
        y: int_field("y")?,
        w: int_field("w")?,
        h: int_field("h")?,
        title,
    })
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn side_by_side_blocks_are_valid() {
        let report = validate_layout(&[
            Block::new("Left", 0, 0, 12, 10),
            Block::new("Right", 12, 0, 12, 10),
        ]);
        assert!(report.valid);
        assert!(report.violations.is_empty());
    }

    #[test]
    fn overlap_reports_first_conflicting_cell() {
        let report = validate_layout(&[
            Block::new("Left", 0, 0, 12, 10),
            Block::new("Right", 10, 0, 12, 10),
        ]);
        assert!(!report.valid);
        assert_eq!(report.violations.len(), 1);
        match &report.violations[0] {
            Violation::Overlap {
                index,
                title,
                conflicting,
                cell,
            } => {
                assert_eq!(*index, 1);
                assert_eq!(title, "Right");
                assert_eq!(conflicting, "Left");
                assert_eq!(*cell, Cell::new(10, 0));
            }
            other => panic!("expected overlap, got {other:?}"),
        }
    }

    #[test]
    fn overlap_checks_against_every_earlier_block() {
        let report = validate_layout(&[
            Block::new("A", 0, 0, 6, 6),
            Block::new("B", 6, 0, 6, 6),
            Block::new("C", 4, 4, 6, 6),
        ]);
        let conflicts: Vec<_> = report
            .overlaps()
            .map(|v| match v {
                Violation::Overlap { conflicting, .. } => conflicting.as_str(),
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(conflicts, vec!["A", "B"]);
    }

    #[test]
    fn out_of_bounds_block_is_not_marked() {
        let report = validate_layout(&[
            Block::new("Wide", 20, 0, 10, 10),
            Block::new("Inside", 20, 0, 4, 10),
        ]);
        assert_eq!(report.violations.len(), 1);
        assert!(matches!(
            report.violations[0],
            Violation::OutOfBounds { index: 0, .. }
        ));
    }

    #[test]
    fn size_must_exceed_minimum() {
        let report = validate_layout(&[Block::new("Tiny", 0, 0, 2, 5)]);
        assert!(!report.valid);
        let report = validate_layout(&[Block::new("Small", 0, 0, 3, 3)]);
        assert!(report.valid);
    }

    #[test]
    fn bottom_edge_is_inclusive_of_grid_rows() {
        assert!(validate_layout(&[Block::new("Tail", 0, 90, 24, 10)]).valid);
        assert!(!validate_layout(&[Block::new("Tail", 0, 91, 24, 10)]).valid);
    }

    #[test]
    fn negative_origin_is_out_of_bounds() {
        let report = validate_layout(&[Block::new("Neg", -1, 0, 5, 5)]);
        assert!(matches!(
            report.violations[0],
            Violation::OutOfBounds { .. }
        ));
    }

    #[test]
    fn malformed_entries_are_reported_and_skipped() {
        let raw = vec![
            json!({"title": "Ok", "x": 0, "y": 0, "w": 6, "h": 6}),
            json!({"title": "NoH", "x": 6, "y": 0, "w": 6}),
            json!({"title": 3, "x": 0, "y": 0, "w": 6, "h": 6}),
            json!({"title": "Float", "x": 0.5, "y": 0, "w": 6, "h": 6}),
            json!("not a block"),
        ];
        let (report, blocks) = validate_raw(&raw);
        assert!(!report.valid);
        assert_eq!(blocks.len(), 1);
        assert_eq!(report.violations.len(), 4);
        assert!(
            report
                .violations
                .iter()
                .all(|v| matches!(v, Violation::MalformedBlock { .. }))
        );
        assert_eq!(
            report.violations.iter().map(Violation::index).collect::<Vec<_>>(),
            vec![1, 2, 3, 4]
        );
    }

    #[test]
    fn all_violations_surface_in_one_pass() {
        let raw = vec![
            json!({"title": "A", "x": 0, "y": 0, "w": 12, "h": 10}),
            json!({"title": "B", "x": 30, "y": 0, "w": 12, "h": 10}),
            json!({"title": "C", "x": 6, "y": 5, "w": 12, "h": 10}),
            json!({"title": "D"}),
        ];
        let (report, _) = validate_raw(&raw);
        let kinds: Vec<_> = report.violations.iter().map(Violation::index).collect();
        assert_eq!(kinds, vec![1, 2, 3]);
    }

    #[test]
    fn custom_bounds_shrink_the_grid() {
        let bounds = GridBounds {
            cols: 12,
            rows: 12,
            min_size: 1,
        };
        let report = validate_layout_in(&[Block::new("A", 0, 0, 13, 2)], bounds);
        assert!(!report.valid);
        let report = validate_layout_in(&[Block::new("A", 0, 0, 12, 2)], bounds);
        assert!(report.valid);
    }

    #[test]
    fn valid_layouts_have_disjoint_rectangles() {
        let blocks = [
            Block::new("A", 0, 0, 8, 8),
            Block::new("B", 8, 0, 8, 8),
            Block::new("C", 16, 0, 8, 8),
            Block::new("D", 0, 8, 24, 20),
        ];
        assert!(validate_layout(&blocks).valid);
        for (i, a) in blocks.iter().enumerate() {
            for b in blocks.iter().skip(i + 1) {
                assert!(!a.intersects(b));
            }
        }
    }

    #[test]
    fn huge_bounds_validate_without_allocating_the_grid() {
        let bounds = GridBounds {
            cols: i64::MAX,
            rows: i64::MAX,
            min_size: MIN_SIZE,
        };
        let report = validate_layout_in(
            &[
                Block::new("Left", 0, 0, 12, 10),
                Block::new("Right", 10, 0, 12, 10),
                Block::new("Far", i64::MAX - 5, i64::MAX - 5, 4, 4),
            ],
            bounds,
        );
        assert_eq!(report.violations.len(), 1);
        assert!(matches!(
            &report.violations[0],
            Violation::Overlap { index: 1, cell, .. } if *cell == Cell::new(10, 0)
        ));
    }
}
