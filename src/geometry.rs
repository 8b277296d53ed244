use serde::{Deserialize, Serialize};

/// Number of columns in the layout grid.
pub const GRID_COLS: i64 = 24;
/// Number of rows in the layout grid.
pub const GRID_ROWS: i64 = 100;
/// Blocks must be strictly larger than this on both axes.
pub const MIN_SIZE: i64 = 2;

/// Rectangular region of a layout, anchored on the grid.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Block {
    pub title: String,
    pub x: i64,
    pub y: i64,
    pub w: i64,
    pub h: i64,
}

impl Block {
    pub fn new(title: impl Into<String>, x: i64, y: i64, w: i64, h: i64) -> Self {
        Self {
            title: title.into(),
            x,
            y,
            w,
            h,
        }
    }

    pub fn right(&self) -> i64 {
        self.x.saturating_add(self.w)
    }

    pub fn bottom(&self) -> i64 {
        self.y.saturating_add(self.h)
    }

    /// Half-open intersection test over `[x, x+w) × [y, y+h)`.
    pub fn intersects(&self, other: &Block) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Cells covered by the block, row by row.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        (self.y..self.bottom()).flat_map(move |y| (self.x..self.right()).map(move |x| Cell { x, y }))
    }
}

/// Single grid coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub x: i64,
    pub y: i64,
}

impl Cell {
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}
