//! Grid geometry shared by the world, the pathfinder and adapters.

use glam::Vec2;
use serde::{Deserialize, Serialize};

const DEFAULT_CELL_LENGTH: f32 = 50.0;
const DEFAULT_TOLERANCE_RATIO: f32 = 0.1;

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell. Rows grow with the vertical axis.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }
}

/// Maps continuous world positions onto square navigation cells.
///
/// The grid is anchored at `origin`, which marks the lower-left corner of cell
/// `(0, 0)`. Columns advance along the x axis and rows along the y axis.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridGeometry {
    origin: Vec2,
    cell_length: f32,
    centering_tolerance: f32,
}

impl GridGeometry {
    /// Creates a new geometry description.
    ///
    /// `centering_tolerance` is the largest per-axis offset from a cell centre
    /// at which a position still counts as centred within that cell.
    #[must_use]
    pub const fn new(origin: Vec2, cell_length: f32, centering_tolerance: f32) -> Self {
        Self {
            origin,
            cell_length,
            centering_tolerance,
        }
    }

    /// Creates a geometry anchored at the world origin whose centring tolerance
    /// is a tenth of the cell length.
    #[must_use]
    pub fn with_cell_length(cell_length: f32) -> Self {
        Self::new(Vec2::ZERO, cell_length, cell_length * DEFAULT_TOLERANCE_RATIO)
    }

    /// Lower-left corner of the grid in world units.
    #[must_use]
    pub const fn origin(&self) -> Vec2 {
        self.origin
    }

    /// Side length of a single cell in world units.
    #[must_use]
    pub const fn cell_length(&self) -> f32 {
        self.cell_length
    }

    /// Per-axis tolerance used by [`GridGeometry::is_within_cell`].
    #[must_use]
    pub const fn centering_tolerance(&self) -> f32 {
        self.centering_tolerance
    }

    /// Returns the cell containing the provided position.
    ///
    /// Positions left of or below the origin clamp onto the first column or row.
    #[must_use]
    pub fn nearest_cell(&self, position: Vec2) -> CellCoord {
        let local = (position - self.origin) / self.cell_length;
        CellCoord::new(
            local.x.floor().max(0.0) as u32,
            local.y.floor().max(0.0) as u32,
        )
    }

    /// Returns the centre of the provided cell in world units.
    #[must_use]
    pub fn cell_center(&self, cell: CellCoord) -> Vec2 {
        let index = Vec2::new(cell.column() as f32, cell.row() as f32);
        self.origin + (index + Vec2::splat(0.5)) * self.cell_length
    }

    /// Reports whether the position sits at the centre of the cell, within tolerance.
    #[must_use]
    pub fn is_within_cell(&self, position: Vec2, cell: CellCoord) -> bool {
        let offset = (position - self.cell_center(cell)).abs();
        offset.max_element() <= self.centering_tolerance
    }

    /// Reports whether the position lies inside a grid of the provided dimensions.
    #[must_use]
    pub fn contains(&self, position: Vec2, columns: u32, rows: u32) -> bool {
        let extent = Vec2::new(columns as f32, rows as f32) * self.cell_length;
        let local = position - self.origin;
        local.x >= 0.0 && local.y >= 0.0 && local.x <= extent.x && local.y <= extent.y
    }
}

impl Default for GridGeometry {
    fn default() -> Self {
        Self::with_cell_length(DEFAULT_CELL_LENGTH)
    }
}

/// Dense traversability grid consulted by pathfinders.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraversalMap {
    columns: u32,
    rows: u32,
    blocked: Vec<bool>,
}

impl TraversalMap {
    /// Creates a fully traversable map of the provided dimensions.
    #[must_use]
    pub fn new(columns: u32, rows: u32) -> Self {
        let capacity_u64 = u64::from(columns) * u64::from(rows);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        Self {
            columns,
            rows,
            blocked: vec![false; capacity],
        }
    }

    /// Provides the dimensions of the map as `(columns, rows)`.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    /// Reports whether the cell lies inside the map.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.columns && cell.row() < self.rows
    }

    /// Reports whether the cell cannot be traversed. Cells outside the map are blocked.
    #[must_use]
    pub fn is_blocked(&self, cell: CellCoord) -> bool {
        self.index(cell)
            .and_then(|index| self.blocked.get(index).copied())
            .unwrap_or(true)
    }

    /// Updates the traversability of a cell, returning whether anything changed.
    pub fn set_blocked(&mut self, cell: CellCoord, blocked: bool) -> bool {
        let Some(slot) = self.index(cell).and_then(|index| self.blocked.get_mut(index)) else {
            return false;
        };
        if *slot == blocked {
            return false;
        }
        *slot = blocked;
        true
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if !self.contains(cell) {
            return None;
        }
        let row = usize::try_from(cell.row()).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        let width = usize::try_from(self.columns).ok()?;
        row.checked_mul(width)?.checked_add(column)
    }
}

/// External route planner consumed by path-following enemies.
pub trait Pathfinder {
    /// Returns the ordered cells leading from `start` to `target`.
    ///
    /// Implementations return an empty route when the target is unreachable.
    fn find_path(&self, start: CellCoord, target: CellCoord, map: &TraversalMap)
        -> Vec<CellCoord>;
}
