//! Per-movement-class obstacle maps.

use crate::error::GridError;
use crate::grid::Grid;
use drover_core::{Cell, MapVersion, MoveClass, Vec2};

/// Boolean grid of blocked cells for one movement class.
///
/// Produced exclusively by the map/building subsystem — the movement
/// core only ever reads it, through an immutable snapshot
/// (`Arc<ObstacleMap>`) once handed to the planner. A change to terrain
/// or building placement produces a *new* map with a bumped
/// [`MapVersion`]; maps are never mutated in place after submission.
///
/// Out-of-bounds cells count as blocked, so callers never need a
/// separate bounds check before a blocking query.
#[derive(Clone, Debug, PartialEq)]
pub struct ObstacleMap {
    grid: Grid<bool>,
    class: MoveClass,
    version: MapVersion,
}

impl ObstacleMap {
    /// Create an all-open map.
    pub fn new(
        width: u32,
        height: u32,
        class: MoveClass,
        version: MapVersion,
    ) -> Result<Self, GridError> {
        Ok(Self {
            grid: Grid::new(width, height, false)?,
            class,
            version,
        })
    }

    /// Create a map from a per-cell predicate (`true` = blocked).
    ///
    /// ```
    /// use drover_core::{MapVersion, MoveClass};
    /// use drover_grid::ObstacleMap;
    ///
    /// // A vertical wall at x == 3.
    /// let map = ObstacleMap::from_fn(8, 8, MoveClass::Ground, MapVersion(1), |c| c.x == 3)
    ///     .unwrap();
    /// assert!(map.is_blocked(drover_core::Cell::new(3, 5)));
    /// assert!(!map.is_blocked(drover_core::Cell::new(2, 5)));
    /// ```
    pub fn from_fn(
        width: u32,
        height: u32,
        class: MoveClass,
        version: MapVersion,
        mut blocked: impl FnMut(Cell) -> bool,
    ) -> Result<Self, GridError> {
        let mut map = Self::new(width, height, class, version)?;
        for y in 0..height as i32 {
            for x in 0..width as i32 {
                let cell = Cell::new(x, y);
                if blocked(cell) {
                    map.grid.set(cell, true)?;
                }
            }
        }
        Ok(map)
    }

    /// Width in cells.
    pub fn width(&self) -> u32 {
        self.grid.width()
    }

    /// Height in cells.
    pub fn height(&self) -> u32 {
        self.grid.height()
    }

    /// The movement class this map applies to.
    pub fn class(&self) -> MoveClass {
        self.class
    }

    /// The version this map was built at.
    pub fn version(&self) -> MapVersion {
        self.version
    }

    /// Whether `cell` is blocked. Out-of-bounds is blocked.
    pub fn is_blocked(&self, cell: Cell) -> bool {
        self.grid.get(cell).copied().unwrap_or(true)
    }

    /// Whether the cell containing `pos` is blocked.
    pub fn is_blocked_at(&self, pos: Vec2) -> bool {
        self.is_blocked(Cell::containing(pos))
    }

    /// Mark a cell blocked or open. Used by the map subsystem while
    /// assembling a map, before it is shared.
    pub fn set_blocked(&mut self, cell: Cell, blocked: bool) -> Result<(), GridError> {
        self.grid.set(cell, blocked)
    }

    /// The underlying grid, for generators that walk every cell.
    pub fn grid(&self) -> &Grid<bool> {
        &self.grid
    }

    /// Number of blocked cells.
    pub fn blocked_count(&self) -> usize {
        self.grid.iter_cells().filter(|(_, b)| **b).count()
    }
}
