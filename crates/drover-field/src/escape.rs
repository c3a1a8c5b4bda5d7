//! Multi-source escape-field generation.

use crate::flow::STEP_BACK;
use drover_core::{Cell, MapVersion, MoveClass, Vec2};
use drover_grid::{Grid, ObstacleMap, NEIGHBOUR_OFFSETS};
use std::collections::VecDeque;

/// A per-cell vector field guiding agents out of blocked cells.
///
/// Every blocked cell holds a unit vector toward the open cell that
/// reached it first in a multi-source flood fill; open cells hold
/// [`Vec2::ZERO`], so every lookup is total. Built once per
/// obstacle-map version and reused for every agent of that movement
/// class until the map changes.
///
/// Following a blocked cell's vector across one cell boundary per pass
/// reaches an open cell in bounded steps: each vector points at the
/// cell's flood-fill parent, which is strictly closer to the open
/// region.
#[derive(Clone, Debug, PartialEq)]
pub struct EscapeField {
    grid: Grid<Vec2>,
    class: MoveClass,
    version: MapVersion,
}

impl EscapeField {
    /// Width in cells.
    pub fn width(&self) -> u32 {
        self.grid.width()
    }

    /// Height in cells.
    pub fn height(&self) -> u32 {
        self.grid.height()
    }

    /// The movement class of the map this field was built from.
    pub fn class(&self) -> MoveClass {
        self.class
    }

    /// The obstacle-map version this field was built from.
    pub fn version(&self) -> MapVersion {
        self.version
    }

    /// Escape vector at `cell`. Open cells and out-of-bounds queries
    /// yield [`Vec2::ZERO`].
    pub fn vector(&self, cell: Cell) -> Vec2 {
        self.grid.get(cell).copied().unwrap_or(Vec2::ZERO)
    }

    /// Escape vector at the cell containing a world position.
    pub fn vector_at(&self, pos: Vec2) -> Vec2 {
        self.vector(Cell::containing(pos))
    }
}

/// Build the escape field for an obstacle map.
///
/// Breadth-first flood fill seeded from every open cell simultaneously
/// (in row-major order), visiting neighbours in
/// [`NEIGHBOUR_OFFSETS`] order — the same fixed order as flow-field
/// planning, so the output is reproducible. Each blocked cell is
/// assigned the unit vector toward the neighbour through which it was
/// first reached. A map with no open cells produces an all-zero field;
/// the escape pass then degrades to "no movement" rather than faulting.
pub fn build_escape_field(map: &ObstacleMap) -> EscapeField {
    // The map guarantees non-zero dimensions, so construction cannot fail.
    let mut grid =
        Grid::new(map.width(), map.height(), Vec2::ZERO).expect("map dimensions are non-zero");
    let mut visited = vec![false; grid.len()];
    let mut queue = VecDeque::new();

    for (cell, blocked) in map.grid().iter_cells() {
        if !*blocked {
            if let Some(i) = grid.index(cell) {
                visited[i] = true;
                queue.push_back(cell);
            }
        }
    }

    while let Some(cell) = queue.pop_front() {
        for (k, (dx, dy)) in NEIGHBOUR_OFFSETS.iter().enumerate() {
            let n = cell.offset(*dx, *dy);
            let Some(ni) = grid.index(n) else { continue };
            if visited[ni] || !map.is_blocked(n) {
                continue;
            }
            visited[ni] = true;
            let _ = grid.set(n, STEP_BACK[k].unit());
            queue.push_back(n);
        }
    }

    EscapeField {
        grid,
        class: map.class(),
        version: map.version(),
    }
}
