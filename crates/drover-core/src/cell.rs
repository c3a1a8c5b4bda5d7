//! Integer grid-cell coordinates.

use crate::vec::Vec2;
use std::fmt;

/// A cell coordinate on a tile grid.
///
/// One cell spans one world unit, so the cell containing a world
/// position is found by flooring both components. Coordinates are
/// signed so that neighbour arithmetic near the origin cannot
/// underflow; bounds checking is the grid's job, never the coordinate's.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cell {
    /// Column (east positive).
    pub x: i32,
    /// Row (south positive).
    pub y: i32,
}

impl Cell {
    /// Create a cell coordinate.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The cell containing a world position.
    ///
    /// ```
    /// use drover_core::{Cell, Vec2};
    ///
    /// assert_eq!(Cell::containing(Vec2::new(3.7, 0.2)), Cell::new(3, 0));
    /// assert_eq!(Cell::containing(Vec2::new(-0.1, 5.0)), Cell::new(-1, 5));
    /// ```
    pub fn containing(pos: Vec2) -> Self {
        Self::new(pos.x.floor() as i32, pos.y.floor() as i32)
    }

    /// The world position of this cell's center.
    pub fn center(self) -> Vec2 {
        Vec2::new(self.x as f32 + 0.5, self.y as f32 + 0.5)
    }

    /// The cell displaced by `(dx, dy)`.
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn containing_floors_components() {
        assert_eq!(Cell::containing(Vec2::new(0.0, 0.0)), Cell::new(0, 0));
        assert_eq!(Cell::containing(Vec2::new(0.999, 0.999)), Cell::new(0, 0));
        assert_eq!(Cell::containing(Vec2::new(1.0, 2.0)), Cell::new(1, 2));
    }

    #[test]
    fn center_is_half_cell_in() {
        assert_eq!(Cell::new(2, 3).center(), Vec2::new(2.5, 3.5));
    }

    #[test]
    fn offset_arithmetic() {
        assert_eq!(Cell::new(1, 1).offset(-1, 2), Cell::new(0, 3));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn containing_agrees_with_floor(x in -100.0f32..100.0, y in -100.0f32..100.0) {
                let cell = Cell::containing(Vec2::new(x, y));
                prop_assert_eq!(cell.x, x.floor() as i32);
                prop_assert_eq!(cell.y, y.floor() as i32);
                // The position lies inside its cell's unit square.
                prop_assert!(cell.x as f32 <= x && x < cell.x as f32 + 1.0);
                prop_assert!(cell.y as f32 <= y && y < cell.y as f32 + 1.0);
            }
        }
    }
}
