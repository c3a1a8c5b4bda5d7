//! Error types for grid construction and mutation.

use drover_core::Cell;
use std::fmt;

/// Errors arising from grid construction or checked mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    /// Attempted to construct a grid with a zero dimension.
    EmptyGrid,
    /// A cell coordinate is outside the grid bounds.
    CellOutOfBounds {
        /// The offending coordinate.
        cell: Cell,
        /// Grid width in cells.
        width: u32,
        /// Grid height in cells.
        height: u32,
    },
    /// Two grids that must share dimensions do not.
    DimensionMismatch {
        /// Dimensions of the first grid.
        expected: (u32, u32),
        /// Dimensions of the second grid.
        found: (u32, u32),
    },
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyGrid => write!(f, "grid must have at least one cell"),
            Self::CellOutOfBounds {
                cell,
                width,
                height,
            } => {
                write!(f, "cell {cell} out of bounds: [0, {width}) x [0, {height})")
            }
            Self::DimensionMismatch { expected, found } => {
                write!(
                    f,
                    "grid dimensions {}x{} do not match {}x{}",
                    found.0, found.1, expected.0, expected.1
                )
            }
        }
    }
}

impl std::error::Error for GridError {}
