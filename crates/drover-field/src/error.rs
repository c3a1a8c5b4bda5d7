//! Error types for flow-field planning.

use drover_core::Cell;
use std::fmt;

/// Errors from [`plan_flow_field`](crate::plan_flow_field).
///
/// A failed plan is not an engine fault: the caller marks the owning
/// assignment invalid and dependent commands finish without error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanError {
    /// The destination cell is blocked and is not a structure
    /// footprint, so nothing can ever reach it.
    DestinationBlocked {
        /// The blocked destination cell.
        cell: Cell,
    },
    /// The destination lies outside the obstacle map.
    DestinationOutOfBounds {
        /// The offending cell.
        cell: Cell,
    },
    /// A footprint target with no cells.
    EmptyFootprint,
}

impl fmt::Display for PlanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DestinationBlocked { cell } => {
                write!(f, "destination cell {cell} is permanently blocked")
            }
            Self::DestinationOutOfBounds { cell } => {
                write!(f, "destination cell {cell} is outside the map")
            }
            Self::EmptyFootprint => write!(f, "footprint target has no cells"),
        }
    }
}

impl std::error::Error for PlanError {}
