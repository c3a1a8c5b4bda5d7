//! Flow-field and escape-field generation.
//!
//! Both generators are breadth-first flood fills over an
//! [`ObstacleMap`](drover_grid::ObstacleMap), sharing one fixed
//! neighbour order ([`drover_grid::NEIGHBOUR_OFFSETS`]) so their output
//! is reproducible:
//!
//! - [`plan_flow_field`] floods outward from a destination (or a
//!   structure footprint) and records, per cell, the direction of the
//!   step back toward the destination. This is the expensive, per-order
//!   computation that the planner runs off the simulation thread.
//! - [`build_escape_field`] floods outward from *every open cell at
//!   once* and records, per blocked cell, the unit vector toward the
//!   open region. It runs once per obstacle-map version.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

mod error;
mod escape;
mod flow;

pub use error::PlanError;
pub use escape::{build_escape_field, EscapeField};
pub use flow::{plan_flow_field, FlowDir, FlowField, FlowTarget};
