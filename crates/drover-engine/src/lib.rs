//! Move assignments, the background planner, and the per-tick driver.
//!
//! The simulation thread owns a [`MovementEngine`]; the engine owns the
//! single background [`MovementPlanner`] worker. Flow fields are
//! computed off-thread and installed into their [`MoveAssignment`]
//! records by the non-blocking [`MovementEngine::collect_completed`]
//! pickup, once per tick. Collision resolution and the escape pass run
//! on the simulation thread through the engine's fixed per-tick order.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

mod assignment;
mod config;
mod engine;
mod metrics;
mod planner;

pub use assignment::{MoveAssignment, MoveTarget};
pub use config::{ConfigError, EngineConfig};
pub use engine::{MapUpdateError, MovementEngine};
pub use metrics::{PlanPickup, TickMetrics};
pub use planner::{MovementPlanner, PlanResult, SubmitError};
