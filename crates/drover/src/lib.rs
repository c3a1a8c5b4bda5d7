//! Drover: movement planning and collision resolution for tile-based
//! agent simulations.
//!
//! This is the top-level facade crate that re-exports the public API
//! from all drover sub-crates. For most users, adding `drover` as a
//! single dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use drover::prelude::*;
//!
//! // A 16x16 world with a wall, open water, and the engine defaults.
//! let ground = ObstacleMap::from_fn(16, 16, MoveClass::Ground, MapVersion(1), |c| {
//!     c.x == 8 && c.y != 4
//! })
//! .unwrap();
//! let water = ObstacleMap::new(16, 16, MoveClass::Water, MapVersion(1)).unwrap();
//! let amphibious = ObstacleMap::new(16, 16, MoveClass::Amphibious, MapVersion(1)).unwrap();
//! let mut engine = MovementEngine::new(EngineConfig::default(), ground, water, amphibious).unwrap();
//!
//! // Order an agent east of the wall; the flow field is computed on
//! // the planner thread and installed by a later pickup.
//! let mut agents = vec![Agent::new(
//!     AgentId(1),
//!     Vec2::new(2.5, 4.5),
//!     0.45,
//!     MoveClass::Ground,
//!     FactionId(0),
//! )];
//! let assignment = engine
//!     .issue_move_order(&[AgentId(1)], MoveTarget::Point(Vec2::new(13.5, 4.5)), MoveClass::Ground)
//!     .unwrap();
//!
//! // Each tick: pickup, steer, resolve.
//! let structures: Vec<Structure> = Vec::new();
//! let metrics = engine.tick(&mut agents, &structures[..], |agents| {
//!     for agent in agents.iter_mut() {
//!         if let Some(dir) = assignment.flow_direction(agent.pos) {
//!             agent.pos += dir.unit() * 0.1;
//!             agent.wants_to_move = true;
//!         }
//!     }
//! });
//! assert_eq!(metrics.tick, TickId(1));
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in
//! the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `drover-core` | IDs, `Vec2`, `Cell`, agents, structures |
//! | [`grid`] | `drover-grid` | `Grid<T>`, obstacle maps |
//! | [`field`] | `drover-field` | flow-field and escape-field generators |
//! | [`collision`] | `drover-collision` | spatial hash, collision resolver |
//! | [`engine`] | `drover-engine` | assignments, planner, tick driver |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types and IDs (`drover-core`).
pub use drover_core as types;

/// Grids and obstacle maps (`drover-grid`).
pub use drover_grid as grid;

/// Flow-field and escape-field generation (`drover-field`).
pub use drover_field as field;

/// Spatial hashing and collision resolution (`drover-collision`).
pub use drover_collision as collision;

/// Assignments, background planning, and the tick driver
/// (`drover-engine`).
pub use drover_engine as engine;

/// Common imports for typical drover usage.
///
/// ```rust
/// use drover::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use drover_core::{
        Agent, AgentId, AssignmentId, Cell, FactionId, MapVersion, MoveClass, Structure,
        StructureLookup, TickId, Vec2,
    };

    // Grids
    pub use drover_grid::{Grid, GridError, ObstacleMap};

    // Fields
    pub use drover_field::{
        build_escape_field, plan_flow_field, EscapeField, FlowDir, FlowField, FlowTarget,
        PlanError,
    };

    // Collision
    pub use drover_collision::{CollisionResolver, ResolveMetrics, ResolverConfig, TerrainIndex};

    // Engine
    pub use drover_engine::{
        ConfigError, EngineConfig, MoveAssignment, MoveTarget, MovementEngine, MovementPlanner,
        SubmitError, TickMetrics,
    };
}
