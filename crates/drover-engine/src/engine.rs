//! The movement engine: composition root and per-tick driver.

use crate::assignment::{MoveAssignment, MoveTarget};
use crate::config::{ConfigError, EngineConfig};
use crate::metrics::{PlanPickup, TickMetrics};
use crate::planner::{MovementPlanner, SubmitError};
use drover_collision::{CollisionResolver, TerrainIndex};
use drover_core::{Agent, AgentId, AssignmentId, MoveClass, StructureLookup, TickId};
use drover_field::{build_escape_field, EscapeField};
use drover_grid::ObstacleMap;
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

/// Errors from [`MovementEngine::set_obstacle_map`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapUpdateError {
    /// The replacement map does not match the engine's dimensions.
    DimensionMismatch {
        /// The engine's map dimensions.
        expected: (u32, u32),
        /// The replacement's dimensions.
        found: (u32, u32),
    },
    /// The planner worker has shut down.
    PlannerShutdown,
}

impl fmt::Display for MapUpdateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DimensionMismatch { expected, found } => write!(
                f,
                "replacement map is {}x{}, engine maps are {}x{}",
                found.0, found.1, expected.0, expected.1
            ),
            Self::PlannerShutdown => write!(f, "planner worker has shut down"),
        }
    }
}

impl std::error::Error for MapUpdateError {}

/// Terrain view handed to the collision resolver.
struct EngineTerrain<'a> {
    maps: &'a [Arc<ObstacleMap>; 3],
    escapes: &'a [Arc<EscapeField>; 3],
}

impl TerrainIndex for EngineTerrain<'_> {
    fn obstacle_map(&self, class: MoveClass) -> &ObstacleMap {
        &self.maps[class.index()]
    }
    fn escape_field(&self, class: MoveClass) -> &EscapeField {
        &self.escapes[class.index()]
    }
}

/// The movement-planning and collision-resolution engine.
///
/// Owned by the simulation's composition root and driven once per
/// fixed-step tick. The engine owns the background planner, the current
/// obstacle-map snapshot and escape field of every movement class, the
/// collision resolver, and the registry of live assignments.
///
/// The per-tick order is fixed: plan pickup → command stepping →
/// collision relaxation passes → escape pass
/// ([`tick`](MovementEngine::tick) packages it; the pieces are public
/// for loops that need to interleave other work).
#[derive(Debug)]
pub struct MovementEngine {
    config: EngineConfig,
    planner: MovementPlanner,
    resolver: CollisionResolver,
    maps: [Arc<ObstacleMap>; 3],
    escapes: [Arc<EscapeField>; 3],
    assignments: IndexMap<AssignmentId, Arc<MoveAssignment>>,
    tick: TickId,
}

impl MovementEngine {
    /// Build an engine from a validated config and the initial obstacle
    /// map of each movement class. All three maps must share dimensions
    /// and sit in their own class slot; escape fields are built
    /// immediately.
    pub fn new(
        config: EngineConfig,
        ground: ObstacleMap,
        water: ObstacleMap,
        amphibious: ObstacleMap,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        for (map, slot) in [
            (&ground, MoveClass::Ground),
            (&water, MoveClass::Water),
            (&amphibious, MoveClass::Amphibious),
        ] {
            if map.class() != slot {
                return Err(ConfigError::WrongMapClass {
                    expected: slot,
                    found: map.class(),
                });
            }
            if (map.width(), map.height()) != (ground.width(), ground.height()) {
                return Err(ConfigError::MapDimensionMismatch {
                    expected: (ground.width(), ground.height()),
                    found: (map.width(), map.height()),
                });
            }
        }

        let resolver =
            CollisionResolver::new(ground.width(), ground.height(), config.resolver_config());
        let escapes = [
            Arc::new(build_escape_field(&ground)),
            Arc::new(build_escape_field(&water)),
            Arc::new(build_escape_field(&amphibious)),
        ];
        Ok(Self {
            config,
            planner: MovementPlanner::new(),
            resolver,
            maps: [Arc::new(ground), Arc::new(water), Arc::new(amphibious)],
            escapes,
            assignments: IndexMap::new(),
            tick: TickId(0),
        })
    }

    /// The active configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The current obstacle-map snapshot for a movement class.
    pub fn obstacle_map(&self, class: MoveClass) -> &Arc<ObstacleMap> {
        &self.maps[class.index()]
    }

    /// The current escape field for a movement class.
    pub fn escape_field(&self, class: MoveClass) -> &Arc<EscapeField> {
        &self.escapes[class.index()]
    }

    /// Number of live assignments in the registry.
    pub fn assignment_count(&self) -> usize {
        self.assignments.len()
    }

    /// Look up a live assignment.
    pub fn assignment(&self, id: AssignmentId) -> Option<&Arc<MoveAssignment>> {
        self.assignments.get(&id)
    }

    /// Issue a move order: create an assignment for the group and queue
    /// its flow-field computation. The returned handle is what each
    /// "move to" command steers by.
    pub fn issue_move_order(
        &mut self,
        members: &[AgentId],
        target: MoveTarget,
        class: MoveClass,
    ) -> Result<Arc<MoveAssignment>, SubmitError> {
        let assignment = MoveAssignment::new(target, class, members);
        self.planner.submit(
            Arc::clone(&assignment),
            Arc::clone(&self.maps[class.index()]),
        )?;
        self.assignments
            .insert(assignment.id(), Arc::clone(&assignment));
        Ok(assignment)
    }

    /// Cancel an order. The assignment is flagged invalid and picked up
    /// lazily: dependent commands finish without error and the record
    /// is pruned at the next pickup.
    pub fn cancel_order(&self, assignment: &MoveAssignment) {
        assignment.invalidate();
    }

    /// Install a new obstacle map for its movement class (the "map
    /// changed" signal from the map/building subsystem).
    ///
    /// Rebuilds the escape field for the class and re-queues a plan for
    /// every live assignment of that class against the new snapshot.
    /// In-flight computations against the old version are left to
    /// finish; their results are discarded at pickup by the
    /// [`MapVersion`](drover_core::MapVersion) check.
    pub fn set_obstacle_map(&mut self, map: ObstacleMap) -> Result<(), MapUpdateError> {
        let expected = (self.maps[0].width(), self.maps[0].height());
        if (map.width(), map.height()) != expected {
            return Err(MapUpdateError::DimensionMismatch {
                expected,
                found: (map.width(), map.height()),
            });
        }
        let class = map.class();
        let idx = class.index();
        let map = Arc::new(map);
        self.escapes[idx] = Arc::new(build_escape_field(&map));
        self.maps[idx] = map;

        for assignment in self.assignments.values() {
            if assignment.class() == class && !assignment.is_invalid() {
                self.planner
                    .submit(Arc::clone(assignment), Arc::clone(&self.maps[idx]))
                    .map_err(|_| MapUpdateError::PlannerShutdown)?;
            }
        }
        Ok(())
    }

    /// Non-blocking pickup of finished flow fields, called once per
    /// tick. Installs fresh results, discards stale and cancelled ones,
    /// invalidates emptied assignments, and prunes dead records.
    pub fn collect_completed(&mut self) -> PlanPickup {
        let mut pickup = PlanPickup::default();

        for result in self.planner.collect_completed() {
            let assignment = result.assignment;
            let Some(flow) = result.flow else {
                pickup.failed += 1;
                continue;
            };
            if assignment.is_invalid() {
                pickup.cancelled += 1;
                continue;
            }
            if assignment.member_count() == 0 {
                assignment.invalidate();
                pickup.invalidated += 1;
                continue;
            }
            let current = self.maps[assignment.class().index()].version();
            if flow.version() != current {
                pickup.stale_discarded += 1;
                continue;
            }
            assignment.install_flow(flow);
            pickup.installed += 1;
        }

        // Lazy lifecycle sweep: emptied groups become invalid, invalid
        // records leave the registry (commands holding an Arc see the
        // flag and self-terminate).
        for assignment in self.assignments.values() {
            if !assignment.is_invalid() && assignment.member_count() == 0 {
                assignment.invalidate();
                pickup.invalidated += 1;
            }
        }
        let before = self.assignments.len();
        self.assignments.retain(|_, a| !a.is_invalid());
        pickup.pruned += (before - self.assignments.len()) as u64;

        pickup
    }

    /// Run collision resolution for this tick: the configured
    /// relaxation passes plus the escape-field pass, against the
    /// current terrain snapshot.
    pub fn resolve_collisions(
        &mut self,
        agents: &mut [Agent],
        structures: &(impl StructureLookup + ?Sized),
    ) -> drover_collision::ResolveMetrics {
        let terrain = EngineTerrain {
            maps: &self.maps,
            escapes: &self.escapes,
        };
        self.resolver.resolve(agents, structures, &terrain)
    }

    /// Drive one full tick in the fixed order: plan pickup, the
    /// caller's command stepping, then collision resolution.
    ///
    /// `step_commands` is the seam for the ability/command layer: it
    /// receives the agent slice after fresh flow fields are installed
    /// and before overlaps are resolved.
    pub fn tick(
        &mut self,
        agents: &mut [Agent],
        structures: &(impl StructureLookup + ?Sized),
        step_commands: impl FnOnce(&mut [Agent]),
    ) -> TickMetrics {
        self.tick = TickId(self.tick.0 + 1);
        for assignment in self.assignments.values() {
            assignment.clear_active();
        }

        let pickup = self.collect_completed();
        step_commands(agents);
        let resolve = self.resolve_collisions(agents, structures);

        TickMetrics {
            tick: self.tick,
            pickup,
            resolve,
        }
    }
}
