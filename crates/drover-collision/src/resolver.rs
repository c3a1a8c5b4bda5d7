//! Pairwise collision resolution and the escape-field pass.

use crate::hash::SpatialHash;
use crate::metrics::ResolveMetrics;
use drover_core::{Agent, MoveClass, StructureLookup, Vec2};
use drover_field::EscapeField;
use drover_grid::ObstacleMap;

/// Read access to the current obstacle map and escape field of each
/// movement class. Implemented by the engine's composition root; tests
/// supply a single-map stand-in.
pub trait TerrainIndex {
    /// The current obstacle map for a movement class.
    fn obstacle_map(&self, class: MoveClass) -> &ObstacleMap;
    /// The escape field built from that map.
    fn escape_field(&self, class: MoveClass) -> &EscapeField;
}

/// Tunables for the collision resolver.
#[derive(Clone, Debug)]
pub struct ResolverConfig {
    /// Relaxation passes per tick. Two passes settle the common
    /// three-body pile-ups; one is enough for isolated pairs.
    pub passes: u32,
    /// Bucket size of the spatial hash, in world units. Must be at
    /// least twice the largest agent radius so that contacts never
    /// span more than one bucket.
    pub hash_cell_size: f32,
    /// Nudge applied to separate agents at exactly zero distance.
    pub push_epsilon: f32,
    /// Distance past a cell boundary an escape correction travels, so
    /// the agent's center actually crosses into the next cell.
    pub escape_overshoot: f32,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            passes: 2,
            hash_cell_size: 2.0,
            push_epsilon: 1e-4,
            escape_overshoot: 1e-3,
        }
    }
}

/// Per-tick collision resolver.
///
/// [`resolve`](CollisionResolver::resolve) runs the configured number
/// of relaxation passes and then one escape-field pass. Each pass
/// rebuilds the spatial hash, walks agents in ascending slice index,
/// and evaluates every candidate pair exactly once under the
/// ascending-index pair key. Structures are queried from the
/// [`StructureLookup`] seam, not the hash.
///
/// The outcome is deterministic: identical agent slices, structures,
/// and terrain produce bit-identical final positions.
#[derive(Debug)]
pub struct CollisionResolver {
    config: ResolverConfig,
    hash: SpatialHash,
    structure_buf: Vec<(Vec2, f32)>,
}

impl CollisionResolver {
    /// Create a resolver for a map of `map_width` × `map_height` world
    /// units.
    pub fn new(map_width: u32, map_height: u32, config: ResolverConfig) -> Self {
        let hash = SpatialHash::new(map_width, map_height, config.hash_cell_size);
        Self {
            config,
            hash,
            structure_buf: Vec::new(),
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolve all overlaps for this tick.
    ///
    /// Runs `config.passes` relaxation passes, then the escape-field
    /// pass. Degenerate geometry (zero-distance pairs, zero escape
    /// vectors) degrades to "no movement" rather than faulting.
    pub fn resolve(
        &mut self,
        agents: &mut [Agent],
        structures: &(impl StructureLookup + ?Sized),
        terrain: &dyn TerrainIndex,
    ) -> ResolveMetrics {
        let mut metrics = ResolveMetrics::default();
        for _ in 0..self.config.passes {
            self.run_pass(agents, structures, terrain, &mut metrics);
        }
        self.escape_pass(agents, terrain, &mut metrics);
        metrics
    }

    fn run_pass(
        &mut self,
        agents: &mut [Agent],
        structures: &(impl StructureLookup + ?Sized),
        terrain: &dyn TerrainIndex,
        metrics: &mut ResolveMetrics,
    ) {
        self.hash.rebuild(agents);

        for i in 0..agents.len() {
            if !agents[i].physical {
                continue;
            }

            // Structures first: they never move, so the agent takes the
            // whole correction.
            let (query_pos, query_radius) = (agents[i].pos, agents[i].radius);
            let buf = &mut self.structure_buf;
            buf.clear();
            structures.for_each_near(query_pos, query_radius, &mut |s| {
                buf.push((s.pos, s.radius));
            });
            for &(s_pos, s_radius) in self.structure_buf.iter() {
                let a = &mut agents[i];
                let mut delta = a.pos - s_pos;
                let mut dist = delta.length();
                if dist == 0.0 {
                    a.pos.x += self.config.push_epsilon;
                    metrics.degenerate_nudges += 1;
                    delta = a.pos - s_pos;
                    dist = delta.length();
                }
                let radius_sum = a.radius + s_radius;
                if dist >= radius_sum {
                    continue;
                }
                let dir = delta / dist;
                a.pos += dir * (radius_sum - dist);
                metrics.structure_pushes += 1;
            }

            // Agent pairs via the hash. Only neighbours with a larger
            // index are visited, so each pair is evaluated exactly once
            // per pass under a stable key.
            let pos = agents[i].pos;
            for j in self.hash.neighbours(pos) {
                if j <= i || !agents[j].physical {
                    continue;
                }
                metrics.pairs_tested += 1;
                resolve_agent_pair(agents, i, j, &self.config, terrain, metrics);
            }
        }
    }

    fn escape_pass(
        &self,
        agents: &mut [Agent],
        terrain: &dyn TerrainIndex,
        metrics: &mut ResolveMetrics,
    ) {
        for agent in agents.iter_mut() {
            if !agent.physical {
                continue;
            }
            if escape_correct(agent, terrain, self.config.escape_overshoot) {
                metrics.escape_corrections += 1;
            }
        }
    }
}

/// Apply the pairwise push policy to agents `i < j`.
fn resolve_agent_pair(
    agents: &mut [Agent],
    i: usize,
    j: usize,
    config: &ResolverConfig,
    terrain: &dyn TerrainIndex,
    metrics: &mut ResolveMetrics,
) {
    debug_assert!(i < j);
    let (lo, hi) = agents.split_at_mut(j);
    let a = &mut lo[i];
    let e = &mut hi[0];

    if a.debris && e.debris {
        return;
    }

    let mut delta = a.pos - e.pos;
    let mut dist = delta.length();
    if dist == 0.0 {
        a.pos.x += config.push_epsilon;
        metrics.degenerate_nudges += 1;
        delta = a.pos - e.pos;
        dist = delta.length();
    }
    let radius_sum = a.radius + e.radius;
    if dist >= radius_sum {
        return;
    }

    // Unit separation axis pointing from E toward A, and half the
    // overlap as the base push.
    let dir = delta / dist;
    let push = dir * ((radius_sum - dist) * 0.5);

    if e.debris {
        // Debris passively yields: only the live agent is pushed.
        a.pos += push;
    } else if a.debris {
        e.pos -= push;
    } else if a.faction != e.faction {
        // Across factions the mover flows around the one standing still.
        match (a.wants_to_move, e.wants_to_move) {
            (true, false) => a.pos += push * 2.0,
            (false, true) => e.pos -= push * 2.0,
            _ => {
                a.pos += push;
                e.pos -= push;
            }
        }
    } else {
        // Within a faction the shovable one gives way.
        match (a.can_be_moved, e.can_be_moved) {
            (true, false) => a.pos += push * 2.0,
            (false, true) => e.pos -= push * 2.0,
            _ => {
                a.pos += push;
                e.pos -= push;
            }
        }
    }
    metrics.pairs_pushed += 1;

    // A push must never strand either participant inside a blocked
    // cell; correct both immediately rather than waiting for the final
    // escape pass.
    if escape_correct(a, terrain, config.escape_overshoot) {
        metrics.escape_corrections += 1;
    }
    if escape_correct(e, terrain, config.escape_overshoot) {
        metrics.escape_corrections += 1;
    }
}

/// Move an agent out of a blocked cell along the escape field, if its
/// center is inside one. Returns whether the agent moved.
fn escape_correct(agent: &mut Agent, terrain: &dyn TerrainIndex, overshoot: f32) -> bool {
    if !terrain.obstacle_map(agent.class).is_blocked_at(agent.pos) {
        return false;
    }
    let v = terrain.escape_field(agent.class).vector_at(agent.pos);
    match escape_step(agent.pos, v, overshoot) {
        Some(next) => {
            agent.pos = next;
            true
        }
        None => false,
    }
}

/// Advance `pos` along `v` by the minimal positive scalar that crosses
/// the next integer grid boundary on the dominant axis, plus the
/// overshoot. Returns `None` — no movement — when the vector is zero or
/// the scalar is not finite.
fn escape_step(pos: Vec2, v: Vec2, overshoot: f32) -> Option<Vec2> {
    if v == Vec2::ZERO {
        return None;
    }
    let (component, span) = if v.x.abs() >= v.y.abs() {
        let span = if v.x > 0.0 {
            pos.x.floor() + 1.0 - pos.x
        } else {
            pos.x - pos.x.floor()
        };
        (v.x.abs(), span)
    } else {
        let span = if v.y > 0.0 {
            pos.y.floor() + 1.0 - pos.y
        } else {
            pos.y - pos.y.floor()
        };
        (v.y.abs(), span)
    };
    let t = span / component;
    if !t.is_finite() {
        return None;
    }
    let next = pos + v * (t + overshoot);
    if !next.is_finite() {
        return None;
    }
    Some(next)
}
