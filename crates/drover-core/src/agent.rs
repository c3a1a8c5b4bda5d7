//! Agent and structure records, movement classes, and the building
//! lookup seam.

use crate::cell::Cell;
use crate::id::AgentId;
use crate::vec::Vec2;
use std::fmt;

/// Movement class of an agent, determining which obstacle map and
/// flow/escape fields apply to it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MoveClass {
    /// Moves on land; water is blocked.
    Ground,
    /// Moves on water; land is blocked.
    Water,
    /// Moves on both land and water.
    Amphibious,
}

impl MoveClass {
    /// All movement classes, in stable order.
    pub const ALL: [MoveClass; 3] = [MoveClass::Ground, MoveClass::Water, MoveClass::Amphibious];

    /// Stable index of this class, for per-class arrays.
    pub const fn index(self) -> usize {
        match self {
            MoveClass::Ground => 0,
            MoveClass::Water => 1,
            MoveClass::Amphibious => 2,
        }
    }
}

impl fmt::Display for MoveClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveClass::Ground => write!(f, "ground"),
            MoveClass::Water => write!(f, "water"),
            MoveClass::Amphibious => write!(f, "amphibious"),
        }
    }
}

/// Identifies the faction an agent belongs to.
///
/// The collision resolver only compares factions for equality; the
/// meaning of a faction is owned by the game layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FactionId(pub u16);

impl fmt::Display for FactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u16> for FactionId {
    fn from(v: u16) -> Self {
        Self(v)
    }
}

/// A mobile agent, reduced to the fields movement and collision need.
///
/// Created and destroyed by the entity lifecycle (external); position is
/// mutated every tick by command stepping and collision resolution.
#[derive(Clone, Debug, PartialEq)]
pub struct Agent {
    /// Stable identity for assignment membership.
    pub id: AgentId,
    /// Center position in world units.
    pub pos: Vec2,
    /// Collision radius in world units.
    pub radius: f32,
    /// Which obstacle map and fields apply.
    pub class: MoveClass,
    /// Faction, compared for equality by the collision policy.
    pub faction: FactionId,
    /// Whether the agent is currently executing a move order. A mover
    /// yields to standing agents of other factions.
    pub wants_to_move: bool,
    /// Whether same-faction neighbours may shove this agent aside.
    pub can_be_moved: bool,
    /// Whether the agent participates in collision at all.
    pub physical: bool,
    /// Inert debris (a corpse): passively yields, never pushed.
    pub debris: bool,
}

impl Agent {
    /// Create an agent with the common defaults: physical, movable by
    /// allies, not currently moving, not debris.
    pub fn new(id: AgentId, pos: Vec2, radius: f32, class: MoveClass, faction: FactionId) -> Self {
        Self {
            id,
            pos,
            radius,
            class,
            faction,
            wants_to_move: false,
            can_be_moved: true,
            physical: true,
            debris: false,
        }
    }

    /// The grid cell containing this agent's center.
    pub fn cell(&self) -> Cell {
        Cell::containing(self.pos)
    }

    /// Builder-style setter for `wants_to_move`.
    #[must_use]
    pub fn moving(mut self, wants_to_move: bool) -> Self {
        self.wants_to_move = wants_to_move;
        self
    }

    /// Builder-style setter for `can_be_moved`.
    #[must_use]
    pub fn immovable(mut self) -> Self {
        self.can_be_moved = false;
        self
    }

    /// Builder-style setter marking this agent as inert debris.
    #[must_use]
    pub fn as_debris(mut self) -> Self {
        self.debris = true;
        self.wants_to_move = false;
        self
    }
}

/// A built structure, as collision and planning see it: a collision
/// circle plus the cell footprint it occupies on the obstacle map.
#[derive(Clone, Debug, PartialEq)]
pub struct Structure {
    /// Center of the collision circle.
    pub pos: Vec2,
    /// Radius of the collision circle.
    pub radius: f32,
    /// Cells stamped as blocked on the obstacle map.
    pub footprint: Vec<Cell>,
}

impl Structure {
    /// Create a structure whose footprint is the single cell under `pos`.
    pub fn single_cell(pos: Vec2, radius: f32) -> Self {
        Self {
            pos,
            radius,
            footprint: vec![Cell::containing(pos)],
        }
    }
}

/// Building lookup by area, consumed from the map/building subsystem.
///
/// The resolver queries structures near each agent through this seam
/// rather than hashing them alongside agents. Implementations must
/// visit candidates in a deterministic order and may over-approximate
/// (visiting a structure that turns out not to overlap is harmless; the
/// resolver re-checks distances exactly).
pub trait StructureLookup {
    /// Visit every structure whose collision circle may intersect a
    /// circle of `radius` at `center`.
    fn for_each_near(&self, center: Vec2, radius: f32, visit: &mut dyn FnMut(&Structure));
}

/// Exact linear scan, sufficient for modest structure counts and tests.
impl StructureLookup for [Structure] {
    fn for_each_near(&self, center: Vec2, radius: f32, visit: &mut dyn FnMut(&Structure)) {
        for s in self {
            if s.pos.distance(center) < s.radius + radius {
                visit(s);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_indices_are_stable() {
        for (i, class) in MoveClass::ALL.iter().enumerate() {
            assert_eq!(class.index(), i);
        }
    }

    #[test]
    fn agent_defaults() {
        let a = Agent::new(
            AgentId(1),
            Vec2::new(2.5, 2.5),
            0.4,
            MoveClass::Ground,
            FactionId(0),
        );
        assert!(a.physical);
        assert!(a.can_be_moved);
        assert!(!a.wants_to_move);
        assert!(!a.debris);
        assert_eq!(a.cell(), Cell::new(2, 2));
    }

    #[test]
    fn debris_never_wants_to_move() {
        let a = Agent::new(
            AgentId(2),
            Vec2::ZERO,
            0.4,
            MoveClass::Ground,
            FactionId(0),
        )
        .moving(true)
        .as_debris();
        assert!(a.debris);
        assert!(!a.wants_to_move);
    }

    #[test]
    fn slice_lookup_filters_by_distance() {
        let structures = vec![
            Structure::single_cell(Vec2::new(1.5, 1.5), 0.5),
            Structure::single_cell(Vec2::new(10.5, 10.5), 0.5),
        ];
        let mut seen = Vec::new();
        structures[..].for_each_near(Vec2::new(1.0, 1.5), 0.5, &mut |s| seen.push(s.pos));
        assert_eq!(seen, vec![Vec2::new(1.5, 1.5)]);
    }
}
