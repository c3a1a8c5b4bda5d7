//! Strongly-typed identifiers.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identifies an agent within the simulation.
///
/// Agent IDs are allocated by the entity lifecycle (an external
/// collaborator) and are stable for the lifetime of the agent. The
/// collision resolver also relies on the *slice index* of an agent for
/// pair ordering; the ID exists for cross-tick identity (assignment
/// membership, commands).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AgentId(pub u32);

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for AgentId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Counter for unique [`AssignmentId`] allocation.
static ASSIGNMENT_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a move assignment.
///
/// Allocated from a monotonic atomic counter via [`AssignmentId::next`].
/// Two distinct assignments always have different IDs even when they
/// share a destination, so a cancelled order can never be confused with
/// a re-issued one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssignmentId(u64);

impl AssignmentId {
    /// Allocate a fresh, unique assignment ID.
    ///
    /// Each call returns an ID that has never been returned before
    /// within this process. Thread-safe.
    pub fn next() -> Self {
        Self(ASSIGNMENT_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for AssignmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Version stamp of an obstacle map.
///
/// Bumped by the map/building subsystem whenever blocking state changes
/// for a movement class. Flow fields record the version they were
/// computed against; a mismatch at pickup means the result is stale and
/// must be discarded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MapVersion(pub u64);

impl fmt::Display for MapVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for MapVersion {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

/// Monotonically increasing tick counter.
///
/// Incremented each time the simulation advances one fixed step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TickId(pub u64);

impl fmt::Display for TickId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for TickId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assignment_ids_are_unique() {
        let a = AssignmentId::next();
        let b = AssignmentId::next();
        assert_ne!(a, b);
        assert!(b > a);
    }

    #[test]
    fn map_version_ordering() {
        assert!(MapVersion(2) > MapVersion(1));
        assert_eq!(MapVersion::from(3), MapVersion(3));
    }

    #[test]
    fn display_is_bare_number() {
        assert_eq!(AgentId(7).to_string(), "7");
        assert_eq!(TickId(42).to_string(), "42");
    }
}
