//! Shared move-assignment records.

use drover_core::{AgentId, AssignmentId, Cell, MoveClass, Vec2};
use drover_field::{FlowDir, FlowField, FlowTarget};
use indexmap::IndexSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// The destination of a move order.
#[derive(Clone, Debug, PartialEq)]
pub enum MoveTarget {
    /// A world position; planning targets the cell containing it.
    Point(Vec2),
    /// A structure's cell footprint. The footprint is excluded from the
    /// obstacle test during planning so agents can approach and enter
    /// the building they were ordered to.
    Footprint(Vec<Cell>),
}

impl MoveTarget {
    /// The planner-facing form of this target.
    pub(crate) fn flow_target(&self) -> FlowTarget {
        match self {
            MoveTarget::Point(pos) => FlowTarget::Cell(Cell::containing(*pos)),
            MoveTarget::Footprint(cells) => FlowTarget::Footprint(cells.clone()),
        }
    }
}

/// Mutable assignment state, guarded by the per-assignment lock.
struct AssignmentState {
    members: IndexSet<AgentId>,
    flow: Option<Arc<FlowField>>,
    active: bool,
}

/// One planning job: the set of agents ordered to a shared destination
/// under one movement class.
///
/// Shared between the issuing command(s), the engine registry, and the
/// planner queue as an `Arc`. The planner only ever writes the
/// flow-field slot; the simulation thread adds and removes members and
/// flips the flags. All mutable state sits behind a *per-assignment*
/// mutex, so unrelated assignments never block each other, and the
/// `invalid` flag is a monotone atomic (false→true only) — a stale read
/// costs at most one extra tick, never correctness.
pub struct MoveAssignment {
    id: AssignmentId,
    class: MoveClass,
    target: MoveTarget,
    invalid: AtomicBool,
    state: Mutex<AssignmentState>,
}

impl MoveAssignment {
    /// Create a new assignment with an initial member set.
    pub(crate) fn new(target: MoveTarget, class: MoveClass, members: &[AgentId]) -> Arc<Self> {
        Arc::new(Self {
            id: AssignmentId::next(),
            class,
            target,
            invalid: AtomicBool::new(false),
            state: Mutex::new(AssignmentState {
                members: members.iter().copied().collect(),
                flow: None,
                active: false,
            }),
        })
    }

    fn state(&self) -> MutexGuard<'_, AssignmentState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Unique assignment ID.
    pub fn id(&self) -> AssignmentId {
        self.id
    }

    /// Movement class of the ordered group.
    pub fn class(&self) -> MoveClass {
        self.class
    }

    /// The ordered destination.
    pub fn target(&self) -> &MoveTarget {
        &self.target
    }

    /// Whether the assignment has been cancelled or exhausted.
    /// Commands check this every step to self-terminate.
    pub fn is_invalid(&self) -> bool {
        self.invalid.load(Ordering::Acquire)
    }

    /// Cancel the assignment. Monotone: once invalid, always invalid.
    /// Safe to call from the simulation thread at any time.
    pub fn invalidate(&self) {
        self.invalid.store(true, Ordering::Release);
    }

    /// The current flow field, if one has been installed.
    pub fn flow(&self) -> Option<Arc<FlowField>> {
        self.state().flow.clone()
    }

    /// Install a freshly computed flow field. Called only from
    /// [`collect_completed`](crate::MovementEngine::collect_completed),
    /// which is how a field becomes visible to the simulation thread —
    /// there are no torn reads of an in-progress computation.
    pub(crate) fn install_flow(&self, flow: FlowField) {
        self.state().flow = Some(Arc::new(flow));
    }

    /// Steering read: the flow direction at `pos`, or `None` while no
    /// flow field is installed or the cell is unreachable. Marks the
    /// assignment active — some agent is following it this tick.
    pub fn flow_direction(&self, pos: Vec2) -> Option<FlowDir> {
        let mut state = self.state();
        state.active = true;
        state.flow.as_ref().and_then(|f| f.direction_at(pos))
    }

    /// Whether any agent has steered by this assignment since the flag
    /// was last cleared.
    pub fn is_active(&self) -> bool {
        self.state().active
    }

    /// Clear the active flag at the start of a tick.
    pub(crate) fn clear_active(&self) {
        self.state().active = false;
    }

    /// Add an agent to the group.
    pub fn add_member(&self, agent: AgentId) {
        self.state().members.insert(agent);
    }

    /// Remove an agent from the group (its command finished or its
    /// agent died). Returns whether the agent was a member.
    pub fn remove_member(&self, agent: AgentId) -> bool {
        self.state().members.shift_remove(&agent)
    }

    /// Number of agents still in the group.
    pub fn member_count(&self) -> usize {
        self.state().members.len()
    }
}

impl std::fmt::Debug for MoveAssignment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MoveAssignment")
            .field("id", &self.id)
            .field("class", &self.class)
            .field("target", &self.target)
            .field("invalid", &self.is_invalid())
            .field("members", &self.member_count())
            .finish()
    }
}
