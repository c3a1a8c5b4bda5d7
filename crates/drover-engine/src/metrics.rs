//! Per-tick counters for the movement engine.

use drover_collision::ResolveMetrics;
use drover_core::TickId;

/// Counters from one [`collect_completed`] pickup.
///
/// [`collect_completed`]: crate::MovementEngine::collect_completed
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PlanPickup {
    /// Flow fields installed into their assignments.
    pub installed: u64,
    /// Results discarded because the obstacle map moved on while they
    /// were being computed (a re-plan against the new version is
    /// already queued).
    pub stale_discarded: u64,
    /// Plans that failed (blocked or out-of-bounds destination); their
    /// assignments were invalidated by the worker.
    pub failed: u64,
    /// Results dropped because the assignment had been cancelled.
    pub cancelled: u64,
    /// Assignments newly invalidated for having no members left.
    pub invalidated: u64,
    /// Invalid assignments removed from the registry.
    pub pruned: u64,
}

/// Counters for one full engine tick.
#[derive(Clone, Debug, Default)]
pub struct TickMetrics {
    /// The tick these counters describe.
    pub tick: TickId,
    /// Plan-pickup counters.
    pub pickup: PlanPickup,
    /// Collision-resolution counters.
    pub resolve: ResolveMetrics,
}
