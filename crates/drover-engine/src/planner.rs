//! Background flow-field planner.
//!
//! One worker thread (`drover-planner`) cycles idle → computing → idle:
//! it blocks on the job channel (cooperative wait, no busy-poll),
//! computes one flow field at a time against an immutable obstacle-map
//! snapshot, and sends the result back for non-blocking pickup. The
//! queue policy is **always enqueue, process in order** — player-issued
//! orders are never silently dropped; staleness is handled at pickup by
//! comparing map versions.
//!
//! ```text
//! Simulation Thread                 Planner Thread
//!     |                                 |
//!     |--submit(assignment, map)------->| job_rx.recv()   (blocks when idle)
//!     |   [job_tx: unbounded]           | skip if invalid / empty members
//!     |                                 | plan_flow_field(map, target)
//!     |                                 | result_tx.send(result)
//!     |                                 |
//!     |--collect: result_rx.try_recv()--|   (never blocks; may be empty)
//!     |   install into assignments      |
//! ```
//!
//! The worker never touches agent or simulation state: a job carries
//! only an `Arc<MoveAssignment>` (for the destination and the flags)
//! and an `Arc<ObstacleMap>` snapshot that is immutable once submitted.

use crate::assignment::MoveAssignment;
use crossbeam_channel::{Receiver, Sender};
use drover_field::{plan_flow_field, FlowField};
use drover_grid::ObstacleMap;
use std::fmt;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Error submitting a job to the planner.
#[derive(Debug, PartialEq, Eq)]
pub enum SubmitError {
    /// The planner worker has shut down.
    Shutdown,
}

impl fmt::Display for SubmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shutdown => write!(f, "planner worker has shut down"),
        }
    }
}

impl std::error::Error for SubmitError {}

/// One queued planning job.
struct PlanJob {
    assignment: Arc<MoveAssignment>,
    map: Arc<ObstacleMap>,
}

/// A finished computation, handed back for pickup.
#[derive(Debug)]
pub struct PlanResult {
    /// The assignment the field was computed for.
    pub assignment: Arc<MoveAssignment>,
    /// The computed field, or `None` when planning failed (the worker
    /// has already invalidated the assignment).
    pub flow: Option<FlowField>,
}

/// The background flow-field planner.
///
/// An explicitly constructed service object owned by the simulation's
/// composition root ([`MovementEngine`](crate::MovementEngine)) and
/// passed by reference to whatever issues orders — there is no global
/// planner. Dropping it disconnects the job channel and joins the
/// worker.
#[derive(Debug)]
pub struct MovementPlanner {
    job_tx: Option<Sender<PlanJob>>,
    result_rx: Receiver<PlanResult>,
    worker: Option<JoinHandle<()>>,
}

impl MovementPlanner {
    /// Spawn the planner worker.
    pub fn new() -> Self {
        let (job_tx, job_rx) = crossbeam_channel::unbounded::<PlanJob>();
        let (result_tx, result_rx) = crossbeam_channel::unbounded::<PlanResult>();
        let worker = thread::Builder::new()
            .name("drover-planner".into())
            .spawn(move || worker_loop(job_rx, result_tx))
            .expect("failed to spawn planner thread");
        Self {
            job_tx: Some(job_tx),
            result_rx,
            worker: Some(worker),
        }
    }

    /// Enqueue a flow-field computation. Non-blocking; jobs are
    /// processed in submission order.
    ///
    /// The map snapshot must not be mutated after submission — the
    /// caller hands over an `Arc` and constructs a *new* map for any
    /// later change.
    pub fn submit(
        &self,
        assignment: Arc<MoveAssignment>,
        map: Arc<ObstacleMap>,
    ) -> Result<(), SubmitError> {
        let job_tx = self.job_tx.as_ref().ok_or(SubmitError::Shutdown)?;
        job_tx
            .send(PlanJob { assignment, map })
            .map_err(|_| SubmitError::Shutdown)
    }

    /// Drain every result that finished since the last call. Never
    /// blocks; returns an empty vector when nothing is ready, in which
    /// case agents simply keep moving with their previous (possibly
    /// stale or absent) flow fields.
    ///
    /// [`MovementEngine::collect_completed`](crate::MovementEngine::collect_completed)
    /// layers version checks and the assignment lifecycle on top of
    /// this raw drain.
    pub fn collect_completed(&self) -> Vec<PlanResult> {
        let mut out = Vec::new();
        while let Ok(result) = self.result_rx.try_recv() {
            out.push(result);
        }
        out
    }
}

impl Default for MovementPlanner {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for MovementPlanner {
    fn drop(&mut self) {
        // Disconnect the job channel so the worker's recv() returns an
        // error once the queue is drained, then join it.
        self.job_tx = None;
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

/// Worker main loop: idle on `recv`, compute, report, repeat.
fn worker_loop(job_rx: Receiver<PlanJob>, result_tx: Sender<PlanResult>) {
    while let Ok(job) = job_rx.recv() {
        if job.assignment.is_invalid() {
            continue;
        }
        if job.assignment.member_count() == 0 {
            // The group emptied out before we got to it.
            job.assignment.invalidate();
            continue;
        }
        let result = match plan_flow_field(&job.map, &job.assignment.target().flow_target()) {
            Ok(flow) => PlanResult {
                assignment: job.assignment,
                flow: Some(flow),
            },
            Err(_) => {
                // Permanently blocked or out-of-bounds destination:
                // the order can never complete.
                job.assignment.invalidate();
                PlanResult {
                    assignment: job.assignment,
                    flow: None,
                }
            }
        };
        if result_tx.send(result).is_err() {
            // Engine side is gone; nothing left to report to.
            break;
        }
    }
}
