use serde::Serialize;

use crate::job::Job;
use crate::worker::WorkerId;

/// Payload of the simulation events.
#[derive(Clone, Debug, Serialize)]
pub enum SimEvent {
    /// Job enters the job queue.
    JobArrived { job: Job },
    /// Worker finishes the job it picked up earlier.
    JobCompleted { job: Job, worker_id: WorkerId },
    /// Periodic autoscale decision.
    AutoscaleTick,
    /// Delayed scale-up by the given number of pods.
    Activate { pods: usize },
    /// Delayed scale-down by the given number of pods.
    Deactivate { pods: usize },
    /// Periodic state snapshot.
    SnapshotTick,
}

impl SimEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            SimEvent::JobArrived { .. } => "JobArrived",
            SimEvent::JobCompleted { .. } => "JobCompleted",
            SimEvent::AutoscaleTick => "AutoscaleTick",
            SimEvent::Activate { .. } => "Activate",
            SimEvent::Deactivate { .. } => "Deactivate",
            SimEvent::SnapshotTick => "SnapshotTick",
        }
    }
}
