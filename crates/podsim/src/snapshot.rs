//! Periodic snapshots of the simulation state.

use serde::Serialize;

/// Trailing window over which snapshot pickup statistics are computed.
pub const KPI_WINDOW: f64 = 30. * 60.;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Snapshot {
    pub time: f64,
    pub pending_jobs: usize,
    pub idle_workers: usize,
    pub busy_workers: usize,
    pub alive_workers: usize,
    pub pods: usize,
    /// Percentage of jobs completed within the window whose pickup met the target.
    pub pct_below_target: f64,
    /// 95th percentile of pickup times within the window, zero if there were no completions.
    pub pickup_p95: f64,
    /// Maximum pickup time within the window, zero if there were no completions.
    pub pickup_max: f64,
}

impl Snapshot {
    /// Share of alive workers holding a job, zero if no worker is alive.
    pub fn busy_ratio(&self) -> f64 {
        if self.alive_workers == 0 {
            0.
        } else {
            (self.busy_workers as f64) / (self.alive_workers as f64)
        }
    }

    pub fn busy_percent(&self) -> f64 {
        self.busy_ratio() * 100.
    }
}

/// Receives snapshots as they are taken.
pub trait SnapshotObserver {
    fn on_snapshot(&mut self, snapshot: &Snapshot);

    /// Called once after the final snapshot of a run.
    fn on_finish(&mut self) {}
}
