//! Run statistics.

use serde::Serialize;

use crate::snapshot::Snapshot;

/// A set of observations of some metric.
#[derive(Clone, Debug, Default)]
pub struct SampleMetric {
    data: Vec<f64>,
}

impl SampleMetric {
    pub fn add(&mut self, x: f64) {
        self.data.push(x);
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn values(&self) -> &[f64] {
        &self.data
    }

    pub fn sum(&self) -> f64 {
        self.data.iter().sum()
    }

    /// Arithmetic mean, zero for an empty metric.
    pub fn mean(&self) -> f64 {
        if self.data.is_empty() {
            return 0.;
        }
        self.sum() / (self.data.len() as f64)
    }

    pub fn min(&self) -> Option<f64> {
        self.data.iter().copied().min_by(|a, b| a.total_cmp(b))
    }

    pub fn max(&self) -> Option<f64> {
        self.data.iter().copied().max_by(|a, b| a.total_cmp(b))
    }

    /// Returns the `q`-quantile (`q` in [0, 1]) interpolating linearly between closest ranks.
    pub fn quantile(&self, q: f64) -> Option<f64> {
        if self.data.is_empty() {
            return None;
        }
        let mut sorted = self.data.clone();
        sorted.sort_by(|a, b| a.total_cmp(b));
        let rank = q.clamp(0., 1.) * ((sorted.len() - 1) as f64);
        let lo = rank.floor() as usize;
        let hi = rank.ceil() as usize;
        let frac = rank - (lo as f64);
        Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
    }

    /// Percentage of observations not exceeding `limit`, zero for an empty metric.
    pub fn percent_at_most(&self, limit: f64) -> f64 {
        if self.data.is_empty() {
            return 0.;
        }
        let below = self.data.iter().filter(|&&x| x <= limit).count();
        (below as f64) / (self.data.len() as f64) * 100.
    }
}

impl FromIterator<f64> for SampleMetric {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        Self {
            data: iter.into_iter().collect(),
        }
    }
}

/// Averages over the periodic state snapshots of a run.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SnapshotAverages {
    pub pods: f64,
    pub busy_workers: f64,
    pub idle_workers: f64,
    pub busy_ratio: f64,
}

impl SnapshotAverages {
    pub fn from_snapshots(snapshots: &[Snapshot]) -> Self {
        if snapshots.is_empty() {
            return Default::default();
        }
        let mut pods = SampleMetric::default();
        let mut busy = SampleMetric::default();
        let mut idle = SampleMetric::default();
        let mut ratio = SampleMetric::default();
        for s in snapshots {
            pods.add(s.pods as f64);
            busy.add(s.busy_workers as f64);
            idle.add(s.idle_workers as f64);
            ratio.add(s.busy_ratio());
        }
        Self {
            pods: pods.mean(),
            busy_workers: busy.mean(),
            idle_workers: idle.mean(),
            busy_ratio: ratio.mean(),
        }
    }
}

/// Run-level results.
#[derive(Clone, Debug, Default, Serialize)]
pub struct RunSummary {
    pub start_time: f64,
    pub end_time: f64,
    pub jobs_completed: usize,
    pub pct_below_target: f64,
    pub max_pods: usize,
    pub avg_pods: f64,
    pub avg_busy_ratio: f64,
    pub avg_busy_workers: f64,
    pub avg_idle_workers: f64,
    pub pickup_average: f64,
    pub pickup_p95: f64,
    pub pickup_max: f64,
    pub snapshots: usize,
    /// The run stopped with jobs waiting and no way to process them.
    pub stalled: bool,
}

impl RunSummary {
    pub fn print_summary(&self) {
        println!("Summary:");
        println!("         %_<_target = {:.2}", self.pct_below_target);
        println!("           max_pods = {}", self.max_pods);
        println!("           avg_pods = {:.2}", self.avg_pods);
        println!("  avg_running_ratio = {:.2}", self.avg_busy_ratio);
        println!("avg_running_workers = {:.2}", self.avg_busy_workers);
        println!("   avg_idle_workers = {:.2}", self.avg_idle_workers);
        println!("   pickup_average_s = {:.2}", self.pickup_average);
        println!("       pickup_p95_s = {:.2}", self.pickup_p95);
        println!("       pickup_max_s = {:.2}", self.pickup_max);
        if self.stalled {
            println!("  (stalled: jobs left waiting without workers)");
        }
    }
}
