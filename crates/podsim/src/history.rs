//! Log of completed jobs.

use serde::Serialize;

use crate::job::JobId;
use crate::stats::SampleMetric;
use crate::worker::WorkerId;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub job_id: JobId,
    pub worker_id: WorkerId,
    pub arrival_time: f64,
    pub start_time: f64,
    pub completion_time: f64,
}

impl HistoryEntry {
    /// Time the job spent waiting in the queue.
    pub fn pickup(&self) -> f64 {
        self.start_time - self.arrival_time
    }

    /// Time the job spent being processed.
    pub fn latency(&self) -> f64 {
        self.completion_time - self.start_time
    }
}

/// Append-only record of job completions, queried by trailing time windows.
#[derive(Default)]
pub struct History {
    entries: Vec<HistoryEntry>,
}

impl History {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn append(&mut self, entry: HistoryEntry) {
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    /// Completion time of the most recent entry.
    pub fn last_completion_time(&self) -> Option<f64> {
        self.entries.last().map(|e| e.completion_time)
    }

    /// Entries of jobs completed at or after `cutoff`.
    pub fn entries_since(&self, cutoff: f64) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter().filter(move |e| e.completion_time >= cutoff)
    }

    pub fn pickups_since(&self, cutoff: f64) -> SampleMetric {
        self.entries_since(cutoff).map(HistoryEntry::pickup).collect()
    }

    pub fn latencies_since(&self, cutoff: f64) -> SampleMetric {
        self.entries_since(cutoff).map(HistoryEntry::latency).collect()
    }
}
