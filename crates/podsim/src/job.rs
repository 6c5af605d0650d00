use std::collections::VecDeque;

use serde::Serialize;

pub type JobId = u64;

/// A job from the trace. `latency` is the time a worker spends processing it.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Job {
    pub id: JobId,
    pub arrival_time: f64,
    pub latency: f64,
}

impl Job {
    pub fn new(id: JobId, arrival_time: f64, latency: f64) -> Self {
        Self {
            id,
            arrival_time,
            latency,
        }
    }
}

/// FIFO queue of jobs which have arrived but were not picked up yet.
#[derive(Default)]
pub struct JobQueue {
    jobs: VecDeque<Job>,
}

impl JobQueue {
    pub fn new() -> Self {
        Default::default()
    }

    /// Job ids are only unique within a trace queue, so equal ids may wait side by side.
    pub fn push(&mut self, job: Job) {
        self.jobs.push_back(job);
    }

    pub fn pop_front(&mut self) -> Option<Job> {
        self.jobs.pop_front()
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Job> {
        self.jobs.iter()
    }
}
