//! Workers and the pool they live in.
//!
//! A worker is `idle` when it holds no job and `alive` until it is deactivated by a scale-down.
//! Deactivated workers keep draining the job in hand but never pick up new work. Workers are
//! never removed from the pool, so completions of drained jobs can still be attributed.

use crate::job::{Job, JobQueue};
use crate::util::Counter;

pub type WorkerId = u64;

#[derive(Debug)]
pub struct Worker {
    pub id: WorkerId,
    pub alive: bool,
    current: Option<Job>,
    started_at: f64,
}

impl Worker {
    fn new(id: WorkerId) -> Self {
        Self {
            id,
            alive: true,
            current: None,
            started_at: 0.,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.current.is_none()
    }

    pub fn is_busy(&self) -> bool {
        self.current.is_some()
    }

    pub fn current_job(&self) -> Option<&Job> {
        self.current.as_ref()
    }

    /// Time at which the job in hand was picked up.
    pub fn started_at(&self) -> Option<f64> {
        self.current.as_ref().map(|_| self.started_at)
    }

    /// Takes the first job from the queue if the worker is alive and idle.
    pub fn try_pickup(&mut self, queue: &mut JobQueue, time: f64) -> Option<&Job> {
        if !self.alive || self.is_busy() {
            return None;
        }
        let job = queue.pop_front()?;
        self.started_at = time;
        self.current = Some(job);
        self.current.as_ref()
    }

    /// Releases the job in hand, returning it together with its pickup time.
    pub fn complete(&mut self) -> Option<(Job, f64)> {
        self.current.take().map(|job| (job, self.started_at))
    }

    pub fn deactivate(&mut self) {
        self.alive = false;
    }
}

/// Workers in creation order.
pub struct WorkerPool {
    workers: Vec<Worker>,
    id_counter: Counter,
}

impl Default for WorkerPool {
    fn default() -> Self {
        Self {
            workers: Vec::new(),
            id_counter: Counter::starting_at(1),
        }
    }
}

impl WorkerPool {
    pub fn new() -> Self {
        Default::default()
    }

    /// Creates `count` idle alive workers with fresh identifiers.
    pub fn activate(&mut self, count: usize) -> Vec<WorkerId> {
        let mut ids = Vec::with_capacity(count);
        for _ in 0..count {
            let id = self.id_counter.increment();
            self.workers.push(Worker::new(id));
            ids.push(id);
        }
        ids
    }

    /// Deactivates up to `count` alive workers, oldest first. Returns the number deactivated.
    pub fn deactivate(&mut self, count: usize) -> usize {
        let mut removed = 0;
        for worker in self.workers.iter_mut() {
            if removed >= count {
                break;
            }
            if worker.alive {
                worker.deactivate();
                removed += 1;
            }
        }
        removed
    }

    pub fn get(&self, id: WorkerId) -> Option<&Worker> {
        self.workers.iter().find(|w| w.id == id)
    }

    pub fn get_mut(&mut self, id: WorkerId) -> Option<&mut Worker> {
        self.workers.iter_mut().find(|w| w.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Worker> {
        self.workers.iter()
    }

    /// Lets every alive idle worker take a job, in creation order.
    /// Returns the started jobs with the workers that took them.
    pub fn try_pickup_all(&mut self, queue: &mut JobQueue, time: f64) -> Vec<(WorkerId, Job)> {
        let mut started = Vec::new();
        for worker in self.workers.iter_mut() {
            if queue.is_empty() {
                break;
            }
            let id = worker.id;
            if let Some(job) = worker.try_pickup(queue, time) {
                started.push((id, job.clone()));
            }
        }
        started
    }

    pub fn total_count(&self) -> usize {
        self.workers.len()
    }

    pub fn alive_count(&self) -> usize {
        self.workers.iter().filter(|w| w.alive).count()
    }

    pub fn idle_count(&self) -> usize {
        self.workers.iter().filter(|w| w.alive && w.is_idle()).count()
    }

    /// Alive workers holding a job.
    pub fn busy_count(&self) -> usize {
        self.workers.iter().filter(|w| w.alive && w.is_busy()).count()
    }

    /// Deactivated workers still holding a job.
    pub fn draining_count(&self) -> usize {
        self.workers.iter().filter(|w| !w.alive && w.is_busy()).count()
    }

    /// Workers of any kind holding a job.
    pub fn in_flight_count(&self) -> usize {
        self.workers.iter().filter(|w| w.is_busy()).count()
    }

    pub fn pod_count(&self, workers_per_pod: usize) -> usize {
        self.alive_count() / workers_per_pod
    }
}
