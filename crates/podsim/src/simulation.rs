//! Simulation orchestrator.
//!
//! Owns the event queue, the job queue, the workers and the history, applies events in time order
//! and lets the workers pick up jobs after every event. The run ends as soon as every loaded job has
//! completed and no worker holds a job; events still queued at that point are dropped.

use serde_json::json;

use podsim_core::{log_debug, log_info, log_trace, log_warn, Event, EventQueue};

use crate::autoscaler::{Autoscaler, ScaleDecision, AUTOSCALE_INTERVAL};
use crate::config::Config;
use crate::event::SimEvent;
use crate::history::{History, HistoryEntry};
use crate::job::{Job, JobQueue};
use crate::snapshot::{Snapshot, SnapshotObserver, KPI_WINDOW};
use crate::stats::{RunSummary, SnapshotAverages};
use crate::trace::Trace;
use crate::worker::{WorkerId, WorkerPool};

/// Delay between the first event and the first autoscale decision.
pub const FIRST_AUTOSCALE_DELAY: f64 = 1.;

pub struct Simulation {
    autoscaler: Autoscaler,
    events: EventQueue<SimEvent>,
    expected_jobs: i64,
    history: History,
    max_pods: usize,
    observers: Vec<Box<dyn SnapshotObserver>>,
    pending_activations: usize,
    pending_arrivals: usize,
    queue: JobQueue,
    snapshots: Vec<Snapshot>,
    start_time: Option<f64>,
    stalled: bool,
    workers: WorkerPool,
    write_state_interval: f64,
}

impl Simulation {
    pub fn new(config: Config) -> Self {
        Self {
            autoscaler: Autoscaler::new(config.scaling, config.algorithm),
            events: EventQueue::starting_at(f64::NEG_INFINITY),
            expected_jobs: 0,
            history: History::new(),
            max_pods: 0,
            observers: Vec::new(),
            pending_activations: 0,
            pending_arrivals: 0,
            queue: JobQueue::new(),
            snapshots: Vec::new(),
            start_time: None,
            stalled: false,
            workers: WorkerPool::new(),
            write_state_interval: config.write_state_interval,
        }
    }

    pub fn name(&self) -> &str {
        "simulation"
    }

    /// Returns the current simulation time, i.e. the time of the last applied event
    /// or the time of the first event if none was applied yet.
    pub fn time(&self) -> f64 {
        match self.start_time {
            Some(start) => self.events.time().max(start),
            None => self.events.time(),
        }
    }

    pub fn add_observer(&mut self, observer: Box<dyn SnapshotObserver>) {
        self.observers.push(observer);
    }

    /// Schedules the arrival of a job. Jobs must be added before the run starts.
    pub fn add_job(&mut self, job: Job) {
        assert!(self.start_time.is_none(), "Jobs must be added before the simulation starts");
        let time = job.arrival_time;
        self.events.add_event_at(SimEvent::JobArrived { job }, time);
        self.expected_jobs += 1;
        self.pending_arrivals += 1;
    }

    /// Schedules the arrivals of all trace jobs, returns the number of jobs added.
    pub fn load_trace(&mut self, trace: &dyn Trace) -> usize {
        let mut count = 0;
        for job in trace.job_iter() {
            self.add_job(job);
            count += 1;
        }
        count
    }

    pub fn autoscaler(&self) -> &Autoscaler {
        &self.autoscaler
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn workers(&self) -> &WorkerPool {
        &self.workers
    }

    pub fn job_queue(&self) -> &JobQueue {
        &self.queue
    }

    pub fn snapshots(&self) -> &[Snapshot] {
        &self.snapshots
    }

    pub fn pending_events(&self) -> usize {
        self.events.len()
    }

    /// Number of loaded jobs which have not completed yet.
    pub fn outstanding_jobs(&self) -> i64 {
        self.expected_jobs
    }

    pub fn current_pod_count(&self) -> usize {
        self.workers.pod_count(self.autoscaler.params().workers_per_pod)
    }

    pub fn is_done(&self) -> bool {
        self.expected_jobs <= 0 && self.workers.in_flight_count() == 0
    }

    /// Jobs are waiting but nothing can ever process them: no worker is alive or busy, no arrival
    /// or activation is pending, and the history the forecast depends on has expired without
    /// the autoscaler asking for more pods.
    fn is_stalled(&self) -> bool {
        if self.queue.is_empty()
            || self.workers.alive_count() > 0
            || self.workers.in_flight_count() > 0
            || self.pending_arrivals > 0
            || self.pending_activations > 0
        {
            return false;
        }
        let horizon = self.time() - self.autoscaler.algorithm().lookback();
        if matches!(self.history.last_completion_time(), Some(t) if t >= horizon) {
            return false;
        }
        let evaluation = self.autoscaler.evaluate(
            &self.history,
            self.queue.len(),
            0,
            self.current_pod_count(),
            self.time(),
        );
        !matches!(evaluation.decision, ScaleDecision::Up(_))
    }

    /// Starts the pool with a single pod and schedules the first autoscale and snapshot ticks.
    ///
    /// Returns false if there are no events to simulate. Calling it again has no effect.
    pub fn start(&mut self) -> bool {
        if self.start_time.is_some() {
            return true;
        }
        let first = match self.events.peek_event() {
            Some(event) => event.time,
            None => return false,
        };
        self.start_time = Some(first);
        self.workers.activate(self.autoscaler.params().workers_per_pod);
        self.events.add_event_at(SimEvent::AutoscaleTick, first + FIRST_AUTOSCALE_DELAY);
        self.events.add_event_at(SimEvent::SnapshotTick, first);
        log_info!(self, "starting simulation at {:.3} with {} jobs", first, self.expected_jobs);
        true
    }

    /// Applies the next event and lets the workers pick up jobs.
    ///
    /// Returns false if the run has finished (or cannot continue) and no event was applied.
    pub fn step(&mut self) -> bool {
        if !self.start() || self.is_done() || self.stalled {
            return false;
        }
        if self.is_stalled() {
            log_warn!(self, "{} jobs are waiting but no worker can be started", self.queue.len());
            self.stalled = true;
            return false;
        }
        let event = match self.events.next_event() {
            Some(event) => event,
            None => return false,
        };
        self.max_pods = self.max_pods.max(self.current_pod_count());
        self.apply(event);
        self.pickup_jobs();
        true
    }

    /// Runs the simulation to the end. Returns None if there were no events to simulate.
    pub fn run(&mut self) -> Option<RunSummary> {
        if !self.start() {
            log_info!(self, "no events");
            return None;
        }
        while self.step() {}
        Some(self.finish())
    }

    /// Records the final snapshot and computes the run summary.
    pub fn finish(&mut self) -> RunSummary {
        self.take_snapshot();
        for observer in self.observers.iter_mut() {
            observer.on_finish();
        }
        self.max_pods = self.max_pods.max(self.current_pod_count());
        self.summary()
    }

    pub fn summary(&self) -> RunSummary {
        let start_time = self.start_time.unwrap_or(0.);
        let target = self.autoscaler.params().target_pickup;
        let pickups = self.history.pickups_since(start_time);
        let averages = SnapshotAverages::from_snapshots(&self.snapshots);
        RunSummary {
            start_time,
            end_time: self.time().max(start_time),
            jobs_completed: self.history.len(),
            pct_below_target: pickups.percent_at_most(target),
            max_pods: self.max_pods,
            avg_pods: averages.pods,
            avg_busy_ratio: averages.busy_ratio,
            avg_busy_workers: averages.busy_workers,
            avg_idle_workers: averages.idle_workers,
            pickup_average: pickups.mean(),
            pickup_p95: pickups.quantile(0.95).unwrap_or(0.),
            pickup_max: pickups.max().unwrap_or(0.),
            snapshots: self.snapshots.len(),
            stalled: self.stalled,
        }
    }

    fn apply(&mut self, event: Event<SimEvent>) {
        log_trace!(self, "{}: {}", event.data.kind(), json!(event.data));
        match event.data {
            SimEvent::JobArrived { job } => {
                self.pending_arrivals -= 1;
                self.queue.push(job);
            }
            SimEvent::JobCompleted { job, worker_id } => {
                self.on_job_completed(job, worker_id);
            }
            SimEvent::AutoscaleTick => {
                self.on_autoscale_tick();
            }
            SimEvent::Activate { pods } => {
                self.pending_activations -= 1;
                let ids = self.workers.activate(pods * self.autoscaler.params().workers_per_pod);
                log_debug!(self, "activated {} pods ({} workers)", pods, ids.len());
                self.schedule_autoscale_tick();
            }
            SimEvent::Deactivate { pods } => {
                let count = self.workers.deactivate(pods * self.autoscaler.params().workers_per_pod);
                log_debug!(self, "deactivated {} pods ({} workers)", pods, count);
                self.schedule_autoscale_tick();
            }
            SimEvent::SnapshotTick => {
                self.take_snapshot();
                if !self.is_done() {
                    self.events.add_event(SimEvent::SnapshotTick, self.write_state_interval);
                }
            }
        }
    }

    fn on_job_completed(&mut self, job: Job, worker_id: WorkerId) {
        let time = self.time();
        let start_time = match self.workers.get_mut(worker_id).and_then(|w| w.complete()) {
            Some((held, started_at)) => {
                debug_assert_eq!(held.id, job.id, "Worker {} completed a job it did not hold", worker_id);
                started_at
            }
            None => time - job.latency,
        };
        self.history.append(HistoryEntry {
            job_id: job.id,
            worker_id,
            arrival_time: job.arrival_time,
            start_time,
            completion_time: time,
        });
        self.expected_jobs -= 1;
    }

    fn on_autoscale_tick(&mut self) {
        let params = self.autoscaler.params();
        let (startup, shutdown) = (params.pod_startup_time, params.pod_shutdown_time);
        let evaluation = self.autoscaler.evaluate(
            &self.history,
            self.queue.len(),
            self.workers.in_flight_count(),
            self.current_pod_count(),
            self.time(),
        );
        log_debug!(self, "autoscale: {}", json!(evaluation));
        match evaluation.decision {
            ScaleDecision::Up(pods) => {
                self.pending_activations += 1;
                self.events.add_event(SimEvent::Activate { pods }, startup);
            }
            ScaleDecision::Down(pods) => {
                self.events.add_event(SimEvent::Deactivate { pods }, shutdown);
            }
            ScaleDecision::Hold => self.schedule_autoscale_tick(),
        }
    }

    fn schedule_autoscale_tick(&mut self) {
        if !self.is_done() {
            self.events.add_event(SimEvent::AutoscaleTick, AUTOSCALE_INTERVAL);
        }
    }

    fn pickup_jobs(&mut self) {
        let time = self.time();
        for (worker_id, job) in self.workers.try_pickup_all(&mut self.queue, time) {
            log_trace!(self, "worker {} picked up job {}", worker_id, job.id);
            let latency = job.latency;
            self.events
                .add_event(SimEvent::JobCompleted { job, worker_id }, latency);
        }
    }

    fn take_snapshot(&mut self) {
        let time = self.time();
        let target = self.autoscaler.params().target_pickup;
        let pickups = self.history.pickups_since(time - KPI_WINDOW);
        let snapshot = Snapshot {
            time,
            pending_jobs: self.queue.len(),
            idle_workers: self.workers.idle_count(),
            busy_workers: self.workers.busy_count(),
            alive_workers: self.workers.alive_count(),
            pods: self.current_pod_count(),
            pct_below_target: pickups.percent_at_most(target),
            pickup_p95: pickups.quantile(0.95).unwrap_or(0.),
            pickup_max: pickups.max().unwrap_or(0.),
        };
        for observer in self.observers.iter_mut() {
            observer.on_snapshot(&snapshot);
        }
        self.snapshots.push(snapshot);
    }
}
