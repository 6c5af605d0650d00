//! Offline evaluation of autoscaling policies for a job-processing worker pool.
//!
//! A historical job trace is replayed through a discrete-event simulation. Workers are grouped
//! into pods, and an autoscaler periodically resizes the pool using a pluggable forecast of the
//! queue length. The result is a time series of snapshots and a run-level summary of pickup
//! latency and pool size.

pub mod algorithm;
pub mod autoscaler;
pub mod config;
pub mod event;
pub mod history;
pub mod job;
pub mod metrics;
pub mod simulation;
pub mod snapshot;
pub mod stats;
pub mod trace;
pub mod util;
pub mod worker;
