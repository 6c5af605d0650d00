#![allow(dead_code)]

use podsim::autoscaler::ScalingParams;
use podsim::config::Config;

pub fn assert_float_eq(x: f64, y: f64, eps: f64) {
    assert!(x > y - eps && x < y + eps, "{} != {}", x, y);
}

/// Config with one worker per pod and the given pod range, immediate scaling.
pub fn single_worker_config(min_pods: usize, max_pods: usize) -> Config {
    Config {
        scaling: ScalingParams {
            target_pickup: 300.,
            workers_per_pod: 1,
            min_pods,
            max_pods,
            pod_startup_time: 0.,
            pod_shutdown_time: 0.,
            multiplier: 1.,
        },
        ..Default::default()
    }
}
