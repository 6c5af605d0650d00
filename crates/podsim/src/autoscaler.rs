//! Autoscale control loop decisions.

use serde::Serialize;

use crate::algorithm::{ForecastAlgorithm, PercentileAlgorithm};
use crate::history::History;

/// Time between two autoscale decisions.
pub const AUTOSCALE_INTERVAL: f64 = 15.;

/// Pool sizing parameters.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScalingParams {
    /// Desired pickup time in seconds.
    pub target_pickup: f64,
    pub workers_per_pod: usize,
    pub min_pods: usize,
    pub max_pods: usize,
    /// Delay between a scale-up decision and the new workers becoming available.
    pub pod_startup_time: f64,
    /// Delay between a scale-down decision and the workers being deactivated.
    pub pod_shutdown_time: f64,
    /// Factor applied to every forecast.
    pub multiplier: f64,
}

impl Default for ScalingParams {
    fn default() -> Self {
        Self {
            target_pickup: 300.,
            workers_per_pod: 3,
            min_pods: 1,
            max_pods: 30,
            pod_startup_time: 180.,
            pod_shutdown_time: 0.,
            multiplier: 1.,
        }
    }
}

/// Change of the pod count. Both variants carry a non-negative number of pods.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ScaleDecision {
    Up(usize),
    Down(usize),
    Hold,
}

impl ScaleDecision {
    /// Turns the signed difference `desired - current` into a decision.
    /// For a scale-down the difference is negated, so `Down` always holds a magnitude.
    pub fn between(current: usize, desired: usize) -> Self {
        let delta = desired as i64 - current as i64;
        if delta > 0 {
            ScaleDecision::Up(delta as usize)
        } else if delta < 0 {
            ScaleDecision::Down((-delta) as usize)
        } else {
            ScaleDecision::Hold
        }
    }
}

/// Inputs and outcome of one autoscale decision.
#[derive(Clone, Debug, Serialize)]
pub struct Evaluation {
    pub estimate: f64,
    pub current_pods: usize,
    pub desired_pods: usize,
    pub decision: ScaleDecision,
}

pub struct Autoscaler {
    params: ScalingParams,
    algorithm: Box<dyn ForecastAlgorithm>,
}

impl Default for Autoscaler {
    fn default() -> Self {
        Self::new(Default::default(), Box::<PercentileAlgorithm>::default())
    }
}

impl Autoscaler {
    pub fn new(params: ScalingParams, algorithm: Box<dyn ForecastAlgorithm>) -> Self {
        assert!(params.workers_per_pod > 0, "Pods must contain at least one worker");
        assert!(params.min_pods <= params.max_pods, "min_pods must not exceed max_pods");
        Self { params, algorithm }
    }

    pub fn params(&self) -> &ScalingParams {
        &self.params
    }

    pub fn algorithm(&self) -> &dyn ForecastAlgorithm {
        self.algorithm.as_ref()
    }

    /// Forecast scaled by the multiplier.
    pub fn estimate(&self, history: &History, unprocessed: usize, time: f64) -> f64 {
        self.params.multiplier * self.algorithm.estimate(history, unprocessed, time)
    }

    /// Converts a forecast into a pod count within `[min_pods, max_pods]`.
    ///
    /// The worker count derived from the forecast never exceeds the number of `waiting` jobs.
    pub fn desired_pod_count(&self, estimate: f64, waiting: usize) -> usize {
        let p = &self.params;
        // float `as` saturates, NaN becomes zero
        let workers = ((estimate / p.target_pickup).ceil() as i64).min(saturating_i64(waiting));
        let per_pod = saturating_i64(p.workers_per_pod);
        let pods = workers.saturating_add(per_pod - 1).div_euclid(per_pod);
        pods.clamp(saturating_i64(p.min_pods), saturating_i64(p.max_pods)) as usize
    }

    pub fn evaluate(
        &self,
        history: &History,
        waiting: usize,
        in_flight: usize,
        current_pods: usize,
        time: f64,
    ) -> Evaluation {
        let estimate = self.estimate(history, waiting + in_flight, time);
        let desired_pods = self.desired_pod_count(estimate, waiting);
        Evaluation {
            estimate,
            current_pods,
            desired_pods,
            decision: ScaleDecision::between(current_pods, desired_pods),
        }
    }
}

fn saturating_i64(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}
