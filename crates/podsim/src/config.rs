//! Simulation configuration.
//!
//! [`RawConfig`] is the YAML-serializable form where every field is optional. It is turned into a
//! validated [`Config`] with [`Config::from_raw`], which resolves the algorithm name.

use std::fs::File;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::algorithm::{default_algorithm_resolver, ForecastAlgorithm, PercentileAlgorithm};
use crate::autoscaler::ScalingParams;

pub const DEFAULT_ALGORITHM: &str = "Percentile[percentile=0.9,lookback=600]";
pub const DEFAULT_WRITE_STATE_INTERVAL: f64 = 60.;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot parse config: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("unsupported algorithm: {0}")]
    UnknownAlgorithm(String),
    #[error("invalid algorithm option {key}={value}")]
    InvalidAlgorithmOption { key: String, value: String },
    #[error("workers_per_pod must be positive")]
    ZeroWorkersPerPod,
    #[error("min_pods ({min}) exceeds max_pods ({max})")]
    PodRange { min: usize, max: usize },
    #[error("{name} must be positive, got {value}")]
    NonPositive { name: &'static str, value: f64 },
    #[error("{name} must be non-negative, got {value}")]
    Negative { name: &'static str, value: f64 },
}

/// Resolves an algorithm description into an algorithm instance.
pub type AlgorithmResolver = dyn Fn(&str) -> Result<Box<dyn ForecastAlgorithm>, ConfigError>;

/// YAML-serializable config
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawConfig {
    pub target_pickup: Option<f64>,
    pub workers_per_pod: Option<usize>,
    pub min_pods: Option<usize>,
    pub max_pods: Option<usize>,
    pub pod_startup_time: Option<f64>,
    pub pod_shutdown_time: Option<f64>,
    pub algorithm: Option<String>,
    pub multiplier: Option<f64>,
    pub write_state_interval: Option<f64>,
}

impl RawConfig {
    pub fn from_yaml(path: &Path) -> Result<Self, ConfigError> {
        let f = File::open(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_yaml::from_reader(f)?)
    }

    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(s)?)
    }

    /// Returns a copy of `self` where fields set in `other` take precedence.
    pub fn merged_with(&self, other: &RawConfig) -> RawConfig {
        RawConfig {
            target_pickup: other.target_pickup.or(self.target_pickup),
            workers_per_pod: other.workers_per_pod.or(self.workers_per_pod),
            min_pods: other.min_pods.or(self.min_pods),
            max_pods: other.max_pods.or(self.max_pods),
            pod_startup_time: other.pod_startup_time.or(self.pod_startup_time),
            pod_shutdown_time: other.pod_shutdown_time.or(self.pod_shutdown_time),
            algorithm: other.algorithm.clone().or_else(|| self.algorithm.clone()),
            multiplier: other.multiplier.or(self.multiplier),
            write_state_interval: other.write_state_interval.or(self.write_state_interval),
        }
    }
}

/// This is simulation config. It implements Default trait so that you can create
/// default config and change only the fields you need.
pub struct Config {
    pub scaling: ScalingParams,
    pub algorithm: Box<dyn ForecastAlgorithm>,
    /// Interval between two state snapshots.
    pub write_state_interval: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scaling: Default::default(),
            algorithm: Box::<PercentileAlgorithm>::default(),
            write_state_interval: DEFAULT_WRITE_STATE_INTERVAL,
        }
    }
}

impl Config {
    pub fn from_raw(raw: RawConfig, resolver: &AlgorithmResolver) -> Result<Self, ConfigError> {
        let defaults = ScalingParams::default();
        let scaling = ScalingParams {
            target_pickup: raw.target_pickup.unwrap_or(defaults.target_pickup),
            workers_per_pod: raw.workers_per_pod.unwrap_or(defaults.workers_per_pod),
            min_pods: raw.min_pods.unwrap_or(defaults.min_pods),
            max_pods: raw.max_pods.unwrap_or(defaults.max_pods),
            pod_startup_time: raw.pod_startup_time.unwrap_or(defaults.pod_startup_time),
            pod_shutdown_time: raw.pod_shutdown_time.unwrap_or(defaults.pod_shutdown_time),
            multiplier: raw.multiplier.unwrap_or(defaults.multiplier),
        };
        let algorithm = resolver(raw.algorithm.as_deref().unwrap_or(DEFAULT_ALGORITHM))?;
        let config = Self {
            scaling,
            algorithm,
            write_state_interval: raw.write_state_interval.unwrap_or(DEFAULT_WRITE_STATE_INTERVAL),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml(path: &Path) -> Result<Self, ConfigError> {
        Self::from_raw(RawConfig::from_yaml(path)?, &default_algorithm_resolver)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let s = &self.scaling;
        if s.workers_per_pod == 0 {
            return Err(ConfigError::ZeroWorkersPerPod);
        }
        if s.min_pods > s.max_pods {
            return Err(ConfigError::PodRange {
                min: s.min_pods,
                max: s.max_pods,
            });
        }
        positive("target_pickup", s.target_pickup)?;
        positive("write_state_interval", self.write_state_interval)?;
        non_negative("pod_startup_time", s.pod_startup_time)?;
        non_negative("pod_shutdown_time", s.pod_shutdown_time)?;
        non_negative("multiplier", s.multiplier)?;
        Ok(())
    }
}

fn positive(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value > 0. && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { name, value })
    }
}

fn non_negative(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value >= 0. && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::Negative { name, value })
    }
}
