//! Queue length forecasting algorithms used by the autoscaler.

use crate::config::ConfigError;
use crate::history::History;
use crate::util::{parse_options, strip_bracketed};

pub const DEFAULT_PERCENTILE: f64 = 0.9;
pub const DEFAULT_LOOKBACK: f64 = 600.;

/// Turns the recent history and the amount of unprocessed work into a predicted queue length,
/// expressed as the time needed to drain it.
pub trait ForecastAlgorithm {
    /// `unprocessed` is the number of queued jobs plus the number of jobs in flight.
    /// Returns zero when the history window holds no observations.
    fn estimate(&self, history: &History, unprocessed: usize, time: f64) -> f64;

    /// Length of the trailing history window the estimate depends on.
    fn lookback(&self) -> f64;

    fn name(&self) -> String;
}

/// Scales the unprocessed length by a percentile of job latencies observed within the lookback window.
pub struct PercentileAlgorithm {
    percentile: f64,
    lookback: f64,
}

impl PercentileAlgorithm {
    pub fn new(percentile: f64, lookback: f64) -> Self {
        Self { percentile, lookback }
    }

    pub fn from_options(options: &[(String, String)]) -> Result<Self, ConfigError> {
        let mut percentile = DEFAULT_PERCENTILE;
        let mut lookback = DEFAULT_LOOKBACK;
        for (key, value) in options {
            match key.as_str() {
                "percentile" | "p" => percentile = parse_option(key, value)?,
                "lookback" => lookback = parse_option(key, value)?,
                _ => return Err(invalid_option(key, value)),
            }
        }
        if !(0. ..=1.).contains(&percentile) {
            return Err(invalid_option("percentile", &percentile.to_string()));
        }
        check_lookback(lookback)?;
        Ok(Self::new(percentile, lookback))
    }
}

impl Default for PercentileAlgorithm {
    fn default() -> Self {
        Self::new(DEFAULT_PERCENTILE, DEFAULT_LOOKBACK)
    }
}

impl ForecastAlgorithm for PercentileAlgorithm {
    fn estimate(&self, history: &History, unprocessed: usize, time: f64) -> f64 {
        let latencies = history.latencies_since(time - self.lookback);
        match latencies.quantile(self.percentile) {
            Some(k) => (unprocessed as f64) * k,
            None => 0.,
        }
    }

    fn lookback(&self) -> f64 {
        self.lookback
    }

    fn name(&self) -> String {
        format!("Percentile[percentile={},lookback={}]", self.percentile, self.lookback)
    }
}

/// Scales the unprocessed length by the mean job latency observed within the lookback window.
pub struct AverageAlgorithm {
    lookback: f64,
}

impl AverageAlgorithm {
    pub fn new(lookback: f64) -> Self {
        Self { lookback }
    }

    pub fn from_options(options: &[(String, String)]) -> Result<Self, ConfigError> {
        let mut lookback = DEFAULT_LOOKBACK;
        for (key, value) in options {
            match key.as_str() {
                "lookback" => lookback = parse_option(key, value)?,
                _ => return Err(invalid_option(key, value)),
            }
        }
        check_lookback(lookback)?;
        Ok(Self::new(lookback))
    }
}

impl Default for AverageAlgorithm {
    fn default() -> Self {
        Self::new(DEFAULT_LOOKBACK)
    }
}

impl ForecastAlgorithm for AverageAlgorithm {
    fn estimate(&self, history: &History, unprocessed: usize, time: f64) -> f64 {
        let latencies = history.latencies_since(time - self.lookback);
        if latencies.is_empty() {
            return 0.;
        }
        (unprocessed as f64) * latencies.mean()
    }

    fn lookback(&self) -> f64 {
        self.lookback
    }

    fn name(&self) -> String {
        format!("Average[lookback={}]", self.lookback)
    }
}

fn parse_option(key: &str, value: &str) -> Result<f64, ConfigError> {
    value.parse::<f64>().map_err(|_| invalid_option(key, value))
}

fn invalid_option(key: &str, value: &str) -> ConfigError {
    ConfigError::InvalidAlgorithmOption {
        key: key.to_string(),
        value: value.to_string(),
    }
}

fn check_lookback(lookback: f64) -> Result<(), ConfigError> {
    if lookback > 0. && lookback.is_finite() {
        Ok(())
    } else {
        Err(invalid_option("lookback", &lookback.to_string()))
    }
}

/// Resolves an algorithm description such as `Percentile[percentile=0.9,lookback=600]`,
/// `Average[lookback=300]` or one of the short names `percentile90_30`, `percentile90_5`, `average5`.
pub fn default_algorithm_resolver(s: &str) -> Result<Box<dyn ForecastAlgorithm>, ConfigError> {
    match s {
        "percentile90_30" => return Ok(Box::new(PercentileAlgorithm::new(0.9, 30. * 60.))),
        "percentile90_5" => return Ok(Box::new(PercentileAlgorithm::new(0.9, 5. * 60.))),
        "average5" => return Ok(Box::new(AverageAlgorithm::new(5. * 60.))),
        "Percentile" => return Ok(Box::<PercentileAlgorithm>::default()),
        "Average" => return Ok(Box::<AverageAlgorithm>::default()),
        _ => {}
    }
    if let Some(opts) = strip_bracketed(s, "Percentile") {
        return Ok(Box::new(PercentileAlgorithm::from_options(&parse_options(opts))?));
    }
    if let Some(opts) = strip_bracketed(s, "Average") {
        return Ok(Box::new(AverageAlgorithm::from_options(&parse_options(opts))?));
    }
    Err(ConfigError::UnknownAlgorithm(s.to_string()))
}
