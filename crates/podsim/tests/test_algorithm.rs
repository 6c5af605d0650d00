mod common;
use common::assert_float_eq;

use podsim::algorithm::{default_algorithm_resolver, AverageAlgorithm, ForecastAlgorithm, PercentileAlgorithm};
use podsim::config::ConfigError;
use podsim::history::{History, HistoryEntry};

fn entry(job_id: u64, start_time: f64, completion_time: f64) -> HistoryEntry {
    HistoryEntry {
        job_id,
        worker_id: 1,
        arrival_time: start_time,
        start_time,
        completion_time,
    }
}

/// Latencies 1..=10 completed at times 100..=109.
fn sample_history() -> History {
    let mut history = History::new();
    for i in 0..10 {
        let completion = 100. + i as f64;
        history.append(entry(i, completion - (i + 1) as f64, completion));
    }
    history
}

#[test]
fn test_empty_window_gives_zero() {
    let history = History::new();
    assert_eq!(PercentileAlgorithm::default().estimate(&history, 50, 1000.), 0.);
    assert_eq!(AverageAlgorithm::default().estimate(&history, 50, 1000.), 0.);

    // entries exist but all fell out of the window
    let history = sample_history();
    let algorithm = PercentileAlgorithm::new(0.9, 60.);
    assert_eq!(algorithm.estimate(&history, 50, 1000.), 0.);
}

#[test]
fn test_percentile_estimate() {
    let history = sample_history();
    let algorithm = PercentileAlgorithm::new(0.5, 600.);
    // median of 1..=10 is 5.5
    assert_float_eq(algorithm.estimate(&history, 4, 110.), 22., 1e-9);
    assert_eq!(algorithm.estimate(&history, 0, 110.), 0.);
}

#[test]
fn test_percentile_monotone_in_percentile() {
    let history = sample_history();
    let mut prev = 0.;
    for p in &[0., 0.1, 0.25, 0.5, 0.75, 0.9, 0.99, 1.] {
        let estimate = PercentileAlgorithm::new(*p, 600.).estimate(&history, 7, 110.);
        assert!(estimate >= prev);
        prev = estimate;
    }
    assert_float_eq(prev, 70., 1e-9);
}

#[test]
fn test_lookback_filters_by_completion_time() {
    let history = sample_history();
    // cutoff 105 keeps jobs completed at 105..=109, latencies 6..=10
    let algorithm = AverageAlgorithm::new(5.);
    assert_float_eq(algorithm.estimate(&history, 1, 110.), 8., 1e-9);
    let algorithm = PercentileAlgorithm::new(0., 5.);
    assert_float_eq(algorithm.estimate(&history, 1, 110.), 6., 1e-9);
}

#[test]
fn test_average_estimate() {
    let history = sample_history();
    let algorithm = AverageAlgorithm::new(600.);
    assert_float_eq(algorithm.estimate(&history, 2, 110.), 11., 1e-9);
}

#[test]
fn test_resolver_short_names() {
    let algorithm = default_algorithm_resolver("percentile90_30").unwrap();
    assert_eq!(algorithm.lookback(), 1800.);
    assert_eq!(algorithm.name(), "Percentile[percentile=0.9,lookback=1800]");
    let algorithm = default_algorithm_resolver("percentile90_5").unwrap();
    assert_eq!(algorithm.lookback(), 300.);
    let algorithm = default_algorithm_resolver("average5").unwrap();
    assert_eq!(algorithm.name(), "Average[lookback=300]");
}

#[test]
fn test_resolver_with_options() {
    let algorithm = default_algorithm_resolver("Percentile[percentile=0.5,lookback=120]").unwrap();
    assert_eq!(algorithm.name(), "Percentile[percentile=0.5,lookback=120]");
    let algorithm = default_algorithm_resolver("Average[lookback=60]").unwrap();
    assert_eq!(algorithm.lookback(), 60.);
    let algorithm = default_algorithm_resolver("Percentile").unwrap();
    assert_eq!(algorithm.name(), "Percentile[percentile=0.9,lookback=600]");
}

#[test]
fn test_resolver_errors() {
    assert!(matches!(
        default_algorithm_resolver("Median"),
        Err(ConfigError::UnknownAlgorithm(name)) if name == "Median"
    ));
    assert!(matches!(
        default_algorithm_resolver("Percentile[percentile=1.5]"),
        Err(ConfigError::InvalidAlgorithmOption { .. })
    ));
    assert!(matches!(
        default_algorithm_resolver("Average[lookback=0]"),
        Err(ConfigError::InvalidAlgorithmOption { .. })
    ));
    assert!(matches!(
        default_algorithm_resolver("Average[window=10]"),
        Err(ConfigError::InvalidAlgorithmOption { key, .. }) if key == "window"
    ));
    assert!(matches!(
        default_algorithm_resolver("Percentile[percentile=high]"),
        Err(ConfigError::InvalidAlgorithmOption { .. })
    ));
}
