use std::path::Path;

use podsim::algorithm::default_algorithm_resolver;
use podsim::autoscaler::ScalingParams;
use podsim::config::{Config, ConfigError, RawConfig, DEFAULT_WRITE_STATE_INTERVAL};

#[test]
fn test_defaults() {
    let config = Config::from_raw(RawConfig::default(), &default_algorithm_resolver).unwrap();
    assert_eq!(config.scaling, ScalingParams::default());
    assert_eq!(config.scaling.target_pickup, 300.);
    assert_eq!(config.scaling.workers_per_pod, 3);
    assert_eq!(config.scaling.min_pods, 1);
    assert_eq!(config.scaling.max_pods, 30);
    assert_eq!(config.scaling.pod_startup_time, 180.);
    assert_eq!(config.scaling.pod_shutdown_time, 0.);
    assert_eq!(config.write_state_interval, DEFAULT_WRITE_STATE_INTERVAL);
    assert_eq!(config.algorithm.name(), "Percentile[percentile=0.9,lookback=600]");
}

#[test]
fn test_parse_yaml() {
    let raw = RawConfig::from_yaml_str(
        "target_pickup: 120\n\
         workers_per_pod: 2\n\
         max_pods: 8\n\
         algorithm: average5\n",
    )
    .unwrap();
    assert_eq!(raw.target_pickup, Some(120.));
    assert_eq!(raw.min_pods, None);
    let config = Config::from_raw(raw, &default_algorithm_resolver).unwrap();
    assert_eq!(config.scaling.workers_per_pod, 2);
    assert_eq!(config.scaling.min_pods, 1);
    assert_eq!(config.scaling.max_pods, 8);
    assert_eq!(config.algorithm.name(), "Average[lookback=300]");
}

#[test]
fn test_merge_prefers_other() {
    let file = RawConfig {
        target_pickup: Some(100.),
        min_pods: Some(2),
        algorithm: Some("average5".to_string()),
        ..Default::default()
    };
    let cli = RawConfig {
        min_pods: Some(4),
        multiplier: Some(1.5),
        ..Default::default()
    };
    let merged = file.merged_with(&cli);
    assert_eq!(merged.target_pickup, Some(100.));
    assert_eq!(merged.min_pods, Some(4));
    assert_eq!(merged.multiplier, Some(1.5));
    assert_eq!(merged.algorithm.as_deref(), Some("average5"));
}

#[test]
fn test_validation_errors() {
    let check = |raw: RawConfig| Config::from_raw(raw, &default_algorithm_resolver).err();

    assert!(matches!(
        check(RawConfig {
            workers_per_pod: Some(0),
            ..Default::default()
        }),
        Some(ConfigError::ZeroWorkersPerPod)
    ));
    assert!(matches!(
        check(RawConfig {
            min_pods: Some(5),
            max_pods: Some(3),
            ..Default::default()
        }),
        Some(ConfigError::PodRange { min: 5, max: 3 })
    ));
    assert!(matches!(
        check(RawConfig {
            target_pickup: Some(0.),
            ..Default::default()
        }),
        Some(ConfigError::NonPositive {
            name: "target_pickup",
            ..
        })
    ));
    assert!(matches!(
        check(RawConfig {
            pod_startup_time: Some(-1.),
            ..Default::default()
        }),
        Some(ConfigError::Negative {
            name: "pod_startup_time",
            ..
        })
    ));
    assert!(matches!(
        check(RawConfig {
            write_state_interval: Some(f64::INFINITY),
            ..Default::default()
        }),
        Some(ConfigError::NonPositive { .. })
    ));
    assert!(matches!(
        check(RawConfig {
            algorithm: Some("Median".to_string()),
            ..Default::default()
        }),
        Some(ConfigError::UnknownAlgorithm(_))
    ));
}

#[test]
fn test_zero_min_pods_is_valid() {
    let raw = RawConfig {
        min_pods: Some(0),
        max_pods: Some(0),
        pod_startup_time: Some(0.),
        ..Default::default()
    };
    assert!(Config::from_raw(raw, &default_algorithm_resolver).is_ok());
}

#[test]
fn test_bad_yaml_and_missing_file() {
    assert!(matches!(
        RawConfig::from_yaml_str("max_pods: many"),
        Err(ConfigError::Yaml(_))
    ));
    assert!(matches!(
        RawConfig::from_yaml(Path::new("/nonexistent/podsim.yaml")),
        Err(ConfigError::Io { .. })
    ));
}
