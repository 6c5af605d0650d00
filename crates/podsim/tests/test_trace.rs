mod common;
use common::assert_float_eq;

use podsim::config::Config;
use podsim::simulation::Simulation;
use podsim::trace::{format_timestamp, parse_timestamp, JobTrace, Trace};

#[test]
fn test_arrival_trace() {
    let data = "id,latency,enqueued_at\n\
                1,12.5,2024-03-01T10:00:00Z\n\
                2,3,2024-03-01T10:00:30.250Z\n";
    let trace = JobTrace::from_reader(data.as_bytes()).unwrap();
    assert_eq!(trace.len(), 2);
    assert_eq!(trace.skipped_rows(), 0);
    let jobs: Vec<_> = trace.job_iter().collect();
    let base = parse_timestamp("2024-03-01T10:00:00Z").unwrap();
    assert_eq!(jobs[0].id, 1);
    assert_eq!(jobs[0].latency, 12.5);
    assert_float_eq(jobs[0].arrival_time, base, 1e-6);
    assert_float_eq(jobs[1].arrival_time, base + 30.25, 1e-6);
}

#[test]
fn test_replay_trace_reconstructs_arrival() {
    let data = "id,latency,completed_at,pickup\n\
                7,20,2024-03-01T10:01:00Z,40\n";
    let trace = JobTrace::from_reader(data.as_bytes()).unwrap();
    let job = trace.job_iter().next().unwrap();
    let completed = parse_timestamp("2024-03-01T10:01:00Z").unwrap();
    assert_float_eq(job.arrival_time, completed - 60., 1e-6);
    assert_eq!(job.latency, 20.);
}

#[test]
fn test_camel_case_columns() {
    let data = "id,latency,enqueuedAt\n3,1,2024-03-01T10:00:00Z\n";
    let trace = JobTrace::from_reader(data.as_bytes()).unwrap();
    assert_eq!(trace.len(), 1);

    let data = "id,latency,completedAt,pickup\n3,1,2024-03-01T10:00:00Z,2\n";
    let trace = JobTrace::from_reader(data.as_bytes()).unwrap();
    assert_eq!(trace.len(), 1);
}

#[test]
fn test_malformed_rows_are_skipped() {
    let data = "id,latency,enqueued_at\n\
                1,5,2024-03-01T10:00:00Z\n\
                two,5,2024-03-01T10:00:00Z\n\
                3,-1,2024-03-01T10:00:00Z\n\
                4,5,yesterday\n\
                5,5,\n\
                6, 5 , 2024-03-01T10:00:05Z \n";
    let trace = JobTrace::from_reader(data.as_bytes()).unwrap();
    let ids: Vec<_> = trace.job_iter().map(|j| j.id).collect();
    assert_eq!(ids, vec![1, 6]);
    assert_eq!(trace.skipped_rows(), 4);
}

#[test]
fn test_replay_row_without_pickup_is_skipped() {
    let data = "id,latency,completed_at,pickup\n1,5,2024-03-01T10:00:00Z,\n";
    let trace = JobTrace::from_reader(data.as_bytes()).unwrap();
    assert!(trace.is_empty());
    assert_eq!(trace.skipped_rows(), 1);
}

#[test]
fn test_timestamp_formats() {
    let utc = parse_timestamp("2024-03-01T10:00:00Z").unwrap();
    assert_eq!(utc, 1709287200.);
    assert_eq!(parse_timestamp("2024-03-01T10:00:00").unwrap(), utc);
    assert_eq!(parse_timestamp("2024-03-01 10:00:00").unwrap(), utc);
    assert_eq!(parse_timestamp("2024-03-01T12:00:00+02:00").unwrap(), utc);
    assert_float_eq(parse_timestamp("2024-03-01T10:00:00.5").unwrap(), utc + 0.5, 1e-6);
    assert!(parse_timestamp("2024-03-01").is_err());
    assert!(parse_timestamp("").is_err());
}

#[test]
fn test_format_timestamp() {
    assert_eq!(format_timestamp(1709287200.), "2024-03-01T10:00:00.000Z");
    assert_eq!(format_timestamp(1709287200.25), "2024-03-01T10:00:00.250Z");
}

#[test]
fn test_same_id_in_different_queues_waits_side_by_side() {
    let data = "id,queue,latency,enqueued_at\n\
                7,default,100,2024-03-01T10:00:00Z\n\
                8,default,100,2024-03-01T10:00:00Z\n\
                9,default,100,2024-03-01T10:00:00Z\n\
                1,default,5,2024-03-01T10:00:01Z\n\
                1,mailers,5,2024-03-01T10:00:02Z\n";
    let trace = JobTrace::from_reader(data.as_bytes()).unwrap();
    assert_eq!(trace.len(), 5);

    // the default pod has three workers, so both jobs with id 1 wait until 10:01:40
    let mut sim = Simulation::new(Config::default());
    assert_eq!(sim.load_trace(&trace), 5);
    let summary = sim.run().unwrap();
    assert_eq!(summary.jobs_completed, 5);
    assert!(!summary.stalled);
    let base = parse_timestamp("2024-03-01T10:00:00Z").unwrap();
    let starts: Vec<_> = sim
        .history()
        .iter()
        .filter(|e| e.job_id == 1)
        .map(|e| e.start_time - base)
        .collect();
    assert_eq!(starts, vec![100., 100.]);
}
