//! Job traces.
//!
//! The CSV format has a header row and the columns `id`, `latency` (seconds) and either
//! `enqueued_at` for arrival traces or `completed_at` plus `pickup` (seconds) for replay traces,
//! where the arrival time is reconstructed as `completed_at - latency - pickup`.
//! Timestamps are ISO-8601 with optional fractional seconds. Rows which cannot be interpreted
//! are skipped.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use csv::ReaderBuilder;
use log::warn;
use serde::Deserialize;
use thiserror::Error;

use crate::job::Job;

#[derive(Debug, Error)]
pub enum TraceError {
    #[error("cannot open trace {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot read trace: {0}")]
    Read(#[from] csv::Error),
}

pub trait Trace {
    fn job_iter(&self) -> Box<dyn Iterator<Item = Job> + '_>;
}

#[derive(Debug, Deserialize)]
struct JobRecord {
    id: u64,
    latency: f64,
    #[serde(default, alias = "enqueuedAt")]
    enqueued_at: Option<String>,
    #[serde(default, alias = "completedAt")]
    completed_at: Option<String>,
    #[serde(default)]
    pickup: Option<f64>,
}

impl JobRecord {
    fn into_job(self) -> Result<Job, String> {
        if !(self.latency.is_finite() && self.latency >= 0.) {
            return Err(format!("invalid latency {}", self.latency));
        }
        let arrival_time = match (&self.enqueued_at, &self.completed_at) {
            (Some(enqueued_at), _) => parse_timestamp(enqueued_at)?,
            (None, Some(completed_at)) => {
                let pickup = self.pickup.ok_or("replay row without pickup")?;
                if !(pickup.is_finite() && pickup >= 0.) {
                    return Err(format!("invalid pickup {}", pickup));
                }
                parse_timestamp(completed_at)? - self.latency - pickup
            }
            (None, None) => return Err("row without timestamp".to_string()),
        };
        Ok(Job::new(self.id, arrival_time, self.latency))
    }
}

/// Trace backed by a list of jobs.
#[derive(Default)]
pub struct JobTrace {
    jobs: Vec<Job>,
    skipped_rows: usize,
}

impl JobTrace {
    pub fn from_jobs(jobs: Vec<Job>) -> Self {
        Self { jobs, skipped_rows: 0 }
    }

    pub fn from_path(path: &Path) -> Result<Self, TraceError> {
        let f = File::open(path).map_err(|source| TraceError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(f)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, TraceError> {
        let mut reader = ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let mut trace = Self::default();
        for (row, rec) in reader.deserialize::<JobRecord>().enumerate() {
            let parsed = match rec {
                Ok(record) => record.into_job(),
                Err(e) if e.is_io_error() => return Err(e.into()),
                Err(e) => Err(e.to_string()),
            };
            match parsed {
                Ok(job) => trace.jobs.push(job),
                Err(reason) => {
                    warn!(target: "trace", "Skipping row {}: {}", row + 1, reason);
                    trace.skipped_rows += 1;
                }
            }
        }
        Ok(trace)
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Number of rows which could not be interpreted as jobs.
    pub fn skipped_rows(&self) -> usize {
        self.skipped_rows
    }
}

impl Trace for JobTrace {
    fn job_iter(&self) -> Box<dyn Iterator<Item = Job> + '_> {
        Box::new(self.jobs.iter().cloned())
    }
}

/// Parses an ISO-8601 timestamp into seconds since the Unix epoch.
/// Timestamps without an offset are taken as UTC.
pub fn parse_timestamp(s: &str) -> Result<f64, String> {
    let dt = match DateTime::parse_from_rfc3339(s) {
        Ok(dt) => dt.with_timezone(&Utc),
        Err(_) => {
            let naive = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
                .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f"))
                .map_err(|e| format!("invalid timestamp {:?}: {}", s, e))?;
            Utc.from_utc_datetime(&naive)
        }
    };
    Ok(dt.timestamp() as f64 + f64::from(dt.timestamp_subsec_nanos()) * 1e-9)
}

/// Formats seconds since the Unix epoch as an RFC 3339 timestamp with millisecond precision.
pub fn format_timestamp(time: f64) -> String {
    let secs = time.floor();
    let nanos = ((time - secs) * 1e9).round().min(999_999_999.) as u32;
    match Utc.timestamp_opt(secs as i64, nanos).single() {
        Some(dt) => dt.to_rfc3339_opts(SecondsFormat::Millis, true),
        None => format!("{:.3}", time),
    }
}
