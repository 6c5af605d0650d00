//! CSV output of snapshots.
//!
//! Two streams are written: `kpis.csv` with latency KPIs and `queueLengths.csv` with worker and
//! queue counts. A failed write is logged and does not interrupt the simulation.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use csv::Writer;
use log::warn;

use crate::snapshot::{Snapshot, SnapshotObserver};
use crate::trace::format_timestamp;

pub const KPIS_FILE: &str = "kpis.csv";
pub const QUEUE_LENGTHS_FILE: &str = "queueLengths.csv";

const KPIS_HEADER: [&str; 6] = [
    "timestamp",
    "running%",
    "%_<_target",
    "95%_pickup",
    "max_pickup",
    "queued_jobs",
];
const QUEUE_LENGTHS_HEADER: [&str; 5] = ["timestamp", "idle_workers", "running_workers", "pods", "queued_jobs"];

pub struct CsvMetricsWriter<W: Write> {
    kpis: Writer<W>,
    queue_lengths: Writer<W>,
    failed: bool,
}

impl CsvMetricsWriter<File> {
    /// Creates both CSV files in `dir`, replacing existing ones.
    pub fn create(dir: &Path) -> Result<Self, csv::Error> {
        Self::from_writers(
            File::create(dir.join(KPIS_FILE))?,
            File::create(dir.join(QUEUE_LENGTHS_FILE))?,
        )
    }
}

impl<W: Write> CsvMetricsWriter<W> {
    pub fn from_writers(kpis: W, queue_lengths: W) -> Result<Self, csv::Error> {
        let mut kpis = Writer::from_writer(kpis);
        kpis.write_record(KPIS_HEADER)?;
        let mut queue_lengths = Writer::from_writer(queue_lengths);
        queue_lengths.write_record(QUEUE_LENGTHS_HEADER)?;
        Ok(Self {
            kpis,
            queue_lengths,
            failed: false,
        })
    }

    pub fn write(&mut self, snapshot: &Snapshot) -> Result<(), csv::Error> {
        let timestamp = format_timestamp(snapshot.time);
        self.kpis.write_record([
            timestamp.clone(),
            format!("{:.2}", snapshot.busy_percent()),
            format!("{:.2}", snapshot.pct_below_target),
            format!("{:.2}", snapshot.pickup_p95),
            format!("{:.2}", snapshot.pickup_max),
            snapshot.pending_jobs.to_string(),
        ])?;
        self.queue_lengths.write_record([
            timestamp,
            snapshot.idle_workers.to_string(),
            snapshot.busy_workers.to_string(),
            snapshot.pods.to_string(),
            snapshot.pending_jobs.to_string(),
        ])?;
        Ok(())
    }

    pub fn flush(&mut self) -> std::io::Result<()> {
        self.kpis.flush()?;
        self.queue_lengths.flush()
    }

    /// Flushes and returns the underlying writers (kpis, queue lengths).
    pub fn into_inner(self) -> Result<(W, W), std::io::Error> {
        let kpis = self.kpis.into_inner().map_err(|e| e.into_error())?;
        let queue_lengths = self.queue_lengths.into_inner().map_err(|e| e.into_error())?;
        Ok((kpis, queue_lengths))
    }
}

impl<W: Write> SnapshotObserver for CsvMetricsWriter<W> {
    fn on_snapshot(&mut self, snapshot: &Snapshot) {
        if let Err(e) = self.write(snapshot) {
            // report only the first failure, the following ones are most likely the same
            if !self.failed {
                warn!(target: "metrics", "Cannot write metrics: {}", e);
                self.failed = true;
            }
        }
    }

    fn on_finish(&mut self) {
        if let Err(e) = self.flush() {
            warn!(target: "metrics", "Cannot flush metrics: {}", e);
        }
    }
}
