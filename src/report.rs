//! Report output
//!
//! Streams the fixed-width benchmark tables and assembles the optional
//! machine-readable JSON document. Table rows carry the size with
//! thousands separators, bandwidth in MB/s, and mean per-operation times
//! in seconds; a `#` preamble names the target file, the repetition
//! policy, and any free-text comment.

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::SweepConfig;
use crate::models::{Operation, Sample};
use crate::util::units::{group_thousands, mb};
use crate::{Result, SweepError};

/// Streams one benchmark table to a sink, one row per completed size.
///
/// The preamble is written on construction, before the sweep opens any
/// file, so a failed run still identifies itself in the output.
pub struct Reporter<'a, W: Write> {
    out: &'a mut W,
    op: Operation,
}

impl<'a, W: Write> Reporter<'a, W> {
    /// Write the preamble and column headers for one sweep table.
    pub fn new(
        out: &'a mut W,
        op: Operation,
        path: &Path,
        config: &SweepConfig,
        comment: Option<&str>,
    ) -> Result<Self> {
        writeln!(
            out,
            "# Benchmarking various {} sizes to file {}",
            op,
            path.display()
        )
        .map_err(Self::err)?;
        writeln!(
            out,
            "# Each result <= {:.2} MB is averaged {} times and everything larger {} times",
            mb(config.small_big_threshold),
            config.small_count,
            config.large_count
        )
        .map_err(Self::err)?;

        if let Some(comment) = comment {
            writeln!(out, "# Extra Comment: {}", comment).map_err(Self::err)?;
        }

        match op {
            Operation::Write => writeln!(
                out,
                "# {:>18} {:>18} {:>18} {:>18}",
                "Write Size (bytes)",
                "Bandwidth (MB/s)",
                "Write Time (sec)",
                "fsync Time (sec)",
            ),
            Operation::Read => writeln!(
                out,
                "# {:>18} {:>18} {:>18}",
                "Read Size (bytes)",
                "Bandwidth (MB/s)",
                "Read Time (sec)",
            ),
        }
        .map_err(Self::err)?;

        Ok(Self { out, op })
    }

    /// Write the data row for one completed size.
    pub fn row(&mut self, sample: &Sample) -> Result<()> {
        match self.op {
            Operation::Write => writeln!(
                self.out,
                "  {:>18} {:>18.3} {:>18.6} {:>18.6}",
                group_thousands(sample.size),
                sample.bandwidth_mbps(),
                sample.mean_op_secs(),
                sample.mean_flush_secs().unwrap_or(0.0),
            ),
            Operation::Read => writeln!(
                self.out,
                "  {:>18} {:>18.3} {:>18.6}",
                group_thousands(sample.size),
                sample.bandwidth_mbps(),
                sample.mean_op_secs(),
            ),
        }
        .map_err(Self::err)
    }

    /// Terminate the table with a blank line.
    pub fn finish(self) -> Result<()> {
        writeln!(self.out).map_err(Self::err)
    }

    fn err(e: std::io::Error) -> SweepError {
        SweepError::io("report", e)
    }
}

/// One table row with derived values, for the JSON document.
#[derive(Debug, Clone, Serialize)]
pub struct ReportRow {
    pub size: u64,
    pub count: u32,
    pub bandwidth_mbps: f64,
    pub mean_op_secs: f64,
    pub mean_flush_secs: Option<f64>,
}

impl From<&Sample> for ReportRow {
    fn from(sample: &Sample) -> Self {
        Self {
            size: sample.size,
            count: sample.count,
            bandwidth_mbps: sample.bandwidth_mbps(),
            mean_op_secs: sample.mean_op_secs(),
            mean_flush_secs: sample.mean_flush_secs(),
        }
    }
}

/// One full sweep in the JSON document.
#[derive(Debug, Clone, Serialize)]
pub struct SweepReport {
    pub operation: Operation,
    pub comment: Option<String>,
    pub rows: Vec<ReportRow>,
}

impl SweepReport {
    pub fn new(operation: Operation, comment: Option<&str>, samples: &[Sample]) -> Self {
        Self {
            operation,
            comment: comment.map(str::to_string),
            rows: samples.iter().map(ReportRow::from).collect(),
        }
    }
}

/// Machine-readable run summary emitted in place of the tables.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub timestamp: DateTime<Utc>,
    pub file: PathBuf,
    pub config: SweepConfig,
    pub sweeps: Vec<SweepReport>,
}

impl RunReport {
    pub fn new(file: &Path, config: SweepConfig) -> Self {
        Self {
            timestamp: Utc::now(),
            file: file.to_path_buf(),
            config,
            sweeps: Vec::new(),
        }
    }

    pub fn push(&mut self, sweep: SweepReport) {
        self.sweeps.push(sweep);
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
