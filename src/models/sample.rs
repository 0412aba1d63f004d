//! Measurement records shared by the sweep drivers, reporter, and tests.

use std::fmt;

use serde::Serialize;

use crate::cycles;

/// Which timed operation produced a sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Write,
    Read,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Write => write!(f, "write"),
            Operation::Read => write!(f, "read"),
        }
    }
}

/// Aggregated measurement for one transfer size.
///
/// Cycle totals are raw counter deltas summed over `count` repetitions;
/// the derived accessors convert them through the calibrated rate.
/// `flush_cycles` is present only for operations with a flush phase.
#[derive(Debug, Clone)]
pub struct Sample {
    /// Transfer size in bytes
    pub size: u64,
    /// Repetitions aggregated into the totals
    pub count: u32,
    /// Cycles spent in the operation phase, summed over repetitions
    pub op_cycles: u64,
    /// Cycles spent in the flush phase, summed over repetitions
    pub flush_cycles: Option<u64>,
}

impl Sample {
    /// Total cycles across operation and flush phases
    pub fn total_cycles(&self) -> u64 {
        self.op_cycles + self.flush_cycles.unwrap_or(0)
    }

    /// Mean seconds per repetition spent in the operation phase
    pub fn mean_op_secs(&self) -> f64 {
        cycles::to_seconds(self.op_cycles) / self.count as f64
    }

    /// Mean seconds per repetition spent in the flush phase
    pub fn mean_flush_secs(&self) -> Option<f64> {
        self.flush_cycles
            .map(|c| cycles::to_seconds(c) / self.count as f64)
    }

    /// Throughput in MB/s: bytes moved per mean total (operation plus
    /// flush) second, scaled to megabytes.
    pub fn bandwidth_mbps(&self) -> f64 {
        let mean_total_secs = cycles::to_seconds(self.total_cycles()) / self.count as f64;
        if mean_total_secs <= 0.0 {
            return 0.0;
        }
        self.size as f64 / mean_total_secs / 1e6
    }
}
