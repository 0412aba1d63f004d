//! iosweep - storage latency and bandwidth sweep
//!
//! Measures raw device latency and throughput for reads and writes across
//! a power-of-two range of transfer sizes, using direct and synchronous
//! I/O and a calibrated hardware cycle counter.

use std::fmt;

// Public re-exports
pub mod bench;
pub mod config;
pub mod cycles;
pub mod io;
pub mod models;
pub mod report;
pub mod util;

// Common error types
#[derive(Debug)]
pub enum SweepError {
    /// Sweep parameter or config file problem
    Config(String),
    /// Aligned buffer allocation failed
    Alloc(String),
    /// A file operation failed; `op` names the failing call
    Io {
        op: &'static str,
        source: std::io::Error,
    },
    /// A write transferred fewer bytes than requested
    ShortWrite { expected: usize, actual: usize },
    /// A read transferred fewer bytes than requested
    ShortRead { expected: usize, actual: usize },
    /// Structured report serialization failed
    Report(String),
}

impl SweepError {
    /// Wrap an I/O error with the name of the operation that raised it.
    pub fn io(op: &'static str, source: std::io::Error) -> Self {
        SweepError::Io { op, source }
    }
}

impl fmt::Display for SweepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SweepError::Config(msg) => write!(f, "configuration error: {}", msg),
            SweepError::Alloc(msg) => write!(f, "allocation error: {}", msg),
            SweepError::Io { op, source } => write!(f, "{} failed: {}", op, source),
            SweepError::ShortWrite { expected, actual } => {
                write!(f, "short write: expected {} bytes, wrote {}", expected, actual)
            }
            SweepError::ShortRead { expected, actual } => {
                write!(f, "expected {} bytes, but read only {}", expected, actual)
            }
            SweepError::Report(msg) => write!(f, "report error: {}", msg),
        }
    }
}

impl std::error::Error for SweepError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SweepError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for SweepError {
    fn from(err: serde_json::Error) -> Self {
        SweepError::Report(format!("JSON serialization error: {}", err))
    }
}

/// Result type alias for sweep operations
pub type Result<T> = std::result::Result<T, SweepError>;

// Common constants
pub const APP_NAME: &str = "iosweep";
pub const CONFIG_FILE: &str = "iosweep.toml";
pub const SCRATCH_FILE: &str = "iosweep.tmp";
