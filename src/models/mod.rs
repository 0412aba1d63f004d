//! Data models module
//!
//! Measurement records produced by the sweep drivers.

pub mod sample;

// Re-export commonly used types
pub use sample::{Operation, Sample};
