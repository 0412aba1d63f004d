//! Utility functions module
//!
//! Helper functions for numeric formatting in reports.

pub mod units;

// Re-export commonly used functions
pub use units::{group_thousands, mb};
