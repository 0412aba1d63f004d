//! I/O operations module
//!
//! File and buffer primitives for the timed loops: capability-flagged
//! scratch files with positioned reads and writes, and the aligned
//! buffer direct I/O requires.

pub mod buffer;
pub mod file;

pub use buffer::AlignedBuf;
pub use file::{AccessMode, OpenFlags, ScratchFile};

/// Alignment direct I/O requires of buffers, transfer sizes, and offsets.
pub const DIRECT_IO_ALIGN: u64 = 512;
