//! Write sweep driver
//!
//! For each transfer size: create the scratch file, run that size's
//! repetitions of positioned write then flush-to-storage at an advancing
//! offset with the cycle counter read around each phase, delete the
//! file, and report the aggregated row. Recreating the file per size
//! resets filesystem placement between sizes.

use std::io::Write;
use std::path::Path;

use crate::bench::check_direct_alignment;
use crate::config::SweepConfig;
use crate::cycles;
use crate::io::buffer::DATA_SEED;
use crate::io::{AccessMode, AlignedBuf, OpenFlags, ScratchFile, DIRECT_IO_ALIGN};
use crate::models::{Operation, Sample};
use crate::report::Reporter;
use crate::{Result, SweepError};

/// Write benchmark over the configured size sweep.
pub struct WriteBenchmark {
    config: SweepConfig,
}

impl WriteBenchmark {
    /// Create a write benchmark with validated parameters
    pub fn new(config: SweepConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Run the sweep against `path`, streaming one table row per size to
    /// `out` and returning the collected samples.
    ///
    /// Stops at the first failed open, write, or flush; rows for sizes
    /// completed before the failure are already on `out`.
    pub fn run<W: Write>(
        &self,
        path: &Path,
        flags: OpenFlags,
        comment: Option<&str>,
        out: &mut W,
    ) -> Result<Vec<Sample>> {
        check_direct_alignment(&self.config, flags)?;

        let mut reporter = Reporter::new(out, Operation::Write, path, &self.config, comment)?;

        let mut data =
            AlignedBuf::zeroed(self.config.max_size() as usize, DIRECT_IO_ALIGN as usize)?;
        data.fill_random(DATA_SEED);

        let mut samples = Vec::new();
        for size in self.config.sizes() {
            let sample = self.run_size(path, flags, &data[..size as usize])?;
            reporter.row(&sample)?;
            samples.push(sample);
        }

        reporter.finish()?;
        Ok(samples)
    }

    /// Measure one transfer size: open fresh, run the timed pass, delete.
    fn run_size(&self, path: &Path, flags: OpenFlags, data: &[u8]) -> Result<Sample> {
        let count = self.config.reps_for(data.len() as u64);
        let file = ScratchFile::open(path, AccessMode::WriteOnly, flags.with_create())?;
        let sample = timed_pass(&file, data, count)?;
        file.remove()?;
        Ok(sample)
    }
}

/// The timed loop for one size: positioned write, then flush, with the
/// counter read before, between, and after the two phases. The offset
/// advances by the transfer size after every write.
fn timed_pass(file: &ScratchFile, data: &[u8], count: u32) -> Result<Sample> {
    let mut offset = 0u64;
    let mut write_cycles = 0u64;
    let mut flush_cycles = 0u64;

    for _ in 0..count {
        let start = cycles::read();
        let written = file.write_at(data, offset)?;
        let mid = cycles::read();

        if written != data.len() {
            return Err(SweepError::ShortWrite {
                expected: data.len(),
                actual: written,
            });
        }

        file.flush_to_storage()?;
        let stop = cycles::read();

        write_cycles += mid.saturating_sub(start);
        flush_cycles += stop.saturating_sub(mid);
        offset += data.len() as u64;
    }

    Ok(Sample {
        size: data.len() as u64,
        count,
        op_cycles: write_cycles,
        flush_cycles: Some(flush_cycles),
    })
}
