//! Read sweep driver
//!
//! Populates one scratch file with the largest volume any size class
//! touches, then for each transfer size runs that size's repetitions of
//! a single positioned read at deterministic, alignment-rounded stride
//! offsets. The file is created once, stays open for the whole sweep,
//! and is deleted at the end.

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

/// Read benchmark over the configured size sweep.
pub struct ReadBenchmark {
    config: SweepConfig,
}

impl ReadBenchmark {
    /// Create a read benchmark with validated parameters
    pub fn new(config: SweepConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Run the sweep against `path`, streaming one table row per size to
    /// `out` and returning the collected samples.
    ///
    /// Stops at the first failed open, populate write, flush, or read;
    /// rows for sizes completed before the failure are already on `out`.
    pub fn run<W: Write>(
        &self,
        path: &Path,
        flags: OpenFlags,
        comment: Option<&str>,
        out: &mut W,
    ) -> Result<Vec<Sample>> {
        check_direct_alignment(&self.config, flags)?;

        let mut reporter = Reporter::new(out, Operation::Read, path, &self.config, comment)?;

        let total = populate_size(&self.config);
        let mut buf = AlignedBuf::zeroed(total as usize, DIRECT_IO_ALIGN as usize)?;
        buf.fill_random(DATA_SEED);

        let file = ScratchFile::open(path, AccessMode::ReadWrite, flags.with_create())?;
        let written = file.write_at(&buf, 0)?;
        if written != buf.len() {
            return Err(SweepError::ShortWrite {
                expected: buf.len(),
                actual: written,
            });
        }
        file.flush_to_storage()?;

        let mut samples = Vec::new();
        for size in self.config.sizes() {
            let count = self.config.reps_for(size);
            let sample = timed_pass(&file, &mut buf, size, count, total)?;
            reporter.row(&sample)?;
            samples.push(sample);
        }

        file.remove()?;
        reporter.finish()?;
        Ok(samples)
    }
}

/// Bytes written to the scratch file before the timed reads: the largest
/// total volume any size class writes. Every stride offset plus its read
/// size then stays inside the file.
pub fn populate_size(config: &SweepConfig) -> u64 {
    config
        .sizes()
        .map(|size| size * config.reps_for(size) as u64)
        .max()
        .unwrap_or(0)
}

/// Offset of repetition `index` when strides of `increment` bytes spread
/// the reads across the file, rounded down to the direct I/O alignment.
pub fn stride_offset(index: u64, increment: u64) -> u64 {
    (index * increment) & !(DIRECT_IO_ALIGN - 1)
}

/// The timed loop for one size: repetitions of a single positioned read
/// at stride offsets across the populated file.
fn timed_pass(
    file: &ScratchFile,
    buf: &mut [u8],
    size: u64,
    count: u32,
    total: u64,
) -> Result<Sample> {
    let increment = total / count as u64;
    let mut read_cycles = 0u64;

    for i in 0..count {
        let offset = stride_offset(i as u64, increment);

        let start = cycles::read();
        let got = file.read_at(&mut buf[..size as usize], offset)?;
        let stop = cycles::read();

        if got != size as usize {
            return Err(SweepError::ShortRead {
                expected: size as usize,
                actual: got,
            });
        }

        read_cycles += stop.saturating_sub(start);
    }

    Ok(Sample {
        size,
        count,
        op_cycles: read_cycles,
        flush_cycles: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn test_config() -> SweepConfig {
        SweepConfig::default()
            .with_exponents(9, 12)
            .with_counts(3, 2)
            .with_threshold(1024)
    }

    #[test]
    fn test_sweep_reads_every_size() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("scratch.tmp");
        let bench = ReadBenchmark::new(test_config()).unwrap();

        let mut out = Vec::new();
        let samples = bench.run(&path, OpenFlags::new(), None, &mut out).unwrap();

        let sizes: Vec<u64> = samples.iter().map(|s| s.size).collect();
        assert_eq!(sizes, vec![512, 1024, 2048, 4096]);

        let counts: Vec<u32> = samples.iter().map(|s| s.count).collect();
        assert_eq!(counts, vec![3, 3, 2, 2]);

        for sample in &samples {
            assert!(sample.flush_cycles.is_none());
        }
        assert!(!path.exists());
    }

    #[test]
    fn test_populate_size_is_the_largest_class_volume() {
        // 512*3, 1024*3, 2048*2, 4096*2 -> 8192 wins
        assert_eq!(populate_size(&test_config()), 8192);

        // Default sweep: 2^28 * 3 dominates every small-class volume
        assert_eq!(populate_size(&SweepConfig::default()), 805_306_368);
    }

    #[test]
    fn test_stride_offsets_stay_aligned_and_in_bounds() {
        let config = test_config();
        let total = populate_size(&config);

        for size in config.sizes() {
            let count = config.reps_for(size);
            let increment = total / count as u64;
            for i in 0..count {
                let offset = stride_offset(i as u64, increment);
                assert_eq!(offset % DIRECT_IO_ALIGN, 0);
                assert!(
                    offset + size <= total,
                    "offset {} + size {} escapes file of {} bytes",
                    offset,
                    size,
                    total
                );
            }
        }
    }

    #[test]
    fn test_read_rows_have_three_columns() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("scratch.tmp");
        let bench = ReadBenchmark::new(test_config()).unwrap();

        let mut out = Vec::new();
        bench.run(&path, OpenFlags::new(), None, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        let rows: Vec<&str> = text
            .lines()
            .filter(|l| !l.starts_with('#') && !l.is_empty())
            .collect();
        assert_eq!(rows.len(), 4);
        for row in rows {
            assert_eq!(row.split_whitespace().count(), 3);
        }
    }

    #[test]
    fn test_short_read_reports_expected_and_actual_counts() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("scratch.tmp");

        let file = ScratchFile::open(
            &path,
            AccessMode::ReadWrite,
            OpenFlags::new().with_create(),
        )
        .unwrap();
        assert_eq!(file.write_at(&[0xA5u8; 512], 0).unwrap(), 512);
        file.flush_to_storage().unwrap();

        // 4096-byte read from a 512-byte file must come up short.
        let mut buf = AlignedBuf::zeroed(4096, DIRECT_IO_ALIGN as usize).unwrap();
        let err = timed_pass(&file, &mut buf, 4096, 1, 512).unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("4096"), "message lacks expected count: {msg}");
        assert!(msg.contains("512"), "message lacks actual count: {msg}");
        match err {
            SweepError::ShortRead { expected, actual } => {
                assert_eq!(expected, 4096);
                assert_eq!(actual, 512);
            }
            other => panic!("expected ShortRead, got {}", other),
        }
    }

    #[test]
    fn test_unreadable_path_fails_before_any_row() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("no-such-dir").join("scratch.tmp");
        let bench = ReadBenchmark::new(test_config()).unwrap();

        let mut out = Vec::new();
        let err = bench
            .run(&path, OpenFlags::new(), None, &mut out)
            .unwrap_err();
        assert!(err.to_string().contains("open"));

        let text = String::from_utf8(out).unwrap();
        assert!(text.lines().all(|line| line.starts_with('#')));
    }
}
