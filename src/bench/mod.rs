//! Benchmark engine module
//!
//! The write and read sweep drivers: each walks the configured
//! power-of-two size range, runs its timed operation loop per size, and
//! streams one table row per completed size.

pub mod read;
pub mod write;

// Re-export commonly used types
pub use read::ReadBenchmark;
pub use write::WriteBenchmark;

use crate::config::SweepConfig;
use crate::io::{OpenFlags, DIRECT_IO_ALIGN};
use crate::{Result, SweepError};

/// Direct I/O requires transfers aligned to [`DIRECT_IO_ALIGN`]. The
/// sizes are powers of two, so checking the smallest covers them all.
pub(crate) fn check_direct_alignment(config: &SweepConfig, flags: OpenFlags) -> Result<()> {
    if flags.direct && config.min_size() % DIRECT_IO_ALIGN != 0 {
        return Err(SweepError::Config(format!(
            "direct I/O requires transfer sizes aligned to {} bytes, but the smallest tested size is {}",
            DIRECT_IO_ALIGN,
            config.min_size()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direct_alignment_rejects_sub_sector_sizes() {
        let config = SweepConfig::default().with_exponents(7, 12).with_threshold(1024);
        let err = check_direct_alignment(&config, OpenFlags::new().with_direct()).unwrap_err();
        assert!(err.to_string().contains("aligned"));
    }

    #[test]
    fn test_direct_alignment_accepts_sector_multiples() {
        let config = SweepConfig::default();
        assert!(check_direct_alignment(&config, OpenFlags::new().with_direct()).is_ok());
    }

    #[test]
    fn test_alignment_not_enforced_without_direct() {
        let config = SweepConfig::default().with_exponents(7, 12).with_threshold(1024);
        assert!(check_direct_alignment(&config, OpenFlags::new()).is_ok());
    }
}
