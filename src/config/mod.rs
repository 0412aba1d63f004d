//! Sweep configuration module
//!
//! Loading and validation of the transfer-size sweep parameters.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{Result, SweepError, APP_NAME, CONFIG_FILE};

/// Parameters controlling the transfer-size sweep.
///
/// Transfer sizes are the powers of two from `2^min_exp` through
/// `2^max_exp` bytes. Each size is measured `small_count` times, or
/// `large_count` times once the size exceeds `small_big_threshold`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    /// Exponent of the smallest transfer size (bytes = 2^min_exp)
    pub min_exp: u32,
    /// Exponent of the largest transfer size (bytes = 2^max_exp)
    pub max_exp: u32,
    /// Repetitions for sizes at or below the threshold
    pub small_count: u32,
    /// Repetitions for sizes above the threshold
    pub large_count: u32,
    /// Size-class boundary in bytes
    pub small_big_threshold: u64,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            min_exp: 9,
            max_exp: 28,
            small_count: 100,
            large_count: 3,
            small_big_threshold: 1_000_000,
        }
    }
}

impl SweepConfig {
    /// Largest permitted exponent. Keeps sizes well inside `u64` and the
    /// read benchmark's populate buffer inside plausible memory.
    pub const MAX_EXP_LIMIT: u32 = 40;

    /// Largest permitted repetition count. Together with
    /// [`Self::MAX_EXP_LIMIT`] this keeps `size * count` inside `u64`.
    pub const MAX_COUNT_LIMIT: u32 = 1_000_000;

    /// Create a configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the exponent range of the sweep
    pub fn with_exponents(mut self, min_exp: u32, max_exp: u32) -> Self {
        self.min_exp = min_exp;
        self.max_exp = max_exp;
        self
    }

    /// Set the repetition counts for the two size classes
    pub fn with_counts(mut self, small_count: u32, large_count: u32) -> Self {
        self.small_count = small_count;
        self.large_count = large_count;
        self
    }

    /// Set the size-class threshold in bytes
    pub fn with_threshold(mut self, bytes: u64) -> Self {
        self.small_big_threshold = bytes;
        self
    }

    /// Validate the sweep parameters
    pub fn validate(&self) -> Result<()> {
        if self.min_exp >= self.max_exp {
            return Err(SweepError::Config(format!(
                "min_exp ({}) must be less than max_exp ({})",
                self.min_exp, self.max_exp
            )));
        }

        if self.max_exp > Self::MAX_EXP_LIMIT {
            return Err(SweepError::Config(format!(
                "max_exp too large: {} (limit: {})",
                self.max_exp,
                Self::MAX_EXP_LIMIT
            )));
        }

        if self.small_count == 0 || self.large_count == 0 {
            return Err(SweepError::Config(
                "repetition counts must be greater than 0".to_string(),
            ));
        }

        if self.small_count > Self::MAX_COUNT_LIMIT || self.large_count > Self::MAX_COUNT_LIMIT {
            return Err(SweepError::Config(format!(
                "repetition counts must not exceed {}",
                Self::MAX_COUNT_LIMIT
            )));
        }

        // A threshold outside the tested range would collapse the sweep
        // into a single size class.
        if self.small_big_threshold <= self.min_size()
            || self.small_big_threshold >= self.max_size()
        {
            return Err(SweepError::Config(format!(
                "small_big_threshold ({}) must lie strictly between the smallest ({}) and largest ({}) tested sizes",
                self.small_big_threshold,
                self.min_size(),
                self.max_size()
            )));
        }

        Ok(())
    }

    /// Smallest transfer size in bytes
    pub fn min_size(&self) -> u64 {
        1u64 << self.min_exp
    }

    /// Largest transfer size in bytes
    pub fn max_size(&self) -> u64 {
        1u64 << self.max_exp
    }

    /// Transfer sizes of the sweep, smallest first
    pub fn sizes(&self) -> impl Iterator<Item = u64> {
        (self.min_exp..=self.max_exp).map(|e| 1u64 << e)
    }

    /// Repetition count for one transfer size
    pub fn reps_for(&self, size: u64) -> u32 {
        if size > self.small_big_threshold {
            self.large_count
        } else {
            self.small_count
        }
    }

    /// Load configuration from the standard config file location.
    /// Returns the defaults if the file doesn't exist.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_file_path()?;

        if !config_path.exists() {
            return Ok(Self::default());
        }

        Self::load_from(&config_path)
    }

    /// Load and validate configuration from a specific TOML file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            SweepError::Config(format!("failed to read config file {}: {}", path.display(), e))
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| {
            SweepError::Config(format!("failed to parse config file {}: {}", path.display(), e))
        })?;

        config.validate()?;

        Ok(config)
    }

    /// Standard configuration file path under the platform config directory
    pub fn config_file_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().ok_or_else(|| {
            SweepError::Config("unable to determine config directory".to_string())
        })?;

        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }
}
