use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use crate::{Result, SweepError};

/// How a benchmark routine will use its scratch file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    /// Positioned writes only
    WriteOnly,
    /// Positioned reads and writes
    ReadWrite,
}

/// Open capabilities for a scratch file, composed explicitly at the call
/// site instead of a raw platform bitmask.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OpenFlags {
    /// Create the file if it does not exist
    pub create: bool,
    /// Bypass the OS page cache
    pub direct: bool,
    /// Make each write durable before it returns
    pub sync: bool,
}

impl OpenFlags {
    /// No capabilities: open an existing file through the page cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the file if missing
    pub fn with_create(mut self) -> Self {
        self.create = true;
        self
    }

    /// Request direct I/O (`O_DIRECT` / `FILE_FLAG_NO_BUFFERING`)
    pub fn with_direct(mut self) -> Self {
        self.direct = true;
        self
    }

    /// Request synchronous writes (`O_SYNC` / `FILE_FLAG_WRITE_THROUGH`)
    pub fn with_sync(mut self) -> Self {
        self.sync = true;
        self
    }
}

/// A benchmark scratch file: opened with explicit capabilities, accessed
/// through positioned reads and writes, deleted with [`ScratchFile::remove`].
#[derive(Debug)]
pub struct ScratchFile {
    file: File,
    path: PathBuf,
}

impl ScratchFile {
    /// Open `path` with the given access mode and capabilities.
    pub fn open(path: &Path, mode: AccessMode, flags: OpenFlags) -> Result<Self> {
        let file = platform::open(path, mode, flags)?;
        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    /// Path the file was opened at
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// One positioned write. Returns the byte count the kernel accepted;
    /// callers treat a short count as fatal.
    #[cfg(unix)]
    pub fn write_at(&self, buf: &[u8], offset: u64) -> Result<usize> {
        use std::os::unix::fs::FileExt;
        self.file
            .write_at(buf, offset)
            .map_err(|e| SweepError::io("write", e))
    }

    #[cfg(windows)]
    pub fn write_at(&self, buf: &[u8], offset: u64) -> Result<usize> {
        use std::os::windows::fs::FileExt;
        self.file
            .seek_write(buf, offset)
            .map_err(|e| SweepError::io("write", e))
    }

    /// One positioned read. Returns the byte count the kernel produced;
    /// callers treat a short count as fatal.
    #[cfg(unix)]
    pub fn read_at(&self, buf: &mut [u8], offset: u64) -> Result<usize> {
        use std::os::unix::fs::FileExt;
        self.file
            .read_at(buf, offset)
            .map_err(|e| SweepError::io("read", e))
    }

    #[cfg(windows)]
    pub fn read_at(&self, buf: &mut [u8], offset: u64) -> Result<usize> {
        use std::os::windows::fs::FileExt;
        self.file
            .seek_read(buf, offset)
            .map_err(|e| SweepError::io("read", e))
    }

    /// Block until previously written data reaches stable storage.
    pub fn flush_to_storage(&self) -> Result<()> {
        self.file.sync_all().map_err(|e| SweepError::io("fsync", e))
    }

    /// Close the handle and delete the file.
    pub fn remove(self) -> Result<()> {
        let ScratchFile { file, path } = self;
        drop(file);
        fs::remove_file(&path).map_err(|e| SweepError::io("remove", e))
    }
}

#[cfg(unix)]
mod platform {
    use super::*;
    use std::os::unix::fs::OpenOptionsExt;

    pub(super) fn open(path: &Path, mode: AccessMode, flags: OpenFlags) -> Result<File> {
        let mut options = OpenOptions::new();
        match mode {
            AccessMode::WriteOnly => {
                options.write(true);
            }
            AccessMode::ReadWrite => {
                options.read(true).write(true);
            }
        }
        if flags.create {
            options.create(true);
        }

        let mut custom = 0;
        if flags.direct {
            custom |= direct_flag()?;
        }
        if flags.sync {
            custom |= libc::O_SYNC;
        }
        if custom != 0 {
            options.custom_flags(custom);
        }

        options.open(path).map_err(|e| SweepError::io("open", e))
    }

    #[cfg(target_os = "linux")]
    fn direct_flag() -> Result<i32> {
        Ok(libc::O_DIRECT)
    }

    // Silently measuring through the page cache would change what the
    // numbers mean, so a missing O_DIRECT is an error, not a fallback.
    #[cfg(not(target_os = "linux"))]
    fn direct_flag() -> Result<i32> {
        Err(SweepError::Config(
            "direct I/O is not supported on this platform".to_string(),
        ))
    }
}

#[cfg(windows)]
mod platform {
    use super::*;
    use std::os::windows::fs::OpenOptionsExt;

    const FILE_FLAG_WRITE_THROUGH: u32 = 0x8000_0000;
    const FILE_FLAG_NO_BUFFERING: u32 = 0x2000_0000;

    pub(super) fn open(path: &Path, mode: AccessMode, flags: OpenFlags) -> Result<File> {
        let mut options = OpenOptions::new();
        match mode {
            AccessMode::WriteOnly => {
                options.write(true);
            }
            AccessMode::ReadWrite => {
                options.read(true).write(true);
            }
        }
        if flags.create {
            options.create(true);
        }

        let mut custom = 0u32;
        if flags.direct {
            custom |= FILE_FLAG_NO_BUFFERING;
        }
        if flags.sync {
            custom |= FILE_FLAG_WRITE_THROUGH;
        }
        if custom != 0 {
            options.custom_flags(custom);
        }

        options.open(path).map_err(|e| SweepError::io("open", e))
    }
}
