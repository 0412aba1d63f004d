use std::alloc::{alloc_zeroed, dealloc, Layout};
use std::ops::{Deref, DerefMut};
use std::ptr::NonNull;

use rand::rngs::SmallRng;
use rand::{RngCore, SeedableRng};

use crate::{Result, SweepError};

/// Seed for the deterministic buffer fill. Fixed so repeated runs write
/// byte-identical, incompressible data.
pub const DATA_SEED: u64 = 0x9E37_79B9_7F4A_7C15;

/// Heap buffer with a caller-chosen alignment, as direct I/O requires.
///
/// Allocated zero-filled, dereferences to a byte slice, and frees itself
/// on drop. One buffer is reused across every repetition of a sweep.
#[derive(Debug)]
pub struct AlignedBuf {
    ptr: NonNull<u8>,
    layout: Layout,
}

impl AlignedBuf {
    /// Allocate a zero-filled buffer of `len` bytes aligned to `align`.
    pub fn zeroed(len: usize, align: usize) -> Result<Self> {
        if len == 0 {
            return Err(SweepError::Alloc(
                "buffer length must be greater than 0".to_string(),
            ));
        }

        let layout = Layout::from_size_align(len, align).map_err(|e| {
            SweepError::Alloc(format!(
                "invalid layout for {} bytes aligned to {}: {}",
                len, align, e
            ))
        })?;

        // SAFETY: the layout has non-zero size.
        let raw = unsafe { alloc_zeroed(layout) };
        let ptr = NonNull::new(raw).ok_or_else(|| {
            SweepError::Alloc(format!(
                "failed to allocate {} bytes aligned to {}",
                len, align
            ))
        })?;

        Ok(Self { ptr, layout })
    }

    /// Buffer length in bytes
    pub fn len(&self) -> usize {
        self.layout.size()
    }

    /// Whether the buffer is empty (never true for a constructed buffer)
    pub fn is_empty(&self) -> bool {
        self.layout.size() == 0
    }

    /// Overwrite the whole buffer with seeded pseudo-random bytes
    pub fn fill_random(&mut self, seed: u64) {
        let mut rng = SmallRng::seed_from_u64(seed);
        rng.fill_bytes(self);
    }
}

impl Deref for AlignedBuf {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        // SAFETY: ptr is valid for layout.size() bytes while self lives.
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.layout.size()) }
    }
}

impl DerefMut for AlignedBuf {
    fn deref_mut(&mut self) -> &mut [u8] {
        // SAFETY: ptr is valid for layout.size() bytes and exclusively
        // borrowed through self.
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.layout.size()) }
    }
}

impl Drop for AlignedBuf {
    fn drop(&mut self) {
        // SAFETY: allocated in `zeroed` with this exact layout.
        unsafe { dealloc(self.ptr.as_ptr(), self.layout) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::DIRECT_IO_ALIGN;

    #[test]
    fn test_zeroed_alignment_and_contents() {
        let buf = AlignedBuf::zeroed(4096, DIRECT_IO_ALIGN as usize).unwrap();
        assert_eq!(buf.len(), 4096);
        assert_eq!(buf.as_ptr() as usize % DIRECT_IO_ALIGN as usize, 0);
        assert!(buf.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_zero_length_rejected() {
        let err = AlignedBuf::zeroed(0, 512).unwrap_err();
        assert!(err.to_string().contains("length"));
    }

    #[test]
    fn test_non_power_of_two_alignment_rejected() {
        assert!(AlignedBuf::zeroed(4096, 513).is_err());
    }

    #[test]
    fn test_fill_random_is_deterministic() {
        let mut a = AlignedBuf::zeroed(2048, 512).unwrap();
        let mut b = AlignedBuf::zeroed(2048, 512).unwrap();
        a.fill_random(DATA_SEED);
        b.fill_random(DATA_SEED);
        assert_eq!(&a[..], &b[..]);
        assert!(a.iter().any(|&byte| byte != 0));

        let mut c = AlignedBuf::zeroed(2048, 512).unwrap();
        c.fill_random(DATA_SEED + 1);
        assert_ne!(&a[..], &c[..]);
    }

    #[test]
    fn test_deref_mut_writes_are_visible() {
        let mut buf = AlignedBuf::zeroed(512, 512).unwrap();
        buf[0] = 0xAB;
        buf[511] = 0xCD;
        assert_eq!(buf[0], 0xAB);
        assert_eq!(buf[511], 0xCD);
    }
}
