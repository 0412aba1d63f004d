//! Cycle counter access and cycle-to-seconds conversion.
//!
//! Timed loops bracket each I/O call with [`read`] and accumulate raw
//! counter deltas; [`to_seconds`] converts them using a cycles-per-second
//! rate calibrated once per process against the monotonic clock.

use std::sync::OnceLock;
use std::time::{Duration, Instant};

/// Wall-clock window used to calibrate the counter rate.
const CALIBRATION_WINDOW: Duration = Duration::from_millis(20);

static CYCLES_PER_SEC: OnceLock<f64> = OnceLock::new();

/// Read the current cycle counter value.
///
/// Monotonic on a fixed core and cheap enough to bracket individual I/O
/// calls. Uses `rdtsc` on x86_64 and the `cntvct_el0` virtual counter on
/// aarch64; other targets fall back to the monotonic clock in nanoseconds.
#[cfg(target_arch = "x86_64")]
#[inline]
pub fn read() -> u64 {
    // SAFETY: RDTSC is unprivileged and always available on x86_64.
    unsafe { core::arch::x86_64::_rdtsc() }
}

#[cfg(target_arch = "aarch64")]
#[inline]
pub fn read() -> u64 {
    let value: u64;
    // SAFETY: CNTVCT_EL0 is readable from EL0 and has no side effects.
    unsafe {
        core::arch::asm!(
            "mrs {}, cntvct_el0",
            out(reg) value,
            options(nomem, nostack, preserves_flags),
        );
    }
    value
}

#[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
#[inline]
pub fn read() -> u64 {
    static EPOCH: OnceLock<Instant> = OnceLock::new();
    EPOCH.get_or_init(Instant::now).elapsed().as_nanos() as u64
}

/// Counter increments per second, calibrated on first use.
///
/// The first call busy-waits for [`CALIBRATION_WINDOW`] of wall-clock time
/// while sampling the counter at both ends. The result is cached in a
/// `OnceLock`: under concurrent first use exactly one calibration runs and
/// every caller observes the same value; later calls are plain reads.
/// Call this once before entering a timed loop so calibration never lands
/// inside a measurement window.
pub fn per_second() -> f64 {
    *CYCLES_PER_SEC.get_or_init(calibrate)
}

/// Convert a counter delta to seconds.
#[inline]
pub fn to_seconds(delta: u64) -> f64 {
    delta as f64 / per_second()
}

fn calibrate() -> f64 {
    let wall = Instant::now();
    let start = read();
    while wall.elapsed() < CALIBRATION_WINDOW {
        std::hint::spin_loop();
    }
    let ticks = read().saturating_sub(start);
    let secs = wall.elapsed().as_secs_f64();
    // A counter stuck at zero would poison every conversion downstream.
    (ticks as f64 / secs).max(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_is_positive_and_stable() {
        let first = per_second();
        assert!(first.is_finite());
        assert!(first >= 1.0);
        assert_eq!(per_second(), first);
    }

    #[test]
    fn test_back_to_back_reads_convert_to_near_zero() {
        per_second();
        let a = read();
        let b = read();
        let secs = to_seconds(b.saturating_sub(a));
        assert!(secs >= 0.0);
        assert!(secs < 1.0, "adjacent reads spanned {} s", secs);
    }

    #[test]
    fn test_to_seconds_zero_delta() {
        assert_eq!(to_seconds(0), 0.0);
    }

    #[test]
    fn test_busy_wait_interval_roughly_matches_wall_clock() {
        per_second();
        let wall = Instant::now();
        let start = read();
        while wall.elapsed() < Duration::from_millis(10) {
            std::hint::spin_loop();
        }
        let secs = to_seconds(read().saturating_sub(start));
        // Loose bounds: scheduling noise is fine, order-of-magnitude is not.
        assert!(secs > 0.001, "10ms busy wait measured as {} s", secs);
        assert!(secs < 1.0, "10ms busy wait measured as {} s", secs);
    }
}
