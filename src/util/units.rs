//! Numeric formatting helpers for the report tables.
//!
//! The tables group the size column with thousands separators and quote
//! the size-class threshold in megabytes. Grouping is done by hand so the
//! output does not depend on the process locale.

/// Format an integer with comma thousands separators.
///
/// # Examples
/// ```
/// use iosweep::util::units::group_thousands;
///
/// assert_eq!(group_thousands(512), "512");
/// assert_eq!(group_thousands(1048576), "1,048,576");
/// ```
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Convert a byte count to decimal megabytes.
///
/// # Examples
/// ```
/// use iosweep::util::units::mb;
///
/// assert_eq!(mb(1_000_000), 1.0);
/// assert_eq!(mb(500_000), 0.5);
/// ```
pub fn mb(bytes: u64) -> f64 {
    bytes as f64 / 1e6
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(7), "7");
        assert_eq!(group_thousands(512), "512");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(1048576), "1,048,576");
        assert_eq!(group_thousands(268435456), "268,435,456");
        assert_eq!(group_thousands(u64::MAX), "18,446,744,073,709,551,615");
    }

    #[test]
    fn test_mb() {
        assert_eq!(mb(0), 0.0);
        assert_eq!(mb(1_000_000), 1.0);
        assert!((mb(1 << 20) - 1.048576).abs() < 1e-12);
    }
}
