//! Utility functions and helpers
//!
//! Stage timing plus the size formatting shared by validation messages and
//! previews.

pub mod timer;

pub use timer::{time_stage, Timer};

const BYTES_PER_KB: f64 = 1024.0;
const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Size in MB with two decimals, e.g. `10.50`
pub fn format_megabytes(bytes: u64) -> String {
    format!("{:.2}", bytes as f64 / BYTES_PER_MB)
}

/// Size limit in MB, without decimals when the limit is a whole number of MB
pub fn format_limit_megabytes(bytes: u64) -> String {
    if bytes % (1024 * 1024) == 0 {
        format!("{}", bytes / (1024 * 1024))
    } else {
        format_megabytes(bytes)
    }
}

/// Size in KB with two decimals and unit, e.g. `1.25 KB`
pub fn format_kilobytes(bytes: u64) -> String {
    format!("{:.2} KB", bytes as f64 / BYTES_PER_KB)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_megabytes() {
        assert_eq!(format_megabytes(0), "0.00");
        assert_eq!(format_megabytes(11 * 1024 * 1024), "11.00");
        assert_eq!(format_megabytes(10 * 1024 * 1024 + 1), "10.00");
        assert_eq!(format_megabytes(1536 * 1024), "1.50");
    }

    #[test]
    fn test_format_limit_megabytes() {
        assert_eq!(format_limit_megabytes(10 * 1024 * 1024), "10");
        assert_eq!(format_limit_megabytes(1536 * 1024), "1.50");
    }

    #[test]
    fn test_format_kilobytes() {
        assert_eq!(format_kilobytes(1280), "1.25 KB");
        assert_eq!(format_kilobytes(0), "0.00 KB");
    }
}
