//! Acadex Core Library
//!
//! This crate provides the domain models, error types, and configuration
//! shared across all Acadex components.

pub mod config;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use config::{ApiConfig, UploadConfig, MAX_FILE_COUNT, MAX_FILE_SIZE_MB, TOTAL_SIZE_LIMIT_MB};
pub use error::AppError;

/// Format a byte count for display ("12.34 MB", "512.0 KB").
///
/// Zero-byte and unknown sizes render as "Unknown size", matching what the
/// queue summary shows for files whose size could not be determined.
pub fn format_bytes(bytes: u64) -> String {
    if bytes == 0 {
        return "Unknown size".to_string();
    }
    let mb = bytes as f64 / (1024.0 * 1024.0);
    if mb >= 1.0 {
        format!("{:.2} MB", mb)
    } else {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_bytes_megabytes() {
        assert_eq!(format_bytes(10 * 1024 * 1024), "10.00 MB");
        assert_eq!(format_bytes(1024 * 1024), "1.00 MB");
    }

    #[test]
    fn format_bytes_kilobytes() {
        assert_eq!(format_bytes(512), "0.5 KB");
        assert_eq!(format_bytes(100 * 1024), "100.0 KB");
    }

    #[test]
    fn format_bytes_zero_is_unknown() {
        assert_eq!(format_bytes(0), "Unknown size");
    }
}
