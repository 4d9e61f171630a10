//! Configuration module
//!
//! Env-driven configuration for the upload transport and the Acadex REST
//! API, plus the admission-policy constants the upload queue enforces.

use std::env;

use crate::error::AppError;

/// Maximum number of entries the queue may hold.
pub const MAX_FILE_COUNT: usize = 40;
/// Maximum size of a single file, in megabytes.
pub const MAX_FILE_SIZE_MB: u64 = 50;
/// Maximum cumulative size of the whole queue, in megabytes.
pub const TOTAL_SIZE_LIMIT_MB: u64 = 800;

const DEFAULT_CLOUD_NAME: &str = "dfoqasqnw";
const DEFAULT_UPLOAD_PRESET: &str = "my_unsigned_preset";
const DEFAULT_FOLDER: &str = "acadex-notes";
const DEFAULT_API_URL: &str = "http://localhost:5000";

/// Cloudinary unsigned-upload configuration.
#[derive(Clone, Debug)]
pub struct UploadConfig {
    pub cloud_name: String,
    pub upload_preset: String,
    pub folder: String,
    /// Full endpoint URL. Derived from the cloud name unless
    /// CLOUDINARY_UPLOAD_URL overrides it (tests point this at a local stub).
    pub upload_url: String,
}

impl UploadConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let cloud_name = env::var("CLOUDINARY_CLOUD_NAME")
            .unwrap_or_else(|_| DEFAULT_CLOUD_NAME.to_string());
        if cloud_name.trim().is_empty() {
            return Err(AppError::Config(
                "CLOUDINARY_CLOUD_NAME must not be empty".to_string(),
            ));
        }

        let upload_url = env::var("CLOUDINARY_UPLOAD_URL").unwrap_or_else(|_| {
            format!("https://api.cloudinary.com/v1_1/{}/auto/upload", cloud_name)
        });

        Ok(Self {
            cloud_name,
            upload_preset: env::var("CLOUDINARY_UPLOAD_PRESET")
                .unwrap_or_else(|_| DEFAULT_UPLOAD_PRESET.to_string()),
            folder: env::var("CLOUDINARY_FOLDER").unwrap_or_else(|_| DEFAULT_FOLDER.to_string()),
            upload_url,
        })
    }
}

/// Acadex REST API configuration (notes, courses).
#[derive(Clone, Debug)]
pub struct ApiConfig {
    pub base_url: String,
}

impl ApiConfig {
    pub fn from_env() -> Self {
        let base_url = env::var("ACADEX_API_URL")
            .or_else(|_| env::var("API_URL"))
            .unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admission_constants_match_policy() {
        assert_eq!(MAX_FILE_COUNT, 40);
        assert_eq!(MAX_FILE_SIZE_MB, 50);
        assert_eq!(TOTAL_SIZE_LIMIT_MB, 800);
    }
}
