//! Upload transport abstraction.
//!
//! The queue never talks HTTP directly; it hands the file plus the fixed
//! upload metadata to an injected [`UploadTransport`]. Tests substitute a
//! scripted mock; production uses [`crate::cloudinary::CloudinaryTransport`].

use std::sync::Arc;

use acadex_core::models::UploadedAsset;
use async_trait::async_trait;
use thiserror::Error;

use crate::entry::FilePayload;

/// Fallback message when the endpoint gives no usable diagnostic.
pub const GENERIC_UPLOAD_ERROR: &str = "Upload failed. Please try again.";

/// Byte-level progress callback: `(bytes_sent, bytes_total)`.
///
/// Only invoked when the total size is known. Shared (`Arc`) because the
/// transport moves it into the request body stream.
pub type ProgressCallback = Arc<dyn Fn(u64, u64) + Send + Sync>;

/// Transfer failures. All variants resolve to a user-facing message via
/// `Display`; nothing propagates past the queue boundary as an exception.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network-level failure (connect, DNS, broken transfer).
    #[error("{0}")]
    Network(String),

    /// Non-2xx response; the message is the most specific diagnostic the
    /// response body offered, or the generic fallback.
    #[error("{0}")]
    Endpoint(String),

    /// 2xx response whose body did not match the expected shape.
    #[error("Unexpected response from upload endpoint: {0}")]
    MalformedResponse(String),

    /// The request could not be constructed (e.g. invalid content type).
    #[error("Invalid upload request: {0}")]
    Request(String),
}

/// One file transfer: the payload plus the fixed upload-configuration
/// metadata echoed to the endpoint.
#[derive(Clone, Debug)]
pub struct UploadRequest<'a> {
    pub file: &'a FilePayload,
    pub upload_preset: &'a str,
    pub cloud_name: &'a str,
    pub folder: &'a str,
}

/// Uploads one file, reporting byte progress, and returns the stored-asset
/// descriptor. The returned asset carries no relative path; the queue
/// attaches the entry's own.
#[async_trait]
pub trait UploadTransport: Send + Sync {
    async fn upload(
        &self,
        request: UploadRequest<'_>,
        progress: ProgressCallback,
    ) -> Result<UploadedAsset, TransportError>;
}
