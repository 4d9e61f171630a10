//! Cloudinary unsigned-upload transport.
//!
//! POSTs a multipart form (`file`, `upload_preset`, `cloud_name`, `folder`)
//! to the configured endpoint. The file part is streamed in chunks so byte
//! progress can be reported as the body is pulled onto the wire.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use acadex_core::config::UploadConfig;
use acadex_core::models::UploadedAsset;
use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client};
use serde::Deserialize;
use tokio_util::io::ReaderStream;

use crate::entry::FileSource;
use crate::transport::{
    ProgressCallback, TransportError, UploadRequest, UploadTransport, GENERIC_UPLOAD_ERROR,
};

const PROGRESS_CHUNK_BYTES: usize = 64 * 1024;

/// Production transport against the Cloudinary upload API.
#[derive(Clone, Debug)]
pub struct CloudinaryTransport {
    client: Client,
    upload_url: String,
}

impl CloudinaryTransport {
    /// No request timeout is set here; per-transfer patience is left to the
    /// underlying connection, and retries are always user-initiated.
    pub fn new(config: &UploadConfig) -> Self {
        Self {
            client: Client::new(),
            upload_url: config.upload_url.clone(),
        }
    }
}

/// Success body of the upload endpoint. Everything except `folder` is
/// required; a 2xx body missing these fields is treated as malformed.
#[derive(Debug, Deserialize)]
struct UploadResponseBody {
    secure_url: String,
    original_filename: String,
    public_id: String,
    resource_type: String,
    format: String,
    bytes: u64,
    folder: Option<String>,
}

#[async_trait]
impl UploadTransport for CloudinaryTransport {
    async fn upload(
        &self,
        request: UploadRequest<'_>,
        progress: ProgressCallback,
    ) -> Result<UploadedAsset, TransportError> {
        let file = request.file;
        let total = file.size();

        // The body is a lazily-polled chunk stream; each chunk reports
        // cumulative bytes handed to the HTTP stack.
        let sent = Arc::new(AtomicU64::new(0));
        let body = match &file.source {
            FileSource::Memory(data) => {
                let data = data.clone();
                let chunks: Vec<Bytes> = (0..data.len())
                    .step_by(PROGRESS_CHUNK_BYTES)
                    .map(|start| data.slice(start..(start + PROGRESS_CHUNK_BYTES).min(data.len())))
                    .collect();
                Body::wrap_stream(futures::stream::iter(chunks.into_iter().map(move |chunk| {
                    let so_far =
                        sent.fetch_add(chunk.len() as u64, Ordering::Relaxed) + chunk.len() as u64;
                    if total > 0 {
                        (*progress)(so_far, total);
                    }
                    Ok::<Bytes, std::io::Error>(chunk)
                })))
            }
            FileSource::Path(path) => {
                let handle = tokio::fs::File::open(path).await.map_err(|e| {
                    TransportError::Network(format!("failed to open {}: {}", path.display(), e))
                })?;
                let reader = ReaderStream::with_capacity(handle, PROGRESS_CHUNK_BYTES);
                Body::wrap_stream(reader.map(move |item| {
                    item.map(|chunk| {
                        let so_far = sent.fetch_add(chunk.len() as u64, Ordering::Relaxed)
                            + chunk.len() as u64;
                        if total > 0 {
                            (*progress)(so_far, total);
                        }
                        chunk
                    })
                }))
            }
        };

        let part = Part::stream_with_length(body, total)
            .file_name(file.name.clone())
            .mime_str(&file.content_type)
            .map_err(|e| {
                TransportError::Request(format!(
                    "invalid content type '{}': {}",
                    file.content_type, e
                ))
            })?;

        let form = Form::new()
            .part("file", part)
            .text("upload_preset", request.upload_preset.to_string())
            .text("cloud_name", request.cloud_name.to_string())
            .text("folder", request.folder.to_string());

        let response = self
            .client
            .post(&self.upload_url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(
                status = %status,
                filename = %file.name,
                "Upload endpoint rejected file"
            );
            return Err(TransportError::Endpoint(extract_error_detail(&body)));
        }

        let body: UploadResponseBody = response
            .json()
            .await
            .map_err(|e| TransportError::MalformedResponse(e.to_string()))?;

        Ok(UploadedAsset {
            secure_url: body.secure_url,
            public_id: body.public_id,
            original_filename: body.original_filename,
            resource_type: body.resource_type,
            format: body.format,
            bytes: body.bytes,
            // The endpoint may omit the folder; fall back to the one we asked for.
            folder: body
                .folder
                .or_else(|| Some(request.folder.to_string()).filter(|f| !f.is_empty())),
            relative_path: None,
        })
    }
}

/// Pull the most specific diagnostic out of a failure body: `error.message`,
/// then a bare `error` string, then the generic fallback.
fn extract_error_detail(body: &str) -> String {
    let parsed: serde_json::Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(_) => return GENERIC_UPLOAD_ERROR.to_string(),
    };
    if let Some(message) = parsed
        .get("error")
        .and_then(|e| e.get("message"))
        .and_then(|m| m.as_str())
    {
        return message.to_string();
    }
    if let Some(message) = parsed.get("error").and_then(|e| e.as_str()) {
        return message.to_string();
    }
    GENERIC_UPLOAD_ERROR.to_string()
}
