//! Upload entries and their lifecycle states.

use acadex_core::models::UploadedAsset;
use bytes::Bytes;

/// Where an entry's bytes live until the transfer streams them out.
///
/// Selected files are not slurped into memory at admission time; disk-backed
/// candidates keep only their path and are read when their transfer starts.
#[derive(Clone, Debug)]
pub enum FileSource {
    Memory(Bytes),
    Path(std::path::PathBuf),
}

/// File payload plus the metadata the admission policy and the upload
/// endpoint need. Owned exclusively by the entry that carries it and never
/// mutated after construction.
#[derive(Clone, Debug)]
pub struct FilePayload {
    pub name: String,
    pub source: FileSource,
    size: u64,
    pub content_type: String,
    /// Last-modified time in milliseconds since the Unix epoch.
    pub last_modified: i64,
}

impl FilePayload {
    pub fn from_bytes(
        name: impl Into<String>,
        data: impl Into<Bytes>,
        content_type: impl Into<String>,
        last_modified: i64,
    ) -> Self {
        let data = data.into();
        let size = data.len() as u64;
        Self {
            name: name.into(),
            source: FileSource::Memory(data),
            size,
            content_type: content_type.into(),
            last_modified,
        }
    }

    /// Disk-backed payload. `size` and `last_modified` come from file
    /// metadata; the content is read lazily when the transfer starts.
    pub fn from_path(
        name: impl Into<String>,
        path: impl Into<std::path::PathBuf>,
        size: u64,
        content_type: impl Into<String>,
        last_modified: i64,
    ) -> Self {
        Self {
            name: name.into(),
            source: FileSource::Path(path.into()),
            size,
            content_type: content_type.into(),
            last_modified,
        }
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// Duplicate-detection signature: (name, size, last-modified).
    pub fn signature(&self) -> FileSignature {
        FileSignature {
            name: self.name.clone(),
            size: self.size(),
            last_modified: self.last_modified,
        }
    }
}

/// Identity of a file for duplicate detection at admission time.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FileSignature {
    pub name: String,
    pub size: u64,
    pub last_modified: i64,
}

/// A file selected for admission into the queue.
#[derive(Clone, Debug)]
pub struct FileCandidate {
    pub payload: FilePayload,
    /// Path fragment relative to the picked directory, when the candidate
    /// came from a folder selection.
    pub relative_path: Option<String>,
}

impl FileCandidate {
    pub fn file(payload: FilePayload) -> Self {
        Self {
            payload,
            relative_path: None,
        }
    }

    pub fn from_folder(payload: FilePayload, relative_path: impl Into<String>) -> Self {
        Self {
            payload,
            relative_path: Some(relative_path.into()),
        }
    }
}

/// Lifecycle state of an entry.
///
/// Progress only exists while uploading and a result only exists on success,
/// so stale combinations (progress on a settled entry, result without
/// success) cannot be represented.
#[derive(Clone, Debug, PartialEq)]
pub enum EntryStatus {
    Pending,
    Uploading { progress: u8 },
    Success(UploadedAsset),
    Error(String),
}

impl EntryStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, EntryStatus::Success(_))
    }

    pub fn is_uploading(&self) -> bool {
        matches!(self, EntryStatus::Uploading { .. })
    }

    /// Percent complete as shown in the queue view: 0 while pending or
    /// failed, live progress while uploading, frozen at 100 on success.
    pub fn progress(&self) -> u8 {
        match self {
            EntryStatus::Pending | EntryStatus::Error(_) => 0,
            EntryStatus::Uploading { progress } => *progress,
            EntryStatus::Success(_) => 100,
        }
    }

    pub fn result(&self) -> Option<&UploadedAsset> {
        match self {
            EntryStatus::Success(asset) => Some(asset),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            EntryStatus::Error(message) => Some(message),
            _ => None,
        }
    }
}

/// One file candidate tracked through the upload lifecycle.
#[derive(Clone, Debug)]
pub struct UploadEntry {
    /// Opaque identifier, stable for the lifetime of the entry.
    pub id: String,
    pub file: FilePayload,
    pub relative_path: Option<String>,
    pub status: EntryStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(name: &str, len: usize, last_modified: i64) -> FilePayload {
        FilePayload::from_bytes(name, vec![0u8; len], "application/pdf", last_modified)
    }

    #[test]
    fn signature_matches_on_name_size_mtime() {
        assert_eq!(
            payload("a.pdf", 10, 7).signature(),
            payload("a.pdf", 10, 7).signature()
        );
        assert_ne!(
            payload("a.pdf", 10, 7).signature(),
            payload("a.pdf", 10, 8).signature()
        );
        assert_ne!(
            payload("a.pdf", 10, 7).signature(),
            payload("a.pdf", 11, 7).signature()
        );
    }

    #[test]
    fn progress_is_zero_unless_uploading_or_done() {
        assert_eq!(EntryStatus::Pending.progress(), 0);
        assert_eq!(EntryStatus::Error("boom".to_string()).progress(), 0);
        assert_eq!(EntryStatus::Uploading { progress: 42 }.progress(), 42);
    }
}
