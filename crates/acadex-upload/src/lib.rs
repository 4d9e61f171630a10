//! Acadex Upload Library
//!
//! Client-side upload queue for attaching study materials to notes. The
//! [`queue::UploadQueue`] owns an ordered list of file candidates, enforces
//! admission policy (duplicates, count and size ceilings), drives per-entry
//! uploads against a remote endpoint through the injected
//! [`transport::UploadTransport`], and publishes read-only snapshots plus the
//! successful-assets list to consumers.

pub mod cloudinary;
pub mod entry;
pub mod id;
pub mod queue;
pub mod transport;

// Re-export commonly used types
pub use cloudinary::CloudinaryTransport;
pub use entry::{EntryStatus, FileCandidate, FilePayload, FileSignature, FileSource, UploadEntry};
pub use id::{EntryIdGenerator, SequentialEntryIds, UuidEntryIds};
pub use queue::{EntrySnapshot, QueueSnapshot, QueueStats, UploadQueue};
pub use transport::{ProgressCallback, TransportError, UploadRequest, UploadTransport};
