//! Entry id generation.
//!
//! Ids compose the file signature with a random component so identical
//! re-additions of the same file still get distinct ids. The generator is an
//! injected trait so tests can substitute a deterministic one.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::entry::FilePayload;

pub trait EntryIdGenerator: Send + Sync {
    fn entry_id(&self, file: &FilePayload) -> String;
}

/// Default generator: `{name}-{size}-{lastModified}-{uuid-v4}`.
#[derive(Clone, Copy, Debug, Default)]
pub struct UuidEntryIds;

impl EntryIdGenerator for UuidEntryIds {
    fn entry_id(&self, file: &FilePayload) -> String {
        format!(
            "{}-{}-{}-{}",
            file.name,
            file.size(),
            file.last_modified,
            uuid::Uuid::new_v4()
        )
    }
}

/// Deterministic generator for tests: the random component is a counter.
#[derive(Debug, Default)]
pub struct SequentialEntryIds {
    next: AtomicU64,
}

impl EntryIdGenerator for SequentialEntryIds {
    fn entry_id(&self, file: &FilePayload) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        format!("{}-{}-{}-{}", file.name, file.size(), file.last_modified, n)
    }
}
