//! The upload queue manager.
//!
//! Owns the ordered entry list, enforces admission policy, drives per-entry
//! transfers sequentially, and publishes read-only snapshots plus the
//! successful-assets list on every mutation.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use acadex_core::config::{UploadConfig, MAX_FILE_COUNT, MAX_FILE_SIZE_MB, TOTAL_SIZE_LIMIT_MB};
use acadex_core::models::{Notice, UploadedAsset};
use tokio::sync::watch;

use crate::entry::{EntryStatus, FileCandidate, UploadEntry};
use crate::id::{EntryIdGenerator, UuidEntryIds};
use crate::transport::{ProgressCallback, UploadRequest, UploadTransport};

/// Read-only view of one queued entry. The raw payload stays behind in the
/// queue; consumers only need metadata and status.
#[derive(Clone, Debug)]
pub struct EntrySnapshot {
    pub id: String,
    pub name: String,
    pub relative_path: Option<String>,
    pub size_bytes: u64,
    pub status: EntryStatus,
}

impl EntrySnapshot {
    /// Name shown in queue listings: the relative path when the file came
    /// from a folder pick, the bare filename otherwise.
    pub fn display_name(&self) -> &str {
        self.relative_path.as_deref().unwrap_or(&self.name)
    }
}

/// Derived per-status counts plus total queue bytes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct QueueStats {
    pub total: usize,
    pub pending: usize,
    pub uploading: usize,
    pub success: usize,
    pub error: usize,
    pub bytes: u64,
}

/// Immutable copy of the whole queue, pushed to consumers on every mutation.
#[derive(Clone, Debug, Default)]
pub struct QueueSnapshot {
    pub entries: Vec<EntrySnapshot>,
    pub stats: QueueStats,
}

fn lock_entries(entries: &Mutex<Vec<UploadEntry>>) -> MutexGuard<'_, Vec<UploadEntry>> {
    // A poisoning panic cannot leave the queue half-mutated: every critical
    // section writes a single entry's status or appends/removes whole entries.
    entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn snapshot_of(entries: &[UploadEntry]) -> QueueSnapshot {
    let mut stats = QueueStats {
        total: entries.len(),
        ..QueueStats::default()
    };
    let snapshots = entries
        .iter()
        .map(|entry| {
            match entry.status {
                EntryStatus::Pending => stats.pending += 1,
                EntryStatus::Uploading { .. } => stats.uploading += 1,
                EntryStatus::Success(_) => stats.success += 1,
                EntryStatus::Error(_) => stats.error += 1,
            }
            stats.bytes += entry.file.size();
            EntrySnapshot {
                id: entry.id.clone(),
                name: entry.file.name.clone(),
                relative_path: entry.relative_path.clone(),
                size_bytes: entry.file.size(),
                status: entry.status.clone(),
            }
        })
        .collect();
    QueueSnapshot {
        entries: snapshots,
        stats,
    }
}

/// Results of entries currently in `Success`, in queue order. This is the
/// list the note-creation form attaches to the note.
fn assets_of(entries: &[UploadEntry]) -> Vec<UploadedAsset> {
    entries
        .iter()
        .filter_map(|entry| entry.status.result().cloned())
        .collect()
}

/// Upload progress percent; callers only invoke this with a known total.
fn percent(sent: u64, total: u64) -> u8 {
    ((sent.min(total) * 100 + total / 2) / total) as u8
}

/// Multi-file upload queue with admission control and user-initiated retry.
///
/// All mutation goes through `&mut self`; consumers observe through
/// [`QueueSnapshot`] copies (sync getters or `watch` subscriptions), never
/// shared references into the queue.
pub struct UploadQueue {
    entries: Arc<Mutex<Vec<UploadEntry>>>,
    transport: Arc<dyn UploadTransport>,
    ids: Arc<dyn EntryIdGenerator>,
    config: UploadConfig,
    /// One upload campaign at a time, whether a full batch or a single retry.
    in_progress: bool,
    selection_notice: Option<Notice>,
    upload_notice: Option<Notice>,
    snapshot_tx: watch::Sender<QueueSnapshot>,
    assets_tx: watch::Sender<Vec<UploadedAsset>>,
}

impl UploadQueue {
    pub fn new(config: UploadConfig, transport: Arc<dyn UploadTransport>) -> Self {
        Self::with_id_generator(config, transport, Arc::new(UuidEntryIds))
    }

    pub fn with_id_generator(
        config: UploadConfig,
        transport: Arc<dyn UploadTransport>,
        ids: Arc<dyn EntryIdGenerator>,
    ) -> Self {
        let (snapshot_tx, _) = watch::channel(QueueSnapshot::default());
        let (assets_tx, _) = watch::channel(Vec::new());
        Self {
            entries: Arc::new(Mutex::new(Vec::new())),
            transport,
            ids,
            config,
            in_progress: false,
            selection_notice: None,
            upload_notice: None,
            snapshot_tx,
            assets_tx,
        }
    }

    /// Admit a batch of selected files, in input order.
    ///
    /// Per candidate, in order: a duplicate signature skips that candidate;
    /// hitting the count ceiling drops the rest of the batch; an oversized
    /// file skips that candidate; breaching the cumulative ceiling drops the
    /// rest of the batch. Returns the aggregated selection notice (`None`
    /// when the input was empty).
    pub fn add_files(
        &mut self,
        candidates: Vec<FileCandidate>,
        source_label: &str,
    ) -> Option<Notice> {
        if candidates.is_empty() {
            return None;
        }

        // A new selection supersedes whatever the last upload reported.
        self.upload_notice = None;

        let mut warnings: Vec<String> = Vec::new();
        let added = {
            let mut guard = lock_entries(&self.entries);
            let mut signatures: HashSet<_> =
                guard.iter().map(|entry| entry.file.signature()).collect();
            let mut count = guard.len();
            let mut bytes: u64 = guard.iter().map(|entry| entry.file.size()).sum();
            let mut accepted: Vec<UploadEntry> = Vec::new();

            for candidate in candidates {
                let file = &candidate.payload;
                let signature = file.signature();
                if signatures.contains(&signature) {
                    warnings.push(format!("\"{}\" skipped (already in queue).", file.name));
                    continue;
                }
                if count >= MAX_FILE_COUNT {
                    warnings.push(format!(
                        "Maximum of {} files per batch reached.",
                        MAX_FILE_COUNT
                    ));
                    break;
                }
                if file.size() > MAX_FILE_SIZE_MB * 1024 * 1024 {
                    warnings.push(format!(
                        "\"{}\" exceeds the {}MB limit.",
                        file.name, MAX_FILE_SIZE_MB
                    ));
                    continue;
                }
                if bytes + file.size() > TOTAL_SIZE_LIMIT_MB * 1024 * 1024 {
                    warnings.push(format!(
                        "Total upload size limit ({}MB) reached.",
                        TOTAL_SIZE_LIMIT_MB
                    ));
                    break;
                }

                let id = self.ids.entry_id(file);
                signatures.insert(signature);
                count += 1;
                bytes += file.size();
                accepted.push(UploadEntry {
                    id,
                    relative_path: candidate.relative_path,
                    file: candidate.payload,
                    status: EntryStatus::Pending,
                });
            }

            let added = accepted.len();
            guard.extend(accepted);
            added
        };

        tracing::info!(
            added,
            warnings = warnings.len(),
            source = source_label,
            "Processed file selection"
        );

        let notice = if added > 0 {
            let mut text = format!(
                "{} item{} added from {}.",
                added,
                if added == 1 { "" } else { "s" },
                source_label
            );
            if !warnings.is_empty() {
                text.push(' ');
                text.push_str(&warnings.join(" "));
            }
            let notice = if warnings.is_empty() {
                Notice::success(text)
            } else {
                Notice::warning(text)
            };
            self.publish();
            Some(notice)
        } else if !warnings.is_empty() {
            Some(Notice::error(warnings.join(" ")))
        } else {
            None
        };

        if let Some(notice) = &notice {
            self.selection_notice = Some(notice.clone());
        }
        notice
    }

    /// Upload every entry that has not already succeeded, sequentially in
    /// queue order. Sequential on purpose: it keeps per-entry progress
    /// unambiguous and bounds concurrent load on the network.
    pub async fn upload_all(&mut self) -> Notice {
        if lock_entries(&self.entries).is_empty() {
            let notice = Notice::error("Please add at least one file or folder.");
            self.upload_notice = Some(notice.clone());
            return notice;
        }
        if self.in_progress {
            return Notice::error("An upload is already in progress.");
        }

        self.in_progress = true;
        self.upload_notice = None;

        let ids: Vec<String> = lock_entries(&self.entries)
            .iter()
            .filter(|entry| !entry.status.is_success())
            .map(|entry| entry.id.clone())
            .collect();

        let mut encountered_error = false;
        for id in &ids {
            if !self.upload_entry(id).await {
                encountered_error = true;
            }
        }

        self.in_progress = false;

        let notice = if encountered_error {
            Notice::error(
                "Some files failed to upload. Use the Retry action next to each failed item.",
            )
        } else {
            Notice::success("All files uploaded successfully.")
        };
        tracing::info!(
            attempted = ids.len(),
            failed = encountered_error,
            "Upload batch settled"
        );
        self.upload_notice = Some(notice.clone());
        notice
    }

    /// Re-attempt a single entry. Refused (returns false) while another
    /// campaign is running, so the same entry can never have two transfers
    /// in flight.
    pub async fn retry_one(&mut self, id: &str) -> bool {
        if self.in_progress {
            tracing::debug!(entry_id = %id, "Retry ignored while an upload is in progress");
            return false;
        }
        if !lock_entries(&self.entries)
            .iter()
            .any(|entry| entry.id == id)
        {
            return false;
        }

        self.upload_notice = None;
        self.in_progress = true;
        let ok = self.upload_entry(id).await;
        self.in_progress = false;
        ok
    }

    /// Remove an entry unconditionally. If its transfer is still in flight
    /// the eventual response is discarded on arrival; no cancellation signal
    /// is sent.
    pub fn remove_one(&mut self, id: &str) -> bool {
        let removed = {
            let mut guard = lock_entries(&self.entries);
            let before = guard.len();
            guard.retain(|entry| entry.id != id);
            before != guard.len()
        };
        self.upload_notice = None;
        if removed {
            self.publish();
        }
        removed
    }

    /// Empty the queue and all notices. Refused while a batch is running.
    pub fn clear_all(&mut self) -> bool {
        if self.in_progress {
            tracing::warn!("Ignoring clear request while an upload is in progress");
            return false;
        }
        lock_entries(&self.entries).clear();
        self.selection_notice = None;
        self.upload_notice = None;
        self.publish();
        true
    }

    pub fn snapshot(&self) -> QueueSnapshot {
        self.snapshot_tx.borrow().clone()
    }

    pub fn stats(&self) -> QueueStats {
        self.snapshot_tx.borrow().stats
    }

    /// The ordered results of every currently-successful entry.
    pub fn successful_assets(&self) -> Vec<UploadedAsset> {
        self.assets_tx.borrow().clone()
    }

    /// Watch the full queue snapshot.
    pub fn subscribe(&self) -> watch::Receiver<QueueSnapshot> {
        self.snapshot_tx.subscribe()
    }

    /// Watch the successful-assets list, recomputed whenever any entry's
    /// status changes.
    pub fn subscribe_assets(&self) -> watch::Receiver<Vec<UploadedAsset>> {
        self.assets_tx.subscribe()
    }

    pub fn is_uploading(&self) -> bool {
        self.in_progress
    }

    pub fn is_empty(&self) -> bool {
        lock_entries(&self.entries).is_empty()
    }

    pub fn len(&self) -> usize {
        lock_entries(&self.entries).len()
    }

    pub fn selection_notice(&self) -> Option<Notice> {
        self.selection_notice.clone()
    }

    pub fn upload_notice(&self) -> Option<Notice> {
        self.upload_notice.clone()
    }

    /// Drive one entry through `uploading` to a settled state. Returns false
    /// only when the transfer failed and the entry is still queued; a
    /// missing entry (removed mid-flight) discards the result silently.
    async fn upload_entry(&mut self, id: &str) -> bool {
        let file = {
            let mut guard = lock_entries(&self.entries);
            let Some(entry) = guard.iter_mut().find(|entry| entry.id == id) else {
                return true;
            };
            if entry.status.is_uploading() {
                return true;
            }
            entry.status = EntryStatus::Uploading { progress: 0 };
            entry.file.clone()
        };
        self.publish();

        // The progress callback runs while the transfer future is suspended;
        // it updates the entry through the shared handle and republishes.
        let entries = Arc::clone(&self.entries);
        let snapshot_tx = self.snapshot_tx.clone();
        let entry_id = id.to_string();
        let progress: ProgressCallback = Arc::new(move |sent, total| {
            if total == 0 {
                return;
            }
            let pct = percent(sent, total);
            let mut guard = lock_entries(&entries);
            if let Some(entry) = guard.iter_mut().find(|entry| entry.id == entry_id) {
                if let EntryStatus::Uploading { progress } = &mut entry.status {
                    *progress = pct;
                }
            }
            let snapshot = snapshot_of(&guard);
            drop(guard);
            snapshot_tx.send_replace(snapshot);
        });

        tracing::debug!(filename = %file.name, bytes = file.size(), "Starting upload");
        let request = UploadRequest {
            file: &file,
            upload_preset: &self.config.upload_preset,
            cloud_name: &self.config.cloud_name,
            folder: &self.config.folder,
        };
        let outcome = self.transport.upload(request, progress).await;

        let ok = {
            let mut guard = lock_entries(&self.entries);
            match guard.iter_mut().find(|entry| entry.id == id) {
                None => {
                    tracing::debug!(entry_id = %id, "Discarding settled transfer for removed entry");
                    true
                }
                Some(entry) => match outcome {
                    Ok(mut asset) => {
                        asset.relative_path = entry.relative_path.clone();
                        tracing::info!(filename = %entry.file.name, public_id = %asset.public_id, "Upload succeeded");
                        entry.status = EntryStatus::Success(asset);
                        true
                    }
                    Err(err) => {
                        let message = err.to_string();
                        tracing::warn!(filename = %entry.file.name, error = %message, "Upload failed");
                        entry.status = EntryStatus::Error(message);
                        false
                    }
                },
            }
        };
        self.publish();
        ok
    }

    /// Recompute both derived views and push them to subscribers.
    fn publish(&self) {
        let guard = lock_entries(&self.entries);
        let snapshot = snapshot_of(&guard);
        let assets = assets_of(&guard);
        drop(guard);
        self.snapshot_tx.send_replace(snapshot);
        self.assets_tx.send_replace(assets);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_rounds_half_up() {
        assert_eq!(percent(0, 100), 0);
        assert_eq!(percent(1, 3), 33);
        assert_eq!(percent(2, 3), 67);
        assert_eq!(percent(1, 200), 1); // 0.5% rounds up
        assert_eq!(percent(100, 100), 100);
        // sent is clamped, never above 100
        assert_eq!(percent(150, 100), 100);
    }
}
