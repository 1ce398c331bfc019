use std::cmp::Reverse;
use std::fmt::Debug;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::Progress;
use crate::sync::error::SyncResult;

/// Persistence interface for reading progress
#[async_trait]
pub trait ProgressRepository: Send + Sync + Debug {
    /// Upsert on `(document_id, user_id, device)`. A device is its id, or its
    /// name when unregistered. A submission older than the stored entry is
    /// dropped. Returns the submitted value either way.
    async fn save_progress(&self, progress: Progress) -> SyncResult<Progress>;
    /// Newest entry for a document across the user's devices.
    async fn get_latest_progress(&self, document_id: Uuid, user_id: Uuid) -> SyncResult<Option<Progress>>;
    /// Every entry of a user, ordered by document then timestamp, descending.
    async fn get_all_progress_for_user(&self, user_id: Uuid) -> SyncResult<Vec<Progress>>;
    async fn get_progress_for_document_and_device(
        &self,
        document_id: Uuid,
        device_id: Uuid,
    ) -> SyncResult<Option<Progress>>;
}

/// [`ProgressRepository`] backed by process memory.
#[derive(Debug, Default)]
pub struct InMemoryProgressRepository {
    entries: RwLock<Vec<Progress>>,
}

/// Whether two entries occupy the same upsert slot.
fn same_slot(a: &Progress, b: &Progress) -> bool {
    let same_device = match (a.device_id, b.device_id) {
        (Some(a_id), Some(b_id)) => a_id == b_id,
        (None, None) => a.device_name == b.device_name,
        _ => false,
    };
    a.document_id == b.document_id && a.user_id == b.user_id && same_device
}

impl InMemoryProgressRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn snapshot(&self) -> Vec<Progress> {
        self.entries.read().await.clone()
    }

    pub async fn restore(&self, entries: Vec<Progress>) {
        *self.entries.write().await = entries;
    }
}

#[async_trait]
impl ProgressRepository for InMemoryProgressRepository {
    async fn save_progress(&self, progress: Progress) -> SyncResult<Progress> {
        let mut entries = self.entries.write().await;
        let existing = entries.iter().position(|entry| same_slot(entry, &progress));
        match existing {
            Some(idx) if progress.timestamp >= entries[idx].timestamp => {
                entries[idx] = progress.clone();
            }
            Some(idx) => log::debug!(
                "Ignoring stale progress for document {} ({} < {})",
                progress.document_id,
                progress.timestamp,
                entries[idx].timestamp
            ),
            None => entries.push(progress.clone()),
        }
        Ok(progress)
    }

    async fn get_latest_progress(&self, document_id: Uuid, user_id: Uuid) -> SyncResult<Option<Progress>> {
        let entries = self.entries.read().await;
        Ok(entries
            .iter()
            .filter(|p| p.document_id == document_id && p.user_id == Some(user_id))
            .max_by_key(|p| p.timestamp)
            .cloned())
    }

    async fn get_all_progress_for_user(&self, user_id: Uuid) -> SyncResult<Vec<Progress>> {
        let mut progress: Vec<Progress> = self
            .entries
            .read()
            .await
            .iter()
            .filter(|p| p.user_id == Some(user_id))
            .cloned()
            .collect();
        progress.sort_by_key(|p| Reverse((p.document_id, p.timestamp)));
        Ok(progress)
    }

    async fn get_progress_for_document_and_device(
        &self,
        document_id: Uuid,
        device_id: Uuid,
    ) -> SyncResult<Option<Progress>> {
        let entries = self.entries.read().await;
        Ok(entries
            .iter()
            .filter(|p| p.document_id == document_id && p.device_id == Some(device_id))
            .max_by_key(|p| p.timestamp)
            .cloned())
    }
}
