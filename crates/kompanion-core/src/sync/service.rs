use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::Progress;
use crate::sync::error::{SyncError, SyncResult};
use crate::sync::repository::ProgressRepository;

/// Progress submission and lookup.
#[derive(Debug, Clone)]
pub struct ProgressService {
    repository: Arc<dyn ProgressRepository>,
}

impl ProgressService {
    pub fn new(repository: Arc<dyn ProgressRepository>) -> Self {
        Self { repository }
    }

    /// Record a position reported by a device. `timestamp` is Unix seconds.
    #[allow(clippy::too_many_arguments)]
    pub async fn submit_progress(
        &self,
        user_id: Uuid,
        document_id: Uuid,
        percentage: f64,
        progress_detail: Option<&str>,
        device_name: &str,
        device_id: Option<Uuid>,
        timestamp: i64,
    ) -> SyncResult<Progress> {
        let timestamp =
            DateTime::<Utc>::from_timestamp(timestamp, 0).ok_or(SyncError::InvalidTimestamp(timestamp))?;
        if !percentage.is_finite() || !(0.0..=1.0).contains(&percentage) {
            return Err(SyncError::InvalidPercentage(percentage));
        }

        let progress = Progress {
            document_id,
            user_id: Some(user_id),
            percentage,
            progress_detail: progress_detail.unwrap_or_default().to_string(),
            device_name: device_name.to_string(),
            device_id,
            timestamp,
        };
        self.repository.save_progress(progress).await
    }

    pub async fn get_document_progress(&self, user_id: Uuid, document_id: Uuid) -> SyncResult<Option<Progress>> {
        self.repository.get_latest_progress(document_id, user_id).await
    }

    pub async fn get_all_user_progress(&self, user_id: Uuid) -> SyncResult<Vec<Progress>> {
        self.repository.get_all_progress_for_user(user_id).await
    }

    pub async fn get_device_specific_progress(
        &self,
        document_id: Uuid,
        device_id: Uuid,
    ) -> SyncResult<Option<Progress>> {
        self.repository
            .get_progress_for_document_and_device(document_id, device_id)
            .await
    }
}
