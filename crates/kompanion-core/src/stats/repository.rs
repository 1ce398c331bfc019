use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use uuid::Uuid;

use crate::library::repository::BookRepository;
use crate::models::{Book, Progress};
use crate::stats::error::StatsResult;
use crate::stats::period::ActivityPeriod;
use crate::sync::repository::ProgressRepository;

/// Fraction at which a book counts as finished.
pub const FINISH_THRESHOLD: f64 = 0.95;

/// Gaps between progress reports at or above this are not reading time.
const MAX_SESSION_GAP_SECONDS: i64 = 2 * 60 * 60;

/// Read-only statistics over a user's reading progress
#[async_trait]
pub trait StatsRepository: Send + Sync + Debug {
    /// Documents with any progress above zero.
    async fn get_total_books_started(&self, user_id: Uuid) -> StatsResult<usize>;
    /// Documents whose latest progress reaches `finish_threshold`.
    async fn get_total_books_finished(&self, user_id: Uuid, finish_threshold: f64) -> StatsResult<usize>;
    async fn get_total_reading_time_estimate(&self, user_id: Uuid) -> StatsResult<Duration>;
    /// Books with the highest latest progress, with that progress.
    async fn get_most_read_books(&self, user_id: Uuid, limit: usize) -> StatsResult<Vec<(Book, f64)>>;
    /// Finished books counted per period, ordered by period key.
    async fn get_reading_activity_over_time(
        &self,
        user_id: Uuid,
        period: ActivityPeriod,
    ) -> StatsResult<BTreeMap<String, u32>>;
    async fn get_average_read_percentage(&self, user_id: Uuid) -> StatsResult<Option<f64>>;
}

/// [`StatsRepository`] computed on demand from the progress and book repositories.
#[derive(Debug, Clone)]
pub struct InMemoryStatsRepository {
    progress_repository: Arc<dyn ProgressRepository>,
    book_repository: Arc<dyn BookRepository>,
}

impl InMemoryStatsRepository {
    pub fn new(
        progress_repository: Arc<dyn ProgressRepository>,
        book_repository: Arc<dyn BookRepository>,
    ) -> Self {
        Self {
            progress_repository,
            book_repository,
        }
    }

    async fn all_progress(&self, user_id: Uuid) -> StatsResult<Vec<Progress>> {
        Ok(self.progress_repository.get_all_progress_for_user(user_id).await?)
    }

    /// Newest entry per document.
    async fn latest_per_book(&self, user_id: Uuid) -> StatsResult<HashMap<Uuid, Progress>> {
        let mut latest: HashMap<Uuid, Progress> = HashMap::new();
        for progress in self.all_progress(user_id).await? {
            let newer = latest
                .get(&progress.document_id)
                .is_none_or(|current| progress.timestamp > current.timestamp);
            if newer {
                latest.insert(progress.document_id, progress);
            }
        }
        Ok(latest)
    }
}

#[async_trait]
impl StatsRepository for InMemoryStatsRepository {
    async fn get_total_books_started(&self, user_id: Uuid) -> StatsResult<usize> {
        let started: HashSet<Uuid> = self
            .all_progress(user_id)
            .await?
            .into_iter()
            .filter(|p| p.percentage > 0.0)
            .map(|p| p.document_id)
            .collect();
        Ok(started.len())
    }

    async fn get_total_books_finished(&self, user_id: Uuid, finish_threshold: f64) -> StatsResult<usize> {
        Ok(self
            .latest_per_book(user_id)
            .await?
            .values()
            .filter(|p| p.percentage >= finish_threshold)
            .count())
    }

    async fn get_total_reading_time_estimate(&self, user_id: Uuid) -> StatsResult<Duration> {
        let all_progress = self.all_progress(user_id).await?;
        if all_progress.len() < 2 {
            return Ok(Duration::zero());
        }

        let mut by_document: HashMap<Uuid, Vec<Progress>> = HashMap::new();
        for progress in all_progress {
            by_document.entry(progress.document_id).or_default().push(progress);
        }

        let max_gap = Duration::seconds(MAX_SESSION_GAP_SECONDS);
        let mut total = Duration::zero();
        for entries in by_document.values_mut() {
            entries.sort_by_key(|p| p.timestamp);
            for pair in entries.windows(2) {
                let gap = pair[1].timestamp - pair[0].timestamp;
                // Long gaps are breaks, and only forward movement counts.
                if gap > Duration::zero() && gap < max_gap && pair[1].percentage > pair[0].percentage {
                    total = total + gap;
                }
            }
        }
        Ok(total)
    }

    async fn get_most_read_books(&self, user_id: Uuid, limit: usize) -> StatsResult<Vec<(Book, f64)>> {
        let mut latest: Vec<Progress> = self.latest_per_book(user_id).await?.into_values().collect();
        latest.sort_by(|a, b| {
            b.percentage
                .total_cmp(&a.percentage)
                .then(a.document_id.cmp(&b.document_id))
        });

        let mut result = Vec::new();
        for progress in latest.into_iter().take(limit) {
            if let Some(book) = self.book_repository.get_book_by_id(progress.document_id).await? {
                result.push((book, progress.percentage));
            }
        }
        Ok(result)
    }

    async fn get_reading_activity_over_time(
        &self,
        user_id: Uuid,
        period: ActivityPeriod,
    ) -> StatsResult<BTreeMap<String, u32>> {
        let mut activity = BTreeMap::new();
        for progress in self.latest_per_book(user_id).await?.values() {
            if progress.percentage >= FINISH_THRESHOLD {
                *activity.entry(period.key_for(&progress.timestamp)).or_insert(0) += 1;
            }
        }
        Ok(activity)
    }

    async fn get_average_read_percentage(&self, user_id: Uuid) -> StatsResult<Option<f64>> {
        let latest = self.latest_per_book(user_id).await?;
        if latest.is_empty() {
            return Ok(None);
        }
        let total: f64 = latest.values().map(|p| p.percentage).sum();
        Ok(Some(total / latest.len() as f64))
    }
}
