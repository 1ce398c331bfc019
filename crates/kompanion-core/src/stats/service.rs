use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::stats::error::StatsResult;
use crate::stats::period::ActivityPeriod;
use crate::stats::repository::{FINISH_THRESHOLD, StatsRepository};

/// Default number of books in a top list.
pub const DEFAULT_TOP_BOOKS: usize = 5;

/// Headline reading figures for one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadingSummary {
    pub total_books_started: usize,
    pub total_books_finished: usize,
    /// e.g. "3 hours, 12 minutes"
    pub total_reading_time_estimate: String,
    pub average_read_percentage: Option<f64>,
}

/// One entry of a user's most-read list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopBook {
    pub book_id: Uuid,
    pub title: String,
    pub author: Option<String>,
    /// Progress as a percentage (0-100), two decimals.
    pub percentage_read: f64,
}

/// Presentation layer over a [`StatsRepository`].
#[derive(Debug, Clone)]
pub struct StatsService {
    repository: Arc<dyn StatsRepository>,
}

impl StatsService {
    pub fn new(repository: Arc<dyn StatsRepository>) -> Self {
        Self { repository }
    }

    pub async fn get_user_reading_summary(&self, user_id: Uuid) -> StatsResult<ReadingSummary> {
        let total_books_started = self.repository.get_total_books_started(user_id).await?;
        let total_books_finished = self
            .repository
            .get_total_books_finished(user_id, FINISH_THRESHOLD)
            .await?;
        let reading_time = self.repository.get_total_reading_time_estimate(user_id).await?;
        let average_read_percentage = self.repository.get_average_read_percentage(user_id).await?;

        let total_seconds = reading_time.num_seconds().max(0);
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;

        Ok(ReadingSummary {
            total_books_started,
            total_books_finished,
            total_reading_time_estimate: format!("{} hours, {} minutes", hours, minutes),
            average_read_percentage,
        })
    }

    pub async fn get_top_books_for_user(&self, user_id: Uuid, limit: usize) -> StatsResult<Vec<TopBook>> {
        let books = self.repository.get_most_read_books(user_id, limit).await?;
        Ok(books
            .into_iter()
            .map(|(book, percentage)| TopBook {
                book_id: book.id,
                title: book.title,
                author: book.author,
                percentage_read: (percentage * 100.0 * 100.0).round() / 100.0,
            })
            .collect())
    }

    pub async fn get_user_activity_timeline(
        &self,
        user_id: Uuid,
        period: ActivityPeriod,
    ) -> StatsResult<BTreeMap<String, u32>> {
        self.repository.get_reading_activity_over_time(user_id, period).await
    }
}
