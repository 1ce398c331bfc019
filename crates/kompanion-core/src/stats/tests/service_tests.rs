use uuid::Uuid;

use super::repository_tests::fixture;
use crate::stats::period::ActivityPeriod;
use crate::stats::service::{ReadingSummary, StatsService};

#[tokio::test]
async fn test_reading_summary() {
    let f = fixture().await;
    let service = StatsService::new(f.stats.clone());

    let summary = service.get_user_reading_summary(f.user).await.unwrap();
    assert_eq!(summary.total_books_started, 2);
    assert_eq!(summary.total_books_finished, 1);
    assert_eq!(summary.total_reading_time_estimate, "1 hours, 0 minutes");
    assert!(summary.average_read_percentage.is_some());
}

#[tokio::test]
async fn test_empty_summary() {
    let f = fixture().await;
    let service = StatsService::new(f.stats.clone());
    let summary = service.get_user_reading_summary(Uuid::new_v4()).await.unwrap();
    assert_eq!(
        summary,
        ReadingSummary {
            total_books_started: 0,
            total_books_finished: 0,
            total_reading_time_estimate: "0 hours, 0 minutes".to_string(),
            average_read_percentage: None,
        }
    );
}

#[tokio::test]
async fn test_top_books_as_percentages() {
    let f = fixture().await;
    let service = StatsService::new(f.stats.clone());

    let top = service.get_top_books_for_user(f.user, 5).await.unwrap();
    assert_eq!(top.len(), 2);
    assert_eq!(top[0].book_id, f.finished_book.id);
    assert_eq!(top[0].title, "Finished");
    assert_eq!(top[0].percentage_read, 96.0);
    assert_eq!(top[1].percentage_read, 40.0);
}

#[tokio::test]
async fn test_activity_timeline() {
    let f = fixture().await;
    let service = StatsService::new(f.stats.clone());
    let timeline = service
        .get_user_activity_timeline(f.user, ActivityPeriod::Month)
        .await
        .unwrap();
    assert_eq!(timeline.len(), 1);
    assert_eq!(timeline["2024-03"], 1);
}
