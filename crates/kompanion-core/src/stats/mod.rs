//! # Kompanion Stats
//!
//! Reading statistics derived from synced progress. Nothing is stored here;
//! every figure is recomputed from the progress and book repositories.
pub mod error;
pub mod period;
pub mod repository;
pub mod service;

pub use error::{StatsError, StatsResult};
pub use period::ActivityPeriod;
pub use repository::{FINISH_THRESHOLD, InMemoryStatsRepository, StatsRepository};
pub use service::{DEFAULT_TOP_BOOKS, ReadingSummary, StatsService, TopBook};

#[cfg(test)]
mod tests;
