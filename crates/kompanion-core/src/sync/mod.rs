//! # Kompanion Sync
//!
//! Reading-progress sync between KOReader devices. Each `(document, device)`
//! pair keeps only its newest reported position.
pub mod error;
pub mod repository;
pub mod service;

pub use error::{SyncError, SyncResult};
pub use repository::{InMemoryProgressRepository, ProgressRepository};
pub use service::ProgressService;
