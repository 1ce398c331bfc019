use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A reading position reported by a device.
///
/// The serde aliases accept the field names KOReader uses on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    /// The `Book::id` this progress belongs to.
    #[serde(alias = "document")]
    pub document_id: Uuid,
    pub user_id: Option<Uuid>,
    /// Fraction read, between 0 and 1.
    pub percentage: f64,
    /// Opaque position string from KOReader (xpointer or page).
    #[serde(alias = "progress")]
    pub progress_detail: String,
    #[serde(alias = "device")]
    pub device_name: String,
    pub device_id: Option<Uuid>,
    pub timestamp: DateTime<Utc>,
}
