use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A KOReader installation allowed to sync progress.
///
/// Device names are unique across the whole server because KOReader
/// authenticates with the device name alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub id: Uuid,
    pub name: String,
    /// Lowercase hex MD5 of the device password, as KOReader sends it.
    pub hashed_password: String,
    pub user_id: Option<Uuid>,
}

impl Device {
    pub fn new(name: impl Into<String>, hashed_password: impl Into<String>, user_id: Option<Uuid>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            hashed_password: hashed_password.into(),
            user_id,
        }
    }
}
