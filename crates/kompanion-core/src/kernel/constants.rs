/// Application name
pub const APP_NAME: &str = "Kompanion";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// File under `app.data_path` holding the repository snapshot
pub const STATE_FILE_NAME: &str = "state.json";

/// Layout version written into every snapshot
pub const STATE_SNAPSHOT_VERSION: u32 = 1;
