use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{BookStorageSettings, StorageKind};
use crate::kernel::component::KernelComponent;
use crate::kernel::error::Result;
use crate::storage::local::LocalBookStorage;
use crate::storage::memory::InMemoryBookStorage;
use crate::storage::provider::BookStorage;

/// Build the backend selected by `settings`.
pub fn open_book_storage(settings: &BookStorageSettings) -> Arc<dyn BookStorage> {
    match settings.kind {
        StorageKind::Local => Arc::new(LocalBookStorage::new(settings.path.clone())),
        StorageKind::Memory => Arc::new(InMemoryBookStorage::new()),
    }
}

/// Kernel component owning the book storage backend
#[derive(Debug, Clone)]
pub struct StorageManager {
    name: &'static str,
    storage: Arc<dyn BookStorage>,
}

impl StorageManager {
    pub fn new(storage: Arc<dyn BookStorage>) -> Self {
        Self {
            name: "StorageManager",
            storage,
        }
    }

    pub fn from_settings(settings: &BookStorageSettings) -> Self {
        Self::new(open_book_storage(settings))
    }

    /// Get the underlying backend
    pub fn storage(&self) -> &Arc<dyn BookStorage> {
        &self.storage
    }
}

#[async_trait]
impl KernelComponent for StorageManager {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn initialize(&self) -> Result<()> {
        self.storage.ensure_ready()?;
        log::debug!("Book storage '{}' ready", self.storage.name());
        Ok(())
    }

    async fn start(&self) -> Result<()> {
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        Ok(())
    }
}
