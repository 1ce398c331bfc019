use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tokio::sync::Mutex;

use crate::auth::repository::{InMemoryUserRepository, UserSnapshot};
use crate::kernel::component::KernelComponent;
use crate::kernel::constants::STATE_SNAPSHOT_VERSION;
use crate::kernel::error::{Error, Result};
use crate::library::repository::InMemoryBookRepository;
use crate::models::{Book, Progress};
use crate::sync::repository::InMemoryProgressRepository;

/// Everything the in-memory repositories hold, as written to disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub version: u32,
    #[serde(flatten)]
    pub users: UserSnapshot,
    #[serde(default)]
    pub books: Vec<Book>,
    #[serde(default)]
    pub progress: Vec<Progress>,
}

/// Kernel component that loads repository state on initialize and saves it on stop.
///
/// Between the two it holds an exclusive lock on a sibling `.lock` file, so
/// processes sharing a data directory take turns instead of overwriting each
/// other's changes.
#[derive(Debug, Clone)]
pub struct StateManager {
    name: &'static str,
    path: PathBuf,
    lock: Arc<Mutex<Option<File>>>,
    users: Arc<InMemoryUserRepository>,
    books: Arc<InMemoryBookRepository>,
    progress: Arc<InMemoryProgressRepository>,
}

impl StateManager {
    pub fn new(
        path: impl Into<PathBuf>,
        users: Arc<InMemoryUserRepository>,
        books: Arc<InMemoryBookRepository>,
        progress: Arc<InMemoryProgressRepository>,
    ) -> Self {
        Self {
            name: "StateManager",
            path: path.into(),
            lock: Arc::new(Mutex::new(None)),
            users,
            books,
            progress,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn lock_path(&self) -> PathBuf {
        self.path.with_extension("lock")
    }

    fn parent_dir(&self) -> PathBuf {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    /// Block until this process owns the state lock. Re-acquiring is a no-op.
    pub async fn acquire_lock(&self) -> Result<()> {
        let mut held = self.lock.lock().await;
        if held.is_some() {
            return Ok(());
        }
        let parent = self.parent_dir();
        fs::create_dir_all(&parent).map_err(|e| Error::io(e, "create_dir_all", parent.clone()))?;

        let lock_path = self.lock_path();
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .map_err(|e| Error::io(e, "open_lock_file", lock_path.clone()))?;
        let file = tokio::task::spawn_blocking(move || -> std::io::Result<File> {
            file.lock_exclusive()?;
            Ok(file)
        })
        .await
        .map_err(|e| self.snapshot_error(format!("lock task failed: {}", e)))?
        .map_err(|e| Error::io(e, "lock_exclusive", lock_path.clone()))?;

        log::debug!("Acquired state lock {}", lock_path.display());
        *held = Some(file);
        Ok(())
    }

    /// Give up the state lock. Closing the file releases it.
    pub async fn release_lock(&self) {
        if self.lock.lock().await.take().is_some() {
            log::debug!("Released state lock {}", self.lock_path().display());
        }
    }

    fn snapshot_error(&self, message: impl Into<String>) -> Error {
        Error::StateSnapshot {
            path: self.path.clone(),
            message: message.into(),
        }
    }

    /// Current repository contents.
    pub async fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            version: STATE_SNAPSHOT_VERSION,
            users: self.users.snapshot().await,
            books: self.books.snapshot().await,
            progress: self.progress.snapshot().await,
        }
    }

    /// Replace repository contents from the state file. A missing file leaves them empty.
    pub async fn load(&self) -> Result<bool> {
        if !self.path.exists() {
            log::debug!("No state file at {}, starting empty", self.path.display());
            return Ok(false);
        }
        let data = fs::read(&self.path).map_err(|e| Error::io(e, "read", self.path.clone()))?;
        let snapshot: StateSnapshot =
            serde_json::from_slice(&data).map_err(|e| self.snapshot_error(e.to_string()))?;
        if snapshot.version != STATE_SNAPSHOT_VERSION {
            return Err(self.snapshot_error(format!(
                "unsupported snapshot version {} (expected {})",
                snapshot.version, STATE_SNAPSHOT_VERSION
            )));
        }

        log::info!(
            "Loaded state: {} users, {} books, {} progress entries",
            snapshot.users.users.len(),
            snapshot.books.len(),
            snapshot.progress.len()
        );
        self.users.restore(snapshot.users).await;
        self.books.restore(snapshot.books).await;
        self.progress.restore(snapshot.progress).await;
        Ok(true)
    }

    /// Write the state file atomically. Expired sessions are not kept.
    pub async fn save(&self) -> Result<()> {
        let purged = self.users.purge_expired_sessions(Utc::now()).await;
        if purged > 0 {
            log::debug!("Dropped {} expired session(s)", purged);
        }
        let snapshot = self.snapshot().await;
        let data =
            serde_json::to_vec_pretty(&snapshot).map_err(|e| self.snapshot_error(e.to_string()))?;

        let parent = self.parent_dir();
        fs::create_dir_all(&parent).map_err(|e| Error::io(e, "create_dir_all", parent.clone()))?;

        let mut temp_file = NamedTempFile::new_in(&parent)
            .map_err(|e| Error::io(e, "create_temp_file", parent.clone()))?;
        temp_file
            .write_all(&data)
            .map_err(|e| Error::io(e, "write_to_temp_file", temp_file.path().to_path_buf()))?;
        temp_file
            .persist(&self.path)
            .map_err(|e| Error::io(e.error, "persist_temp_file", self.path.clone()))?;

        log::debug!("Saved state to {}", self.path.display());
        Ok(())
    }
}

#[async_trait]
impl KernelComponent for StateManager {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn initialize(&self) -> Result<()> {
        self.acquire_lock().await?;
        self.load().await?;
        Ok(())
    }

    async fn start(&self) -> Result<()> {
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        let saved = self.save().await;
        self.release_lock().await;
        saved
    }
}
