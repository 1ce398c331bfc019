use std::sync::Arc;

use crate::auth::repository::InMemoryUserRepository;
use crate::auth::service::AuthService;
use crate::config::Settings;
use crate::kernel::component::KernelComponent;
use crate::kernel::constants;
use crate::kernel::error::{Error, KernelLifecyclePhase, Result};
use crate::kernel::state::StateManager;
use crate::library::metadata::FilenameMetadataParser;
use crate::library::repository::InMemoryBookRepository;
use crate::library::service::LibraryService;
use crate::stats::repository::InMemoryStatsRepository;
use crate::stats::service::StatsService;
use crate::storage::manager::StorageManager;
use crate::storage::provider::BookStorage;
use crate::sync::repository::InMemoryProgressRepository;
use crate::sync::service::ProgressService;

/// Main application struct wiring repositories, services and components
#[derive(Debug)]
pub struct Application {
    settings: Settings,
    initialized: bool,
    // Lifecycle order; stopped in reverse
    components: Vec<Arc<dyn KernelComponent>>,
    storage_manager: Arc<StorageManager>,
    state_manager: Arc<StateManager>,
    auth: AuthService,
    library: LibraryService,
    progress: ProgressService,
    stats: StatsService,
}

impl Application {
    /// Build the application from validated settings. Nothing touches disk until [`start`](Self::start).
    pub fn new(settings: Settings) -> Result<Self> {
        settings.validate()?;
        log::info!(
            "Initializing {} v{} ({})",
            constants::APP_NAME,
            constants::APP_VERSION,
            settings.app.env
        );

        let storage_manager = Arc::new(StorageManager::from_settings(&settings.book_storage));
        let book_storage = storage_manager.storage().clone();
        log::info!("Using '{}' book storage", book_storage.name());

        let users = Arc::new(InMemoryUserRepository::new());
        let books = Arc::new(InMemoryBookRepository::new());
        let progress = Arc::new(InMemoryProgressRepository::new());

        let state_path = settings.app.data_path.join(constants::STATE_FILE_NAME);
        log::info!("Using state file: {}", state_path.display());
        let state_manager = Arc::new(StateManager::new(
            state_path,
            users.clone(),
            books.clone(),
            progress.clone(),
        ));

        let auth = AuthService::new(users, settings.auth.clone());
        let library = LibraryService::new(books.clone(), book_storage, Arc::new(FilenameMetadataParser));
        let stats = StatsService::new(Arc::new(InMemoryStatsRepository::new(progress.clone(), books)));
        let progress = ProgressService::new(progress);

        let components: Vec<Arc<dyn KernelComponent>> = vec![
            storage_manager.clone() as Arc<dyn KernelComponent>,
            state_manager.clone(),
        ];

        Ok(Application {
            settings,
            initialized: false,
            components,
            storage_manager,
            state_manager,
            auth,
            library,
            progress,
            stats,
        })
    }

    /// Initialize, then start, every component in order.
    pub async fn start(&mut self) -> Result<()> {
        if self.initialized {
            return Err(Error::KernelLifecycleError {
                phase: KernelLifecyclePhase::RunPreCheck,
                component_name: None,
                message: "Application already started".to_string(),
                source: None,
            });
        }

        log::debug!("Initializing components...");
        for component in &self.components {
            log::debug!("Initializing component: {}", component.name());
            component.initialize().await.map_err(|e| {
                Self::lifecycle_error(
                    KernelLifecyclePhase::Initialize,
                    component.as_ref(),
                    "Component failed to initialize",
                    e,
                )
            })?;
        }

        log::debug!("Starting components...");
        for component in &self.components {
            log::debug!("Starting component: {}", component.name());
            component.start().await.map_err(|e| {
                Self::lifecycle_error(
                    KernelLifecyclePhase::Start,
                    component.as_ref(),
                    "Component failed to start",
                    e,
                )
            })?;
        }

        self.initialized = true;
        log::info!("Application started.");
        Ok(())
    }

    /// Stop every component in reverse order. The first failure is returned.
    pub async fn shutdown(&mut self) -> Result<()> {
        log::debug!("Shutting down components...");
        for component in self.components.iter().rev() {
            log::debug!("Stopping component: {}", component.name());
            if let Err(e) = component.stop().await {
                log::error!("Error stopping component {}: {}", component.name(), e);
                return Err(Self::lifecycle_error(
                    KernelLifecyclePhase::Shutdown,
                    component.as_ref(),
                    "Component failed to stop",
                    e,
                ));
            }
        }
        self.initialized = false;
        log::info!("Application stopped.");
        Ok(())
    }

    /// Save repository state without stopping.
    pub async fn persist(&self) -> Result<()> {
        self.state_manager.save().await
    }

    fn lifecycle_error(
        phase: KernelLifecyclePhase,
        component: &dyn KernelComponent,
        message: &str,
        source: Error,
    ) -> Error {
        Error::KernelLifecycleError {
            phase,
            component_name: Some(component.name().to_string()),
            message: message.to_string(),
            source: Some(Box::new(source)),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn auth(&self) -> &AuthService {
        &self.auth
    }

    pub fn library(&self) -> &LibraryService {
        &self.library
    }

    pub fn progress(&self) -> &ProgressService {
        &self.progress
    }

    pub fn stats(&self) -> &StatsService {
        &self.stats
    }

    pub fn book_storage(&self) -> &Arc<dyn BookStorage> {
        self.storage_manager.storage()
    }

    pub fn storage_manager(&self) -> &Arc<StorageManager> {
        &self.storage_manager
    }

    pub fn state_manager(&self) -> &Arc<StateManager> {
        &self.state_manager
    }
}
