//! Application State Management
//!
//! This module provides the application state that contains all services
//! and their dependencies, following the dependency injection pattern.

use log::{info, warn};
use std::sync::Arc;

use crate::auth::{AuthGate, StaticTokenVerifier};
use crate::blobs::{
    mock_store::MockBlobStore, sqlite_store::SqliteBlobStore, BlobStore,
};
use crate::config::{AppConfig, BlobBackend, CatalogBackend};
use crate::error::{CatalogError, CatalogResult};
use crate::metadata::{
    json_store::JsonMetadataStore, mock_store::MockMetadataStore, MetadataStore,
};
use crate::orders::InMemoryOrderDirectory;
use crate::service::download_service::DownloadService;
use crate::service::sweeper::OrphanSweeper;
use crate::service::CatalogService;
use crate::users::InMemoryUserDirectory;

/// Application state containing all services and their dependencies
#[derive(Clone)]
pub struct AppState {
    pub catalog_service: Arc<CatalogService>,
    pub download_service: Arc<DownloadService>,
    pub auth_gate: Arc<AuthGate>,
    pub token_verifier: Arc<StaticTokenVerifier>,
    pub users: Arc<InMemoryUserDirectory>,
    pub orders: Arc<InMemoryOrderDirectory>,
    pub metadata: Arc<dyn MetadataStore>,
    pub blobs: Arc<dyn BlobStore>,
    pub config: AppConfig,
}

impl AppState {
    /// Create a new application state with services configured from YAML config
    pub fn new() -> CatalogResult<Self> {
        let config = AppConfig::load().map_err(|e| {
            CatalogError::Persistence(format!("failed to load configuration: {}", e))
        })?;
        Self::from_config(config)
    }

    /// Create application state from configuration
    pub fn from_config(config: AppConfig) -> CatalogResult<Self> {
        info!("Initializing application state with configuration");

        // Create metadata backend based on configuration
        let metadata: Arc<dyn MetadataStore> = {
            match config.catalog.backend {
                CatalogBackend::Json => {
                    info!(
                        "Using JSON artifact metadata backend at {}",
                        config.catalog.artifact_path
                    );
                    Arc::new(JsonMetadataStore::new(Some(&config.catalog))?)
                }
                CatalogBackend::Mock => {
                    info!("Using mock metadata backend");
                    Arc::new(MockMetadataStore::new())
                }
            }
        };

        // Create blob backend based on configuration
        let blobs: Arc<dyn BlobStore> = {
            match config.blobs.backend {
                BlobBackend::Sqlite => {
                    info!("Using SQLite blob backend with db_path: {}", config.blobs.db_path);
                    Arc::new(SqliteBlobStore::new(Some(&config.blobs))?)
                }
                BlobBackend::Mock => {
                    info!("Using mock blob backend");
                    Arc::new(MockBlobStore::new())
                }
            }
        };

        let users = Arc::new(InMemoryUserDirectory::new());
        let orders = Arc::new(InMemoryOrderDirectory::new());
        let token_verifier = Arc::new(StaticTokenVerifier::new());

        // Create services with injected dependencies
        let catalog_service = Arc::new(CatalogService::new(
            metadata.clone(),
            blobs.clone(),
            users.clone(),
        ));
        let download_service = Arc::new(DownloadService::new(orders.clone(), blobs.clone()));
        let auth_gate = Arc::new(AuthGate::new(token_verifier.clone()));

        info!("Application state initialized successfully");
        Ok(Self {
            catalog_service,
            download_service,
            auth_gate,
            token_verifier,
            users,
            orders,
            metadata,
            blobs,
            config,
        })
    }

    /// Create application state for testing with mock backends
    pub fn new_for_testing() -> Self {
        let config = AppConfig::default();
        let metadata: Arc<dyn MetadataStore> = Arc::new(MockMetadataStore::new());
        let blobs: Arc<dyn BlobStore> = Arc::new(MockBlobStore::new());
        let users = Arc::new(InMemoryUserDirectory::new());
        let orders = Arc::new(InMemoryOrderDirectory::new());
        let token_verifier = Arc::new(StaticTokenVerifier::new());

        let catalog_service = Arc::new(CatalogService::new(
            metadata.clone(),
            blobs.clone(),
            users.clone(),
        ));
        let download_service = Arc::new(DownloadService::new(orders.clone(), blobs.clone()));
        let auth_gate = Arc::new(AuthGate::new(token_verifier.clone()));

        Self {
            catalog_service,
            download_service,
            auth_gate,
            token_verifier,
            users,
            orders,
            metadata,
            blobs,
            config,
        }
    }

    /// Start the orphan sweeper if enabled in configuration.
    ///
    /// The sweeper shares the catalog's writer lock, so it never observes a
    /// half-finished compound operation.
    pub fn start_sweeper(&self) -> Option<tokio::task::JoinHandle<()>> {
        if !self.config.sweeper.enabled {
            warn!("Orphan sweeper is disabled in configuration");
            return None;
        }

        let sweeper = OrphanSweeper::new(
            self.metadata.clone(),
            self.blobs.clone(),
            self.catalog_service.write_lock(),
            &self.config.sweeper,
        );
        Some(sweeper.start_background())
    }
}
