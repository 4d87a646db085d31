//! Environment-driven backend selection for the metadata store

use crate::error::CatalogResult;
use crate::metadata::{json_store::JsonMetadataStore, mock_store::MockMetadataStore, MetadataStore};
use log::{info, warn};
use std::env;
use std::sync::Arc;

/// Available metadata store backends
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogStoreBackend {
    Json,
    Mock,
}

impl Default for CatalogStoreBackend {
    fn default() -> Self {
        CatalogStoreBackend::Json
    }
}

impl std::str::FromStr for CatalogStoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" | "file" | "artifact" => Ok(CatalogStoreBackend::Json),
            "mock" => Ok(CatalogStoreBackend::Mock),
            _ => Err(format!("Unknown metadata backend: {}", s)),
        }
    }
}

/// Environment-driven metadata store configuration
#[derive(Debug, Clone, Default)]
pub struct MetadataFactoryConfig {
    pub backend: CatalogStoreBackend,
}

impl MetadataFactoryConfig {
    /// Create a configuration from the CATALOG_BACKEND environment variable
    pub fn from_env() -> Self {
        let backend = match env::var("CATALOG_BACKEND") {
            Ok(backend_str) => match backend_str.parse::<CatalogStoreBackend>() {
                Ok(backend) => {
                    info!("Using metadata backend from environment: {:?}", backend);
                    backend
                }
                Err(e) => {
                    warn!("Invalid metadata backend in environment: {}. Using default Json.", e);
                    CatalogStoreBackend::default()
                }
            },
            Err(_) => {
                info!("No metadata backend specified in environment, using default Json");
                CatalogStoreBackend::default()
            }
        };

        Self { backend }
    }

    /// Create a metadata store instance based on the configuration
    pub fn create_store(&self) -> CatalogResult<Arc<dyn MetadataStore>> {
        match self.backend {
            CatalogStoreBackend::Json => {
                info!("Creating JSON metadata store backend");
                Ok(Arc::new(JsonMetadataStore::new(None)?))
            }
            CatalogStoreBackend::Mock => {
                info!("Creating mock metadata store backend");
                Ok(Arc::new(MockMetadataStore::new()))
            }
        }
    }
}
