//! Configuration for blob store backend selection

use crate::blobs::mock_store::MockBlobStore;
use crate::blobs::sqlite_store::SqliteBlobStore;
use crate::blobs::BlobStore;
use crate::error::CatalogResult;
use log::{info, warn};
use std::str::FromStr;
use std::sync::Arc;

/// Supported blob store backends
#[derive(Debug, Clone, PartialEq)]
pub enum BlobStoreBackend {
    /// SQLite-backed store (default)
    Sqlite,
    /// In-memory mock store for testing
    Mock,
}

impl Default for BlobStoreBackend {
    fn default() -> Self {
        BlobStoreBackend::Sqlite
    }
}

impl FromStr for BlobStoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sqlite" | "sql" => Ok(BlobStoreBackend::Sqlite),
            "mock" | "memory" => Ok(BlobStoreBackend::Mock),
            _ => Err(format!("Unknown blob store backend: {}", s)),
        }
    }
}

/// Factory configuration for creating blob stores
#[derive(Debug, Clone, Default)]
pub struct BlobFactoryConfig {
    pub backend: BlobStoreBackend,
}

impl BlobFactoryConfig {
    /// Load configuration from the BLOB_BACKEND environment variable
    pub fn from_env() -> Self {
        let backend = match std::env::var("BLOB_BACKEND") {
            Ok(value) => match BlobStoreBackend::from_str(&value) {
                Ok(backend) => {
                    info!("Blob store backend from environment: {:?}", backend);
                    backend
                }
                Err(e) => {
                    warn!("{}, falling back to default backend", e);
                    BlobStoreBackend::default()
                }
            },
            Err(_) => BlobStoreBackend::default(),
        };

        Self { backend }
    }

    /// Create a blob store instance for the configured backend
    pub fn create_store(&self) -> CatalogResult<Arc<dyn BlobStore>> {
        match self.backend {
            BlobStoreBackend::Sqlite => {
                info!("Creating SQLite blob store");
                Ok(Arc::new(SqliteBlobStore::new(None)?))
            }
            BlobStoreBackend::Mock => {
                info!("Creating mock blob store");
                Ok(Arc::new(MockBlobStore::new()))
            }
        }
    }
}
