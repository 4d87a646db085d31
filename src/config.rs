//! Application Configuration
//!
//! This module provides configuration management for the catalog engine,
//! supporting YAML configuration files with sensible defaults.

use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Catalog metadata backend types
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum CatalogBackend {
    Json,
    Mock,
}

impl Default for CatalogBackend {
    fn default() -> Self {
        CatalogBackend::Json
    }
}

/// Blob storage backend types
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum BlobBackend {
    Sqlite,
    Mock,
}

impl Default for BlobBackend {
    fn default() -> Self {
        BlobBackend::Sqlite
    }
}

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Catalog metadata store configuration
    pub catalog: CatalogStoreConfig,
    /// Blob store configuration
    pub blobs: BlobStoreConfig,
    /// Orphan sweeper configuration
    pub sweeper: SweeperConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Catalog metadata store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogStoreConfig {
    /// Metadata backend type
    pub backend: CatalogBackend,
    /// Path to the product artifact document
    pub artifact_path: String,
}

/// Blob store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlobStoreConfig {
    /// Blob backend type
    pub backend: BlobBackend,
    /// Database file path
    pub db_path: String,
}

/// Orphan sweeper configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweeperConfig {
    /// Enable the background sweeper
    pub enabled: bool,
    /// Sweep interval in seconds
    pub sweep_interval: u64,
    /// Maximum number of orphan blobs removed per sweep
    pub batch_size: usize,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Path to log configuration file
    pub config_file: String,
}

impl AppConfig {
    /// Load configuration from file, use defaults if not found
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = "config.yaml";
        if Path::new(config_path).exists() {
            let content = fs::read_to_string(config_path)?;
            let config: AppConfig = serde_yaml::from_str(&content)?;
            info!("Loaded configuration from {}", config_path);
            Ok(config)
        } else {
            warn!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Create default configuration
    pub fn default() -> Self {
        Self {
            catalog: CatalogStoreConfig {
                backend: CatalogBackend::Json,
                artifact_path: "./data/products.json".to_string(),
            },
            blobs: BlobStoreConfig {
                backend: BlobBackend::Sqlite,
                db_path: "./data/blobs.sqlite".to_string(),
            },
            sweeper: SweeperConfig {
                enabled: false,
                sweep_interval: 300, // 5 minutes
                batch_size: 100,
            },
            logging: LoggingConfig {
                config_file: "catalog_log.yaml".to_string(),
            },
        }
    }
}

/// Initialize logging from the configured log4rs file
pub fn init_logging(config: &LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
    log4rs::init_file(&config.config_file, Default::default())?;
    info!("Logging initialized from {}", config.config_file);
    Ok(())
}
