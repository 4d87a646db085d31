//! SQLite implementation of the blob store

use crate::blobs::{compute_checksum, BlobStore, ProductBlob};
use crate::config::BlobStoreConfig;
use crate::error::{CatalogError, CatalogResult};
use crate::metadata::ProductId;
use bytes::Bytes;
use log::{debug, error, info, warn};
use rusqlite::{params, Connection, OptionalExtension};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

fn default_db_path() -> PathBuf {
    match env::var("BLOB_DB_FILE") {
        Ok(path) => {
            info!("Using blob database path from environment: {}", path);
            PathBuf::from(path)
        }
        Err(_) => {
            warn!("Blob database location not defined in environment");
            let default_path = Path::new("data").join("blobs.sqlite");
            info!("Using default blob database path: {}", default_path.display());
            default_path
        }
    }
}

/// SQLite implementation of BlobStore
pub struct SqliteBlobStore {
    conn: Mutex<Connection>,
}

impl SqliteBlobStore {
    /// Open (or create) the blob database and ensure its schema exists
    pub fn new(config: Option<&BlobStoreConfig>) -> CatalogResult<Self> {
        let db_path = match config {
            Some(cfg) => PathBuf::from(&cfg.db_path),
            None => default_db_path(),
        };

        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(&db_path)?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS product_blobs (
                product_id TEXT PRIMARY KEY,
                file_name TEXT NOT NULL,
                file_data BLOB NOT NULL,
                checksum TEXT NOT NULL
            )",
            [],
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl BlobStore for SqliteBlobStore {
    fn put(&self, product_id: &str, file_name: &str, data: &[u8]) -> CatalogResult<()> {
        let checksum = compute_checksum(data);

        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO product_blobs (product_id, file_name, file_data, checksum)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(product_id) DO UPDATE SET
                 file_name = excluded.file_name,
                 file_data = excluded.file_data,
                 checksum = excluded.checksum",
            params![product_id, file_name, data, checksum],
        )?;

        debug!("Stored blob for product {} ({} bytes)", product_id, data.len());
        Ok(())
    }

    fn get(&self, product_id: &str) -> CatalogResult<ProductBlob> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT file_name, file_data, checksum FROM product_blobs WHERE product_id = ?1",
        )?;

        let row = stmt
            .query_row(params![product_id], |row| {
                let file_name: String = row.get(0)?;
                let file_data: Vec<u8> = row.get(1)?;
                let checksum: String = row.get(2)?;
                Ok((file_name, file_data, checksum))
            })
            .optional()?;

        let (file_name, file_data, checksum) = row.ok_or_else(|| {
            CatalogError::NotFound(format!("no blob stored for product {}", product_id))
        })?;

        let actual = compute_checksum(&file_data);
        if actual != checksum {
            error!(
                "Blob checksum mismatch for product {}: stored {}, computed {}",
                product_id, checksum, actual
            );
            return Err(CatalogError::Persistence(format!(
                "blob checksum mismatch for product {}",
                product_id
            )));
        }

        Ok(ProductBlob {
            product_id: product_id.to_string(),
            file_name,
            file_data: Bytes::from(file_data),
        })
    }

    fn delete(&self, product_id: &str) -> CatalogResult<()> {
        let conn = self.conn.lock().unwrap();
        let removed = conn.execute(
            "DELETE FROM product_blobs WHERE product_id = ?1",
            params![product_id],
        )?;

        debug!("Deleted blob for product {} (rows: {})", product_id, removed);
        Ok(())
    }

    fn delete_many(&self, product_ids: &[ProductId]) -> CatalogResult<()> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        for product_id in product_ids {
            tx.execute(
                "DELETE FROM product_blobs WHERE product_id = ?1",
                params![product_id],
            )?;
        }
        tx.commit()?;

        debug!("Deleted blobs for {} product ids", product_ids.len());
        Ok(())
    }

    fn list_ids(&self) -> CatalogResult<Vec<ProductId>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT product_id FROM product_blobs")?;

        let rows = stmt.query_map([], |row| {
            let product_id: String = row.get(0)?;
            Ok(product_id)
        })?;

        let mut ids = Vec::new();
        for row in rows {
            ids.push(row?);
        }
        Ok(ids)
    }
}
