//! Mock blob store implementation for testing

use crate::blobs::{BlobStore, ProductBlob};
use crate::error::{CatalogError, CatalogResult};
use crate::metadata::ProductId;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// In-memory blob store.
///
/// Stores payloads in a mutex-guarded map and exposes failure toggles so
/// coordinator tests can inject blob-step faults, plus a deletion log for
/// asserting which keys were removed.
pub struct MockBlobStore {
    blobs: Arc<Mutex<HashMap<ProductId, (String, Bytes)>>>,
    deletion_log: Arc<Mutex<Vec<ProductId>>>,
    fail_puts: AtomicBool,
    fail_deletes: AtomicBool,
}

impl MockBlobStore {
    /// Create a new mock blob store
    pub fn new() -> Self {
        Self {
            blobs: Arc::new(Mutex::new(HashMap::new())),
            deletion_log: Arc::new(Mutex::new(Vec::new())),
            fail_puts: AtomicBool::new(false),
            fail_deletes: AtomicBool::new(false),
        }
    }

    /// Make every subsequent put fail with a persistence error
    pub fn set_fail_puts(&self, fail: bool) {
        self.fail_puts.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent delete fail with a persistence error
    pub fn set_fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    /// Clear all stored blobs and the deletion log
    pub fn clear(&self) {
        self.blobs.lock().unwrap().clear();
        self.deletion_log.lock().unwrap().clear();
    }

    /// Number of blobs currently stored
    pub fn blob_count(&self) -> usize {
        self.blobs.lock().unwrap().len()
    }

    /// Whether a payload exists for the given product
    pub fn contains(&self, product_id: &str) -> bool {
        self.blobs.lock().unwrap().contains_key(product_id)
    }

    /// Product ids that have been deleted so far, in deletion order
    pub fn deleted_ids(&self) -> Vec<ProductId> {
        self.deletion_log.lock().unwrap().clone()
    }
}

impl Default for MockBlobStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BlobStore for MockBlobStore {
    fn put(&self, product_id: &str, file_name: &str, data: &[u8]) -> CatalogResult<()> {
        if self.fail_puts.load(Ordering::SeqCst) {
            return Err(CatalogError::Persistence(
                "injected blob put failure".to_string(),
            ));
        }

        self.blobs.lock().unwrap().insert(
            product_id.to_string(),
            (file_name.to_string(), Bytes::copy_from_slice(data)),
        );
        Ok(())
    }

    fn get(&self, product_id: &str) -> CatalogResult<ProductBlob> {
        let blobs = self.blobs.lock().unwrap();
        let (file_name, file_data) = blobs.get(product_id).ok_or_else(|| {
            CatalogError::NotFound(format!("no blob stored for product {}", product_id))
        })?;

        Ok(ProductBlob {
            product_id: product_id.to_string(),
            file_name: file_name.clone(),
            file_data: file_data.clone(),
        })
    }

    fn delete(&self, product_id: &str) -> CatalogResult<()> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(CatalogError::Persistence(
                "injected blob delete failure".to_string(),
            ));
        }

        if self.blobs.lock().unwrap().remove(product_id).is_some() {
            self.deletion_log.lock().unwrap().push(product_id.to_string());
        }
        Ok(())
    }

    fn delete_many(&self, product_ids: &[ProductId]) -> CatalogResult<()> {
        for product_id in product_ids {
            self.delete(product_id)?;
        }
        Ok(())
    }

    fn list_ids(&self) -> CatalogResult<Vec<ProductId>> {
        Ok(self.blobs.lock().unwrap().keys().cloned().collect())
    }
}
