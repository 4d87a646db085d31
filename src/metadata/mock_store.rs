//! Mock implementation of the catalog metadata store for testing

use crate::error::{CatalogError, CatalogResult};
use crate::metadata::{MetadataStore, ProductRecord};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// In-memory implementation of MetadataStore.
///
/// Holds the record sequence in a mutex-guarded vector and exposes failure
/// toggles so coordinator tests can inject metadata-write faults.
pub struct MockMetadataStore {
    records: Arc<Mutex<Vec<ProductRecord>>>,
    fail_writes: AtomicBool,
    corrupt: AtomicBool,
    write_count: AtomicUsize,
}

impl MockMetadataStore {
    /// Create a new mock metadata store
    pub fn new() -> Self {
        Self {
            records: Arc::new(Mutex::new(Vec::new())),
            fail_writes: AtomicBool::new(false),
            corrupt: AtomicBool::new(false),
            write_count: AtomicUsize::new(0),
        }
    }

    /// Make every subsequent write_all fail with a persistence error
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent read_all fail as if the artifact were unparsable
    pub fn set_corrupt(&self, corrupt: bool) {
        self.corrupt.store(corrupt, Ordering::SeqCst);
    }

    /// Clear all records (useful for test cleanup)
    pub fn clear(&self) {
        self.records.lock().unwrap().clear();
    }

    /// Number of records currently held
    pub fn record_count(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    /// Number of successful write_all calls so far
    pub fn write_count(&self) -> usize {
        self.write_count.load(Ordering::SeqCst)
    }
}

impl Default for MockMetadataStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MetadataStore for MockMetadataStore {
    fn read_all(&self) -> CatalogResult<Vec<ProductRecord>> {
        if self.corrupt.load(Ordering::SeqCst) {
            return Err(CatalogError::CorruptStore(
                "injected parse failure".to_string(),
            ));
        }
        Ok(self.records.lock().unwrap().clone())
    }

    fn write_all(&self, records: &[ProductRecord]) -> CatalogResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(CatalogError::Persistence(
                "injected write failure".to_string(),
            ));
        }
        *self.records.lock().unwrap() = records.to_vec();
        self.write_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
