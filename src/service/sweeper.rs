//! Background sweeper for orphaned blobs
//!
//! A blob becomes an orphan when a compound operation writes it but the
//! following metadata write never lands (crash or storage failure). Orphans
//! are a benign space leak, so they are reclaimed lazily here instead of
//! being rolled back inline.

use crate::blobs::BlobStore;
use crate::config::SweeperConfig;
use crate::error::CatalogResult;
use crate::metadata::MetadataStore;
use log::{debug, error, info};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time;

/// Background orphan-blob sweeper
pub struct OrphanSweeper {
    metadata: Arc<dyn MetadataStore>,
    blobs: Arc<dyn BlobStore>,
    write_lock: Arc<Mutex<()>>,
    sweep_interval: Duration,
    batch_size: usize,
}

impl OrphanSweeper {
    /// Create a sweeper sharing the coordinator's writer lock.
    ///
    /// The shared lock matters: without it a sweep could run between a
    /// compound operation's blob write and its metadata write and collect a
    /// blob that is about to be referenced.
    pub fn new(
        metadata: Arc<dyn MetadataStore>,
        blobs: Arc<dyn BlobStore>,
        write_lock: Arc<Mutex<()>>,
        config: &SweeperConfig,
    ) -> Self {
        Self {
            metadata,
            blobs,
            write_lock,
            sweep_interval: Duration::from_secs(config.sweep_interval),
            batch_size: config.batch_size,
        }
    }

    /// Start the sweeper as a background task (non-blocking)
    pub fn start_background(self) -> tokio::task::JoinHandle<()> {
        info!(
            "Starting orphan sweeper with {}s interval, batch size {}",
            self.sweep_interval.as_secs(),
            self.batch_size
        );

        tokio::spawn(async move {
            let mut interval = time::interval(self.sweep_interval);

            loop {
                interval.tick().await;

                match self.sweep() {
                    Ok(0) => {}
                    Ok(removed) => info!("Sweep reclaimed {} orphaned blobs", removed),
                    Err(e) => error!("Orphan sweep failed: {}", e),
                }
            }
        })
    }

    /// Run one sweep, removing up to batch_size unreferenced blobs.
    ///
    /// Returns the number of blobs removed.
    pub fn sweep(&self) -> CatalogResult<usize> {
        let _guard = self.write_lock.lock().unwrap();

        let stored_ids = self.blobs.list_ids()?;
        if stored_ids.is_empty() {
            return Ok(0);
        }

        let referenced: HashSet<String> = self
            .metadata
            .read_all()?
            .into_iter()
            .map(|record| record.id)
            .collect();

        let orphans: Vec<String> = stored_ids
            .into_iter()
            .filter(|id| !referenced.contains(id))
            .take(self.batch_size)
            .collect();

        if orphans.is_empty() {
            debug!("Sweep found no orphaned blobs");
            return Ok(0);
        }

        debug!("Sweep removing {} orphaned blobs", orphans.len());
        self.blobs.delete_many(&orphans)?;
        Ok(orphans.len())
    }
}
