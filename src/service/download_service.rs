//! Resolution of which binary payload satisfies a delivered order

use crate::auth::Identity;
use crate::blobs::BlobStore;
use crate::error::{CatalogError, CatalogResult};
use crate::orders::{DownloadableFile, OrderDirectory};
use log::{debug, info, warn};
use std::sync::Arc;

/// Resolves download requests against order data and the blob store.
///
/// Precedence is strict, not best-effort: an order-specific payload always
/// wins, otherwise only the first referenced product id is consulted. Later
/// ids are never tried, even when the first has no blob.
pub struct DownloadService {
    orders: Arc<dyn OrderDirectory>,
    blobs: Arc<dyn BlobStore>,
}

impl DownloadService {
    pub fn new(orders: Arc<dyn OrderDirectory>, blobs: Arc<dyn BlobStore>) -> Self {
        Self { orders, blobs }
    }

    /// Resolve the deliverable file for an order.
    ///
    /// The caller must be the order's owner or an admin; anyone else gets
    /// Forbidden regardless of whether a deliverable exists.
    pub fn resolve_download(
        &self,
        order_id: &str,
        identity: &Identity,
    ) -> CatalogResult<DownloadableFile> {
        log_mdc::insert("user", &identity.user_id);
        debug!("Resolving download for order {}", order_id);

        let order = self.orders.find_order(order_id)?;

        if order.user_id != identity.user_id && !identity.is_admin() {
            warn!(
                "User {} denied download for order {} owned by {}",
                identity.user_id, order_id, order.user_id
            );
            return Err(CatalogError::Forbidden(format!(
                "order {} does not belong to the caller",
                order_id
            )));
        }

        // 1. An order-specific payload overrides any catalog lookup
        if let Some(file) = &order.downloadable_file {
            if !file.file_data.is_empty() {
                info!(
                    "Serving order-specific payload {} for order {}",
                    file.file_name, order_id
                );
                return Ok(file.clone());
            }
            debug!(
                "Order {} carries an empty payload, falling through to catalog lookup",
                order_id
            );
        }

        // 2. Product orders resolve only their first referenced id
        if order.is_product_order {
            if let Some(first_id) = order.product_ids.first() {
                return match self.blobs.get(first_id) {
                    Ok(blob) => {
                        info!(
                            "Serving catalog blob {} for order {} via product {}",
                            blob.file_name, order_id, first_id
                        );
                        Ok(DownloadableFile::new(blob.file_name, blob.file_data))
                    }
                    Err(CatalogError::NotFound(_)) => {
                        warn!(
                            "No blob stored for product {} referenced by order {}",
                            first_id, order_id
                        );
                        Err(CatalogError::NoDeliverable(format!(
                            "product {} has no stored payload",
                            first_id
                        )))
                    }
                    Err(e) => Err(e),
                };
            }
        }

        // 3. Nothing to serve
        Err(CatalogError::NoDeliverable(format!(
            "order {} has no deliverable file",
            order_id
        )))
    }
}
