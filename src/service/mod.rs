//service/mod.rs
pub mod download_service;
pub mod sweeper;
pub mod wishlist;

use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

use crate::auth::Identity;
use crate::blobs::BlobStore;
use crate::error::{CatalogError, CatalogResult};
use crate::metadata::{MetadataStore, ProductId, ProductRecord, DEFAULT_PRODUCT_TYPE};
use crate::service::wishlist::{overlay_wishlist, ListedProduct};
use crate::users::UserDirectory;
use bytes::Bytes;
use uuid::Uuid;

/// A binary payload handed in alongside product metadata
#[derive(Debug, Clone, PartialEq)]
pub struct FilePayload {
    pub file_name: String,
    pub file_data: Bytes,
}

impl FilePayload {
    pub fn new(file_name: impl Into<String>, file_data: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            file_data: file_data.into(),
        }
    }
}

/// Payload disposition for an update.
///
/// "Not provided" must leave the stored file untouched, which is distinct
/// from explicitly clearing it, so a plain Option cannot express an update's
/// intent.
#[derive(Debug, Clone, PartialEq)]
pub enum PayloadChange {
    /// Leave any existing payload untouched
    Keep,
    /// Upsert the payload to the supplied file
    Set(FilePayload),
    /// Remove any existing payload
    Clear,
}

/// Caller-supplied fields for creating a product
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductDraft {
    pub title: Option<String>,
    pub description: Option<String>,
    pub features: Vec<String>,
    pub images: Vec<String>,
    pub price: Option<f64>,
    pub category: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

fn text_missing(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}

impl ProductDraft {
    /// Check that every required field is present and usable
    fn validate(&self) -> CatalogResult<()> {
        let mut missing = Vec::new();
        if text_missing(&self.title) {
            missing.push("title");
        }
        if text_missing(&self.description) {
            missing.push("description");
        }
        if self.images.is_empty() {
            missing.push("images");
        }
        if self.price.is_none() {
            missing.push("price");
        }
        if text_missing(&self.category) {
            missing.push("category");
        }

        if !missing.is_empty() {
            return Err(CatalogError::Validation(format!(
                "missing required fields: {}",
                missing.join(", ")
            )));
        }

        if let Some(price) = self.price {
            // The artifact has no representation for NaN or infinity;
            // serializing one would leave a document that no longer parses
            if !price.is_finite() {
                return Err(CatalogError::Validation(
                    "price must be a finite number".to_string(),
                ));
            }
            if price < 0.0 {
                return Err(CatalogError::Validation(
                    "price must not be negative".to_string(),
                ));
            }
        }

        Ok(())
    }
}

/// Caller-supplied field changes for an update.
///
/// Absent fields leave the stored value untouched. There is no id field:
/// the id is immutable no matter what the caller sends.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub features: Option<Vec<String>>,
    pub images: Option<Vec<String>>,
    pub price: Option<f64>,
    pub category: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

impl ProductPatch {
    /// Check that the supplied fields can be persisted; same finiteness
    /// rule on price as at creation
    fn validate(&self) -> CatalogResult<()> {
        if let Some(price) = self.price {
            if !price.is_finite() {
                return Err(CatalogError::Validation(
                    "price must be a finite number".to_string(),
                ));
            }
        }
        Ok(())
    }

    fn apply_to(&self, record: &mut ProductRecord) {
        if let Some(title) = &self.title {
            record.title = title.clone();
        }
        if let Some(description) = &self.description {
            record.description = description.clone();
        }
        if let Some(features) = &self.features {
            record.features = features.clone();
        }
        if let Some(images) = &self.images {
            record.images = images.clone();
        }
        if let Some(price) = self.price {
            record.price = price;
        }
        if let Some(category) = &self.category {
            record.category = category.clone();
        }
        if let Some(kind) = &self.kind {
            record.kind = kind.clone();
        }
    }
}

/// Coordinates compound catalog operations across the metadata artifact and
/// the blob store.
///
/// Every mutating operation is a full-collection read-modify-write of the
/// artifact, so all of them serialize through one writer lock; two
/// interleaved writers would silently lose one writer's change. Within an
/// operation the blob step always runs before the metadata write: a crash
/// between the two leaves an unreferenced blob rather than metadata pointing
/// at a missing file. Blob mutations are never rolled back after a metadata
/// failure.
pub struct CatalogService {
    metadata: Arc<dyn MetadataStore>,
    blobs: Arc<dyn BlobStore>,
    users: Arc<dyn UserDirectory>,
    write_lock: Arc<Mutex<()>>,
}

impl CatalogService {
    pub fn new(
        metadata: Arc<dyn MetadataStore>,
        blobs: Arc<dyn BlobStore>,
        users: Arc<dyn UserDirectory>,
    ) -> Self {
        Self {
            metadata,
            blobs,
            users,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Handle to the writer lock, shared with maintenance tasks that must
    /// not observe the store between a blob write and its metadata write
    pub fn write_lock(&self) -> Arc<Mutex<()>> {
        self.write_lock.clone()
    }

    /// List the catalog with per-record wishlist flags.
    ///
    /// Lock-free: readers only ever see fully written artifacts. An
    /// unparsable artifact degrades to an empty listing here instead of
    /// failing the request; mutating operations surface the same condition
    /// as an error.
    pub fn list_catalog(&self, identity: Option<&Identity>) -> CatalogResult<Vec<ListedProduct>> {
        if let Some(identity) = identity {
            log_mdc::insert("user", &identity.user_id);
        }
        debug!(
            "Listing catalog, authenticated: {}",
            identity.is_some()
        );

        let products = match self.metadata.read_all() {
            Ok(products) => products,
            Err(CatalogError::CorruptStore(detail)) => {
                warn!("Catalog artifact unparsable, serving empty listing: {}", detail);
                Vec::new()
            }
            Err(e) => return Err(e),
        };

        let wishlist = match identity {
            Some(identity) => match self.users.find_user(&identity.user_id) {
                Ok(user) => Some(user.wishlist),
                Err(CatalogError::NotFound(_)) => {
                    warn!(
                        "No account found for authenticated user {}, listing without wishlist",
                        identity.user_id
                    );
                    None
                }
                Err(e) => return Err(e),
            },
            None => None,
        };

        Ok(overlay_wishlist(products, wishlist.as_ref()))
    }

    /// Create a product, storing its payload first when one is supplied.
    ///
    /// The new record is inserted at the front of the collection so the
    /// newest product displays first.
    pub fn add_product(
        &self,
        draft: ProductDraft,
        payload: Option<FilePayload>,
    ) -> CatalogResult<ProductRecord> {
        draft.validate()?;

        let _guard = self.write_lock.lock().unwrap();

        let product_id = Uuid::new_v4().to_string();
        debug!("Adding product {} ({:?})", product_id, draft.title);

        let downloadable_file_name = match &payload {
            Some(payload) => {
                self.blobs
                    .put(&product_id, &payload.file_name, &payload.file_data)
                    .map_err(|e| {
                        error!("Blob write failed for new product {}: {}", product_id, e);
                        e
                    })?;
                Some(payload.file_name.clone())
            }
            None => None,
        };

        let mut records = self.metadata.read_all()?;

        let record = ProductRecord {
            id: product_id.clone(),
            title: draft.title.unwrap_or_default(),
            description: draft.description.unwrap_or_default(),
            features: draft.features,
            images: draft.images,
            price: draft.price.unwrap_or_default(),
            category: draft.category.unwrap_or_default(),
            kind: draft.kind.unwrap_or_else(|| DEFAULT_PRODUCT_TYPE.to_string()),
            downloadable_file_name,
        };

        records.insert(0, record.clone());
        self.metadata.write_all(&records).map_err(|e| {
            error!(
                "Metadata write failed after blob step for product {}: {}",
                product_id, e
            );
            e
        })?;

        info!("Added product {} to catalog", product_id);
        Ok(record)
    }

    /// Update a product's fields and payload.
    ///
    /// The blob step (put or delete) runs before the metadata write, and
    /// only after the id is known to exist.
    pub fn update_product(
        &self,
        product_id: &str,
        patch: ProductPatch,
        payload: PayloadChange,
    ) -> CatalogResult<ProductRecord> {
        patch.validate()?;

        let _guard = self.write_lock.lock().unwrap();
        debug!("Updating product {}", product_id);

        let mut records = self.metadata.read_all()?;
        let position = records
            .iter()
            .position(|r| r.id == product_id)
            .ok_or_else(|| {
                warn!("Update requested for unknown product {}", product_id);
                CatalogError::NotFound(format!("no product with id {}", product_id))
            })?;

        match &payload {
            PayloadChange::Keep => {}
            PayloadChange::Set(payload) => {
                self.blobs
                    .put(product_id, &payload.file_name, &payload.file_data)
                    .map_err(|e| {
                        error!("Blob upsert failed for product {}: {}", product_id, e);
                        e
                    })?;
            }
            PayloadChange::Clear => {
                self.blobs.delete(product_id).map_err(|e| {
                    error!("Blob delete failed for product {}: {}", product_id, e);
                    e
                })?;
            }
        }

        let record = &mut records[position];
        patch.apply_to(record);
        match payload {
            PayloadChange::Keep => {}
            PayloadChange::Set(payload) => {
                record.downloadable_file_name = Some(payload.file_name);
            }
            PayloadChange::Clear => {
                record.downloadable_file_name = None;
            }
        }

        let updated = records[position].clone();
        self.metadata.write_all(&records).map_err(|e| {
            error!(
                "Metadata write failed after blob step for product {}: {}",
                product_id, e
            );
            e
        })?;

        info!("Updated product {}", product_id);
        Ok(updated)
    }

    /// Delete a product and its payload. Deleting an absent id is a no-op.
    pub fn delete_product(&self, product_id: &str) -> CatalogResult<()> {
        let _guard = self.write_lock.lock().unwrap();
        debug!("Deleting product {}", product_id);

        self.blobs.delete(product_id).map_err(|e| {
            error!("Blob delete failed for product {}: {}", product_id, e);
            e
        })?;

        let mut records = self.metadata.read_all()?;
        let before = records.len();
        records.retain(|r| r.id != product_id);

        if records.len() == before {
            debug!("Product {} not present in catalog, nothing to remove", product_id);
            return Ok(());
        }

        self.metadata.write_all(&records)?;
        info!("Deleted product {}", product_id);
        Ok(())
    }

    /// Delete several products in one metadata rewrite. Absent ids are
    /// silently ignored.
    pub fn delete_products(&self, product_ids: &[ProductId]) -> CatalogResult<()> {
        if product_ids.is_empty() {
            return Ok(());
        }

        let _guard = self.write_lock.lock().unwrap();
        debug!("Deleting {} products", product_ids.len());

        self.blobs.delete_many(product_ids).map_err(|e| {
            error!("Bulk blob delete failed: {}", e);
            e
        })?;

        let mut records = self.metadata.read_all()?;
        let before = records.len();
        records.retain(|r| !product_ids.contains(&r.id));

        if records.len() == before {
            debug!("No listed products matched the bulk delete");
            return Ok(());
        }

        self.metadata.write_all(&records)?;
        info!(
            "Bulk delete removed {} of {} requested products",
            before - records.len(),
            product_ids.len()
        );
        Ok(())
    }
}

// All coordinator unit tests live here; cross-store wiring is covered by
// the integration suite.
