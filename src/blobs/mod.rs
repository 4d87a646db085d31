//! Blob Storage Layer Abstraction
//!
//! This module provides an abstraction over binary payload storage, keyed by
//! product identifier, allowing the engine to use different backends (SQLite,
//! in-memory mock) without affecting higher-level services.

pub mod config;
pub mod mock_store;
pub mod sqlite_store;


use bytes::Bytes;

use crate::error::CatalogResult;
use crate::metadata::ProductId;

/// One downloadable payload as held in the blob store
#[derive(Debug, Clone, PartialEq)]
pub struct ProductBlob {
    /// Owning product id, unique within the store
    pub product_id: ProductId,
    /// File name presented to the downloader
    pub file_name: String,
    /// Raw payload bytes
    pub file_data: Bytes,
}

/// Hex MD5 digest used to verify payload integrity
pub fn compute_checksum(data: &[u8]) -> String {
    let hash = md5::compute(data);
    format!("{:x}", hash)
}

/// Trait defining the blob store interface.
///
/// Keys are product ids; the store gives no ordering guarantees among them.
/// Referential integrity against the metadata store is not enforced here,
/// orphans are tolerated.
pub trait BlobStore: Send + Sync {
    /// Store a payload under the product id, overwriting any existing one
    fn put(&self, product_id: &str, file_name: &str, data: &[u8]) -> CatalogResult<()>;

    /// Retrieve the payload for a product, failing with `NotFound` if absent
    fn get(&self, product_id: &str) -> CatalogResult<ProductBlob>;

    /// Remove the payload for a product; removing an absent key is a no-op
    fn delete(&self, product_id: &str) -> CatalogResult<()>;

    /// Remove the payloads for every listed product id; absent keys are no-ops
    fn delete_many(&self, product_ids: &[ProductId]) -> CatalogResult<()>;

    /// List every product id currently holding a payload
    fn list_ids(&self) -> CatalogResult<Vec<ProductId>>;
}
