//! Catalog Metadata Layer Abstraction
//!
//! This module provides an abstraction over the product metadata store,
//! allowing the engine to use different backings (JSON artifact on disk,
//! in-memory mock) without affecting higher-level services.

pub mod config;
pub mod json_store;
pub mod mock_store;

#[cfg(test)]
mod comprehensive_test;

use serde::{Deserialize, Serialize};

use crate::error::CatalogResult;

/// Product identifier type
pub type ProductId = String;

/// User identifier type
pub type UserId = String;

/// Classification tag applied when a product carries no explicit type
pub const DEFAULT_PRODUCT_TYPE: &str = "digital";

fn default_product_type() -> String {
    DEFAULT_PRODUCT_TYPE.to_string()
}

/// One product record as persisted in the catalog artifact.
///
/// Field order here is the serialization order, which the artifact relies on
/// for stable, reviewable diffs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    /// Opaque unique identifier, immutable after creation
    pub id: ProductId,
    /// Display title
    pub title: String,
    /// Display description
    pub description: String,
    /// Ordered feature bullet points, may be empty
    #[serde(default)]
    pub features: Vec<String>,
    /// Ordered image references, required non-empty
    pub images: Vec<String>,
    /// Non-negative price
    pub price: f64,
    /// Category tag
    pub category: String,
    /// Product type tag, defaults when the artifact omits it
    #[serde(rename = "type", default = "default_product_type")]
    pub kind: String,
    /// Name of the downloadable payload held in the blob store, if any
    pub downloadable_file_name: Option<String>,
}

/// Trait defining the catalog metadata store interface.
///
/// The store holds one ordered sequence of product records (order = display
/// order). `write_all` replaces the whole sequence; per-record mutation is
/// the coordinator's job.
pub trait MetadataStore: Send + Sync {
    /// Read the full ordered product sequence.
    ///
    /// A missing or empty backing artifact yields an empty sequence. An
    /// unparsable artifact fails with `CorruptStore`.
    fn read_all(&self) -> CatalogResult<Vec<ProductRecord>>;

    /// Atomically replace the full product sequence.
    ///
    /// On failure the previous content remains intact.
    fn write_all(&self, records: &[ProductRecord]) -> CatalogResult<()>;
}
