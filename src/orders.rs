//! Read-side interface to orders consumed by download resolution

use crate::error::{CatalogError, CatalogResult};
use crate::metadata::{ProductId, UserId};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;

/// Lifecycle states of an order.
///
/// The lifecycle itself is driven by the checkout system; this crate only
/// reads the state when resolving downloads. Serialized as the display
/// strings the checkout system writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    Pending,
    #[serde(rename = "Pending Payment")]
    PendingPayment,
    Processing,
    Delivered,
    Failed,
    #[serde(rename = "Refund Accepted")]
    RefundAccepted,
    Refunded,
    Cancelled,
}

/// Serde codec for binary payloads embedded in order documents as base64
mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    use bytes::Bytes;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(data: &Bytes, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(data))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Bytes, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map(Bytes::from)
            .map_err(serde::de::Error::custom)
    }
}

/// A deliverable file: the terminal value of download resolution
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DownloadableFile {
    /// Name the file should be saved under
    pub file_name: String,
    /// Raw payload bytes
    #[serde(with = "base64_bytes")]
    pub file_data: Bytes,
}

impl DownloadableFile {
    pub fn new(file_name: impl Into<String>, file_data: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            file_data: file_data.into(),
        }
    }
}

/// Order data the download resolver needs.
///
/// Orders are created and mutated by the checkout surface, which is out of
/// scope here; the resolver treats them as read-only input.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Order ID
    pub order_id: String,
    /// Id of the user the order belongs to
    pub user_id: UserId,
    /// Current lifecycle state
    pub status: OrderStatus,
    /// Order-specific payload overriding catalog lookup
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub downloadable_file: Option<DownloadableFile>,
    /// Whether the order references catalog products
    #[serde(default)]
    pub is_product_order: bool,
    /// Referenced product ids, in purchase order
    #[serde(default)]
    pub product_ids: Vec<ProductId>,
    /// When the order was placed
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Create a product order referencing catalog ids
    pub fn product_order(
        order_id: impl Into<String>,
        user_id: impl Into<UserId>,
        product_ids: Vec<ProductId>,
    ) -> Self {
        Self {
            order_id: order_id.into(),
            user_id: user_id.into(),
            status: OrderStatus::Delivered,
            downloadable_file: None,
            is_product_order: true,
            product_ids,
            created_at: Utc::now(),
        }
    }

    /// Attach an order-specific payload
    pub fn with_downloadable_file(mut self, file: DownloadableFile) -> Self {
        self.downloadable_file = Some(file);
        self
    }
}

/// Lookup interface for orders
pub trait OrderDirectory: Send + Sync {
    /// Find an order by id, NotFound if no such order exists
    fn find_order(&self, order_id: &str) -> CatalogResult<Order>;
}

/// Directory backed by an in-process map, for tests and single-node use
pub struct InMemoryOrderDirectory {
    orders: Mutex<HashMap<String, Order>>,
}

impl InMemoryOrderDirectory {
    pub fn new() -> Self {
        Self {
            orders: Mutex::new(HashMap::new()),
        }
    }

    /// Insert or replace an order record
    pub fn upsert(&self, order: Order) {
        self.orders
            .lock()
            .unwrap()
            .insert(order.order_id.clone(), order);
    }
}

impl Default for InMemoryOrderDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderDirectory for InMemoryOrderDirectory {
    fn find_order(&self, order_id: &str) -> CatalogResult<Order> {
        self.orders
            .lock()
            .unwrap()
            .get(order_id)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(format!("no order with id {}", order_id)))
    }
}
