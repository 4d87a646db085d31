//! Per-request wishlist decoration of catalog listings

use crate::metadata::{ProductId, ProductRecord};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A product record decorated with the caller's wishlist flag.
///
/// The flag is always serialized, even when false, so anonymous and
/// authenticated listings share one shape.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ListedProduct {
    #[serde(flatten)]
    pub product: ProductRecord,
    pub wishlisted: bool,
}

/// Attach a wishlisted flag to every record.
///
/// Pure function: record order is preserved and nothing is mutated. With no
/// wishlist (anonymous caller, or an account without one) every flag is
/// false.
pub fn overlay_wishlist(
    products: Vec<ProductRecord>,
    wishlist: Option<&HashSet<ProductId>>,
) -> Vec<ListedProduct> {
    products
        .into_iter()
        .map(|product| {
            let wishlisted = wishlist.map_or(false, |w| w.contains(&product.id));
            ListedProduct {
                product,
                wishlisted,
            }
        })
        .collect()
}
