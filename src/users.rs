//! Read-side interface to user accounts consumed by catalog listings

use crate::error::{CatalogError, CatalogResult};
use crate::metadata::{ProductId, UserId};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// Account data the catalog needs about a user.
///
/// Account lifecycle (registration, password handling) is owned elsewhere;
/// this crate only reads the wishlist when decorating listings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    /// User ID
    pub user_id: UserId,
    /// Email the account was registered with
    pub email: String,
    /// Product ids the user has wishlisted
    #[serde(default)]
    pub wishlist: HashSet<ProductId>,
}

impl UserRecord {
    pub fn new(user_id: impl Into<UserId>, email: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            email: email.into(),
            wishlist: HashSet::new(),
        }
    }

    /// Add a product id to the wishlist
    pub fn with_wishlisted(mut self, product_id: impl Into<ProductId>) -> Self {
        self.wishlist.insert(product_id.into());
        self
    }
}

/// Lookup interface for user accounts
pub trait UserDirectory: Send + Sync {
    /// Find a user by id, NotFound if no such account exists
    fn find_user(&self, user_id: &str) -> CatalogResult<UserRecord>;
}

/// Directory backed by an in-process map, for tests and single-node use
pub struct InMemoryUserDirectory {
    users: Mutex<HashMap<UserId, UserRecord>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self {
            users: Mutex::new(HashMap::new()),
        }
    }

    /// Insert or replace a user record
    pub fn upsert(&self, user: UserRecord) {
        self.users
            .lock()
            .unwrap()
            .insert(user.user_id.clone(), user);
    }

    /// Number of users in the directory
    pub fn user_count(&self) -> usize {
        self.users.lock().unwrap().len()
    }
}

impl Default for InMemoryUserDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl UserDirectory for InMemoryUserDirectory {
    fn find_user(&self, user_id: &str) -> CatalogResult<UserRecord> {
        self.users
            .lock()
            .unwrap()
            .get(user_id)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(format!("no user with id {}", user_id)))
    }
}
