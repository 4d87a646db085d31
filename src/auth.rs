//! Token verification and request identity resolution

use crate::error::{CatalogError, CatalogResult};
use crate::metadata::UserId;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Role attached to an authenticated caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

/// Resolved identity of an authenticated caller
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Identity {
    /// User ID
    pub user_id: UserId,
    /// Email the account was registered with
    pub email: String,
    /// Granted role
    pub role: Role,
}

impl Identity {
    /// Create a regular user identity
    pub fn user(user_id: impl Into<UserId>, email: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            email: email.into(),
            role: Role::User,
        }
    }

    /// Create an admin identity
    pub fn admin(user_id: impl Into<UserId>, email: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            email: email.into(),
            role: Role::Admin,
        }
    }

    /// Whether this identity carries the admin role
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Maps an opaque token string to the identity it was issued for.
///
/// Token issuance lives outside this crate; implementations only answer
/// "who does this token belong to", returning None for anything unknown,
/// expired, or malformed.
pub trait TokenVerifier: Send + Sync {
    fn verify(&self, token: &str) -> Option<Identity>;
}

/// Verifier backed by a fixed token table.
///
/// Used for tests and single-node deployments where tokens are provisioned
/// out of band.
pub struct StaticTokenVerifier {
    tokens: Mutex<HashMap<String, Identity>>,
}

impl StaticTokenVerifier {
    pub fn new() -> Self {
        Self {
            tokens: Mutex::new(HashMap::new()),
        }
    }

    /// Register a token for the given identity, replacing any previous holder
    pub fn register(&self, token: impl Into<String>, identity: Identity) {
        self.tokens.lock().unwrap().insert(token.into(), identity);
    }

    /// Remove a token so it no longer verifies
    pub fn revoke(&self, token: &str) {
        self.tokens.lock().unwrap().remove(token);
    }
}

impl Default for StaticTokenVerifier {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenVerifier for StaticTokenVerifier {
    fn verify(&self, token: &str) -> Option<Identity> {
        self.tokens.lock().unwrap().get(token).cloned()
    }
}

/// Extract the token from an Authorization header value.
/// Per RFC 6750, the "Bearer" scheme is case-insensitive. The value is not
/// guaranteed to be ASCII, so the scheme is compared on bytes.
pub fn extract_bearer_token(header_value: &str) -> Option<&str> {
    let scheme_ok = header_value
        .as_bytes()
        .get(..7)
        .map_or(false, |prefix| prefix.eq_ignore_ascii_case(b"bearer "));
    if !scheme_ok {
        return None;
    }

    // The matched prefix is ASCII, so byte 7 is a char boundary
    let token = header_value[7..].trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

/// Authentication gate sitting in front of every catalog operation.
///
/// All operations funnel through [`identify`](AuthGate::identify); the
/// mandatory variants layer error mapping on top so callers never branch on
/// Option themselves.
pub struct AuthGate {
    verifier: Arc<dyn TokenVerifier>,
}

impl AuthGate {
    pub fn new(verifier: Arc<dyn TokenVerifier>) -> Self {
        Self { verifier }
    }

    /// Soft identification: resolve a token if one is present and valid.
    ///
    /// Absent, malformed, and unknown tokens all come back as None so public
    /// operations can proceed anonymously.
    pub fn identify(&self, authorization: Option<&str>) -> Option<Identity> {
        let token = extract_bearer_token(authorization?)?;
        match self.verifier.verify(token) {
            Some(identity) => {
                log_mdc::insert("user", &identity.user_id);
                debug!("Resolved identity for user: {}", identity.user_id);
                Some(identity)
            }
            None => {
                warn!("Rejected unrecognized bearer token");
                None
            }
        }
    }

    /// Mandatory identification: the caller must present a valid token
    pub fn require(&self, authorization: Option<&str>) -> CatalogResult<Identity> {
        self.identify(authorization)
            .ok_or(CatalogError::Unauthenticated)
    }

    /// Mandatory identification plus the admin role
    pub fn require_admin(&self, authorization: Option<&str>) -> CatalogResult<Identity> {
        let identity = self.require(authorization)?;
        if identity.is_admin() {
            Ok(identity)
        } else {
            warn!(
                "User {} attempted an admin-only operation",
                identity.user_id
            );
            Err(CatalogError::Unauthorized(format!(
                "user {} lacks the admin role",
                identity.user_id
            )))
        }
    }
}
