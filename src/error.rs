//! Catalog error types.

/// Error type covering every failure the catalog surface can report.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("unauthenticated")]
    Unauthenticated,

    #[error("persistence failure: {0}")]
    Persistence(String),

    #[error("catalog artifact unparsable: {0}")]
    CorruptStore(String),

    #[error("no deliverable: {0}")]
    NoDeliverable(String),
}

impl CatalogError {
    /// Stable kind code for programmatic handling.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::NotFound(_) => "not_found",
            Self::Forbidden(_) => "forbidden",
            Self::Unauthorized(_) => "unauthorized",
            Self::Unauthenticated => "unauthenticated",
            Self::Persistence(_) => "persistence",
            Self::CorruptStore(_) => "corrupt_store",
            Self::NoDeliverable(_) => "no_deliverable",
        }
    }
}

impl From<std::io::Error> for CatalogError {
    fn from(e: std::io::Error) -> Self {
        CatalogError::Persistence(e.to_string())
    }
}

impl From<rusqlite::Error> for CatalogError {
    fn from(e: rusqlite::Error) -> Self {
        CatalogError::Persistence(e.to_string())
    }
}

/// Result type for catalog operations.
pub type CatalogResult<T> = std::result::Result<T, CatalogError>;
