use thiserror::Error;

/// Input rejected before any write takes place
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Invalid pagination: page {page}, size {size} (both must be at least 1)")]
    InvalidPagination { page: u32, size: u32 },
}

/// Failures reported by the underlying SQLite store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Constraint violation: {details}")]
    ConstraintViolation { details: String },

    #[error("Query failed: {details}")]
    Query { details: String },

    #[error("Database connection closed")]
    ConnectionClosed,
}

/// General system errors
#[derive(Debug, Error)]
pub enum SystemError {
    #[error("Configuration error: {details}")]
    Configuration { details: String },
}

/// Main error type for the history store
#[derive(Debug, Error)]
pub enum HistoryStoreError {
    #[error("Validation error: {source}")]
    Validation {
        #[from]
        source: ValidationError,
    },

    #[error("Store error: {source}")]
    Store {
        #[from]
        source: StoreError,
    },

    #[error("System error: {source}")]
    System {
        #[from]
        source: SystemError,
    },
}

impl HistoryStoreError {
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    pub fn is_constraint_violation(&self) -> bool {
        matches!(
            self,
            Self::Store {
                source: StoreError::ConstraintViolation { .. }
            }
        )
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, HistoryStoreError>;
