/// Unified error handler for centralized error management

use history_store_core::errors::{HistoryStoreError, StoreError};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, warn};

/// Error severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// The store is unusable
    Critical,
    /// An operation failed and was rolled back
    Error,
    /// Rejected input
    Warning,
}

/// Error entry for tracking
#[derive(Debug, Clone)]
pub struct ErrorEntry {
    pub error: String,
    pub severity: ErrorSeverity,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub context: String,
}

/// Unified error handler
pub struct UnifiedErrorHandler {
    /// Recent errors for reporting
    recent_errors: Arc<RwLock<Vec<ErrorEntry>>>,
    /// Maximum number of errors to keep
    max_errors: usize,
}

impl UnifiedErrorHandler {
    /// Create a new error handler
    pub fn new() -> Self {
        Self::with_capacity(100)
    }

    pub fn with_capacity(max_errors: usize) -> Self {
        Self {
            recent_errors: Arc::new(RwLock::new(Vec::new())),
            max_errors,
        }
    }

    /// Handle an error with automatic logging
    pub async fn handle_error(&self, error: &HistoryStoreError, context: &str) {
        let severity = Self::classify_error(error);

        match severity {
            ErrorSeverity::Critical => error!("CRITICAL ERROR in {}: {}", context, error),
            ErrorSeverity::Error => error!("ERROR in {}: {}", context, error),
            ErrorSeverity::Warning => warn!("WARNING in {}: {}", context, error),
        }

        let entry = ErrorEntry {
            error: error.to_string(),
            severity,
            timestamp: chrono::Utc::now(),
            context: context.to_string(),
        };

        self.add_error_entry(entry).await;
    }

    /// Classify error severity
    pub fn classify_error(error: &HistoryStoreError) -> ErrorSeverity {
        match error {
            HistoryStoreError::Validation { .. } => ErrorSeverity::Warning,
            HistoryStoreError::Store {
                source: StoreError::ConstraintViolation { .. },
            } => ErrorSeverity::Error,
            HistoryStoreError::Store { .. } => ErrorSeverity::Critical,
            HistoryStoreError::System { .. } => ErrorSeverity::Critical,
        }
    }

    /// Add an error entry to the history
    async fn add_error_entry(&self, entry: ErrorEntry) {
        let mut errors = self.recent_errors.write().await;
        errors.push(entry);

        // Keep only recent errors
        if errors.len() > self.max_errors {
            let excess = errors.len() - self.max_errors;
            errors.drain(0..excess);
        }
    }

    /// Get recent errors
    pub async fn get_recent_errors(&self) -> Vec<ErrorEntry> {
        self.recent_errors.read().await.clone()
    }

    /// Get error statistics
    pub async fn get_error_stats(&self) -> ErrorStatistics {
        let errors = self.recent_errors.read().await;

        let mut stats = ErrorStatistics {
            total: errors.len(),
            ..ErrorStatistics::default()
        };

        for error in errors.iter() {
            match error.severity {
                ErrorSeverity::Critical => stats.critical += 1,
                ErrorSeverity::Error => stats.errors += 1,
                ErrorSeverity::Warning => stats.warnings += 1,
            }
        }

        stats
    }

    /// Clear error history
    pub async fn clear_errors(&self) {
        self.recent_errors.write().await.clear();
    }
}

impl Default for UnifiedErrorHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Error statistics
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct ErrorStatistics {
    pub total: usize,
    pub critical: usize,
    pub errors: usize,
    pub warnings: usize,
}
