/// Main application module
///
/// Provides high-level Application API

use crate::{AppConfig, AppContext, AppStatistics, LoggerConfig, UnifiedLogger};
use history_store_core::errors::{Result, SystemError};
use history_store_core::types::*;
use std::sync::Arc;
use tracing::info;

/// Main application
pub struct Application {
    /// Application context
    context: Arc<AppContext>,
}

impl Application {
    /// Create and initialize a new application
    ///
    /// `HISTORY_STORE_DB` and `HISTORY_STORE_LOG` override the matching fields.
    pub async fn new(config: AppConfig) -> Result<Self> {
        let config = config.from_env();

        // Initialize logging
        UnifiedLogger::init(LoggerConfig::with_level(config.log_level.clone())).map_err(|e| {
            SystemError::Configuration {
                details: e.to_string(),
            }
        })?;

        info!("Starting history store application");

        let context = Arc::new(AppContext::new(config).await?);

        info!("Application initialized successfully");

        Ok(Self { context })
    }

    /// Shutdown the application
    pub async fn shutdown(&self) -> Result<()> {
        info!("Shutting down application");
        self.context.shutdown().await?;
        info!("Application shutdown complete");
        Ok(())
    }

    /// Get application context
    pub fn context(&self) -> &Arc<AppContext> {
        &self.context
    }

    // High-level API methods

    /// Ingest newly visited URLs
    pub async fn record_visits(&self, items: &[NewHistoryEntry]) -> Result<BatchInsertReport> {
        self.context.batch_insert(items).await
    }

    /// Search history titles, one page at a time
    pub async fn search(&self, keyword: &str, page: u32) -> Result<Paginated<HistoryWithDomain>> {
        self.context.page(Some(keyword.to_string()), page).await
    }

    /// Visits to one domain within an exclusive time window
    pub async fn domain_timeline(
        &self,
        domain_id: DomainId,
        start: Option<i64>,
        end: Option<i64>,
    ) -> Result<Vec<HistoryWithDomain>> {
        let filter = HistoryFilter::default()
            .with_domain(domain_id)
            .with_range(start, end);
        self.context.select(&filter).await
    }

    /// Get application statistics
    pub async fn get_stats(&self) -> Result<AppStatistics> {
        self.context.get_stats().await
    }
}
