/// Integration module for the history store
///
/// Wires configuration, logging and the data-access repositories into the
/// facade the UI layer calls.

use anyhow::Context;
use data_access::{
    DatabaseConfig, DatabaseManager, DomainRepository, HistoryRepository, SqliteDomainRepository,
    SqliteHistoryRepository,
};
use history_store_core::errors::Result;
use history_store_core::types::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

pub mod application;
pub mod error_handler;
pub mod logger;

pub use application::Application;
pub use error_handler::{ErrorSeverity, ErrorStatistics, UnifiedErrorHandler};
pub use logger::{LoggerConfig, UnifiedLogger};

/// Environment variable overriding the database path
pub const ENV_DATABASE_PATH: &str = "HISTORY_STORE_DB";

/// Environment variable overriding the log level
pub const ENV_LOG_LEVEL: &str = "HISTORY_STORE_LOG";

/// Application configuration
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Database path; in-memory when unset
    pub database_path: Option<PathBuf>,

    /// Log level
    pub log_level: String,

    /// Page size used when the caller does not pick one
    pub default_page_size: u32,

    /// SQLite busy timeout
    pub busy_timeout_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            log_level: "info".to_string(),
            default_page_size: 20,
            busy_timeout_ms: 5_000,
        }
    }
}

impl AppConfig {
    /// Read a JSON configuration file; missing fields take their defaults
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Overlay `HISTORY_STORE_DB` and `HISTORY_STORE_LOG` when set
    pub fn from_env(self) -> Self {
        self.with_overrides(
            std::env::var_os(ENV_DATABASE_PATH).map(PathBuf::from),
            std::env::var(ENV_LOG_LEVEL).ok(),
        )
    }

    fn with_overrides(mut self, database_path: Option<PathBuf>, log_level: Option<String>) -> Self {
        if let Some(path) = database_path {
            self.database_path = Some(path);
        }
        if let Some(level) = log_level.filter(|l| !l.is_empty()) {
            self.log_level = level;
        }
        self
    }

    pub fn database_config(&self) -> DatabaseConfig {
        DatabaseConfig {
            path: self.database_path.clone(),
            busy_timeout_ms: self.busy_timeout_ms,
            ..DatabaseConfig::default()
        }
    }
}

/// Application context that holds all initialized components
pub struct AppContext {
    /// Database manager for data persistence
    pub database: Arc<DatabaseManager>,

    /// Domain registry
    domains: Arc<dyn DomainRepository>,

    /// History store
    history: Arc<dyn HistoryRepository>,

    /// Unified error handler
    pub error_handler: Arc<UnifiedErrorHandler>,

    /// Application configuration
    pub config: Arc<RwLock<AppConfig>>,
}

impl AppContext {
    /// Create a new application context with all components initialized
    pub async fn new(config: AppConfig) -> Result<Self> {
        info!("Initializing application context");

        let database = Arc::new(DatabaseManager::with_config(config.database_config()).await?);
        info!("Database initialized");

        let domain_registry = Arc::new(SqliteDomainRepository::new(database.connection()));
        let history = Arc::new(SqliteHistoryRepository::new(
            database.connection(),
            Arc::clone(&domain_registry),
        ));

        info!("Application context initialized successfully");

        Ok(Self {
            database,
            domains: domain_registry,
            history,
            error_handler: Arc::new(UnifiedErrorHandler::new()),
            config: Arc::new(RwLock::new(config)),
        })
    }

    pub fn history(&self) -> Arc<dyn HistoryRepository> {
        Arc::clone(&self.history)
    }

    pub fn domains(&self) -> Arc<dyn DomainRepository> {
        Arc::clone(&self.domains)
    }

    /// Record failures with the error handler before handing them back
    async fn track<T>(&self, context: &str, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            self.error_handler.handle_error(e, context).await;
        }
        result
    }

    pub async fn batch_insert(&self, items: &[NewHistoryEntry]) -> Result<BatchInsertReport> {
        let result = self.history.batch_insert(items).await;
        self.track("batch_insert", result).await
    }

    pub async fn select(&self, filter: &HistoryFilter) -> Result<Vec<HistoryWithDomain>> {
        let result = self.history.select(filter).await;
        self.track("select", result).await
    }

    pub async fn count(&self, filter: &CountFilter) -> Result<u64> {
        let result = self.history.count(filter).await;
        self.track("count", result).await
    }

    pub async fn pagination_select(&self, query: &PaginationQuery) -> Result<Paginated<HistoryWithDomain>> {
        let result = self.history.pagination_select(query).await;
        self.track("pagination_select", result).await
    }

    /// Page `page` at the configured default size
    pub async fn page(&self, keyword: Option<String>, page: u32) -> Result<Paginated<HistoryWithDomain>> {
        let size = self.config.read().await.default_page_size;
        let query = PaginationQuery { keyword, page, size };
        self.pagination_select(&query).await
    }

    pub async fn list_domains(&self) -> Result<Vec<Domain>> {
        let result = self.domains.select().await;
        self.track("list_domains", result).await
    }

    pub async fn update_domain(&self, id: DomainId, update: &DomainUpdate) -> Result<bool> {
        let result = self.domains.update(id, update).await;
        self.track("update_domain", result).await
    }

    /// Get application statistics
    pub async fn get_stats(&self) -> Result<AppStatistics> {
        let total_domains = self.domains.count().await?;
        let total_history = self.history.count(&CountFilter::default()).await?;
        Ok(AppStatistics {
            total_domains,
            total_history,
        })
    }

    /// Shutdown all components gracefully
    pub async fn shutdown(&self) -> Result<()> {
        info!("Shutting down application context");
        let stats = self.error_handler.get_error_stats().await;
        if stats.total > 0 {
            info!(
                total = stats.total,
                critical = stats.critical,
                "Errors recorded during session"
            );
        }
        info!("Application context shutdown complete");
        Ok(())
    }
}

/// Application statistics
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppStatistics {
    pub total_domains: u64,
    pub total_history: u64,
}
