//! Data Access Layer for the browser history store
//!
//! Visited URLs are grouped by registrable domain and persisted in SQLite.
//! Reads are filtered, paginated and come back with their domain embedded.

pub mod color;
pub mod domain;
pub mod history;
pub mod pattern;
mod query;
pub mod repository;
pub mod schema;
pub mod transaction;

pub use domain::SqliteDomainRepository;
pub use history::SqliteHistoryRepository;
pub use repository::*;

use history_store_core::*;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio_rusqlite::Connection;
use tracing::{debug, info};

/// Connection settings for [`DatabaseManager`]
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct DatabaseConfig {
    /// Database file; `None` opens an in-memory database
    pub path: Option<PathBuf>,

    /// How long a statement waits on a locked database
    pub busy_timeout_ms: u64,

    /// Use WAL journaling for file databases
    pub enable_wal: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: None,
            busy_timeout_ms: 5_000,
            enable_wal: true,
        }
    }
}

impl DatabaseConfig {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::default()
        }
    }
}

/// Database manager for handling the SQLite connection
pub struct DatabaseManager {
    connection: Arc<Connection>,
}

impl DatabaseManager {
    /// Open (or create) the database file at `db_path`
    pub async fn new(db_path: impl Into<PathBuf>) -> Result<Self> {
        Self::with_config(DatabaseConfig::file(db_path)).await
    }

    /// Create an in-memory database (for testing)
    pub async fn in_memory() -> Result<Self> {
        Self::with_config(DatabaseConfig::default()).await
    }

    pub async fn with_config(config: DatabaseConfig) -> Result<Self> {
        let connection = match &config.path {
            Some(path) => Connection::open(path).await,
            None => Connection::open_in_memory().await,
        }
        .map_err(|e| SystemError::Configuration {
            details: format!("Failed to open database: {}", e),
        })?;

        let manager = Self {
            connection: Arc::new(connection),
        };

        manager.configure(&config).await?;
        manager.initialize_schema().await?;

        info!(path = ?config.path, "History database ready");
        Ok(manager)
    }

    async fn configure(&self, config: &DatabaseConfig) -> Result<()> {
        let busy_timeout = Duration::from_millis(config.busy_timeout_ms);
        let wal = config.enable_wal && config.path.is_some();

        transaction::run(&self.connection, "configure", move |conn| {
            conn.busy_timeout(busy_timeout)?;
            if wal {
                let mode: String = conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))?;
                debug!(journal_mode = %mode, "Journal mode set");
            }
            Ok(())
        })
        .await
    }

    /// Initialize database schema
    async fn initialize_schema(&self) -> Result<()> {
        transaction::run(&self.connection, "initialize_schema", |conn| {
            conn.execute_batch(schema::SCHEMA_SQL)
        })
        .await
    }

    /// Get the connection for repository operations
    pub fn connection(&self) -> Arc<Connection> {
        Arc::clone(&self.connection)
    }

    pub fn domain_repository(&self) -> SqliteDomainRepository {
        SqliteDomainRepository::new(self.connection())
    }

    pub fn history_repository(&self) -> SqliteHistoryRepository {
        SqliteHistoryRepository::new(self.connection(), Arc::new(self.domain_repository()))
    }

    /// Run `op` atomically on the connection thread
    pub async fn transaction<T, F>(&self, label: &'static str, op: F) -> Result<T>
    where
        F: FnOnce(&rusqlite::Transaction<'_>) -> rusqlite::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        transaction::run_in_transaction(&self.connection, label, op).await
    }
}
