/// Unified logger for centralized logging configuration

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Logger configuration
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    /// Log level or filter directive (trace, debug, info, warn, error)
    pub level: String,

    /// Include thread IDs
    pub include_thread_ids: bool,

    /// Include target module paths
    pub include_targets: bool,

    /// Colourise console output
    pub ansi: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            include_thread_ids: false,
            include_targets: true,
            ansi: true,
        }
    }
}

impl LoggerConfig {
    pub fn with_level(level: impl Into<String>) -> Self {
        Self {
            level: level.into(),
            ..Self::default()
        }
    }
}

/// Unified logger
pub struct UnifiedLogger;

impl UnifiedLogger {
    /// Initialize the global logger.
    ///
    /// `RUST_LOG` takes precedence over `config.level`. Returns `Ok(false)`
    /// when a global subscriber was already installed.
    pub fn init(config: LoggerConfig) -> std::result::Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        // Create filter
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&config.level))?;

        // Create console layer
        let console_layer = fmt::layer()
            .with_target(config.include_targets)
            .with_thread_ids(config.include_thread_ids)
            .with_ansi(config.ansi);

        // Build subscriber
        let subscriber = tracing_subscriber::registry()
            .with(filter)
            .with(console_layer);

        if tracing::subscriber::set_global_default(subscriber).is_err() {
            tracing::debug!("Global subscriber already installed");
            return Ok(false);
        }

        tracing::info!("Logging initialized with level: {}", config.level);

        Ok(true)
    }

    /// Initialize with default configuration
    pub fn init_default() -> std::result::Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        Self::init(LoggerConfig::default())
    }
}
