//! Application configuration management.
//!
//! Loads configuration from environment variables with sensible defaults.

use std::path::PathBuf;
use std::sync::OnceLock;

/// Global configuration instance.
static CONFIG: OnceLock<Config> = OnceLock::new();

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Root folder holding one directory per album.
    pub songs_dir: PathBuf,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
    /// Log format (json or pretty).
    pub log_format: LogFormat,
    /// Allowed CORS origins (comma-separated, or * for all).
    pub cors_origins: Vec<String>,
}

/// Log output format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable colored output.
    Pretty,
    /// JSON structured logging for production.
    Json,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Panics
    /// Panics if `PORT` is set but is not a valid port number.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .expect("PORT must be a valid u16");

        let songs_dir =
            PathBuf::from(std::env::var("SONGS_DIR").unwrap_or_else(|_| "./songs".to_string()));

        let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let log_format = match std::env::var("LOG_FORMAT")
            .unwrap_or_else(|_| "pretty".to_string())
            .to_lowercase()
            .as_str()
        {
            "json" => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        let cors_origins = parse_origins(
            &std::env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string()),
        );

        Self {
            host,
            port,
            songs_dir,
            log_level,
            log_format,
            cors_origins,
        }
    }

    /// Validate the configuration, creating the songs folder if it is missing.
    ///
    /// # Errors
    /// Returns an error if the songs folder is not a directory or cannot be created.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.songs_dir.exists() && !self.songs_dir.is_dir() {
            return Err(ConfigError::SongsFolderNotDirectory(
                self.songs_dir.display().to_string(),
            ));
        }

        if !self.songs_dir.exists() {
            std::fs::create_dir_all(&self.songs_dir).map_err(|e| {
                ConfigError::SongsFolderCreationFailed(self.songs_dir.display().to_string(), e)
            })?;
            tracing::info!(path = %self.songs_dir.display(), "Created songs folder");
        }

        Ok(())
    }

    /// Get the server bind address.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Songs folder is not a directory: {0}")]
    SongsFolderNotDirectory(String),

    #[error("Failed to create songs folder '{0}': {1}")]
    SongsFolderCreationFailed(String, std::io::Error),
}

/// Initialize the global configuration.
///
/// Should be called once at application startup.
pub fn init() -> &'static Config {
    CONFIG.get_or_init(|| {
        dotenvy::dotenv().ok();
        Config::from_env()
    })
}
