//! Configuration module
//!
//! Settings for the tender API: server, database, upload storage and logging.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::validation::DEFAULT_MAX_UPLOAD_SIZE_BYTES;

const SERVER_PORT: u16 = 5000;
const MAX_CONNECTIONS: u32 = 20;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const INLINE_CACHE_MAX_AGE_SECS: u64 = 31_536_000;
const UPLOAD_DIR: &str = "./uploads";

/// Output format of the log subscriber
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "compact" | "pretty" | "text" => Ok(LogFormat::Compact),
            "json" => Ok(LogFormat::Json),
            other => Err(anyhow::anyhow!("Unknown LOG_FORMAT: {}", other)),
        }
    }
}

/// Settings shared by every HTTP service
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub environment: String,
}

#[derive(Clone, Debug)]
pub struct TenderServiceConfig {
    pub base: BaseConfig,
    pub database_url: String,
    /// Root directory for stored tender documents
    pub upload_dir: PathBuf,
    pub max_upload_size_bytes: u64,
    /// Delete the previous document after a successful replacement or record deletion
    pub remove_orphaned_files: bool,
    pub inline_cache_max_age_secs: u64,
    pub log_format: LogFormat,
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config(pub Box<TenderServiceConfig>);

impl Config {
    fn inner(&self) -> &TenderServiceConfig {
        &self.0
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        is_production_name(&self.inner().base.environment)
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        let config = TenderServiceConfig::from_lookup(|key| env::var(key).ok())?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.inner().validate()
    }

    pub fn server_port(&self) -> u16 {
        self.inner().base.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.inner().base.cors_origins
    }

    pub fn environment(&self) -> &str {
        &self.inner().base.environment
    }

    pub fn database_url(&self) -> &str {
        &self.inner().database_url
    }

    pub fn db_max_connections(&self) -> u32 {
        self.inner().base.db_max_connections
    }

    pub fn db_timeout_seconds(&self) -> u64 {
        self.inner().base.db_timeout_seconds
    }

    pub fn upload_dir(&self) -> &PathBuf {
        &self.inner().upload_dir
    }

    pub fn max_upload_size_bytes(&self) -> u64 {
        self.inner().max_upload_size_bytes
    }

    /// Request body ceiling: large enough that an oversized document still reaches the
    /// upload validator and gets a field message instead of a bare 413.
    pub fn request_body_limit_bytes(&self) -> usize {
        let limit = self
            .inner()
            .max_upload_size_bytes
            .saturating_mul(2)
            .saturating_add(1024 * 1024);
        usize::try_from(limit).unwrap_or(usize::MAX)
    }

    pub fn remove_orphaned_files(&self) -> bool {
        self.inner().remove_orphaned_files
    }

    pub fn inline_cache_max_age_secs(&self) -> u64 {
        self.inner().inline_cache_max_age_secs
    }

    pub fn log_format(&self) -> LogFormat {
        self.inner().log_format
    }
}

fn is_production_name(environment: &str) -> bool {
    let environment = environment.to_lowercase();
    environment == "production" || environment == "prod"
}

impl TenderServiceConfig {
    /// Build from a key lookup; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup("ENVIRONMENT")
            .or_else(|| lookup("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let cors_origins_str = lookup("CORS_ORIGINS").unwrap_or_else(|| "*".to_string());
        if is_production_name(&environment) && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let base = BaseConfig {
            server_port: lookup("PORT")
                .unwrap_or_else(|| SERVER_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            cors_origins,
            db_max_connections: lookup("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|| MAX_CONNECTIONS.to_string())
                .parse()
                .unwrap_or(MAX_CONNECTIONS),
            db_timeout_seconds: lookup("DB_TIMEOUT_SECONDS")
                .unwrap_or_else(|| CONNECTION_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
            environment,
        };

        let config = TenderServiceConfig {
            base,
            database_url: lookup("DATABASE_URL")
                .ok_or_else(|| anyhow::anyhow!("DATABASE_URL must be set"))?,
            upload_dir: PathBuf::from(
                lookup("UPLOAD_DIR")
                    .filter(|s| !s.trim().is_empty())
                    .unwrap_or_else(|| UPLOAD_DIR.to_string()),
            ),
            max_upload_size_bytes: lookup("MAX_UPLOAD_SIZE_BYTES")
                .unwrap_or_else(|| DEFAULT_MAX_UPLOAD_SIZE_BYTES.to_string())
                .parse()
                .unwrap_or(DEFAULT_MAX_UPLOAD_SIZE_BYTES),
            remove_orphaned_files: lookup("REMOVE_ORPHANED_FILES")
                .unwrap_or_else(|| "true".to_string())
                .to_lowercase()
                .parse()
                .unwrap_or(true),
            inline_cache_max_age_secs: lookup("INLINE_CACHE_MAX_AGE_SECS")
                .unwrap_or_else(|| INLINE_CACHE_MAX_AGE_SECS.to_string())
                .parse()
                .unwrap_or(INLINE_CACHE_MAX_AGE_SECS),
            log_format: lookup("LOG_FORMAT")
                .map(|s| s.parse())
                .transpose()?
                .unwrap_or_default(),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.base.server_port == 0 {
            return Err(anyhow::anyhow!("PORT must be greater than zero"));
        }

        if !self.database_url.starts_with("postgres://")
            && !self.database_url.starts_with("postgresql://")
        {
            return Err(anyhow::anyhow!(
                "DATABASE_URL must be a valid PostgreSQL connection string"
            ));
        }

        if self.max_upload_size_bytes == 0 {
            return Err(anyhow::anyhow!(
                "MAX_UPLOAD_SIZE_BYTES must be greater than zero"
            ));
        }

        if self.base.cors_origins.is_empty() {
            return Err(anyhow::anyhow!("CORS_ORIGINS must list at least one origin"));
        }

        Ok(())
    }
}
