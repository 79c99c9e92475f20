//! Configuration management for the application.
//!
//! Settings are loaded from configuration files and environment variables and
//! select which backend serves each collaborator:
//!
//! - **Persistence**: PostgreSQL when `database.url` is set, in-memory otherwise
//! - **Blob storage**: S3 (or S3-compatible) or the local filesystem
//! - **Messaging**: Redis Pub/Sub when `redis.url` is set, logging-only otherwise
//! - **Priority classifier**: HTTP model endpoint when enabled, NORMAL otherwise
//!
//! ## Example Configuration
//!
//! ```toml
//! [database]
//! url = "postgres://localhost:5432/civic_issues"
//!
//! [storage]
//! provider = "s3"
//! bucket = "civic-issues-media"
//!
//! [issues]
//! max_attachment_bytes = 10485760
//! classifier_timeout_ms = 3000
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub redis: RedisConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub classifier: ClassifierConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub issues: IssuePolicyConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to (e.g., "0.0.0.0")
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,

    /// Allowed CORS origins; empty allows any
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Serve the OpenAPI document and Swagger UI
    #[serde(default = "default_true")]
    pub enable_swagger: bool,

    /// Include backend error detail in 5xx responses
    #[serde(default)]
    pub expose_internal_errors: bool,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL; the in-memory store is used when absent
    #[serde(default)]
    pub url: Option<String>,

    /// Connection pool size
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,

    /// Connection timeout in seconds
    #[serde(default = "default_db_timeout")]
    pub timeout_seconds: u64,

    /// Apply bundled migrations at startup
    #[serde(default = "default_true")]
    pub run_migrations: bool,
}

/// Redis configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    /// Redis connection URL; notifications are only logged when absent
    #[serde(default)]
    pub url: Option<String>,

    /// Prefix prepended to every published channel
    #[serde(default = "default_channel_prefix")]
    pub channel_prefix: String,
}

/// Blob storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub provider: StorageProvider,

    /// Bucket name (S3)
    #[serde(default)]
    pub bucket: String,

    /// AWS region (S3)
    #[serde(default = "default_region")]
    pub region: String,

    /// Custom endpoint for S3-compatible services
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Root directory (local filesystem)
    #[serde(default = "default_local_root")]
    pub local_root: String,

    /// Base URL under which stored objects are served
    #[serde(default)]
    pub public_base_url: Option<String>,
}

/// Available storage providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StorageProvider {
    /// AWS S3 or S3-compatible (MinIO, etc.)
    S3,
    /// Local filesystem (development only)
    #[default]
    LocalFileSystem,
}

/// Priority classifier configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Call the model endpoint; when false every issue is NORMAL
    #[serde(default)]
    pub enabled: bool,

    /// Base URL of the generative language API
    #[serde(default = "default_classifier_endpoint")]
    pub endpoint: String,

    /// Model name
    #[serde(default = "default_classifier_model")]
    pub model: String,

    /// API key
    #[serde(default)]
    pub api_key: Option<String>,
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret used to verify HS256 bearer tokens
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
}

/// Issue handling policy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuePolicyConfig {
    /// Size ceiling for each attachment
    #[serde(default = "default_max_attachment_bytes")]
    pub max_attachment_bytes: usize,

    /// Budget for the priority classifier
    #[serde(default = "default_classifier_timeout_ms")]
    pub classifier_timeout_ms: u64,

    /// Budget for each notification dispatch
    #[serde(default = "default_dispatch_timeout_ms")]
    pub dispatch_timeout_ms: u64,

    /// Radius used by nearby search when none is given
    #[serde(default = "default_nearby_radius")]
    pub nearby_radius_meters: f64,

    /// Page size used by nearby search when none is given
    #[serde(default = "default_nearby_limit")]
    pub nearby_limit: u32,

    /// Page size used by office listings when none is given
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Analytics window when no dates are given
    #[serde(default = "default_analytics_window_days")]
    pub analytics_window_days: i64,
}

/// Telemetry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Service name for tracing
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// Enable JSON logging format
    #[serde(default)]
    pub json_logging: bool,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_request_timeout() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

fn default_pool_size() -> u32 {
    10
}

fn default_db_timeout() -> u64 {
    30
}

fn default_channel_prefix() -> String {
    "civic:".to_string()
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_local_root() -> String {
    "./uploads".to_string()
}

fn default_classifier_endpoint() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_classifier_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_jwt_secret() -> String {
    "development-secret-key-minimum-32-chars".to_string()
}

fn default_max_attachment_bytes() -> usize {
    10 * 1024 * 1024
}

fn default_classifier_timeout_ms() -> u64 {
    3_000
}

fn default_dispatch_timeout_ms() -> u64 {
    2_000
}

fn default_nearby_radius() -> f64 {
    1_000.0
}

fn default_nearby_limit() -> u32 {
    3
}

fn default_page_size() -> u32 {
    10
}

fn default_analytics_window_days() -> i64 {
    7
}

fn default_service_name() -> String {
    "civic-issues".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_seconds: default_request_timeout(),
            cors_origins: Vec::new(),
            enable_swagger: true,
            expose_internal_errors: false,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            pool_size: default_pool_size(),
            timeout_seconds: default_db_timeout(),
            run_migrations: true,
        }
    }
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: None,
            channel_prefix: default_channel_prefix(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            provider: StorageProvider::default(),
            bucket: String::new(),
            region: default_region(),
            endpoint: None,
            local_root: default_local_root(),
            public_base_url: None,
        }
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: default_classifier_endpoint(),
            model: default_classifier_model(),
            api_key: None,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
        }
    }
}

impl Default for IssuePolicyConfig {
    fn default() -> Self {
        Self {
            max_attachment_bytes: default_max_attachment_bytes(),
            classifier_timeout_ms: default_classifier_timeout_ms(),
            dispatch_timeout_ms: default_dispatch_timeout_ms(),
            nearby_radius_meters: default_nearby_radius(),
            nearby_limit: default_nearby_limit(),
            page_size: default_page_size(),
            analytics_window_days: default_analytics_window_days(),
        }
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: default_service_name(),
            json_logging: false,
            log_level: default_log_level(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and configuration files.
    ///
    /// Later sources override earlier ones:
    /// 1. Default values
    /// 2. config/default.toml (if exists)
    /// 3. config/{environment}.toml (if exists, where environment is from APP_ENV)
    /// 4. Environment variables (prefixed with APP_, e.g. `APP__DATABASE__URL`)
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use civic_issues_common::config::AppConfig;
    ///
    /// let config = AppConfig::load().expect("Failed to load configuration");
    /// println!("Server will run on {}:{}", config.server.host, config.server.port);
    /// ```
    pub fn load() -> Result<Self> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{}", env)).required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to build configuration")?;

        let app_config: AppConfig = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        app_config.validate()?;

        Ok(app_config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            anyhow::bail!("Server port must be greater than 0");
        }

        if let Some(url) = &self.database.url {
            if url.is_empty() {
                anyhow::bail!("Database URL must not be empty when set");
            }
            if self.database.pool_size == 0 {
                anyhow::bail!("Database pool size must be greater than 0");
            }
        }

        if self.storage.provider == StorageProvider::S3 && self.storage.bucket.is_empty() {
            anyhow::bail!("S3 bucket name is required");
        }

        if self.classifier.enabled && self.classifier.api_key.is_none() {
            anyhow::bail!("Classifier API key is required when the classifier is enabled");
        }

        if self.auth.jwt_secret.len() < 32 {
            anyhow::bail!("JWT secret must be at least 32 characters long");
        }

        if self.issues.max_attachment_bytes == 0 {
            anyhow::bail!("Attachment size ceiling must be greater than 0");
        }

        if self.issues.nearby_limit == 0 || self.issues.page_size == 0 {
            anyhow::bail!("Default page sizes must be greater than 0");
        }

        let radius = self.issues.nearby_radius_meters;
        if radius.is_nan() || radius <= 0.0 {
            anyhow::bail!("Default nearby radius must be positive");
        }

        if self.issues.analytics_window_days <= 0 {
            anyhow::bail!("Analytics window must be at least one day");
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&self.telemetry.log_level.as_str()) {
            anyhow::bail!(
                "Invalid log level '{}'. Must be one of: {}",
                self.telemetry.log_level,
                valid_log_levels.join(", ")
            );
        }

        Ok(())
    }
}

impl IssuePolicyConfig {
    pub fn classifier_timeout(&self) -> Duration {
        Duration::from_millis(self.classifier_timeout_ms)
    }

    pub fn dispatch_timeout(&self) -> Duration {
        Duration::from_millis(self.dispatch_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.database.url.is_none());
        assert_eq!(config.issues.max_attachment_bytes, 10 * 1024 * 1024);
        assert_eq!(config.issues.nearby_limit, 3);
    }

    #[test]
    fn test_config_validation() {
        let mut config = AppConfig::default();

        config.server.port = 0;
        assert!(config.validate().is_err());
        config.server.port = 8080;

        config.auth.jwt_secret = "short".to_string();
        assert!(config.validate().is_err());
        config.auth.jwt_secret = "a".repeat(32);

        config.storage.provider = StorageProvider::S3;
        assert!(config.validate().is_err());
        config.storage.bucket = "media".to_string();
        assert!(config.validate().is_ok());

        config.classifier.enabled = true;
        assert!(config.validate().is_err());
        config.classifier.api_key = Some("key".to_string());
        assert!(config.validate().is_ok());

        config.telemetry.log_level = "invalid".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_sources_fill_defaults() {
        let config: AppConfig = config::Config::builder()
            .set_override("database.url", "postgres://localhost/civic")
            .unwrap()
            .set_override("issues.nearby_limit", 5)
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(
            config.database.url.as_deref(),
            Some("postgres://localhost/civic")
        );
        assert_eq!(config.issues.nearby_limit, 5);
        assert_eq!(config.issues.page_size, 10);
        assert_eq!(config.server.port, 8080);
    }
}
