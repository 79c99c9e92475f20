//! Common utilities shared by every civic issues crate.
//!
//! - Configuration management
//! - Tracing and structured logging setup
//! - Pagination and date-window helpers

pub mod config;
pub mod pagination;
pub mod telemetry;

pub use config::{
    AppConfig, AuthConfig, ClassifierConfig, DatabaseConfig, IssuePolicyConfig, RedisConfig,
    ServerConfig, StorageConfig, StorageProvider, TelemetryConfig,
};
pub use pagination::{total_pages, DateRange, PaginatedResult, PaginationParams};
pub use telemetry::{init_from_config, init_tracing};

/// Common error type used throughout the crate
pub type Result<T> = std::result::Result<T, anyhow::Error>;
