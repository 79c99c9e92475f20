//! Infrastructure layer for the civic issues platform
//!
//! This crate provides the production adapters behind the application ports:
//! - Database access (PostgreSQL with sqlx) and the [`PgIssueStore`]
//! - Blob storage for issue media (S3 or the local filesystem)
//! - Notification egress (Redis pub/sub)
//! - The HTTP priority classifier
//!
//! ## Usage
//!
//! ```rust,ignore
//! use civic_issues_infrastructure::{DatabasePool, PgIssueStore};
//!
//! let pool = DatabasePool::new(&config.database).await?;
//! pool.migrate().await?;
//! let store = PgIssueStore::new(pool.pool().clone());
//! ```

pub mod classifier;
pub mod database;
pub mod messaging;
pub mod repositories;
pub mod storage;

// Re-export commonly used types
pub use classifier::HttpPriorityAdvisor;
pub use database::{DatabasePool, HealthStatus, TransactionExt};
pub use messaging::{EventMessage, RedisDispatcher};
pub use repositories::PgIssueStore;
pub use storage::{LocalBlobStorage, S3BlobStorage};

use civic_issues_domain::errors::{DatabaseError, IntegrationError};
use civic_issues_domain::AppError;

// Re-export result and error types
pub type Result<T> = std::result::Result<T, Error>;

/// Infrastructure-level errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Database errors from sqlx
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Schema migration failed
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Errors from Redis
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// Storage errors from S3 or the filesystem
    #[error("Storage error: {0}")]
    Storage(String),

    /// Outbound HTTP errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A stored row does not decode into a domain value
    #[error("Invalid stored value: {0}")]
    Decode(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A domain rule rejected the write
    #[error(transparent)]
    Rejected(#[from] AppError),
}

impl From<Error> for AppError {
    fn from(err: Error) -> Self {
        match err {
            Error::Rejected(e) => e,
            Error::Database(sqlx::Error::PoolTimedOut) => DatabaseError::PoolExhausted.into(),
            Error::Database(e) => DatabaseError::QueryFailed(e.to_string()).into(),
            Error::Migration(e) => DatabaseError::TransactionFailed(e.to_string()).into(),
            Error::Decode(msg) => DatabaseError::Serialization(msg).into(),
            Error::Serialization(e) => DatabaseError::Serialization(e.to_string()).into(),
            Error::Redis(e) => IntegrationError::Messaging(e.to_string()).into(),
            Error::Storage(msg) => IntegrationError::UploadFailed(msg).into(),
            Error::Http(e) => IntegrationError::Classifier(e.to_string()).into(),
            Error::Configuration(msg) => AppError::internal(msg),
        }
    }
}
