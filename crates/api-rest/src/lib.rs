//! Civic Issues REST API
//!
//! Axum front end for the issue lifecycle engine: multipart issue intake,
//! nearby search, office routing decisions, resolution tracking and report
//! data, with OpenAPI documentation and bearer-token principals.
//!
//! ## Architecture
//!
//! - **app**: Router assembly and middleware stack
//! - **routes**: HTTP route handlers organized by resource
//! - **middleware**: Request ID, logging and error rendering
//! - **extractors**: Request context, validated JSON and query strings
//! - **responses**: The `{success, data}` envelope
//! - **error**: HTTP error handling and conversion
//!
//! ## Usage
//!
//! ```rust,no_run
//! use civic_issues_api_rest::{create_app, AppState};
//! use civic_issues_common::AppConfig;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = AppConfig::load()?;
//! let state = AppState::connect(&config).await?;
//! let app = create_app(state);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

#![warn(clippy::all)]

pub mod app;
pub mod config;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod responses;
pub mod routes;
pub mod state;

// Re-export commonly used types
pub use app::{create_app, ApiDoc};
pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use extractors::issue_token;
pub use state::{AppState, Backends};
