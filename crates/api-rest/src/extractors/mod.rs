//! Custom Axum extractors.
//!
//! Request context (principal + correlation ID) from bearer tokens,
//! validated JSON payloads and query strings.

pub mod auth;
pub mod query;
pub mod validated_json;

pub use auth::{issue_token, RequestContext};
pub use query::ApiQuery;
pub use validated_json::ValidatedJson;
