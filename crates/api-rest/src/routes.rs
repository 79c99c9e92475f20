//! HTTP route handlers.
//!
//! Health probes live at the root; the public operations under `/api/v1`.

pub mod health;
pub mod v1;

// Re-export for convenience
pub use health::routes as health_routes;
pub use v1::routes as v1_routes;
