//! HTTP middleware components.
//!
//! - Request ID propagation (`x-request-id`)
//! - Request logging
//! - Final rendering of error bodies

pub mod error_handler;
pub mod logging;
pub mod request_id;

pub use error_handler::render_errors;
pub use logging::logging_middleware;
pub use request_id::{request_id_middleware, RequestId};
