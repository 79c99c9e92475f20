//! API configuration.

use civic_issues_common::AppConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Room left in a request body for the multipart text fields
const FORM_OVERHEAD_BYTES: usize = 1024 * 1024;

/// API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Server host to bind to
    pub host: String,

    /// Server port to bind to
    pub port: u16,

    /// Secret verifying HS256 bearer tokens
    pub jwt_secret: String,

    /// CORS allowed origins; empty or `*` allows any
    pub cors_allowed_origins: Vec<String>,

    /// Maximum request body size in bytes
    pub max_body_size: usize,

    /// Request timeout in seconds
    pub request_timeout_seconds: u64,

    /// Enable OpenAPI documentation
    pub enable_swagger: bool,

    /// Render backend detail of internal errors
    pub expose_internal_errors: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for ApiConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            host: config.server.host.clone(),
            port: config.server.port,
            jwt_secret: config.auth.jwt_secret.clone(),
            cors_allowed_origins: config.server.cors_origins.clone(),
            // image + audio, each up to the attachment ceiling
            max_body_size: config.issues.max_attachment_bytes * 2 + FORM_OVERHEAD_BYTES,
            request_timeout_seconds: config.server.request_timeout_seconds,
            enable_swagger: config.server.enable_swagger,
            expose_internal_errors: config.server.expose_internal_errors,
        }
    }
}

impl ApiConfig {
    /// Get request timeout as Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    /// Get server address
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Whether any origin may call the API
    pub fn allows_any_origin(&self) -> bool {
        self.cors_allowed_origins.is_empty() || self.cors_allowed_origins.iter().any(|o| o == "*")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_limit_fits_two_attachments() {
        let app = AppConfig::default();
        let config = ApiConfig::from(&app);
        assert!(config.max_body_size > app.issues.max_attachment_bytes * 2);
        assert!(config.allows_any_origin());
    }
}
