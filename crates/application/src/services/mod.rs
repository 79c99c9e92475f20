//! Application Services
//!
//! Business logic orchestration layer that coordinates domain operations,
//! store access, collaborators and authorization of the acting principal.

mod issue;
mod provisioning;

pub use issue::*;
pub use provisioning::*;

use crate::ports::IssueStore;
use crate::ApplicationResult;
use civic_issues_common::IssuePolicyConfig;
use civic_issues_domain::errors::AuthorizationError;
use civic_issues_domain::{Authority, AuthorityId, CitizenId};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Service configuration
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Size ceiling for each attachment
    pub max_attachment_bytes: u64,
    /// Budget for the priority classifier
    pub classifier_timeout: Duration,
    /// Budget for each notification dispatch
    pub dispatch_timeout: Duration,
    /// Nearby search radius when none is given
    pub nearby_radius_meters: f64,
    /// Nearby search page size when none is given
    pub nearby_limit: u32,
    /// Default page size for office listings
    pub default_page_size: u32,
    /// Analytics window when no dates are given
    pub analytics_window_days: i64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self::from(&IssuePolicyConfig::default())
    }
}

impl From<&IssuePolicyConfig> for ServiceConfig {
    fn from(policy: &IssuePolicyConfig) -> Self {
        Self {
            max_attachment_bytes: policy.max_attachment_bytes as u64,
            classifier_timeout: policy.classifier_timeout(),
            dispatch_timeout: policy.dispatch_timeout(),
            nearby_radius_meters: policy.nearby_radius_meters,
            nearby_limit: policy.nearby_limit,
            default_page_size: policy.page_size,
            analytics_window_days: policy.analytics_window_days,
        }
    }
}

/// Acting principal of a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Principal {
    Anonymous,
    Citizen(CitizenId),
    Authority(AuthorityId),
    Admin,
}

/// Service context for request handling
#[derive(Debug, Clone)]
pub struct ServiceContext {
    /// Who is acting
    pub principal: Principal,
    /// Request correlation ID for tracing
    pub correlation_id: String,
}

impl ServiceContext {
    pub fn anonymous(correlation_id: impl Into<String>) -> Self {
        Self::new(Principal::Anonymous, correlation_id)
    }

    pub fn citizen(citizen_id: CitizenId, correlation_id: impl Into<String>) -> Self {
        Self::new(Principal::Citizen(citizen_id), correlation_id)
    }

    pub fn authority(authority_id: AuthorityId, correlation_id: impl Into<String>) -> Self {
        Self::new(Principal::Authority(authority_id), correlation_id)
    }

    pub fn admin(correlation_id: impl Into<String>) -> Self {
        Self::new(Principal::Admin, correlation_id)
    }

    pub fn new(principal: Principal, correlation_id: impl Into<String>) -> Self {
        Self {
            principal,
            correlation_id: correlation_id.into(),
        }
    }

    pub fn citizen_id(&self) -> Option<CitizenId> {
        match self.principal {
            Principal::Citizen(id) => Some(id),
            _ => None,
        }
    }

    pub fn require_citizen(&self, action: &str) -> Result<CitizenId, AuthorizationError> {
        match self.principal {
            Principal::Citizen(id) => Ok(id),
            Principal::Anonymous => Err(AuthorizationError::AuthenticationRequired),
            _ => Err(AuthorizationError::insufficient(action)),
        }
    }

    pub fn require_authority(&self, action: &str) -> Result<AuthorityId, AuthorizationError> {
        match self.principal {
            Principal::Authority(id) => Ok(id),
            Principal::Anonymous => Err(AuthorizationError::AuthenticationRequired),
            _ => Err(AuthorizationError::insufficient(action)),
        }
    }

    pub fn require_admin(&self, action: &str) -> Result<(), AuthorizationError> {
        match self.principal {
            Principal::Admin => Ok(()),
            Principal::Anonymous => Err(AuthorizationError::AuthenticationRequired),
            _ => Err(AuthorizationError::insufficient(action)),
        }
    }
}

/// Load the acting authority; a token naming an unknown authority is rejected
pub(crate) async fn resolve_authority(
    store: &dyn IssueStore,
    ctx: &ServiceContext,
    action: &str,
) -> ApplicationResult<Authority> {
    let authority_id = ctx.require_authority(action)?;
    store
        .get_authority(authority_id)
        .await?
        .ok_or_else(|| AuthorizationError::InvalidToken("unknown authority".to_string()).into())
}

/// Load the acting authority and require the representative role
pub(crate) async fn resolve_representative(
    store: &dyn IssueStore,
    ctx: &ServiceContext,
    action: &str,
) -> ApplicationResult<Authority> {
    let authority = resolve_authority(store, ctx, action).await?;
    if !authority.is_representative() {
        return Err(AuthorizationError::NotRepresentative {
            action: action.to_string(),
        }
        .into());
    }
    Ok(authority)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_context() {
        let ctx = ServiceContext::anonymous("corr-123");
        assert!(matches!(
            ctx.require_citizen("vote"),
            Err(AuthorizationError::AuthenticationRequired)
        ));

        let citizen = CitizenId::new();
        let ctx = ServiceContext::citizen(citizen, "corr-123");
        assert_eq!(ctx.require_citizen("vote").unwrap(), citizen);
        assert!(ctx.require_authority("forward").is_err());
        assert!(ctx.require_admin("create office").is_err());

        let ctx = ServiceContext::admin("corr-123");
        assert!(ctx.require_admin("create office").is_ok());
    }

    #[test]
    fn test_service_config_from_policy() {
        let config = ServiceConfig::default();
        assert_eq!(config.max_attachment_bytes, 10 * 1024 * 1024);
        assert_eq!(config.classifier_timeout, Duration::from_millis(3000));
        assert_eq!(config.dispatch_timeout, Duration::from_millis(2000));
        assert_eq!(config.nearby_limit, 3);
    }
}
