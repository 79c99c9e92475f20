//! Authentication extractor.
//!
//! Bearer tokens are HS256 JWTs naming the principal kind and id. Issuing
//! tokens belongs to the identity provider; [`issue_token`] exists for
//! tooling and tests.

use crate::{error::ApiError, middleware::request_id::RequestId, state::AppState};
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use chrono::Utc;
use civic_issues_application::{Principal, ServiceContext};
use civic_issues_domain::{AuthorityId, CitizenId};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// Kind of principal a token speaks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrincipalKind {
    /// Reporting citizen
    Citizen,
    /// Office employee
    Authority,
    /// Platform operator
    Admin,
}

/// Claims stored in JWT token
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (principal ID)
    pub sub: String,

    /// Principal kind
    pub kind: PrincipalKind,

    /// Expiration time (as UTC timestamp)
    pub exp: usize,

    /// Issued at (as UTC timestamp)
    pub iat: usize,
}

impl Claims {
    /// Claims for `principal`, valid for `ttl`
    pub fn new(principal: Principal, ttl: Duration) -> Result<Self, ApiError> {
        let (kind, sub) = match principal {
            Principal::Citizen(id) => (PrincipalKind::Citizen, id.to_string()),
            Principal::Authority(id) => (PrincipalKind::Authority, id.to_string()),
            Principal::Admin => (PrincipalKind::Admin, "admin".to_string()),
            Principal::Anonymous => {
                return Err(ApiError::BadRequest(
                    "anonymous principals carry no token".to_string(),
                ))
            }
        };
        let now = Utc::now().timestamp().max(0) as usize;
        Ok(Self {
            sub,
            kind,
            iat: now,
            exp: now + ttl.as_secs() as usize,
        })
    }

    /// Principal named by the claims
    pub fn principal(&self) -> Result<Principal, ApiError> {
        let id = || {
            Uuid::parse_str(&self.sub)
                .map_err(|_| ApiError::InvalidToken("Invalid subject in token".to_string()))
        };
        Ok(match self.kind {
            PrincipalKind::Citizen => Principal::Citizen(CitizenId::from_uuid(id()?)),
            PrincipalKind::Authority => Principal::Authority(AuthorityId::from_uuid(id()?)),
            PrincipalKind::Admin => Principal::Admin,
        })
    }
}

/// Sign a bearer token for `principal`.
pub fn issue_token(secret: &str, principal: Principal, ttl: Duration) -> Result<String, ApiError> {
    let claims = Claims::new(principal, ttl)?;
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| ApiError::InvalidToken(format!("Token signing failed: {}", e)))
}

fn decode_principal(token: &str, secret: &str) -> Result<Principal, ApiError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| ApiError::InvalidToken(format!("Token validation failed: {}", e)))?;

    token_data.claims.principal()
}

/// Service context of the request: the principal from the bearer token (or
/// anonymous when no token is sent) and the request ID as correlation ID.
#[derive(Debug, Clone)]
pub struct RequestContext(pub ServiceContext);

#[async_trait]
impl FromRequestParts<AppState> for RequestContext {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let correlation_id = parts
            .extensions
            .get::<RequestId>()
            .map(|id| id.0.clone())
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let Some(auth_header) = parts.headers.get(header::AUTHORIZATION) else {
            return Ok(Self(ServiceContext::anonymous(correlation_id)));
        };

        let token = auth_header
            .to_str()
            .ok()
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or_else(|| {
                ApiError::InvalidToken("Invalid authorization header format".to_string())
            })?;

        let principal = decode_principal(token.trim(), state.jwt_secret())?;
        Ok(Self(ServiceContext::new(principal, correlation_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    #[test]
    fn test_token_round_trip() {
        let citizen = CitizenId::new();
        let token = issue_token(SECRET, Principal::Citizen(citizen), Duration::from_secs(60)).unwrap();
        assert_eq!(decode_principal(&token, SECRET).unwrap(), Principal::Citizen(citizen));
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token = issue_token(SECRET, Principal::Admin, Duration::from_secs(60)).unwrap();
        let err = decode_principal(&token, "another-secret-another-secret-xx").unwrap_err();
        assert!(matches!(err, ApiError::InvalidToken(_)));
    }

    #[test]
    fn test_malformed_subject_is_rejected() {
        let claims = Claims {
            sub: "not-a-uuid".to_string(),
            kind: PrincipalKind::Authority,
            exp: 0,
            iat: 0,
        };
        assert!(matches!(claims.principal(), Err(ApiError::InvalidToken(_))));
    }
}
