//! Application builder and configuration.
//!
//! This module assembles all routes, middleware, and state into an Axum
//! router.

use crate::{
    config::ApiConfig,
    error::ErrorResponse,
    middleware::{logging_middleware, render_errors, request_id_middleware},
    routes,
    state::AppState,
};
use axum::{extract::DefaultBodyLimit, http::HeaderValue, middleware, Router};
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::warn;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

/// Create the main application router
pub fn create_app(state: AppState) -> Router {
    let config = state.config.clone();

    let mut app = Router::new()
        // Health check routes (no auth required)
        .merge(routes::health::routes())
        // API v1 routes
        .nest("/api/v1", routes::v1::routes())
        .layer(DefaultBodyLimit::max(config.max_body_size))
        .with_state(state.clone());

    if config.enable_swagger {
        app = app.merge(swagger_ui());
    }

    app.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CompressionLayer::new())
            .layer(build_cors_layer(&config))
            .layer(TimeoutLayer::new(config.request_timeout()))
            .layer(middleware::from_fn(request_id_middleware))
            .layer(middleware::from_fn(logging_middleware))
            .layer(middleware::from_fn_with_state(state, render_errors)),
    )
}

/// Build CORS layer from configuration
fn build_cors_layer(config: &ApiConfig) -> CorsLayer {
    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if config.allows_any_origin() {
        return cors.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .cors_allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring malformed CORS origin");
                None
            }
        })
        .collect();

    cors.allow_origin(AllowOrigin::list(origins))
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Civic Issues API",
        version = "1.0.0",
        description = "Citizen issue intake, office routing and resolution tracking",
        license(name = "MIT"),
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    components(schemas(
        ErrorResponse,
        routes::v1::issues::ForwardIssueBody,
        routes::v1::issues::UpdateIssueBody,
        routes::v1::issues::ResolutionDecisionBody,
        routes::v1::offices::CreateOfficeBody,
        routes::v1::offices::CreateAuthorityBody,
        routes::v1::citizens::CreateCitizenBody,
        routes::health::HealthResponse,
        routes::health::ReadinessResponse,
        routes::health::ReadinessChecks,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "issues", description = "Issue intake, routing and resolution"),
        (name = "reports", description = "Analytics and report data"),
        (name = "offices", description = "Office and employee provisioning"),
        (name = "citizens", description = "Citizen registration"),
        (name = "notifications", description = "Pending resolution decisions"),
    )
)]
pub struct ApiDoc;

/// Swagger UI serving the generated OpenAPI document
fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi())
}
