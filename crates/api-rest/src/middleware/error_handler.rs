//! Error rendering middleware.
//!
//! Handlers turn failures into [`RenderedError`] responses; this layer stamps
//! the request ID on the body and, when the deployment allows it, replaces
//! the generic internal-error message with the backend detail.

use super::request_id::RequestId;
use crate::{error::RenderedError, state::AppState};
use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

/// Finish error bodies produced by handlers and extractors
pub async fn render_errors(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let request_id = req.extensions().get::<RequestId>().cloned();
    let mut response = next.run(req).await;

    let Some(rendered) = response.extensions_mut().remove::<RenderedError>() else {
        return response;
    };

    let mut body = rendered.body;
    if state.config.expose_internal_errors {
        if let Some(detail) = rendered.internal_detail {
            body.message = detail;
        }
    }
    if let Some(RequestId(id)) = request_id {
        body = body.with_request_id(id);
    }

    let (mut parts, _) = response.into_parts();
    parts.headers.remove(axum::http::header::CONTENT_LENGTH);
    (parts, Json(body)).into_response()
}
