//! API Middleware
//!
//! Session resolution and request logging. Every route behind the session
//! middleware sees a `ModeratorContext` extension with the author name and
//! the table the session is bound to.

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::ModeratorContext;
use crate::store::SessionRepository;

/// Header carrying the session token issued at login
pub const SESSION_HEADER: &str = "X-Session-Id";

/// Resolve the session token into a `ModeratorContext`.
pub async fn session_middleware(
    State(pool): State<PgPool>,
    headers: HeaderMap,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, Response> {
    let token = match headers.get(SESSION_HEADER).and_then(|v| v.to_str().ok()) {
        Some(token) => token,
        None => {
            return Err((
                StatusCode::UNAUTHORIZED,
                Json(json!({
                    "error": "Missing X-Session-Id header",
                    "error_code": "session_required"
                })),
            )
                .into_response());
        }
    };

    let session_id = match Uuid::parse_str(token) {
        Ok(id) => id,
        Err(_) => {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "Invalid X-Session-Id header format",
                    "error_code": "invalid_session_id"
                })),
            )
                .into_response());
        }
    };

    let session = match SessionRepository::new(pool).find_active(session_id).await {
        Ok(session) => session,
        Err(e) => {
            tracing::error!("Database error during session lookup: {}", e);
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Internal server error",
                    "error_code": "database_error"
                })),
            )
                .into_response());
        }
    };

    let session = match session {
        Some(session) => session,
        None => {
            return Err((
                StatusCode::UNAUTHORIZED,
                Json(json!({
                    "error": "Session not found or expired",
                    "error_code": "session_not_found"
                })),
            )
                .into_response());
        }
    };

    // Correlation ID from the client, or a fresh one
    let correlation_id = headers
        .get("X-Correlation-Id")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| Uuid::parse_str(s).ok())
        .unwrap_or_else(Uuid::new_v4);

    let context = ModeratorContext::new(session.username, session.table, session.session_id)
        .with_correlation_id(correlation_id);

    request.extensions_mut().insert(context);

    Ok(next.run(request).await)
}

/// Log every request with method, path, status and latency.
pub async fn logging_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let start = std::time::Instant::now();

    let response = next.run(request).await;

    let latency = start.elapsed();
    let status = response.status();

    if status.is_server_error() {
        tracing::error!(%method, %path, %status, ?latency, "Request failed");
    } else {
        tracing::info!(%method, %path, %status, ?latency, "Request handled");
    }

    response
}
