//! API token authentication middleware.
//!
//! Checks for `Authorization: Bearer <token>` headers and, if valid,
//! injects the account id into the session so handlers work unchanged.

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tower_sessions::Session;

use crate::routes::SESSION_ACCOUNT_ID;
use crate::state::AppState;

/// Middleware that authenticates via Bearer token.
///
/// - Valid token -> injects account id into the session
/// - Invalid token -> 401 JSON error
/// - No header -> passes through (cookie session auth may still apply)
///
/// An account id already in the session (cookie auth) takes precedence and
/// the Bearer token is ignored.
pub async fn authenticate_api_token(
    State(state): State<AppState>,
    session: Session,
    request: Request<Body>,
    next: Next,
) -> Response {
    let raw_token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    let Some(raw_token) = raw_token else {
        return next.run(request).await;
    };

    if let Ok(Some(_)) = session.get::<i64>(SESSION_ACCOUNT_ID).await {
        return next.run(request).await;
    }

    let account = match state.policy().authenticate(raw_token).await {
        Ok(Some(a)) => a,
        Ok(None) => {
            return (
                StatusCode::UNAUTHORIZED,
                axum::Json(json!({"error": "invalid API token"})),
            )
                .into_response();
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to look up API token");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                axum::Json(json!({"error": "internal server error"})),
            )
                .into_response();
        }
    };

    if let Err(e) = session.insert(SESSION_ACCOUNT_ID, account.id).await {
        tracing::error!(error = %e, "failed to store authenticated account in session");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            axum::Json(json!({"error": "internal server error"})),
        )
            .into_response();
    }

    next.run(request).await
}
