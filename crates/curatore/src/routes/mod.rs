//! HTTP route handlers.

pub mod curation;
pub mod health;
pub mod search;

use axum::Router;
use serde::Serialize;
use tower_http::trace::TraceLayer;
use tower_sessions::{MemoryStore, SessionManagerLayer};

use crate::models::{Account, ContentRecord};
use crate::state::AppState;

/// Session key for the authenticated account id.
pub const SESSION_ACCOUNT_ID: &str = "account_id";

/// Content entity summary returned to the editing UI.
#[derive(Debug, Serialize)]
pub struct ItemSummary {
    /// Entity id.
    pub id: i64,
    /// Entity title.
    pub title: String,
    /// Publication date, e.g. "7 August 2026".
    pub date: String,
}

impl From<&ContentRecord> for ItemSummary {
    fn from(record: &ContentRecord) -> Self {
        Self {
            id: record.id,
            title: record.title.clone(),
            date: record.published_date(),
        }
    }
}

/// Load the account behind the current session, if any.
pub async fn current_account(
    state: &AppState,
    session: &tower_sessions::Session,
) -> Option<Account> {
    let account_id: Option<i64> = session.get(SESSION_ACCOUNT_ID).await.ok().flatten();
    match account_id {
        Some(id) => state.policy().load_actor(id).await.ok().flatten(),
        None => None,
    }
}

/// Build the full application router.
///
/// Middleware layers (last added = first executed in request flow):
/// TraceLayer -> session -> api_token -> routes
pub fn app(state: AppState, session_layer: SessionManagerLayer<MemoryStore>) -> Router {
    Router::new()
        .merge(health::router())
        .merge(search::router())
        .merge(curation::router())
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            crate::middleware::authenticate_api_token,
        ))
        .layer(session_layer)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
