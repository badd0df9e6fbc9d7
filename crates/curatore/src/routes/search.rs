//! Editorial search endpoint.
//!
//! Backs the curation editing UI: free-text search to find content to add,
//! and bulk fetch by id set to hydrate the current membership. Both modes
//! require edit capability, checked before any query runs.

use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use tower_sessions::Session;

use super::{ItemSummary, current_account};
use crate::error::{AppError, AppResult};
use crate::models::ContentKind;
use crate::models::content::EMBEDDABLE_KINDS;
use crate::state::AppState;

/// Fixed page size for free-text search.
const PAGE_SIZE: i64 = 10;

/// Create the search router.
pub fn router() -> Router<AppState> {
    Router::new().route("/curated-posts/v1/search", get(search))
}

/// Search query parameters.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    /// Page number (1-indexed, clamped to >= 1).
    pub page: Option<i64>,
    /// Free-text search term.
    pub search: Option<String>,
    /// Comma-separated id set; presence selects bulk-fetch mode.
    pub include: Option<String>,
}

/// Search handler.
///
/// Bulk-fetch mode (`include`) preserves input order, skips pagination, and
/// widens the accepted kinds to pages; drafts stay visible since the caller
/// is an editor hydrating a membership list.
async fn search(
    State(state): State<AppState>,
    session: Session,
    Query(params): Query<SearchParams>,
) -> AppResult<Response> {
    let account = current_account(&state, &session)
        .await
        .ok_or(AppError::Unauthorized)?;
    if !state.policy().can_edit_content(&account).await? {
        return Err(AppError::Unauthorized);
    }

    let (records, total, total_pages) = if let Some(include) = params.include.as_deref() {
        let ids: Vec<i64> = include
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .filter_map(|s| s.parse().ok())
            .collect();
        let records = state
            .lookup()
            .fetch_in_order(&ids, EMBEDDABLE_KINDS, false)
            .await?;
        let total = records.len() as i64;
        (records, total, 1)
    } else {
        let text = params.search.clone().unwrap_or_default();
        let page = params.page.unwrap_or(1).max(1);
        let offset = (page - 1) * PAGE_SIZE;
        let (records, total) = state
            .lookup()
            .search(&text, &[ContentKind::Post], PAGE_SIZE, offset)
            .await?;
        let total_pages = (total + PAGE_SIZE - 1) / PAGE_SIZE;
        (records, total, total_pages)
    };

    let rows: Vec<ItemSummary> = records.iter().map(ItemSummary::from).collect();

    Ok((
        [
            ("x-total-count", total.to_string()),
            ("x-total-pages", total_pages.to_string()),
        ],
        Json(rows),
    )
        .into_response())
}
