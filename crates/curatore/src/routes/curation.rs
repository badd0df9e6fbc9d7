//! Curation routes: public embed markup, editor bootstrap, edit submission.

use std::collections::HashMap;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::get;
use axum::{Form, Json, Router};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use super::{ItemSummary, current_account};
use crate::csrf;
use crate::editor::{MembershipPayload, SaveRequest, SaveTrigger};
use crate::error::{AppError, AppResult};
use crate::models::{ContentKind, ContentRecord};
use crate::models::content::EMBEDDABLE_KINDS;
use crate::state::AppState;

/// Create the curation router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/curated-posts/{key}", get(embed_markup))
        .route("/curation/{id}/edit", get(edit_bootstrap).post(submit_edit))
}

/// Public embed markup for a curation named by id or slug.
///
/// An unknown or empty curation renders as an empty body, not an error.
async fn embed_markup(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> AppResult<Html<String>> {
    Ok(Html(state.renderer().render(&key).await?))
}

/// Payload the editing UI boots from.
#[derive(Debug, Serialize)]
struct EditBootstrap {
    /// Curation id.
    id: i64,
    /// Fresh anti-forgery token for the save that follows.
    nonce: String,
    /// Current membership, hydrated, in stored order.
    posts: Vec<ItemSummary>,
}

/// Editor bootstrap: current membership plus a save nonce.
async fn edit_bootstrap(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i64>,
) -> AppResult<Json<EditBootstrap>> {
    let account = current_account(&state, &session)
        .await
        .ok_or(AppError::Unauthorized)?;
    if !state.policy().can_edit(&account, id).await? {
        return Err(AppError::Unauthorized);
    }

    let entity = state.lookup().find(id).await?;
    if entity.map(|e| e.kind) != Some(ContentKind::Curation) {
        return Err(AppError::NotFound);
    }

    // Stored order verbatim, duplicates included; hydration happens through
    // one bulk fetch and a map-side join.
    let stored = state.store().get(id).await?;
    let records = state
        .lookup()
        .fetch_in_order(&stored, EMBEDDABLE_KINDS, false)
        .await?;
    let by_id: HashMap<i64, &ContentRecord> = records.iter().map(|r| (r.id, r)).collect();
    let posts = stored
        .iter()
        .filter_map(|id| by_id.get(id))
        .map(|r| ItemSummary::from(*r))
        .collect();

    let nonce = csrf::generate_nonce(&session).await?;

    Ok(Json(EditBootstrap { id, nonce, posts }))
}

/// Edit submission form fields.
#[derive(Debug, Deserialize)]
pub struct SaveForm {
    /// Desired membership as a comma-delimited id string.
    pub curated_posts: Option<String>,
    /// Anti-forgery token minted by the bootstrap.
    pub curated_meta_nonce: Option<String>,
}

/// Apply an edit submission.
///
/// Always answers with the host's generic save response; out-of-policy
/// submissions are silent no-ops by design.
async fn submit_edit(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i64>,
    Form(form): Form<SaveForm>,
) -> AppResult<StatusCode> {
    let account = current_account(&state, &session).await;
    let entity_kind = state.lookup().find(id).await?.map(|e| e.kind);

    let request = SaveRequest {
        entity_id: id,
        entity_kind,
        trigger: SaveTrigger::Manual,
        payload: form.curated_posts.map(MembershipPayload::Delimited),
        nonce: form.curated_meta_nonce,
    };

    state
        .editor()
        .apply(&session, account.as_ref(), request)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
