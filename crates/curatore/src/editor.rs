//! Curation editing: validate an incoming membership payload and apply it.
//!
//! Out-of-policy saves are silent no-ops, surfaced to callers only as a
//! [`SaveOutcome::Skipped`] so the host's generic save flow proceeds
//! unchanged. The store is never touched unless every guard passes.

use std::sync::Arc;

use anyhow::Result;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{debug, info};

use crate::access::AccessPolicy;
use crate::csrf;
use crate::models::{Account, ContentKind};
use crate::store::CurationStore;

/// What triggered the host save this edit rides along with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveTrigger {
    /// A user-initiated save of the canonical entity.
    Manual,
    /// A host autosave.
    Autosave,
    /// A host revision snapshot.
    Revision,
}

/// Incoming membership, in either accepted wire shape.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MembershipPayload {
    /// Explicit ordered sequence of identifiers.
    Ids(Vec<String>),
    /// Single comma-delimited string of identifiers.
    Delimited(String),
}

impl MembershipPayload {
    /// Parse into ordered item ids: trimmed, non-empty, numeric.
    ///
    /// Order is preserved and no deduplication happens here; dedup is a
    /// read-time concern of the resolver.
    pub fn into_ids(self) -> Vec<i64> {
        let parts: Vec<String> = match self {
            MembershipPayload::Ids(ids) => ids,
            MembershipPayload::Delimited(s) => s.split(',').map(str::to_string).collect(),
        };

        parts
            .iter()
            .map(|p| p.trim())
            .filter(|p| !p.is_empty())
            .filter_map(|p| p.parse::<i64>().ok())
            .collect()
    }
}

/// An edit riding along with a host entity save.
#[derive(Debug, Clone)]
pub struct SaveRequest {
    /// Id of the entity being saved.
    pub entity_id: i64,

    /// Kind of the entity being saved; `None` when the host store has no
    /// such entity.
    pub entity_kind: Option<ContentKind>,

    /// What triggered the save.
    pub trigger: SaveTrigger,

    /// The desired membership, if the submission carried one.
    pub payload: Option<MembershipPayload>,

    /// Anti-forgery token accompanying the submission.
    pub nonce: Option<String>,
}

/// Why an edit was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No membership payload was submitted.
    MissingPayload,
    /// The save was an autosave or revision snapshot.
    AutogeneratedSave,
    /// The actor may not edit the target entity.
    PermissionDenied,
    /// The saved entity is not a curation.
    NotACuration,
    /// The anti-forgery token was missing or invalid.
    InvalidNonce,
}

/// Result of applying an edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Membership was replaced with `count` items.
    Applied {
        /// Number of items now stored.
        count: usize,
    },
    /// The edit was silently skipped.
    Skipped(SkipReason),
}

/// Applies validated membership edits to the store.
#[derive(Clone)]
pub struct CurationEditor {
    store: Arc<dyn CurationStore>,
    policy: Arc<dyn AccessPolicy>,
}

impl CurationEditor {
    /// Create an editor over the given store and policy.
    pub fn new(store: Arc<dyn CurationStore>, policy: Arc<dyn AccessPolicy>) -> Self {
        Self { store, policy }
    }

    /// Validate and apply an edit.
    ///
    /// Guards run in order; the first failure skips the edit with no store
    /// mutation. On success the prior membership is replaced wholesale —
    /// an empty parsed payload clears it.
    pub async fn apply(
        &self,
        session: &Session,
        actor: Option<&Account>,
        request: SaveRequest,
    ) -> Result<SaveOutcome> {
        let Some(payload) = request.payload else {
            return self.skip(request.entity_id, SkipReason::MissingPayload);
        };

        if request.trigger != SaveTrigger::Manual {
            return self.skip(request.entity_id, SkipReason::AutogeneratedSave);
        }

        let allowed = match actor {
            Some(actor) => self.policy.can_edit(actor, request.entity_id).await?,
            None => false,
        };
        if !allowed {
            return self.skip(request.entity_id, SkipReason::PermissionDenied);
        }

        if request.entity_kind != Some(ContentKind::Curation) {
            return self.skip(request.entity_id, SkipReason::NotACuration);
        }

        let nonce_ok = match request.nonce.as_deref() {
            Some(nonce) => csrf::verify_nonce(session, nonce).await?,
            None => false,
        };
        if !nonce_ok {
            return self.skip(request.entity_id, SkipReason::InvalidNonce);
        }

        let ids = payload.into_ids();
        self.store.replace_all(request.entity_id, &ids).await?;

        info!(
            curation_id = request.entity_id,
            count = ids.len(),
            "curation membership replaced"
        );

        Ok(SaveOutcome::Applied { count: ids.len() })
    }

    fn skip(&self, entity_id: i64, reason: SkipReason) -> Result<SaveOutcome> {
        debug!(curation_id = entity_id, ?reason, "curation edit skipped");
        Ok(SaveOutcome::Skipped(reason))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::access::StaticAccessPolicy;
    use crate::store::MemoryCurationStore;
    use tower_sessions::{MemoryStore, Session};

    fn editor_account() -> Account {
        Account {
            id: 1,
            name: "editor".to_string(),
            is_admin: false,
            is_editor: true,
        }
    }

    fn visitor_account() -> Account {
        Account {
            id: 2,
            name: "visitor".to_string(),
            is_admin: false,
            is_editor: false,
        }
    }

    fn setup() -> (CurationEditor, Arc<MemoryCurationStore>, Session) {
        let store = Arc::new(MemoryCurationStore::new());
        let policy = Arc::new(
            StaticAccessPolicy::new()
                .with_account(editor_account(), None)
                .with_account(visitor_account(), None),
        );
        let editor = CurationEditor::new(store.clone(), policy);
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        (editor, store, session)
    }

    fn request(payload: Option<MembershipPayload>, nonce: Option<String>) -> SaveRequest {
        SaveRequest {
            entity_id: 42,
            entity_kind: Some(ContentKind::Curation),
            trigger: SaveTrigger::Manual,
            payload,
            nonce,
        }
    }

    async fn valid_nonce(session: &Session) -> String {
        csrf::generate_nonce(session).await.unwrap()
    }

    #[tokio::test]
    async fn applies_delimited_payload_in_order() {
        let (editor, store, session) = setup();
        let nonce = valid_nonce(&session).await;
        let outcome = editor
            .apply(
                &session,
                Some(&editor_account()),
                request(
                    Some(MembershipPayload::Delimited("5, 3 ,,7".to_string())),
                    Some(nonce),
                ),
            )
            .await
            .unwrap();

        assert_eq!(outcome, SaveOutcome::Applied { count: 3 });
        assert_eq!(store.get(42).await.unwrap(), vec![5, 3, 7]);
    }

    #[tokio::test]
    async fn both_wire_shapes_parse_identically() {
        let delimited = MembershipPayload::Delimited(" 5,3 , 7 ".to_string());
        let explicit = MembershipPayload::Ids(vec![
            " 5".to_string(),
            "3 ".to_string(),
            String::new(),
            "7".to_string(),
        ]);
        assert_eq!(delimited.into_ids(), vec![5, 3, 7]);
        assert_eq!(explicit.into_ids(), vec![5, 3, 7]);
    }

    #[tokio::test]
    async fn write_time_keeps_duplicates() {
        let (editor, store, session) = setup();
        let nonce = valid_nonce(&session).await;
        editor
            .apply(
                &session,
                Some(&editor_account()),
                request(
                    Some(MembershipPayload::Delimited("5,3,5,7".to_string())),
                    Some(nonce),
                ),
            )
            .await
            .unwrap();

        assert_eq!(store.get(42).await.unwrap(), vec![5, 3, 5, 7]);
    }

    #[tokio::test]
    async fn empty_payload_clears_membership() {
        let (editor, store, session) = setup();
        store.replace_all(42, &[1, 2, 3]).await.unwrap();

        let nonce = valid_nonce(&session).await;
        let outcome = editor
            .apply(
                &session,
                Some(&editor_account()),
                request(
                    Some(MembershipPayload::Delimited(String::new())),
                    Some(nonce),
                ),
            )
            .await
            .unwrap();

        assert_eq!(outcome, SaveOutcome::Applied { count: 0 });
        assert!(store.get(42).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_payload_is_a_noop() {
        let (editor, store, session) = setup();
        store.replace_all(42, &[1, 2]).await.unwrap();

        let nonce = valid_nonce(&session).await;
        let outcome = editor
            .apply(
                &session,
                Some(&editor_account()),
                request(None, Some(nonce)),
            )
            .await
            .unwrap();

        assert_eq!(outcome, SaveOutcome::Skipped(SkipReason::MissingPayload));
        assert_eq!(store.get(42).await.unwrap(), vec![1, 2]);
    }

    #[tokio::test]
    async fn autosave_and_revision_leave_membership_unchanged() {
        let (editor, store, session) = setup();
        store.replace_all(42, &[1, 2]).await.unwrap();

        for trigger in [SaveTrigger::Autosave, SaveTrigger::Revision] {
            let nonce = valid_nonce(&session).await;
            let mut req = request(
                Some(MembershipPayload::Delimited("9".to_string())),
                Some(nonce),
            );
            req.trigger = trigger;
            let outcome = editor
                .apply(&session, Some(&editor_account()), req)
                .await
                .unwrap();
            assert_eq!(outcome, SaveOutcome::Skipped(SkipReason::AutogeneratedSave));
        }

        assert_eq!(store.get(42).await.unwrap(), vec![1, 2]);
    }

    #[tokio::test]
    async fn permission_denied_without_editor_flag() {
        let (editor, store, session) = setup();
        let nonce = valid_nonce(&session).await;
        let outcome = editor
            .apply(
                &session,
                Some(&visitor_account()),
                request(
                    Some(MembershipPayload::Delimited("9".to_string())),
                    Some(nonce),
                ),
            )
            .await
            .unwrap();

        assert_eq!(outcome, SaveOutcome::Skipped(SkipReason::PermissionDenied));
        assert!(store.get(42).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn anonymous_save_is_denied() {
        let (editor, store, session) = setup();
        let nonce = valid_nonce(&session).await;
        let outcome = editor
            .apply(
                &session,
                None,
                request(
                    Some(MembershipPayload::Delimited("9".to_string())),
                    Some(nonce),
                ),
            )
            .await
            .unwrap();

        assert_eq!(outcome, SaveOutcome::Skipped(SkipReason::PermissionDenied));
        assert!(store.get(42).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn non_curation_entity_is_skipped() {
        let (editor, store, session) = setup();
        let nonce = valid_nonce(&session).await;
        let mut req = request(
            Some(MembershipPayload::Delimited("9".to_string())),
            Some(nonce),
        );
        req.entity_kind = Some(ContentKind::Post);
        let outcome = editor
            .apply(&session, Some(&editor_account()), req)
            .await
            .unwrap();

        assert_eq!(outcome, SaveOutcome::Skipped(SkipReason::NotACuration));
        assert!(store.get(42).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_entity_is_skipped() {
        let (editor, store, session) = setup();
        let nonce = valid_nonce(&session).await;
        let mut req = request(
            Some(MembershipPayload::Delimited("9".to_string())),
            Some(nonce),
        );
        req.entity_kind = None;
        let outcome = editor
            .apply(&session, Some(&editor_account()), req)
            .await
            .unwrap();

        assert_eq!(outcome, SaveOutcome::Skipped(SkipReason::NotACuration));
    }

    #[tokio::test]
    async fn bad_nonce_is_skipped() {
        let (editor, store, session) = setup();
        store.replace_all(42, &[1]).await.unwrap();

        for nonce in [None, Some("bogus".to_string())] {
            let outcome = editor
                .apply(
                    &session,
                    Some(&editor_account()),
                    request(Some(MembershipPayload::Delimited("9".to_string())), nonce),
                )
                .await
                .unwrap();
            assert_eq!(outcome, SaveOutcome::Skipped(SkipReason::InvalidNonce));
        }

        assert_eq!(store.get(42).await.unwrap(), vec![1]);
    }

    #[tokio::test]
    async fn nonce_is_single_use_across_saves() {
        let (editor, store, session) = setup();
        let nonce = valid_nonce(&session).await;

        let first = editor
            .apply(
                &session,
                Some(&editor_account()),
                request(
                    Some(MembershipPayload::Delimited("1".to_string())),
                    Some(nonce.clone()),
                ),
            )
            .await
            .unwrap();
        assert_eq!(first, SaveOutcome::Applied { count: 1 });

        let second = editor
            .apply(
                &session,
                Some(&editor_account()),
                request(
                    Some(MembershipPayload::Delimited("2".to_string())),
                    Some(nonce),
                ),
            )
            .await
            .unwrap();
        assert_eq!(second, SaveOutcome::Skipped(SkipReason::InvalidNonce));
        assert_eq!(store.get(42).await.unwrap(), vec![1]);
    }
}
