//! Curation resolution: id-or-slug in, ordered item ids out.
//!
//! The resolver is the programmatic read API for curations. Every failure
//! mode — empty input, unknown slug, unknown id, empty membership — collapses
//! to an empty sequence; callers that need to distinguish must consult the
//! host content store themselves.

use std::sync::Arc;

use anyhow::Result;

use crate::lookup::ContentLookup;
use crate::models::ContentKind;
use crate::store::CurationStore;

/// How a caller names a curation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListKey {
    /// Numeric curation id.
    Id(i64),
    /// Human-readable slug.
    Slug(String),
}

impl ListKey {
    /// Parse a raw key string. All-digit input is an id, anything else a
    /// slug; empty or whitespace-only input parses to nothing.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        match raw.parse::<i64>() {
            Ok(id) => Some(ListKey::Id(id)),
            Err(_) => Some(ListKey::Slug(raw.to_string())),
        }
    }
}

/// Resolves curation keys to ordered, deduplicated item ids.
#[derive(Clone)]
pub struct CurationResolver {
    store: Arc<dyn CurationStore>,
    lookup: Arc<dyn ContentLookup>,
}

impl CurationResolver {
    /// Create a resolver over the given store and lookup.
    pub fn new(store: Arc<dyn CurationStore>, lookup: Arc<dyn ContentLookup>) -> Self {
        Self { store, lookup }
    }

    /// Get the curated item ids for a curation named by id or slug.
    ///
    /// Deduplicated keeping first occurrence; no existence filtering (that is
    /// a render-time concern). Unknown keys yield an empty sequence.
    pub async fn curated_ids(&self, id_or_slug: &str) -> Result<Vec<i64>> {
        match ListKey::parse(id_or_slug) {
            Some(key) => self.resolve(&key).await,
            None => Ok(vec![]),
        }
    }

    /// Resolve a parsed key to ordered, deduplicated item ids.
    pub async fn resolve(&self, key: &ListKey) -> Result<Vec<i64>> {
        let curation_id = match key {
            ListKey::Id(id) => *id,
            ListKey::Slug(slug) => {
                match self
                    .lookup
                    .find_by_path(slug, ContentKind::Curation)
                    .await?
                {
                    Some(id) => id,
                    None => return Ok(vec![]),
                }
            }
        };

        let stored = self.store.get(curation_id).await?;
        Ok(dedup_first_occurrence(stored))
    }
}

/// Collapse duplicates, keeping each id's first position.
fn dedup_first_occurrence(ids: Vec<i64>) -> Vec<i64> {
    let mut out = Vec::with_capacity(ids.len());
    for id in ids {
        if !out.contains(&id) {
            out.push(id);
        }
    }
    out
}
