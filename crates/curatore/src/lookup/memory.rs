//! In-memory content lookup.

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use parking_lot::RwLock;

use super::ContentLookup;
use crate::models::{ContentKind, ContentRecord};

/// Content lookup over a fixed in-process set of records.
///
/// Embedders and tests seed it with [`insert`](Self::insert); semantics match
/// the PostgreSQL lookup (order preservation, kind and status filtering,
/// newest-first search).
#[derive(Default)]
pub struct MemoryContentLookup {
    records: RwLock<HashMap<i64, ContentRecord>>,
}

impl MemoryContentLookup {
    /// Create an empty lookup.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a record.
    pub fn insert(&self, record: ContentRecord) {
        self.records.write().insert(record.id, record);
    }

    /// Remove a record, simulating host-side deletion.
    pub fn remove(&self, id: i64) {
        self.records.write().remove(&id);
    }
}

#[async_trait]
impl ContentLookup for MemoryContentLookup {
    async fn find(&self, id: i64) -> Result<Option<ContentRecord>> {
        Ok(self.records.read().get(&id).cloned())
    }

    async fn find_by_path(&self, slug: &str, kind: ContentKind) -> Result<Option<i64>> {
        Ok(self
            .records
            .read()
            .values()
            .find(|r| r.kind == kind && r.slug == slug)
            .map(|r| r.id))
    }

    async fn fetch_in_order(
        &self,
        ids: &[i64],
        kinds: &[ContentKind],
        published_only: bool,
    ) -> Result<Vec<ContentRecord>> {
        let records = self.records.read();
        let mut seen = Vec::new();
        let mut out = Vec::new();
        for id in ids {
            if seen.contains(id) {
                continue;
            }
            seen.push(*id);
            let Some(record) = records.get(id) else {
                continue;
            };
            if !kinds.contains(&record.kind) {
                continue;
            }
            if published_only && !record.is_published() {
                continue;
            }
            out.push(record.clone());
        }
        Ok(out)
    }

    async fn search(
        &self,
        text: &str,
        kinds: &[ContentKind],
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<ContentRecord>, i64)> {
        let text = text.trim().to_lowercase();
        if text.is_empty() {
            return Ok((vec![], 0));
        }

        let mut matches: Vec<ContentRecord> = self
            .records
            .read()
            .values()
            .filter(|r| kinds.contains(&r.kind) && r.is_published())
            .filter(|r| r.title.to_lowercase().contains(&text))
            .cloned()
            .collect();
        matches.sort_by_key(|r| (std::cmp::Reverse(r.created), std::cmp::Reverse(r.id)));

        let total = matches.len() as i64;
        let page = matches
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect();

        Ok((page, total))
    }
}
