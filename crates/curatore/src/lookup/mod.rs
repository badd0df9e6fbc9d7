//! Content lookup boundary.
//!
//! The host CMS owns posts, pages, and the curation entities themselves.
//! Everything the curation core needs from it — slug resolution, metadata,
//! publish status, permalinks — flows through the [`ContentLookup`] trait.

mod memory;
mod postgres;

pub use memory::MemoryContentLookup;
pub use postgres::PgContentLookup;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{ContentKind, ContentRecord};

/// Read access to host content entities.
///
/// Titles, permalinks, and publish status are carried on the returned
/// [`ContentRecord`] snapshots; there is no way to observe an entity except
/// through a record, so stale references simply produce no record.
#[async_trait]
pub trait ContentLookup: Send + Sync {
    /// Load a single entity by id, whatever its kind or status.
    async fn find(&self, id: i64) -> Result<Option<ContentRecord>>;

    /// Resolve a slug to an entity id, scoped to one kind.
    async fn find_by_path(&self, slug: &str, kind: ContentKind) -> Result<Option<i64>>;

    /// Bulk-fetch entities by id, preserving the order of `ids`.
    ///
    /// Restricted to the given kinds; when `published_only` is set,
    /// unpublished entities are dropped. Ids that match nothing are silently
    /// absent from the result.
    async fn fetch_in_order(
        &self,
        ids: &[i64],
        kinds: &[ContentKind],
        published_only: bool,
    ) -> Result<Vec<ContentRecord>>;

    /// Free-text title search over published entities of the given kinds.
    ///
    /// Returns one page of matches (newest first) plus the total match count.
    async fn search(
        &self,
        text: &str,
        kinds: &[ContentKind],
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<ContentRecord>, i64)>;
}
