//! PostgreSQL-backed content lookup.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::PgPool;

use super::ContentLookup;
use crate::models::{ContentKind, ContentRecord};

/// Content lookup reading the host `content` table.
#[derive(Clone)]
pub struct PgContentLookup {
    pool: PgPool,
    site_url: String,
}

/// Raw row shape; `kind` stays a string until conversion.
#[derive(sqlx::FromRow)]
struct ContentRow {
    id: i64,
    kind: String,
    slug: String,
    title: String,
    status: i16,
    created: i64,
}

const SELECT_COLUMNS: &str = "id, kind, slug, title, status, created";

impl PgContentLookup {
    /// Create a new lookup against the host content table.
    pub fn new(pool: PgPool, site_url: String) -> Self {
        Self {
            pool,
            site_url: site_url.trim_end_matches('/').to_string(),
        }
    }

    fn into_record(&self, row: ContentRow) -> Option<ContentRecord> {
        // Rows with kinds this service does not know are invisible to it.
        let kind = ContentKind::parse(&row.kind)?;
        Some(ContentRecord {
            permalink: format!("{}/{}", self.site_url, row.slug),
            id: row.id,
            kind,
            slug: row.slug,
            title: row.title,
            status: row.status,
            created: row.created,
        })
    }

    fn kind_names(kinds: &[ContentKind]) -> Vec<String> {
        kinds.iter().map(|k| k.as_str().to_string()).collect()
    }
}

/// Escape LIKE wildcards in user-supplied search text.
fn escape_like(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[async_trait]
impl ContentLookup for PgContentLookup {
    async fn find(&self, id: i64) -> Result<Option<ContentRecord>> {
        let row = sqlx::query_as::<_, ContentRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM content WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("failed to fetch content by id")?;

        Ok(row.and_then(|r| self.into_record(r)))
    }

    async fn find_by_path(&self, slug: &str, kind: ContentKind) -> Result<Option<i64>> {
        let id = sqlx::query_scalar::<_, i64>("SELECT id FROM content WHERE slug = $1 AND kind = $2")
            .bind(slug)
            .bind(kind.as_str())
            .fetch_optional(&self.pool)
            .await
            .context("failed to resolve content slug")?;

        Ok(id)
    }

    async fn fetch_in_order(
        &self,
        ids: &[i64],
        kinds: &[ContentKind],
        published_only: bool,
    ) -> Result<Vec<ContentRecord>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        // array_position keeps the caller's ordering, the stable sort the
        // embed contract requires.
        let status_clause = if published_only { "AND status = 1" } else { "" };
        let rows = sqlx::query_as::<_, ContentRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM content \
             WHERE id = ANY($1) AND kind = ANY($2) {status_clause} \
             ORDER BY array_position($1, id)"
        ))
        .bind(ids)
        .bind(Self::kind_names(kinds))
        .fetch_all(&self.pool)
        .await
        .context("failed to bulk-fetch content")?;

        Ok(rows
            .into_iter()
            .filter_map(|r| self.into_record(r))
            .collect())
    }

    async fn search(
        &self,
        text: &str,
        kinds: &[ContentKind],
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<ContentRecord>, i64)> {
        let text = text.trim();
        if text.is_empty() {
            return Ok((vec![], 0));
        }

        let pattern = format!("%{}%", escape_like(text));
        let kind_names = Self::kind_names(kinds);

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM content \
             WHERE kind = ANY($1) AND status = 1 AND title ILIKE $2",
        )
        .bind(&kind_names)
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await
        .context("failed to count search matches")?;

        let rows = sqlx::query_as::<_, ContentRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM content \
             WHERE kind = ANY($1) AND status = 1 AND title ILIKE $2 \
             ORDER BY created DESC, id DESC LIMIT $3 OFFSET $4"
        ))
        .bind(&kind_names)
        .bind(&pattern)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .context("failed to search content")?;

        let records = rows
            .into_iter()
            .filter_map(|r| self.into_record(r))
            .collect();

        Ok((records, total))
    }
}
