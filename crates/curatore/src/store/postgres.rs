//! PostgreSQL-backed curation membership storage.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::PgPool;

use super::CurationStore;

/// Membership storage in the `curation_item` table.
///
/// Rows carry an explicit `weight` column so stored order survives without
/// relying on insertion order. Rows cascade-delete with the owning curation
/// entity via the foreign key on `content`.
#[derive(Clone)]
pub struct PgCurationStore {
    pool: PgPool,
}

impl PgCurationStore {
    /// Create a new PostgreSQL store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CurationStore for PgCurationStore {
    async fn get(&self, curation_id: i64) -> Result<Vec<i64>> {
        let ids = sqlx::query_scalar::<_, i64>(
            "SELECT item_id FROM curation_item WHERE curation_id = $1 ORDER BY weight",
        )
        .bind(curation_id)
        .fetch_all(&self.pool)
        .await
        .context("failed to fetch curation membership")?;

        Ok(ids)
    }

    async fn replace_all(&self, curation_id: i64, ids: &[i64]) -> Result<()> {
        // Delete-then-insert in one transaction: readers of this curation see
        // either the old or the new membership.
        let mut tx = self
            .pool
            .begin()
            .await
            .context("failed to begin membership transaction")?;

        sqlx::query("DELETE FROM curation_item WHERE curation_id = $1")
            .bind(curation_id)
            .execute(&mut *tx)
            .await
            .context("failed to clear curation membership")?;

        for (weight, item_id) in ids.iter().enumerate() {
            sqlx::query(
                "INSERT INTO curation_item (curation_id, weight, item_id) VALUES ($1, $2, $3)",
            )
            .bind(curation_id)
            .bind(weight as i32)
            .bind(item_id)
            .execute(&mut *tx)
            .await
            .context("failed to insert curation membership row")?;
        }

        tx.commit()
            .await
            .context("failed to commit membership transaction")?;

        Ok(())
    }

    async fn ping(&self) -> bool {
        crate::db::check_health(&self.pool).await
    }
}
