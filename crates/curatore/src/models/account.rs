//! Account model backed by the host account table.
//!
//! Accounts are owned by the host; this service only reads the few columns
//! the access policy needs.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// Host account record.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Account {
    /// Host-assigned primary key.
    pub id: i64,

    /// Display name.
    pub name: String,

    /// Site administrator flag.
    pub is_admin: bool,

    /// Content editor flag.
    pub is_editor: bool,
}

impl Account {
    /// Find an account by ID.
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>> {
        let account = sqlx::query_as::<_, Account>(
            "SELECT id, name, is_admin, is_editor FROM account WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch account by id")?;

        Ok(account)
    }

    /// Find an account by its API token.
    pub async fn find_by_token(pool: &PgPool, token: &str) -> Result<Option<Self>> {
        let account = sqlx::query_as::<_, Account>(
            "SELECT id, name, is_admin, is_editor FROM account WHERE token = $1",
        )
        .bind(token)
        .fetch_optional(pool)
        .await
        .context("failed to fetch account by token")?;

        Ok(account)
    }
}
