//! Access policy boundary.
//!
//! Authorization is delegated to the host: who may edit content is the
//! host's call, this service only asks. The PostgreSQL policy reads the host
//! account table with a DashMap cache in front; the static policy serves
//! embedders and tests.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use dashmap::DashMap;
use sqlx::PgPool;

use crate::models::Account;

/// Host-delegated authorization decisions.
#[async_trait]
pub trait AccessPolicy: Send + Sync {
    /// Resolve an API token to an account.
    async fn authenticate(&self, token: &str) -> Result<Option<Account>>;

    /// Load the account behind a session id.
    async fn load_actor(&self, id: i64) -> Result<Option<Account>>;

    /// May this account edit the given entity?
    async fn can_edit(&self, actor: &Account, entity_id: i64) -> Result<bool>;

    /// May this account edit content at all (editorial search/browse)?
    async fn can_edit_content(&self, actor: &Account) -> Result<bool>;
}

/// Policy backed by the host account table.
#[derive(Clone)]
pub struct PgAccessPolicy {
    inner: Arc<PgAccessPolicyInner>,
}

struct PgAccessPolicyInner {
    /// Cache of account id -> account row.
    cache: DashMap<i64, Account>,

    /// Database pool for cache misses.
    pool: PgPool,
}

impl PgAccessPolicy {
    /// Create a new policy over the host account table.
    pub fn new(pool: PgPool) -> Self {
        Self {
            inner: Arc::new(PgAccessPolicyInner {
                cache: DashMap::new(),
                pool,
            }),
        }
    }

    /// Invalidate the cache for a specific account.
    ///
    /// Call this when the host changes an account's flags.
    pub fn invalidate(&self, account_id: i64) {
        self.inner.cache.remove(&account_id);
    }

    /// Invalidate the entire cache.
    pub fn invalidate_all(&self) {
        self.inner.cache.clear();
    }
}

#[async_trait]
impl AccessPolicy for PgAccessPolicy {
    async fn authenticate(&self, token: &str) -> Result<Option<Account>> {
        // Token lookups bypass the cache: tokens can be rotated host-side.
        let account = Account::find_by_token(&self.inner.pool, token).await?;

        if let Some(ref a) = account {
            self.inner.cache.insert(a.id, a.clone());
        }

        Ok(account)
    }

    async fn load_actor(&self, id: i64) -> Result<Option<Account>> {
        if let Some(cached) = self.inner.cache.get(&id) {
            return Ok(Some(cached.clone()));
        }

        let account = Account::find_by_id(&self.inner.pool, id).await?;

        if let Some(ref a) = account {
            self.inner.cache.insert(a.id, a.clone());
        }

        Ok(account)
    }

    async fn can_edit(&self, actor: &Account, _entity_id: i64) -> Result<bool> {
        // Admins and editors edit any curation; per-entity ownership stays a
        // host concern.
        Ok(actor.is_admin || actor.is_editor)
    }

    async fn can_edit_content(&self, actor: &Account) -> Result<bool> {
        Ok(actor.is_admin || actor.is_editor)
    }
}

/// Fixed in-process policy for embedders and tests.
#[derive(Default)]
pub struct StaticAccessPolicy {
    accounts: HashMap<i64, Account>,
    tokens: HashMap<String, i64>,
}

impl StaticAccessPolicy {
    /// Create an empty policy; every request is anonymous and denied.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an account, optionally reachable by an API token.
    pub fn with_account(mut self, account: Account, token: Option<&str>) -> Self {
        if let Some(token) = token {
            self.tokens.insert(token.to_string(), account.id);
        }
        self.accounts.insert(account.id, account);
        self
    }
}

#[async_trait]
impl AccessPolicy for StaticAccessPolicy {
    async fn authenticate(&self, token: &str) -> Result<Option<Account>> {
        Ok(self
            .tokens
            .get(token)
            .and_then(|id| self.accounts.get(id))
            .cloned())
    }

    async fn load_actor(&self, id: i64) -> Result<Option<Account>> {
        Ok(self.accounts.get(&id).cloned())
    }

    async fn can_edit(&self, actor: &Account, _entity_id: i64) -> Result<bool> {
        Ok(actor.is_admin || actor.is_editor)
    }

    async fn can_edit_content(&self, actor: &Account) -> Result<bool> {
        Ok(actor.is_admin || actor.is_editor)
    }
}
