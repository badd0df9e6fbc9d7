//! In-memory curation membership storage.

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use parking_lot::RwLock;

use super::CurationStore;

/// Membership storage held in process memory.
///
/// Used by embedders that bring their own persistence and by tests. The map
/// is swapped whole under a write lock, which gives the same per-curation
/// atomicity the PostgreSQL store provides through transactions.
#[derive(Default)]
pub struct MemoryCurationStore {
    memberships: RwLock<HashMap<i64, Vec<i64>>>,
}

impl MemoryCurationStore {
    /// Create an empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CurationStore for MemoryCurationStore {
    async fn get(&self, curation_id: i64) -> Result<Vec<i64>> {
        Ok(self
            .memberships
            .read()
            .get(&curation_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn replace_all(&self, curation_id: i64, ids: &[i64]) -> Result<()> {
        self.memberships.write().insert(curation_id, ids.to_vec());
        Ok(())
    }

    async fn ping(&self) -> bool {
        true
    }
}
