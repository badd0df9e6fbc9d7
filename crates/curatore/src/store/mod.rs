//! Curation membership storage.
//!
//! Maps a curation id to its ordered membership of item ids. All membership
//! reads and writes go through the [`CurationStore`] trait so the composition
//! root decides the backing (PostgreSQL in the server, in-memory for
//! embedders and tests).

mod memory;
mod postgres;

pub use memory::MemoryCurationStore;
pub use postgres::PgCurationStore;

use anyhow::Result;
use async_trait::async_trait;

/// Ordered membership persistence for curations.
///
/// Membership is a flat sequence of item ids. Duplicates are permitted here;
/// deduplication is a read-time concern of the resolver. An empty sequence is
/// a valid stored state, distinct from "no curation" only through the host
/// content table.
#[async_trait]
pub trait CurationStore: Send + Sync {
    /// Get the stored membership for a curation, in stored order.
    ///
    /// Absent curations yield an empty sequence, never an error.
    async fn get(&self, curation_id: i64) -> Result<Vec<i64>>;

    /// Replace the entire membership for a curation.
    ///
    /// Atomic per curation: concurrent readers of the same id observe either
    /// the old or the new membership, never a partial state. An empty `ids`
    /// clears the membership.
    async fn replace_all(&self, curation_id: i64, ids: &[i64]) -> Result<()>;

    /// Check that the backing storage is reachable.
    async fn ping(&self) -> bool;
}
