//! Conflict repository port - Snapshot storage for conflict aggregates
//!
//! Every mutating operation persists the whole aggregate, so a load always
//! returns a consistent conflict.

use anyhow::Result;
use async_trait::async_trait;

use crate::domain::aggregates::ConflictAggregate;
use crate::domain::value_objects::ConflictId;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConflictRepositoryPort: Send + Sync {
    /// Insert or replace a snapshot
    async fn save(&self, conflict: &ConflictAggregate) -> Result<()>;

    async fn load(&self, id: ConflictId) -> Result<Option<ConflictAggregate>>;

    async fn delete(&self, id: ConflictId) -> Result<()>;

    /// All stored snapshots, concluded ones included
    async fn list(&self) -> Result<Vec<ConflictAggregate>>;
}
