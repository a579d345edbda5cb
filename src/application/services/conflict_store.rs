//! Conflict Store - Serialized access to the live conflict registry
//!
//! Every mutation takes the registry's write lock for its whole duration,
//! works on the full aggregate, then persists the snapshot before the lock is
//! released. A conflict that concludes during an operation leaves the registry
//! straight away; its final snapshot stays in the repository.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::application::ports::outbound::{ClockPort, ConflictRepositoryPort};
use crate::domain::aggregates::{ConflictAggregate, ConflictRegistry};
use crate::domain::errors::ConflictError;
use crate::domain::value_objects::ConflictId;

#[derive(Clone)]
pub struct ConflictStore {
    registry: Arc<RwLock<ConflictRegistry>>,
    repository: Arc<dyn ConflictRepositoryPort>,
    clock: Arc<dyn ClockPort>,
}

impl ConflictStore {
    pub fn new(repository: Arc<dyn ConflictRepositoryPort>, clock: Arc<dyn ClockPort>) -> Self {
        Self {
            registry: Arc::new(RwLock::new(ConflictRegistry::new())),
            repository,
            clock,
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Load every live snapshot from the repository into the registry
    pub async fn restore(&self) -> Result<usize> {
        let snapshots = self
            .repository
            .list()
            .await
            .context("Failed to list conflict snapshots")?;
        let mut registry = self.registry.write().await;
        let mut restored = 0;
        for snapshot in snapshots {
            if snapshot.conflict().is_concluded() {
                continue;
            }
            let id = snapshot.id();
            registry
                .insert(snapshot)
                .with_context(|| format!("Failed to restore conflict {}", id))?;
            restored += 1;
        }
        info!(restored, "Restored live conflicts");
        Ok(restored)
    }

    /// Run a read-only query against one conflict
    pub async fn read<T>(
        &self,
        id: ConflictId,
        query: impl FnOnce(&ConflictAggregate) -> Result<T, ConflictError>,
    ) -> Result<T> {
        let registry = self.registry.read().await;
        Ok(query(registry.get(id)?)?)
    }

    /// Run a read-only query against the whole registry
    pub async fn read_registry<T>(&self, query: impl FnOnce(&ConflictRegistry) -> T) -> T {
        let registry = self.registry.read().await;
        query(&registry)
    }

    /// Apply one mutation to one conflict and persist the result
    ///
    /// The mutation runs on a working copy that replaces the live aggregate
    /// only when it succeeds, so a failed command leaves the registry exactly
    /// as it was and nothing is saved.
    pub async fn mutate<T>(
        &self,
        id: ConflictId,
        mutation: impl FnOnce(&mut ConflictAggregate, DateTime<Utc>) -> Result<T, ConflictError>,
    ) -> Result<T> {
        let now = self.clock.now();
        let mut registry = self.registry.write().await;
        let aggregate = registry.get_mut(id)?;
        let mut working = aggregate.clone();
        let value = mutation(&mut working, now)?;
        *aggregate = working.clone();

        if working.conflict().is_concluded() {
            registry.remove(id)?;
            info!(conflict_id = %id, "Conflict concluded");
        }
        self.repository
            .save(&working)
            .await
            .context("Failed to save conflict snapshot")?;
        debug!(conflict_id = %id, "Saved conflict snapshot");
        Ok(value)
    }

    /// Apply a mutation to the registry itself (creating or ending conflicts)
    ///
    /// The mutation returns the aggregate to persist.
    pub async fn mutate_registry<T>(
        &self,
        mutation: impl FnOnce(
            &mut ConflictRegistry,
            DateTime<Utc>,
        ) -> Result<(T, ConflictAggregate), ConflictError>,
    ) -> Result<T> {
        let now = self.clock.now();
        let mut registry = self.registry.write().await;
        let (value, snapshot) = mutation(&mut registry, now)?;
        self.repository
            .save(&snapshot)
            .await
            .context("Failed to save conflict snapshot")?;
        debug!(conflict_id = %snapshot.id(), "Saved conflict snapshot");
        Ok(value)
    }
}
