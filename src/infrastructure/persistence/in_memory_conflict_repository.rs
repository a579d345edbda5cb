//! In-memory conflict snapshot store
//!
//! Snapshots are kept serialized, the way a document store would hold them, so
//! a load never aliases live registry state.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::application::ports::outbound::ConflictRepositoryPort;
use crate::domain::aggregates::ConflictAggregate;
use crate::domain::value_objects::ConflictId;

#[derive(Clone, Default)]
pub struct InMemoryConflictRepository {
    snapshots: Arc<RwLock<HashMap<ConflictId, String>>>,
}

impl InMemoryConflictRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn decode(id: ConflictId, raw: &str) -> Result<ConflictAggregate> {
    serde_json::from_str(raw).with_context(|| format!("Corrupt snapshot for conflict {}", id))
}

#[async_trait]
impl ConflictRepositoryPort for InMemoryConflictRepository {
    async fn save(&self, conflict: &ConflictAggregate) -> Result<()> {
        let raw = serde_json::to_string(conflict)
            .with_context(|| format!("Failed to serialize conflict {}", conflict.id()))?;
        self.snapshots.write().await.insert(conflict.id(), raw);
        Ok(())
    }

    async fn load(&self, id: ConflictId) -> Result<Option<ConflictAggregate>> {
        let snapshots = self.snapshots.read().await;
        snapshots.get(&id).map(|raw| decode(id, raw)).transpose()
    }

    async fn delete(&self, id: ConflictId) -> Result<()> {
        self.snapshots.write().await.remove(&id);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<ConflictAggregate>> {
        let snapshots = self.snapshots.read().await;
        snapshots.iter().map(|(id, raw)| decode(*id, raw)).collect()
    }
}
