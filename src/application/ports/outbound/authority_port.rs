//! Authority port - Who may take part in which kind of conflict

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{ConflictVariant, ParticipantId};

/// Answer to an authority query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Authorization {
    pub allowed: bool,
    /// Why the participant was refused
    pub reason: Option<String>,
}

impl Authorization {
    pub fn granted() -> Self {
        Self {
            allowed: true,
            reason: None,
        }
    }

    pub fn refused(reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            reason: Some(reason.into()),
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthorityPort: Send + Sync {
    /// Whether a participant may join a conflict of this variant
    async fn can_participate(
        &self,
        participant: ParticipantId,
        variant: ConflictVariant,
    ) -> Result<Authorization>;

    /// Administrators may end conflicts they are not part of
    async fn is_admin(&self, participant: ParticipantId) -> Result<bool>;
}
