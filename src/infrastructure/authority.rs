//! Roster authority - Participation rules from configuration
//!
//! Duels, skirmishes, espionage and intrigue are open to anyone. Warfare needs
//! a commander on the roster unless enlistment is open. Administrators may end
//! any conflict.

use std::collections::HashSet;

use anyhow::Result;
use async_trait::async_trait;

use crate::application::ports::outbound::{AuthorityPort, Authorization};
use crate::domain::value_objects::{ConflictVariant, ParticipantId};
use crate::infrastructure::config::AppConfig;

#[derive(Debug, Clone, Default)]
pub struct RosterAuthority {
    commanders: HashSet<ParticipantId>,
    admins: HashSet<ParticipantId>,
    open_enlistment: bool,
}

impl RosterAuthority {
    pub fn new(
        commanders: impl IntoIterator<Item = ParticipantId>,
        admins: impl IntoIterator<Item = ParticipantId>,
        open_enlistment: bool,
    ) -> Self {
        Self {
            commanders: commanders.into_iter().collect(),
            admins: admins.into_iter().collect(),
            open_enlistment,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            config.warfare_commanders.iter().copied(),
            config.admin_participants.iter().copied(),
            config.warfare_open_enlistment,
        )
    }
}

#[async_trait]
impl AuthorityPort for RosterAuthority {
    async fn can_participate(
        &self,
        participant: ParticipantId,
        variant: ConflictVariant,
    ) -> Result<Authorization> {
        if variant != ConflictVariant::Warfare
            || self.open_enlistment
            || self.commanders.contains(&participant)
        {
            return Ok(Authorization::granted());
        }
        Ok(Authorization::refused(
            "only commanders on the roster may take part in a warfare",
        ))
    }

    async fn is_admin(&self, participant: ParticipantId) -> Result<bool> {
        Ok(self.admins.contains(&participant))
    }
}
