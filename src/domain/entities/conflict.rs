//! Conflict entity - One tactical encounter at one location
//!
//! The conflict record carries identity, lifecycle and the participant roster.
//! Zones, assets and tasks are held next to it by the conflict aggregate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::domain::value_objects::{
    ConflictId, ConflictState, ConflictVariant, LocationId, ParticipantId, RevealPolicy, ZoneId,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conflict {
    pub id: ConflictId,
    pub variant: ConflictVariant,
    pub state: ConflictState,
    pub location_id: LocationId,
    pub name: String,
    pub participants: Vec<Participant>,
    pub objectives: BTreeMap<ParticipantId, Objective>,
    pub winners: BTreeSet<ParticipantId>,
    pub defeated: BTreeSet<ParticipantId>,
    /// Espionage only
    pub reveal_policy: RevealPolicy,
    pub created_at: DateTime<Utc>,
    pub concluded_at: Option<DateTime<Utc>>,
}

impl Conflict {
    pub fn new(variant: ConflictVariant, location_id: LocationId, created_at: DateTime<Utc>) -> Self {
        Self {
            id: ConflictId::new(),
            variant,
            state: ConflictState::Pending,
            location_id,
            name: variant.display_name().to_string(),
            participants: Vec::new(),
            objectives: BTreeMap::new(),
            winners: BTreeSet::new(),
            defeated: BTreeSet::new(),
            reveal_policy: RevealPolicy::default(),
            created_at,
            concluded_at: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_reveal_policy(mut self, policy: RevealPolicy) -> Self {
        self.reveal_policy = policy;
        self
    }

    pub fn is_participant(&self, id: ParticipantId) -> bool {
        self.participants.iter().any(|p| p.id == id)
    }

    pub fn participant(&self, id: ParticipantId) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id == id)
    }

    pub fn participant_mut(&mut self, id: ParticipantId) -> Option<&mut Participant> {
        self.participants.iter_mut().find(|p| p.id == id)
    }

    pub fn participant_ids(&self) -> Vec<ParticipantId> {
        self.participants.iter().map(|p| p.id).collect()
    }

    /// Participants who have not been defeated
    pub fn standing(&self) -> Vec<ParticipantId> {
        self.participants
            .iter()
            .map(|p| p.id)
            .filter(|id| !self.defeated.contains(id))
            .collect()
    }

    /// The other duelist, for two-person conflicts
    pub fn opponent_of(&self, id: ParticipantId) -> Option<ParticipantId> {
        if !self.is_participant(id) {
            return None;
        }
        self.participants.iter().map(|p| p.id).find(|p| *p != id)
    }

    pub fn is_concluded(&self) -> bool {
        self.state == ConflictState::Concluded
    }

    /// Move between pending and active as participants come and go
    pub fn refresh_state(&mut self) {
        let enough = self.participants.len() >= self.variant.min_participants();
        match self.state {
            ConflictState::Pending if enough => self.state = ConflictState::Active,
            ConflictState::Active if !enough => self.state = ConflictState::Pending,
            _ => {}
        }
    }

    pub fn conclude(&mut self, at: DateTime<Utc>) {
        self.state = ConflictState::Concluded;
        self.concluded_at = Some(at);
    }
}

/// A participant's place in a conflict
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub name: String,
    pub joined_at: DateTime<Utc>,
    /// Zone the participant stands in (skirmish and warfare)
    pub position: Option<ZoneId>,
}

impl Participant {
    pub fn new(id: ParticipantId, name: impl Into<String>, joined_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name: name.into(),
            joined_at,
            position: None,
        }
    }
}

/// What a participant is trying to achieve
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Objective {
    pub text: String,
    pub target_zones: Vec<String>,
}

impl Objective {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            target_zones: Vec::new(),
        }
    }

    pub fn with_target_zone(mut self, zone: impl Into<String>) -> Self {
        self.target_zones.push(zone.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_becomes_active_with_enough_participants() {
        let now = Utc::now();
        let mut conflict = Conflict::new(ConflictVariant::Duel, LocationId::new(), now);
        conflict
            .participants
            .push(Participant::new(ParticipantId::new(), "Paul", now));
        conflict.refresh_state();
        assert_eq!(conflict.state, ConflictState::Pending);

        conflict
            .participants
            .push(Participant::new(ParticipantId::new(), "Jamis", now));
        conflict.refresh_state();
        assert_eq!(conflict.state, ConflictState::Active);
    }

    #[test]
    fn test_falls_back_to_pending_when_short_handed() {
        let now = Utc::now();
        let mut conflict = Conflict::new(ConflictVariant::Skirmish, LocationId::new(), now);
        for name in ["Gurney", "Rabban"] {
            conflict
                .participants
                .push(Participant::new(ParticipantId::new(), name, now));
        }
        conflict.refresh_state();
        assert_eq!(conflict.state, ConflictState::Active);

        conflict.participants.pop();
        conflict.refresh_state();
        assert_eq!(conflict.state, ConflictState::Pending);

        conflict.conclude(now);
        conflict.refresh_state();
        assert!(conflict.is_concluded());
    }

    #[test]
    fn test_opponent_lookup() {
        let now = Utc::now();
        let paul = ParticipantId::new();
        let jamis = ParticipantId::new();
        let mut conflict = Conflict::new(ConflictVariant::Duel, LocationId::new(), now);
        conflict.participants.push(Participant::new(paul, "Paul", now));
        conflict.participants.push(Participant::new(jamis, "Jamis", now));
        assert_eq!(conflict.opponent_of(paul), Some(jamis));
        assert_eq!(conflict.opponent_of(ParticipantId::new()), None);
    }
}
