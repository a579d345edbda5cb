//! Turn sequencer for duels and skirmishes

use serde::{Deserialize, Serialize};

use crate::domain::errors::ConflictError;
use crate::domain::value_objects::ParticipantId;

/// Momentum a participant must spend to keep the initiative
pub const KEEP_INITIATIVE_COST: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TurnPhase {
    #[default]
    Waiting,
    Active,
    Concluded,
}

/// Rotation through a fixed list of participants
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TurnState {
    pub order: Vec<ParticipantId>,
    pub index: usize,
    /// Where each round begins, the position of whoever acted first
    #[serde(default)]
    pub start: usize,
    pub round: u32,
    pub phase: TurnPhase,
    pub initiative_kept: bool,
    pub initiative_holder: Option<ParticipantId>,
    /// Who acts next instead of the rotation, after the initiative was kept
    pub pending_handoff: Option<ParticipantId>,
    /// Overrides the rotation for the current action
    pub acting: Option<ParticipantId>,
}

impl TurnState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_participant(&mut self, participant: ParticipantId) {
        if !self.order.contains(&participant) {
            self.order.push(participant);
        }
    }

    pub fn remove_participant(&mut self, participant: ParticipantId) {
        if let Some(pos) = self.order.iter().position(|p| *p == participant) {
            self.order.remove(pos);
            if pos < self.index {
                self.index -= 1;
            }
            if pos < self.start {
                self.start -= 1;
            }
            if self.index >= self.order.len() {
                self.index = 0;
            }
            if self.start >= self.order.len() {
                self.start = 0;
            }
        }
        if self.acting == Some(participant) {
            self.acting = None;
        }
        if self.pending_handoff == Some(participant) {
            self.pending_handoff = None;
        }
        if self.order.is_empty() {
            self.phase = TurnPhase::Waiting;
        }
    }

    pub fn is_running(&self) -> bool {
        self.phase == TurnPhase::Active
    }

    /// The participant allowed to act right now
    pub fn active(&self) -> Option<ParticipantId> {
        if !self.is_running() {
            return None;
        }
        self.acting.or_else(|| self.order.get(self.index).copied())
    }

    /// Start rotation at `first`, round one
    pub fn begin(&mut self, first: ParticipantId) -> Result<(), ConflictError> {
        let index = self
            .order
            .iter()
            .position(|p| *p == first)
            .ok_or(ConflictError::NotParticipant(first))?;
        self.index = index;
        self.start = index;
        self.round = 1;
        self.phase = TurnPhase::Active;
        self.initiative_kept = false;
        self.initiative_holder = Some(first);
        self.pending_handoff = None;
        self.acting = None;
        Ok(())
    }

    /// Hand the action to the next participant
    ///
    /// A pending hand-off from keeping the initiative is honoured first and
    /// does not advance the rotation. Coming back round to the participant who
    /// acted first starts a new round and clears the kept flag.
    pub fn next(&mut self) -> Result<ParticipantId, ConflictError> {
        if !self.is_running() || self.order.is_empty() {
            return Err(ConflictError::TurnsNotRunning);
        }

        if let Some(handoff) = self.pending_handoff.take() {
            self.acting = Some(handoff);
            return Ok(handoff);
        }

        self.acting = None;
        self.index = (self.index + 1) % self.order.len();
        if self.index == self.start {
            self.round += 1;
            self.initiative_kept = false;
        }
        let current = self.order[self.index];
        self.initiative_holder = Some(current);
        Ok(current)
    }

    /// Keep the initiative for `participant`, acting again or passing to an ally
    ///
    /// The engine only checks that the offered momentum covers the cost; the
    /// caller debits the pool.
    pub fn keep_initiative(
        &mut self,
        participant: ParticipantId,
        offered_momentum: u32,
        hand_off: Option<ParticipantId>,
    ) -> Result<InitiativeGrant, ConflictError> {
        if !self.is_running() {
            return Err(ConflictError::TurnsNotRunning);
        }
        if self.active() != Some(participant) {
            return Err(ConflictError::NotYourTurn(participant));
        }
        if self.initiative_kept {
            return Err(ConflictError::AlreadyKept);
        }
        if offered_momentum < KEEP_INITIATIVE_COST {
            return Err(ConflictError::InsufficientMomentum {
                required: KEEP_INITIATIVE_COST,
                offered: offered_momentum,
            });
        }
        let next_actor = hand_off.unwrap_or(participant);
        if !self.order.contains(&next_actor) {
            return Err(ConflictError::NotParticipant(next_actor));
        }

        self.initiative_kept = true;
        self.initiative_holder = Some(participant);
        self.pending_handoff = Some(next_actor);

        Ok(InitiativeGrant {
            holder: participant,
            next_actor,
            momentum_cost: KEEP_INITIATIVE_COST,
        })
    }

    /// Halt the rotation until turns are begun again
    pub fn stop(&mut self) {
        self.phase = TurnPhase::Waiting;
        self.initiative_kept = false;
        self.acting = None;
        self.pending_handoff = None;
    }

    pub fn conclude(&mut self) {
        self.phase = TurnPhase::Concluded;
        self.acting = None;
        self.pending_handoff = None;
    }
}

/// Outcome of keeping the initiative
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitiativeGrant {
    pub holder: ParticipantId,
    pub next_actor: ParticipantId,
    /// Momentum the caller must debit
    pub momentum_cost: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running(n: usize) -> (TurnState, Vec<ParticipantId>) {
        let people: Vec<ParticipantId> = (0..n).map(|_| ParticipantId::new()).collect();
        let mut turns = TurnState::new();
        for p in &people {
            turns.add_participant(*p);
        }
        turns.begin(people[0]).unwrap();
        (turns, people)
    }

    #[test]
    fn test_rotation_wraps_and_counts_rounds() {
        let (mut turns, people) = running(2);
        assert_eq!(turns.active(), Some(people[0]));
        assert_eq!(turns.next().unwrap(), people[1]);
        assert_eq!(turns.round, 1);
        assert_eq!(turns.next().unwrap(), people[0]);
        assert_eq!(turns.round, 2);
    }

    #[test]
    fn test_round_counts_from_whoever_began() {
        let people: Vec<ParticipantId> = (0..2).map(|_| ParticipantId::new()).collect();
        let mut turns = TurnState::new();
        for p in &people {
            turns.add_participant(*p);
        }
        turns.begin(people[1]).unwrap();
        turns.keep_initiative(people[1], 2, None).unwrap();

        assert_eq!(turns.next().unwrap(), people[1]);
        assert_eq!(turns.next().unwrap(), people[0]);
        assert_eq!(turns.round, 1);
        // the kept flag survives until the round really ends
        assert!(turns.initiative_kept);
        assert_eq!(
            turns.keep_initiative(people[0], 2, None).unwrap_err(),
            ConflictError::AlreadyKept
        );

        assert_eq!(turns.next().unwrap(), people[1]);
        assert_eq!(turns.round, 2);
        assert!(!turns.initiative_kept);
    }

    #[test]
    fn test_round_start_follows_removal() {
        let (mut turns, people) = running(3);
        turns.next().unwrap();
        turns.remove_participant(people[0]);
        assert_eq!(turns.active(), Some(people[1]));
        assert_eq!(turns.next().unwrap(), people[2]);
        assert_eq!(turns.round, 1);
        assert_eq!(turns.next().unwrap(), people[1]);
        assert_eq!(turns.round, 2);
    }

    #[test]
    fn test_keep_initiative_acts_again() {
        let (mut turns, people) = running(2);
        let grant = turns.keep_initiative(people[0], 2, None).unwrap();
        assert_eq!(grant.momentum_cost, KEEP_INITIATIVE_COST);
        assert_eq!(turns.next().unwrap(), people[0]);
        // rotation resumes after the extra action
        assert_eq!(turns.next().unwrap(), people[1]);
    }

    #[test]
    fn test_keep_initiative_hand_off_to_ally() {
        let (mut turns, people) = running(3);
        turns.keep_initiative(people[0], 3, Some(people[2])).unwrap();
        assert_eq!(turns.next().unwrap(), people[2]);
        assert_eq!(turns.active(), Some(people[2]));
    }

    #[test]
    fn test_keep_initiative_rules() {
        let (mut turns, people) = running(2);
        assert_eq!(
            turns.keep_initiative(people[1], 2, None).unwrap_err(),
            ConflictError::NotYourTurn(people[1])
        );
        assert!(matches!(
            turns.keep_initiative(people[0], 1, None),
            Err(ConflictError::InsufficientMomentum { required: 2, offered: 1 })
        ));
        turns.keep_initiative(people[0], 2, None).unwrap();
        turns.next().unwrap();
        assert_eq!(
            turns.keep_initiative(people[0], 2, None).unwrap_err(),
            ConflictError::AlreadyKept
        );
    }

    #[test]
    fn test_kept_flag_clears_on_new_round() {
        let (mut turns, people) = running(2);
        turns.keep_initiative(people[0], 2, None).unwrap();
        turns.next().unwrap();
        turns.next().unwrap();
        turns.next().unwrap();
        assert_eq!(turns.round, 2);
        assert!(!turns.initiative_kept);
    }

    #[test]
    fn test_next_requires_running() {
        let mut turns = TurnState::new();
        assert_eq!(turns.next().unwrap_err(), ConflictError::TurnsNotRunning);
    }
}
