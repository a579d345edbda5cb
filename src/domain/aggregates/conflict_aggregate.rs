//! Conflict Aggregate - The root aggregate for one tactical encounter
//!
//! A Conflict Aggregate owns everything belonging to a single conflict: its
//! zones, connections, assets, extended tasks and turn order. All
//! modifications go through here so that the cross-entity invariants hold:
//! every asset sits in a zone of this conflict, every owner is a participant,
//! and nothing changes once the conflict has concluded.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::{
    Asset, Conflict, Connection, DefeatedAsset, Desire, ExtendedTask, GuardSlot,
    InitiativeGrant, Objective, Participant, TaskProgress, TaskPurpose, TaskTarget, TurnState,
    Zone, ZoneProfile,
};
use crate::domain::errors::ConflictError;
use crate::domain::services::difficulty::{self, DifficultyReport};
use crate::domain::services::movement::{plan_move, MovePlan, MoveRequest};
use crate::domain::services::zone_graph::ZoneGraph;
use crate::domain::value_objects::{
    AssetId, ConflictId, ConflictState, ConflictVariant, Disposition, Manner, ParticipantId,
    RevealPolicy, TaskId, ZoneId,
};

/// Which duel zone an action addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "side", content = "slot", rename_all = "snake_case")]
pub enum DuelTarget {
    Own(GuardSlot),
    Opponent(GuardSlot),
}

/// How a command names a zone
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "by", content = "value", rename_all = "snake_case")]
pub enum ZoneRef {
    Id(ZoneId),
    /// Case-insensitive; in a duel, looked up among the actor's own zones
    Name(String),
    Duel(DuelTarget),
}

/// Result of moving an asset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveOutcome {
    pub asset_id: AssetId,
    pub asset_name: String,
    pub from: ZoneId,
    pub to: ZoneId,
    pub path: Vec<ZoneId>,
    pub difficulty_modifier: u32,
    pub message: String,
}

/// Result of moving a participant in skirmish or warfare
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelocationOutcome {
    pub participant: ParticipantId,
    pub from: Option<ZoneId>,
    pub to: ZoneId,
    /// Assets that travelled with the participant
    pub carried: Vec<AssetId>,
}

/// Something that happened because an extended task completed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TaskEffect {
    ParticipantDefeated { participant: ParticipantId },
    ConflictWon { winner: ParticipantId },
    AssetDefeated { asset: AssetId },
    DesireDiscovered { zone: ZoneId, by: Vec<ParticipantId> },
    InformationDiscovered { zone: ZoneId },
}

/// Result of contributing to an extended task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContributionOutcome {
    pub progress: TaskProgress,
    pub effects: Vec<TaskEffect>,
}

/// Everything belonging to one conflict
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConflictAggregate {
    conflict: Conflict,
    zones: Vec<Zone>,
    connections: Vec<Connection>,
    assets: Vec<Asset>,
    defeated_assets: Vec<DefeatedAsset>,
    tasks: Vec<ExtendedTask>,
    turns: Option<TurnState>,
}

impl ConflictAggregate {
    pub fn new(conflict: Conflict) -> Self {
        let turns = conflict.variant.uses_turns().then(TurnState::new);
        Self {
            conflict,
            zones: Vec::new(),
            connections: Vec::new(),
            assets: Vec::new(),
            defeated_assets: Vec::new(),
            tasks: Vec::new(),
            turns,
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn id(&self) -> ConflictId {
        self.conflict.id
    }

    pub fn conflict(&self) -> &Conflict {
        &self.conflict
    }

    pub fn variant(&self) -> ConflictVariant {
        self.conflict.variant
    }

    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn assets(&self) -> &[Asset] {
        &self.assets
    }

    pub fn defeated_assets(&self) -> &[DefeatedAsset] {
        &self.defeated_assets
    }

    pub fn tasks(&self) -> &[ExtendedTask] {
        &self.tasks
    }

    pub fn turns(&self) -> Option<&TurnState> {
        self.turns.as_ref()
    }

    pub fn graph(&self) -> ZoneGraph<'_> {
        ZoneGraph::new(self.conflict.variant, &self.zones, &self.connections)
    }

    pub fn zone(&self, id: ZoneId) -> Result<&Zone, ConflictError> {
        self.zones
            .iter()
            .find(|z| z.id == id)
            .ok_or_else(|| ConflictError::UnknownZone(id.to_string()))
    }

    /// Find a zone by name; duel zones are scoped to their owner
    pub fn zone_named(
        &self,
        name: &str,
        scope: Option<ParticipantId>,
    ) -> Result<&Zone, ConflictError> {
        self.graph()
            .find(name, scope)
            .ok_or_else(|| ConflictError::UnknownZone(name.to_string()))
    }

    pub fn asset(&self, id: AssetId) -> Result<&Asset, ConflictError> {
        self.assets
            .iter()
            .find(|a| a.id == id)
            .ok_or(ConflictError::UnknownAsset(id))
    }

    pub fn task(&self, id: TaskId) -> Result<&ExtendedTask, ConflictError> {
        self.tasks
            .iter()
            .find(|t| t.id == id)
            .ok_or(ConflictError::UnknownTask(id))
    }

    /// The running task against a target, if any
    pub fn task_for(&self, target: TaskTarget, purpose: TaskPurpose) -> Option<&ExtendedTask> {
        self.tasks
            .iter()
            .find(|t| t.target == target && t.purpose == purpose && !t.is_complete())
    }

    pub fn adjacent(&self, zone: ZoneId, observer: ParticipantId) -> Result<Vec<ZoneId>, ConflictError> {
        self.zone(zone)?;
        Ok(self.graph().adjacent(zone, observer))
    }

    pub fn assets_in_zone(&self, zone: ZoneId) -> Vec<&Asset> {
        self.assets.iter().filter(|a| a.zone == zone).collect()
    }

    pub fn defensive_assets_in_zone(
        &self,
        owner: ParticipantId,
        zone: ZoneId,
    ) -> Result<Vec<&Asset>, ConflictError> {
        let zone = self.zone(zone)?;
        Ok(difficulty::defensive_assets_in_zone(&self.assets, owner, zone))
    }

    // ========================================================================
    // Guards
    // ========================================================================

    fn ensure_live(&self) -> Result<(), ConflictError> {
        if self.conflict.is_concluded() {
            return Err(ConflictError::ConflictConcluded(self.conflict.id));
        }
        Ok(())
    }

    fn ensure_participant(&self, participant: ParticipantId) -> Result<(), ConflictError> {
        if !self.conflict.is_participant(participant) {
            return Err(ConflictError::NotParticipant(participant));
        }
        Ok(())
    }

    fn ensure_variant(&self, expected: ConflictVariant) -> Result<(), ConflictError> {
        if self.conflict.variant != expected {
            return Err(ConflictError::WrongVariant {
                expected: expected.to_string(),
                actual: self.conflict.variant.to_string(),
            });
        }
        Ok(())
    }

    /// Duel actions belong to whoever holds the turn, once turns are running
    fn ensure_turn(&self, actor: ParticipantId) -> Result<(), ConflictError> {
        if self.conflict.variant != ConflictVariant::Duel {
            return Ok(());
        }
        match self.turns.as_ref().and_then(|t| t.active()) {
            Some(active) if active != actor => Err(ConflictError::NotYourTurn(actor)),
            _ => Ok(()),
        }
    }

    fn zone_mut(&mut self, id: ZoneId) -> Result<&mut Zone, ConflictError> {
        self.zones
            .iter_mut()
            .find(|z| z.id == id)
            .ok_or_else(|| ConflictError::UnknownZone(id.to_string()))
    }

    fn asset_mut(&mut self, id: AssetId) -> Result<&mut Asset, ConflictError> {
        self.assets
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(ConflictError::UnknownAsset(id))
    }

    /// Every asset and position must point at a zone of this conflict
    pub fn check_invariants(&self) -> Result<(), ConflictError> {
        for asset in &self.assets {
            if !self.zones.iter().any(|z| z.id == asset.zone) {
                return Err(ConflictError::ForeignZone(asset.zone));
            }
            if !self.conflict.is_participant(asset.owner) {
                return Err(ConflictError::InvariantViolation(format!(
                    "asset {} is owned by a non-participant",
                    asset.id
                )));
            }
        }
        for participant in &self.conflict.participants {
            if let Some(position) = participant.position {
                if !self.zones.iter().any(|z| z.id == position) {
                    return Err(ConflictError::ForeignZone(position));
                }
            }
        }
        Ok(())
    }

    fn verify(&self) -> Result<(), ConflictError> {
        let result = self.check_invariants();
        debug_assert!(result.is_ok(), "conflict invariant broken: {:?}", result);
        result
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Add a participant. Duelists get their personal and guard zones.
    pub fn join(
        &mut self,
        participant: ParticipantId,
        name: impl Into<String>,
        at: DateTime<Utc>,
    ) -> Result<(), ConflictError> {
        self.ensure_live()?;
        if self.conflict.is_participant(participant) {
            return Err(ConflictError::AlreadyParticipant(participant));
        }
        if let Some(max) = self.conflict.variant.max_participants() {
            if self.conflict.participants.len() >= max {
                return Err(ConflictError::ConflictFull(self.conflict.variant));
            }
        }

        let name = name.into();
        if self.conflict.variant == ConflictVariant::Duel {
            self.zones.extend(Zone::duel_triple(participant, &name));
        }
        if let Some(turns) = self.turns.as_mut() {
            turns.add_participant(participant);
        }
        self.conflict
            .participants
            .push(Participant::new(participant, name, at));
        self.conflict.refresh_state();
        Ok(())
    }

    /// Remove a participant along with their assets, duel zones, objective and
    /// the tasks aimed at them
    ///
    /// A conflict left without enough participants drops back to pending and
    /// its turn rotation stops.
    pub fn leave(&mut self, participant: ParticipantId) -> Result<Vec<Asset>, ConflictError> {
        self.ensure_live()?;
        self.ensure_participant(participant)?;

        let (removed, kept): (Vec<Asset>, Vec<Asset>) = std::mem::take(&mut self.assets)
            .into_iter()
            .partition(|a| a.owner == participant);
        self.assets = kept;
        self.defeated_assets.retain(|d| d.asset.owner != participant);

        if self.conflict.variant == ConflictVariant::Duel {
            let owned: Vec<ZoneId> = self
                .zones
                .iter()
                .filter(|z| z.scope() == Some(participant))
                .map(|z| z.id)
                .collect();
            self.zones.retain(|z| z.scope() != Some(participant));
            // weapons that had been pushed into the leaver's zones go back home
            for asset in &mut self.assets {
                if owned.contains(&asset.zone) {
                    if let Some(home) = self
                        .zones
                        .iter()
                        .find(|z| z.matches(GuardSlot::Personal.name(), Some(asset.owner)))
                    {
                        asset.zone = home.id;
                    }
                }
            }
        }

        let zones = &self.zones;
        self.tasks.retain(|t| match t.target {
            TaskTarget::Participant(p) => p != participant,
            TaskTarget::Asset(a) => !removed.iter().any(|r| r.id == a),
            TaskTarget::Zone(z) => zones.iter().any(|zone| zone.id == z),
        });

        self.conflict.participants.retain(|p| p.id != participant);
        self.conflict.objectives.remove(&participant);
        self.conflict.refresh_state();
        let short_handed = self.conflict.state == ConflictState::Pending;
        if let Some(turns) = self.turns.as_mut() {
            turns.remove_participant(participant);
            if short_handed {
                turns.stop();
            }
        }
        self.verify()?;
        Ok(removed)
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        self.conflict.name = name.into();
    }

    pub fn set_objective(
        &mut self,
        participant: ParticipantId,
        objective: Objective,
    ) -> Result<(), ConflictError> {
        self.ensure_live()?;
        self.ensure_participant(participant)?;
        if self.conflict.variant != ConflictVariant::Duel {
            for name in &objective.target_zones {
                self.zone_named(name, None)?;
            }
        }
        self.conflict.objectives.insert(participant, objective);
        Ok(())
    }

    pub fn declare_winner(&mut self, participant: ParticipantId) -> Result<(), ConflictError> {
        self.ensure_live()?;
        self.ensure_participant(participant)?;
        self.conflict.winners.insert(participant);
        Ok(())
    }

    /// Mark a participant defeated. A duel ends when one combatant is left.
    pub fn mark_defeated(
        &mut self,
        participant: ParticipantId,
        at: DateTime<Utc>,
    ) -> Result<Vec<TaskEffect>, ConflictError> {
        self.ensure_live()?;
        self.ensure_participant(participant)?;
        let mut effects = Vec::new();
        if self.conflict.defeated.insert(participant) {
            effects.push(TaskEffect::ParticipantDefeated { participant });
        }

        if self.conflict.variant == ConflictVariant::Duel {
            let standing = self.conflict.standing();
            if let [winner] = standing.as_slice() {
                let winner = *winner;
                self.conflict.winners.insert(winner);
                self.conclude(at);
                effects.push(TaskEffect::ConflictWon { winner });
            }
        }
        Ok(effects)
    }

    /// End the conflict. Only participants or an administrator may do so.
    pub fn end(
        &mut self,
        caller: ParticipantId,
        admin_override: bool,
        at: DateTime<Utc>,
    ) -> Result<Vec<Asset>, ConflictError> {
        self.ensure_live()?;
        if !admin_override && !self.conflict.is_participant(caller) {
            return Err(ConflictError::NotAuthorized(caller));
        }
        Ok(self.conclude(at))
    }

    /// Move to the terminal state, releasing every asset
    fn conclude(&mut self, at: DateTime<Utc>) -> Vec<Asset> {
        self.conflict.conclude(at);
        if let Some(turns) = self.turns.as_mut() {
            turns.conclude();
        }
        self.defeated_assets.clear();
        std::mem::take(&mut self.assets)
    }

    // ========================================================================
    // Zones
    // ========================================================================

    pub fn add_zone(&mut self, zone: Zone) -> Result<ZoneId, ConflictError> {
        self.ensure_live()?;
        if zone.variant() != self.conflict.variant {
            return Err(ConflictError::WrongVariant {
                expected: self.conflict.variant.to_string(),
                actual: zone.variant().to_string(),
            });
        }
        if self.conflict.variant == ConflictVariant::Duel {
            return Err(ConflictError::IllegalZone(
                "duel zones are created when a combatant joins".to_string(),
            ));
        }
        if self.zones.iter().any(|z| z.matches(&zone.name, zone.scope())) {
            return Err(ConflictError::DuplicateZone(zone.name));
        }
        let id = zone.id;
        self.zones.push(zone);
        Ok(id)
    }

    /// Link two espionage zones in both directions
    pub fn connect(
        &mut self,
        a: ZoneId,
        b: ZoneId,
        kind: impl Into<String>,
        hidden: bool,
    ) -> Result<(), ConflictError> {
        self.ensure_live()?;
        self.ensure_variant(ConflictVariant::Espionage)?;
        self.zone(a)?;
        self.zone(b)?;
        if a == b {
            return Err(ConflictError::IllegalZone(
                "a zone cannot be connected to itself".to_string(),
            ));
        }
        let kind = kind.into();
        for (from, to) in [(a, b), (b, a)] {
            if !self.connections.iter().any(|c| c.links(from, to)) {
                self.connections
                    .push(Connection::new(from, to, kind.clone(), hidden));
            }
        }
        Ok(())
    }

    /// Resolve an own or opponent duel zone for `actor`
    pub fn resolve_duel_target(
        &self,
        actor: ParticipantId,
        target: DuelTarget,
    ) -> Result<ZoneId, ConflictError> {
        self.ensure_variant(ConflictVariant::Duel)?;
        self.ensure_participant(actor)?;
        let (owner, slot) = match target {
            DuelTarget::Own(slot) => (actor, slot),
            DuelTarget::Opponent(slot) => {
                let opponent = self.conflict.opponent_of(actor).ok_or_else(|| {
                    ConflictError::IllegalZone("you have no opponent yet".to_string())
                })?;
                (opponent, slot)
            }
        };
        Ok(self.zone_named(slot.name(), Some(owner))?.id)
    }

    /// Turn a command's zone reference into a zone of this conflict
    pub fn resolve_zone(&self, actor: ParticipantId, zone: &ZoneRef) -> Result<ZoneId, ConflictError> {
        match zone {
            ZoneRef::Id(id) => Ok(self.zone(*id)?.id),
            ZoneRef::Name(name) => {
                let scope = (self.conflict.variant == ConflictVariant::Duel).then_some(actor);
                Ok(self.zone_named(name, scope)?.id)
            }
            ZoneRef::Duel(target) => self.resolve_duel_target(actor, *target),
        }
    }

    /// Resolve a zone without an acting participant; duel zones need one
    pub fn resolve_shared_zone(&self, zone: &ZoneRef) -> Result<ZoneId, ConflictError> {
        match zone {
            ZoneRef::Id(id) => Ok(self.zone(*id)?.id),
            ZoneRef::Name(name) if self.conflict.variant != ConflictVariant::Duel => {
                Ok(self.zone_named(name, None)?.id)
            }
            _ => Err(ConflictError::IllegalZone(
                "duel zones are named relative to a combatant".to_string(),
            )),
        }
    }

    // ========================================================================
    // Assets
    // ========================================================================

    /// Put an asset into play in its zone
    pub fn place_asset(&mut self, asset: Asset) -> Result<AssetId, ConflictError> {
        self.ensure_live()?;
        self.ensure_participant(asset.owner)?;
        asset.quality.validate()?;
        if !asset.asset_type.allowed_in(self.conflict.variant) {
            return Err(ConflictError::WrongVariant {
                expected: format!("an asset usable in a {}", self.conflict.variant),
                actual: asset.asset_type.to_string(),
            });
        }
        if self.assets.iter().any(|a| a.id == asset.id) {
            return Err(ConflictError::InvariantViolation(format!(
                "asset {} is already in play",
                asset.id
            )));
        }

        let zone = self.zone(asset.zone)?;
        if !zone.is_visible_to(asset.owner) {
            return Err(ConflictError::ZoneNotVisible(zone.name.clone()));
        }
        if let Some(scope) = zone.scope() {
            if scope != asset.owner {
                return Err(ConflictError::IllegalZone(format!(
                    "assets enter play in your own zones, not in another duelist's {}",
                    zone.name
                )));
            }
        }

        if self.conflict.variant == ConflictVariant::Skirmish {
            let zone_id = zone.id;
            if let Some(owner) = self.conflict.participant_mut(asset.owner) {
                match owner.position {
                    None => owner.position = Some(zone_id),
                    Some(position) if position != zone_id => {
                        return Err(ConflictError::IllegalZone(
                            "assets enter play where their owner stands".to_string(),
                        ))
                    }
                    Some(_) => {}
                }
            }
        }

        let id = asset.id;
        self.assets.push(asset);
        self.verify()?;
        Ok(id)
    }

    /// Move an asset, applying every legality rule for the variant
    pub fn move_asset(
        &mut self,
        asset_id: AssetId,
        mover: ParticipantId,
        target: ZoneId,
        manner: Manner,
        second_hop: Option<ZoneId>,
    ) -> Result<MoveOutcome, ConflictError> {
        self.ensure_live()?;
        self.ensure_participant(mover)?;
        self.ensure_turn(mover)?;

        let asset = self.asset(asset_id)?;
        let plan: MovePlan = plan_move(
            &self.graph(),
            &self.assets,
            asset,
            MoveRequest {
                mover,
                target,
                manner,
                second_hop,
            },
        )?;

        let destination_name = self.zone(plan.destination)?.name.clone();
        let destination_owner = self.zone(plan.destination)?.scope();
        let asset = self.asset_mut(asset_id)?;
        asset.zone = plan.destination;
        let asset_name = asset.name.clone();
        self.verify()?;

        let message = match destination_owner {
            Some(owner) if owner != mover => {
                format!("{} moves into your opponent's {}.", asset_name, destination_name)
            }
            _ => format!("{} moves to {}.", asset_name, destination_name),
        };

        Ok(MoveOutcome {
            asset_id,
            asset_name,
            from: plan.from,
            to: plan.destination,
            path: plan.path,
            difficulty_modifier: plan.difficulty_modifier,
            message,
        })
    }

    /// Duel move addressed by own/opponent slot
    pub fn move_duel_asset(
        &mut self,
        asset_id: AssetId,
        mover: ParticipantId,
        target: DuelTarget,
    ) -> Result<MoveOutcome, ConflictError> {
        let zone = self.resolve_duel_target(mover, target)?;
        self.move_asset(asset_id, mover, zone, Manner::Normal, None)
    }

    /// Skirmish: point a ranged weapon at a zone, under the movement rules
    pub fn aim(
        &mut self,
        asset_id: AssetId,
        mover: ParticipantId,
        target: ZoneId,
    ) -> Result<MoveOutcome, ConflictError> {
        self.ensure_variant(ConflictVariant::Skirmish)?;
        let weapon = self.asset(asset_id)?;
        if !weapon.is_ranged() {
            return Err(ConflictError::IllegalZone(format!(
                "{} is not a ranged weapon",
                weapon.name
            )));
        }
        self.move_asset(asset_id, mover, target, Manner::Normal, None)
    }

    /// Move a participant; in skirmish their co-located assets go with them
    pub fn move_participant(
        &mut self,
        participant: ParticipantId,
        target: ZoneId,
    ) -> Result<RelocationOutcome, ConflictError> {
        self.ensure_live()?;
        self.ensure_participant(participant)?;
        if !self.conflict.variant.tracks_positions() {
            return Err(ConflictError::WrongVariant {
                expected: "skirmish or warfare".to_string(),
                actual: self.conflict.variant.to_string(),
            });
        }
        self.zone(target)?;

        let from = self
            .conflict
            .participant(participant)
            .and_then(|p| p.position);
        if let Some(from) = from {
            if from == target {
                return Err(ConflictError::IllegalZone(
                    "you are already there".to_string(),
                ));
            }
            if !self.graph().is_adjacent(from, target, participant) {
                return Err(ConflictError::NotAdjacent {
                    from: self.graph().display_name(from),
                    to: self.graph().display_name(target),
                });
            }
        }

        let mut carried = Vec::new();
        if self.conflict.variant == ConflictVariant::Skirmish {
            if let Some(from) = from {
                for asset in self
                    .assets
                    .iter_mut()
                    .filter(|a| a.owner == participant && a.zone == from)
                {
                    asset.zone = target;
                    carried.push(asset.id);
                }
            }
        }
        if let Some(p) = self.conflict.participant_mut(participant) {
            p.position = Some(target);
        }
        self.verify()?;

        Ok(RelocationOutcome {
            participant,
            from,
            to: target,
            carried,
        })
    }

    /// Knock an asset out. Warfare assets wait to be rallied; others leave play.
    pub fn defeat_asset(&mut self, asset_id: AssetId) -> Result<Asset, ConflictError> {
        self.ensure_live()?;
        let asset = self.take_asset(asset_id)?;
        if self.conflict.variant == ConflictVariant::Warfare {
            self.defeated_assets.push(DefeatedAsset::new(asset.clone()));
        }
        Ok(asset)
    }

    /// Remove an asset for good, including any pending rally
    pub fn destroy_asset(&mut self, asset_id: AssetId) -> Result<Asset, ConflictError> {
        self.ensure_live()?;
        if let Some(pos) = self
            .defeated_assets
            .iter()
            .position(|d| d.asset.id == asset_id)
        {
            return Ok(self.defeated_assets.remove(pos).asset);
        }
        self.take_asset(asset_id)
    }

    /// Espionage: an exposed agent or device is out of play
    pub fn expose_asset(&mut self, asset_id: AssetId) -> Result<Asset, ConflictError> {
        self.ensure_live()?;
        self.ensure_variant(ConflictVariant::Espionage)?;
        self.take_asset(asset_id)
    }

    fn take_asset(&mut self, asset_id: AssetId) -> Result<Asset, ConflictError> {
        let pos = self
            .assets
            .iter()
            .position(|a| a.id == asset_id)
            .ok_or(ConflictError::UnknownAsset(asset_id))?;
        Ok(self.assets.remove(pos))
    }

    /// Warfare: bring a defeated asset back at its reduced quality
    pub fn rally_asset(
        &mut self,
        asset_id: AssetId,
        caller: ParticipantId,
        zone: Option<ZoneId>,
    ) -> Result<Asset, ConflictError> {
        self.ensure_live()?;
        self.ensure_variant(ConflictVariant::Warfare)?;
        let pos = self
            .defeated_assets
            .iter()
            .position(|d| d.asset.id == asset_id)
            .ok_or(ConflictError::UnknownAsset(asset_id))?;
        if self.defeated_assets[pos].asset.owner != caller {
            return Err(ConflictError::NotOwner {
                asset: asset_id,
                caller,
            });
        }
        if let Some(zone) = zone {
            self.zone(zone)?;
        }

        let defeated = self.defeated_assets.remove(pos);
        let mut asset = defeated.asset;
        asset.quality = defeated.rally_quality;
        if let Some(zone) = zone {
            asset.zone = zone;
        }
        self.assets.push(asset.clone());
        self.verify()?;
        Ok(asset)
    }

    // ========================================================================
    // Difficulty
    // ========================================================================

    /// Duel attack against the opponent's zone the weapon has been moved into
    pub fn duel_attack_difficulty(
        &self,
        attacker: ParticipantId,
        weapon_id: AssetId,
        slot: GuardSlot,
    ) -> Result<DifficultyReport, ConflictError> {
        self.ensure_live()?;
        self.ensure_turn(attacker)?;
        let weapon = self.owned_asset(weapon_id, attacker)?;
        let zone_id = self.resolve_duel_target(attacker, DuelTarget::Opponent(slot))?;
        difficulty::duel_attack(&self.assets, weapon, self.zone(zone_id)?)
    }

    /// Skirmish attack on `defender` with a weapon already in their zone
    pub fn skirmish_attack_difficulty(
        &self,
        attacker: ParticipantId,
        weapon_id: AssetId,
        defender: ParticipantId,
    ) -> Result<DifficultyReport, ConflictError> {
        self.ensure_live()?;
        self.ensure_variant(ConflictVariant::Skirmish)?;
        self.ensure_participant(defender)?;
        let weapon = self.owned_asset(weapon_id, attacker)?;
        let attacker_zone = self.position_of(attacker)?;
        let target_zone = self.position_of(defender)?;
        difficulty::skirmish_attack(
            &self.graph(),
            &self.assets,
            weapon,
            attacker_zone,
            defender,
            target_zone,
        )
    }

    /// Espionage: difficulty to gather information from a zone
    pub fn espionage_gather_difficulty(
        &self,
        actor: ParticipantId,
        zone: ZoneId,
    ) -> Result<DifficultyReport, ConflictError> {
        self.ensure_live()?;
        self.ensure_variant(ConflictVariant::Espionage)?;
        self.ensure_participant(actor)?;
        difficulty::espionage_gather(&self.assets, self.zone(zone)?, actor)
    }

    /// Intrigue: difficulty to influence or attack a person or group
    pub fn intrigue_influence_difficulty(
        &self,
        actor: ParticipantId,
        zone: ZoneId,
    ) -> Result<DifficultyReport, ConflictError> {
        self.ensure_live()?;
        self.ensure_variant(ConflictVariant::Intrigue)?;
        self.ensure_participant(actor)?;
        Ok(difficulty::intrigue_influence(self.zone(zone)?, actor))
    }

    /// Warfare: difficulty for an asset to attack a zone
    pub fn warfare_attack_difficulty(
        &self,
        actor: ParticipantId,
        asset_id: AssetId,
        target_zone: ZoneId,
    ) -> Result<DifficultyReport, ConflictError> {
        self.ensure_live()?;
        self.ensure_variant(ConflictVariant::Warfare)?;
        let attacker = self.owned_asset(asset_id, actor)?;
        self.zone(target_zone)?;
        let commander = self
            .conflict
            .participant(actor)
            .and_then(|p| p.position);
        Ok(difficulty::warfare_attack(&self.assets, attacker, commander))
    }

    fn owned_asset(&self, asset_id: AssetId, owner: ParticipantId) -> Result<&Asset, ConflictError> {
        self.ensure_participant(owner)?;
        let asset = self.asset(asset_id)?;
        if asset.owner != owner {
            return Err(ConflictError::NotOwner {
                asset: asset_id,
                caller: owner,
            });
        }
        Ok(asset)
    }

    fn position_of(&self, participant: ParticipantId) -> Result<ZoneId, ConflictError> {
        self.conflict
            .participant(participant)
            .ok_or(ConflictError::NotParticipant(participant))?
            .position
            .ok_or_else(|| {
                ConflictError::IllegalZone(format!("{} has not taken a position", participant))
            })
    }

    // ========================================================================
    // Visibility and disposition
    // ========================================================================

    /// Reveal a hidden espionage zone to a participant. Idempotent.
    ///
    /// Returns whether anything changed.
    pub fn reveal_zone(
        &mut self,
        zone: ZoneId,
        participant: ParticipantId,
    ) -> Result<bool, ConflictError> {
        self.ensure_live()?;
        self.ensure_variant(ConflictVariant::Espionage)?;
        self.ensure_participant(participant)?;
        let policy = self.conflict.reveal_policy;
        match &mut self.zone_mut(zone)?.profile {
            ZoneProfile::Espionage {
                hidden,
                revealed_to,
                ..
            } => {
                let added = revealed_to.insert(participant);
                let cleared = policy == RevealPolicy::Global && *hidden;
                if cleared {
                    *hidden = false;
                }
                Ok(added || cleared)
            }
            _ => Err(ConflictError::InvariantViolation(
                "espionage conflict holds a non-espionage zone".to_string(),
            )),
        }
    }

    /// Reveal one direction of a hidden connection. Idempotent.
    pub fn reveal_connection(
        &mut self,
        from: ZoneId,
        to: ZoneId,
        participant: ParticipantId,
    ) -> Result<bool, ConflictError> {
        self.ensure_live()?;
        self.ensure_variant(ConflictVariant::Espionage)?;
        self.ensure_participant(participant)?;
        let policy = self.conflict.reveal_policy;
        let connection = self
            .connections
            .iter_mut()
            .find(|c| c.links(from, to))
            .ok_or_else(|| ConflictError::NotAdjacent {
                from: from.to_string(),
                to: to.to_string(),
            })?;
        let added = connection.revealed_to.insert(participant);
        let cleared = policy == RevealPolicy::Global && connection.hidden;
        if cleared {
            connection.hidden = false;
        }
        Ok(added || cleared)
    }

    fn intrigue_profile_mut(
        &mut self,
        zone: ZoneId,
    ) -> Result<&mut ZoneProfile, ConflictError> {
        self.ensure_live()?;
        self.ensure_variant(ConflictVariant::Intrigue)?;
        Ok(&mut self.zone_mut(zone)?.profile)
    }

    pub fn set_disposition(
        &mut self,
        zone: ZoneId,
        level: Disposition,
    ) -> Result<(), ConflictError> {
        if let ZoneProfile::Intrigue { disposition, .. } = self.intrigue_profile_mut(zone)? {
            *disposition = Some(level);
        }
        Ok(())
    }

    pub fn set_disposition_override(
        &mut self,
        zone: ZoneId,
        observer: ParticipantId,
        level: Disposition,
    ) -> Result<(), ConflictError> {
        if let ZoneProfile::Intrigue { overrides, .. } = self.intrigue_profile_mut(zone)? {
            overrides.insert(observer, level);
        }
        Ok(())
    }

    pub fn clear_disposition_override(
        &mut self,
        zone: ZoneId,
        observer: ParticipantId,
    ) -> Result<(), ConflictError> {
        if let ZoneProfile::Intrigue { overrides, .. } = self.intrigue_profile_mut(zone)? {
            overrides.remove(&observer);
        }
        Ok(())
    }

    /// Override for the observer, else the zone default, else neutral
    pub fn get_disposition(
        &self,
        zone: ZoneId,
        observer: ParticipantId,
    ) -> Result<Disposition, ConflictError> {
        self.ensure_variant(ConflictVariant::Intrigue)?;
        Ok(self.zone(zone)?.disposition_toward(observer))
    }

    pub fn set_desire(
        &mut self,
        zone: ZoneId,
        text: impl Into<String>,
        resistance: u32,
    ) -> Result<(), ConflictError> {
        if let ZoneProfile::Intrigue { desire, .. } = self.intrigue_profile_mut(zone)? {
            *desire = Some(Desire::new(text, resistance));
        }
        Ok(())
    }

    /// The desire of a zone, if the observer has uncovered it
    pub fn desire_for(
        &self,
        zone: ZoneId,
        observer: ParticipantId,
    ) -> Result<Option<String>, ConflictError> {
        self.ensure_variant(ConflictVariant::Intrigue)?;
        Ok(self
            .zone(zone)?
            .desire()
            .filter(|d| d.is_known_to(observer))
            .map(|d| d.text.clone()))
    }

    /// Warfare: hand a zone to a participant, or make it neutral
    pub fn set_zone_control(
        &mut self,
        zone: ZoneId,
        controller: Option<ParticipantId>,
    ) -> Result<(), ConflictError> {
        self.ensure_live()?;
        self.ensure_variant(ConflictVariant::Warfare)?;
        if let Some(p) = controller {
            self.ensure_participant(p)?;
        }
        if let ZoneProfile::Warfare { controller: current } = &mut self.zone_mut(zone)?.profile {
            *current = controller;
        }
        Ok(())
    }

    // ========================================================================
    // Extended tasks
    // ========================================================================

    /// Open an extended task against a participant, asset or zone
    pub fn start_task(
        &mut self,
        target: TaskTarget,
        purpose: TaskPurpose,
        requirement: u32,
        max_attempts: Option<u32>,
    ) -> Result<TaskId, ConflictError> {
        self.ensure_live()?;
        self.ensure_task_target(target)?;
        if self.task_for(target, purpose).is_some() {
            return Err(ConflictError::DuplicateTask);
        }
        let task = ExtendedTask::new(target, purpose, requirement).with_max_attempts(max_attempts);
        let id = task.id;
        self.tasks.push(task);
        Ok(id)
    }

    /// A task may only be worked while its target is still in the conflict
    fn ensure_task_target(&self, target: TaskTarget) -> Result<(), ConflictError> {
        match target {
            TaskTarget::Participant(p) => self.ensure_participant(p),
            TaskTarget::Asset(a) => self.asset(a).map(|_| ()),
            TaskTarget::Zone(z) => self.zone(z).map(|_| ()),
        }
    }

    /// Open a desire-discovery task using the desire's own resistance
    pub fn start_desire_task(&mut self, zone: ZoneId) -> Result<TaskId, ConflictError> {
        self.ensure_variant(ConflictVariant::Intrigue)?;
        let resistance = self
            .zone(zone)?
            .desire()
            .map(|d| d.resistance)
            .ok_or_else(|| ConflictError::IllegalZone("there is no desire to uncover".to_string()))?;
        self.start_task(TaskTarget::Zone(zone), TaskPurpose::Desire, resistance, None)
    }

    /// Add points to a task and apply what its completion implies
    pub fn contribute(
        &mut self,
        task_id: TaskId,
        contributor: ParticipantId,
        points: u32,
        at: DateTime<Utc>,
    ) -> Result<ContributionOutcome, ConflictError> {
        self.ensure_live()?;
        self.ensure_participant(contributor)?;
        let target = self
            .tasks
            .iter()
            .find(|t| t.id == task_id)
            .ok_or(ConflictError::UnknownTask(task_id))?
            .target;
        self.ensure_task_target(target)?;

        let task = self
            .tasks
            .iter_mut()
            .find(|t| t.id == task_id)
            .ok_or(ConflictError::UnknownTask(task_id))?;
        let progress = task.contribute(contributor, points)?;
        let contributors: Vec<ParticipantId> = task.contributors.iter().copied().collect();

        let mut effects = Vec::new();
        if progress.complete {
            match (progress.purpose, progress.target) {
                (TaskPurpose::Defeat, TaskTarget::Participant(p)) => {
                    effects.extend(self.mark_defeated(p, at)?);
                }
                (TaskPurpose::Defeat, TaskTarget::Asset(a)) => {
                    self.defeat_asset(a)?;
                    effects.push(TaskEffect::AssetDefeated { asset: a });
                }
                (TaskPurpose::Desire, TaskTarget::Zone(z)) => {
                    if let ZoneProfile::Intrigue {
                        desire: Some(desire),
                        ..
                    } = &mut self.zone_mut(z)?.profile
                    {
                        desire.discovered_by.extend(contributors.iter().copied());
                    }
                    effects.push(TaskEffect::DesireDiscovered {
                        zone: z,
                        by: contributors,
                    });
                }
                (TaskPurpose::Discovery, TaskTarget::Zone(z)) => {
                    effects.push(TaskEffect::InformationDiscovered { zone: z });
                }
                _ => {}
            }
        }

        Ok(ContributionOutcome { progress, effects })
    }

    pub fn discard_task(&mut self, task_id: TaskId) -> Result<ExtendedTask, ConflictError> {
        self.ensure_live()?;
        let pos = self
            .tasks
            .iter()
            .position(|t| t.id == task_id)
            .ok_or(ConflictError::UnknownTask(task_id))?;
        Ok(self.tasks.remove(pos))
    }

    // ========================================================================
    // Turns
    // ========================================================================

    fn turns_mut(&mut self) -> Result<&mut TurnState, ConflictError> {
        let variant = self.conflict.variant;
        self.turns.as_mut().ok_or_else(|| ConflictError::WrongVariant {
            expected: "duel or skirmish".to_string(),
            actual: variant.to_string(),
        })
    }

    pub fn begin_turns(&mut self, first: ParticipantId) -> Result<(), ConflictError> {
        self.ensure_live()?;
        self.ensure_participant(first)?;
        self.turns_mut()?.begin(first)
    }

    pub fn next_turn(&mut self) -> Result<ParticipantId, ConflictError> {
        self.ensure_live()?;
        self.turns_mut()?.next()
    }

    pub fn keep_initiative(
        &mut self,
        participant: ParticipantId,
        offered_momentum: u32,
        hand_off: Option<ParticipantId>,
    ) -> Result<InitiativeGrant, ConflictError> {
        self.ensure_live()?;
        self.ensure_participant(participant)?;
        self.turns_mut()?
            .keep_initiative(participant, offered_momentum, hand_off)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{AssetType, EspionageZoneKind, IntrigueZoneKind};
    use crate::domain::value_objects::{LocationId, Quality};

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    fn conflict(variant: ConflictVariant) -> ConflictAggregate {
        ConflictAggregate::new(Conflict::new(variant, LocationId::new(), now()))
    }

    fn with_people(variant: ConflictVariant, names: &[&str]) -> (ConflictAggregate, Vec<ParticipantId>) {
        let mut agg = conflict(variant);
        let ids: Vec<ParticipantId> = names.iter().map(|_| ParticipantId::new()).collect();
        for (id, name) in ids.iter().zip(names) {
            agg.join(*id, *name, now()).unwrap();
        }
        (agg, ids)
    }

    // ------------------------------------------------------------------------
    // Duel
    // ------------------------------------------------------------------------

    #[test]
    fn test_duel_scenario_crysknife() {
        let (mut duel, people) = with_people(ConflictVariant::Duel, &["Paul", "Jamis"]);
        let (paul, jamis) = (people[0], people[1]);
        assert_eq!(duel.conflict().state, ConflictState::Active);

        let personal = duel.resolve_duel_target(paul, DuelTarget::Own(GuardSlot::Personal)).unwrap();
        let knife = duel
            .place_asset(Asset::new("Crysknife", paul, personal, AssetType::Weapon, Quality::Rated(2)))
            .unwrap();

        // attacking before the knife is in position is refused
        let err = duel
            .duel_attack_difficulty(paul, knife, GuardSlot::Personal)
            .unwrap_err();
        assert!(err.to_string().contains("first"));

        let outcome = duel
            .move_duel_asset(knife, paul, DuelTarget::Opponent(GuardSlot::Personal))
            .unwrap();
        let jamis_personal = duel
            .resolve_duel_target(jamis, DuelTarget::Own(GuardSlot::Personal))
            .unwrap();
        assert_eq!(outcome.to, jamis_personal);
        assert!(outcome.message.contains("opponent's personal"));

        let report = duel
            .duel_attack_difficulty(paul, knife, GuardSlot::Personal)
            .unwrap();
        assert_eq!(report.difficulty, 1);

        // the same knife is not in the left guard
        assert!(duel
            .duel_attack_difficulty(paul, knife, GuardSlot::LeftGuard)
            .is_err());
    }

    #[test]
    fn test_duel_limits_and_turns() {
        let (mut duel, people) = with_people(ConflictVariant::Duel, &["Paul", "Jamis"]);
        assert_eq!(
            duel.join(ParticipantId::new(), "Stilgar", now()).unwrap_err(),
            ConflictError::ConflictFull(ConflictVariant::Duel)
        );

        let personal = duel
            .resolve_duel_target(people[1], DuelTarget::Own(GuardSlot::Personal))
            .unwrap();
        let blade = duel
            .place_asset(Asset::new("Blade", people[1], personal, AssetType::Weapon, Quality::Rated(1)))
            .unwrap();

        duel.begin_turns(people[0]).unwrap();
        assert_eq!(
            duel.move_duel_asset(blade, people[1], DuelTarget::Own(GuardSlot::LeftGuard))
                .unwrap_err(),
            ConflictError::NotYourTurn(people[1])
        );
        assert_eq!(duel.next_turn().unwrap(), people[1]);
        assert!(duel
            .move_duel_asset(blade, people[1], DuelTarget::Own(GuardSlot::LeftGuard))
            .is_ok());
    }

    #[test]
    fn test_duel_defeat_concludes() {
        let (mut duel, people) = with_people(ConflictVariant::Duel, &["Paul", "Jamis"]);
        let task = duel
            .start_task(TaskTarget::Participant(people[1]), TaskPurpose::Defeat, 2, None)
            .unwrap();
        duel.contribute(task, people[0], 1, now()).unwrap();
        let outcome = duel.contribute(task, people[0], 1, now()).unwrap();
        assert!(outcome.progress.complete);
        assert!(outcome
            .effects
            .contains(&TaskEffect::ConflictWon { winner: people[0] }));
        assert!(duel.conflict().is_concluded());
        assert!(duel.conflict().winners.contains(&people[0]));
        assert_eq!(
            duel.next_turn().unwrap_err(),
            ConflictError::ConflictConcluded(duel.id())
        );
    }

    #[test]
    fn test_resolve_zone_by_name_is_scoped_to_actor() {
        let (duel, people) = with_people(ConflictVariant::Duel, &["Paul", "Jamis"]);
        let own = duel
            .resolve_zone(people[0], &ZoneRef::Name("Left_Guard".to_string()))
            .unwrap();
        assert_eq!(
            own,
            duel.resolve_duel_target(people[0], DuelTarget::Own(GuardSlot::LeftGuard))
                .unwrap()
        );
        let theirs = duel
            .resolve_zone(people[0], &ZoneRef::Duel(DuelTarget::Opponent(GuardSlot::LeftGuard)))
            .unwrap();
        assert_ne!(own, theirs);
        assert!(duel
            .resolve_zone(people[0], &ZoneRef::Name("throne room".to_string()))
            .is_err());
    }

    #[test]
    fn test_place_rejects_quality_above_five() {
        let (mut fight, people) = with_people(ConflictVariant::Skirmish, &["Gurney", "Rabban"]);
        let ridge = fight.add_zone(Zone::skirmish("Ridge", "rocky")).unwrap();
        let err = fight
            .place_asset(Asset::new("Blade", people[0], ridge, AssetType::Weapon, Quality::Rated(200)))
            .unwrap_err();
        assert_eq!(err, ConflictError::InvalidQuality("200".to_string()));
        assert!(fight.assets().is_empty());
    }

    #[test]
    fn test_cannot_place_in_opponent_zone() {
        let (mut duel, people) = with_people(ConflictVariant::Duel, &["Paul", "Jamis"]);
        let theirs = duel
            .resolve_duel_target(people[0], DuelTarget::Opponent(GuardSlot::Personal))
            .unwrap();
        let err = duel
            .place_asset(Asset::new("Knife", people[0], theirs, AssetType::Weapon, Quality::Rated(1)))
            .unwrap_err();
        assert!(matches!(err, ConflictError::IllegalZone(_)));
    }

    // ------------------------------------------------------------------------
    // Skirmish
    // ------------------------------------------------------------------------

    #[test]
    fn test_skirmish_relocation_and_aim() {
        let (mut fight, people) = with_people(ConflictVariant::Skirmish, &["Gurney", "Rabban"]);
        let (gurney, rabban) = (people[0], people[1]);
        let ridge = fight.add_zone(Zone::skirmish("Ridge", "rocky")).unwrap();
        let basin = fight.add_zone(Zone::skirmish("Basin", "sand")).unwrap();
        let caves = fight.add_zone(Zone::skirmish("Caves", "dark")).unwrap();

        let rifle = fight
            .place_asset(
                Asset::new("Lasgun", gurney, ridge, AssetType::Weapon, Quality::Rated(2))
                    .with_keywords(["ranged"]),
            )
            .unwrap();
        fight
            .place_asset(Asset::new("Armor", gurney, ridge, AssetType::Armor, Quality::Rated(1)))
            .unwrap();
        fight
            .place_asset(Asset::new("Shield", rabban, caves, AssetType::Shield, Quality::Rated(2)))
            .unwrap();

        // everything in the skirmish is one hop away, even the far caves
        let aimed = fight.aim(rifle, gurney, caves).unwrap();
        assert_eq!(aimed.to, caves);

        let report = fight.skirmish_attack_difficulty(gurney, rifle, rabban).unwrap();
        // base 1, +1 range, +1 full shield vs ranged
        assert_eq!(report.difficulty, 3);

        let moved = fight.move_participant(gurney, basin).unwrap();
        // the armor went along, the aimed rifle stayed where it points
        assert_eq!(moved.carried.len(), 1);
        assert_eq!(fight.asset(rifle).unwrap().zone, caves);
    }

    #[test]
    fn test_skirmish_armor_cannot_move_alone() {
        let (mut fight, people) = with_people(ConflictVariant::Skirmish, &["Gurney", "Rabban"]);
        let ridge = fight.add_zone(Zone::skirmish("Ridge", "rocky")).unwrap();
        let basin = fight.add_zone(Zone::skirmish("Basin", "sand")).unwrap();
        let armor = fight
            .place_asset(Asset::new("Armor", people[0], ridge, AssetType::Armor, Quality::Rated(1)))
            .unwrap();
        assert_eq!(
            fight
                .move_asset(armor, people[0], basin, Manner::Normal, None)
                .unwrap_err(),
            ConflictError::Immobile(armor)
        );
    }

    #[test]
    fn test_duplicate_zone_names() {
        let (mut fight, _) = with_people(ConflictVariant::Skirmish, &["Gurney"]);
        fight.add_zone(Zone::skirmish("Ridge", "rocky")).unwrap();
        assert_eq!(
            fight.add_zone(Zone::skirmish("ridge", "sand")).unwrap_err(),
            ConflictError::DuplicateZone("ridge".to_string())
        );
    }

    // ------------------------------------------------------------------------
    // Espionage
    // ------------------------------------------------------------------------

    fn espionage() -> (ConflictAggregate, ParticipantId, ParticipantId, ZoneId, ZoneId) {
        let (mut op, people) = with_people(ConflictVariant::Espionage, &["Thufir", "Piter"]);
        let market = op
            .add_zone(Zone::espionage("Market", EspionageZoneKind::Place, false))
            .unwrap();
        let vault = op
            .add_zone(Zone::espionage("Vault", EspionageZoneKind::Place, true))
            .unwrap();
        op.connect(market, vault, "tunnel", false).unwrap();
        (op, people[0], people[1], market, vault)
    }

    #[test]
    fn test_espionage_security_scenario() {
        let (mut op, thufir, piter, market, _) = espionage();
        let palace = op
            .add_zone(Zone::espionage("Palace", EspionageZoneKind::Place, false))
            .unwrap();
        op.connect(market, palace, "road", false).unwrap();
        op.place_asset(Asset::new("Guards", piter, palace, AssetType::Security, Quality::Rated(2)))
            .unwrap();
        let spy = op
            .place_asset(Asset::new("Spy", thufir, market, AssetType::Spy, Quality::Rated(1)))
            .unwrap();

        assert!(matches!(
            op.move_asset(spy, thufir, palace, Manner::Normal, None),
            Err(ConflictError::SecurityTooHigh { .. })
        ));
        let outcome = op
            .move_asset(spy, thufir, palace, Manner::Subtle, None)
            .unwrap();
        assert_eq!(outcome.difficulty_modifier, 1);
        assert_eq!(op.espionage_gather_difficulty(thufir, palace).unwrap().difficulty, 1);
    }

    #[test]
    fn test_reveal_is_idempotent_and_per_observer() {
        let (mut op, thufir, piter, market, vault) = espionage();
        let spy = op
            .place_asset(Asset::new("Spy", thufir, market, AssetType::Spy, Quality::Rated(3)))
            .unwrap();
        assert_eq!(
            op.move_asset(spy, thufir, vault, Manner::Normal, None).unwrap_err(),
            ConflictError::ZoneNotVisible("Vault".to_string())
        );

        assert!(op.reveal_zone(vault, thufir).unwrap());
        let once = op.zone(vault).unwrap().clone();
        assert!(!op.reveal_zone(vault, thufir).unwrap());
        let twice = op.zone(vault).unwrap().clone();
        assert_eq!(
            serde_json::to_value(&once).unwrap(),
            serde_json::to_value(&twice).unwrap()
        );

        assert!(op.zone(vault).unwrap().is_visible_to(thufir));
        assert!(!op.zone(vault).unwrap().is_visible_to(piter));
        assert!(op.move_asset(spy, thufir, vault, Manner::Normal, None).is_ok());
    }

    #[test]
    fn test_global_reveal_policy_clears_hidden() {
        let mut op = ConflictAggregate::new(
            Conflict::new(ConflictVariant::Espionage, LocationId::new(), now())
                .with_reveal_policy(RevealPolicy::Global),
        );
        let thufir = ParticipantId::new();
        let piter = ParticipantId::new();
        op.join(thufir, "Thufir", now()).unwrap();
        op.join(piter, "Piter", now()).unwrap();
        let vault = op
            .add_zone(Zone::espionage("Vault", EspionageZoneKind::Place, true))
            .unwrap();
        op.reveal_zone(vault, thufir).unwrap();
        assert!(op.zone(vault).unwrap().is_visible_to(piter));
    }

    #[test]
    fn test_hidden_connection_reveal() {
        let (mut op, thufir, piter, market, _) = espionage();
        let den = op
            .add_zone(Zone::espionage("Den", EspionageZoneKind::Place, false))
            .unwrap();
        op.connect(market, den, "secret door", true).unwrap();
        assert!(!op.adjacent(market, thufir).unwrap().contains(&den));
        op.reveal_connection(market, den, thufir).unwrap();
        assert!(op.adjacent(market, thufir).unwrap().contains(&den));
        assert!(!op.adjacent(market, piter).unwrap().contains(&den));
        // the reverse direction keeps its own reveal set
        assert!(!op.adjacent(den, thufir).unwrap().contains(&market));
    }

    #[test]
    fn test_connect_only_in_espionage() {
        let (mut fight, _) = with_people(ConflictVariant::Skirmish, &["Gurney"]);
        let a = fight.add_zone(Zone::skirmish("A", "x")).unwrap();
        let b = fight.add_zone(Zone::skirmish("B", "y")).unwrap();
        assert!(matches!(
            fight.connect(a, b, "road", false),
            Err(ConflictError::WrongVariant { .. })
        ));
    }

    #[test]
    fn test_expose_removes_asset() {
        let (mut op, thufir, _, market, _) = espionage();
        let spy = op
            .place_asset(Asset::new("Spy", thufir, market, AssetType::Spy, Quality::Rated(1)))
            .unwrap();
        op.expose_asset(spy).unwrap();
        assert_eq!(op.asset(spy).unwrap_err(), ConflictError::UnknownAsset(spy));
    }

    // ------------------------------------------------------------------------
    // Intrigue
    // ------------------------------------------------------------------------

    #[test]
    fn test_intrigue_disposition_scenario() {
        let (mut court, people) = with_people(ConflictVariant::Intrigue, &["Jessica", "Margot"]);
        let (x, y) = (people[0], people[1]);
        let count = court
            .add_zone(Zone::intrigue("Count Fenring", IntrigueZoneKind::Person))
            .unwrap();

        assert_eq!(court.get_disposition(count, x).unwrap(), Disposition::Neutral);
        court.set_disposition(count, Disposition::Unfriendly).unwrap();
        court
            .set_disposition_override(count, x, Disposition::Allied)
            .unwrap();
        assert_eq!(court.get_disposition(count, x).unwrap(), Disposition::Allied);
        assert_eq!(court.get_disposition(count, y).unwrap(), Disposition::Unfriendly);

        assert_eq!(court.intrigue_influence_difficulty(x, count).unwrap().difficulty, 0);
        assert_eq!(court.intrigue_influence_difficulty(y, count).unwrap().difficulty, 2);

        court.clear_disposition_override(count, x).unwrap();
        assert_eq!(court.get_disposition(count, x).unwrap(), Disposition::Unfriendly);
    }

    #[test]
    fn test_desire_discovery() {
        let (mut court, people) = with_people(ConflictVariant::Intrigue, &["Jessica", "Margot"]);
        let count = court
            .add_zone(Zone::intrigue("Count Fenring", IntrigueZoneKind::Person))
            .unwrap();
        court.set_desire(count, "To be Emperor", 2).unwrap();
        assert_eq!(court.desire_for(count, people[0]).unwrap(), None);

        let task = court.start_desire_task(count).unwrap();
        court.contribute(task, people[0], 1, now()).unwrap();
        let outcome = court.contribute(task, people[0], 1, now()).unwrap();
        assert!(matches!(
            outcome.effects.as_slice(),
            [TaskEffect::DesireDiscovered { .. }]
        ));
        assert_eq!(
            court.desire_for(count, people[0]).unwrap().as_deref(),
            Some("To be Emperor")
        );
        assert_eq!(court.desire_for(count, people[1]).unwrap(), None);
    }

    // ------------------------------------------------------------------------
    // Warfare
    // ------------------------------------------------------------------------

    #[test]
    fn test_warfare_rally_scenario() {
        let (mut war, people) = with_people(ConflictVariant::Warfare, &["Leto", "Baron"]);
        let leto = people[0];
        let wall = war.add_zone(Zone::warfare("Shield Wall")).unwrap();
        let troops = war
            .place_asset(Asset::new("Atreides troops", leto, wall, AssetType::Infantry, Quality::Rated(3)))
            .unwrap();

        war.defeat_asset(troops).unwrap();
        assert_eq!(war.defeated_assets()[0].rally_quality, Quality::Rated(2));
        assert!(war.asset(troops).is_err());

        let rallied = war.rally_asset(troops, leto, None).unwrap();
        assert_eq!(rallied.quality, Quality::Rated(2));
        assert_eq!(rallied.zone, wall);
        assert!(war.defeated_assets().is_empty());
    }

    #[test]
    fn test_rally_keeps_task_progress() {
        let (mut war, people) = with_people(ConflictVariant::Warfare, &["Leto", "Baron"]);
        let (leto, baron) = (people[0], people[1]);
        let wall = war.add_zone(Zone::warfare("Shield Wall")).unwrap();
        let troops = war
            .place_asset(Asset::new("Troops", leto, wall, AssetType::Infantry, Quality::Rated(3)))
            .unwrap();
        let task = war
            .start_task(TaskTarget::Asset(troops), TaskPurpose::Defeat, 1, None)
            .unwrap();
        let outcome = war.contribute(task, baron, 1, now()).unwrap();
        assert_eq!(outcome.effects, vec![TaskEffect::AssetDefeated { asset: troops }]);

        war.rally_asset(troops, leto, None).unwrap();
        let status = war.task(task).unwrap().status();
        assert_eq!(status.accumulated, 1);
        assert!(status.complete);
    }

    #[test]
    fn test_warfare_commander_and_control() {
        let (mut war, people) = with_people(ConflictVariant::Warfare, &["Leto", "Baron"]);
        let leto = people[0];
        let wall = war.add_zone(Zone::warfare("Shield Wall")).unwrap();
        let city = war.add_zone(Zone::warfare("Arrakeen")).unwrap();
        let troops = war
            .place_asset(Asset::new("Troops", leto, wall, AssetType::Infantry, Quality::Rated(3)))
            .unwrap();
        war.place_asset(Asset::new("Guns", leto, wall, AssetType::Fortification, Quality::Rated(2)))
            .unwrap();

        assert_eq!(war.warfare_attack_difficulty(leto, troops, city).unwrap().difficulty, 2);
        war.move_participant(leto, wall).unwrap();
        assert_eq!(war.warfare_attack_difficulty(leto, troops, city).unwrap().difficulty, 1);

        war.set_zone_control(city, Some(leto)).unwrap();
        assert_eq!(war.zone(city).unwrap().controller(), Some(leto));
    }

    // ------------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------------

    #[test]
    fn test_end_requires_participant_or_admin() {
        let (mut fight, people) = with_people(ConflictVariant::Skirmish, &["Gurney", "Rabban"]);
        let stranger = ParticipantId::new();
        assert_eq!(
            fight.end(stranger, false, now()).unwrap_err(),
            ConflictError::NotAuthorized(stranger)
        );
        fight.end(people[0], false, now()).unwrap();
        assert!(fight.conflict().is_concluded());
        assert!(matches!(
            fight.add_zone(Zone::skirmish("Late", "x")),
            Err(ConflictError::ConflictConcluded(_))
        ));
    }

    #[test]
    fn test_leave_removes_assets() {
        let (mut fight, people) = with_people(ConflictVariant::Skirmish, &["Gurney", "Rabban"]);
        let ridge = fight.add_zone(Zone::skirmish("Ridge", "rocky")).unwrap();
        fight
            .place_asset(Asset::new("Blade", people[1], ridge, AssetType::Weapon, Quality::Rated(1)))
            .unwrap();
        let removed = fight.leave(people[1]).unwrap();
        assert_eq!(removed.len(), 1);
        assert!(fight.assets().is_empty());
        assert!(fight.check_invariants().is_ok());
    }

    #[test]
    fn test_leave_discards_tasks_against_the_leaver() {
        let (mut fight, people) =
            with_people(ConflictVariant::Skirmish, &["Gurney", "Rabban", "Duncan"]);
        let ridge = fight.add_zone(Zone::skirmish("Ridge", "rocky")).unwrap();
        let blade = fight
            .place_asset(Asset::new("Blade", people[1], ridge, AssetType::Weapon, Quality::Rated(1)))
            .unwrap();
        let on_rabban = fight
            .start_task(TaskTarget::Participant(people[1]), TaskPurpose::Defeat, 5, None)
            .unwrap();
        let on_blade = fight
            .start_task(TaskTarget::Asset(blade), TaskPurpose::Defeat, 2, None)
            .unwrap();
        let on_ridge = fight
            .start_task(TaskTarget::Zone(ridge), TaskPurpose::Discovery, 2, None)
            .unwrap();

        fight.leave(people[1]).unwrap();
        assert_eq!(
            fight.contribute(on_rabban, people[0], 5, now()).unwrap_err(),
            ConflictError::UnknownTask(on_rabban)
        );
        assert!(fight.task(on_blade).is_err());
        assert!(fight.task(on_ridge).is_ok());
    }

    #[test]
    fn test_contribute_against_missing_target_changes_nothing() {
        let (mut war, people) = with_people(ConflictVariant::Warfare, &["Leto", "Baron"]);
        let wall = war.add_zone(Zone::warfare("Shield Wall")).unwrap();
        let troops = war
            .place_asset(Asset::new("Troops", people[0], wall, AssetType::Infantry, Quality::Rated(3)))
            .unwrap();
        let task = war
            .start_task(TaskTarget::Asset(troops), TaskPurpose::Defeat, 2, None)
            .unwrap();
        war.destroy_asset(troops).unwrap();

        assert_eq!(
            war.contribute(task, people[1], 5, now()).unwrap_err(),
            ConflictError::UnknownAsset(troops)
        );
        let status = war.task(task).unwrap().status();
        assert_eq!(status.accumulated, 0);
        assert_eq!(status.attempts, 0);
        assert!(!status.complete);
    }

    #[test]
    fn test_duel_returns_to_pending_when_a_combatant_leaves() {
        let (mut duel, people) = with_people(ConflictVariant::Duel, &["Paul", "Jamis"]);
        duel.begin_turns(people[0]).unwrap();
        duel.leave(people[1]).unwrap();
        assert_eq!(duel.conflict().state, ConflictState::Pending);
        assert_eq!(duel.turns().and_then(|t| t.active()), None);
        assert_eq!(duel.next_turn().unwrap_err(), ConflictError::TurnsNotRunning);

        let feyd = ParticipantId::new();
        duel.join(feyd, "Feyd", now()).unwrap();
        assert_eq!(duel.conflict().state, ConflictState::Active);
        assert_eq!(duel.conflict().opponent_of(people[0]), Some(feyd));
        duel.begin_turns(feyd).unwrap();
        assert_eq!(duel.turns().and_then(|t| t.active()), Some(feyd));
    }

    #[test]
    fn test_objective_targets_must_exist() {
        let (mut war, people) = with_people(ConflictVariant::Warfare, &["Leto", "Baron"]);
        war.add_zone(Zone::warfare("Arrakeen")).unwrap();
        war.set_objective(people[0], Objective::new("Hold the city").with_target_zone("arrakeen"))
            .unwrap();
        assert!(matches!(
            war.set_objective(people[1], Objective::new("Burn").with_target_zone("Carthag")),
            Err(ConflictError::UnknownZone(_))
        ));
    }
}
