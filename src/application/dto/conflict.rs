//! Conflict DTOs - What one observer sees of a conflict

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::aggregates::ConflictAggregate;
use crate::domain::entities::{Asset, TaskStatus, TurnState, Zone, ZoneProfile};
use crate::domain::value_objects::{
    ConflictId, ConflictState, ConflictVariant, Disposition, LocationId, ParticipantId, ZoneId,
};

/// Compact listing entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConflictSummary {
    pub id: ConflictId,
    pub name: String,
    pub variant: ConflictVariant,
    pub state: ConflictState,
    pub location_id: LocationId,
    pub participants: Vec<ParticipantView>,
    pub created_at: DateTime<Utc>,
}

impl From<&ConflictAggregate> for ConflictSummary {
    fn from(aggregate: &ConflictAggregate) -> Self {
        let conflict = aggregate.conflict();
        Self {
            id: conflict.id,
            name: conflict.name.clone(),
            variant: conflict.variant,
            state: conflict.state,
            location_id: conflict.location_id,
            participants: conflict
                .participants
                .iter()
                .map(|p| ParticipantView {
                    id: p.id,
                    name: p.name.clone(),
                    position: p.position,
                    defeated: conflict.defeated.contains(&p.id),
                    objective: conflict.objectives.get(&p.id).map(|o| o.text.clone()),
                })
                .collect(),
            created_at: conflict.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipantView {
    pub id: ParticipantId,
    pub name: String,
    pub position: Option<ZoneId>,
    pub defeated: bool,
    pub objective: Option<String>,
}

/// A zone as seen by one observer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneView {
    pub id: ZoneId,
    pub name: String,
    pub description: String,
    pub owner: Option<ParticipantId>,
    pub controller: Option<ParticipantId>,
    pub disposition: Option<Disposition>,
    /// Only once the observer has uncovered it
    pub desire: Option<String>,
    pub adjacent: Vec<ZoneId>,
}

impl ZoneView {
    fn build(aggregate: &ConflictAggregate, zone: &Zone, observer: ParticipantId) -> Self {
        let disposition = matches!(zone.profile, ZoneProfile::Intrigue { .. })
            .then(|| zone.disposition_toward(observer));
        Self {
            id: zone.id,
            name: zone.name.clone(),
            description: zone.description.clone(),
            owner: zone.scope(),
            controller: zone.controller(),
            disposition,
            desire: zone
                .desire()
                .filter(|d| d.is_known_to(observer))
                .map(|d| d.text.clone()),
            adjacent: aggregate.graph().adjacent(zone.id, observer),
        }
    }
}

/// Full conflict state, filtered to what `observer` may see
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConflictView {
    #[serde(flatten)]
    pub summary: ConflictSummary,
    pub observer: ParticipantId,
    pub command_hint: String,
    pub zones: Vec<ZoneView>,
    pub assets: Vec<Asset>,
    pub tasks: Vec<TaskStatus>,
    pub turns: Option<TurnState>,
    pub winners: Vec<ParticipantId>,
    pub concluded_at: Option<DateTime<Utc>>,
}

impl ConflictView {
    pub fn for_observer(aggregate: &ConflictAggregate, observer: ParticipantId) -> Self {
        let conflict = aggregate.conflict();
        let visible: Vec<&Zone> = aggregate
            .zones()
            .iter()
            .filter(|z| z.is_visible_to(observer))
            .collect();

        Self {
            summary: ConflictSummary::from(aggregate),
            observer,
            command_hint: conflict.variant.command_hint().to_string(),
            zones: visible
                .iter()
                .map(|z| ZoneView::build(aggregate, z, observer))
                .collect(),
            assets: aggregate
                .assets()
                .iter()
                .filter(|a| visible.iter().any(|z| z.id == a.zone))
                .cloned()
                .collect(),
            tasks: aggregate.tasks().iter().map(|t| t.status()).collect(),
            turns: aggregate.turns().cloned(),
            winners: conflict.winners.iter().copied().collect(),
            concluded_at: conflict.concluded_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{AssetType, Conflict, EspionageZoneKind};
    use crate::domain::value_objects::Quality;

    #[test]
    fn test_hidden_zones_and_their_assets_are_filtered() {
        let mut op = ConflictAggregate::new(Conflict::new(
            ConflictVariant::Espionage,
            LocationId::new(),
            Utc::now(),
        ));
        let thufir = ParticipantId::new();
        let piter = ParticipantId::new();
        op.join(thufir, "Thufir", Utc::now()).unwrap();
        op.join(piter, "Piter", Utc::now()).unwrap();
        op.add_zone(Zone::espionage("Market", EspionageZoneKind::Place, false))
            .unwrap();
        let lair = op
            .add_zone(Zone::espionage("Lair", EspionageZoneKind::Place, true))
            .unwrap();
        op.reveal_zone(lair, piter).unwrap();
        op.place_asset(Asset::new("Mentat", piter, lair, AssetType::Informant, Quality::Rated(2)))
            .unwrap();

        let thufir_view = ConflictView::for_observer(&op, thufir);
        assert_eq!(thufir_view.zones.len(), 1);
        assert!(thufir_view.assets.is_empty());

        let piter_view = ConflictView::for_observer(&op, piter);
        assert_eq!(piter_view.zones.len(), 2);
        assert_eq!(piter_view.assets.len(), 1);
        assert_eq!(piter_view.summary.participants.len(), 2);
    }
}
