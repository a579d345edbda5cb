//! Zone graph - Which zones exist and which ones touch
//!
//! Adjacency differs per variant:
//! - Duel: fixed topology inside one duelist's triple, personal touching both guards
//! - Espionage: explicit connections, filtered by what the observer has uncovered
//! - Skirmish, Intrigue, Warfare: every zone touches every other zone

use crate::domain::entities::{Connection, Zone};
use crate::domain::value_objects::{ConflictVariant, ParticipantId, ZoneId};

/// Read-only view over a conflict's zones and connections
#[derive(Debug, Clone, Copy)]
pub struct ZoneGraph<'a> {
    variant: ConflictVariant,
    zones: &'a [Zone],
    connections: &'a [Connection],
}

impl<'a> ZoneGraph<'a> {
    pub fn new(variant: ConflictVariant, zones: &'a [Zone], connections: &'a [Connection]) -> Self {
        Self {
            variant,
            zones,
            connections,
        }
    }

    pub fn variant(&self) -> ConflictVariant {
        self.variant
    }

    pub fn zones(&self) -> &'a [Zone] {
        self.zones
    }

    pub fn zone(&self, id: ZoneId) -> Option<&'a Zone> {
        self.zones.iter().find(|z| z.id == id)
    }

    pub fn contains(&self, id: ZoneId) -> bool {
        self.zone(id).is_some()
    }

    /// Look a zone up by name inside a scope (a duelist, or the whole conflict)
    pub fn find(&self, name: &str, scope: Option<ParticipantId>) -> Option<&'a Zone> {
        self.zones.iter().find(|z| z.matches(name, scope))
    }

    /// Zones reachable in one step from `zone`, as seen by `observer`
    pub fn adjacent(&self, zone: ZoneId, observer: ParticipantId) -> Vec<ZoneId> {
        let Some(origin) = self.zone(zone) else {
            return Vec::new();
        };

        match self.variant {
            ConflictVariant::Duel => {
                let Some((owner, slot)) = origin.duel_slot() else {
                    return Vec::new();
                };
                self.zones
                    .iter()
                    .filter_map(|z| {
                        let (other_owner, other_slot) = z.duel_slot()?;
                        (other_owner == owner && slot.is_adjacent(other_slot)).then_some(z.id)
                    })
                    .collect()
            }
            ConflictVariant::Espionage => self
                .connections
                .iter()
                .filter(|c| c.from == zone && c.is_visible_to(observer))
                .map(|c| c.to)
                .collect(),
            ConflictVariant::Skirmish | ConflictVariant::Intrigue | ConflictVariant::Warfare => {
                self.zones
                    .iter()
                    .filter(|z| z.id != zone)
                    .map(|z| z.id)
                    .collect()
            }
        }
    }

    pub fn is_adjacent(&self, from: ZoneId, to: ZoneId, observer: ParticipantId) -> bool {
        self.adjacent(from, observer).contains(&to)
    }

    pub fn display_name(&self, id: ZoneId) -> String {
        self.zone(id)
            .map(|z| z.name.clone())
            .unwrap_or_else(|| id.to_string())
    }
}
