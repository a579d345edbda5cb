//! Zone entity - Named places, people and targets inside one conflict
//!
//! What a zone means depends on the conflict variant: a duelist's guard, a
//! patch of battlefield, a person being spied on, a faction being courted or a
//! strategic objective. The variant-specific parts live in [`ZoneProfile`].

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use crate::domain::errors::ConflictError;
use crate::domain::value_objects::{ConflictVariant, Disposition, ParticipantId, ZoneId};

/// A zone in a conflict
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Zone {
    pub id: ZoneId,
    pub name: String,
    pub description: String,
    pub profile: ZoneProfile,
}

impl Zone {
    pub fn new(name: impl Into<String>, profile: ZoneProfile) -> Self {
        Self {
            id: ZoneId::new(),
            name: name.into(),
            description: String::new(),
            profile,
        }
    }

    /// The personal, left guard and right guard zones a duelist brings
    pub fn duel_triple(owner: ParticipantId, owner_name: &str) -> [Zone; 3] {
        GuardSlot::all().map(|slot| {
            Zone::new(slot.name(), ZoneProfile::Duel { owner, slot })
                .with_description(format!("{}'s {}", owner_name, slot.display_name()))
        })
    }

    pub fn skirmish(name: impl Into<String>, environment: impl Into<String>) -> Self {
        Self::new(
            name,
            ZoneProfile::Skirmish {
                environment: environment.into(),
                traits: Vec::new(),
            },
        )
    }

    pub fn espionage(name: impl Into<String>, kind: EspionageZoneKind, hidden: bool) -> Self {
        Self::new(
            name,
            ZoneProfile::Espionage {
                kind,
                hidden,
                revealed_to: BTreeSet::new(),
            },
        )
    }

    pub fn intrigue(name: impl Into<String>, kind: IntrigueZoneKind) -> Self {
        Self::new(
            name,
            ZoneProfile::Intrigue {
                kind,
                disposition: None,
                overrides: BTreeMap::new(),
                desire: None,
            },
        )
    }

    pub fn warfare(name: impl Into<String>) -> Self {
        Self::new(name, ZoneProfile::Warfare { controller: None })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_trait(mut self, trait_name: impl Into<String>) -> Self {
        if let ZoneProfile::Skirmish { traits, .. } = &mut self.profile {
            traits.push(trait_name.into());
        }
        self
    }

    pub fn variant(&self) -> ConflictVariant {
        self.profile.variant()
    }

    /// Owner that scopes the zone's name, if any (duel zones only)
    pub fn scope(&self) -> Option<ParticipantId> {
        match &self.profile {
            ZoneProfile::Duel { owner, .. } => Some(*owner),
            _ => None,
        }
    }

    /// Case-insensitive name match within a scope
    pub fn matches(&self, name: &str, scope: Option<ParticipantId>) -> bool {
        self.scope() == scope && self.name.eq_ignore_ascii_case(name.trim())
    }

    pub fn duel_slot(&self) -> Option<(ParticipantId, GuardSlot)> {
        match &self.profile {
            ZoneProfile::Duel { owner, slot } => Some((*owner, *slot)),
            _ => None,
        }
    }

    pub fn is_guard(&self) -> bool {
        self.duel_slot().is_some_and(|(_, slot)| slot.is_guard())
    }

    /// Whether `observer` may see or act on this zone
    pub fn is_visible_to(&self, observer: ParticipantId) -> bool {
        match &self.profile {
            ZoneProfile::Espionage {
                hidden,
                revealed_to,
                ..
            } => !*hidden || revealed_to.contains(&observer),
            _ => true,
        }
    }

    /// Disposition toward an observer: their override, else the zone default, else neutral
    pub fn disposition_toward(&self, observer: ParticipantId) -> Disposition {
        match &self.profile {
            ZoneProfile::Intrigue {
                disposition,
                overrides,
                ..
            } => overrides
                .get(&observer)
                .copied()
                .or(*disposition)
                .unwrap_or_default(),
            _ => Disposition::Neutral,
        }
    }

    pub fn controller(&self) -> Option<ParticipantId> {
        match &self.profile {
            ZoneProfile::Warfare { controller } => *controller,
            _ => None,
        }
    }

    pub fn desire(&self) -> Option<&Desire> {
        match &self.profile {
            ZoneProfile::Intrigue { desire, .. } => desire.as_ref(),
            _ => None,
        }
    }
}

/// Variant-specific zone data
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "variant", rename_all = "snake_case")]
pub enum ZoneProfile {
    Duel {
        owner: ParticipantId,
        slot: GuardSlot,
    },
    Skirmish {
        environment: String,
        traits: Vec<String>,
    },
    Espionage {
        kind: EspionageZoneKind,
        hidden: bool,
        revealed_to: BTreeSet<ParticipantId>,
    },
    Intrigue {
        kind: IntrigueZoneKind,
        disposition: Option<Disposition>,
        overrides: BTreeMap<ParticipantId, Disposition>,
        desire: Option<Desire>,
    },
    Warfare {
        controller: Option<ParticipantId>,
    },
}

impl ZoneProfile {
    pub fn variant(&self) -> ConflictVariant {
        match self {
            Self::Duel { .. } => ConflictVariant::Duel,
            Self::Skirmish { .. } => ConflictVariant::Skirmish,
            Self::Espionage { .. } => ConflictVariant::Espionage,
            Self::Intrigue { .. } => ConflictVariant::Intrigue,
            Self::Warfare { .. } => ConflictVariant::Warfare,
        }
    }
}

/// The three zones every duelist owns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardSlot {
    Personal,
    LeftGuard,
    RightGuard,
}

impl GuardSlot {
    pub fn all() -> [GuardSlot; 3] {
        [GuardSlot::Personal, GuardSlot::LeftGuard, GuardSlot::RightGuard]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Personal => "personal",
            Self::LeftGuard => "left_guard",
            Self::RightGuard => "right_guard",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Personal => "personal zone",
            Self::LeftGuard => "left guard",
            Self::RightGuard => "right guard",
        }
    }

    pub fn is_guard(&self) -> bool {
        !matches!(self, Self::Personal)
    }

    /// Personal touches both guards; the guards do not touch each other
    pub fn is_adjacent(&self, other: GuardSlot) -> bool {
        matches!(
            (self, other),
            (Self::Personal, Self::LeftGuard)
                | (Self::Personal, Self::RightGuard)
                | (Self::LeftGuard, Self::Personal)
                | (Self::RightGuard, Self::Personal)
        )
    }
}

impl fmt::Display for GuardSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for GuardSlot {
    type Err = ConflictError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace([' ', '-'], "_").as_str() {
            "personal" => Ok(Self::Personal),
            "left" | "left_guard" => Ok(Self::LeftGuard),
            "right" | "right_guard" => Ok(Self::RightGuard),
            _ => Err(ConflictError::UnknownZone(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EspionageZoneKind {
    Person,
    Group,
    Place,
    Event,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntrigueZoneKind {
    Person,
    Group,
}

/// Default resistance of a hidden desire when none is given
pub const DEFAULT_DESIRE_RESISTANCE: u32 = 3;

/// What an intrigue target secretly wants
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Desire {
    pub text: String,
    /// Requirement of the extended task that uncovers it
    pub resistance: u32,
    pub discovered_by: BTreeSet<ParticipantId>,
}

impl Desire {
    pub fn new(text: impl Into<String>, resistance: u32) -> Self {
        Self {
            text: text.into(),
            resistance,
            discovered_by: BTreeSet::new(),
        }
    }

    pub fn is_known_to(&self, observer: ParticipantId) -> bool {
        self.discovered_by.contains(&observer)
    }
}

/// A directed espionage link between two zones
///
/// Connecting two zones creates one edge per direction, each carrying its own
/// hidden flag and reveal set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Connection {
    pub from: ZoneId,
    pub to: ZoneId,
    pub kind: String,
    pub hidden: bool,
    pub revealed_to: BTreeSet<ParticipantId>,
}

impl Connection {
    pub fn new(from: ZoneId, to: ZoneId, kind: impl Into<String>, hidden: bool) -> Self {
        Self {
            from,
            to,
            kind: kind.into(),
            hidden,
            revealed_to: BTreeSet::new(),
        }
    }

    pub fn is_visible_to(&self, observer: ParticipantId) -> bool {
        !self.hidden || self.revealed_to.contains(&observer)
    }

    pub fn links(&self, from: ZoneId, to: ZoneId) -> bool {
        self.from == from && self.to == to
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_topology() {
        assert!(GuardSlot::Personal.is_adjacent(GuardSlot::LeftGuard));
        assert!(GuardSlot::RightGuard.is_adjacent(GuardSlot::Personal));
        assert!(!GuardSlot::LeftGuard.is_adjacent(GuardSlot::RightGuard));
        assert!(!GuardSlot::Personal.is_adjacent(GuardSlot::Personal));
    }

    #[test]
    fn test_duel_triple_is_scoped_to_owner() {
        let owner = ParticipantId::new();
        let zones = Zone::duel_triple(owner, "Feyd");
        assert!(zones.iter().all(|z| z.scope() == Some(owner)));
        assert!(zones[0].matches("PERSONAL", Some(owner)));
        assert!(!zones[0].matches("personal", None));
        assert!(zones[1].is_guard());
    }

    #[test]
    fn test_disposition_override_wins() {
        let x = ParticipantId::new();
        let y = ParticipantId::new();
        let mut zone = Zone::intrigue("Baron", IntrigueZoneKind::Person);
        if let ZoneProfile::Intrigue {
            disposition,
            overrides,
            ..
        } = &mut zone.profile
        {
            *disposition = Some(Disposition::Unfriendly);
            overrides.insert(x, Disposition::Allied);
        }
        assert_eq!(zone.disposition_toward(x), Disposition::Allied);
        assert_eq!(zone.disposition_toward(y), Disposition::Unfriendly);
    }

    #[test]
    fn test_hidden_zone_visibility() {
        let spy = ParticipantId::new();
        let zone = Zone::espionage("Smuggler den", EspionageZoneKind::Place, true);
        assert!(!zone.is_visible_to(spy));
        let open = Zone::espionage("Spaceport", EspionageZoneKind::Place, false);
        assert!(open.is_visible_to(spy));
    }

    #[test]
    fn test_parse_guard_slot() {
        assert_eq!("left guard".parse::<GuardSlot>().unwrap(), GuardSlot::LeftGuard);
        assert_eq!("right".parse::<GuardSlot>().unwrap(), GuardSlot::RightGuard);
        assert!("centre".parse::<GuardSlot>().is_err());
    }
}
