//! Asset entity - Weapons, agents, secrets and armies placed in a conflict

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::errors::ConflictError;
use crate::domain::value_objects::{
    AssetId, ConflictVariant, Mobility, ParticipantId, Quality, ZoneId,
};

/// Keyword marking a ranged weapon
pub const KEYWORD_RANGED: &str = "ranged";
/// Keyword marking a half shield
pub const KEYWORD_HALF: &str = "half";
/// Keyword granting an extra hop per move
pub const KEYWORD_FAST: &str = "fast";
/// Keyword pinning an asset in place
pub const KEYWORD_IMMOBILE: &str = "immobile";

/// An asset participating in a conflict
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asset {
    pub id: AssetId,
    pub name: String,
    pub owner: ParticipantId,
    pub zone: ZoneId,
    pub asset_type: AssetType,
    pub quality: Quality,
    pub keywords: Vec<String>,
    pub origin: AssetOrigin,
    pub description: String,
}

impl Asset {
    pub fn new(
        name: impl Into<String>,
        owner: ParticipantId,
        zone: ZoneId,
        asset_type: AssetType,
        quality: Quality,
    ) -> Self {
        Self {
            id: AssetId::new(),
            name: name.into(),
            owner,
            zone,
            asset_type,
            quality,
            keywords: Vec::new(),
            origin: AssetOrigin::Intangible,
            description: String::new(),
        }
    }

    pub fn with_keywords(mut self, keywords: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.keywords.extend(keywords.into_iter().map(|k| {
            let keyword: String = k.into();
            keyword.to_ascii_lowercase()
        }));
        self
    }

    pub fn with_origin(mut self, origin: AssetOrigin) -> Self {
        self.origin = origin;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn has_keyword(&self, keyword: &str) -> bool {
        self.keywords.iter().any(|k| k.eq_ignore_ascii_case(keyword))
    }

    pub fn is_ranged(&self) -> bool {
        self.asset_type == AssetType::Weapon && self.has_keyword(KEYWORD_RANGED)
    }

    pub fn is_half_shield(&self) -> bool {
        self.asset_type == AssetType::Shield && self.has_keyword(KEYWORD_HALF)
    }

    /// Shields and armor always defend; weapons only when held in a guard
    pub fn is_defensive(&self, in_guard_zone: bool) -> bool {
        match self.asset_type {
            AssetType::Shield | AssetType::Armor => true,
            AssetType::Weapon => in_guard_zone,
            _ => false,
        }
    }

    /// How far this asset may travel, from its type and keywords
    pub fn mobility(&self, variant: ConflictVariant) -> Mobility {
        if self.has_keyword(KEYWORD_IMMOBILE) {
            return Mobility::Immobile;
        }
        match (variant, self.asset_type) {
            (ConflictVariant::Duel, AssetType::Shield) if self.is_half_shield() => {
                Mobility::AdjacentOnly
            }
            (ConflictVariant::Duel | ConflictVariant::Skirmish, AssetType::Shield)
            | (ConflictVariant::Duel | ConflictVariant::Skirmish, AssetType::Armor) => {
                Mobility::Immobile
            }
            (_, AssetType::Surveillance) | (_, AssetType::Fortification) => Mobility::Immobile,
            (ConflictVariant::Warfare, AssetType::Aircraft) => Mobility::Fast,
            (ConflictVariant::Warfare, _) if self.has_keyword(KEYWORD_FAST) => Mobility::Fast,
            _ => Mobility::Free,
        }
    }
}

/// Where an asset came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AssetOrigin {
    /// Brought in from a participant's inventory, backed by the catalog
    Tangible { catalog_name: String },
    /// Minted during the conflict
    Intangible,
}

/// Asset type vocabulary across all variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetType {
    Weapon,
    Shield,
    Armor,
    Spy,
    Informant,
    Surveillance,
    Security,
    Knowledge,
    Rumor,
    Valuable,
    Infantry,
    Vehicle,
    Aircraft,
    Fortification,
}

impl AssetType {
    pub fn all() -> &'static [AssetType] {
        &[
            AssetType::Weapon,
            AssetType::Shield,
            AssetType::Armor,
            AssetType::Spy,
            AssetType::Informant,
            AssetType::Surveillance,
            AssetType::Security,
            AssetType::Knowledge,
            AssetType::Rumor,
            AssetType::Valuable,
            AssetType::Infantry,
            AssetType::Vehicle,
            AssetType::Aircraft,
            AssetType::Fortification,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Weapon => "weapon",
            Self::Shield => "shield",
            Self::Armor => "armor",
            Self::Spy => "spy",
            Self::Informant => "informant",
            Self::Surveillance => "surveillance",
            Self::Security => "security",
            Self::Knowledge => "knowledge",
            Self::Rumor => "rumor",
            Self::Valuable => "valuable",
            Self::Infantry => "infantry",
            Self::Vehicle => "vehicle",
            Self::Aircraft => "aircraft",
            Self::Fortification => "fortification",
        }
    }

    /// Whether the variant's vocabulary includes this type
    pub fn allowed_in(&self, variant: ConflictVariant) -> bool {
        match variant {
            ConflictVariant::Duel | ConflictVariant::Skirmish => {
                matches!(self, Self::Weapon | Self::Shield | Self::Armor)
            }
            ConflictVariant::Espionage => matches!(
                self,
                Self::Spy | Self::Informant | Self::Surveillance | Self::Security
            ),
            ConflictVariant::Intrigue => {
                matches!(self, Self::Knowledge | Self::Rumor | Self::Valuable)
            }
            ConflictVariant::Warfare => matches!(
                self,
                Self::Infantry | Self::Vehicle | Self::Aircraft | Self::Fortification
            ),
        }
    }

    /// Agents that infiltrate zones and are checked against security
    pub fn is_agent(&self) -> bool {
        matches!(self, Self::Spy | Self::Informant)
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for AssetType {
    type Err = ConflictError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = match s.trim().to_ascii_lowercase().as_str() {
            "armour" => "armor".to_string(),
            other => other.to_string(),
        };
        AssetType::all()
            .iter()
            .find(|t| t.name() == wanted)
            .copied()
            .ok_or_else(|| ConflictError::Unrecognized {
                kind: "asset type",
                value: s.to_string(),
            })
    }
}

/// A warfare asset knocked out of play, waiting to be rallied
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefeatedAsset {
    pub asset: Asset,
    /// Quality the asset returns with when rallied
    pub rally_quality: Quality,
}

impl DefeatedAsset {
    pub fn new(asset: Asset) -> Self {
        let rally_quality = asset.quality.reduced();
        Self {
            asset,
            rally_quality,
        }
    }
}
