//! Tactical DTOs - Zone, asset and difficulty commands

use serde::{Deserialize, Serialize};

use crate::domain::aggregates::ZoneRef;
use crate::domain::entities::{
    Asset, AssetOrigin, AssetType, EspionageZoneKind, GuardSlot, IntrigueZoneKind, Zone,
    ZoneProfile,
};
use crate::domain::value_objects::{
    AssetId, Disposition, Manner, ParticipantId, Quality, ZoneId,
};

/// A zone to add to a skirmish, espionage, intrigue or warfare conflict
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "variant", rename_all = "snake_case")]
pub enum ZoneSpec {
    Skirmish {
        name: String,
        #[serde(default)]
        environment: String,
        #[serde(default)]
        traits: Vec<String>,
    },
    Espionage {
        name: String,
        kind: EspionageZoneKind,
        #[serde(default)]
        hidden: bool,
    },
    Intrigue {
        name: String,
        kind: IntrigueZoneKind,
        #[serde(default)]
        disposition: Option<Disposition>,
    },
    Warfare {
        name: String,
    },
}

impl ZoneSpec {
    pub fn into_zone(self) -> Zone {
        match self {
            Self::Skirmish {
                name,
                environment,
                traits,
            } => traits
                .into_iter()
                .fold(Zone::skirmish(name, environment), |zone, t| zone.with_trait(t)),
            Self::Espionage { name, kind, hidden } => Zone::espionage(name, kind, hidden),
            Self::Intrigue {
                name,
                kind,
                disposition,
            } => {
                let mut zone = Zone::intrigue(name, kind);
                if let ZoneProfile::Intrigue {
                    disposition: default,
                    ..
                } = &mut zone.profile
                {
                    *default = disposition;
                }
                zone
            }
            Self::Warfare { name } => Zone::warfare(name),
        }
    }
}

/// An asset minted during the conflict
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAsset {
    pub name: String,
    pub asset_type: AssetType,
    pub quality: Quality,
    pub zone: ZoneRef,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub description: String,
}

impl NewAsset {
    pub fn into_asset(self, owner: ParticipantId, zone: ZoneId) -> Asset {
        Asset::new(self.name, owner, zone, self.asset_type, self.quality)
            .with_keywords(self.keywords)
            .with_origin(AssetOrigin::Intangible)
            .with_description(self.description)
    }
}

/// Move an asset somewhere, optionally on to a second zone
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveAssetRequest {
    pub to: ZoneRef,
    #[serde(default)]
    pub manner: Manner,
    /// Second hop for fast warfare assets
    #[serde(default)]
    pub then: Option<ZoneRef>,
}

/// Which difficulty to compute, with the variant's inputs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "variant", rename_all = "snake_case")]
pub enum DifficultyRequest {
    /// Attack the opponent's zone the weapon was moved into
    Duel { weapon: AssetId, slot: GuardSlot },
    Skirmish {
        weapon: AssetId,
        defender: ParticipantId,
    },
    /// Gather information from a zone
    Espionage { zone: ZoneRef },
    /// Influence or attack a person or group
    Intrigue { zone: ZoneRef },
    Warfare { asset: AssetId, target: ZoneRef },
}
