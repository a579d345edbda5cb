//! Difficulty calculator
//!
//! Pure functions from zone and asset state to the difficulty handed to the
//! dice resolver. Nothing is cached: occupancy changes between calls.

use serde::{Deserialize, Serialize};

use crate::domain::entities::{Asset, AssetType, Zone};
use crate::domain::errors::ConflictError;
use crate::domain::services::movement::security_in_zone;
use crate::domain::services::zone_graph::ZoneGraph;
use crate::domain::value_objects::{ConflictVariant, ParticipantId, ZoneId};

/// Extra difficulty a ranged weapon suffers against a half shield
pub const RANGED_VS_HALF_SHIELD: i32 = 2;
/// Extra difficulty a ranged weapon suffers against a full shield
pub const RANGED_VS_FULL_SHIELD: i32 = 1;
/// Extra difficulty a melee weapon suffers against any shield
pub const MELEE_VS_SHIELD: i32 = 1;

/// A computed difficulty with its itemised modifiers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifficultyReport {
    pub difficulty: u32,
    pub base: u32,
    pub floor: u32,
    pub modifiers: Vec<DifficultyModifier>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifficultyModifier {
    pub label: String,
    pub value: i32,
}

impl DifficultyReport {
    fn start(base: u32, variant: ConflictVariant) -> Self {
        Self {
            difficulty: base,
            base,
            floor: variant.difficulty_floor(),
            modifiers: Vec::new(),
        }
    }

    fn add(&mut self, label: impl Into<String>, value: i32) {
        if value != 0 {
            self.modifiers.push(DifficultyModifier {
                label: label.into(),
                value,
            });
        }
    }

    fn finish(mut self) -> Self {
        let total: i32 = self.base as i32 + self.modifiers.iter().map(|m| m.value).sum::<i32>();
        self.difficulty = total.max(self.floor as i32) as u32;
        self
    }
}

/// Defensive assets `owner` holds in `zone`
pub fn defensive_assets_in_zone<'a>(
    assets: &'a [Asset],
    owner: ParticipantId,
    zone: &Zone,
) -> Vec<&'a Asset> {
    let in_guard = zone.is_guard();
    assets
        .iter()
        .filter(|a| a.zone == zone.id && a.owner == owner && a.is_defensive(in_guard))
        .collect()
}

/// Duel attack: +1 per defensive asset the defender holds in the targeted zone
///
/// The weapon must already have been moved into that zone.
pub fn duel_attack(
    assets: &[Asset],
    weapon: &Asset,
    target_zone: &Zone,
) -> Result<DifficultyReport, ConflictError> {
    if weapon.asset_type != AssetType::Weapon {
        return Err(ConflictError::IllegalZone(format!(
            "{} is not a weapon",
            weapon.name
        )));
    }
    let Some((defender, _)) = target_zone.duel_slot() else {
        return Err(ConflictError::WrongVariant {
            expected: ConflictVariant::Duel.to_string(),
            actual: target_zone.variant().to_string(),
        });
    };
    if defender == weapon.owner {
        return Err(ConflictError::IllegalZone(
            "you cannot attack your own zone".to_string(),
        ));
    }
    if weapon.zone != target_zone.id {
        return Err(ConflictError::IllegalZone(format!(
            "move {} into the opponent's {} first",
            weapon.name, target_zone.name
        )));
    }

    let mut report = DifficultyReport::start(1, ConflictVariant::Duel);
    for defence in defensive_assets_in_zone(assets, defender, target_zone) {
        report.add(format!("{} ({})", defence.name, defence.asset_type), 1);
    }
    Ok(report.finish())
}

/// Skirmish attack with a weapon that sits in the target's zone
///
/// Melee weapons fight in their wielder's zone. Ranged weapons are aimed into
/// an adjacent zone and pay +1 for the distance.
pub fn skirmish_attack(
    graph: &ZoneGraph<'_>,
    assets: &[Asset],
    weapon: &Asset,
    attacker_zone: ZoneId,
    defender: ParticipantId,
    target_zone: ZoneId,
) -> Result<DifficultyReport, ConflictError> {
    if weapon.asset_type != AssetType::Weapon {
        return Err(ConflictError::IllegalZone(format!(
            "{} is not a weapon",
            weapon.name
        )));
    }
    let target = graph
        .zone(target_zone)
        .ok_or_else(|| ConflictError::UnknownZone(target_zone.to_string()))?;

    let mut report = DifficultyReport::start(1, ConflictVariant::Skirmish);
    let ranged = weapon.is_ranged();

    if attacker_zone != target_zone {
        if !ranged {
            return Err(ConflictError::IllegalZone(format!(
                "{} can only strike targets in your own zone",
                weapon.name
            )));
        }
        if !graph.is_adjacent(attacker_zone, target_zone, weapon.owner) {
            return Err(ConflictError::NotAdjacent {
                from: graph.display_name(attacker_zone),
                to: target.name.clone(),
            });
        }
        report.add("ranged attack into an adjacent zone", 1);
    }
    if weapon.zone != target_zone {
        return Err(ConflictError::IllegalZone(format!(
            "aim {} at {} first",
            weapon.name, target.name
        )));
    }

    for defence in defensive_assets_in_zone(assets, defender, target) {
        match defence.asset_type {
            AssetType::Armor => {
                report.add(format!("{} (armor)", defence.name), defence.quality.value() as i32)
            }
            AssetType::Shield => {
                let value = match (ranged, defence.is_half_shield()) {
                    (true, true) => RANGED_VS_HALF_SHIELD,
                    (true, false) => RANGED_VS_FULL_SHIELD,
                    (false, _) => MELEE_VS_SHIELD,
                };
                report.add(format!("{} (shield)", defence.name), value);
            }
            _ => {}
        }
    }
    Ok(report.finish())
}

/// Espionage information gathering: 0, +1 per security asset in the zone
pub fn espionage_gather(
    assets: &[Asset],
    source: &Zone,
    actor: ParticipantId,
) -> Result<DifficultyReport, ConflictError> {
    if !source.is_visible_to(actor) {
        return Err(ConflictError::ZoneNotVisible(source.name.clone()));
    }
    let mut report = DifficultyReport::start(0, ConflictVariant::Espionage);
    for guard in security_in_zone(assets, source.id) {
        report.add(format!("{} (security)", guard.name), 1);
    }
    Ok(report.finish())
}

/// Intrigue influence: 1 plus the target's disposition toward the actor
pub fn intrigue_influence(target: &Zone, actor: ParticipantId) -> DifficultyReport {
    let mut report = DifficultyReport::start(1, ConflictVariant::Intrigue);
    let disposition = target.disposition_toward(actor);
    report.add(
        format!("{} is {}", target.name, disposition.display_name()),
        disposition.modifier(),
    );
    report.finish()
}

/// Warfare attack: +1 per other allied asset stacked with the attacker,
/// -1 while the commander stands in that zone
pub fn warfare_attack(
    assets: &[Asset],
    attacker: &Asset,
    commander_position: Option<ZoneId>,
) -> DifficultyReport {
    let mut report = DifficultyReport::start(1, ConflictVariant::Warfare);
    let allies = assets
        .iter()
        .filter(|a| a.id != attacker.id && a.zone == attacker.zone && a.owner == attacker.owner)
        .count();
    report.add("allied assets in the same zone", allies as i32);
    if commander_position == Some(attacker.zone) {
        report.add("commander present", -1);
    }
    report.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{EspionageZoneKind, IntrigueZoneKind, ZoneProfile};
    use crate::domain::value_objects::{Disposition, Quality};

    fn weapon(owner: ParticipantId, zone: ZoneId, ranged: bool) -> Asset {
        let keywords: Vec<&str> = if ranged { vec!["ranged"] } else { vec![] };
        Asset::new("Maula pistol", owner, zone, AssetType::Weapon, Quality::Rated(2))
            .with_keywords(keywords)
    }

    #[test]
    fn test_duel_counts_defender_assets() {
        let paul = ParticipantId::new();
        let feyd = ParticipantId::new();
        let feyd_zones = Zone::duel_triple(feyd, "Feyd");
        let personal = &feyd_zones[0];
        let left = &feyd_zones[1];

        let knife = Asset::new("Crysknife", paul, personal.id, AssetType::Weapon, Quality::Rated(2));
        let armor = Asset::new("Stillsuit", feyd, personal.id, AssetType::Armor, Quality::Rated(1));
        let shield = Asset::new("Shield", feyd, personal.id, AssetType::Shield, Quality::Rated(2));
        let parry = Asset::new("Kindjal", feyd, left.id, AssetType::Weapon, Quality::Rated(1));
        let assets = vec![knife.clone(), armor, shield, parry.clone()];

        let report = duel_attack(&assets, &knife, personal).unwrap();
        assert_eq!(report.difficulty, 3);

        // weapons defend when held in a guard
        let mut lunge = knife.clone();
        lunge.zone = left.id;
        let assets = vec![lunge.clone(), parry];
        assert_eq!(duel_attack(&assets, &lunge, left).unwrap().difficulty, 2);
    }

    #[test]
    fn test_duel_requires_weapon_in_zone() {
        let paul = ParticipantId::new();
        let feyd = ParticipantId::new();
        let paul_zones = Zone::duel_triple(paul, "Paul");
        let feyd_zones = Zone::duel_triple(feyd, "Feyd");
        let knife = Asset::new("Crysknife", paul, paul_zones[0].id, AssetType::Weapon, Quality::Rated(2));
        let err = duel_attack(&[], &knife, &feyd_zones[0]).unwrap_err();
        assert!(err.to_string().contains("first"));
    }

    #[test]
    fn test_skirmish_ranged_vs_shields() {
        let raider = ParticipantId::new();
        let defender = ParticipantId::new();
        let zones = vec![Zone::skirmish("Dunes", "sand"), Zone::skirmish("Rocks", "cover")];
        let graph = ZoneGraph::new(ConflictVariant::Skirmish, &zones, &[]);
        let (near, far) = (zones[0].id, zones[1].id);

        let gun = weapon(raider, far, true);
        let half = Asset::new("Half shield", defender, far, AssetType::Shield, Quality::Rated(1))
            .with_keywords(["half"]);
        let armor = Asset::new("Armor", defender, far, AssetType::Armor, Quality::Rated(2));
        let assets = vec![gun.clone(), half, armor];

        let report = skirmish_attack(&graph, &assets, &gun, near, defender, far).unwrap();
        // 1 base + 1 distance + 2 half shield + 2 armor
        assert_eq!(report.difficulty, 6);
    }

    #[test]
    fn test_skirmish_same_zone_ranged_has_no_distance_penalty() {
        let raider = ParticipantId::new();
        let defender = ParticipantId::new();
        let zones = vec![Zone::skirmish("Dunes", "sand")];
        let graph = ZoneGraph::new(ConflictVariant::Skirmish, &zones, &[]);
        let gun = weapon(raider, zones[0].id, true);
        let full = Asset::new("Shield", defender, zones[0].id, AssetType::Shield, Quality::Rated(2));
        let assets = vec![gun.clone(), full];
        let report =
            skirmish_attack(&graph, &assets, &gun, zones[0].id, defender, zones[0].id).unwrap();
        assert_eq!(report.difficulty, 2);
    }

    #[test]
    fn test_skirmish_melee_vs_shield_and_reach() {
        let raider = ParticipantId::new();
        let defender = ParticipantId::new();
        let zones = vec![Zone::skirmish("Dunes", "sand"), Zone::skirmish("Rocks", "cover")];
        let graph = ZoneGraph::new(ConflictVariant::Skirmish, &zones, &[]);
        let blade = weapon(raider, zones[0].id, false);
        let shield = Asset::new("Shield", defender, zones[0].id, AssetType::Shield, Quality::Rated(2));
        let assets = vec![blade.clone(), shield];
        let report =
            skirmish_attack(&graph, &assets, &blade, zones[0].id, defender, zones[0].id).unwrap();
        assert_eq!(report.difficulty, 2);

        let err = skirmish_attack(&graph, &assets, &blade, zones[0].id, defender, zones[1].id)
            .unwrap_err();
        assert!(matches!(err, ConflictError::IllegalZone(_)));
    }

    #[test]
    fn test_espionage_counts_security() {
        let spy = ParticipantId::new();
        let house = ParticipantId::new();
        let zone = Zone::espionage("Residency", EspionageZoneKind::Place, false);
        let assets = vec![
            Asset::new("Guards", house, zone.id, AssetType::Security, Quality::Rated(1)),
            Asset::new("Hounds", house, zone.id, AssetType::Security, Quality::Rated(2)),
            Asset::new("Own watch", spy, zone.id, AssetType::Security, Quality::Rated(2)),
        ];
        assert_eq!(espionage_gather(&assets, &zone, spy).unwrap().difficulty, 3);
        let empty = Zone::espionage("Desert", EspionageZoneKind::Place, false);
        assert_eq!(espionage_gather(&assets, &empty, spy).unwrap().difficulty, 0);
    }

    #[test]
    fn test_espionage_own_security_still_counts() {
        let spy = ParticipantId::new();
        let zone = Zone::espionage("Safehouse", EspionageZoneKind::Place, false);
        let assets = vec![Asset::new(
            "Own watch",
            spy,
            zone.id,
            AssetType::Security,
            Quality::Rated(1),
        )];
        assert_eq!(espionage_gather(&assets, &zone, spy).unwrap().difficulty, 1);
    }

    #[test]
    fn test_intrigue_disposition_shifts_difficulty() {
        let courtier = ParticipantId::new();
        let mut zone = Zone::intrigue("Emperor", IntrigueZoneKind::Person);
        if let ZoneProfile::Intrigue { disposition, .. } = &mut zone.profile {
            *disposition = Some(Disposition::Opposed);
        }
        assert_eq!(intrigue_influence(&zone, courtier).difficulty, 3);
        if let ZoneProfile::Intrigue { disposition, .. } = &mut zone.profile {
            *disposition = Some(Disposition::Allied);
        }
        assert_eq!(intrigue_influence(&zone, courtier).difficulty, 0);
    }

    #[test]
    fn test_warfare_stacking_and_commander() {
        let general = ParticipantId::new();
        let zone = Zone::warfare("Pass");
        let attacker = Asset::new("Legion", general, zone.id, AssetType::Infantry, Quality::Rated(3));
        let assets = vec![
            attacker.clone(),
            Asset::new("Tanks", general, zone.id, AssetType::Vehicle, Quality::Rated(2)),
            Asset::new("Guns", general, zone.id, AssetType::Fortification, Quality::Rated(2)),
        ];
        assert_eq!(warfare_attack(&assets, &attacker, None).difficulty, 3);
        assert_eq!(warfare_attack(&assets, &attacker, Some(zone.id)).difficulty, 2);
        let alone = vec![attacker.clone()];
        // floor of one holds
        assert_eq!(warfare_attack(&alone, &attacker, Some(zone.id)).difficulty, 1);
    }
}
