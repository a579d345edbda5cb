//! Movement legality
//!
//! `plan_move` decides whether an asset may move and where it ends up, without
//! touching any state. The conflict aggregate applies the plan.

use serde::{Deserialize, Serialize};

use crate::domain::entities::{Asset, AssetType};
use crate::domain::errors::ConflictError;
use crate::domain::services::zone_graph::ZoneGraph;
use crate::domain::value_objects::{ConflictVariant, Manner, Mobility, ParticipantId, ZoneId};

/// A requested move
#[derive(Debug, Clone, Copy)]
pub struct MoveRequest {
    pub mover: ParticipantId,
    pub target: ZoneId,
    pub manner: Manner,
    /// Extra zone for fast assets
    pub second_hop: Option<ZoneId>,
}

/// A legal move, ready to apply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovePlan {
    pub from: ZoneId,
    pub destination: ZoneId,
    /// Zones entered, in order
    pub path: Vec<ZoneId>,
    /// Extra difficulty for the follow-up roll (security present)
    pub difficulty_modifier: u32,
}

/// Check a move against ownership, mobility, adjacency and security
pub fn plan_move(
    graph: &ZoneGraph<'_>,
    assets: &[Asset],
    asset: &Asset,
    request: MoveRequest,
) -> Result<MovePlan, ConflictError> {
    if asset.owner != request.mover {
        return Err(ConflictError::NotOwner {
            asset: asset.id,
            caller: request.mover,
        });
    }

    let target = graph
        .zone(request.target)
        .ok_or_else(|| ConflictError::UnknownZone(request.target.to_string()))?;
    if !target.is_visible_to(request.mover) {
        return Err(ConflictError::ZoneNotVisible(target.name.clone()));
    }

    let mobility = asset.mobility(graph.variant());
    if !mobility.can_move() {
        return Err(ConflictError::Immobile(asset.id));
    }
    if asset.zone == request.target {
        return Err(ConflictError::IllegalZone(format!(
            "{} is already in {}",
            asset.name, target.name
        )));
    }

    if mobility == Mobility::AdjacentOnly
        && !graph.is_adjacent(asset.zone, request.target, request.mover)
    {
        return Err(ConflictError::IllegalZone(format!(
            "{} can only move to an adjacent zone, and {} is not adjacent to {}",
            asset.name,
            target.name,
            graph.display_name(asset.zone)
        )));
    }

    let mut difficulty_modifier = 0;
    match graph.variant() {
        ConflictVariant::Duel => {
            let into_opponent = target.scope().is_some_and(|owner| owner != request.mover);
            if into_opponent && asset.asset_type != AssetType::Weapon {
                return Err(ConflictError::IllegalZone(format!(
                    "only weapons can be moved into an opponent's {}",
                    target.name
                )));
            }
        }
        ConflictVariant::Espionage => {
            if !graph.is_adjacent(asset.zone, request.target, request.mover) {
                return Err(ConflictError::NotAdjacent {
                    from: graph.display_name(asset.zone),
                    to: target.name.clone(),
                });
            }
            if asset.asset_type.is_agent() {
                let security: Vec<&Asset> = security_in_zone(assets, request.target);
                let strongest = security.iter().map(|a| a.quality.value()).max();
                if let Some(strongest) = strongest {
                    if strongest > asset.quality.value() && !request.manner.bypasses_security() {
                        return Err(ConflictError::SecurityTooHigh {
                            zone: target.name.clone(),
                            security: strongest,
                            quality: asset.quality.value(),
                        });
                    }
                }
                difficulty_modifier = security.len() as u32;
            }
        }
        ConflictVariant::Skirmish | ConflictVariant::Intrigue | ConflictVariant::Warfare => {}
    }

    let mut path = vec![request.target];
    if let Some(hop) = request.second_hop {
        if !mobility.allows_second_hop() {
            return Err(ConflictError::IllegalZone(format!(
                "{} is not fast enough to move twice",
                asset.name
            )));
        }
        let second = graph
            .zone(hop)
            .ok_or_else(|| ConflictError::UnknownZone(hop.to_string()))?;
        if !graph.is_adjacent(request.target, hop, request.mover) {
            return Err(ConflictError::NotAdjacent {
                from: target.name.clone(),
                to: second.name.clone(),
            });
        }
        path.push(hop);
    }

    let destination = path.last().copied().unwrap_or(request.target);
    Ok(MovePlan {
        from: asset.zone,
        destination,
        path,
        difficulty_modifier,
    })
}

/// Every security asset in `zone`, whoever owns it
pub fn security_in_zone(assets: &[Asset], zone: ZoneId) -> Vec<&Asset> {
    assets
        .iter()
        .filter(|a| a.zone == zone && a.asset_type == AssetType::Security)
        .collect()
}
