//! Domain entities - Core conflict objects with identity

mod asset;
mod conflict;
mod extended_task;
mod turn;
mod zone;

pub use asset::{
    Asset, AssetOrigin, AssetType, DefeatedAsset, KEYWORD_FAST, KEYWORD_HALF, KEYWORD_IMMOBILE,
    KEYWORD_RANGED,
};
pub use conflict::{Conflict, Objective, Participant};
pub use extended_task::{
    discovery_points, points_for_successes, ExtendedTask, TaskProgress, TaskPurpose, TaskStatus,
    TaskTarget, DISCOVERY_SKILL_OFFSET,
};
pub use turn::{InitiativeGrant, TurnPhase, TurnState, KEEP_INITIATIVE_COST};
pub use zone::{
    Connection, Desire, EspionageZoneKind, GuardSlot, IntrigueZoneKind, Zone, ZoneProfile,
    DEFAULT_DESIRE_RESISTANCE,
};
