//! Tactical API routes - zones, assets, difficulty, visibility and turns
//!
//! Zone arguments travel as `ZoneRef` JSON: `{"by": "name", "value": "Bazaar"}`,
//! `{"by": "id", "value": "<uuid>"}` or, in duels,
//! `{"by": "duel", "value": {"side": "opponent", "slot": "personal"}}`.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use super::error::{parse_id, ApiError};
use crate::application::dto::{DifficultyRequest, MoveAssetRequest, NewAsset, ZoneSpec};
use crate::application::ports::outbound::CatalogEntry;
use crate::application::services::TacticalService;
use crate::domain::aggregates::{MoveOutcome, RelocationOutcome, ZoneRef};
use crate::domain::entities::{Asset, InitiativeGrant};
use crate::domain::services::DifficultyReport;
use crate::domain::value_objects::{
    AssetId, ConflictId, Disposition, ParticipantId, ZoneId,
};
use crate::infrastructure::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ConnectBody {
    pub actor: ParticipantId,
    pub a: ZoneRef,
    pub b: ZoneRef,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub hidden: bool,
}

#[derive(Debug, Deserialize)]
pub struct ObservedZoneBody {
    pub observer: ParticipantId,
    pub zone: ZoneRef,
}

#[derive(Debug, Deserialize)]
pub struct CatalogAssetBody {
    pub owner: ParticipantId,
    pub catalog_name: String,
    pub zone: ZoneRef,
}

#[derive(Debug, Deserialize)]
pub struct IntangibleAssetBody {
    pub owner: ParticipantId,
    pub asset: NewAsset,
}

#[derive(Debug, Deserialize)]
pub struct MoveAssetBody {
    pub mover: ParticipantId,
    #[serde(flatten)]
    pub request: MoveAssetRequest,
}

#[derive(Debug, Deserialize)]
pub struct AimBody {
    pub mover: ParticipantId,
    pub zone: ZoneRef,
}

#[derive(Debug, Deserialize)]
pub struct RallyBody {
    pub owner: ParticipantId,
    #[serde(default)]
    pub zone: Option<ZoneRef>,
}

#[derive(Debug, Deserialize)]
pub struct RelocateBody {
    pub zone: ZoneRef,
}

#[derive(Debug, Deserialize)]
pub struct DifficultyBody {
    pub actor: ParticipantId,
    pub request: DifficultyRequest,
}

#[derive(Debug, Deserialize)]
pub struct RevealZoneBody {
    pub participant: ParticipantId,
    pub zone: ZoneRef,
}

#[derive(Debug, Deserialize)]
pub struct RevealConnectionBody {
    pub participant: ParticipantId,
    pub from: ZoneRef,
    pub to: ZoneRef,
}

#[derive(Debug, Deserialize)]
pub struct DispositionBody {
    pub zone: ZoneRef,
    pub level: Disposition,
    /// Present for a per-observer override
    #[serde(default)]
    pub observer: Option<ParticipantId>,
}

#[derive(Debug, Deserialize)]
pub struct DesireBody {
    pub zone: ZoneRef,
    pub text: String,
    #[serde(default)]
    pub resistance: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct ControlBody {
    pub zone: ZoneRef,
    #[serde(default)]
    pub controller: Option<ParticipantId>,
}

#[derive(Debug, Deserialize)]
pub struct BeginTurnsBody {
    pub first: ParticipantId,
}

#[derive(Debug, Deserialize)]
pub struct KeepInitiativeBody {
    pub participant: ParticipantId,
    pub offered_momentum: u32,
    #[serde(default)]
    pub hand_off: Option<ParticipantId>,
}

#[derive(Debug, Serialize)]
pub struct CreatedZone {
    pub id: ZoneId,
}

#[derive(Debug, Serialize)]
pub struct Revealed {
    /// False when the zone or connection was already visible
    pub newly_revealed: bool,
}

#[derive(Debug, Serialize)]
pub struct DispositionResponse {
    pub disposition: Disposition,
}

#[derive(Debug, Serialize)]
pub struct DesireResponse {
    pub desire: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TurnResponse {
    pub current: ParticipantId,
}

fn conflict_id(raw: &str) -> Result<ConflictId, ApiError> {
    parse_id(raw)
}

fn ids(raw: &(String, String)) -> Result<(ConflictId, AssetId), ApiError> {
    Ok((conflict_id(&raw.0)?, parse_id(&raw.1)?))
}

/// List every catalog entry
pub async fn list_catalog(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<CatalogEntry>>, ApiError> {
    Ok(Json(state.catalog.list().await?))
}

pub async fn add_zone(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(spec): Json<ZoneSpec>,
) -> Result<(StatusCode, Json<CreatedZone>), ApiError> {
    let id = conflict_id(&id)?;
    let zone = state.tactical_service.add_zone(id, spec).await?;
    Ok((StatusCode::CREATED, Json(CreatedZone { id: zone })))
}

pub async fn connect_zones(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<ConnectBody>,
) -> Result<StatusCode, ApiError> {
    let id = conflict_id(&id)?;
    state
        .tactical_service
        .connect(id, body.actor, body.a, body.b, body.kind, body.hidden)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Zones adjacent to a zone, as the observer can see them
pub async fn adjacent_zones(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<ObservedZoneBody>,
) -> Result<Json<Vec<ZoneId>>, ApiError> {
    let id = conflict_id(&id)?;
    Ok(Json(
        state
            .tactical_service
            .adjacent(id, body.observer, body.zone)
            .await?,
    ))
}

/// Bring a catalog item into play
pub async fn add_catalog_asset(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<CatalogAssetBody>,
) -> Result<(StatusCode, Json<Asset>), ApiError> {
    let id = conflict_id(&id)?;
    let asset = state
        .tactical_service
        .add_catalog_asset(id, body.owner, body.catalog_name, body.zone)
        .await?;
    Ok((StatusCode::CREATED, Json(asset)))
}

pub async fn add_intangible_asset(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<IntangibleAssetBody>,
) -> Result<(StatusCode, Json<Asset>), ApiError> {
    let id = conflict_id(&id)?;
    let asset = state
        .tactical_service
        .add_intangible_asset(id, body.owner, body.asset)
        .await?;
    Ok((StatusCode::CREATED, Json(asset)))
}

pub async fn move_asset(
    State(state): State<Arc<AppState>>,
    Path(raw): Path<(String, String)>,
    Json(body): Json<MoveAssetBody>,
) -> Result<Json<MoveOutcome>, ApiError> {
    let (id, asset) = ids(&raw)?;
    Ok(Json(
        state
            .tactical_service
            .move_asset(id, body.mover, asset, body.request)
            .await?,
    ))
}

pub async fn aim_asset(
    State(state): State<Arc<AppState>>,
    Path(raw): Path<(String, String)>,
    Json(body): Json<AimBody>,
) -> Result<Json<MoveOutcome>, ApiError> {
    let (id, asset) = ids(&raw)?;
    Ok(Json(
        state
            .tactical_service
            .aim(id, body.mover, asset, body.zone)
            .await?,
    ))
}

pub async fn defeat_asset(
    State(state): State<Arc<AppState>>,
    Path(raw): Path<(String, String)>,
) -> Result<Json<Asset>, ApiError> {
    let (id, asset) = ids(&raw)?;
    Ok(Json(state.tactical_service.defeat_asset(id, asset).await?))
}

pub async fn destroy_asset(
    State(state): State<Arc<AppState>>,
    Path(raw): Path<(String, String)>,
) -> Result<Json<Asset>, ApiError> {
    let (id, asset) = ids(&raw)?;
    Ok(Json(state.tactical_service.destroy_asset(id, asset).await?))
}

pub async fn expose_asset(
    State(state): State<Arc<AppState>>,
    Path(raw): Path<(String, String)>,
) -> Result<Json<Asset>, ApiError> {
    let (id, asset) = ids(&raw)?;
    Ok(Json(state.tactical_service.expose_asset(id, asset).await?))
}

/// Warfare: bring a defeated asset back at reduced quality
pub async fn rally_asset(
    State(state): State<Arc<AppState>>,
    Path(raw): Path<(String, String)>,
    Json(body): Json<RallyBody>,
) -> Result<Json<Asset>, ApiError> {
    let (id, asset) = ids(&raw)?;
    Ok(Json(
        state
            .tactical_service
            .rally_asset(id, body.owner, asset, body.zone)
            .await?,
    ))
}

/// Skirmish: move a participant, carrying their assets
pub async fn move_participant(
    State(state): State<Arc<AppState>>,
    Path((id, participant)): Path<(String, String)>,
    Json(body): Json<RelocateBody>,
) -> Result<Json<RelocationOutcome>, ApiError> {
    let id = conflict_id(&id)?;
    let participant: ParticipantId = parse_id(&participant)?;
    Ok(Json(
        state
            .tactical_service
            .move_participant(id, participant, body.zone)
            .await?,
    ))
}

pub async fn difficulty(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<DifficultyBody>,
) -> Result<Json<DifficultyReport>, ApiError> {
    let id = conflict_id(&id)?;
    Ok(Json(
        state
            .tactical_service
            .difficulty(id, body.actor, body.request)
            .await?,
    ))
}

pub async fn reveal_zone(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<RevealZoneBody>,
) -> Result<Json<Revealed>, ApiError> {
    let id = conflict_id(&id)?;
    let newly_revealed = state
        .tactical_service
        .reveal_zone(id, body.participant, body.zone)
        .await?;
    Ok(Json(Revealed { newly_revealed }))
}

pub async fn reveal_connection(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<RevealConnectionBody>,
) -> Result<Json<Revealed>, ApiError> {
    let id = conflict_id(&id)?;
    let newly_revealed = state
        .tactical_service
        .reveal_connection(id, body.participant, body.from, body.to)
        .await?;
    Ok(Json(Revealed { newly_revealed }))
}

pub async fn set_disposition(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<DispositionBody>,
) -> Result<StatusCode, ApiError> {
    let id = conflict_id(&id)?;
    state
        .tactical_service
        .set_disposition(id, body.zone, body.level, body.observer)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn clear_disposition_override(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<ObservedZoneBody>,
) -> Result<StatusCode, ApiError> {
    let id = conflict_id(&id)?;
    state
        .tactical_service
        .clear_disposition_override(id, body.zone, body.observer)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_disposition(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<ObservedZoneBody>,
) -> Result<Json<DispositionResponse>, ApiError> {
    let id = conflict_id(&id)?;
    let disposition = state
        .tactical_service
        .get_disposition(id, body.zone, body.observer)
        .await?;
    Ok(Json(DispositionResponse { disposition }))
}

pub async fn set_desire(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<DesireBody>,
) -> Result<StatusCode, ApiError> {
    let id = conflict_id(&id)?;
    state
        .tactical_service
        .set_desire(id, body.zone, body.text, body.resistance)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// A zone's desire, if the observer has discovered it
pub async fn desire_for(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<ObservedZoneBody>,
) -> Result<Json<DesireResponse>, ApiError> {
    let id = conflict_id(&id)?;
    let desire = state
        .tactical_service
        .desire_for(id, body.zone, body.observer)
        .await?;
    Ok(Json(DesireResponse { desire }))
}

pub async fn set_zone_control(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<ControlBody>,
) -> Result<StatusCode, ApiError> {
    let id = conflict_id(&id)?;
    state
        .tactical_service
        .set_zone_control(id, body.zone, body.controller)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn begin_turns(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<BeginTurnsBody>,
) -> Result<StatusCode, ApiError> {
    let id = conflict_id(&id)?;
    state.tactical_service.begin_turns(id, body.first).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn next_turn(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<TurnResponse>, ApiError> {
    let id = conflict_id(&id)?;
    let current = state.tactical_service.next_turn(id).await?;
    Ok(Json(TurnResponse { current }))
}

pub async fn keep_initiative(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<KeepInitiativeBody>,
) -> Result<Json<InitiativeGrant>, ApiError> {
    let id = conflict_id(&id)?;
    Ok(Json(
        state
            .tactical_service
            .keep_initiative(id, body.participant, body.offered_momentum, body.hand_off)
            .await?,
    ))
}
