//! Conflict lifecycle API routes

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use super::error::{parse_id, ApiError};
use crate::application::dto::{ConflictSummary, ConflictView};
use crate::application::services::{ConflictService, CreateConflictRequest};
use crate::domain::aggregates::TaskEffect;
use crate::domain::entities::{Asset, Objective};
use crate::domain::errors::ConflictError;
use crate::domain::value_objects::{
    ConflictId, ConflictVariant, LocationId, ParticipantId, RevealPolicy,
};
use crate::infrastructure::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateConflictBody {
    pub variant: ConflictVariant,
    pub location_id: LocationId,
    pub initiator: ParticipantId,
    pub initiator_name: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub reveal_policy: Option<RevealPolicy>,
}

#[derive(Debug, Deserialize)]
pub struct JoinBody {
    pub participant: ParticipantId,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct ParticipantBody {
    pub participant: ParticipantId,
}

#[derive(Debug, Deserialize)]
pub struct ObjectiveBody {
    pub participant: ParticipantId,
    pub objective: Objective,
}

#[derive(Debug, Deserialize)]
pub struct EndBody {
    pub caller: ParticipantId,
}

#[derive(Debug, Deserialize)]
pub struct ObserverQuery {
    pub observer: ParticipantId,
}

/// Assets handed back to their owners
#[derive(Debug, Serialize)]
pub struct ReleasedAssets {
    pub released: Vec<Asset>,
}

/// List all live conflicts
pub async fn list_conflicts(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ConflictSummary>>, ApiError> {
    Ok(Json(state.conflict_service.list().await?))
}

/// Open a conflict
pub async fn create_conflict(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateConflictBody>,
) -> Result<(StatusCode, Json<ConflictView>), ApiError> {
    let view = state
        .conflict_service
        .create_conflict(CreateConflictRequest {
            variant: body.variant,
            location: body.location_id,
            initiator: body.initiator,
            initiator_name: body.initiator_name,
            name: body.name,
            reveal_policy: body.reveal_policy,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// A conflict as one participant sees it
pub async fn get_conflict(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<ObserverQuery>,
) -> Result<Json<ConflictView>, ApiError> {
    let id: ConflictId = parse_id(&id)?;
    Ok(Json(state.conflict_service.get(id, query.observer).await?))
}

/// List live conflicts at a location
pub async fn list_location_conflicts(
    State(state): State<Arc<AppState>>,
    Path(location_id): Path<String>,
) -> Result<Json<Vec<ConflictSummary>>, ApiError> {
    let location: LocationId = parse_id(&location_id)?;
    Ok(Json(state.conflict_service.list_at(location).await?))
}

/// Find the live conflict of one variant at a location, if any
pub async fn find_location_conflict(
    State(state): State<Arc<AppState>>,
    Path((location_id, variant)): Path<(String, String)>,
) -> Result<Json<Option<ConflictSummary>>, ApiError> {
    let location: LocationId = parse_id(&location_id)?;
    let variant: ConflictVariant = variant
        .parse()
        .map_err(|e: ConflictError| ApiError::bad_request(e.code(), e.to_string()))?;
    Ok(Json(
        state.conflict_service.find_at(location, variant).await?,
    ))
}

pub async fn join_conflict(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<JoinBody>,
) -> Result<Json<ConflictView>, ApiError> {
    let id: ConflictId = parse_id(&id)?;
    Ok(Json(
        state
            .conflict_service
            .join(id, body.participant, body.name)
            .await?,
    ))
}

pub async fn leave_conflict(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<ParticipantBody>,
) -> Result<Json<ReleasedAssets>, ApiError> {
    let id: ConflictId = parse_id(&id)?;
    let released = state.conflict_service.leave(id, body.participant).await?;
    Ok(Json(ReleasedAssets { released }))
}

pub async fn set_objective(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<ObjectiveBody>,
) -> Result<StatusCode, ApiError> {
    let id: ConflictId = parse_id(&id)?;
    state
        .conflict_service
        .set_objective(id, body.participant, body.objective)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn declare_winner(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<ParticipantBody>,
) -> Result<StatusCode, ApiError> {
    let id: ConflictId = parse_id(&id)?;
    state
        .conflict_service
        .declare_winner(id, body.participant)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn mark_defeated(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<ParticipantBody>,
) -> Result<Json<Vec<TaskEffect>>, ApiError> {
    let id: ConflictId = parse_id(&id)?;
    Ok(Json(
        state
            .conflict_service
            .mark_defeated(id, body.participant)
            .await?,
    ))
}

/// End a conflict; participants and administrators only
pub async fn end_conflict(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<EndBody>,
) -> Result<Json<ReleasedAssets>, ApiError> {
    let id: ConflictId = parse_id(&id)?;
    let released = state.conflict_service.end(id, body.caller).await?;
    Ok(Json(ReleasedAssets { released }))
}
