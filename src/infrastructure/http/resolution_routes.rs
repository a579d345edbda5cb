//! Resolution API routes - roll planning, rolling and extended tasks
//!
//! Mirrors the three-step flow: plan a roll against a difficulty, roll it,
//! then apply the outcome to a task or a warfare zone.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use super::error::{parse_id, ApiError};
use crate::application::dto::{DiceResponse, RollPlan, RollRequest};
use crate::application::services::{ResolutionService, Scoring, StartTaskRequest};
use crate::domain::aggregates::{ContributionOutcome, ZoneRef};
use crate::domain::entities::TaskStatus;
use crate::domain::value_objects::{ConflictId, ParticipantId, TaskId};
use crate::infrastructure::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PlanRollBody {
    pub difficulty: u32,
    #[serde(flatten)]
    pub roll: RollRequest,
}

#[derive(Debug, Deserialize)]
pub struct DesireTaskBody {
    pub zone: ZoneRef,
}

#[derive(Debug, Deserialize)]
pub struct ContributionBody {
    pub contributor: ParticipantId,
    pub points: u32,
}

#[derive(Debug, Deserialize)]
pub struct TaskRollBody {
    pub contributor: ParticipantId,
    pub response: DiceResponse,
    pub scoring: Scoring,
}

#[derive(Debug, Deserialize)]
pub struct ZoneRollBody {
    pub zone: ZoneRef,
    pub participant: ParticipantId,
    pub difficulty: u32,
    pub response: DiceResponse,
}

#[derive(Debug, Serialize)]
pub struct CreatedTask {
    pub id: TaskId,
}

#[derive(Debug, Serialize)]
pub struct ZoneRollOutcome {
    pub taken: bool,
}

fn task_ids(raw: &(String, String)) -> Result<(ConflictId, TaskId), ApiError> {
    Ok((parse_id(&raw.0)?, parse_id(&raw.1)?))
}

/// Size a roll and report what it costs
pub async fn plan_roll(
    State(state): State<Arc<AppState>>,
    Json(body): Json<PlanRollBody>,
) -> Result<Json<RollPlan>, ApiError> {
    Ok(Json(
        state
            .resolution_service
            .prepare_roll(body.difficulty, body.roll)
            .await?,
    ))
}

pub async fn roll(
    State(state): State<Arc<AppState>>,
    Json(plan): Json<RollPlan>,
) -> Result<Json<DiceResponse>, ApiError> {
    Ok(Json(state.resolution_service.roll(plan).await?))
}

pub async fn start_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(request): Json<StartTaskRequest>,
) -> Result<(StatusCode, Json<CreatedTask>), ApiError> {
    let id: ConflictId = parse_id(&id)?;
    let task = state.resolution_service.start_task(id, request).await?;
    Ok((StatusCode::CREATED, Json(CreatedTask { id: task })))
}

/// Intrigue: open a task to uncover a zone's desire
pub async fn start_desire_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<DesireTaskBody>,
) -> Result<(StatusCode, Json<CreatedTask>), ApiError> {
    let id: ConflictId = parse_id(&id)?;
    let task = state
        .resolution_service
        .start_desire_task(id, body.zone)
        .await?;
    Ok((StatusCode::CREATED, Json(CreatedTask { id: task })))
}

pub async fn task_status(
    State(state): State<Arc<AppState>>,
    Path(raw): Path<(String, String)>,
) -> Result<Json<TaskStatus>, ApiError> {
    let (id, task) = task_ids(&raw)?;
    Ok(Json(state.resolution_service.task_status(id, task).await?))
}

pub async fn discard_task(
    State(state): State<Arc<AppState>>,
    Path(raw): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    let (id, task) = task_ids(&raw)?;
    state.resolution_service.discard_task(id, task).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn contribute(
    State(state): State<Arc<AppState>>,
    Path(raw): Path<(String, String)>,
    Json(body): Json<ContributionBody>,
) -> Result<Json<ContributionOutcome>, ApiError> {
    let (id, task) = task_ids(&raw)?;
    Ok(Json(
        state
            .resolution_service
            .contribute(id, task, body.contributor, body.points)
            .await?,
    ))
}

/// Feed a roll's successes into a task
pub async fn apply_roll_to_task(
    State(state): State<Arc<AppState>>,
    Path(raw): Path<(String, String)>,
    Json(body): Json<TaskRollBody>,
) -> Result<Json<ContributionOutcome>, ApiError> {
    let (id, task) = task_ids(&raw)?;
    Ok(Json(
        state
            .resolution_service
            .apply_roll_to_task(id, task, body.contributor, body.response, body.scoring)
            .await?,
    ))
}

/// Warfare: a successful roll takes the zone
pub async fn apply_roll_to_zone(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<ZoneRollBody>,
) -> Result<Json<ZoneRollOutcome>, ApiError> {
    let id: ConflictId = parse_id(&id)?;
    let taken = state
        .resolution_service
        .apply_roll_to_zone(id, body.zone, body.participant, body.difficulty, body.response)
        .await?;
    Ok(Json(ZoneRollOutcome { taken }))
}
