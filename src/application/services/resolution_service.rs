//! Resolution Service - The two-step dice flow and extended tasks
//!
//! A difficulty comes from the tactical service. Here it is turned into a
//! roll plan, handed to the dice resolver, and the outcome is fed back into
//! the conflict as extended-task points or a change of zone control. Each
//! step is its own call so a human can decide what to spend in between.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::application::dto::{plan_roll, DiceResponse, RollPlan, RollRequest};
use crate::application::ports::outbound::DiceResolverPort;
use crate::application::services::conflict_store::ConflictStore;
use crate::domain::aggregates::{ContributionOutcome, ZoneRef};
use crate::domain::entities::{
    discovery_points, points_for_successes, TaskPurpose, TaskStatus, TaskTarget,
};
use crate::domain::value_objects::{ConflictId, ParticipantId, TaskId};

/// An extended task to open
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartTaskRequest {
    pub target: TaskTarget,
    pub purpose: TaskPurpose,
    pub requirement: u32,
    #[serde(default)]
    pub max_attempts: Option<u32>,
}

/// How rolled successes turn into task points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scoring", rename_all = "snake_case")]
pub enum Scoring {
    /// A fixed number of points per success
    PerSuccess { points: u32 },
    /// Discovery: skill minus a constant per success, at least one
    Discovery { skill: u32 },
}

impl Scoring {
    pub fn points(&self, successes: u32) -> u32 {
        match self {
            Self::PerSuccess { points } => points_for_successes(successes, *points),
            Self::Discovery { skill } => points_for_successes(successes, discovery_points(*skill)),
        }
    }
}

#[async_trait]
pub trait ResolutionService: Send + Sync {
    /// Step one: size the roll and report its cost
    async fn prepare_roll(&self, difficulty: u32, roll: RollRequest) -> Result<RollPlan>;

    /// Step two: ask the dice resolver
    async fn roll(&self, plan: RollPlan) -> Result<DiceResponse>;

    async fn start_task(&self, id: ConflictId, request: StartTaskRequest) -> Result<TaskId>;

    /// Open a task to uncover an intrigue zone's desire
    async fn start_desire_task(&self, id: ConflictId, zone: ZoneRef) -> Result<TaskId>;

    async fn contribute(
        &self,
        id: ConflictId,
        task: TaskId,
        contributor: ParticipantId,
        points: u32,
    ) -> Result<ContributionOutcome>;

    /// Step three: feed a roll's successes into a task
    async fn apply_roll_to_task(
        &self,
        id: ConflictId,
        task: TaskId,
        contributor: ParticipantId,
        response: DiceResponse,
        scoring: Scoring,
    ) -> Result<ContributionOutcome>;

    /// Step three, warfare: a successful roll takes the zone
    async fn apply_roll_to_zone(
        &self,
        id: ConflictId,
        zone: ZoneRef,
        participant: ParticipantId,
        difficulty: u32,
        response: DiceResponse,
    ) -> Result<bool>;

    async fn task_status(&self, id: ConflictId, task: TaskId) -> Result<TaskStatus>;

    async fn discard_task(&self, id: ConflictId, task: TaskId) -> Result<()>;
}

#[derive(Clone)]
pub struct ResolutionServiceImpl {
    store: ConflictStore,
    dice: Arc<dyn DiceResolverPort>,
}

impl ResolutionServiceImpl {
    pub fn new(store: ConflictStore, dice: Arc<dyn DiceResolverPort>) -> Self {
        Self { store, dice }
    }
}

#[async_trait]
impl ResolutionService for ResolutionServiceImpl {
    #[instrument(skip(self))]
    async fn prepare_roll(&self, difficulty: u32, roll: RollRequest) -> Result<RollPlan> {
        let plan = plan_roll(difficulty, roll);
        debug!(
            dice = plan.request.dice_count,
            target = plan.request.target_number,
            momentum = plan.cost.momentum,
            threat = plan.cost.threat,
            "Prepared roll"
        );
        Ok(plan)
    }

    #[instrument(skip(self))]
    async fn roll(&self, plan: RollPlan) -> Result<DiceResponse> {
        let response = self.dice.resolve(&plan.request);
        info!(
            successes = response.successes,
            complications = response.complications,
            momentum = response.momentum_generated,
            "Rolled {}d20 against {}",
            plan.request.dice_count,
            plan.request.target_number
        );
        Ok(response)
    }

    #[instrument(skip(self))]
    async fn start_task(&self, id: ConflictId, request: StartTaskRequest) -> Result<TaskId> {
        let task = self
            .store
            .mutate(id, |aggregate, _| {
                aggregate.start_task(
                    request.target,
                    request.purpose,
                    request.requirement,
                    request.max_attempts,
                )
            })
            .await?;
        info!(conflict_id = %id, task_id = %task, "Started extended task");
        Ok(task)
    }

    #[instrument(skip(self))]
    async fn start_desire_task(&self, id: ConflictId, zone: ZoneRef) -> Result<TaskId> {
        self.store
            .mutate(id, |aggregate, _| {
                let zone = aggregate.resolve_shared_zone(&zone)?;
                aggregate.start_desire_task(zone)
            })
            .await
    }

    #[instrument(skip(self))]
    async fn contribute(
        &self,
        id: ConflictId,
        task: TaskId,
        contributor: ParticipantId,
        points: u32,
    ) -> Result<ContributionOutcome> {
        let outcome = self
            .store
            .mutate(id, |aggregate, now| {
                aggregate.contribute(task, contributor, points, now)
            })
            .await?;
        info!(
            conflict_id = %id,
            task_id = %task,
            accumulated = outcome.progress.accumulated,
            requirement = outcome.progress.requirement,
            complete = outcome.progress.complete,
            "Extended task progress"
        );
        Ok(outcome)
    }

    #[instrument(skip(self, response))]
    async fn apply_roll_to_task(
        &self,
        id: ConflictId,
        task: TaskId,
        contributor: ParticipantId,
        response: DiceResponse,
        scoring: Scoring,
    ) -> Result<ContributionOutcome> {
        let points = scoring.points(response.successes);
        self.contribute(id, task, contributor, points).await
    }

    #[instrument(skip(self, response))]
    async fn apply_roll_to_zone(
        &self,
        id: ConflictId,
        zone: ZoneRef,
        participant: ParticipantId,
        difficulty: u32,
        response: DiceResponse,
    ) -> Result<bool> {
        if !response.succeeded(difficulty) {
            debug!(conflict_id = %id, "Roll failed, zone control unchanged");
            return Ok(false);
        }
        self.store
            .mutate(id, |aggregate, _| {
                let zone = aggregate.resolve_shared_zone(&zone)?;
                aggregate.set_zone_control(zone, Some(participant))
            })
            .await?;
        info!(conflict_id = %id, controller = %participant, "Zone taken");
        Ok(true)
    }

    #[instrument(skip(self))]
    async fn task_status(&self, id: ConflictId, task: TaskId) -> Result<TaskStatus> {
        self.store
            .read(id, |aggregate| Ok(aggregate.task(task)?.status()))
            .await
    }

    #[instrument(skip(self))]
    async fn discard_task(&self, id: ConflictId, task: TaskId) -> Result<()> {
        self.store
            .mutate(id, |aggregate, _| aggregate.discard_task(task).map(|_| ()))
            .await
    }
}
