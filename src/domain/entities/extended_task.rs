//! Extended task entity - Progress accumulated across several rolls
//!
//! Significant opponents and well-kept secrets cannot be beaten by a single
//! success. An extended task collects points from any number of contributors
//! until the requirement is met.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::domain::errors::ConflictError;
use crate::domain::value_objects::{AssetId, ParticipantId, TaskId, ZoneId};

/// Subtracted from a skill rating to get discovery points per success
pub const DISCOVERY_SKILL_OFFSET: u32 = 4;

/// What the task is working against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum TaskTarget {
    Participant(ParticipantId),
    Asset(AssetId),
    Zone(ZoneId),
}

/// Why the task exists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskPurpose {
    /// Defeating a participant or asset
    Defeat,
    /// Uncovering information held in a zone
    Discovery,
    /// Learning an intrigue target's hidden desire
    Desire,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtendedTask {
    pub id: TaskId,
    pub target: TaskTarget,
    pub purpose: TaskPurpose,
    pub requirement: u32,
    pub accumulated: u32,
    pub max_attempts: Option<u32>,
    pub attempts: u32,
    pub contributors: BTreeSet<ParticipantId>,
}

impl ExtendedTask {
    /// Start a task with zero points; a requirement of zero is raised to one
    pub fn new(target: TaskTarget, purpose: TaskPurpose, requirement: u32) -> Self {
        Self {
            id: TaskId::new(),
            target,
            purpose,
            requirement: requirement.max(1),
            accumulated: 0,
            max_attempts: None,
            attempts: 0,
            contributors: BTreeSet::new(),
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: Option<u32>) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn is_complete(&self) -> bool {
        self.accumulated >= self.requirement
    }

    pub fn attempts_left(&self) -> Option<u32> {
        self.max_attempts
            .map(|max| max.saturating_sub(self.attempts))
    }

    /// Add points from one attempt. Zero points still uses up the attempt.
    pub fn contribute(
        &mut self,
        contributor: ParticipantId,
        points: u32,
    ) -> Result<TaskProgress, ConflictError> {
        if self.is_complete() {
            return Err(ConflictError::TaskComplete(self.id));
        }
        if let Some(max) = self.max_attempts {
            if self.attempts >= max {
                return Err(ConflictError::AttemptsExhausted { task: self.id, max });
            }
        }

        self.attempts += 1;
        self.accumulated = self.accumulated.saturating_add(points);
        self.contributors.insert(contributor);

        Ok(TaskProgress {
            task_id: self.id,
            target: self.target,
            purpose: self.purpose,
            points,
            accumulated: self.accumulated,
            requirement: self.requirement,
            complete: self.is_complete(),
        })
    }

    pub fn status(&self) -> TaskStatus {
        TaskStatus {
            task_id: self.id,
            target: self.target,
            purpose: self.purpose,
            accumulated: self.accumulated,
            requirement: self.requirement,
            attempts: self.attempts,
            max_attempts: self.max_attempts,
            contributors: self.contributors.iter().copied().collect(),
            complete: self.is_complete(),
        }
    }
}

/// Result of a single contribution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskProgress {
    pub task_id: TaskId,
    pub target: TaskTarget,
    pub purpose: TaskPurpose,
    pub points: u32,
    pub accumulated: u32,
    pub requirement: u32,
    pub complete: bool,
}

/// Snapshot of a task for display
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskStatus {
    pub task_id: TaskId,
    pub target: TaskTarget,
    pub purpose: TaskPurpose,
    pub accumulated: u32,
    pub requirement: u32,
    pub attempts: u32,
    pub max_attempts: Option<u32>,
    pub contributors: Vec<ParticipantId>,
    pub complete: bool,
}

/// Points earned from rolled successes
pub fn points_for_successes(successes: u32, per_success: u32) -> u32 {
    successes.saturating_mul(per_success)
}

/// Points per success on a discovery task, from the investigator's skill
pub fn discovery_points(skill: u32) -> u32 {
    skill.saturating_sub(DISCOVERY_SKILL_OFFSET).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(requirement: u32) -> ExtendedTask {
        ExtendedTask::new(
            TaskTarget::Participant(ParticipantId::new()),
            TaskPurpose::Defeat,
            requirement,
        )
    }

    #[test]
    fn test_accumulates_until_requirement() {
        let mut task = task(5);
        let hero = ParticipantId::new();

        let first = task.contribute(hero, 2).unwrap();
        assert_eq!(first.accumulated, 2);
        assert!(!first.complete);

        let second = task.contribute(hero, 2).unwrap();
        assert_eq!(second.accumulated, 4);
        assert!(!second.complete);

        let third = task.contribute(hero, 2).unwrap();
        assert_eq!(third.accumulated, 6);
        assert!(third.complete);
    }

    #[test]
    fn test_accumulated_never_decreases() {
        let mut task = task(10);
        let hero = ParticipantId::new();
        let mut last = 0;
        for points in [0, 3, 0, 1, 2] {
            let progress = task.contribute(hero, points).unwrap();
            assert!(progress.accumulated >= last);
            last = progress.accumulated;
        }
        assert_eq!(task.attempts, 5);
    }

    #[test]
    fn test_attempt_cap() {
        let mut task = task(10).with_max_attempts(Some(2));
        let hero = ParticipantId::new();
        task.contribute(hero, 1).unwrap();
        task.contribute(hero, 1).unwrap();
        assert_eq!(task.attempts_left(), Some(0));
        assert!(matches!(
            task.contribute(hero, 1),
            Err(ConflictError::AttemptsExhausted { max: 2, .. })
        ));
    }

    #[test]
    fn test_complete_task_rejects_points() {
        let mut task = task(1);
        let hero = ParticipantId::new();
        task.contribute(hero, 1).unwrap();
        assert!(matches!(
            task.contribute(hero, 1),
            Err(ConflictError::TaskComplete(_))
        ));
    }

    #[test]
    fn test_status_lists_contributors() {
        let mut task = task(4);
        let a = ParticipantId::new();
        let b = ParticipantId::new();
        task.contribute(a, 1).unwrap();
        task.contribute(b, 1).unwrap();
        task.contribute(a, 1).unwrap();
        let status = task.status();
        assert_eq!(status.contributors.len(), 2);
        assert_eq!(status.attempts, 3);
        assert_eq!(status.accumulated, 3);
    }

    #[test]
    fn test_point_helpers() {
        assert_eq!(points_for_successes(3, 2), 6);
        assert_eq!(discovery_points(7), 3);
        assert_eq!(discovery_points(2), 1);
    }
}
