//! Conflict error taxonomy
//!
//! Every failure here is a reported, recoverable condition. None of them
//! damages the conflict it was raised against; the caller corrects the input
//! and reissues the command.

use crate::domain::value_objects::{
    AssetId, ConflictId, ConflictVariant, LocationId, ParticipantId, TaskId, ZoneId,
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConflictError {
    // Structural
    #[error("Unknown zone: {0}")]
    UnknownZone(String),

    #[error("A zone named '{0}' already exists")]
    DuplicateZone(String),

    #[error("Unknown asset: {0}")]
    UnknownAsset(AssetId),

    #[error("Asset {asset} is not owned by {caller}")]
    NotOwner { asset: AssetId, caller: ParticipantId },

    #[error("Unknown conflict: {0}")]
    UnknownConflict(ConflictId),

    #[error("Participant {0} is not part of this conflict")]
    NotParticipant(ParticipantId),

    // Legality
    #[error("Asset {0} cannot be moved")]
    Immobile(AssetId),

    #[error("Illegal zone: {0}")]
    IllegalZone(String),

    #[error("Security in {zone} (quality {security}) is higher than the asset's quality {quality}; move subtly or boldly")]
    SecurityTooHigh {
        zone: String,
        security: u8,
        quality: u8,
    },

    #[error("{to} is not adjacent to {from}")]
    NotAdjacent { from: String, to: String },

    // Turn discipline
    #[error("It is not {0}'s turn")]
    NotYourTurn(ParticipantId),

    #[error("The initiative has already been kept this round")]
    AlreadyKept,

    #[error("Turn order has not started")]
    TurnsNotRunning,

    #[error("Keeping the initiative costs {required} momentum, only {offered} offered")]
    InsufficientMomentum { required: u32, offered: u32 },

    // Lifecycle
    #[error("An active {variant} already exists at location {location}")]
    DuplicateActiveConflict {
        variant: ConflictVariant,
        location: LocationId,
    },

    #[error("{0} is already a participant")]
    AlreadyParticipant(ParticipantId),

    #[error("Insufficient access: {0}")]
    InsufficientAccess(String),

    #[error("{0} is not authorized to end this conflict")]
    NotAuthorized(ParticipantId),

    #[error("Conflict {0} has concluded")]
    ConflictConcluded(ConflictId),

    #[error("This {0} already has its full complement of participants")]
    ConflictFull(ConflictVariant),

    #[error("Expected {expected}, got {actual}")]
    WrongVariant { expected: String, actual: String },

    // Visibility
    #[error("Zone {0} is not visible to you")]
    ZoneNotVisible(String),

    // Extended tasks
    #[error("Unknown extended task: {0}")]
    UnknownTask(TaskId),

    #[error("An extended task is already running against that target")]
    DuplicateTask,

    #[error("Extended task {0} is already complete")]
    TaskComplete(TaskId),

    #[error("Extended task {task} has used all {max} attempts")]
    AttemptsExhausted { task: TaskId, max: u32 },

    // Catalog and values
    #[error("No catalog entry named '{0}'")]
    UnknownCatalogEntry(String),

    #[error("Invalid quality '{0}': expected 0-5 or Special")]
    InvalidQuality(String),

    #[error("Unrecognized {kind} '{value}'")]
    Unrecognized { kind: &'static str, value: String },

    #[error("Invariant violated: {0}")]
    InvariantViolation(String),

    #[error("Zone {0} does not belong to this conflict")]
    ForeignZone(ZoneId),
}

impl ConflictError {
    /// Stable machine-readable code for the presentation layer
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnknownZone(_) => "UNKNOWN_ZONE",
            Self::DuplicateZone(_) => "DUPLICATE_ZONE",
            Self::UnknownAsset(_) => "UNKNOWN_ASSET",
            Self::NotOwner { .. } => "NOT_OWNER",
            Self::UnknownConflict(_) => "UNKNOWN_CONFLICT",
            Self::NotParticipant(_) => "NOT_PARTICIPANT",
            Self::Immobile(_) => "IMMOBILE",
            Self::IllegalZone(_) => "ILLEGAL_ZONE",
            Self::SecurityTooHigh { .. } => "SECURITY_TOO_HIGH",
            Self::NotAdjacent { .. } => "NOT_ADJACENT",
            Self::NotYourTurn(_) => "NOT_YOUR_TURN",
            Self::AlreadyKept => "ALREADY_KEPT",
            Self::TurnsNotRunning => "TURNS_NOT_RUNNING",
            Self::InsufficientMomentum { .. } => "INSUFFICIENT_MOMENTUM",
            Self::DuplicateActiveConflict { .. } => "DUPLICATE_ACTIVE_CONFLICT",
            Self::AlreadyParticipant(_) => "ALREADY_PARTICIPANT",
            Self::InsufficientAccess(_) => "INSUFFICIENT_ACCESS",
            Self::NotAuthorized(_) => "NOT_AUTHORIZED",
            Self::ConflictConcluded(_) => "CONFLICT_CONCLUDED",
            Self::ConflictFull(_) => "CONFLICT_FULL",
            Self::WrongVariant { .. } => "WRONG_VARIANT",
            Self::ZoneNotVisible(_) => "ZONE_NOT_VISIBLE",
            Self::UnknownTask(_) => "UNKNOWN_TASK",
            Self::DuplicateTask => "DUPLICATE_TASK",
            Self::TaskComplete(_) => "TASK_COMPLETE",
            Self::AttemptsExhausted { .. } => "ATTEMPTS_EXHAUSTED",
            Self::UnknownCatalogEntry(_) => "UNKNOWN_CATALOG_ENTRY",
            Self::InvalidQuality(_) => "INVALID_QUALITY",
            Self::Unrecognized { .. } => "UNRECOGNIZED",
            Self::InvariantViolation(_) => "INVARIANT_VIOLATION",
            Self::ForeignZone(_) => "FOREIGN_ZONE",
        }
    }

    /// Taxonomy group, used to pick a transport status
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownZone(_)
            | Self::UnknownAsset(_)
            | Self::UnknownConflict(_)
            | Self::UnknownTask(_)
            | Self::UnknownCatalogEntry(_) => ErrorKind::NotFound,
            Self::NotOwner { .. }
            | Self::NotAuthorized(_)
            | Self::InsufficientAccess(_)
            | Self::NotParticipant(_)
            | Self::ZoneNotVisible(_) => ErrorKind::Forbidden,
            Self::DuplicateZone(_)
            | Self::DuplicateActiveConflict { .. }
            | Self::AlreadyParticipant(_)
            | Self::DuplicateTask
            | Self::ConflictConcluded(_)
            | Self::ConflictFull(_)
            | Self::TaskComplete(_)
            | Self::NotYourTurn(_)
            | Self::AlreadyKept
            | Self::TurnsNotRunning => ErrorKind::Conflict,
            Self::InvariantViolation(_) | Self::ForeignZone(_) => ErrorKind::Corruption,
            _ => ErrorKind::Invalid,
        }
    }
}

/// Coarse grouping of [`ConflictError`] variants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Forbidden,
    Conflict,
    Invalid,
    Corruption,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_screaming_snake() {
        let err = ConflictError::SecurityTooHigh {
            zone: "Palace".to_string(),
            security: 2,
            quality: 1,
        };
        assert_eq!(err.code(), "SECURITY_TOO_HIGH");
        assert_eq!(err.kind(), ErrorKind::Invalid);
        assert!(err.to_string().contains("subtly or boldly"));
    }

    #[test]
    fn test_invariant_errors_are_corruption() {
        let err = ConflictError::ForeignZone(ZoneId::new());
        assert_eq!(err.kind(), ErrorKind::Corruption);
    }
}
