//! Aggregates - Cluster of domain objects treated as a single unit

pub mod conflict_aggregate;
pub mod registry;

pub use conflict_aggregate::{
    ConflictAggregate, ContributionOutcome, DuelTarget, MoveOutcome, RelocationOutcome,
    TaskEffect, ZoneRef,
};
pub use registry::ConflictRegistry;
