//! Application services - Use case implementations
//!
//! Each service is a trait plus an `Impl` holding its ports. They share one
//! [`ConflictStore`], so every conflict is mutated under a single lock.

pub mod conflict_service;
pub mod conflict_store;
pub mod resolution_service;
pub mod tactical_service;

pub use conflict_service::{ConflictService, ConflictServiceImpl, CreateConflictRequest};
pub use conflict_store::ConflictStore;
pub use resolution_service::{
    ResolutionService, ResolutionServiceImpl, Scoring, StartTaskRequest,
};
pub use tactical_service::{TacticalService, TacticalServiceImpl};
