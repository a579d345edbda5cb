//! Domain layer - Core conflict rules with no I/O
//!
//! This layer contains:
//! - Entities: Conflict, Zone, Asset, ExtendedTask, TurnState
//! - Value Objects: ids, Quality, Disposition, variants and movement manners
//! - Aggregates: the conflict aggregate root and the per-location registry
//! - Domain Services: zone adjacency, movement legality, difficulty

pub mod aggregates;
pub mod entities;
pub mod errors;
pub mod services;
pub mod value_objects;
