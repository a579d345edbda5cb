//! WrldBldr Conflict - Tactical conflict engine
//!
//! Runs duels, skirmishes, espionage, intrigue and warfare conflicts tied to
//! locations. Conflicts hold zones and assets, compute roll difficulties, track
//! extended tasks and sequence turns. Dice are rolled by an external resolver.

pub mod application;
pub mod domain;
pub mod infrastructure;
