//! Persistence adapters
//!
//! Conflict snapshots are stored whole; every mutating command replaces the
//! previous snapshot for that conflict.

mod in_memory_conflict_repository;

pub use in_memory_conflict_repository::InMemoryConflictRepository;
