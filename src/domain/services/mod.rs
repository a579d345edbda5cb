//! Domain services - Pure rules over conflict state

pub mod difficulty;
pub mod movement;
pub mod zone_graph;

pub use difficulty::{DifficultyModifier, DifficultyReport};
pub use movement::{plan_move, MovePlan, MoveRequest};
pub use zone_graph::ZoneGraph;
