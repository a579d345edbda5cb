//! Value objects - Immutable objects defined by their attributes

mod disposition;
mod ids;
mod movement;
mod quality;
mod variant;

pub use disposition::Disposition;
pub use ids::*;
pub use movement::{Manner, Mobility};
pub use quality::{Quality, MAX_QUALITY};
pub use variant::{ConflictState, ConflictVariant, RevealPolicy};
