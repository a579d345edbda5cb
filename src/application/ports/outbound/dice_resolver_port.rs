//! Dice resolver port - The external roller conflicts hand their difficulty to
//!
//! The engine never rolls on its own behalf. A caller prepares a roll, the
//! resolver turns it into successes, and the caller feeds the outcome back.

use crate::application::dto::{DiceRequest, DiceResponse};

#[cfg_attr(test, mockall::automock)]
pub trait DiceResolverPort: Send + Sync {
    /// Roll the request's dice against its target number
    fn resolve(&self, request: &DiceRequest) -> DiceResponse;
}
