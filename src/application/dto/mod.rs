//! Data Transfer Objects - For API boundaries
//!
//! Roll plans travel between the difficulty step and the dice resolver;
//! conflict views are what a single observer is allowed to see.

pub mod conflict;
pub mod dice;
pub mod tactics;

pub use conflict::*;
pub use dice::*;
pub use tactics::*;
