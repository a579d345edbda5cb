//! Application layer - Use cases over the conflict domain
//!
//! Services here coordinate the domain aggregates with the outbound ports
//! (dice, catalog, authority, persistence, clock).

pub mod dto;
pub mod ports;
pub mod services;
