//! Infrastructure layer - External adapters and implementations
//!
//! This layer contains:
//! - Persistence: conflict snapshot storage
//! - HTTP: REST API routes
//! - Catalog, authority, dice and clock adapters for the outbound ports
//! - Config: Application configuration
//! - State: Shared application state

pub mod authority;
pub mod catalog;
pub mod clock;
pub mod config;
pub mod dice;
pub mod http;
pub mod persistence;
pub mod state;
