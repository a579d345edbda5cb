//! Outbound ports - Interfaces that the application requires from external systems

mod asset_catalog_port;
mod authority_port;
mod clock_port;
mod conflict_repository_port;
mod dice_resolver_port;

pub use asset_catalog_port::{AssetCatalogPort, CatalogEntry};
pub use authority_port::{AuthorityPort, Authorization};
pub use clock_port::ClockPort;
pub use conflict_repository_port::ConflictRepositoryPort;
pub use dice_resolver_port::DiceResolverPort;

#[cfg(test)]
pub use asset_catalog_port::MockAssetCatalogPort;
#[cfg(test)]
pub use authority_port::MockAuthorityPort;
#[cfg(test)]
pub use clock_port::MockClockPort;
#[cfg(test)]
pub use conflict_repository_port::MockConflictRepositoryPort;
#[cfg(test)]
pub use dice_resolver_port::MockDiceResolverPort;
