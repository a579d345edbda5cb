//! Asset catalog port - Named templates for tangible assets

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::entities::AssetType;
use crate::domain::value_objects::Quality;

/// A catalog template. Instantiated into an asset when placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub name: String,
    pub asset_type: AssetType,
    pub quality: Quality,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub description: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AssetCatalogPort: Send + Sync {
    /// Find an entry by name, ignoring case
    async fn lookup(&self, name: &str) -> Result<Option<CatalogEntry>>;

    /// Every entry, sorted by name
    async fn list(&self) -> Result<Vec<CatalogEntry>>;
}
