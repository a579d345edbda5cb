//! Static asset catalog - Built-in templates plus an optional JSON file
//!
//! File format: a JSON array of records, e.g.
//!
//! ```json
//! [{ "name": "Lasgun", "asset_type": "weapon", "quality": "2", "keywords": ["ranged"] }]
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};

use crate::application::ports::outbound::{AssetCatalogPort, CatalogEntry};
use crate::domain::entities::{AssetType, KEYWORD_HALF, KEYWORD_RANGED};
use crate::domain::value_objects::Quality;

/// A catalog entry as written in a file: type and quality in their text forms
#[derive(Debug, Clone, Deserialize)]
struct CatalogRecord {
    name: String,
    asset_type: String,
    quality: String,
    #[serde(default)]
    keywords: Vec<String>,
    #[serde(default)]
    description: String,
}

impl CatalogRecord {
    fn into_entry(self) -> Result<CatalogEntry> {
        let asset_type: AssetType = self
            .asset_type
            .parse()
            .with_context(|| format!("Catalog entry '{}' has a bad asset type", self.name))?;
        let quality = Quality::parse(&self.quality)
            .with_context(|| format!("Catalog entry '{}' has a bad quality", self.name))?;
        Ok(CatalogEntry {
            name: self.name,
            asset_type,
            quality,
            keywords: self.keywords,
            description: self.description,
        })
    }
}

/// In-memory catalog keyed by lowercased name
#[derive(Debug, Clone)]
pub struct StaticAssetCatalog {
    entries: BTreeMap<String, CatalogEntry>,
}

impl StaticAssetCatalog {
    /// The built-in entries only
    pub fn builtin() -> Self {
        let mut catalog = Self {
            entries: BTreeMap::new(),
        };
        for entry in builtin_entries() {
            catalog.insert(entry);
        }
        catalog
    }

    /// Built-ins extended (and overridden by name) with a JSON file
    pub async fn load(path: &Path) -> Result<Self> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read asset catalog {}", path.display()))?;
        let mut catalog = Self::builtin();
        let added = catalog.extend_from_json(&raw)?;
        info!(path = %path.display(), added, "Loaded asset catalog file");
        Ok(catalog)
    }

    /// Merge a JSON array of records into the catalog
    pub fn extend_from_json(&mut self, raw: &str) -> Result<usize> {
        let records: Vec<CatalogRecord> =
            serde_json::from_str(raw).context("Asset catalog must be a JSON array of entries")?;
        let count = records.len();
        for record in records {
            let entry = record.into_entry()?;
            debug!(name = %entry.name, "Catalog entry");
            self.insert(entry);
        }
        Ok(count)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn insert(&mut self, entry: CatalogEntry) {
        self.entries.insert(entry.name.to_lowercase(), entry);
    }
}

impl Default for StaticAssetCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[async_trait]
impl AssetCatalogPort for StaticAssetCatalog {
    async fn lookup(&self, name: &str) -> Result<Option<CatalogEntry>> {
        Ok(self.entries.get(&name.trim().to_lowercase()).cloned())
    }

    async fn list(&self) -> Result<Vec<CatalogEntry>> {
        Ok(self.entries.values().cloned().collect())
    }
}

fn entry(
    name: &str,
    asset_type: AssetType,
    quality: u8,
    keywords: &[&str],
    description: &str,
) -> CatalogEntry {
    CatalogEntry {
        name: name.to_string(),
        asset_type,
        quality: Quality::Rated(quality),
        keywords: keywords.iter().map(|k| k.to_string()).collect(),
        description: description.to_string(),
    }
}

fn builtin_entries() -> Vec<CatalogEntry> {
    vec![
        entry("Crysknife", AssetType::Weapon, 2, &[], "A blade ground from a sandworm's tooth"),
        entry("Kindjal", AssetType::Weapon, 1, &[], "A short double-edged blade"),
        entry("Rapier", AssetType::Weapon, 2, &[], "A light duelling sword"),
        entry(
            "Maula Pistol",
            AssetType::Weapon,
            1,
            &[KEYWORD_RANGED],
            "A spring-loaded dart pistol",
        ),
        entry(
            "Lasgun",
            AssetType::Weapon,
            3,
            &[KEYWORD_RANGED],
            "A continuous-wave laser projector",
        ),
        entry("Shield", AssetType::Shield, 2, &[], "A personal body shield"),
        entry(
            "Half Shield",
            AssetType::Shield,
            1,
            &[KEYWORD_HALF],
            "A light shield covering one flank",
        ),
        entry("Stillsuit", AssetType::Armor, 1, &[], "Desert survival suit, lightly padded"),
        entry("Combat Armor", AssetType::Armor, 2, &[], "Plated armor for close fighting"),
        entry("Hunter-Seeker", AssetType::Surveillance, 2, &[], "A hovering assassination probe"),
        entry("Guard Detail", AssetType::Security, 2, &[], "Household troops posted at a door"),
        entry("Sardaukar Legion", AssetType::Infantry, 4, &[], "Elite imperial shock troops"),
        entry("Ornithopter Wing", AssetType::Aircraft, 2, &[], "Light flapping-wing aircraft"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_lookup_ignores_case() {
        let catalog = StaticAssetCatalog::builtin();
        let entry = catalog.lookup("  maula pistol").await.unwrap().unwrap();
        assert_eq!(entry.asset_type, AssetType::Weapon);
        assert!(entry.keywords.iter().any(|k| k == KEYWORD_RANGED));
        assert!(catalog.lookup("Spice Harvester").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_json_extends_and_overrides() {
        let mut catalog = StaticAssetCatalog::builtin();
        let before = catalog.len();
        let added = catalog
            .extend_from_json(
                r#"[
                    {"name": "crysknife", "asset_type": "weapon", "quality": "4"},
                    {"name": "Truthsayer", "asset_type": "informant", "quality": "special",
                     "description": "Sees through lies"}
                ]"#,
            )
            .unwrap();
        assert_eq!(added, 2);
        assert_eq!(catalog.len(), before + 1);

        let knife = catalog.lookup("Crysknife").await.unwrap().unwrap();
        assert_eq!(knife.quality, Quality::Rated(4));
        let seer = catalog.lookup("truthsayer").await.unwrap().unwrap();
        assert_eq!(seer.quality, Quality::Special);
    }

    #[test]
    fn test_bad_records_are_rejected() {
        let mut catalog = StaticAssetCatalog::builtin();
        assert!(catalog.extend_from_json("{}").is_err());
        assert!(catalog
            .extend_from_json(r#"[{"name": "Nuke", "asset_type": "weapon", "quality": "9"}]"#)
            .is_err());
        assert!(catalog
            .extend_from_json(r#"[{"name": "Broom", "asset_type": "mop", "quality": "1"}]"#)
            .is_err());
    }

    #[tokio::test]
    async fn test_list_is_sorted_by_name() {
        let names: Vec<String> = StaticAssetCatalog::builtin()
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.name.to_lowercase())
            .collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }
}
