//! Shared application state

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::application::ports::outbound::{
    AssetCatalogPort, AuthorityPort, ClockPort, ConflictRepositoryPort, DiceResolverPort,
};
use crate::application::services::{
    ConflictServiceImpl, ConflictStore, ResolutionServiceImpl, TacticalServiceImpl,
};
use crate::infrastructure::authority::RosterAuthority;
use crate::infrastructure::catalog::StaticAssetCatalog;
use crate::infrastructure::clock::SystemClock;
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::dice::RandomDiceResolver;
use crate::infrastructure::persistence::InMemoryConflictRepository;

/// Shared application state
pub struct AppState {
    pub config: AppConfig,
    /// Live conflicts, shared by every service
    pub store: ConflictStore,
    pub catalog: Arc<dyn AssetCatalogPort>,
    // Application services
    pub conflict_service: ConflictServiceImpl,
    pub tactical_service: TacticalServiceImpl,
    pub resolution_service: ResolutionServiceImpl,
}

impl AppState {
    pub async fn new(config: AppConfig) -> Result<Self> {
        // Initialize the asset catalog
        let catalog = match &config.asset_catalog_path {
            Some(path) => StaticAssetCatalog::load(path)
                .await
                .context("Failed to load ASSET_CATALOG_PATH")?,
            None => StaticAssetCatalog::builtin(),
        };

        let repository: Arc<dyn ConflictRepositoryPort> = Arc::new(InMemoryConflictRepository::new());
        let authority: Arc<dyn AuthorityPort> = Arc::new(RosterAuthority::from_config(&config));
        let dice: Arc<dyn DiceResolverPort> = Arc::new(RandomDiceResolver::new());
        let clock: Arc<dyn ClockPort> = Arc::new(SystemClock);

        Ok(Self::with_adapters(config, repository, Arc::new(catalog), authority, dice, clock))
    }

    /// Wire services over explicit adapters
    pub fn with_adapters(
        config: AppConfig,
        repository: Arc<dyn ConflictRepositoryPort>,
        catalog: Arc<dyn AssetCatalogPort>,
        authority: Arc<dyn AuthorityPort>,
        dice: Arc<dyn DiceResolverPort>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        let store = ConflictStore::new(repository, clock);

        // Initialize application services
        let conflict_service =
            ConflictServiceImpl::new(store.clone(), authority, config.reveal_policy);
        let tactical_service = TacticalServiceImpl::new(store.clone(), catalog.clone());
        let resolution_service = ResolutionServiceImpl::new(store.clone(), dice);

        Self {
            config,
            store,
            catalog,
            conflict_service,
            tactical_service,
            resolution_service,
        }
    }

    /// Reload live conflicts from the repository
    pub async fn restore(&self) -> Result<usize> {
        self.store.restore().await
    }
}
