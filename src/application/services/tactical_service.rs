//! Tactical Service - Zones, assets, difficulty, visibility and turns
//!
//! Every command is addressed to a conflict by id and acted out by one
//! participant. Zone arguments are [`ZoneRef`]s so the command layer can pass
//! names the players typed.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::application::dto::{DifficultyRequest, MoveAssetRequest, NewAsset, ZoneSpec};
use crate::application::ports::outbound::AssetCatalogPort;
use crate::application::services::conflict_store::ConflictStore;
use crate::domain::aggregates::{MoveOutcome, RelocationOutcome, ZoneRef};
use crate::domain::entities::{Asset, AssetOrigin, InitiativeGrant, DEFAULT_DESIRE_RESISTANCE};
use crate::domain::errors::ConflictError;
use crate::domain::services::DifficultyReport;
use crate::domain::value_objects::{
    AssetId, ConflictId, Disposition, Manner, ParticipantId, ZoneId,
};

/// Tactical use cases inside one conflict
#[async_trait]
pub trait TacticalService: Send + Sync {
    async fn add_zone(&self, id: ConflictId, spec: ZoneSpec) -> Result<ZoneId>;

    /// Link two espionage zones, optionally hidden
    async fn connect(
        &self,
        id: ConflictId,
        actor: ParticipantId,
        a: ZoneRef,
        b: ZoneRef,
        kind: String,
        hidden: bool,
    ) -> Result<()>;

    async fn adjacent(
        &self,
        id: ConflictId,
        observer: ParticipantId,
        zone: ZoneRef,
    ) -> Result<Vec<ZoneId>>;

    /// Bring a catalog item into play
    async fn add_catalog_asset(
        &self,
        id: ConflictId,
        owner: ParticipantId,
        catalog_name: String,
        zone: ZoneRef,
    ) -> Result<Asset>;

    /// Mint an intangible asset
    async fn add_intangible_asset(
        &self,
        id: ConflictId,
        owner: ParticipantId,
        asset: NewAsset,
    ) -> Result<Asset>;

    async fn move_asset(
        &self,
        id: ConflictId,
        mover: ParticipantId,
        asset: AssetId,
        request: MoveAssetRequest,
    ) -> Result<MoveOutcome>;

    /// Skirmish: point a ranged weapon at a zone
    async fn aim(
        &self,
        id: ConflictId,
        mover: ParticipantId,
        asset: AssetId,
        zone: ZoneRef,
    ) -> Result<MoveOutcome>;

    async fn move_participant(
        &self,
        id: ConflictId,
        participant: ParticipantId,
        zone: ZoneRef,
    ) -> Result<RelocationOutcome>;

    async fn defeat_asset(&self, id: ConflictId, asset: AssetId) -> Result<Asset>;

    async fn destroy_asset(&self, id: ConflictId, asset: AssetId) -> Result<Asset>;

    async fn expose_asset(&self, id: ConflictId, asset: AssetId) -> Result<Asset>;

    async fn rally_asset(
        &self,
        id: ConflictId,
        owner: ParticipantId,
        asset: AssetId,
        zone: Option<ZoneRef>,
    ) -> Result<Asset>;

    async fn difficulty(
        &self,
        id: ConflictId,
        actor: ParticipantId,
        request: DifficultyRequest,
    ) -> Result<DifficultyReport>;

    async fn reveal_zone(
        &self,
        id: ConflictId,
        participant: ParticipantId,
        zone: ZoneRef,
    ) -> Result<bool>;

    async fn reveal_connection(
        &self,
        id: ConflictId,
        participant: ParticipantId,
        from: ZoneRef,
        to: ZoneRef,
    ) -> Result<bool>;

    /// Set a zone's default disposition, or one observer's override
    async fn set_disposition(
        &self,
        id: ConflictId,
        zone: ZoneRef,
        level: Disposition,
        observer: Option<ParticipantId>,
    ) -> Result<()>;

    async fn clear_disposition_override(
        &self,
        id: ConflictId,
        zone: ZoneRef,
        observer: ParticipantId,
    ) -> Result<()>;

    async fn get_disposition(
        &self,
        id: ConflictId,
        zone: ZoneRef,
        observer: ParticipantId,
    ) -> Result<Disposition>;

    async fn set_desire(
        &self,
        id: ConflictId,
        zone: ZoneRef,
        text: String,
        resistance: Option<u32>,
    ) -> Result<()>;

    async fn desire_for(
        &self,
        id: ConflictId,
        zone: ZoneRef,
        observer: ParticipantId,
    ) -> Result<Option<String>>;

    async fn set_zone_control(
        &self,
        id: ConflictId,
        zone: ZoneRef,
        controller: Option<ParticipantId>,
    ) -> Result<()>;

    async fn begin_turns(&self, id: ConflictId, first: ParticipantId) -> Result<()>;

    async fn next_turn(&self, id: ConflictId) -> Result<ParticipantId>;

    async fn keep_initiative(
        &self,
        id: ConflictId,
        participant: ParticipantId,
        offered_momentum: u32,
        hand_off: Option<ParticipantId>,
    ) -> Result<InitiativeGrant>;
}

#[derive(Clone)]
pub struct TacticalServiceImpl {
    store: ConflictStore,
    catalog: Arc<dyn AssetCatalogPort>,
}

impl TacticalServiceImpl {
    pub fn new(store: ConflictStore, catalog: Arc<dyn AssetCatalogPort>) -> Self {
        Self { store, catalog }
    }
}

#[async_trait]
impl TacticalService for TacticalServiceImpl {
    #[instrument(skip(self, spec))]
    async fn add_zone(&self, id: ConflictId, spec: ZoneSpec) -> Result<ZoneId> {
        let zone = spec.into_zone();
        let name = zone.name.clone();
        let zone_id = self
            .store
            .mutate(id, |aggregate, _| aggregate.add_zone(zone))
            .await?;
        info!(conflict_id = %id, zone_id = %zone_id, "Added zone: {}", name);
        Ok(zone_id)
    }

    #[instrument(skip(self))]
    async fn connect(
        &self,
        id: ConflictId,
        actor: ParticipantId,
        a: ZoneRef,
        b: ZoneRef,
        kind: String,
        hidden: bool,
    ) -> Result<()> {
        self.store
            .mutate(id, |aggregate, _| {
                let a = aggregate.resolve_zone(actor, &a)?;
                let b = aggregate.resolve_zone(actor, &b)?;
                aggregate.connect(a, b, kind, hidden)
            })
            .await
    }

    #[instrument(skip(self))]
    async fn adjacent(
        &self,
        id: ConflictId,
        observer: ParticipantId,
        zone: ZoneRef,
    ) -> Result<Vec<ZoneId>> {
        self.store
            .read(id, |aggregate| {
                let zone = aggregate.resolve_zone(observer, &zone)?;
                aggregate.adjacent(zone, observer)
            })
            .await
    }

    #[instrument(skip(self))]
    async fn add_catalog_asset(
        &self,
        id: ConflictId,
        owner: ParticipantId,
        catalog_name: String,
        zone: ZoneRef,
    ) -> Result<Asset> {
        let entry = self
            .catalog
            .lookup(&catalog_name)
            .await
            .context("Failed to look up asset catalog")?
            .ok_or_else(|| ConflictError::UnknownCatalogEntry(catalog_name.clone()))?;

        let asset = self
            .store
            .mutate(id, |aggregate, _| {
                let zone = aggregate.resolve_zone(owner, &zone)?;
                let asset = Asset::new(entry.name.clone(), owner, zone, entry.asset_type, entry.quality)
                    .with_keywords(entry.keywords)
                    .with_origin(AssetOrigin::Tangible {
                        catalog_name: entry.name,
                    })
                    .with_description(entry.description);
                aggregate.place_asset(asset.clone())?;
                Ok(asset)
            })
            .await?;
        info!(conflict_id = %id, asset_id = %asset.id, "Placed {} from the catalog", asset.name);
        Ok(asset)
    }

    #[instrument(skip(self, asset), fields(asset_name = %asset.name))]
    async fn add_intangible_asset(
        &self,
        id: ConflictId,
        owner: ParticipantId,
        asset: NewAsset,
    ) -> Result<Asset> {
        let asset = self
            .store
            .mutate(id, |aggregate, _| {
                let zone = aggregate.resolve_zone(owner, &asset.zone)?;
                let asset = asset.into_asset(owner, zone);
                aggregate.place_asset(asset.clone())?;
                Ok(asset)
            })
            .await?;
        info!(conflict_id = %id, asset_id = %asset.id, "Created asset {}", asset.name);
        Ok(asset)
    }

    #[instrument(skip(self))]
    async fn move_asset(
        &self,
        id: ConflictId,
        mover: ParticipantId,
        asset: AssetId,
        request: MoveAssetRequest,
    ) -> Result<MoveOutcome> {
        let outcome = self
            .store
            .mutate(id, |aggregate, _| {
                let to = aggregate.resolve_zone(mover, &request.to)?;
                let then = request
                    .then
                    .as_ref()
                    .map(|z| aggregate.resolve_zone(mover, z))
                    .transpose()?;
                aggregate.move_asset(asset, mover, to, request.manner, then)
            })
            .await?;
        debug!(conflict_id = %id, "{}", outcome.message);
        Ok(outcome)
    }

    #[instrument(skip(self))]
    async fn aim(
        &self,
        id: ConflictId,
        mover: ParticipantId,
        asset: AssetId,
        zone: ZoneRef,
    ) -> Result<MoveOutcome> {
        self.store
            .mutate(id, |aggregate, _| {
                let zone = aggregate.resolve_zone(mover, &zone)?;
                aggregate.aim(asset, mover, zone)
            })
            .await
    }

    #[instrument(skip(self))]
    async fn move_participant(
        &self,
        id: ConflictId,
        participant: ParticipantId,
        zone: ZoneRef,
    ) -> Result<RelocationOutcome> {
        self.store
            .mutate(id, |aggregate, _| {
                let zone = aggregate.resolve_zone(participant, &zone)?;
                aggregate.move_participant(participant, zone)
            })
            .await
    }

    #[instrument(skip(self))]
    async fn defeat_asset(&self, id: ConflictId, asset: AssetId) -> Result<Asset> {
        let asset = self
            .store
            .mutate(id, |aggregate, _| aggregate.defeat_asset(asset))
            .await?;
        info!(conflict_id = %id, asset_id = %asset.id, "Asset defeated: {}", asset.name);
        Ok(asset)
    }

    #[instrument(skip(self))]
    async fn destroy_asset(&self, id: ConflictId, asset: AssetId) -> Result<Asset> {
        self.store
            .mutate(id, |aggregate, _| aggregate.destroy_asset(asset))
            .await
    }

    #[instrument(skip(self))]
    async fn expose_asset(&self, id: ConflictId, asset: AssetId) -> Result<Asset> {
        self.store
            .mutate(id, |aggregate, _| aggregate.expose_asset(asset))
            .await
    }

    #[instrument(skip(self))]
    async fn rally_asset(
        &self,
        id: ConflictId,
        owner: ParticipantId,
        asset: AssetId,
        zone: Option<ZoneRef>,
    ) -> Result<Asset> {
        let asset = self
            .store
            .mutate(id, |aggregate, _| {
                let zone = zone
                    .as_ref()
                    .map(|z| aggregate.resolve_zone(owner, z))
                    .transpose()?;
                aggregate.rally_asset(asset, owner, zone)
            })
            .await?;
        info!(conflict_id = %id, asset_id = %asset.id, quality = %asset.quality, "Asset rallied");
        Ok(asset)
    }

    #[instrument(skip(self))]
    async fn difficulty(
        &self,
        id: ConflictId,
        actor: ParticipantId,
        request: DifficultyRequest,
    ) -> Result<DifficultyReport> {
        let report = self
            .store
            .read(id, |aggregate| match &request {
                DifficultyRequest::Duel { weapon, slot } => {
                    aggregate.duel_attack_difficulty(actor, *weapon, *slot)
                }
                DifficultyRequest::Skirmish { weapon, defender } => {
                    aggregate.skirmish_attack_difficulty(actor, *weapon, *defender)
                }
                DifficultyRequest::Espionage { zone } => {
                    let zone = aggregate.resolve_zone(actor, zone)?;
                    aggregate.espionage_gather_difficulty(actor, zone)
                }
                DifficultyRequest::Intrigue { zone } => {
                    let zone = aggregate.resolve_zone(actor, zone)?;
                    aggregate.intrigue_influence_difficulty(actor, zone)
                }
                DifficultyRequest::Warfare { asset, target } => {
                    let target = aggregate.resolve_zone(actor, target)?;
                    aggregate.warfare_attack_difficulty(actor, *asset, target)
                }
            })
            .await?;
        debug!(conflict_id = %id, difficulty = report.difficulty, "Computed difficulty");
        Ok(report)
    }

    #[instrument(skip(self))]
    async fn reveal_zone(
        &self,
        id: ConflictId,
        participant: ParticipantId,
        zone: ZoneRef,
    ) -> Result<bool> {
        self.store
            .mutate(id, |aggregate, _| {
                let zone = aggregate.resolve_zone(participant, &zone)?;
                aggregate.reveal_zone(zone, participant)
            })
            .await
    }

    #[instrument(skip(self))]
    async fn reveal_connection(
        &self,
        id: ConflictId,
        participant: ParticipantId,
        from: ZoneRef,
        to: ZoneRef,
    ) -> Result<bool> {
        self.store
            .mutate(id, |aggregate, _| {
                let from = aggregate.resolve_zone(participant, &from)?;
                let to = aggregate.resolve_zone(participant, &to)?;
                aggregate.reveal_connection(from, to, participant)
            })
            .await
    }

    #[instrument(skip(self))]
    async fn set_disposition(
        &self,
        id: ConflictId,
        zone: ZoneRef,
        level: Disposition,
        observer: Option<ParticipantId>,
    ) -> Result<()> {
        self.store
            .mutate(id, |aggregate, _| {
                let zone = aggregate.resolve_shared_zone(&zone)?;
                match observer {
                    Some(observer) => aggregate.set_disposition_override(zone, observer, level),
                    None => aggregate.set_disposition(zone, level),
                }
            })
            .await
    }

    #[instrument(skip(self))]
    async fn clear_disposition_override(
        &self,
        id: ConflictId,
        zone: ZoneRef,
        observer: ParticipantId,
    ) -> Result<()> {
        self.store
            .mutate(id, |aggregate, _| {
                let zone = aggregate.resolve_zone(observer, &zone)?;
                aggregate.clear_disposition_override(zone, observer)
            })
            .await
    }

    #[instrument(skip(self))]
    async fn get_disposition(
        &self,
        id: ConflictId,
        zone: ZoneRef,
        observer: ParticipantId,
    ) -> Result<Disposition> {
        self.store
            .read(id, |aggregate| {
                let zone = aggregate.resolve_zone(observer, &zone)?;
                aggregate.get_disposition(zone, observer)
            })
            .await
    }

    #[instrument(skip(self, text))]
    async fn set_desire(
        &self,
        id: ConflictId,
        zone: ZoneRef,
        text: String,
        resistance: Option<u32>,
    ) -> Result<()> {
        let resistance = resistance.unwrap_or(DEFAULT_DESIRE_RESISTANCE);
        self.store
            .mutate(id, |aggregate, _| {
                let zone = aggregate.resolve_shared_zone(&zone)?;
                aggregate.set_desire(zone, text, resistance)
            })
            .await
    }

    #[instrument(skip(self))]
    async fn desire_for(
        &self,
        id: ConflictId,
        zone: ZoneRef,
        observer: ParticipantId,
    ) -> Result<Option<String>> {
        self.store
            .read(id, |aggregate| {
                let zone = aggregate.resolve_zone(observer, &zone)?;
                aggregate.desire_for(zone, observer)
            })
            .await
    }

    #[instrument(skip(self))]
    async fn set_zone_control(
        &self,
        id: ConflictId,
        zone: ZoneRef,
        controller: Option<ParticipantId>,
    ) -> Result<()> {
        self.store
            .mutate(id, |aggregate, _| {
                let zone = aggregate.resolve_shared_zone(&zone)?;
                aggregate.set_zone_control(zone, controller)
            })
            .await?;
        info!(conflict_id = %id, controller = ?controller, "Zone control changed");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn begin_turns(&self, id: ConflictId, first: ParticipantId) -> Result<()> {
        self.store
            .mutate(id, |aggregate, _| aggregate.begin_turns(first))
            .await?;
        info!(conflict_id = %id, first = %first, "Turn order started");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn next_turn(&self, id: ConflictId) -> Result<ParticipantId> {
        let next = self
            .store
            .mutate(id, |aggregate, _| aggregate.next_turn())
            .await?;
        debug!(conflict_id = %id, active = %next, "Turn passed");
        Ok(next)
    }

    #[instrument(skip(self))]
    async fn keep_initiative(
        &self,
        id: ConflictId,
        participant: ParticipantId,
        offered_momentum: u32,
        hand_off: Option<ParticipantId>,
    ) -> Result<InitiativeGrant> {
        let grant = self
            .store
            .mutate(id, |aggregate, _| {
                aggregate.keep_initiative(participant, offered_momentum, hand_off)
            })
            .await?;
        info!(
            conflict_id = %id,
            holder = %grant.holder,
            next_actor = %grant.next_actor,
            momentum_cost = grant.momentum_cost,
            "Initiative kept"
        );
        Ok(grant)
    }
}
