//! Conflict Service - Lifecycle of conflicts at a location
//!
//! Creating, joining, leaving and ending conflicts, plus objectives and the
//! per-location lookups the command layer uses to find "the duel here".

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::application::dto::{ConflictSummary, ConflictView};
use crate::application::ports::outbound::AuthorityPort;
use crate::application::services::conflict_store::ConflictStore;
use crate::domain::aggregates::TaskEffect;
use crate::domain::entities::{Asset, Objective};
use crate::domain::errors::ConflictError;
use crate::domain::value_objects::{
    ConflictId, ConflictVariant, LocationId, ParticipantId, RevealPolicy,
};

/// Options for opening a conflict
#[derive(Debug, Clone)]
pub struct CreateConflictRequest {
    pub variant: ConflictVariant,
    pub location: LocationId,
    pub initiator: ParticipantId,
    pub initiator_name: String,
    pub name: Option<String>,
    /// Defaults to the configured policy
    pub reveal_policy: Option<RevealPolicy>,
}

/// Conflict lifecycle use cases
#[async_trait]
pub trait ConflictService: Send + Sync {
    /// Open a conflict at a location; the initiator joins it immediately
    async fn create_conflict(&self, request: CreateConflictRequest) -> Result<ConflictView>;

    async fn join(
        &self,
        id: ConflictId,
        participant: ParticipantId,
        name: String,
    ) -> Result<ConflictView>;

    /// Leave a conflict, taking one's assets along
    async fn leave(&self, id: ConflictId, participant: ParticipantId) -> Result<Vec<Asset>>;

    async fn set_objective(
        &self,
        id: ConflictId,
        participant: ParticipantId,
        objective: Objective,
    ) -> Result<()>;

    async fn declare_winner(&self, id: ConflictId, participant: ParticipantId) -> Result<()>;

    async fn mark_defeated(
        &self,
        id: ConflictId,
        participant: ParticipantId,
    ) -> Result<Vec<TaskEffect>>;

    /// End a conflict; participants and administrators only
    async fn end(&self, id: ConflictId, caller: ParticipantId) -> Result<Vec<Asset>>;

    async fn get(&self, id: ConflictId, observer: ParticipantId) -> Result<ConflictView>;

    async fn find_at(
        &self,
        location: LocationId,
        variant: ConflictVariant,
    ) -> Result<Option<ConflictSummary>>;

    async fn list_at(&self, location: LocationId) -> Result<Vec<ConflictSummary>>;

    async fn list(&self) -> Result<Vec<ConflictSummary>>;
}

#[derive(Clone)]
pub struct ConflictServiceImpl {
    store: ConflictStore,
    authority: Arc<dyn AuthorityPort>,
    default_reveal_policy: RevealPolicy,
}

impl ConflictServiceImpl {
    pub fn new(
        store: ConflictStore,
        authority: Arc<dyn AuthorityPort>,
        default_reveal_policy: RevealPolicy,
    ) -> Self {
        Self {
            store,
            authority,
            default_reveal_policy,
        }
    }

    /// Consult the authority before letting someone into a conflict
    async fn authorize(&self, participant: ParticipantId, variant: ConflictVariant) -> Result<()> {
        let authorization = self
            .authority
            .can_participate(participant, variant)
            .await
            .context("Failed to consult participation authority")?;
        if !authorization.allowed {
            let reason = authorization
                .reason
                .unwrap_or_else(|| format!("not permitted to take part in a {}", variant));
            warn!(participant = %participant, %variant, %reason, "Participation refused");
            return Err(ConflictError::InsufficientAccess(reason).into());
        }
        Ok(())
    }
}

#[async_trait]
impl ConflictService for ConflictServiceImpl {
    #[instrument(skip(self, request), fields(variant = %request.variant, location = %request.location))]
    async fn create_conflict(&self, request: CreateConflictRequest) -> Result<ConflictView> {
        self.authorize(request.initiator, request.variant).await?;
        let policy = request.reveal_policy.unwrap_or(self.default_reveal_policy);

        let view = self
            .store
            .mutate_registry(|registry, now| {
                let aggregate =
                    registry.create(request.variant, request.location, policy, now)?;
                if let Some(name) = request.name {
                    aggregate.rename(name);
                }
                aggregate.join(request.initiator, request.initiator_name, now)?;
                Ok((
                    ConflictView::for_observer(aggregate, request.initiator),
                    aggregate.clone(),
                ))
            })
            .await?;

        info!(conflict_id = %view.summary.id, "Created conflict: {}", view.summary.name);
        Ok(view)
    }

    #[instrument(skip(self, name))]
    async fn join(
        &self,
        id: ConflictId,
        participant: ParticipantId,
        name: String,
    ) -> Result<ConflictView> {
        let variant = self.store.read(id, |c| Ok(c.variant())).await?;
        self.authorize(participant, variant).await?;

        let view = self
            .store
            .mutate(id, |aggregate, now| {
                aggregate.join(participant, name, now)?;
                Ok(ConflictView::for_observer(aggregate, participant))
            })
            .await?;
        info!(conflict_id = %id, participant = %participant, "Participant joined");
        Ok(view)
    }

    #[instrument(skip(self))]
    async fn leave(&self, id: ConflictId, participant: ParticipantId) -> Result<Vec<Asset>> {
        let removed = self
            .store
            .mutate(id, |aggregate, _| aggregate.leave(participant))
            .await?;
        info!(conflict_id = %id, participant = %participant, assets = removed.len(), "Participant left");
        Ok(removed)
    }

    #[instrument(skip(self, objective))]
    async fn set_objective(
        &self,
        id: ConflictId,
        participant: ParticipantId,
        objective: Objective,
    ) -> Result<()> {
        debug!(conflict_id = %id, "Setting objective: {}", objective.text);
        self.store
            .mutate(id, |aggregate, _| aggregate.set_objective(participant, objective))
            .await
    }

    #[instrument(skip(self))]
    async fn declare_winner(&self, id: ConflictId, participant: ParticipantId) -> Result<()> {
        self.store
            .mutate(id, |aggregate, _| aggregate.declare_winner(participant))
            .await?;
        info!(conflict_id = %id, winner = %participant, "Winner declared");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn mark_defeated(
        &self,
        id: ConflictId,
        participant: ParticipantId,
    ) -> Result<Vec<TaskEffect>> {
        self.store
            .mutate(id, |aggregate, now| aggregate.mark_defeated(participant, now))
            .await
    }

    #[instrument(skip(self))]
    async fn end(&self, id: ConflictId, caller: ParticipantId) -> Result<Vec<Asset>> {
        let admin = self
            .authority
            .is_admin(caller)
            .await
            .context("Failed to check administrator status")?;

        let released = self
            .store
            .mutate_registry(|registry, now| {
                let (aggregate, released) = registry.end(id, caller, admin, now)?;
                Ok((released, aggregate))
            })
            .await?;
        info!(conflict_id = %id, released = released.len(), "Conflict ended");
        Ok(released)
    }

    #[instrument(skip(self))]
    async fn get(&self, id: ConflictId, observer: ParticipantId) -> Result<ConflictView> {
        self.store
            .read(id, |aggregate| Ok(ConflictView::for_observer(aggregate, observer)))
            .await
    }

    #[instrument(skip(self))]
    async fn find_at(
        &self,
        location: LocationId,
        variant: ConflictVariant,
    ) -> Result<Option<ConflictSummary>> {
        Ok(self
            .store
            .read_registry(|registry| registry.find_at(location, variant).map(ConflictSummary::from))
            .await)
    }

    #[instrument(skip(self))]
    async fn list_at(&self, location: LocationId) -> Result<Vec<ConflictSummary>> {
        Ok(self
            .store
            .read_registry(|registry| {
                registry
                    .list_at(location)
                    .into_iter()
                    .map(ConflictSummary::from)
                    .collect()
            })
            .await)
    }

    #[instrument(skip(self))]
    async fn list(&self) -> Result<Vec<ConflictSummary>> {
        let mut all: Vec<ConflictSummary> = self
            .store
            .read_registry(|registry| registry.list().into_iter().map(ConflictSummary::from).collect())
            .await;
        all.sort_by_key(|c| c.created_at);
        Ok(all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::outbound::{
        Authorization, MockAuthorityPort, MockClockPort, MockConflictRepositoryPort,
    };
    use crate::domain::value_objects::ConflictState;
    use chrono::Utc;

    fn store() -> ConflictStore {
        let mut repository = MockConflictRepositoryPort::new();
        repository.expect_save().returning(|_| Ok(()));
        let mut clock = MockClockPort::new();
        clock.expect_now().returning(Utc::now);
        ConflictStore::new(Arc::new(repository), Arc::new(clock))
    }

    /// Only `commander` may join warfare; `admin` is an administrator
    fn authority(commander: ParticipantId, admin: ParticipantId) -> Arc<MockAuthorityPort> {
        let mut authority = MockAuthorityPort::new();
        authority
            .expect_can_participate()
            .returning(move |participant, variant| {
                if variant == ConflictVariant::Warfare && participant != commander {
                    Ok(Authorization::refused("only commanders wage war"))
                } else {
                    Ok(Authorization::granted())
                }
            });
        authority
            .expect_is_admin()
            .returning(move |participant| Ok(participant == admin));
        Arc::new(authority)
    }

    fn service() -> (ConflictServiceImpl, ParticipantId, ParticipantId) {
        let commander = ParticipantId::new();
        let admin = ParticipantId::new();
        let service = ConflictServiceImpl::new(
            store(),
            authority(commander, admin),
            RevealPolicy::PerObserver,
        );
        (service, commander, admin)
    }

    fn request(variant: ConflictVariant, location: LocationId, who: ParticipantId) -> CreateConflictRequest {
        CreateConflictRequest {
            variant,
            location,
            initiator: who,
            initiator_name: "Paul".to_string(),
            name: None,
            reveal_policy: None,
        }
    }

    #[tokio::test]
    async fn test_duplicate_conflict_at_location() {
        let (service, commander, _) = service();
        let arrakeen = LocationId::new();
        let first = service
            .create_conflict(request(ConflictVariant::Duel, arrakeen, commander))
            .await
            .unwrap();
        assert_eq!(first.summary.state, ConflictState::Pending);

        let err = service
            .create_conflict(request(ConflictVariant::Duel, arrakeen, ParticipantId::new()))
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConflictError>(),
            Some(ConflictError::DuplicateActiveConflict { .. })
        ));

        let found = service
            .find_at(arrakeen, ConflictVariant::Duel)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, first.summary.id);
    }

    #[tokio::test]
    async fn test_warfare_requires_authority() {
        let (service, commander, _) = service();
        let view = service
            .create_conflict(request(ConflictVariant::Warfare, LocationId::new(), commander))
            .await
            .unwrap();

        let recruit = ParticipantId::new();
        let err = service
            .join(view.summary.id, recruit, "Recruit".to_string())
            .await
            .unwrap_err();
        assert_eq!(
            err.downcast_ref::<ConflictError>(),
            Some(&ConflictError::InsufficientAccess(
                "only commanders wage war".to_string()
            ))
        );
    }

    #[tokio::test]
    async fn test_duel_activates_with_two_and_is_capped() {
        let (service, paul, _) = service();
        let view = service
            .create_conflict(request(ConflictVariant::Duel, LocationId::new(), paul))
            .await
            .unwrap();
        let id = view.summary.id;

        let jamis = ParticipantId::new();
        let joined = service.join(id, jamis, "Jamis".to_string()).await.unwrap();
        assert_eq!(joined.summary.state, ConflictState::Active);
        assert_eq!(joined.zones.len(), 6);

        let err = service
            .join(id, ParticipantId::new(), "Stilgar".to_string())
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConflictError>(),
            Some(ConflictError::ConflictFull(ConflictVariant::Duel))
        ));
    }

    #[tokio::test]
    async fn test_end_by_admin_and_by_stranger() {
        let (service, paul, admin) = service();
        let location = LocationId::new();
        let view = service
            .create_conflict(request(ConflictVariant::Skirmish, location, paul))
            .await
            .unwrap();
        let id = view.summary.id;

        let stranger = ParticipantId::new();
        let err = service.end(id, stranger).await.unwrap_err();
        assert_eq!(
            err.downcast_ref::<ConflictError>(),
            Some(&ConflictError::NotAuthorized(stranger))
        );

        service.end(id, admin).await.unwrap();
        assert!(service.list_at(location).await.unwrap().is_empty());
        let err = service.get(id, paul).await.unwrap_err();
        assert_eq!(
            err.downcast_ref::<ConflictError>(),
            Some(&ConflictError::UnknownConflict(id))
        );
    }
}
