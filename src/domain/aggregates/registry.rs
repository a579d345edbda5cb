//! Conflict registry - At most one live conflict per variant per location

use chrono::{DateTime, Utc};
use std::collections::HashMap;

use crate::domain::aggregates::conflict_aggregate::ConflictAggregate;
use crate::domain::entities::{Asset, Conflict};
use crate::domain::errors::ConflictError;
use crate::domain::value_objects::{
    ConflictId, ConflictVariant, LocationId, ParticipantId, RevealPolicy,
};

/// Holds every live conflict, indexed by id and by (location, variant)
#[derive(Debug, Default)]
pub struct ConflictRegistry {
    conflicts: HashMap<ConflictId, ConflictAggregate>,
    by_location: HashMap<(LocationId, ConflictVariant), ConflictId>,
}

impl ConflictRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new conflict. Fails if one of this variant is already running here.
    pub fn create(
        &mut self,
        variant: ConflictVariant,
        location: LocationId,
        reveal_policy: RevealPolicy,
        at: DateTime<Utc>,
    ) -> Result<&mut ConflictAggregate, ConflictError> {
        let key = (location, variant);
        if self.by_location.contains_key(&key) {
            return Err(ConflictError::DuplicateActiveConflict { variant, location });
        }
        let conflict = Conflict::new(variant, location, at).with_reveal_policy(reveal_policy);
        self.insert(ConflictAggregate::new(conflict))
    }

    /// Register an existing aggregate, e.g. one loaded from storage
    pub fn insert(
        &mut self,
        aggregate: ConflictAggregate,
    ) -> Result<&mut ConflictAggregate, ConflictError> {
        let id = aggregate.id();
        let key = (aggregate.conflict().location_id, aggregate.variant());
        if aggregate.conflict().is_concluded() {
            return Err(ConflictError::ConflictConcluded(id));
        }
        match self.by_location.get(&key) {
            Some(existing) if *existing != id => {
                return Err(ConflictError::DuplicateActiveConflict {
                    variant: key.1,
                    location: key.0,
                })
            }
            _ => {}
        }
        self.by_location.insert(key, id);
        Ok(self.conflicts.entry(id).or_insert(aggregate))
    }

    pub fn get(&self, id: ConflictId) -> Result<&ConflictAggregate, ConflictError> {
        self.conflicts
            .get(&id)
            .ok_or(ConflictError::UnknownConflict(id))
    }

    pub fn get_mut(&mut self, id: ConflictId) -> Result<&mut ConflictAggregate, ConflictError> {
        self.conflicts
            .get_mut(&id)
            .ok_or(ConflictError::UnknownConflict(id))
    }

    /// The live conflict of a variant at a location
    pub fn find_at(
        &self,
        location: LocationId,
        variant: ConflictVariant,
    ) -> Option<&ConflictAggregate> {
        self.by_location
            .get(&(location, variant))
            .and_then(|id| self.conflicts.get(id))
    }

    /// All live conflicts at a location, in variant order
    pub fn list_at(&self, location: LocationId) -> Vec<&ConflictAggregate> {
        let mut found: Vec<&ConflictAggregate> = self
            .conflicts
            .values()
            .filter(|c| c.conflict().location_id == location)
            .collect();
        found.sort_by_key(|c| c.variant());
        found
    }

    pub fn list(&self) -> Vec<&ConflictAggregate> {
        self.conflicts.values().collect()
    }

    pub fn len(&self) -> usize {
        self.conflicts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conflicts.is_empty()
    }

    /// End a conflict and tear it down, handing back its final state and
    /// the assets it released
    pub fn end(
        &mut self,
        id: ConflictId,
        caller: ParticipantId,
        admin_override: bool,
        at: DateTime<Utc>,
    ) -> Result<(ConflictAggregate, Vec<Asset>), ConflictError> {
        let released = self.get_mut(id)?.end(caller, admin_override, at)?;
        let aggregate = self.remove(id)?;
        Ok((aggregate, released))
    }

    /// Drop a conflict from the registry without ending it, e.g. one that
    /// concluded on its own
    pub fn remove(&mut self, id: ConflictId) -> Result<ConflictAggregate, ConflictError> {
        let aggregate = self
            .conflicts
            .remove(&id)
            .ok_or(ConflictError::UnknownConflict(id))?;
        let key = (aggregate.conflict().location_id, aggregate.variant());
        if self.by_location.get(&key) == Some(&id) {
            self.by_location.remove(&key);
        }
        Ok(aggregate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_live_conflict_per_variant_and_location() {
        let mut registry = ConflictRegistry::new();
        let arrakeen = LocationId::new();
        let id = registry
            .create(ConflictVariant::Duel, arrakeen, RevealPolicy::default(), Utc::now())
            .unwrap()
            .id();

        // pending still blocks a second duel
        assert!(matches!(
            registry.create(ConflictVariant::Duel, arrakeen, RevealPolicy::default(), Utc::now()),
            Err(ConflictError::DuplicateActiveConflict { .. })
        ));
        // other variants are fine
        assert!(registry
            .create(ConflictVariant::Intrigue, arrakeen, RevealPolicy::default(), Utc::now())
            .is_ok());
        assert_eq!(registry.list_at(arrakeen).len(), 2);

        let paul = ParticipantId::new();
        registry.get_mut(id).unwrap().join(paul, "Paul", Utc::now()).unwrap();
        let (ended, _) = registry.end(id, paul, false, Utc::now()).unwrap();
        assert!(ended.conflict().is_concluded());
        assert!(registry.find_at(arrakeen, ConflictVariant::Duel).is_none());
        assert!(registry
            .create(ConflictVariant::Duel, arrakeen, RevealPolicy::default(), Utc::now())
            .is_ok());
    }

    #[test]
    fn test_failed_end_leaves_conflict_registered() {
        let mut registry = ConflictRegistry::new();
        let sietch = LocationId::new();
        let id = registry
            .create(ConflictVariant::Skirmish, sietch, RevealPolicy::default(), Utc::now())
            .unwrap()
            .id();
        assert!(matches!(
            registry.end(id, ParticipantId::new(), false, Utc::now()),
            Err(ConflictError::NotAuthorized(_))
        ));
        assert!(registry.find_at(sietch, ConflictVariant::Skirmish).is_some());
    }

    #[test]
    fn test_unknown_conflict() {
        let registry = ConflictRegistry::new();
        let id = ConflictId::new();
        assert_eq!(registry.get(id).unwrap_err(), ConflictError::UnknownConflict(id));
    }
}
