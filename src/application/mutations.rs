//! Writes through the data source
//!
//! Each mutation validates against the loaded slice first, then calls the
//! source and merges the authoritative response. When the source rejects a
//! write the affected part of the local state is refetched before the error
//! is returned, so nothing optimistic lingers.

use std::collections::BTreeSet;

use tracing::{info, warn};

use crate::domain::entities::{
    CoverageArea, CoverageAreaPatch, LocationNode, LocationPatch, NewCoverageArea, NewLocation,
};
use crate::domain::policies::{check_node_parent, check_parent};
use crate::domain::ports::{LocationDataSource, LocationFilter, SourceError};
use crate::domain::services::CoverageAreaDeletionCheck;
use crate::domain::value_objects::{CoverageAreaId, LocationId};
use crate::error::{LocusError, LocusResult};

use super::engine::{EngineState, LocationEngine};
use super::expansion::adopt_children;

/// How hard to push a coverage-area delete
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeleteConfirmation {
    /// Refuse while active users are assigned
    #[default]
    Normal,
    /// Delete anyway; the caller has shown the user the assignment count
    Force,
}

impl<S> LocationEngine<S>
where
    S: LocationDataSource + ?Sized + 'static,
{
    pub async fn create_location(&self, draft: NewLocation) -> LocusResult<LocationNode> {
        {
            let state = self.lock();
            let parent = match &draft.parent_id {
                Some(parent_id) => Some(state.store.require(parent_id)?),
                None => None,
            };
            check_parent(&draft.name, draft.location_type, parent)?;
        }

        let created = self
            .source
            .create_location(&draft)
            .await
            .map_err(|e| LocusError::fetch_failed("creating location", e))?;

        let mut state = self.lock();
        state.store.merge([created.clone()])?;
        if let Some(parent) = &created.parent_id {
            state.expansion.entry(parent.clone()).or_default().has_children = Some(true);
        }
        info!(location = %created.id, name = %created.name, "location created");
        Ok(created)
    }

    /// Update fields of a location
    ///
    /// Parent or type changes are checked against the parent-type rules
    /// and must not move a node under its own subtree.
    pub async fn update_location(
        &self,
        id: &LocationId,
        patch: LocationPatch,
    ) -> LocusResult<LocationNode> {
        {
            let state = self.lock();
            let current = state.store.require(id)?;
            if patch.touches_hierarchy() {
                validate_hierarchy_change(&state, current, &patch)?;
            }
        }

        let updated = match self.source.update_location(id, &patch).await {
            Ok(node) => node,
            Err(err) => {
                self.resync_location(id).await;
                return Err(source_failure("updating location", Record::Location(id), err));
            }
        };

        let mut state = self.lock();
        state.store.merge([updated.clone()])?;
        info!(location = %id, "location updated");
        Ok(updated)
    }

    pub async fn reparent_location(
        &self,
        id: &LocationId,
        new_parent: Option<LocationId>,
    ) -> LocusResult<LocationNode> {
        self.update_location(id, LocationPatch::reparent(new_parent))
            .await
    }

    /// Delete a location after the integrity check passes
    pub async fn delete_location(&self, id: &LocationId) -> LocusResult<()> {
        self.can_delete_location(id).await?.into_result()?;

        if let Err(err) = self.source.delete_location(id).await {
            self.resync_location(id).await;
            return Err(source_failure("deleting location", Record::Location(id), err));
        }

        let mut state = self.lock();
        let parent = state.store.remove(id).and_then(|node| node.parent_id);
        if let Some(parent) = parent {
            let remaining = state.store.child_count(&parent);
            let entry = state.expansion.entry(parent).or_default();
            if entry.children_loaded {
                entry.has_children = Some(remaining > 0);
            }
        }
        state.prune();
        info!(location = %id, "location deleted");
        Ok(())
    }

    pub async fn create_coverage_area(&self, draft: NewCoverageArea) -> LocusResult<CoverageArea> {
        self.validate_units(&draft.name, draft.is_active, &draft.geographic_unit_ids)?;

        let created = self
            .source
            .create_coverage_area(&draft)
            .await
            .map_err(|e| LocusError::fetch_failed("creating coverage area", e));
        self.lock().catalog.invalidate();
        let created = created?;

        info!(coverage_area = %created.id, units = created.unit_count(), "coverage area created");
        Ok(created)
    }

    pub async fn update_coverage_area(
        &self,
        id: &CoverageAreaId,
        patch: CoverageAreaPatch,
    ) -> LocusResult<CoverageArea> {
        let cached = self.lock().catalog.get(id).cloned();
        if let Some(mut preview) = cached {
            patch.apply_to(&mut preview, chrono::Utc::now());
            self.validate_units(&preview.name, preview.is_active, &preview.geographic_unit_ids)?;
        } else if let Some(units) = &patch.geographic_unit_ids {
            let name = patch.name.as_deref().unwrap_or(id.as_str());
            self.validate_units(name, patch.is_active.unwrap_or(true), units)?;
        }

        let result = self.source.update_coverage_area(id, &patch).await;
        self.lock().catalog.invalidate();
        let updated = result.map_err(|e| {
            source_failure("updating coverage area", Record::CoverageArea(id), e)
        })?;

        info!(coverage_area = %id, "coverage area updated");
        Ok(updated)
    }

    /// Delete a coverage area
    ///
    /// With active assignments the delete is refused unless `Force` is
    /// passed. The returned check carries the assignment count either way.
    pub async fn delete_coverage_area(
        &self,
        id: &CoverageAreaId,
        confirmation: DeleteConfirmation,
    ) -> LocusResult<CoverageAreaDeletionCheck> {
        let check = self.can_delete_coverage_area(id).await?;
        if !check.ok {
            if confirmation == DeleteConfirmation::Normal {
                check.clone().into_result()?;
            }
            warn!(
                coverage_area = %id,
                active = check.active_assignment_count,
                "force-deleting coverage area with active assignments"
            );
        }

        let result = self.source.delete_coverage_area(id).await;
        {
            let mut state = self.lock();
            state.catalog.invalidate();
            if result.is_ok() {
                state.adopted.remove(id);
            }
        }
        result.map_err(|e| {
            source_failure("deleting coverage area", Record::CoverageArea(id), e)
        })?;

        info!(coverage_area = %id, "coverage area deleted");
        Ok(check)
    }

    fn validate_units(
        &self,
        name: &str,
        is_active: bool,
        units: &BTreeSet<LocationId>,
    ) -> LocusResult<()> {
        if is_active && units.is_empty() {
            return Err(LocusError::EmptyCoverageArea {
                name: name.to_string(),
            });
        }
        let state = self.lock();
        let inactive: Vec<LocationId> = units
            .iter()
            .filter(|id| state.store.get(id).is_some_and(|n| !n.is_active))
            .cloned()
            .collect();
        if !inactive.is_empty() {
            return Err(LocusError::InactiveLocation { ids: inactive });
        }
        Ok(())
    }

    /// Refetch the sibling list around `id` after a rejected write
    async fn resync_location(&self, id: &LocationId) {
        let (parent, location_type) = {
            let state = self.lock();
            match state.store.get(id) {
                Some(node) => (node.parent_id.clone(), node.location_type),
                None => return,
            }
        };

        let fetched = match &parent {
            Some(parent) => self
                .source
                .get_children(parent)
                .await
                .map(|children| adopt_children(parent, children)),
            None => {
                let filter = LocationFilter {
                    location_type: Some(location_type),
                    ..LocationFilter::default()
                };
                self.source.list_locations(&filter).await
            }
        };

        let siblings = match fetched {
            Ok(siblings) => siblings,
            Err(err) => {
                warn!(location = %id, error = %err, "resync after failed write also failed");
                return;
            }
        };

        let mut state = self.lock();
        let still_present = siblings.iter().any(|n| &n.id == id);
        if let Err(err) = state.store.merge(siblings) {
            warn!(location = %id, error = %err, "resync returned inconsistent hierarchy");
        }
        if !still_present {
            state.store.remove(id);
            state.prune();
        }
    }
}

fn validate_hierarchy_change(
    state: &EngineState,
    current: &LocationNode,
    patch: &LocationPatch,
) -> LocusResult<()> {
    let mut preview = current.clone();
    patch.apply_to(&mut preview);

    let parent = match &preview.parent_id {
        Some(parent_id) => {
            if parent_id == &current.id || state.store.is_descendant(parent_id, &current.id) {
                let mut below: Vec<LocationId> = state
                    .store
                    .ancestors(parent_id)
                    .into_iter()
                    .take_while(|a| a != &current.id)
                    .collect();
                below.reverse();

                let mut ids = vec![current.id.clone()];
                ids.extend(below);
                if parent_id != &current.id {
                    ids.push(parent_id.clone());
                }
                ids.push(current.id.clone());
                return Err(LocusError::CycleDetected { ids });
            }
            Some(state.store.require(parent_id)?)
        }
        None => None,
    };
    check_node_parent(&preview, parent)?;

    for child in state.store.children_of(&current.id) {
        if let Some(child) = state.store.get(child) {
            check_node_parent(child, Some(&preview))?;
        }
    }
    Ok(())
}

enum Record<'a> {
    Location(&'a LocationId),
    CoverageArea(&'a CoverageAreaId),
}

fn source_failure(operation: &str, record: Record<'_>, err: SourceError) -> LocusError {
    match (err, record) {
        (SourceError::NotFound(_), Record::Location(id)) => LocusError::location_not_found(id),
        (SourceError::NotFound(_), Record::CoverageArea(id)) => {
            LocusError::coverage_area_not_found(id)
        }
        (other, _) => LocusError::fetch_failed(operation, other),
    }
}
