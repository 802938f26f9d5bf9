//! Deletion pre-checks
//!
//! Gather the facts (descendants, referencing areas, assignments) from the
//! store and the data source, then hand them to the domain verdicts.

use tracing::debug;

use crate::domain::ports::{CoverageAreaFilter, LocationDataSource, SourceError};
use crate::domain::services::{CoverageAreaDeletionCheck, LocationDeletionCheck};
use crate::domain::value_objects::{CoverageAreaId, LocationId};
use crate::error::{LocusError, LocusResult};

use super::engine::LocationEngine;

impl<S> LocationEngine<S>
where
    S: LocationDataSource + ?Sized + 'static,
{
    /// Whether `id` may be deleted
    ///
    /// Children that were never fetched are fetched first, so an unexpanded
    /// node with hidden children is still reported as blocked.
    pub async fn can_delete_location(&self, id: &LocationId) -> LocusResult<LocationDeletionCheck> {
        self.load_children(id).await?;
        let descendants = self.lock().store.descendants(id);

        let areas = self
            .source
            .list_coverage_areas(&CoverageAreaFilter::referencing(id.clone()))
            .await
            .map_err(|e| LocusError::fetch_failed("listing coverage areas", e))?;

        let check = LocationDeletionCheck::evaluate(id.clone(), descendants, &areas);
        debug!(location = %id, ok = check.ok, reason = ?check.reason, "location deletion check");
        Ok(check)
    }

    /// Whether the coverage area may be deleted without stranding active users
    pub async fn can_delete_coverage_area(
        &self,
        id: &CoverageAreaId,
    ) -> LocusResult<CoverageAreaDeletionCheck> {
        let assignments = self
            .source
            .get_coverage_area_users(id)
            .await
            .map_err(|e| match e {
                SourceError::NotFound(_) => LocusError::coverage_area_not_found(id),
                other => LocusError::fetch_failed("listing coverage area users", other),
            })?;

        let check = CoverageAreaDeletionCheck::evaluate(id.clone(), &assignments);
        debug!(
            coverage_area = %id,
            active = check.active_assignment_count,
            total = check.total_assignment_count,
            "coverage area deletion check"
        );
        Ok(check)
    }
}
