//! Referential-integrity evaluation
//!
//! Pure verdicts over already-gathered facts. The engine collects
//! descendants, referencing areas and assignments; these types decide and
//! describe whether a delete may go ahead.

use crate::domain::entities::{CoverageArea, UserCoverageAssignment};
use crate::domain::value_objects::{CoverageAreaId, LocationId};
use crate::error::{DeletionTarget, LocusError, LocusResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationDeletionCheck {
    pub location_id: LocationId,
    pub ok: bool,
    pub reason: Option<String>,
    pub blocking_descendants: Vec<LocationId>,
    pub referencing_areas: Vec<CoverageAreaId>,
}

impl LocationDeletionCheck {
    /// Only active coverage areas that list `location_id` count as references
    pub fn evaluate<'a>(
        location_id: LocationId,
        descendants: Vec<LocationId>,
        areas: impl IntoIterator<Item = &'a CoverageArea>,
    ) -> Self {
        let referencing_areas: Vec<CoverageAreaId> = areas
            .into_iter()
            .filter(|a| a.is_active && a.covers(&location_id))
            .map(|a| a.id.clone())
            .collect();

        let mut reasons = Vec::new();
        if !descendants.is_empty() {
            reasons.push(format!(
                "has {}",
                plural(descendants.len(), "child location", "child locations")
            ));
        }
        if !referencing_areas.is_empty() {
            reasons.push(format!(
                "is referenced by {}",
                plural(
                    referencing_areas.len(),
                    "active coverage area",
                    "active coverage areas"
                )
            ));
        }

        let ok = reasons.is_empty();
        let reason = (!ok).then(|| reasons.join(" and "));

        Self {
            location_id,
            ok,
            reason,
            blocking_descendants: descendants,
            referencing_areas,
        }
    }

    pub fn into_result(self) -> LocusResult<()> {
        if self.ok {
            return Ok(());
        }
        let blocking_ids = self
            .blocking_descendants
            .iter()
            .map(ToString::to_string)
            .chain(self.referencing_areas.iter().map(ToString::to_string))
            .collect();
        Err(LocusError::IntegrityViolation {
            target: DeletionTarget::Location(self.location_id),
            reason: self.reason.unwrap_or_default(),
            blocking_ids,
            active_assignments: 0,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverageAreaDeletionCheck {
    pub coverage_area_id: CoverageAreaId,
    pub ok: bool,
    pub reason: Option<String>,
    pub active_assignment_count: usize,
    pub total_assignment_count: usize,
}

impl CoverageAreaDeletionCheck {
    pub fn evaluate(coverage_area_id: CoverageAreaId, assignments: &[UserCoverageAssignment]) -> Self {
        let relevant: Vec<_> = assignments
            .iter()
            .filter(|a| a.coverage_area_id == coverage_area_id)
            .collect();
        let active = relevant.iter().filter(|a| a.is_active).count();

        Self {
            coverage_area_id,
            ok: active == 0,
            reason: (active > 0)
                .then(|| plural(active, "active user assignment", "active user assignments")),
            active_assignment_count: active,
            total_assignment_count: relevant.len(),
        }
    }

    pub fn into_result(self) -> LocusResult<()> {
        if self.ok {
            return Ok(());
        }
        Err(LocusError::IntegrityViolation {
            target: DeletionTarget::CoverageArea(self.coverage_area_id),
            reason: self.reason.unwrap_or_default(),
            blocking_ids: Vec::new(),
            active_assignments: self.active_assignment_count,
        })
    }
}

fn plural(count: usize, one: &str, many: &str) -> String {
    if count == 1 {
        format!("1 {}", one)
    } else {
        format!("{} {}", count, many)
    }
}
