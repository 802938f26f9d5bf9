//! Coverage-area matching for the current selection
//!
//! Candidate areas are fetched once per session and indexed by unit id. A
//! query only inspects areas that list the rarest selected unit, which is
//! every area that could possibly contain the whole selection.

use std::collections::{BTreeSet, HashMap};

use serde::Serialize;
use tracing::{debug, info};

use crate::domain::entities::CoverageArea;
use crate::domain::ports::{CoverageAreaFilter, LocationDataSource};
use crate::domain::services::{find_all_containing, find_containing};
use crate::domain::value_objects::{CoverageAreaId, LocationId};
use crate::error::{LocusError, LocusResult};

use super::engine::LocationEngine;

/// Session cache of candidate coverage areas
#[derive(Debug, Default)]
pub struct CoverageCatalog {
    areas: Vec<CoverageArea>,
    by_unit: HashMap<LocationId, Vec<usize>>,
    loaded: bool,
}

impl CoverageCatalog {
    pub fn from_areas(areas: Vec<CoverageArea>) -> Self {
        let mut catalog = Self::default();
        catalog.replace(areas);
        catalog
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn len(&self) -> usize {
        self.areas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.areas.is_empty()
    }

    pub fn areas(&self) -> &[CoverageArea] {
        &self.areas
    }

    pub fn get(&self, id: &CoverageAreaId) -> Option<&CoverageArea> {
        self.areas.iter().find(|a| &a.id == id)
    }

    pub fn replace(&mut self, areas: Vec<CoverageArea>) {
        self.by_unit.clear();
        for (index, area) in areas.iter().enumerate() {
            for unit in &area.geographic_unit_ids {
                self.by_unit.entry(unit.clone()).or_default().push(index);
            }
        }
        self.areas = areas;
        self.loaded = true;
    }

    /// Forget everything; the next query refetches
    pub fn invalidate(&mut self) {
        self.areas.clear();
        self.by_unit.clear();
        self.loaded = false;
    }

    /// Areas that could contain every id in `selected`
    pub fn candidates_for(&self, selected: &BTreeSet<LocationId>) -> Vec<&CoverageArea> {
        let mut narrowest: Option<&Vec<usize>> = None;
        for id in selected {
            match self.by_unit.get(id) {
                None => return Vec::new(),
                Some(postings) if narrowest.map_or(true, |n| postings.len() < n.len()) => {
                    narrowest = Some(postings);
                }
                Some(_) => {}
            }
        }
        narrowest
            .map(|postings| postings.iter().map(|&i| &self.areas[i]).collect())
            .unwrap_or_default()
    }

    pub fn find_containing(&self, selected: &BTreeSet<LocationId>) -> Option<&CoverageArea> {
        find_containing(selected, self.candidates_for(selected))
    }

    pub fn find_all_containing(&self, selected: &BTreeSet<LocationId>) -> Vec<&CoverageArea> {
        find_all_containing(selected, self.candidates_for(selected))
    }

    pub fn referencing(&self, id: &LocationId) -> Vec<&CoverageArea> {
        self.by_unit
            .get(id)
            .map(|postings| postings.iter().map(|&i| &self.areas[i]).collect())
            .unwrap_or_default()
    }
}

/// What the caller should persist once the user confirms
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmedSelection {
    pub coverage_area_ids: BTreeSet<CoverageAreaId>,
    pub location_ids: BTreeSet<LocationId>,
}

impl ConfirmedSelection {
    /// No area matched; the caller offers to create one seeded with `location_ids`
    pub fn needs_new_area(&self) -> bool {
        self.coverage_area_ids.is_empty() && !self.location_ids.is_empty()
    }
}

impl<S> LocationEngine<S>
where
    S: LocationDataSource + ?Sized + 'static,
{
    /// Fetch candidate areas unless the session cache is warm
    pub async fn ensure_coverage_areas(&self) -> LocusResult<()> {
        if self.options.cache_candidates && self.lock().catalog.is_loaded() {
            return Ok(());
        }
        self.refresh_coverage_areas().await.map(|_| ())
    }

    /// Refetch candidate areas, replacing the session cache
    pub async fn refresh_coverage_areas(&self) -> LocusResult<usize> {
        let filter = CoverageAreaFilter {
            organization_id: self.options.organization_id.clone(),
            ..CoverageAreaFilter::active()
        };
        let areas = self
            .source
            .list_coverage_areas(&filter)
            .await
            .map_err(|e| LocusError::fetch_failed("loading coverage areas", e))?;

        let active: Vec<CoverageArea> = areas.into_iter().filter(|a| filter.matches(a)).collect();
        let count = active.len();
        self.lock().catalog.replace(active);
        info!(count, "coverage areas cached");
        Ok(count)
    }

    /// Tightest active area containing the whole selection
    pub async fn suggest_coverage_area(&self) -> LocusResult<Option<CoverageArea>> {
        self.ensure_coverage_areas().await?;
        let state = self.lock();
        let found = state.catalog.find_containing(state.selection.ids()).cloned();
        debug!(
            selected = state.selection.len(),
            matched = found.as_ref().map(|a| a.id.as_str()),
            "coverage suggestion"
        );
        Ok(found)
    }

    /// Every containing area, tightest first
    pub async fn containing_coverage_areas(&self) -> LocusResult<Vec<CoverageArea>> {
        self.ensure_coverage_areas().await?;
        let state = self.lock();
        Ok(state
            .catalog
            .find_all_containing(state.selection.ids())
            .into_iter()
            .cloned()
            .collect())
    }

    /// Pin an area to the confirmation, overriding the suggestion
    pub async fn adopt_coverage_area(&self, id: &CoverageAreaId) -> LocusResult<()> {
        self.ensure_coverage_areas().await?;
        let mut state = self.lock();
        if state.catalog.get(id).is_none() {
            return Err(LocusError::coverage_area_not_found(id));
        }
        state.adopted.insert(id.clone());
        Ok(())
    }

    pub fn release_coverage_area(&self, id: &CoverageAreaId) -> bool {
        self.lock().adopted.remove(id)
    }

    /// Load an existing area's units as the selection and pin the area
    pub async fn edit_coverage_area(&self, id: &CoverageAreaId) -> LocusResult<CoverageArea> {
        self.ensure_coverage_areas().await?;
        let mut state = self.lock();
        let area = state
            .catalog
            .get(id)
            .cloned()
            .ok_or_else(|| LocusError::coverage_area_not_found(id))?;
        state.selection = crate::domain::entities::Selection::from_ids(
            area.geographic_unit_ids.iter().cloned(),
        );
        state.adopted = BTreeSet::from([area.id.clone()]);
        Ok(area)
    }

    /// Resolve the selection into what the caller stores
    ///
    /// Adopted areas win; otherwise the suggestion is used; otherwise no
    /// area ids are returned and the raw unit ids stand alone.
    pub async fn confirm(&self) -> LocusResult<ConfirmedSelection> {
        let adopted = self.lock().adopted.clone();
        let coverage_area_ids = if adopted.is_empty() {
            self.suggest_coverage_area()
                .await?
                .map(|area| BTreeSet::from([area.id]))
                .unwrap_or_default()
        } else {
            adopted
        };

        Ok(ConfirmedSelection {
            coverage_area_ids,
            location_ids: self.selected_ids(),
        })
    }
}
