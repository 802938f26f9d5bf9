//! In-memory data source
//!
//! Serves a fixed dataset, typically loaded from a JSON snapshot. Writes are
//! applied to the dataset with the same referential rules a real backend
//! enforces, which makes it the source used by the CLI's offline mode and by
//! the test suites.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};

use crate::domain::entities::{
    CoverageArea, CoverageAreaPatch, LocationNode, LocationPatch, NewCoverageArea, NewLocation,
    UserCoverageAssignment,
};
use crate::domain::ports::{
    CoverageAreaFilter, LocationDataSource, LocationFilter, SourceError, SourceResult,
};
use crate::domain::value_objects::{CoverageAreaId, LocationId};
use crate::error::{LocusError, LocusResult};

use super::legacy;

/// Everything a snapshot file holds
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub locations: Vec<LocationNode>,
    pub coverage_areas: Vec<CoverageArea>,
    pub assignments: Vec<UserCoverageAssignment>,
}

impl Dataset {
    /// Parse `{ "locations": [...], "coverageAreas": [...], "assignments": [...] }`
    ///
    /// Records may use the legacy field spellings.
    pub fn from_value(value: Value) -> SourceResult<Self> {
        let Value::Object(mut obj) = value else {
            return Err(SourceError::Malformed("snapshot must be an object".into()));
        };

        let locations = take_list(&mut obj, &["locations"]);
        let coverage_areas = take_list(&mut obj, &["coverageAreas", "coverage_areas"]);
        let assignments = take_list(&mut obj, &["assignments", "userCoverageAssignments"]);

        Ok(Self {
            locations: legacy::normalize_locations(locations)?,
            coverage_areas: legacy::normalize_coverage_areas(coverage_areas)?,
            assignments: legacy::normalize_assignments(assignments)?,
        })
    }

    pub fn from_json(content: &str) -> SourceResult<Self> {
        let value: Value =
            serde_json::from_str(content).map_err(|e| SourceError::Malformed(e.to_string()))?;
        Self::from_value(value)
    }

    pub fn load(path: &Path) -> LocusResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content).map_err(|e| LocusError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}

fn take_list(obj: &mut Map<String, Value>, keys: &[&str]) -> Value {
    keys.iter()
        .find_map(|k| obj.remove(*k))
        .unwrap_or_else(|| Value::Array(Vec::new()))
}

pub struct InMemorySource {
    data: Mutex<Dataset>,
    sequence: AtomicU64,
}

impl InMemorySource {
    pub fn new(data: Dataset) -> Self {
        Self {
            data: Mutex::new(data),
            sequence: AtomicU64::new(1),
        }
    }

    pub fn from_file(path: &Path) -> LocusResult<Self> {
        Ok(Self::new(Dataset::load(path)?))
    }

    /// Copy of the current dataset
    pub fn dataset(&self) -> Dataset {
        self.lock().clone()
    }

    pub fn add_assignment(&self, assignment: UserCoverageAssignment) {
        self.lock().assignments.push(assignment);
    }

    fn lock(&self) -> MutexGuard<'_, Dataset> {
        self.data.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn next_id(&self, prefix: &str) -> String {
        format!("{}-{}", prefix, self.sequence.fetch_add(1, Ordering::Relaxed))
    }
}

fn conflict(message: impl Into<String>) -> SourceError {
    SourceError::Rejected {
        status: 409,
        message: message.into(),
    }
}

fn unprocessable(message: impl Into<String>) -> SourceError {
    SourceError::Rejected {
        status: 422,
        message: message.into(),
    }
}

/// Active nodes whose whole ancestor chain is active
fn visible_locations(locations: &[LocationNode]) -> Vec<LocationNode> {
    let by_id: HashMap<&LocationId, &LocationNode> =
        locations.iter().map(|n| (&n.id, n)).collect();

    locations
        .iter()
        .filter(|node| {
            let mut current = Some(*node);
            let mut hops = 0;
            while let Some(n) = current {
                if !n.is_active || hops > locations.len() {
                    return false;
                }
                current = n.parent_id.as_ref().and_then(|p| by_id.get(p).copied());
                hops += 1;
            }
            true
        })
        .cloned()
        .collect()
}

#[async_trait]
impl LocationDataSource for InMemorySource {
    async fn list_locations(&self, filter: &LocationFilter) -> SourceResult<Vec<LocationNode>> {
        Ok(self
            .lock()
            .locations
            .iter()
            .filter(|n| filter.matches(n))
            .cloned()
            .collect())
    }

    async fn get_location_tree(&self, include_inactive: bool) -> SourceResult<Vec<LocationNode>> {
        let data = self.lock();
        if include_inactive {
            Ok(data.locations.clone())
        } else {
            Ok(visible_locations(&data.locations))
        }
    }

    async fn get_children(&self, parent: &LocationId) -> SourceResult<Vec<LocationNode>> {
        let data = self.lock();
        if !data.locations.iter().any(|n| &n.id == parent) {
            return Err(SourceError::NotFound(parent.to_string()));
        }
        Ok(data
            .locations
            .iter()
            .filter(|n| n.parent_id.as_ref() == Some(parent))
            .cloned()
            .collect())
    }

    async fn create_location(&self, draft: &NewLocation) -> SourceResult<LocationNode> {
        let mut data = self.lock();
        if let Some(parent) = &draft.parent_id {
            if !data.locations.iter().any(|n| &n.id == parent) {
                return Err(unprocessable(format!("unknown parent '{}'", parent)));
            }
        }
        let node = draft.clone().into_node(LocationId::new(self.next_id("loc")));
        data.locations.push(node.clone());
        Ok(node)
    }

    async fn update_location(
        &self,
        id: &LocationId,
        patch: &LocationPatch,
    ) -> SourceResult<LocationNode> {
        let mut data = self.lock();
        let node = data
            .locations
            .iter_mut()
            .find(|n| &n.id == id)
            .ok_or_else(|| SourceError::NotFound(id.to_string()))?;
        patch.apply_to(node);
        Ok(node.clone())
    }

    async fn delete_location(&self, id: &LocationId) -> SourceResult<()> {
        let mut data = self.lock();
        if !data.locations.iter().any(|n| &n.id == id) {
            return Err(SourceError::NotFound(id.to_string()));
        }
        if data.locations.iter().any(|n| n.parent_id.as_ref() == Some(id)) {
            return Err(conflict(format!("location '{}' has children", id)));
        }
        if data
            .coverage_areas
            .iter()
            .any(|a| a.is_active && a.covers(id))
        {
            return Err(conflict(format!("location '{}' is in use", id)));
        }
        data.locations.retain(|n| &n.id != id);
        Ok(())
    }

    async fn list_coverage_areas(
        &self,
        filter: &CoverageAreaFilter,
    ) -> SourceResult<Vec<CoverageArea>> {
        Ok(self
            .lock()
            .coverage_areas
            .iter()
            .filter(|a| filter.matches(a))
            .cloned()
            .collect())
    }

    async fn create_coverage_area(&self, draft: &NewCoverageArea) -> SourceResult<CoverageArea> {
        let mut data = self.lock();
        let area = draft
            .clone()
            .into_area(CoverageAreaId::new(self.next_id("ca")), Utc::now());
        data.coverage_areas.push(area.clone());
        Ok(area)
    }

    async fn update_coverage_area(
        &self,
        id: &CoverageAreaId,
        patch: &CoverageAreaPatch,
    ) -> SourceResult<CoverageArea> {
        let mut data = self.lock();
        let area = data
            .coverage_areas
            .iter_mut()
            .find(|a| &a.id == id)
            .ok_or_else(|| SourceError::NotFound(id.to_string()))?;
        patch.apply_to(area, Utc::now());
        Ok(area.clone())
    }

    async fn delete_coverage_area(&self, id: &CoverageAreaId) -> SourceResult<()> {
        let mut data = self.lock();
        let before = data.coverage_areas.len();
        data.coverage_areas.retain(|a| &a.id != id);
        if data.coverage_areas.len() == before {
            return Err(SourceError::NotFound(id.to_string()));
        }
        data.assignments.retain(|a| &a.coverage_area_id != id);
        Ok(())
    }

    async fn get_coverage_area_users(
        &self,
        id: &CoverageAreaId,
    ) -> SourceResult<Vec<UserCoverageAssignment>> {
        let data = self.lock();
        if !data.coverage_areas.iter().any(|a| &a.id == id) {
            return Err(SourceError::NotFound(id.to_string()));
        }
        Ok(data
            .assignments
            .iter()
            .filter(|a| &a.coverage_area_id == id)
            .cloned()
            .collect())
    }
}
