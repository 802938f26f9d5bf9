//! LocationDataSource port
//!
//! Everything the engine needs from the backend that serves and persists
//! locations and coverage areas. The REST adapter and the in-memory snapshot
//! source both implement this; retries and timeouts live behind it.

use async_trait::async_trait;

use crate::domain::entities::{
    CoverageArea, CoverageAreaPatch, LocationNode, LocationPatch, NewCoverageArea, NewLocation,
    UserCoverageAssignment,
};
use crate::domain::value_objects::{CoverageAreaId, LocationId, LocationType};

/// Result type for data-source calls
pub type SourceResult<T> = Result<T, SourceError>;

/// Data-source failures
///
/// Cloneable so a single in-flight fetch can report to every waiter.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    #[error("record not found: {0}")]
    NotFound(String),

    #[error("data source unavailable: {0}")]
    Unavailable(String),

    #[error("request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("malformed response: {0}")]
    Malformed(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocationFilter {
    pub location_type: Option<LocationType>,
    pub is_active: Option<bool>,
    pub search: Option<String>,
}

impl LocationFilter {
    pub fn matches(&self, node: &LocationNode) -> bool {
        if let Some(ty) = self.location_type {
            if node.location_type != ty {
                return false;
            }
        }
        if let Some(active) = self.is_active {
            if node.is_active != active {
                return false;
            }
        }
        if let Some(term) = &self.search {
            if !node.name.to_lowercase().contains(&term.to_lowercase()) {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoverageAreaFilter {
    pub geographic_unit_id: Option<LocationId>,
    pub organization_id: Option<String>,
    pub is_active: Option<bool>,
}

impl CoverageAreaFilter {
    pub fn active() -> Self {
        Self {
            is_active: Some(true),
            ..Self::default()
        }
    }

    pub fn referencing(id: LocationId) -> Self {
        Self {
            geographic_unit_id: Some(id),
            is_active: Some(true),
            ..Self::default()
        }
    }

    pub fn matches(&self, area: &CoverageArea) -> bool {
        if let Some(unit) = &self.geographic_unit_id {
            if !area.covers(unit) {
                return false;
            }
        }
        if let Some(org) = &self.organization_id {
            if area.organization_id.as_ref() != Some(org) {
                return false;
            }
        }
        if let Some(active) = self.is_active {
            if area.is_active != active {
                return false;
            }
        }
        true
    }
}

/// Abstract backend for the hierarchy and its coverage areas
#[async_trait]
pub trait LocationDataSource: Send + Sync {
    async fn list_locations(&self, filter: &LocationFilter) -> SourceResult<Vec<LocationNode>>;

    /// Flat list of every location, to be built into a forest by the caller
    async fn get_location_tree(&self, include_inactive: bool) -> SourceResult<Vec<LocationNode>>;

    async fn get_children(&self, parent: &LocationId) -> SourceResult<Vec<LocationNode>>;

    async fn create_location(&self, draft: &NewLocation) -> SourceResult<LocationNode>;

    async fn update_location(
        &self,
        id: &LocationId,
        patch: &LocationPatch,
    ) -> SourceResult<LocationNode>;

    async fn delete_location(&self, id: &LocationId) -> SourceResult<()>;

    async fn list_coverage_areas(
        &self,
        filter: &CoverageAreaFilter,
    ) -> SourceResult<Vec<CoverageArea>>;

    async fn create_coverage_area(&self, draft: &NewCoverageArea) -> SourceResult<CoverageArea>;

    async fn update_coverage_area(
        &self,
        id: &CoverageAreaId,
        patch: &CoverageAreaPatch,
    ) -> SourceResult<CoverageArea>;

    async fn delete_coverage_area(&self, id: &CoverageAreaId) -> SourceResult<()>;

    async fn get_coverage_area_users(
        &self,
        id: &CoverageAreaId,
    ) -> SourceResult<Vec<UserCoverageAssignment>>;
}
