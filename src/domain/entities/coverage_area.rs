//! Coverage area entity
//!
//! A named grouping of location ids used for staff and territory assignment.
//! Areas may overlap and may mix levels (one municipality plus a whole
//! province is fine).

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{CoverageAreaId, LocationId};

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageAreaMetadata {
    #[serde(default)]
    pub tags: BTreeSet<String>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageArea {
    pub id: CoverageAreaId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub geographic_unit_ids: BTreeSet<LocationId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub metadata: CoverageAreaMetadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl CoverageArea {
    pub fn new<I, L>(id: impl Into<CoverageAreaId>, name: impl Into<String>, units: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: Into<LocationId>,
    {
        Self {
            id: id.into(),
            name: name.into(),
            code: None,
            description: None,
            geographic_unit_ids: units.into_iter().map(Into::into).collect(),
            organization_id: None,
            is_active: true,
            metadata: CoverageAreaMetadata::default(),
            updated_at: None,
        }
    }

    pub fn updated(mut self, at: DateTime<Utc>) -> Self {
        self.updated_at = Some(at);
        self
    }

    pub fn for_organization(mut self, organization: impl Into<String>) -> Self {
        self.organization_id = Some(organization.into());
        self
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    pub fn covers(&self, id: &LocationId) -> bool {
        self.geographic_unit_ids.contains(id)
    }

    /// True when every id in `ids` is one of this area's units
    pub fn contains_all<'a>(&self, ids: impl IntoIterator<Item = &'a LocationId>) -> bool {
        ids.into_iter().all(|id| self.geographic_unit_ids.contains(id))
    }

    pub fn unit_count(&self) -> usize {
        self.geographic_unit_ids.len()
    }
}

/// Payload for creating a coverage area
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCoverageArea {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub geographic_unit_ids: BTreeSet<LocationId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub metadata: CoverageAreaMetadata,
}

impl NewCoverageArea {
    pub fn new(name: impl Into<String>, units: BTreeSet<LocationId>) -> Self {
        Self {
            name: name.into(),
            code: None,
            description: None,
            geographic_unit_ids: units,
            organization_id: None,
            is_active: true,
            metadata: CoverageAreaMetadata::default(),
        }
    }

    pub fn into_area(self, id: CoverageAreaId, at: DateTime<Utc>) -> CoverageArea {
        CoverageArea {
            id,
            name: self.name,
            code: self.code,
            description: self.description,
            geographic_unit_ids: self.geographic_unit_ids,
            organization_id: self.organization_id,
            is_active: self.is_active,
            metadata: self.metadata,
            updated_at: Some(at),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageAreaPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geographic_unit_ids: Option<BTreeSet<LocationId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<CoverageAreaMetadata>,
}

impl CoverageAreaPatch {
    pub fn apply_to(&self, area: &mut CoverageArea, at: DateTime<Utc>) {
        if let Some(name) = &self.name {
            area.name = name.clone();
        }
        if let Some(code) = &self.code {
            area.code = Some(code.clone());
        }
        if let Some(description) = &self.description {
            area.description = Some(description.clone());
        }
        if let Some(units) = &self.geographic_unit_ids {
            area.geographic_unit_ids = units.clone();
        }
        if let Some(active) = self.is_active {
            area.is_active = active;
        }
        if let Some(metadata) = &self.metadata {
            area.metadata = metadata.clone();
        }
        area.updated_at = Some(at);
    }
}
