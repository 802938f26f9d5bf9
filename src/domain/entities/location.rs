//! Location entity
//!
//! One node of the administrative hierarchy in its canonical shape. Legacy
//! payload variants are normalized before they reach this type (see
//! `infrastructure::legacy`).

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{LocationId, LocationType};

fn default_true() -> bool {
    true
}

/// Open metadata bag attached to a location
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationMetadata {
    /// A city acting as a district
    #[serde(default)]
    pub is_city: bool,

    /// A district spanning several operational units
    #[serde(default)]
    pub is_combined: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operational_group: Option<String>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationNode {
    pub id: LocationId,
    pub name: String,
    #[serde(rename = "type")]
    pub location_type: LocationType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub administrative_code: Option<String>,
    #[serde(default)]
    pub parent_id: Option<LocationId>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub metadata: LocationMetadata,
}

impl LocationNode {
    pub fn new(id: impl Into<LocationId>, name: impl Into<String>, ty: LocationType) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            location_type: ty,
            code: None,
            administrative_code: None,
            parent_id: None,
            is_active: true,
            metadata: LocationMetadata::default(),
        }
    }

    pub fn with_parent(mut self, parent: impl Into<LocationId>) -> Self {
        self.parent_id = Some(parent.into());
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    /// Whether this node may parent municipalities
    ///
    /// Only districts and cities qualify. `isCity` on a district marks a city
    /// acting as a district, which is a district either way.
    pub fn acts_as_district(&self) -> bool {
        self.location_type.is_district_level()
    }
}

/// Payload for creating a location; the data source assigns the id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLocation {
    pub name: String,
    #[serde(rename = "type")]
    pub location_type: LocationType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub administrative_code: Option<String>,
    #[serde(default)]
    pub parent_id: Option<LocationId>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub metadata: LocationMetadata,
}

impl NewLocation {
    pub fn new(name: impl Into<String>, ty: LocationType) -> Self {
        Self {
            name: name.into(),
            location_type: ty,
            code: None,
            administrative_code: None,
            parent_id: None,
            is_active: true,
            metadata: LocationMetadata::default(),
        }
    }

    pub fn under(mut self, parent: impl Into<LocationId>) -> Self {
        self.parent_id = Some(parent.into());
        self
    }

    pub fn into_node(self, id: LocationId) -> LocationNode {
        LocationNode {
            id,
            name: self.name,
            location_type: self.location_type,
            code: self.code,
            administrative_code: self.administrative_code,
            parent_id: self.parent_id,
            is_active: self.is_active,
            metadata: self.metadata,
        }
    }
}

/// Partial update of a location
///
/// `parent_id: Some(None)` moves the node to the top level; `None` leaves the
/// parent untouched. Parent changes go through the reparent checks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_type: Option<LocationType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub administrative_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Option<LocationId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<LocationMetadata>,
}

impl LocationPatch {
    pub fn reparent(parent: Option<LocationId>) -> Self {
        Self {
            parent_id: Some(parent),
            ..Self::default()
        }
    }

    pub fn touches_hierarchy(&self) -> bool {
        self.parent_id.is_some() || self.location_type.is_some()
    }

    pub fn apply_to(&self, node: &mut LocationNode) {
        if let Some(name) = &self.name {
            node.name = name.clone();
        }
        if let Some(ty) = self.location_type {
            node.location_type = ty;
        }
        if let Some(code) = &self.code {
            node.code = Some(code.clone());
        }
        if let Some(code) = &self.administrative_code {
            node.administrative_code = Some(code.clone());
        }
        if let Some(parent) = &self.parent_id {
            node.parent_id = parent.clone();
        }
        if let Some(active) = self.is_active {
            node.is_active = active;
        }
        if let Some(metadata) = &self.metadata {
            node.metadata = metadata.clone();
        }
    }
}
