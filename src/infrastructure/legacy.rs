//! Legacy payload normalization
//!
//! Older backends serve the same records under different field names
//! (`_id`, `Location_ID`, `location_type`), embed parents as objects,
//! send booleans as strings and wrap lists in `{ "data": [...] }`. Everything
//! is mapped onto the canonical entities here, before it reaches the engine.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::domain::entities::{
    CoverageArea, CoverageAreaMetadata, LocationMetadata, LocationNode, UserCoverageAssignment,
};
use crate::domain::ports::{SourceError, SourceResult};
use crate::domain::value_objects::{LocationId, LocationType};

const ID_KEYS: &[&str] = &["id", "_id", "ID", "Id"];

const LOCATION_ID_KEYS: &[&str] = &["id", "_id", "Location_ID", "location_id", "locationId"];
const NAME_KEYS: &[&str] = &["name", "Name", "location_name", "locationName"];
const TYPE_KEYS: &[&str] = &["type", "Type", "location_type", "locationType", "level"];
const PARENT_KEYS: &[&str] = &["parentId", "parent_id", "Parent_ID", "parent", "parentLocation"];
const ACTIVE_KEYS: &[&str] = &["isActive", "is_active", "IsActive", "active", "status"];
const CODE_KEYS: &[&str] = &["code", "Code"];
const ADMIN_CODE_KEYS: &[&str] = &["administrativeCode", "administrative_code", "psgc", "PSGC"];

const AREA_UNIT_KEYS: &[&str] = &[
    "geographicUnitIds",
    "geographicUnits",
    "geographic_units",
    "geographic_unit_ids",
    "locations",
    "locationIds",
];
const ORGANIZATION_KEYS: &[&str] = &["organizationId", "organization_id", "organization"];
const UPDATED_KEYS: &[&str] = &["updatedAt", "updated_at", "lastModified"];

/// Strip `{ "data": ... }` style wrappers
pub fn unwrap_envelope(mut value: Value) -> Value {
    for _ in 0..3 {
        let inner = match &mut value {
            Value::Object(obj) => ["data", "items", "results"]
                .iter()
                .find_map(|key| obj.remove(*key)),
            _ => None,
        };
        match inner {
            Some(inner) => value = inner,
            None => break,
        }
    }
    value
}

/// Normalize a list response of locations
///
/// Nested `children` arrays are flattened; children without an explicit
/// parent inherit the enclosing node.
pub fn normalize_locations(value: Value) -> SourceResult<Vec<LocationNode>> {
    let items = into_items(value, &["locations", "nodes"])?;
    let mut out = Vec::with_capacity(items.len());
    for item in &items {
        flatten_location(item, None, &mut out)?;
    }
    Ok(out)
}

fn flatten_location(
    value: &Value,
    inherited_parent: Option<&LocationId>,
    out: &mut Vec<LocationNode>,
) -> SourceResult<()> {
    let mut node = normalize_location(value)?;
    if node.parent_id.is_none() {
        node.parent_id = inherited_parent.cloned();
    }
    let id = node.id.clone();
    out.push(node);

    if let Some(Value::Array(children)) = value.get("children") {
        for child in children {
            flatten_location(child, Some(&id), out)?;
        }
    }
    Ok(())
}

/// Normalize a single location record
pub fn normalize_location(value: &Value) -> SourceResult<LocationNode> {
    let obj = as_object(value, "location")?;

    let id = field(obj, LOCATION_ID_KEYS)
        .and_then(as_id)
        .ok_or_else(|| missing("location", "id"))?;
    let name = field(obj, NAME_KEYS)
        .and_then(as_text)
        .ok_or_else(|| missing("location", "name"))?;
    let raw_type = field(obj, TYPE_KEYS)
        .and_then(as_text)
        .ok_or_else(|| missing("location", "type"))?;
    let location_type: LocationType = raw_type
        .parse()
        .map_err(|e| SourceError::Malformed(format!("location '{}': {}", id, e)))?;

    let parent_id = field(obj, PARENT_KEYS)
        .and_then(as_id)
        .or_else(|| field(obj, implied_parent_keys(location_type)).and_then(as_id))
        .map(LocationId::new);

    let mut metadata: LocationMetadata = match obj.get("metadata") {
        Some(meta @ Value::Object(_)) => serde_json::from_value(meta.clone())
            .map_err(|e| SourceError::Malformed(format!("location '{}' metadata: {}", id, e)))?,
        _ => LocationMetadata::default(),
    };
    if let Some(is_city) = field(obj, &["isCity", "is_city"]).and_then(as_bool) {
        metadata.is_city = is_city;
    }
    if let Some(combined) = field(obj, &["isCombined", "is_combined"]).and_then(as_bool) {
        metadata.is_combined = combined;
    }
    if let Some(group) = field(obj, &["operationalGroup", "operational_group"]).and_then(as_text) {
        metadata.operational_group = Some(group);
    }

    Ok(LocationNode {
        id: LocationId::new(id),
        name,
        location_type,
        code: field(obj, CODE_KEYS).and_then(as_text),
        administrative_code: field(obj, ADMIN_CODE_KEYS).and_then(as_text),
        parent_id,
        is_active: field(obj, ACTIVE_KEYS).and_then(as_bool).unwrap_or(true),
        metadata,
    })
}

/// Older records point at their parent through a level-specific key
fn implied_parent_keys(ty: LocationType) -> &'static [&'static str] {
    match ty {
        LocationType::District | LocationType::City => {
            &["provinceId", "province_id", "Province_ID", "province"]
        }
        LocationType::Municipality => &["districtId", "district_id", "District_ID", "district"],
        LocationType::Barangay => &[
            "municipalityId",
            "municipality_id",
            "Municipality_ID",
            "municipality",
        ],
        LocationType::Province | LocationType::Custom => &[],
    }
}

pub fn normalize_coverage_areas(value: Value) -> SourceResult<Vec<CoverageArea>> {
    into_items(value, &["coverageAreas", "coverage_areas"])?
        .iter()
        .map(normalize_coverage_area)
        .collect()
}

pub fn normalize_coverage_area(value: &Value) -> SourceResult<CoverageArea> {
    let obj = as_object(value, "coverage area")?;

    let id = field(obj, ID_KEYS)
        .and_then(as_id)
        .ok_or_else(|| missing("coverage area", "id"))?;
    let name = field(obj, NAME_KEYS)
        .and_then(as_text)
        .ok_or_else(|| missing("coverage area", "name"))?;

    let geographic_unit_ids: BTreeSet<LocationId> = match field(obj, AREA_UNIT_KEYS) {
        Some(Value::Array(units)) => units.iter().filter_map(as_id).map(LocationId::new).collect(),
        Some(_) => {
            return Err(SourceError::Malformed(format!(
                "coverage area '{}': geographic units must be a list",
                id
            )))
        }
        None => BTreeSet::new(),
    };

    let mut metadata: CoverageAreaMetadata = match obj.get("metadata") {
        Some(meta @ Value::Object(_)) => serde_json::from_value(meta.clone()).map_err(|e| {
            SourceError::Malformed(format!("coverage area '{}' metadata: {}", id, e))
        })?,
        _ => CoverageAreaMetadata::default(),
    };
    if let Some(Value::Array(tags)) = obj.get("tags") {
        metadata.tags.extend(tags.iter().filter_map(as_text));
    }

    Ok(CoverageArea {
        id: id.into(),
        name,
        code: field(obj, CODE_KEYS).and_then(as_text),
        description: field(obj, &["description"]).and_then(as_text),
        geographic_unit_ids,
        organization_id: field(obj, ORGANIZATION_KEYS).and_then(as_id),
        is_active: field(obj, ACTIVE_KEYS).and_then(as_bool).unwrap_or(true),
        metadata,
        updated_at: field(obj, UPDATED_KEYS).and_then(as_timestamp),
    })
}

pub fn normalize_assignments(value: Value) -> SourceResult<Vec<UserCoverageAssignment>> {
    into_items(value, &["assignments", "users"])?
        .iter()
        .map(normalize_assignment)
        .collect()
}

pub fn normalize_assignment(value: &Value) -> SourceResult<UserCoverageAssignment> {
    let obj = as_object(value, "assignment")?;

    let id = field(obj, ID_KEYS)
        .and_then(as_id)
        .ok_or_else(|| missing("assignment", "id"))?;
    let user_id = field(obj, &["userId", "user_id", "user"])
        .and_then(as_id)
        .ok_or_else(|| missing("assignment", "userId"))?;
    let coverage_area_id = field(obj, &["coverageAreaId", "coverage_area_id", "coverageArea"])
        .and_then(as_id)
        .ok_or_else(|| missing("assignment", "coverageAreaId"))?;

    Ok(UserCoverageAssignment {
        id: id.into(),
        user_id,
        coverage_area_id: coverage_area_id.into(),
        is_primary: field(obj, &["isPrimary", "is_primary"])
            .and_then(as_bool)
            .unwrap_or(false),
        is_active: field(obj, ACTIVE_KEYS).and_then(as_bool).unwrap_or(true),
        assigned_at: field(obj, &["assignedAt", "assigned_at", "createdAt"]).and_then(as_timestamp),
    })
}

fn into_items(value: Value, collection_keys: &[&str]) -> SourceResult<Vec<Value>> {
    match unwrap_envelope(value) {
        Value::Array(items) => Ok(items),
        Value::Object(mut obj) => match collection_keys.iter().find_map(|k| obj.remove(*k)) {
            Some(Value::Array(items)) => Ok(items),
            _ => Err(SourceError::Malformed("expected a list".to_string())),
        },
        _ => Err(SourceError::Malformed("expected a list".to_string())),
    }
}

fn as_object<'a>(value: &'a Value, what: &str) -> SourceResult<&'a Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| SourceError::Malformed(format!("{} must be an object", what)))
}

fn missing(what: &str, key: &str) -> SourceError {
    SourceError::Malformed(format!("{} is missing '{}'", what, key))
}

/// First non-null value under any of `keys`
fn field<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| obj.get(*key))
        .find(|v| !v.is_null())
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Ids arrive as strings, numbers or populated objects
fn as_id(value: &Value) -> Option<String> {
    match value {
        Value::Object(obj) => field(obj, ID_KEYS).and_then(as_text),
        other => as_text(other),
    }
}

fn as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_i64().map(|n| n != 0),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "yes" | "1" | "active" => Some(true),
            "false" | "no" | "0" | "inactive" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn as_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    value
        .as_str()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}
