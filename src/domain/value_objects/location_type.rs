//! Administrative level of a location node

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Level of a node in the administrative hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationType {
    Province,
    District,
    City,
    Municipality,
    Barangay,
    /// Operator-defined unit outside the standard hierarchy
    Custom,
}

impl LocationType {
    pub const ALL: [LocationType; 6] = [
        LocationType::Province,
        LocationType::District,
        LocationType::City,
        LocationType::Municipality,
        LocationType::Barangay,
        LocationType::Custom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LocationType::Province => "province",
            LocationType::District => "district",
            LocationType::City => "city",
            LocationType::Municipality => "municipality",
            LocationType::Barangay => "barangay",
            LocationType::Custom => "custom",
        }
    }

    /// District-level units: districts and cities sit directly under a province
    pub fn is_district_level(&self) -> bool {
        matches!(self, LocationType::District | LocationType::City)
    }
}

impl fmt::Display for LocationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string does not name a location type
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown location type '{0}'")]
pub struct UnknownLocationType(pub String);

impl FromStr for LocationType {
    type Err = UnknownLocationType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "province" => Ok(LocationType::Province),
            "district" => Ok(LocationType::District),
            "city" => Ok(LocationType::City),
            "municipality" => Ok(LocationType::Municipality),
            "barangay" => Ok(LocationType::Barangay),
            "custom" => Ok(LocationType::Custom),
            other => Err(UnknownLocationType(other.to_string())),
        }
    }
}
