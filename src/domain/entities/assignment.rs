//! User coverage assignment
//!
//! Join record owned by the user-management side. The engine only reads these
//! to decide whether a coverage area can be deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{AssignmentId, CoverageAreaId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCoverageAssignment {
    pub id: AssignmentId,
    pub user_id: String,
    pub coverage_area_id: CoverageAreaId,
    #[serde(default)]
    pub is_primary: bool,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_at: Option<DateTime<Utc>>,
}

impl UserCoverageAssignment {
    pub fn new(
        id: impl Into<AssignmentId>,
        user_id: impl Into<String>,
        coverage_area_id: impl Into<CoverageAreaId>,
    ) -> Self {
        Self {
            id: id.into(),
            user_id: user_id.into(),
            coverage_area_id: coverage_area_id.into(),
            is_primary: false,
            is_active: true,
            assigned_at: None,
        }
    }

    pub fn primary(mut self) -> Self {
        self.is_primary = true;
        self
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }
}
