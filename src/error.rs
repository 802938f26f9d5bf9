//! Error types for Locus
//!
//! Uses `thiserror` for library errors; the binary wraps them in `anyhow`.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::domain::ports::SourceError;
use crate::domain::value_objects::{CoverageAreaId, LocationId, LocationType};

/// Result type alias for Locus operations
pub type LocusResult<T> = Result<T, LocusError>;

/// What kind of record an id refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Location,
    CoverageArea,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Location => write!(f, "location"),
            RecordKind::CoverageArea => write!(f, "coverage area"),
        }
    }
}

/// Record a blocked deletion was aimed at
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeletionTarget {
    Location(LocationId),
    CoverageArea(CoverageAreaId),
}

impl fmt::Display for DeletionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeletionTarget::Location(id) => write!(f, "location '{}'", id),
            DeletionTarget::CoverageArea(id) => write!(f, "coverage area '{}'", id),
        }
    }
}

/// Main error type for Locus operations
#[derive(Error, Debug)]
pub enum LocusError {
    /// Referenced id is absent from the store or the data source
    #[error("{kind} '{id}' not found")]
    NotFound { kind: RecordKind, id: String },

    /// Parent pointers form a loop; the input is corrupt
    #[error("parent cycle detected through {}", join_ids(.ids))]
    CycleDetected { ids: Vec<LocationId> },

    /// The data source failed; local state was reverted
    #[error("{operation} failed: {source}")]
    FetchFailed {
        operation: String,
        #[source]
        source: SourceError,
    },

    /// Deletion blocked by dependent records
    #[error("cannot delete {target}: {reason}")]
    IntegrityViolation {
        target: DeletionTarget,
        reason: String,
        blocking_ids: Vec<String>,
        active_assignments: usize,
    },

    /// Parent type does not fit the child's administrative level
    #[error("{child_type} '{child}' cannot be placed {}", describe_parent(.parent_type))]
    InvalidParentType {
        child: String,
        child_type: LocationType,
        parent_type: Option<LocationType>,
    },

    /// Inactive locations cannot receive new assignments
    #[error("inactive locations cannot be assigned: {}", join_ids(.ids))]
    InactiveLocation { ids: Vec<LocationId> },

    /// Active coverage areas need at least one geographic unit
    #[error("coverage area '{name}' must include at least one geographic unit")]
    EmptyCoverageArea { name: String },

    /// A `LOCUS_*` override holds a value the engine cannot use
    #[error("invalid {var} value '{value}'{}; expected {accepted}", describe_suggestion(.suggestion))]
    InvalidEnv {
        var: String,
        value: String,
        accepted: String,
        suggestion: Option<String>,
    },

    /// Subtree walk hit `max_depth` with unloaded levels left below
    #[error("subtree of '{id}' is deeper than the {max_depth}-level limit")]
    DepthLimitExceeded { id: LocationId, max_depth: usize },

    /// Configuration file could not be loaded
    #[error("invalid config in {path}: {message}")]
    Config { path: PathBuf, message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl LocusError {
    pub fn location_not_found(id: &LocationId) -> Self {
        LocusError::NotFound {
            kind: RecordKind::Location,
            id: id.to_string(),
        }
    }

    pub fn coverage_area_not_found(id: &CoverageAreaId) -> Self {
        LocusError::NotFound {
            kind: RecordKind::CoverageArea,
            id: id.to_string(),
        }
    }

    pub fn fetch_failed(operation: impl Into<String>, source: SourceError) -> Self {
        LocusError::FetchFailed {
            operation: operation.into(),
            source,
        }
    }

    /// Recoverable errors leave the engine usable; the rest indicate corrupt data
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, LocusError::CycleDetected { .. })
    }
}

fn join_ids(ids: &[LocationId]) -> String {
    ids.iter()
        .map(LocationId::as_str)
        .collect::<Vec<_>>()
        .join(" -> ")
}

fn describe_suggestion(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(s) => format!(" (did you mean '{}'?)", s),
        None => String::new(),
    }
}

fn describe_parent(parent: &Option<LocationType>) -> String {
    match parent {
        Some(ty) => format!("under a {}", ty),
        None => "at the top level".to_string(),
    }
}
