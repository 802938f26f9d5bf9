//! Locus - geographic hierarchy and coverage-area resolution
//!
//! Locus keeps a partially loaded Province → District → Municipality →
//! Barangay hierarchy in memory, expands it lazily from a data source,
//! propagates tri-state selection through it, and matches selections against
//! existing coverage areas before anything is created or deleted.

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;

// Re-exports for convenience
pub use application::{
    ConfirmedSelection, DeleteConfirmation, EngineOptions, ExpansionPhase, LocationEngine,
    TreeNodeView, VisibleRow,
};
pub use config::Config;
pub use domain::entities::{CoverageArea, LocationNode, UserCoverageAssignment};
pub use domain::ports::{LocationDataSource, SourceError, SourceResult};
pub use domain::value_objects::{
    CoverageAreaId, ExpandMode, LocationId, LocationType, SelectionState,
};
pub use error::{LocusError, LocusResult};
pub use infrastructure::{Dataset, InMemorySource, RestConfig, RestSource};
