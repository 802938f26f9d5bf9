//! Domain Ports (Interfaces)
//!
//! These traits define the boundaries of the domain layer.
//! Infrastructure layer provides concrete implementations.

mod location_source;

pub use location_source::{
    CoverageAreaFilter, LocationDataSource, LocationFilter, SourceError, SourceResult,
};
