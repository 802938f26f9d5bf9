//! Domain Entities
//!
//! Core hierarchy records and the stateful structures built over them.

mod assignment;
mod coverage_area;
mod location;
mod location_store;
mod selection;

pub use assignment::UserCoverageAssignment;
pub use coverage_area::{CoverageArea, CoverageAreaMetadata, CoverageAreaPatch, NewCoverageArea};
pub use location::{LocationMetadata, LocationNode, LocationPatch, NewLocation};
pub(crate) use location_store::name_order;
pub use location_store::{LocationStore, SearchHit};
pub use selection::Selection;
