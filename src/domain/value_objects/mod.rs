//! Domain Value Objects
//!
//! Immutable value types that represent domain concepts.

mod expand_mode;
mod ids;
mod location_type;
mod selection_state;

pub use expand_mode::ExpandMode;
pub use ids::{AssignmentId, CoverageAreaId, LocationId};
pub use location_type::{LocationType, UnknownLocationType};
pub use selection_state::SelectionState;
