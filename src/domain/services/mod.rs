//! Domain Services
//!
//! Pure business logic services that operate on domain entities.
//! These services have no I/O dependencies and are easily testable.

mod integrity;
mod matcher;
mod tree_builder;

pub use integrity::{CoverageAreaDeletionCheck, LocationDeletionCheck};
pub use matcher::{find_all_containing, find_containing, tighter_fit};
pub use tree_builder::{build_forest, Forest, TreeNode};
