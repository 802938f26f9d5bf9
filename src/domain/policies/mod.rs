//! Domain Policies
//!
//! Business rules that don't belong to a single entity.

mod parent_type;

pub use parent_type::{check_node_parent, check_parent};
