//! Parent Type Policy
//!
//! Which administrative levels may sit under which. Pure rules; callers pass
//! the already-loaded parent record (or `None` for a top-level node).

use crate::domain::entities::LocationNode;
use crate::domain::value_objects::LocationType;
use crate::error::{LocusError, LocusResult};

/// Check that `parent` is a valid parent for a node of type `child_type`
///
/// - province: top level only
/// - district, city: under a province
/// - municipality: under a district-level unit (district or city)
/// - barangay: under a municipality
/// - custom: anywhere
pub fn check_parent(
    child: &str,
    child_type: LocationType,
    parent: Option<&LocationNode>,
) -> LocusResult<()> {
    let parent_type = parent.map(|p| p.location_type);

    let allowed = match (child_type, parent) {
        (LocationType::Custom, _) => true,
        (LocationType::Province, None) => true,
        (LocationType::Province, Some(_)) => false,
        (LocationType::District | LocationType::City, Some(p)) => {
            p.location_type == LocationType::Province
        }
        (LocationType::Municipality, Some(p)) => p.acts_as_district(),
        (LocationType::Barangay, Some(p)) => p.location_type == LocationType::Municipality,
        (_, None) => false,
    };

    if allowed {
        Ok(())
    } else {
        Err(LocusError::InvalidParentType {
            child: child.to_string(),
            child_type,
            parent_type,
        })
    }
}

/// Convenience wrapper for an existing node
pub fn check_node_parent(node: &LocationNode, parent: Option<&LocationNode>) -> LocusResult<()> {
    check_parent(node.id.as_str(), node.location_type, parent)
}
