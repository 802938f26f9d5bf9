//! Reusable datasets

use locus::domain::entities::{CoverageArea, LocationNode, UserCoverageAssignment};
use locus::{Dataset, LocationId, LocationType};

pub fn id(raw: &str) -> LocationId {
    LocationId::from(raw)
}

/// P → D1, D2; D1 → M1, M2; D2 → M3; M1 → B1, B2
pub fn hierarchy() -> Vec<LocationNode> {
    vec![
        LocationNode::new("P", "Camarines Sur", LocationType::Province),
        LocationNode::new("D1", "District I", LocationType::District).with_parent("P"),
        LocationNode::new("D2", "District II", LocationType::District).with_parent("P"),
        LocationNode::new("M1", "Naga", LocationType::Municipality).with_parent("D1"),
        LocationNode::new("M2", "Pili", LocationType::Municipality).with_parent("D1"),
        LocationNode::new("M3", "Iriga", LocationType::Municipality).with_parent("D2"),
        LocationNode::new("B1", "Abella", LocationType::Barangay).with_parent("M1"),
        LocationNode::new("B2", "Bagumbayan Norte", LocationType::Barangay).with_parent("M1"),
    ]
}

/// CA1 = {M1, M2}, CA2 = {M1, M2, M3}, CA3 inactive = {M3}
pub fn coverage_areas() -> Vec<CoverageArea> {
    vec![
        CoverageArea::new("CA1", "Naga-Pili cluster", ["M1", "M2"]),
        CoverageArea::new("CA2", "Camarines Sur relief", ["M1", "M2", "M3"]),
        CoverageArea::new("CA3", "Iriga (retired)", ["M3"]).inactive(),
    ]
}

pub fn assignments() -> Vec<UserCoverageAssignment> {
    vec![
        UserCoverageAssignment::new("a1", "u1", "CA1").primary(),
        UserCoverageAssignment::new("a2", "u2", "CA2").inactive(),
    ]
}

pub fn dataset() -> Dataset {
    Dataset {
        locations: hierarchy(),
        coverage_areas: coverage_areas(),
        assignments: assignments(),
    }
}

/// The four-node hierarchy with a single coverage area over M1 and M2
pub fn minimal_dataset() -> Dataset {
    Dataset {
        locations: vec![
            LocationNode::new("P", "Province", LocationType::Province),
            LocationNode::new("D1", "District", LocationType::District).with_parent("P"),
            LocationNode::new("M1", "Municipality 1", LocationType::Municipality)
                .with_parent("D1"),
            LocationNode::new("M2", "Municipality 2", LocationType::Municipality)
                .with_parent("D1"),
        ],
        coverage_areas: vec![CoverageArea::new("CA1", "Cluster", ["M1", "M2"])],
        assignments: Vec::new(),
    }
}
