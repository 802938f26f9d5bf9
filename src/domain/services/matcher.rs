//! Coverage-area matcher
//!
//! Finds existing coverage areas whose units contain a requested selection so
//! the caller can reuse one instead of creating a duplicate.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use crate::domain::entities::CoverageArea;
use crate::domain::value_objects::LocationId;

/// Preferred order among matching candidates
///
/// Tightest fit first (fewest units), then most recently updated (unknown
/// timestamps last), then id so equal candidates resolve the same way every
/// time.
pub fn tighter_fit(a: &CoverageArea, b: &CoverageArea) -> Ordering {
    a.unit_count()
        .cmp(&b.unit_count())
        .then_with(|| b.updated_at.cmp(&a.updated_at))
        .then_with(|| a.id.cmp(&b.id))
}

fn is_candidate(area: &CoverageArea, selected: &BTreeSet<LocationId>) -> bool {
    area.is_active && area.contains_all(selected)
}

/// Best active coverage area containing every selected id
///
/// An empty selection matches nothing.
pub fn find_containing<'a>(
    selected: &BTreeSet<LocationId>,
    candidates: impl IntoIterator<Item = &'a CoverageArea>,
) -> Option<&'a CoverageArea> {
    if selected.is_empty() {
        return None;
    }
    candidates
        .into_iter()
        .filter(|area| is_candidate(area, selected))
        .min_by(|a, b| tighter_fit(a, b))
}

/// Every active coverage area containing the selection, best first
pub fn find_all_containing<'a>(
    selected: &BTreeSet<LocationId>,
    candidates: impl IntoIterator<Item = &'a CoverageArea>,
) -> Vec<&'a CoverageArea> {
    if selected.is_empty() {
        return Vec::new();
    }
    let mut matches: Vec<_> = candidates
        .into_iter()
        .filter(|area| is_candidate(area, selected))
        .collect();
    matches.sort_by(|a, b| tighter_fit(a, b));
    matches
}
