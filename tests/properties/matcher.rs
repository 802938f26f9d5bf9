//! Property tests for coverage-area matching.

use std::collections::BTreeSet;

use proptest::prelude::*;

use locus::application::CoverageCatalog;
use locus::domain::entities::CoverageArea;
use locus::domain::services::{find_all_containing, find_containing};
use locus::LocationId;

fn unit_set(max: usize) -> impl Strategy<Value = BTreeSet<LocationId>> {
    proptest::collection::btree_set(0..12usize, 0..max)
        .prop_map(|ids| ids.into_iter().map(|i| LocationId::new(format!("m{i}"))).collect())
}

fn areas() -> impl Strategy<Value = Vec<CoverageArea>> {
    proptest::collection::vec((unit_set(8), any::<bool>()), 0..10).prop_map(|specs| {
        specs
            .into_iter()
            .enumerate()
            .map(|(i, (units, active))| {
                let area = CoverageArea::new(format!("ca{i}"), format!("Area {i}"), units);
                if active {
                    area
                } else {
                    area.inactive()
                }
            })
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: A match is active and contains every selected id.
    #[test]
    fn property_match_has_no_false_positives(areas in areas(), selected in unit_set(4)) {
        if let Some(found) = find_containing(&selected, &areas) {
            prop_assert!(found.is_active);
            prop_assert!(selected.iter().all(|id| found.covers(id)));
        }
    }

    /// PROPERTY: No containing active area is missed, and the match is the tightest.
    #[test]
    fn property_match_is_tightest(areas in areas(), selected in unit_set(4)) {
        let expected: Vec<&CoverageArea> = areas
            .iter()
            .filter(|a| a.is_active && !selected.is_empty() && selected.iter().all(|id| a.covers(id)))
            .collect();
        let all = find_all_containing(&selected, &areas);

        prop_assert_eq!(all.len(), expected.len());
        if let Some(best) = find_containing(&selected, &areas) {
            prop_assert!(expected.iter().all(|a| a.unit_count() >= best.unit_count()));
        } else {
            prop_assert!(expected.is_empty());
        }
    }

    /// PROPERTY: The indexed catalog answers exactly like a linear scan.
    #[test]
    fn property_catalog_agrees_with_scan(areas in areas(), selected in unit_set(4)) {
        let catalog = CoverageCatalog::from_areas(areas.clone());
        let scanned = find_containing(&selected, &areas).map(|a| a.id.clone());
        let indexed = catalog.find_containing(&selected).map(|a| a.id.clone());
        prop_assert_eq!(indexed, scanned);
    }
}
