//! Matching selections against existing coverage areas

use locus::domain::entities::NewCoverageArea;
use locus::{CoverageAreaId, LocusError};

use crate::common::*;

fn area(raw: &str) -> CoverageAreaId {
    CoverageAreaId::from(raw)
}

#[tokio::test]
async fn scenario_selection_inside_single_area_matches_it() {
    let (engine, _) = engine_with(ProbeSource::new(minimal_dataset()));
    engine.load_tree().await.unwrap();

    engine.set_selection([id("M1")]);
    let found = engine.suggest_coverage_area().await.unwrap();
    assert_eq!(found.map(|a| a.id), Some(area("CA1")));

    engine.set_selection([id("M1"), id("M3")]);
    assert_eq!(engine.suggest_coverage_area().await.unwrap(), None);
}

#[tokio::test]
async fn scenario_tightest_area_wins_and_inactive_is_ignored() {
    let (engine, _) = engine_with(ProbeSource::new(dataset()));
    engine.load_tree().await.unwrap();

    engine.set_selection([id("M1"), id("M2")]);
    let all: Vec<_> = engine
        .containing_coverage_areas()
        .await
        .unwrap()
        .into_iter()
        .map(|a| a.id)
        .collect();
    assert_eq!(all, vec![area("CA1"), area("CA2")]);

    // CA3 covers exactly M3 but is retired
    engine.set_selection([id("M3")]);
    let found = engine.suggest_coverage_area().await.unwrap();
    assert_eq!(found.map(|a| a.id), Some(area("CA2")));
}

#[tokio::test]
async fn scenario_empty_selection_matches_nothing() {
    let (engine, _) = engine_with(ProbeSource::new(dataset()));
    engine.load_tree().await.unwrap();

    assert_eq!(engine.suggest_coverage_area().await.unwrap(), None);
    let confirmed = engine.confirm().await.unwrap();
    assert!(confirmed.coverage_area_ids.is_empty());
    assert!(!confirmed.needs_new_area());
}

#[tokio::test]
async fn scenario_confirm_prefers_adopted_area() {
    let (engine, _) = engine_with(ProbeSource::new(dataset()));
    engine.load_tree().await.unwrap();
    engine.set_selection([id("M1")]);

    let suggested = engine.confirm().await.unwrap();
    assert_eq!(suggested.coverage_area_ids.into_iter().collect::<Vec<_>>(), vec![area("CA1")]);

    engine.adopt_coverage_area(&area("CA2")).await.unwrap();
    let adopted = engine.confirm().await.unwrap();
    assert_eq!(adopted.coverage_area_ids.into_iter().collect::<Vec<_>>(), vec![area("CA2")]);
    assert_eq!(adopted.location_ids.len(), 1);

    assert!(engine.release_coverage_area(&area("CA2")));
    let back = engine.confirm().await.unwrap();
    assert!(back.coverage_area_ids.contains(&area("CA1")));
}

#[tokio::test]
async fn scenario_adopting_retired_area_is_not_found() {
    let (engine, _) = engine_with(ProbeSource::new(dataset()));
    engine.load_tree().await.unwrap();

    let err = engine.adopt_coverage_area(&area("CA3")).await.unwrap_err();
    assert!(matches!(err, LocusError::NotFound { .. }));
}

#[tokio::test]
async fn scenario_unmatched_selection_needs_new_area() {
    let (engine, _) = engine_with(ProbeSource::new(dataset()));
    engine.load_tree().await.unwrap();
    engine.set_selection([id("B1")]);

    let confirmed = engine.confirm().await.unwrap();
    assert!(confirmed.needs_new_area());

    let created = engine
        .create_coverage_area(NewCoverageArea::new(
            "Abella",
            confirmed.location_ids.clone(),
        ))
        .await
        .unwrap();

    let after = engine.confirm().await.unwrap();
    assert_eq!(
        after.coverage_area_ids.into_iter().collect::<Vec<_>>(),
        vec![created.id]
    );
}

#[tokio::test]
async fn scenario_edit_area_loads_its_units_as_selection() {
    let (engine, _) = engine_with(ProbeSource::new(dataset()));
    engine.load_tree().await.unwrap();

    let edited = engine.edit_coverage_area(&area("CA2")).await.unwrap();
    assert_eq!(edited.unit_count(), 3);
    assert_eq!(engine.selected_ids().len(), 3);
    assert!(engine.is_indeterminate(&id("P")));

    let confirmed = engine.confirm().await.unwrap();
    assert!(confirmed.coverage_area_ids.contains(&area("CA2")));
}

#[tokio::test]
async fn scenario_organization_scope_limits_candidates() {
    use std::sync::Arc;

    use locus::domain::entities::CoverageArea;
    use locus::{EngineOptions, LocationEngine};

    let mut data = dataset();
    data.coverage_areas = vec![
        CoverageArea::new("mine", "Ours", ["M1", "M2", "M3"]).for_organization("org-1"),
        CoverageArea::new("theirs", "Theirs", ["M1"]).for_organization("org-2"),
    ];
    let options = EngineOptions {
        organization_id: Some("org-1".into()),
        ..EngineOptions::default()
    };
    let engine = LocationEngine::with_options(Arc::new(ProbeSource::new(data)), options);
    engine.load_tree().await.unwrap();

    engine.set_selection([id("M1")]);
    let found = engine.suggest_coverage_area().await.unwrap();
    assert_eq!(found.map(|a| a.id), Some(area("mine")));
}
