//! Selecting subtrees and single nodes in a loaded tree

use std::collections::BTreeSet;

use locus::{EngineOptions, LocusError, SelectionState};

use crate::common::*;

fn ids(raw: &[&str]) -> BTreeSet<locus::LocationId> {
    raw.iter().map(|s| id(s)).collect()
}

#[tokio::test]
async fn scenario_subtree_select_then_single_deselect() {
    let (engine, _) = engine_with(ProbeSource::new(minimal_dataset()));
    engine.load_tree().await.unwrap();

    assert!(engine.toggle_subtree(&id("D1")).await.unwrap());
    assert_eq!(engine.selected_ids(), ids(&["D1", "M1", "M2"]));
    assert!(engine.is_indeterminate(&id("P")));
    assert!(!engine.is_selected(&id("P")));

    assert!(!engine.toggle(&id("M1")).unwrap());
    assert!(engine.is_indeterminate(&id("D1")));
    assert!(!engine.is_selected(&id("D1")));
    assert_eq!(engine.selected_ids(), ids(&["M2"]));
    assert_eq!(engine.selection_state(&id("P")), SelectionState::Indeterminate);
}

#[tokio::test]
async fn scenario_subtree_select_loads_hidden_descendants() {
    let (engine, source) = engine_with(ProbeSource::new(dataset()));
    engine.load_roots().await.unwrap();
    assert_eq!(engine.node_count(), 1);

    engine.select_subtree(&id("D1")).await.unwrap_err();
    assert_eq!(source.children_calls(), 0);

    engine.select_subtree(&id("P")).await.unwrap();
    assert_eq!(engine.node_count(), 8);
    assert_eq!(engine.selected_ids().len(), 8);
    assert_eq!(engine.selection_state(&id("B2")), SelectionState::Selected);
}

#[tokio::test]
async fn scenario_toggle_subtree_twice_restores_selection() {
    let (engine, _) = engine_with(ProbeSource::new(dataset()));
    engine.load_tree().await.unwrap();
    engine.toggle(&id("M3")).unwrap();
    let before = engine.selected_ids();

    engine.toggle_subtree(&id("D1")).await.unwrap();
    engine.toggle_subtree(&id("D1")).await.unwrap();

    assert_eq!(engine.selected_ids(), before);
}

#[tokio::test]
async fn scenario_deselect_subtree_keeps_ancestor_partial() {
    let (engine, _) = engine_with(ProbeSource::new(dataset()));
    engine.load_tree().await.unwrap();
    engine.toggle(&id("M3")).unwrap();
    engine.select_subtree(&id("D1")).await.unwrap();

    engine.deselect_subtree(&id("M1")).unwrap();

    assert_eq!(engine.selected_ids(), ids(&["D1", "M2", "M3"]));
    assert_eq!(engine.selection_state(&id("M1")), SelectionState::Unselected);
    assert_eq!(engine.selection_state(&id("P")), SelectionState::Indeterminate);
}

#[tokio::test]
async fn scenario_toggle_unknown_node_is_not_found() {
    let (engine, _) = engine_with(ProbeSource::new(dataset()));
    engine.load_tree().await.unwrap();

    let err = engine.toggle(&id("ghost")).unwrap_err();
    assert!(matches!(err, locus::LocusError::NotFound { .. }));
    assert!(engine.selected_ids().is_empty());
}

#[tokio::test]
async fn scenario_clear_selection_resets_every_state() {
    let (engine, _) = engine_with(ProbeSource::new(dataset()));
    engine.load_tree().await.unwrap();
    engine.select_subtree(&id("P")).await.unwrap();

    engine.clear_selection();

    assert!(engine.selected_ids().is_empty());
    assert_eq!(engine.selection_state(&id("P")), SelectionState::Unselected);
}

#[tokio::test]
async fn scenario_subtree_deeper_than_limit_is_refused() {
    let options = EngineOptions {
        max_depth: 1,
        ..EngineOptions::default()
    };
    let (engine, _) = engine_with_options(ProbeSource::new(dataset()), options);
    engine.load_roots().await.unwrap();

    let err = engine.toggle_subtree(&id("P")).await.unwrap_err();
    match err {
        LocusError::DepthLimitExceeded { id: root, max_depth } => {
            assert_eq!(root, id("P"));
            assert_eq!(max_depth, 1);
        }
        other => panic!("expected DepthLimitExceeded, got {other:?}"),
    }
    assert!(engine.selected_ids().is_empty());
}

#[tokio::test]
async fn scenario_subtree_within_limit_selects_every_level() {
    let options = EngineOptions {
        max_depth: 4,
        ..EngineOptions::default()
    };
    let (engine, _) = engine_with_options(ProbeSource::new(dataset()), options);
    engine.load_roots().await.unwrap();

    assert!(engine.toggle_subtree(&id("P")).await.unwrap());
    assert_eq!(
        engine.selected_ids(),
        ids(&["P", "D1", "D2", "M1", "M2", "M3", "B1", "B2"])
    );
}
