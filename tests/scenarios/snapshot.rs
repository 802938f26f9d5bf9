//! Tree views and offline snapshots

use std::path::PathBuf;
use std::sync::Arc;

use locus::{
    CoverageAreaId, EngineOptions, ExpandMode, InMemorySource, LocationEngine, SelectionState,
};

use crate::common::*;

fn legacy_snapshot() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/legacy_snapshot.json")
}

#[tokio::test]
async fn scenario_visible_rows_follow_expansion() {
    let (engine, _) = engine_with(ProbeSource::new(dataset()));
    engine.load_roots().await.unwrap();
    engine.expand(&id("P"), ExpandMode::Shallow).await.unwrap();
    engine.expand(&id("D1"), ExpandMode::Shallow).await.unwrap();
    engine.select_subtree(&id("M1")).await.unwrap();

    let rows = engine.visible_rows().unwrap();
    let outline: Vec<(usize, &str, SelectionState)> = rows
        .iter()
        .map(|r| (r.depth, r.name.as_str(), r.selection))
        .collect();
    assert_eq!(
        outline,
        vec![
            (0, "Camarines Sur", SelectionState::Indeterminate),
            (1, "District I", SelectionState::Indeterminate),
            (2, "Naga", SelectionState::Selected),
            (2, "Pili", SelectionState::Unselected),
            (1, "District II", SelectionState::Unselected),
        ]
    );

    let naga = &rows[2];
    assert!(!naga.expanded);
    assert_eq!(naga.has_children, Some(true));
    assert_eq!(naga.child_count, 2);
    assert_eq!(rows[4].has_children, None);
}

#[tokio::test]
async fn scenario_snapshot_nests_loaded_children() {
    let (engine, _) = engine_with(ProbeSource::new(dataset()));
    engine.load_tree().await.unwrap();

    let forest = engine.snapshot().unwrap();
    assert_eq!(forest.len(), 1);
    let province = &forest[0];
    assert_eq!(province.children.len(), 2);
    assert_eq!(province.children[0].children[0].node.name, "Naga");
    assert_eq!(province.children[0].children[0].children.len(), 2);

    let json = serde_json::to_value(province).unwrap();
    assert_eq!(json["node"]["name"], "Camarines Sur");
    assert!(json["children"].is_array());
}

#[tokio::test]
async fn scenario_legacy_snapshot_loads_and_matches() {
    let source = InMemorySource::from_file(&legacy_snapshot()).unwrap();
    let engine = LocationEngine::new(source);

    assert_eq!(engine.load_tree().await.unwrap(), 5);
    let hits = engine.search("bantayan");
    assert_eq!(hits.len(), 1);
    assert_eq!(
        hits[0].path,
        vec!["Albay", "First District", "Tabaco", "Bantayan"]
    );
    assert!(engine.node(&id("m-tabaco")).unwrap().metadata.is_city);

    engine.set_selection([id("m-tabaco")]);
    let found = engine.suggest_coverage_area().await.unwrap().unwrap();
    assert_eq!(found.id, CoverageAreaId::from("ca-north"));
    assert_eq!(found.organization_id.as_deref(), Some("org-red-cross"));

    let check = engine.can_delete_coverage_area(&found.id).await.unwrap();
    assert_eq!(check.active_assignment_count, 1);
}

#[tokio::test]
async fn scenario_inactive_nodes_need_opt_in() {
    let source = Arc::new(InMemorySource::from_file(&legacy_snapshot()).unwrap());
    let options = EngineOptions {
        include_inactive: true,
        ..EngineOptions::default()
    };
    let engine = LocationEngine::with_options(source, options);

    assert_eq!(engine.load_tree().await.unwrap(), 6);
    let old = engine.node(&id("b-old")).unwrap();
    assert!(!old.is_active);
}
