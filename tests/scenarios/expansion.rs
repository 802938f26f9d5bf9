//! Lazy expansion: coalescing, failure, collapse and auto-expansion

use std::time::Duration;

use locus::{ExpandMode, ExpansionPhase, LocusError};

use crate::common::*;

#[tokio::test]
async fn scenario_concurrent_expands_share_one_request() {
    let source = ProbeSource::new(dataset()).with_delay(Duration::from_millis(20));
    let (engine, source) = engine_with(source);
    engine.load_roots().await.unwrap();
    let p = id("P");

    let (first, second) = tokio::join!(
        engine.expand(&p, ExpandMode::Shallow),
        engine.expand(&p, ExpandMode::Shallow),
    );
    first.unwrap();
    second.unwrap();

    assert_eq!(source.children_calls(), 1);
    assert!(engine.is_expanded(&id("P")));
    let names: Vec<_> = engine.children(&id("P")).into_iter().map(|n| n.name).collect();
    assert_eq!(names, vec!["District I", "District II"]);
}

#[tokio::test]
async fn scenario_reexpand_does_not_refetch() {
    let (engine, source) = engine_with(ProbeSource::new(dataset()));
    engine.load_roots().await.unwrap();

    engine.expand(&id("P"), ExpandMode::Shallow).await.unwrap();
    engine.collapse(&id("P")).unwrap();
    assert!(!engine.is_expanded(&id("P")));
    assert_eq!(engine.children(&id("P")).len(), 2);

    engine.expand(&id("P"), ExpandMode::Shallow).await.unwrap();
    assert!(engine.is_expanded(&id("P")));
    assert_eq!(source.children_calls(), 1);
}

#[tokio::test]
async fn scenario_failed_fetch_reverts_to_collapsed() {
    let (engine, source) = engine_with(ProbeSource::new(dataset()));
    engine.load_roots().await.unwrap();
    source.fail_children(true);

    let err = engine.expand(&id("P"), ExpandMode::Shallow).await.unwrap_err();
    assert!(matches!(err, LocusError::FetchFailed { .. }));

    let state = engine.expansion_of(&id("P"));
    assert_eq!(state.phase(), ExpansionPhase::Collapsed);
    assert!(!state.loading);
    assert_eq!(state.has_children, None);
    assert!(engine.children(&id("P")).is_empty());

    source.fail_children(false);
    engine.expand(&id("P"), ExpandMode::Shallow).await.unwrap();
    assert!(engine.is_expanded(&id("P")));
    assert_eq!(engine.expansion_of(&id("P")).has_children, Some(true));
    assert_eq!(source.children_calls(), 2);
}

#[tokio::test]
async fn scenario_collapse_during_load_keeps_children() {
    let source = ProbeSource::new(dataset()).with_delay(Duration::from_millis(20));
    let (engine, _) = engine_with(source);
    engine.load_roots().await.unwrap();
    let p = id("P");

    let (expanded, collapsed) = tokio::join!(engine.expand(&p, ExpandMode::Shallow), async {
        tokio::task::yield_now().await;
        assert_eq!(engine.expansion_of(&p).phase(), ExpansionPhase::Loading);
        engine.collapse(&p)
    });
    expanded.unwrap();
    collapsed.unwrap();

    let state = engine.expansion_of(&id("P"));
    assert!(!state.expanded);
    assert!(state.children_loaded);
    assert_eq!(engine.children(&id("P")).len(), 2);
}

#[tokio::test]
async fn scenario_dropped_expand_still_merges_children() {
    let source = ProbeSource::new(dataset()).with_delay(Duration::from_millis(50));
    let (engine, source) = engine_with(source);
    engine.load_roots().await.unwrap();
    let p = id("P");

    let attempt = tokio::time::timeout(
        Duration::from_millis(10),
        engine.expand(&p, ExpandMode::Shallow),
    )
    .await;
    assert!(attempt.is_err());
    assert_eq!(engine.expansion_of(&p).phase(), ExpansionPhase::Collapsed);

    tokio::time::sleep(Duration::from_millis(200)).await;
    let state = engine.expansion_of(&p);
    assert!(!state.loading);
    assert!(state.children_loaded);
    assert!(!state.expanded);
    assert_eq!(engine.children(&p).len(), 2);

    engine.expand(&p, ExpandMode::Shallow).await.unwrap();
    assert!(engine.is_expanded(&p));
    assert_eq!(source.children_calls(), 1);
}

#[tokio::test]
async fn scenario_leaf_expansion_records_no_children() {
    let (engine, _) = engine_with(ProbeSource::new(dataset()));
    engine.load_roots().await.unwrap();
    engine.expand(&id("P"), ExpandMode::Full).await.unwrap();

    engine.expand(&id("M2"), ExpandMode::Shallow).await.unwrap();

    let state = engine.expansion_of(&id("M2"));
    assert!(state.expanded);
    assert_eq!(state.has_children, Some(false));
}

#[tokio::test]
async fn scenario_full_mode_loads_without_expanding_descendants() {
    let (engine, source) = engine_with(ProbeSource::new(dataset()));
    engine.load_roots().await.unwrap();

    engine.expand(&id("P"), ExpandMode::Full).await.unwrap();

    assert_eq!(engine.node_count(), 8);
    assert!(engine.is_expanded(&id("P")));
    assert!(!engine.is_expanded(&id("D1")));
    assert!(engine.expansion_of(&id("M1")).children_loaded);
    // one fetch per non-root node plus the root
    assert_eq!(source.children_calls(), 8);

    engine.expand(&id("D1"), ExpandMode::Shallow).await.unwrap();
    assert_eq!(source.children_calls(), 8);
}

#[tokio::test]
async fn scenario_auto_expand_respects_user_collapse() {
    let (engine, source) = engine_with(ProbeSource::new(dataset()));
    engine.load_roots().await.unwrap();

    engine.collapse(&id("P")).unwrap();
    assert!(!engine.auto_expand(&id("P")).await.unwrap());
    assert_eq!(source.children_calls(), 0);

    engine.expand(&id("P"), ExpandMode::Shallow).await.unwrap();
    assert!(engine.is_expanded(&id("P")));
}

#[tokio::test]
async fn scenario_auto_expand_roots_opens_untouched_roots() {
    let (engine, _) = engine_with(ProbeSource::new(dataset()));
    engine.load_roots().await.unwrap();

    assert_eq!(engine.auto_expand_roots().await.unwrap(), 1);
    assert!(engine.is_expanded(&id("P")));

    engine.collapse(&id("P")).unwrap();
    assert_eq!(engine.auto_expand_roots().await.unwrap(), 0);
    assert!(!engine.is_expanded(&id("P")));
}

#[tokio::test]
async fn scenario_expand_unknown_node_is_not_found() {
    let (engine, source) = engine_with(ProbeSource::new(dataset()));
    engine.load_roots().await.unwrap();

    let err = engine.expand(&id("M1"), ExpandMode::Shallow).await.unwrap_err();
    assert!(matches!(err, LocusError::NotFound { .. }));
    assert_eq!(source.children_calls(), 0);
}
