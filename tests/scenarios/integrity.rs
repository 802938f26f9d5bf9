//! Deletion checks for locations and coverage areas

use locus::application::DeleteConfirmation;
use locus::domain::ports::LocationDataSource;
use locus::error::DeletionTarget;
use locus::{CoverageAreaId, ExpandMode, LocusError};

use crate::common::*;

#[tokio::test]
async fn scenario_deleting_district_with_children_is_blocked() {
    let (engine, source) = engine_with(ProbeSource::new(dataset()));
    engine.load_tree().await.unwrap();

    let err = engine.delete_location(&id("D1")).await.unwrap_err();
    match err {
        LocusError::IntegrityViolation {
            target,
            blocking_ids,
            ..
        } => {
            assert_eq!(target, DeletionTarget::Location(id("D1")));
            assert!(blocking_ids.contains(&"M1".to_string()));
        }
        other => panic!("expected IntegrityViolation, got {other:?}"),
    }
    assert!(engine.node(&id("D1")).is_some());
    assert_eq!(source.inner.dataset().locations.len(), 8);
}

#[tokio::test]
async fn scenario_unexpanded_node_with_hidden_children_is_blocked() {
    let (engine, source) = engine_with(ProbeSource::new(dataset()));
    engine.load_roots().await.unwrap();
    engine.expand(&id("P"), ExpandMode::Shallow).await.unwrap();
    assert!(engine.children(&id("D2")).is_empty());

    let check = engine.can_delete_location(&id("D2")).await.unwrap();

    assert!(!check.ok);
    assert_eq!(check.blocking_descendants, vec![id("M3")]);
    assert_eq!(source.children_calls(), 2);
    assert!(!engine.is_expanded(&id("D2")));
}

#[tokio::test]
async fn scenario_location_in_active_area_is_blocked() {
    let (engine, _) = engine_with(ProbeSource::new(dataset()));
    engine.load_tree().await.unwrap();

    let check = engine.can_delete_location(&id("M2")).await.unwrap();
    assert!(!check.ok);
    assert!(check.blocking_descendants.is_empty());
    assert_eq!(
        check.referencing_areas,
        vec![CoverageAreaId::from("CA1"), CoverageAreaId::from("CA2")]
    );
}

#[tokio::test]
async fn scenario_free_leaf_is_deleted_everywhere() {
    let (engine, source) = engine_with(ProbeSource::new(dataset()));
    engine.load_tree().await.unwrap();
    engine.toggle(&id("B2")).unwrap();

    engine.delete_location(&id("B2")).await.unwrap();

    assert!(engine.node(&id("B2")).is_none());
    assert!(!engine.is_selected(&id("B2")));
    assert_eq!(engine.children(&id("M1")).len(), 1);
    assert!(source
        .inner
        .dataset()
        .locations
        .iter()
        .all(|n| n.id != id("B2")));
}

#[tokio::test]
async fn scenario_area_with_active_users_needs_force() {
    let (engine, source) = engine_with(ProbeSource::new(dataset()));
    let ca1 = CoverageAreaId::from("CA1");

    let err = engine
        .delete_coverage_area(&ca1, DeleteConfirmation::Normal)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        LocusError::IntegrityViolation {
            active_assignments: 1,
            ..
        }
    ));
    assert!(source.get_coverage_area_users(&ca1).await.is_ok());

    let check = engine
        .delete_coverage_area(&ca1, DeleteConfirmation::Force)
        .await
        .unwrap();
    assert_eq!(check.active_assignment_count, 1);

    let data = source.inner.dataset();
    assert!(data.coverage_areas.iter().all(|a| a.id != ca1));
    assert!(data.assignments.iter().all(|a| a.coverage_area_id != ca1));
}

#[tokio::test]
async fn scenario_area_with_only_inactive_users_deletes_normally() {
    let (engine, _) = engine_with(ProbeSource::new(dataset()));
    let ca2 = CoverageAreaId::from("CA2");

    let check = engine.can_delete_coverage_area(&ca2).await.unwrap();
    assert!(check.ok);
    assert_eq!(check.total_assignment_count, 1);

    engine
        .delete_coverage_area(&ca2, DeleteConfirmation::Normal)
        .await
        .unwrap();
}

#[tokio::test]
async fn scenario_unknown_area_check_is_not_found() {
    let (engine, _) = engine_with(ProbeSource::new(dataset()));

    let err = engine
        .can_delete_coverage_area(&CoverageAreaId::from("nope"))
        .await
        .unwrap_err();
    assert!(matches!(err, LocusError::NotFound { .. }));
}

#[tokio::test]
async fn scenario_leaf_blocked_only_while_child_exists() {
    use locus::domain::entities::NewLocation;
    use locus::LocationType;

    let (engine, _) = engine_with(ProbeSource::new(dataset()));
    engine.load_tree().await.unwrap();
    assert!(engine.can_delete_location(&id("B1")).await.unwrap().ok);

    let child = engine
        .create_location(NewLocation::new("Purok 1", LocationType::Custom).under("B1"))
        .await
        .unwrap();
    let check = engine.can_delete_location(&id("B1")).await.unwrap();
    assert!(!check.ok);
    assert_eq!(check.blocking_descendants, vec![child.id.clone()]);

    engine.delete_location(&child.id).await.unwrap();
    assert!(engine.can_delete_location(&id("B1")).await.unwrap().ok);
}
