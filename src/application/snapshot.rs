//! Render-ready views of the session state

use serde::Serialize;

use crate::domain::entities::LocationNode;
use crate::domain::ports::LocationDataSource;
use crate::domain::services::{build_forest, TreeNode};
use crate::domain::value_objects::{LocationId, LocationType, SelectionState};
use crate::error::LocusResult;

use super::engine::{EngineState, LocationEngine};

/// One node of the loaded forest with its UI state attached
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNodeView {
    pub node: LocationNode,
    pub expanded: bool,
    pub loading: bool,
    /// `None` while it is unknown whether the node has children
    pub has_children: Option<bool>,
    pub selection: SelectionState,
    pub children: Vec<TreeNodeView>,
}

/// A row of the tree as it appears on screen (collapsed subtrees omitted)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisibleRow {
    pub id: LocationId,
    pub name: String,
    pub location_type: LocationType,
    pub depth: usize,
    pub is_active: bool,
    pub expanded: bool,
    pub loading: bool,
    pub has_children: Option<bool>,
    /// Loaded child count; zero until children are fetched
    pub child_count: usize,
    pub selection: SelectionState,
}

impl<S> LocationEngine<S>
where
    S: LocationDataSource + ?Sized + 'static,
{
    /// The loaded forest with expansion and selection state per node
    pub fn snapshot(&self) -> LocusResult<Vec<TreeNodeView>> {
        let state = self.lock();
        let forest = build_forest(state.store.nodes())?;
        Ok(forest.roots.iter().map(|root| view_of(&state, root)).collect())
    }

    /// Rows reachable through expanded nodes, in display order
    pub fn visible_rows(&self) -> LocusResult<Vec<VisibleRow>> {
        let views = self.snapshot()?;
        let mut rows = Vec::new();
        for view in &views {
            flatten_visible(view, 0, &mut rows);
        }
        Ok(rows)
    }
}

fn view_of(state: &EngineState, tree: &TreeNode) -> TreeNodeView {
    let id = tree.id();
    let expansion = state.expansion.get(id).copied().unwrap_or_default();
    let has_children = if tree.children.is_empty() {
        expansion.has_children
    } else {
        Some(true)
    };

    TreeNodeView {
        node: tree.node.clone(),
        expanded: expansion.expanded,
        loading: expansion.loading,
        has_children,
        selection: state.selection.state_of(id, &state.store),
        children: tree.children.iter().map(|c| view_of(state, c)).collect(),
    }
}

fn flatten_visible(view: &TreeNodeView, depth: usize, rows: &mut Vec<VisibleRow>) {
    rows.push(VisibleRow {
        id: view.node.id.clone(),
        name: view.node.name.clone(),
        location_type: view.node.location_type,
        depth,
        is_active: view.node.is_active,
        expanded: view.expanded,
        loading: view.loading,
        has_children: view.has_children,
        child_count: view.children.len(),
        selection: view.selection,
    });

    if view.expanded {
        for child in &view.children {
            flatten_visible(child, depth + 1, rows);
        }
    }
}
