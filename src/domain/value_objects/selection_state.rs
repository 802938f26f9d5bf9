//! Tri-state selection value

use serde::{Deserialize, Serialize};

/// Selection state of a node as shown by a tree selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SelectionState {
    /// The node itself is in the selection set (●)
    Selected,
    /// Neither the node nor any loaded descendant is selected (○)
    #[default]
    Unselected,
    /// Not selected, but some loaded descendant is (◐)
    Indeterminate,
}

impl SelectionState {
    pub fn is_selected(&self) -> bool {
        matches!(self, SelectionState::Selected)
    }

    /// Selected or indeterminate: the node "carries" selection upwards
    pub fn is_marked(&self) -> bool {
        !matches!(self, SelectionState::Unselected)
    }
}
