//! Selection propagator
//!
//! Holds the set of selected location ids and derives tri-state display
//! state from the loaded hierarchy. Selection is exact over concrete ids:
//! a selected ancestor never implies anything about children that are not
//! loaded yet, which is why subtree toggles load the full subtree first.

use std::collections::{BTreeSet, HashMap};

use crate::domain::entities::LocationStore;
use crate::domain::value_objects::{LocationId, SelectionState};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    selected: BTreeSet<LocationId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_ids(ids: impl IntoIterator<Item = LocationId>) -> Self {
        Self {
            selected: ids.into_iter().collect(),
        }
    }

    pub fn ids(&self) -> &BTreeSet<LocationId> {
        &self.selected
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    pub fn is_selected(&self, id: &LocationId) -> bool {
        self.selected.contains(id)
    }

    /// Toggle a single node without touching its children
    ///
    /// Deselecting also drops every selected ancestor: an ancestor in the set
    /// claims its whole subtree, which no longer holds.
    /// Returns the new membership of `id`.
    pub fn toggle(&mut self, id: &LocationId, store: &LocationStore) -> bool {
        if self.selected.remove(id) {
            for ancestor in store.ancestors(id) {
                self.selected.remove(&ancestor);
            }
            false
        } else {
            self.selected.insert(id.clone());
            true
        }
    }

    /// Select `id` and all of its loaded descendants
    pub fn select_subtree(&mut self, id: &LocationId, store: &LocationStore) {
        self.selected.extend(store.subtree(id));
    }

    /// Deselect `id` and all of its loaded descendants
    pub fn deselect_subtree(&mut self, id: &LocationId, store: &LocationStore) {
        for member in store.subtree(id) {
            self.selected.remove(&member);
        }
    }

    /// True when `id` and every loaded descendant are selected
    pub fn is_subtree_selected(&self, id: &LocationId, store: &LocationStore) -> bool {
        store.subtree(id).iter().all(|m| self.selected.contains(m))
    }

    /// Select the subtree unless it is already fully selected, then deselect it
    ///
    /// Ancestors are left alone so that two calls in a row on a uniformly
    /// selected or unselected subtree restore the original set.
    /// Returns true if the subtree ended up selected.
    pub fn toggle_subtree(&mut self, id: &LocationId, store: &LocationStore) -> bool {
        if self.is_subtree_selected(id, store) {
            self.deselect_subtree(id, store);
            false
        } else {
            self.select_subtree(id, store);
            true
        }
    }

    /// Not selected, with at least one loaded child selected or indeterminate
    ///
    /// "Any", not "some but not all": an unselected parent of fully selected
    /// children still reads as partial, since selecting children never
    /// selects the parent.
    pub fn is_indeterminate(&self, id: &LocationId, store: &LocationStore) -> bool {
        if self.selected.contains(id) {
            return false;
        }
        store
            .children_of(id)
            .any(|child| self.selected.contains(child) || self.is_indeterminate(child, store))
    }

    pub fn state_of(&self, id: &LocationId, store: &LocationStore) -> SelectionState {
        if self.selected.contains(id) {
            SelectionState::Selected
        } else if self.is_indeterminate(id, store) {
            SelectionState::Indeterminate
        } else {
            SelectionState::Unselected
        }
    }

    /// State of every loaded node, computed bottom-up in one pass
    pub fn states(&self, store: &LocationStore) -> HashMap<LocationId, SelectionState> {
        let mut states = HashMap::with_capacity(store.len());
        for root in store.roots() {
            self.fill_states(&root.id, store, &mut states);
        }
        states
    }

    fn fill_states(
        &self,
        id: &LocationId,
        store: &LocationStore,
        states: &mut HashMap<LocationId, SelectionState>,
    ) -> SelectionState {
        let mut any_marked = false;
        for child in store.children_of(id) {
            if self.fill_states(child, store, states).is_marked() {
                any_marked = true;
            }
        }

        let state = if self.selected.contains(id) {
            SelectionState::Selected
        } else if any_marked {
            SelectionState::Indeterminate
        } else {
            SelectionState::Unselected
        };
        states.insert(id.clone(), state);
        state
    }

    /// Drop ids that are no longer present in the store
    pub fn retain_known(&mut self, store: &LocationStore) -> usize {
        let before = self.selected.len();
        self.selected.retain(|id| store.contains(id));
        before - self.selected.len()
    }
}
