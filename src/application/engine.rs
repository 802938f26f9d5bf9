//! Location engine
//!
//! Owns the session state (store, expansion, selection, coverage cache) and
//! the data source. All methods take `&self`; state sits behind one mutex
//! that is never held across an `.await`.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info};

use crate::config::Config;
use crate::domain::entities::{LocationNode, LocationStore, SearchHit, Selection};
use crate::domain::ports::{LocationDataSource, LocationFilter};
use crate::domain::value_objects::{CoverageAreaId, LocationId, LocationType, SelectionState};
use crate::error::{LocusError, LocusResult};

use super::coverage::CoverageCatalog;
use super::expansion::{NodeExpansion, SharedFetch};

/// Tunables for one engine session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOptions {
    /// Keep inactive units when loading the tree
    pub include_inactive: bool,
    /// Levels a full expansion walks before giving up
    pub max_depth: usize,
    /// Restrict coverage-area candidates to one organization
    pub organization_id: Option<String>,
    /// Keep candidate areas for the session instead of refetching per query
    pub cache_candidates: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            include_inactive: false,
            max_depth: 16,
            organization_id: None,
            cache_candidates: true,
        }
    }
}

impl EngineOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            include_inactive: config.tree.include_inactive,
            max_depth: config.tree.max_depth,
            organization_id: config.matcher.organization_id.clone(),
            cache_candidates: config.matcher.cache_candidates,
        }
    }
}

#[derive(Default)]
pub(super) struct EngineState {
    pub(super) store: LocationStore,
    pub(super) expansion: HashMap<LocationId, NodeExpansion>,
    pub(super) selection: Selection,
    pub(super) in_flight: HashMap<LocationId, SharedFetch>,
    pub(super) catalog: CoverageCatalog,
    pub(super) adopted: BTreeSet<CoverageAreaId>,
}

impl EngineState {
    /// Drop expansion and selection entries for ids no longer in the store
    pub(super) fn prune(&mut self) {
        let store = &self.store;
        self.expansion.retain(|id, _| store.contains(id));
        let dropped = self.selection.retain_known(store);
        if dropped > 0 {
            debug!(dropped, "selection pruned after store change");
        }
    }

    /// Record authoritative child presence for every node in the store
    pub(super) fn mark_all_loaded(&mut self) {
        let ids: Vec<LocationId> = self.store.nodes().map(|n| n.id.clone()).collect();
        for id in ids {
            let has_children = self.store.child_count(&id) > 0;
            let entry = self.expansion.entry(id).or_default();
            entry.children_loaded = true;
            entry.has_children = Some(has_children);
        }
    }
}

pub(super) fn lock_state(state: &Mutex<EngineState>) -> MutexGuard<'_, EngineState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Session facade over the hierarchy, its selection and coverage matching
///
/// Generic over the data source; `LocationEngine<dyn LocationDataSource>`
/// works when the source is chosen at runtime.
pub struct LocationEngine<S: ?Sized = dyn LocationDataSource> {
    pub(super) source: Arc<S>,
    pub(super) state: Arc<Mutex<EngineState>>,
    pub(super) options: EngineOptions,
}

impl<S> LocationEngine<S>
where
    S: LocationDataSource + 'static,
{
    pub fn new(source: S) -> Self {
        Self::with_options(Arc::new(source), EngineOptions::default())
    }
}

impl<S> LocationEngine<S>
where
    S: LocationDataSource + ?Sized + 'static,
{
    pub fn with_options(source: Arc<S>, options: EngineOptions) -> Self {
        Self {
            source,
            state: Arc::new(Mutex::new(EngineState::default())),
            options,
        }
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    pub fn source(&self) -> &Arc<S> {
        &self.source
    }

    pub(super) fn lock(&self) -> MutexGuard<'_, EngineState> {
        lock_state(&self.state)
    }

    /// Fetch the whole hierarchy in one call and replace the store
    ///
    /// Every node counts as loaded afterwards. A cyclic payload is rejected
    /// and the previous store kept.
    pub async fn load_tree(&self) -> LocusResult<usize> {
        let nodes = self
            .source
            .get_location_tree(self.options.include_inactive)
            .await
            .map_err(|e| LocusError::fetch_failed("loading location tree", e))?;
        let store = LocationStore::from_nodes(nodes)?;

        let mut state = self.lock();
        state.store = store;
        state.expansion.clear();
        state.mark_all_loaded();
        state.prune();
        let count = state.store.len();
        info!(count, "location tree loaded");
        Ok(count)
    }

    /// Fetch only the top level for lazy browsing
    pub async fn load_roots(&self) -> LocusResult<usize> {
        let filter = LocationFilter {
            location_type: Some(LocationType::Province),
            is_active: (!self.options.include_inactive).then_some(true),
            search: None,
        };
        let roots = self
            .source
            .list_locations(&filter)
            .await
            .map_err(|e| LocusError::fetch_failed("loading top-level locations", e))?;

        let mut state = self.lock();
        let count = roots.len();
        state.store.merge(roots)?;
        info!(count, "top-level locations loaded");
        Ok(count)
    }

    /// Seed the store directly, e.g. from a prefetched slice
    pub fn insert_nodes(&self, nodes: impl IntoIterator<Item = LocationNode>) -> LocusResult<usize> {
        self.lock().store.merge(nodes)
    }

    pub fn node(&self, id: &LocationId) -> Option<LocationNode> {
        self.lock().store.get(id).cloned()
    }

    pub fn node_count(&self) -> usize {
        self.lock().store.len()
    }

    /// Direct children currently in the store, in display order
    pub fn children(&self, id: &LocationId) -> Vec<LocationNode> {
        let state = self.lock();
        let mut children: Vec<LocationNode> = state
            .store
            .children_of(id)
            .filter_map(|c| state.store.get(c).cloned())
            .collect();
        children.sort_by(crate::domain::entities::name_order);
        children
    }

    pub fn ancestors(&self, id: &LocationId) -> Vec<LocationId> {
        self.lock().store.ancestors(id)
    }

    pub fn search(&self, term: &str) -> Vec<SearchHit> {
        self.lock().store.search(term)
    }

    /// Run a read-only closure against the store
    pub fn with_store<R>(&self, f: impl FnOnce(&LocationStore) -> R) -> R {
        f(&self.lock().store)
    }

    // Selection

    /// Toggle one node; deselecting also clears every selected ancestor
    pub fn toggle(&self, id: &LocationId) -> LocusResult<bool> {
        let mut state = self.lock();
        state.store.require(id)?;
        let EngineState {
            store, selection, ..
        } = &mut *state;
        Ok(selection.toggle(id, store))
    }

    /// Select or deselect a node with its whole subtree
    ///
    /// The subtree is loaded first so unloaded descendants are included.
    pub async fn toggle_subtree(&self, id: &LocationId) -> LocusResult<bool> {
        self.load_subtree(id).await?;
        let mut state = self.lock();
        let EngineState {
            store, selection, ..
        } = &mut *state;
        Ok(selection.toggle_subtree(id, store))
    }

    pub async fn select_subtree(&self, id: &LocationId) -> LocusResult<()> {
        self.load_subtree(id).await?;
        let mut state = self.lock();
        let EngineState {
            store, selection, ..
        } = &mut *state;
        selection.select_subtree(id, store);
        Ok(())
    }

    pub fn deselect_subtree(&self, id: &LocationId) -> LocusResult<()> {
        let mut state = self.lock();
        state.store.require(id)?;
        let EngineState {
            store, selection, ..
        } = &mut *state;
        selection.deselect_subtree(id, store);
        Ok(())
    }

    /// Replace the selection wholesale, e.g. when editing an existing area
    pub fn set_selection(&self, ids: impl IntoIterator<Item = LocationId>) {
        let mut state = self.lock();
        state.selection = Selection::from_ids(ids);
    }

    pub fn clear_selection(&self) {
        let mut state = self.lock();
        state.selection.clear();
        state.adopted.clear();
    }

    pub fn is_selected(&self, id: &LocationId) -> bool {
        self.lock().selection.is_selected(id)
    }

    pub fn is_indeterminate(&self, id: &LocationId) -> bool {
        let state = self.lock();
        state.selection.is_indeterminate(id, &state.store)
    }

    pub fn selection_state(&self, id: &LocationId) -> SelectionState {
        let state = self.lock();
        state.selection.state_of(id, &state.store)
    }

    pub fn selected_ids(&self) -> BTreeSet<LocationId> {
        self.lock().selection.ids().clone()
    }
}
