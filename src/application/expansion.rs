//! Lazy expansion controller
//!
//! Per-node state machine `collapsed → loading → expanded` and back. Child
//! fetches run on their own tokio task and are shared by node id, so every
//! caller asking for the same node while a request is in flight waits on
//! that one request. The task merges the result exactly once, even if every
//! waiter was dropped; a dropped `expand` only withdraws its request to open
//! the node.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use futures::future::{try_join_all, BoxFuture, FutureExt, Shared};
use tracing::{debug, warn};

use crate::domain::entities::LocationNode;
use crate::domain::ports::{LocationDataSource, SourceError};
use crate::domain::value_objects::{ExpandMode, LocationId};
use crate::error::{LocusError, LocusResult};

use super::engine::{lock_state, EngineState, LocationEngine};

/// Where a node sits in its expansion lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpansionPhase {
    Collapsed,
    Loading,
    Expanded,
}

/// Expansion bookkeeping for one node
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NodeExpansion {
    pub expanded: bool,
    /// A child fetch for this node is in flight
    pub loading: bool,
    /// Children were fetched successfully at least once
    pub children_loaded: bool,
    /// `None` until a fetch succeeds; a failed fetch never records `false`
    pub has_children: Option<bool>,
    /// The user collapsed this node; auto-expansion leaves it alone
    pub user_collapsed: bool,
    /// `expand` calls still waiting on the in-flight fetch
    pub(super) pending_expands: u32,
}

impl NodeExpansion {
    pub fn phase(&self) -> ExpansionPhase {
        if self.expanded {
            ExpansionPhase::Expanded
        } else if self.loading && self.pending_expands > 0 {
            ExpansionPhase::Loading
        } else {
            ExpansionPhase::Collapsed
        }
    }

    /// Never loaded and never touched by the user
    pub fn is_untouched(&self) -> bool {
        self.has_children.is_none() && !self.children_loaded && !self.user_collapsed && !self.expanded
    }
}

/// Failure carried by a shared fetch; cloned out to every waiter
#[derive(Debug, Clone)]
pub(super) enum FetchFailure {
    Source(SourceError),
    Cycle(Vec<LocationId>),
    /// The fetch task panicked or was aborted
    Task(String),
}

pub(super) type SharedFetch = Shared<BoxFuture<'static, Result<usize, FetchFailure>>>;

impl<S> LocationEngine<S>
where
    S: LocationDataSource + ?Sized + 'static,
{
    /// Expand a node, fetching its children if they were never loaded
    ///
    /// Re-expanding a loaded node does not refetch. `ExpandMode::Full`
    /// additionally loads every descendant (without expanding them).
    pub async fn expand(&self, id: &LocationId, mode: ExpandMode) -> LocusResult<()> {
        let needs_fetch = {
            let mut state = self.lock();
            state.store.require(id)?;
            let entry = state.expansion.entry(id.clone()).or_default();
            entry.user_collapsed = false;

            if entry.expanded && mode == ExpandMode::Shallow {
                return Ok(());
            }
            if entry.children_loaded {
                entry.expanded = true;
                false
            } else {
                entry.pending_expands += 1;
                true
            }
        };

        if needs_fetch {
            let mut waiter = PendingExpand {
                state: &self.state,
                id,
                armed: true,
            };
            let result = self.load_children(id).await;
            waiter.armed = false;
            self.settle_expansion(id, result)?;
        }

        if mode == ExpandMode::Full {
            self.load_subtree(id).await?;
        }
        Ok(())
    }

    fn settle_expansion(&self, id: &LocationId, result: LocusResult<()>) -> LocusResult<()> {
        let mut state = self.lock();
        let entry = state.expansion.entry(id.clone()).or_default();
        // a collapse while loading zeroes the count
        let requested = entry.pending_expands > 0;
        entry.pending_expands = entry.pending_expands.saturating_sub(1);
        match result {
            Ok(()) if requested => entry.expanded = true,
            Ok(()) => debug!(node = %id, "expansion cancelled by collapse; children kept"),
            Err(err) => {
                entry.expanded = false;
                warn!(node = %id, error = %err, "expansion failed; node reverted to collapsed");
                return Err(err);
            }
        }
        Ok(())
    }

    /// Collapse a node, keeping its cached children
    ///
    /// Collapsing while a fetch is in flight cancels the pending expansion.
    pub fn collapse(&self, id: &LocationId) -> LocusResult<()> {
        let mut state = self.lock();
        state.store.require(id)?;
        let entry = state.expansion.entry(id.clone()).or_default();
        entry.expanded = false;
        entry.pending_expands = 0;
        entry.user_collapsed = true;
        Ok(())
    }

    /// Expand only if the node was never loaded nor collapsed by the user
    ///
    /// Returns whether an expansion happened.
    pub async fn auto_expand(&self, id: &LocationId) -> LocusResult<bool> {
        let untouched = {
            let state = self.lock();
            state.store.require(id)?;
            state.expansion.get(id).copied().unwrap_or_default().is_untouched()
        };
        if !untouched {
            return Ok(false);
        }
        self.expand(id, ExpandMode::Shallow).await?;
        Ok(true)
    }

    /// Auto-expand every root of the loaded slice
    pub async fn auto_expand_roots(&self) -> LocusResult<usize> {
        let roots: Vec<LocationId> = {
            let state = self.lock();
            state.store.roots().into_iter().map(|n| n.id.clone()).collect()
        };
        let expanded = try_join_all(roots.iter().map(|id| self.auto_expand(id))).await?;
        Ok(expanded.into_iter().filter(|e| *e).count())
    }

    pub fn expansion_of(&self, id: &LocationId) -> NodeExpansion {
        self.lock().expansion.get(id).copied().unwrap_or_default()
    }

    pub fn is_expanded(&self, id: &LocationId) -> bool {
        self.expansion_of(id).expanded
    }

    /// Make sure the direct children of `id` are in the store
    ///
    /// Coalesces with any fetch already in flight for `id`.
    pub async fn load_children(&self, id: &LocationId) -> LocusResult<()> {
        let fetch = {
            let mut state = self.lock();
            state.store.require(id)?;
            if state.expansion.get(id).is_some_and(|e| e.children_loaded) {
                return Ok(());
            }
            match state.in_flight.get(id) {
                Some(shared) => {
                    debug!(node = %id, "joining in-flight child fetch");
                    shared.clone()
                }
                None => {
                    let shared = self.children_fetch(id.clone());
                    state.in_flight.insert(id.clone(), shared.clone());
                    state.expansion.entry(id.clone()).or_default().loading = true;
                    shared
                }
            }
        };

        match fetch.await {
            Ok(_) => Ok(()),
            Err(FetchFailure::Source(source)) => Err(LocusError::fetch_failed(
                format!("loading children of '{}'", id),
                source,
            )),
            Err(FetchFailure::Cycle(ids)) => Err(LocusError::CycleDetected { ids }),
            Err(FetchFailure::Task(reason)) => Err(LocusError::fetch_failed(
                format!("loading children of '{}'", id),
                SourceError::Unavailable(reason),
            )),
        }
    }

    /// Load every descendant of `id`, level by level
    ///
    /// At most `max_depth` rounds of child fetches. Running out of rounds
    /// while some frontier node may still have children is an error rather
    /// than a partial subtree.
    pub async fn load_subtree(&self, id: &LocationId) -> LocusResult<()> {
        let mut seen: HashSet<LocationId> = HashSet::from([id.clone()]);
        let mut frontier = vec![id.clone()];
        let mut depth = 0;

        while !frontier.is_empty() {
            if depth >= self.options.max_depth {
                let state = self.lock();
                let unexplored = frontier.iter().any(|node| {
                    !state.expansion.get(node).is_some_and(|e| e.children_loaded)
                        || state.store.child_count(node) > 0
                });
                if unexplored {
                    warn!(
                        node = %id,
                        max_depth = self.options.max_depth,
                        "subtree deeper than max depth"
                    );
                    return Err(LocusError::DepthLimitExceeded {
                        id: id.clone(),
                        max_depth: self.options.max_depth,
                    });
                }
                break;
            }
            try_join_all(frontier.iter().map(|node| self.load_children(node))).await?;

            frontier = {
                let state = self.lock();
                frontier
                    .iter()
                    .flat_map(|node| state.store.children_of(node))
                    .filter(|child| seen.insert((*child).clone()))
                    .cloned()
                    .collect()
            };
            depth += 1;
        }
        Ok(())
    }

    fn children_fetch(&self, id: LocationId) -> SharedFetch {
        let source = Arc::clone(&self.source);
        let shared_state = Arc::clone(&self.state);
        let task_state = Arc::clone(&self.state);
        let task_id = id.clone();

        let task = tokio::spawn(async move {
            debug!(node = %task_id, "fetching children");
            let result = source.get_children(&task_id).await;
            merge_children(&task_state, &task_id, result)
        });

        async move {
            match task.await {
                Ok(outcome) => outcome,
                Err(err) => {
                    let mut state = lock_state(&shared_state);
                    state.in_flight.remove(&id);
                    state.expansion.entry(id.clone()).or_default().loading = false;
                    warn!(node = %id, error = %err, "child fetch task did not finish");
                    Err(FetchFailure::Task(err.to_string()))
                }
            }
        }
        .boxed()
        .shared()
    }
}

fn merge_children(
    shared_state: &Mutex<EngineState>,
    id: &LocationId,
    result: Result<Vec<LocationNode>, SourceError>,
) -> Result<usize, FetchFailure> {
    let mut state = lock_state(shared_state);
    state.in_flight.remove(id);
    state.expansion.entry(id.clone()).or_default().loading = false;

    let children = adopt_children(id, result.map_err(FetchFailure::Source)?);
    let count = children.len();

    if let Err(err) = state.store.merge(children) {
        return Err(match err {
            LocusError::CycleDetected { ids } => FetchFailure::Cycle(ids),
            other => FetchFailure::Source(SourceError::Malformed(other.to_string())),
        });
    }

    let has_children = count > 0 || state.store.child_count(id) > 0;
    let entry = state.expansion.entry(id.clone()).or_default();
    entry.children_loaded = true;
    entry.has_children = Some(has_children);
    debug!(node = %id, count, "children merged");
    Ok(count)
}

/// Fill in the parent pointer some payloads leave out of child listings
pub(super) fn adopt_children(
    parent: &LocationId,
    children: Vec<LocationNode>,
) -> Vec<LocationNode> {
    children
        .into_iter()
        .map(|mut child| {
            child.parent_id.get_or_insert_with(|| parent.clone());
            child
        })
        .collect()
}

/// Withdraws an `expand` request if its future is dropped mid-fetch
struct PendingExpand<'a> {
    state: &'a Mutex<EngineState>,
    id: &'a LocationId,
    armed: bool,
}

impl Drop for PendingExpand<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut state = lock_state(self.state);
        if let Some(entry) = state.expansion.get_mut(self.id) {
            entry.pending_expands = entry.pending_expands.saturating_sub(1);
        }
        debug!(node = %self.id, "expand dropped before its fetch finished");
    }
}
