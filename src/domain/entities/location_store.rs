//! LocationNode store
//!
//! Flat set of location records plus the derived parent → children index.
//! This is the single owned index the rest of the engine queries; every merge
//! or removal bumps `generation` so observers can tell the hierarchy changed.

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

use serde::Serialize;

use crate::domain::entities::LocationNode;
use crate::domain::value_objects::{LocationId, LocationType};
use crate::error::{LocusError, LocusResult};

/// A search match with the names on its path from the root
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    pub id: LocationId,
    pub path: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct LocationStore {
    nodes: HashMap<LocationId, LocationNode>,
    children: HashMap<LocationId, BTreeSet<LocationId>>,
    generation: u64,
}

impl LocationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a full or partial slice of the hierarchy
    pub fn from_nodes(nodes: impl IntoIterator<Item = LocationNode>) -> LocusResult<Self> {
        let mut store = Self::new();
        store.merge(nodes)?;
        Ok(store)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn get(&self, id: &LocationId) -> Option<&LocationNode> {
        self.nodes.get(id)
    }

    pub fn require(&self, id: &LocationId) -> LocusResult<&LocationNode> {
        self.nodes
            .get(id)
            .ok_or_else(|| LocusError::location_not_found(id))
    }

    pub fn contains(&self, id: &LocationId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &LocationNode> {
        self.nodes.values()
    }

    /// Loaded children of `id`, in id order
    pub fn children_of(&self, id: &LocationId) -> impl Iterator<Item = &LocationId> {
        self.children.get(id).into_iter().flatten()
    }

    pub fn child_count(&self, id: &LocationId) -> usize {
        self.children.get(id).map_or(0, BTreeSet::len)
    }

    pub fn parent_of(&self, id: &LocationId) -> Option<&LocationId> {
        self.nodes.get(id).and_then(|n| n.parent_id.as_ref())
    }

    /// Nodes with no parent, or whose parent is not loaded
    pub fn roots(&self) -> Vec<&LocationNode> {
        self.nodes
            .values()
            .filter(|n| match &n.parent_id {
                None => true,
                Some(parent) => !self.nodes.contains_key(parent),
            })
            .collect()
    }

    /// Loaded ancestors of `id`, nearest first
    pub fn ancestors(&self, id: &LocationId) -> Vec<LocationId> {
        let mut result = Vec::new();
        let mut seen = HashSet::new();
        seen.insert(id.clone());

        let mut current = self.parent_of(id);
        while let Some(parent) = current {
            if !self.nodes.contains_key(parent) || !seen.insert(parent.clone()) {
                break;
            }
            result.push(parent.clone());
            current = self.parent_of(parent);
        }
        result
    }

    /// Loaded descendants of `id` in breadth-first order, excluding `id`
    pub fn descendants(&self, id: &LocationId) -> Vec<LocationId> {
        let mut result = Vec::new();
        let mut seen = HashSet::new();
        seen.insert(id.clone());

        let mut queue: VecDeque<&LocationId> = self.children_of(id).collect();
        while let Some(next) = queue.pop_front() {
            if !seen.insert(next.clone()) {
                continue;
            }
            result.push(next.clone());
            queue.extend(self.children_of(next));
        }
        result
    }

    /// `id` followed by its loaded descendants
    pub fn subtree(&self, id: &LocationId) -> Vec<LocationId> {
        let mut ids = vec![id.clone()];
        ids.extend(self.descendants(id));
        ids
    }

    /// True when `candidate` sits somewhere below `ancestor`
    pub fn is_descendant(&self, candidate: &LocationId, ancestor: &LocationId) -> bool {
        self.ancestors(candidate).iter().any(|a| a == ancestor)
    }

    pub fn province_of(&self, id: &LocationId) -> Option<&LocationNode> {
        std::iter::once(id.clone())
            .chain(self.ancestors(id))
            .filter_map(|a| self.nodes.get(&a))
            .find(|n| n.location_type == LocationType::Province)
    }

    /// All loaded nodes of one level, sorted by name
    pub fn nodes_of_type(&self, ty: LocationType) -> Vec<&LocationNode> {
        let mut nodes: Vec<_> = self
            .nodes
            .values()
            .filter(|n| n.location_type == ty)
            .collect();
        nodes.sort_by(|a, b| name_order(a, b));
        nodes
    }

    /// Case-insensitive name or code search over loaded nodes
    pub fn search(&self, term: &str) -> Vec<SearchHit> {
        let needle = term.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }

        let mut matches: Vec<&LocationNode> = self
            .nodes
            .values()
            .filter(|n| {
                n.name.to_lowercase().contains(&needle)
                    || n
                        .code
                        .as_deref()
                        .is_some_and(|c| c.to_lowercase().contains(&needle))
            })
            .collect();
        matches.sort_by(|a, b| name_order(a, b));

        matches
            .into_iter()
            .map(|n| {
                let mut path: Vec<String> = self
                    .ancestors(&n.id)
                    .iter()
                    .rev()
                    .filter_map(|a| self.nodes.get(a).map(|p| p.name.clone()))
                    .collect();
                path.push(n.name.clone());
                SearchHit {
                    id: n.id.clone(),
                    path,
                }
            })
            .collect()
    }

    /// Upsert a batch of nodes, atomically
    ///
    /// Returns the number of nodes that were new or changed. If the batch
    /// would close a parent cycle the store is left untouched and
    /// `CycleDetected` is returned.
    pub fn merge(&mut self, nodes: impl IntoIterator<Item = LocationNode>) -> LocusResult<usize> {
        let mut previous: Vec<(LocationId, Option<LocationNode>)> = Vec::new();
        let mut changed = 0;

        for node in nodes {
            if self.nodes.get(&node.id) == Some(&node) {
                continue;
            }
            let id = node.id.clone();
            let old = self.upsert(node);
            previous.push((id, old));
            changed += 1;
        }

        for (id, _) in &previous {
            if let Some(cycle) = self.cycle_through(id) {
                for (id, old) in previous.into_iter().rev() {
                    self.restore(id, old);
                }
                return Err(LocusError::CycleDetected { ids: cycle });
            }
        }

        if changed > 0 {
            self.generation += 1;
        }
        Ok(changed)
    }

    /// Remove a node; its loaded children become roots of the slice
    pub fn remove(&mut self, id: &LocationId) -> Option<LocationNode> {
        let node = self.nodes.remove(id)?;
        if let Some(parent) = &node.parent_id {
            self.unlink(parent, id);
        }
        self.generation += 1;
        Some(node)
    }

    /// Drop the cached children of `id` (and their subtrees) ahead of a refetch
    pub fn forget_children(&mut self, id: &LocationId) -> Vec<LocationId> {
        let dropped = self.descendants(id);
        for child in &dropped {
            self.nodes.remove(child);
            self.children.remove(child);
        }
        self.children.remove(id);
        if !dropped.is_empty() {
            self.generation += 1;
        }
        dropped
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.children.clear();
        self.generation += 1;
    }

    fn upsert(&mut self, node: LocationNode) -> Option<LocationNode> {
        let id = node.id.clone();
        let new_parent = node.parent_id.clone();
        let old = self.nodes.insert(id.clone(), node);

        if let Some(old_parent) = old.as_ref().and_then(|o| o.parent_id.clone()) {
            if new_parent.as_ref() != Some(&old_parent) {
                self.unlink(&old_parent, &id);
            }
        }
        if let Some(parent) = new_parent {
            self.children.entry(parent).or_default().insert(id);
        }
        old
    }

    fn restore(&mut self, id: LocationId, old: Option<LocationNode>) {
        if let Some(current) = self.nodes.remove(&id) {
            if let Some(parent) = &current.parent_id {
                self.unlink(parent, &id);
            }
        }
        if let Some(old) = old {
            self.upsert(old);
        }
    }

    fn unlink(&mut self, parent: &LocationId, child: &LocationId) {
        if let Some(siblings) = self.children.get_mut(parent) {
            siblings.remove(child);
            if siblings.is_empty() {
                self.children.remove(parent);
            }
        }
    }

    /// Walk parent pointers from `start`; returns the loop if one is found
    fn cycle_through(&self, start: &LocationId) -> Option<Vec<LocationId>> {
        let mut path = vec![start.clone()];
        let mut current = self.parent_of(start);
        while let Some(parent) = current {
            if let Some(pos) = path.iter().position(|p| p == parent) {
                return Some(path.split_off(pos));
            }
            if !self.nodes.contains_key(parent) {
                return None;
            }
            path.push(parent.clone());
            current = self.parent_of(parent);
        }
        None
    }
}

/// Case-insensitive name order with id as tie-break
pub(crate) fn name_order(a: &LocationNode, b: &LocationNode) -> std::cmp::Ordering {
    a.name
        .to_lowercase()
        .cmp(&b.name.to_lowercase())
        .then_with(|| a.id.cmp(&b.id))
}
