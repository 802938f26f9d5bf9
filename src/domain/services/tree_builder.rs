//! Tree builder service
//!
//! Turns a flat, possibly partial list of location records into a rooted
//! forest. Pure: no store access, no I/O.
//!
//! Two passes over the input (index by id, then link to parents), then a
//! per-level sort by case-insensitive name. Nodes whose parent is not in the
//! slice become roots of the slice. Anything left unreachable from a root is
//! sitting on a parent cycle, which is reported instead of looped over.

use std::collections::{HashMap, HashSet};

use crate::domain::entities::{name_order, LocationNode};
use crate::domain::value_objects::LocationId;
use crate::error::{LocusError, LocusResult};

/// A location with its loaded children, sorted by name
#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode {
    pub node: LocationNode,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn id(&self) -> &LocationId {
        &self.node.id
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of nodes in this subtree, including self
    pub fn total_count(&self) -> usize {
        1 + self.children.iter().map(TreeNode::total_count).sum::<usize>()
    }

    fn collect_preorder<'a>(&'a self, out: &mut Vec<&'a LocationNode>) {
        out.push(&self.node);
        for child in &self.children {
            child.collect_preorder(out);
        }
    }

    fn find(&self, id: &LocationId) -> Option<&TreeNode> {
        if &self.node.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(id))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Forest {
    pub roots: Vec<TreeNode>,
}

impl Forest {
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Total node count
    pub fn len(&self) -> usize {
        self.roots.iter().map(TreeNode::total_count).sum()
    }

    /// Nodes in pre-order (parent before children, siblings by name)
    pub fn flatten(&self) -> Vec<&LocationNode> {
        let mut out = Vec::new();
        for root in &self.roots {
            root.collect_preorder(&mut out);
        }
        out
    }

    pub fn find(&self, id: &LocationId) -> Option<&TreeNode> {
        self.roots.iter().find_map(|r| r.find(id))
    }
}

/// Build a sorted forest from a flat slice
///
/// Duplicate ids keep the last record. Returns `CycleDetected` when parent
/// pointers loop.
pub fn build_forest<'a>(nodes: impl IntoIterator<Item = &'a LocationNode>) -> LocusResult<Forest> {
    // Pass 1: index
    let mut index: HashMap<&LocationId, &LocationNode> = HashMap::new();
    for node in nodes {
        index.insert(&node.id, node);
    }

    // Pass 2: link
    let mut children: HashMap<&LocationId, Vec<&LocationNode>> = HashMap::new();
    let mut roots: Vec<&LocationNode> = Vec::new();
    for node in index.values().copied() {
        match &node.parent_id {
            Some(parent) if index.contains_key(parent) => {
                children.entry(parent).or_default().push(node);
            }
            _ => roots.push(node),
        }
    }

    roots.sort_by(|a, b| name_order(a, b));
    for siblings in children.values_mut() {
        siblings.sort_by(|a, b| name_order(a, b));
    }

    let mut built = 0usize;
    let forest = Forest {
        roots: roots
            .into_iter()
            .map(|root| assemble(root, &children, &mut built))
            .collect(),
    };

    if built < index.len() {
        return Err(LocusError::CycleDetected {
            ids: find_cycle(&index, &forest),
        });
    }

    Ok(forest)
}

fn assemble(
    node: &LocationNode,
    children: &HashMap<&LocationId, Vec<&LocationNode>>,
    built: &mut usize,
) -> TreeNode {
    *built += 1;
    let kids = children
        .get(&node.id)
        .map(|kids| {
            kids.iter()
                .map(|child| assemble(child, children, built))
                .collect()
        })
        .unwrap_or_default();
    TreeNode {
        node: node.clone(),
        children: kids,
    }
}

/// Every unreachable node's parent chain ends in a loop; return that loop
fn find_cycle(index: &HashMap<&LocationId, &LocationNode>, forest: &Forest) -> Vec<LocationId> {
    let reached: HashSet<&LocationId> = forest.flatten().into_iter().map(|n| &n.id).collect();
    let Some(start) = index
        .keys()
        .filter(|id| !reached.contains(*id))
        .min()
        .copied()
    else {
        return Vec::new();
    };

    let mut path: Vec<&LocationId> = vec![start];
    let mut current = index.get(start).and_then(|n| n.parent_id.as_ref());
    while let Some(parent) = current {
        if let Some(pos) = path.iter().position(|p| *p == parent) {
            return path[pos..].iter().map(|id| (*id).clone()).collect();
        }
        let Some(next) = index.get(parent) else {
            break;
        };
        path.push(&next.id);
        current = next.parent_id.as_ref();
    }
    path.into_iter().cloned().collect()
}
