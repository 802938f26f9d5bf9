//! Property tests for building forests from flat location lists.

use std::collections::HashSet;

use proptest::prelude::*;

use locus::domain::entities::{LocationNode, LocationStore};
use locus::domain::services::{build_forest, TreeNode};
use locus::LocationType;

/// Node `i` points at a parent chosen among `0..i`, or none
fn random_forest() -> impl Strategy<Value = Vec<LocationNode>> {
    proptest::collection::vec((any::<bool>(), any::<prop::sample::Index>()), 1..40).prop_map(
        |links| {
            links
                .into_iter()
                .enumerate()
                .map(|(i, (rooted, pick))| {
                    let node = LocationNode::new(format!("n{i}"), format!("Node {i}"), LocationType::Custom);
                    if i == 0 || rooted {
                        node
                    } else {
                        node.with_parent(format!("n{}", pick.index(i)))
                    }
                })
                .collect()
        },
    )
}

fn collect_ids(tree: &TreeNode, seen: &mut Vec<String>) {
    seen.push(tree.id().to_string());
    for child in &tree.children {
        collect_ids(child, seen);
    }
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: Every node lands in the forest exactly once.
    #[test]
    fn property_forest_contains_each_node_once(nodes in random_forest()) {
        let forest = build_forest(&nodes).unwrap();

        let mut seen = Vec::new();
        for root in &forest.roots {
            collect_ids(root, &mut seen);
        }
        let unique: HashSet<_> = seen.iter().cloned().collect();

        prop_assert_eq!(seen.len(), nodes.len());
        prop_assert_eq!(unique.len(), nodes.len());
    }

    /// PROPERTY: Child links account for every non-root node.
    #[test]
    fn property_child_count_sum_is_nodes_minus_roots(nodes in random_forest()) {
        let forest = build_forest(&nodes).unwrap();
        let child_links: usize = forest.flatten().iter().map(|n| forest.find(&n.id).unwrap().children.len()).sum();
        prop_assert_eq!(child_links, nodes.len() - forest.roots.len());
        prop_assert_eq!(forest.flatten().len(), nodes.len());
    }

    /// PROPERTY: Children sit under the node their parent_id names.
    #[test]
    fn property_children_match_parent_pointers(nodes in random_forest()) {
        let forest = build_forest(&nodes).unwrap();
        for node in &nodes {
            let tree = forest.find(&node.id).unwrap();
            for child in &tree.children {
                prop_assert_eq!(child.node.parent_id.as_ref(), Some(&node.id));
            }
        }
    }

    /// PROPERTY: Siblings are ordered by case-insensitive name.
    #[test]
    fn property_siblings_sorted_by_name(nodes in random_forest()) {
        let forest = build_forest(&nodes).unwrap();
        for node in &nodes {
            let tree = forest.find(&node.id).unwrap();
            let names: Vec<String> = tree.children.iter().map(|c| c.node.name.to_lowercase()).collect();
            let mut sorted = names.clone();
            sorted.sort();
            prop_assert_eq!(names, sorted);
        }
    }

    /// PROPERTY: A node with a child can never be deleted.
    #[test]
    fn property_parent_deletion_always_blocked(nodes in random_forest()) {
        let store = LocationStore::from_nodes(nodes.clone()).unwrap();
        for node in &nodes {
            let descendants = store.descendants(&node.id);
            let check = locus::domain::services::LocationDeletionCheck::evaluate(
                node.id.clone(),
                descendants,
                std::iter::empty(),
            );
            prop_assert_eq!(check.ok, store.child_count(&node.id) == 0);
        }
    }
}
