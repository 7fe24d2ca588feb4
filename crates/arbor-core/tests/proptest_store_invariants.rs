//! Property-based invariant tests for the node store and flattener.
//!
//! 1. No merge sequence leaves a dangling child reference
//! 2. Nodes are never removed by a merge
//! 3. Merges leave unrelated nodes pointer-identical
//! 4. Flattening with nothing expanded yields exactly the roots
//! 5. Collapse removes exactly the descendant run; re-expand restores it
//! 6. `begin` never hands out two requests for the same pending node

use std::sync::Arc;

use arbor_core::{
    ApiNode, ExpansionSet, LazyLoader, NodeId, NodeStore, descendant_run, flatten,
};
use proptest::prelude::*;

// ── Strategies ──────────────────────────────────────────────────────────

/// Ids are drawn from a small pool so merges collide with existing nodes.
fn id_strategy() -> impl Strategy<Value = String> {
    (0u32..40).prop_map(|n| format!("n{n}"))
}

fn api_node_strategy() -> impl Strategy<Value = ApiNode> {
    let leaf = (id_strategy(), "[a-z]{1,4}").prop_map(|(id, name)| ApiNode::leaf(id, name));
    leaf.prop_recursive(3, 24, 4, |inner| {
        (id_strategy(), "[a-z]{1,4}", prop::collection::vec(inner, 0..4))
            .prop_map(|(id, name, children)| ApiNode::branch(id, name, children))
    })
}

/// A `merge_children(parent, children)` call.
fn merge_strategy() -> impl Strategy<Value = (String, Vec<ApiNode>)> {
    (id_strategy(), prop::collection::vec(api_node_strategy(), 0..4))
}

fn bootstrap_strategy() -> impl Strategy<Value = Vec<ApiNode>> {
    prop::collection::vec(api_node_strategy(), 1..6)
}

fn assert_no_dangling(store: &NodeStore) -> Result<(), TestCaseError> {
    for node in store.iter() {
        for child in node.child_ids() {
            prop_assert!(store.contains(child.as_str()), "dangling {child} under {}", node.id());
        }
    }
    for root in store.root_ids() {
        prop_assert!(store.contains(root.as_str()), "dangling root {root}");
    }
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════
// 1-3. Merge invariants
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn merges_never_dangle_or_remove(
        bootstrap in bootstrap_strategy(),
        merges in prop::collection::vec(merge_strategy(), 0..30),
    ) {
        let mut store = NodeStore::initialize(&bootstrap);
        assert_no_dangling(&store)?;

        for (parent, children) in &merges {
            let before: Vec<NodeId> = store.iter().map(|n| n.id().clone()).collect();
            let next = store.merge_children(parent, children);

            for id in &before {
                prop_assert!(next.contains(id.as_str()), "{id} was removed");
            }
            if !store.contains(parent) {
                prop_assert!(next.ptr_eq(&store));
            }
            assert_no_dangling(&next)?;
            store = next;
        }
    }

    #[test]
    fn merge_preserves_unrelated_nodes(
        bootstrap in bootstrap_strategy(),
        parent in id_strategy(),
        children in prop::collection::vec(api_node_strategy(), 0..4),
    ) {
        let store = NodeStore::initialize(&bootstrap);
        let next = store.merge_children(&parent, &children);

        let mut touched: Vec<String> = vec![parent.clone()];
        let mut stack: Vec<&ApiNode> = children.iter().collect();
        while let Some(api) = stack.pop() {
            touched.push(api.id.clone());
            stack.extend(api.children());
        }

        for node in store.iter() {
            if touched.iter().any(|id| id == node.id().as_str()) {
                continue;
            }
            let after = next.get(node.id().as_str()).expect("node kept");
            prop_assert!(Arc::ptr_eq(node, after), "{} was rebuilt", node.id());
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 4-5. Flatten invariants
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn nothing_expanded_yields_roots(bootstrap in bootstrap_strategy()) {
        let store = NodeStore::initialize(&bootstrap);
        let rows = flatten(&store, &ExpansionSet::new());
        prop_assert_eq!(rows.len(), store.root_ids().len());
        for (row, root) in rows.iter().zip(store.root_ids()) {
            prop_assert_eq!(row.id(), root.as_str());
            prop_assert_eq!(row.depth, 0);
        }
    }

    #[test]
    fn collapse_removes_exactly_descendant_run(
        bootstrap in bootstrap_strategy(),
        merges in prop::collection::vec(merge_strategy(), 0..20),
        open in prop::collection::vec(id_strategy(), 0..40),
        pick in any::<prop::sample::Index>(),
    ) {
        let mut store = NodeStore::initialize(&bootstrap);
        for (parent, children) in &merges {
            store = store.merge_children(parent, children);
        }
        let expanded: ExpansionSet = open.iter().map(NodeId::new).collect();
        let rows = flatten(&store, &expanded);

        // Ids shown once only; a repeated id collapses every occurrence.
        let candidates: Vec<usize> = (0..rows.len())
            .filter(|&i| {
                let id = rows[i].id();
                expanded.contains(id) && rows.iter().filter(|r| r.id() == id).count() == 1
            })
            .collect();
        if candidates.is_empty() {
            return Ok(());
        }
        let index = candidates[pick.index(candidates.len())];
        let id = rows[index].node.id().clone();

        let run = descendant_run(&rows, index);
        let collapsed = flatten(&store, &expanded.without(&id));
        let expected: Vec<_> = rows[..run.start]
            .iter()
            .chain(&rows[run.end..])
            .cloned()
            .collect();
        prop_assert_eq!(&collapsed, &expected);

        let reopened = flatten(&store, &expanded.without(&id).with(&id));
        prop_assert_eq!(&reopened[run.clone()], &rows[run]);
        prop_assert_eq!(reopened, rows);
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 6. Single-flight
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn begin_is_single_flight(
        bootstrap in bootstrap_strategy(),
        ids in prop::collection::vec(id_strategy(), 1..40),
    ) {
        let store = NodeStore::initialize(&bootstrap);
        let mut loader = LazyLoader::new();
        let mut issued: Vec<NodeId> = Vec::new();
        for id in &ids {
            if let Some(request) = loader.begin(&store, id) {
                prop_assert!(!issued.contains(&request.node_id), "{id} issued twice");
                prop_assert!(store.needs_children(id));
                issued.push(request.node_id);
            }
        }
        prop_assert_eq!(loader.flags().len(), issued.len());
    }
}
