//! Property-based invariant tests for the tidy-tree layout.
//!
//! 1. Sibling boxes never overlap and follow input order along `y`.
//! 2. Every node sits on its depth column; parents are centered over the
//!    first and last visible child.
//! 3. Layout is idempotent: two passes are bit-identical.
//! 4. Toggling twice restores the visible children and the layout.
//! 5. Column width ignores expand/collapse state.

use ftree_layout::{
    BranchState, FixedMetrics, LayoutConstants, MonospaceMetrics, NodeId, NodeRecord, Tree,
    TreeLayout, column_width, layout,
};
use proptest::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────────

fn label() -> impl Strategy<Value = String> {
    "[a-zA-Z_]{0,14}"
}

fn record_strategy() -> impl Strategy<Value = NodeRecord> {
    let leaf = label().prop_map(NodeRecord::new);
    leaf.prop_recursive(5, 48, 5, |inner| {
        (
            label(),
            proptest::collection::vec(inner, 1..5),
            any::<bool>(),
        )
            .prop_map(|(label, kids, hidden)| {
                let mut rec = NodeRecord::new(label);
                if hidden {
                    rec.hidden_children = kids;
                } else {
                    rec.visible_children = kids;
                }
                rec
            })
    })
}

fn bits(layout: &TreeLayout) -> Vec<(u32, u64, u64, u64)> {
    layout
        .iter()
        .map(|n| (n.id.0, n.x.to_bits(), n.y.to_bits(), n.box_width.to_bits()))
        .collect()
}

fn branch_ids(tree: &Tree) -> Vec<NodeId> {
    tree.iter()
        .filter(|n| n.state() != BranchState::Leaf)
        .map(|n| n.id())
        .collect()
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Sibling separation and order
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn sibling_boxes_ordered_and_disjoint(record in record_strategy()) {
        let tree = Tree::from_record(record);
        let out = layout(&tree, &MonospaceMetrics::default(), &LayoutConstants::default());

        for parent in out.iter() {
            let kids: Vec<_> = out
                .iter()
                .filter(|n| n.parent == Some(parent.id))
                .collect();
            for pair in kids.windows(2) {
                let (a, b) = (pair[0], pair[1]);
                prop_assert_eq!(a.sibling_index + 1, b.sibling_index);
                prop_assert!(a.y < b.y, "siblings out of order: {} at {} vs {} at {}", a.id, a.y, b.id, b.y);
                prop_assert!(
                    !a.bounds().intersects(&b.bounds()),
                    "boxes overlap: {:?} vs {:?}", a.bounds(), b.bounds()
                );
            }
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Columns and centering
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn columns_and_parent_centering(record in record_strategy()) {
        let tree = Tree::from_record(record);
        let out = layout(&tree, &FixedMetrics::new(11.0), &LayoutConstants::default());

        for node in out.iter() {
            prop_assert_eq!(node.x, node.depth as f64 * out.column_width());
            let kids: Vec<_> = out.iter().filter(|n| n.parent == Some(node.id)).collect();
            if let (Some(first), Some(last)) = (kids.first(), kids.last()) {
                let mid = (first.y + last.y) / 2.0;
                prop_assert!((node.y - mid).abs() < 1e-6, "{} not centered: {} vs {}", node.id, node.y, mid);
            }
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Idempotence
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn layout_is_idempotent(record in record_strategy()) {
        let tree = Tree::from_record(record);
        let metrics = MonospaceMetrics::default();
        let constants = LayoutConstants::default();
        let a = layout(&tree, &metrics, &constants);
        let b = layout(&tree, &metrics, &constants);
        prop_assert_eq!(bits(&a), bits(&b));
        prop_assert_eq!(a.links(), b.links());
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Toggle round-trip
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn toggle_twice_restores_layout(record in record_strategy(), pick in any::<prop::sample::Index>()) {
        let mut tree = Tree::from_record(record);
        let branches = branch_ids(&tree);
        prop_assume!(!branches.is_empty());
        let target = branches[pick.index(branches.len())];

        let metrics = MonospaceMetrics::default();
        let constants = LayoutConstants::default();
        let before = layout(&tree, &metrics, &constants);
        let children_before: Vec<String> = tree
            .find(target)
            .map(|n| n.branch().all().iter().map(|c| c.label().to_string()).collect())
            .unwrap_or_default();

        let first = tree.toggle(target).expect("known id");
        let second = tree.toggle(target).expect("known id");
        prop_assert_ne!(first, second);

        let children_after: Vec<String> = tree
            .find(target)
            .map(|n| n.branch().all().iter().map(|c| c.label().to_string()).collect())
            .unwrap_or_default();
        prop_assert_eq!(children_before, children_after);
        prop_assert_eq!(bits(&before), bits(&layout(&tree, &metrics, &constants)));
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. Column width stability
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn column_width_ignores_toggles(record in record_strategy()) {
        let mut tree = Tree::from_record(record);
        let metrics = MonospaceMetrics::default();
        let constants = LayoutConstants::default();
        let before = column_width(&tree, &metrics, &constants);
        for id in branch_ids(&tree) {
            tree.toggle(id).expect("known id");
        }
        prop_assert_eq!(before.to_bits(), column_width(&tree, &metrics, &constants).to_bits());
        prop_assert!(before >= constants.min_column_width);
    }
}
