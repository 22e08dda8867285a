#![forbid(unsafe_code)]

//! Visible-tree layout.
//!
//! [`layout`] walks the expanded part of a [`Tree`], measures every label,
//! and places one box per visible node using the tidy-tree algorithm.
//! Depth runs along `x` in fixed-width columns; siblings stack along `y`,
//! `row_spacing` apart times a per-pair separation factor that widens gaps
//! between long labels.
//!
//! # Invariants
//!
//! 1. Only visible children take part; collapsed subtrees contribute nothing
//!    but their root.
//! 2. Node order in [`TreeLayout::nodes`] is visible pre-order, and links
//!    are emitted in the same order (one per visible child).
//! 3. Identical tree, metrics and constants produce bit-identical output.
//! 4. Column width depends on every label in the tree, hidden ones
//!    included, so toggling never changes it.

use ftree_core::geometry::{Point, Rect, Size};
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::metrics::{FontSpec, LabelMetrics, measure_or_default};
use crate::node::{BranchState, Node, NodeId};
use crate::tidy::tidy_positions;
use crate::tree::Tree;

/// Sizing parameters for [`layout`].
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutConstants {
    /// Label font.
    pub font: FontSpec,
    /// Padding on each side of the label inside its box.
    pub horizontal_padding: f64,
    /// Box height.
    pub node_height: f64,
    /// Sibling-axis distance between adjacent rows, before separation.
    pub row_spacing: f64,
    /// Lower bound on the depth-axis column width.
    pub min_column_width: f64,
    /// Extra room added to the widest label when sizing columns.
    pub column_margin: f64,
    /// Lower bound on box width.
    pub min_node_width: f64,
    /// Base separation between siblings sharing a parent.
    pub sibling_separation: f64,
    /// Base separation between adjacent nodes with different parents.
    pub cousin_separation: f64,
    /// Width assumed for a label that cannot be measured.
    pub fallback_label_width: f64,
}

impl Default for LayoutConstants {
    fn default() -> Self {
        Self {
            font: FontSpec::default(),
            horizontal_padding: 14.0,
            node_height: 44.0,
            row_spacing: 90.0,
            min_column_width: 90.0,
            column_margin: 28.0,
            min_node_width: 80.0,
            sibling_separation: 1.0,
            cousin_separation: 1.6,
            fallback_label_width: 40.0,
        }
    }
}

impl LayoutConstants {
    /// Box width for a label of the given measured width.
    #[must_use]
    pub fn box_width(&self, label_width: f64) -> f64 {
        (label_width.ceil() + 2.0 * self.horizontal_padding).max(self.min_node_width)
    }
}

/// A positioned, visible node.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutNode {
    pub id: NodeId,
    pub parent: Option<NodeId>,
    pub label: String,
    pub kind: Option<String>,
    pub has_comment: bool,
    pub state: BranchState,
    /// Distance from the root; the root is at depth 0.
    pub depth: usize,
    /// Position among the parent's visible children.
    pub sibling_index: usize,
    /// Depth-axis center.
    pub x: f64,
    /// Sibling-axis center.
    pub y: f64,
    pub box_width: f64,
    pub box_height: f64,
    /// Measured label width (before ceiling and padding).
    pub label_width: f64,
}

impl LayoutNode {
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// The node's box, centered on its position.
    pub fn bounds(&self) -> Rect {
        Rect::centered(self.position(), Size::new(self.box_width, self.box_height))
    }
}

/// A visible parent → child edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayoutLink {
    pub source: NodeId,
    pub target: NodeId,
}

/// Output of [`layout`].
#[derive(Debug, Clone, Default)]
pub struct TreeLayout {
    nodes: Vec<LayoutNode>,
    links: Vec<LayoutLink>,
    column_width: f64,
    index: FxHashMap<NodeId, usize>,
}

impl TreeLayout {
    /// Visible nodes in pre-order.
    pub fn nodes(&self) -> &[LayoutNode] {
        &self.nodes
    }

    pub fn links(&self) -> &[LayoutLink] {
        &self.links
    }

    pub fn column_width(&self) -> f64 {
        self.column_width
    }

    pub fn get(&self, id: NodeId) -> Option<&LayoutNode> {
        self.index.get(&id).map(|&i| &self.nodes[i])
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LayoutNode> {
        self.nodes.iter()
    }

    /// Union of all node boxes, or `None` for an empty layout.
    pub fn bounds(&self) -> Option<Rect> {
        self.nodes
            .iter()
            .map(LayoutNode::bounds)
            .reduce(|acc, r| acc.union(&r))
    }
}

impl<'a> IntoIterator for &'a TreeLayout {
    type Item = &'a LayoutNode;
    type IntoIter = std::slice::Iter<'a, LayoutNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}

/// Depth-axis column width for `tree`.
///
/// The widest label over all nodes, visible or hidden, plus padding and
/// margin, rounded up and clamped to `min_column_width`.
pub fn column_width(tree: &Tree, metrics: &dyn LabelMetrics, constants: &LayoutConstants) -> f64 {
    let widest = tree
        .iter()
        .map(|node| {
            measure_or_default(
                metrics,
                node.label(),
                &constants.font,
                constants.fallback_label_width,
            )
        })
        .fold(0.0f64, f64::max);
    let widest = if widest > 0.0 {
        widest
    } else {
        constants.fallback_label_width
    };
    (widest + 2.0 * constants.horizontal_padding + constants.column_margin)
        .ceil()
        .max(constants.min_column_width)
}

/// Lay out the visible part of `tree`, computing the column width.
pub fn layout(tree: &Tree, metrics: &dyn LabelMetrics, constants: &LayoutConstants) -> TreeLayout {
    let width = column_width(tree, metrics, constants);
    layout_with_column_width(tree, metrics, constants, width)
}

struct Visit<'t> {
    node: &'t Node,
    parent: Option<usize>,
    depth: usize,
    sibling_index: usize,
}

/// Lay out the visible part of `tree` with a precomputed column width.
///
/// Surfaces cache the column width per tree and call this on every
/// relayout.
pub fn layout_with_column_width(
    tree: &Tree,
    metrics: &dyn LabelMetrics,
    constants: &LayoutConstants,
    column_width: f64,
) -> TreeLayout {
    // Visible pre-order with parent links.
    let mut visits: Vec<Visit<'_>> = Vec::with_capacity(tree.visible_len());
    let mut children: Vec<Vec<usize>> = Vec::with_capacity(tree.visible_len());
    let mut stack: Vec<(&Node, Option<usize>, usize, usize)> = vec![(tree.root(), None, 0, 0)];
    while let Some((node, parent, depth, sibling_index)) = stack.pop() {
        let index = visits.len();
        if let Some(p) = parent {
            children[p].push(index);
        }
        visits.push(Visit {
            node,
            parent,
            depth,
            sibling_index,
        });
        children.push(Vec::new());
        for (i, child) in node.visible_children().iter().enumerate().rev() {
            stack.push((child, Some(index), depth + 1, i));
        }
    }

    let widths: Vec<f64> = visits
        .iter()
        .map(|v| {
            measure_or_default(
                metrics,
                v.node.label(),
                &constants.font,
                constants.fallback_label_width,
            )
        })
        .collect();

    let separation = |a: usize, b: usize| {
        let base = if visits[a].parent == visits[b].parent {
            constants.sibling_separation
        } else {
            constants.cousin_separation
        };
        let required = (widths[a] + widths[b] + 4.0 * constants.horizontal_padding) / column_width;
        base * required.max(1.0)
    };
    let offsets = tidy_positions(&children, separation);

    let mut nodes = Vec::with_capacity(visits.len());
    let mut links = Vec::with_capacity(visits.len().saturating_sub(1));
    let mut index = FxHashMap::default();
    for (i, visit) in visits.iter().enumerate() {
        let node = visit.node;
        let parent = visit.parent.map(|p| visits[p].node.id());
        if let Some(source) = parent {
            links.push(LayoutLink {
                source,
                target: node.id(),
            });
        }
        index.insert(node.id(), i);
        nodes.push(LayoutNode {
            id: node.id(),
            parent,
            label: node.label().to_string(),
            kind: node.kind().map(str::to_string),
            has_comment: node.has_comment(),
            state: node.state(),
            depth: visit.depth,
            sibling_index: visit.sibling_index,
            x: visit.depth as f64 * column_width,
            y: offsets[i] * constants.row_spacing,
            box_width: constants.box_width(widths[i]),
            box_height: constants.node_height,
            label_width: widths[i],
        });
    }

    debug!(
        nodes = nodes.len(),
        links = links.len(),
        column_width,
        "tree layout computed"
    );

    TreeLayout {
        nodes,
        links,
        column_width,
        index,
    }
}
