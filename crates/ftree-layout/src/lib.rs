#![forbid(unsafe_code)]

//! Tree model and tidy-tree layout.
//!
//! A [`Tree`] owns the caller's node hierarchy and the expand/collapse state
//! of every branch. [`layout`] turns the visible part of that hierarchy into
//! a [`TreeLayout`]: one positioned box per visible node, with depth on the
//! `x` axis and sibling order on the `y` axis.

pub mod layout;
pub mod metrics;
pub mod node;
mod tidy;
pub mod tree;

pub use layout::{LayoutConstants, LayoutLink, LayoutNode, TreeLayout, column_width, layout};
pub use metrics::{
    CacheStats, CachedMetrics, FixedMetrics, FontSpec, LabelMetrics, MeasureError,
    MonospaceMetrics, measure_or_default,
};
pub use node::{Branch, BranchState, NO_COMMENT, Node, NodeId, NodeRecord};
pub use tree::{Tree, TreeChange, TreeError};
