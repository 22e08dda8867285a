#![forbid(unsafe_code)]

//! Tree nodes and their expand/collapse state.
//!
//! Children live in an explicit tagged [`Branch`]: a node is a leaf, an
//! expanded branch, or a collapsed branch. A node therefore can never hold a
//! visible and a hidden child list at the same time, and toggling is a pure
//! swap of the tag.
//!
//! [`NodeRecord`] is the serde-facing shape produced by the external
//! analyzer. It accepts both the descriptive field names
//! (`label`/`kind`/`visibleChildren`/`hiddenChildren`) and the analyzer's
//! native ones (`name`/`type`/`children`/`_children`).

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Comment text the analyzer emits when a node has no annotation.
pub const NO_COMMENT: &str = "No comment available";

/// Stable node identity, assigned in pre-order when a [`Tree`](crate::Tree)
/// is built and never reused for the lifetime of that tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Branch state
// ---------------------------------------------------------------------------

/// The expand/collapse tag of a node, without its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BranchState {
    /// No children at all.
    Leaf,
    /// Children are visible.
    Expanded,
    /// Children are hidden.
    Collapsed,
}

impl BranchState {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Leaf => "leaf",
            Self::Expanded => "expanded",
            Self::Collapsed => "collapsed",
        }
    }
}

impl fmt::Display for BranchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Owned children of a node, tagged with their visibility.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Branch {
    #[default]
    Leaf,
    Expanded(Vec<Node>),
    Collapsed(Vec<Node>),
}

impl Branch {
    /// Build a branch from a child list and a visibility flag.
    ///
    /// An empty list is always a leaf.
    pub fn new(children: Vec<Node>, expanded: bool) -> Self {
        match (children.is_empty(), expanded) {
            (true, _) => Self::Leaf,
            (false, true) => Self::Expanded(children),
            (false, false) => Self::Collapsed(children),
        }
    }

    /// The tag without the children.
    #[must_use]
    pub fn state(&self) -> BranchState {
        match self {
            Self::Leaf => BranchState::Leaf,
            Self::Expanded(_) => BranchState::Expanded,
            Self::Collapsed(_) => BranchState::Collapsed,
        }
    }

    /// Swap expanded and collapsed. Leaves are unchanged.
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Leaf => Self::Leaf,
            Self::Expanded(children) => Self::Collapsed(children),
            Self::Collapsed(children) => Self::Expanded(children),
        }
    }

    /// Children that take part in layout.
    pub fn visible(&self) -> &[Node] {
        match self {
            Self::Expanded(children) => children,
            Self::Leaf | Self::Collapsed(_) => &[],
        }
    }

    /// Children currently collapsed away.
    pub fn hidden(&self) -> &[Node] {
        match self {
            Self::Collapsed(children) => children,
            Self::Leaf | Self::Expanded(_) => &[],
        }
    }

    /// All owned children regardless of visibility.
    pub fn all(&self) -> &[Node] {
        match self {
            Self::Leaf => &[],
            Self::Expanded(children) | Self::Collapsed(children) => children,
        }
    }

    pub(crate) fn all_mut(&mut self) -> &mut [Node] {
        match self {
            Self::Leaf => &mut [],
            Self::Expanded(children) | Self::Collapsed(children) => children,
        }
    }
}

// ---------------------------------------------------------------------------
// Node
// ---------------------------------------------------------------------------

/// A tree element.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    id: NodeId,
    /// Number of nodes in this subtree, including hidden ones and itself.
    span: u32,
    label: String,
    kind: Option<String>,
    comment: Option<String>,
    branch: Branch,
}

impl Node {
    pub(crate) fn from_parts(
        id: NodeId,
        span: u32,
        label: String,
        kind: Option<String>,
        comment: Option<String>,
        branch: Branch,
    ) -> Self {
        Self {
            id,
            span,
            label,
            kind,
            comment,
            branch,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn kind(&self) -> Option<&str> {
        self.kind.as_deref()
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// True when the node carries a real annotation: present, non-empty and
    /// not the [`NO_COMMENT`] sentinel.
    pub fn has_comment(&self) -> bool {
        self.comment
            .as_deref()
            .is_some_and(|c| !c.is_empty() && c != NO_COMMENT)
    }

    pub fn branch(&self) -> &Branch {
        &self.branch
    }

    pub fn state(&self) -> BranchState {
        self.branch.state()
    }

    pub fn visible_children(&self) -> &[Node] {
        self.branch.visible()
    }

    pub fn hidden_children(&self) -> &[Node] {
        self.branch.hidden()
    }

    /// Subtree size, counting hidden descendants.
    pub fn span(&self) -> u32 {
        self.span
    }

    /// True if `id` is this node or one of its owned descendants.
    ///
    /// Ids are assigned in pre-order, so a subtree occupies the contiguous
    /// range `[id, id + span)`.
    pub fn owns(&self, id: NodeId) -> bool {
        id.0 >= self.id.0 && id.0 - self.id.0 < self.span
    }

    /// Swap visible and hidden children; returns the new state.
    pub(crate) fn toggle(&mut self) -> BranchState {
        self.branch = std::mem::take(&mut self.branch).toggled();
        self.branch.state()
    }

    pub(crate) fn branch_mut(&mut self) -> &mut Branch {
        &mut self.branch
    }

    /// Convert back to the external record shape, preserving the current
    /// expand/collapse state.
    pub fn to_record(&self) -> NodeRecord {
        let children = |nodes: &[Node]| nodes.iter().map(Node::to_record).collect();
        NodeRecord {
            label: self.label.clone(),
            kind: self.kind.clone(),
            comment: self.comment.clone(),
            visible_children: children(self.branch.visible()),
            hidden_children: children(self.branch.hidden()),
        }
    }
}

// ---------------------------------------------------------------------------
// External record
// ---------------------------------------------------------------------------

/// Recursive input record supplied by the analyzer.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRecord {
    #[serde(default, alias = "name", deserialize_with = "null_as_default")]
    pub label: String,

    #[serde(default, alias = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,

    #[serde(
        default,
        alias = "children",
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub visible_children: Vec<NodeRecord>,

    #[serde(
        default,
        alias = "_children",
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub hidden_children: Vec<NodeRecord>,
}

impl NodeRecord {
    /// A leaf record with the given label.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    /// Set the classification (builder).
    #[must_use]
    pub fn kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    /// Set the comment (builder).
    #[must_use]
    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Append a visible child (builder).
    #[must_use]
    pub fn child(mut self, child: NodeRecord) -> Self {
        self.visible_children.push(child);
        self
    }

    /// Append a hidden child (builder).
    #[must_use]
    pub fn hidden_child(mut self, child: NodeRecord) -> Self {
        self.hidden_children.push(child);
        self
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
