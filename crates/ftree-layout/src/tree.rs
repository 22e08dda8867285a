#![forbid(unsafe_code)]

//! The owned node hierarchy and its mutation feed.
//!
//! # Invariants
//!
//! 1. Node ids are assigned once, in pre-order, when the tree is built.
//! 2. Only [`Tree::toggle`] (and its directional forms) mutates structure,
//!    and it only moves a child list between visible and hidden.
//! 3. Every structural change is appended to the change feed and bumps
//!    [`Tree::revision`]; a surface drains the feed instead of being poked
//!    through a synthetic event.
//!
//! # Failure Modes
//!
//! - Unknown id in `toggle`/`expand`/`collapse`: `TreeError::NodeNotFound`.
//! - A record with both visible and hidden children keeps the visible list
//!   and drops the hidden one with a warning.

use std::fmt;

use tracing::{debug, warn};

use crate::node::{Branch, BranchState, Node, NodeId, NodeRecord};

/// A structural change pushed to the tree's change feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeChange {
    /// A node switched between expanded and collapsed.
    Toggled { id: NodeId, state: BranchState },
}

/// Errors raised by tree construction and mutation.
#[derive(Debug)]
pub enum TreeError {
    /// No node with this id exists in the tree.
    NodeNotFound(NodeId),
    /// The input JSON could not be decoded into a node record.
    Parse(serde_json::Error),
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NodeNotFound(id) => write!(f, "node {id} not found in tree"),
            Self::Parse(err) => write!(f, "invalid tree record: {err}"),
        }
    }
}

impl std::error::Error for TreeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::NodeNotFound(_) => None,
            Self::Parse(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for TreeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err)
    }
}

/// An owned hierarchy of [`Node`]s.
#[derive(Debug, Clone)]
pub struct Tree {
    root: Node,
    revision: u64,
    changes: Vec<TreeChange>,
}

impl Tree {
    /// Build a tree from an analyzer record, assigning node ids.
    pub fn from_record(record: NodeRecord) -> Self {
        let mut next = 0u32;
        let root = build_node(record, &mut next);
        debug!(nodes = next, "tree built from record");
        Self {
            root,
            revision: 0,
            changes: Vec::new(),
        }
    }

    /// Decode a JSON record and build a tree from it.
    pub fn from_json(json: &str) -> Result<Self, TreeError> {
        let record: NodeRecord = serde_json::from_str(json)?;
        Ok(Self::from_record(record))
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Total number of nodes, hidden ones included.
    pub fn len(&self) -> usize {
        self.root.span() as usize
    }

    /// A tree always has at least its root.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Number of nodes reachable through visible children only.
    pub fn visible_len(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![&self.root];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.visible_children());
        }
        count
    }

    /// Monotonic counter bumped by every structural change.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Take all pending changes, oldest first.
    pub fn drain_changes(&mut self) -> Vec<TreeChange> {
        std::mem::take(&mut self.changes)
    }

    /// Find a node by id, looking through hidden children too.
    pub fn find(&self, id: NodeId) -> Option<&Node> {
        let mut node = &self.root;
        if !node.owns(id) {
            return None;
        }
        while node.id() != id {
            node = node.branch().all().iter().find(|c| c.owns(id))?;
        }
        Some(node)
    }

    fn find_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        let mut node = &mut self.root;
        if !node.owns(id) {
            return None;
        }
        while node.id() != id {
            node = node
                .branch_mut()
                .all_mut()
                .iter_mut()
                .find(|c| c.owns(id))?;
        }
        Some(node)
    }

    /// Ids from the root down to `id`, inclusive.
    pub fn path_to(&self, id: NodeId) -> Option<Vec<NodeId>> {
        let mut node = &self.root;
        if !node.owns(id) {
            return None;
        }
        let mut path = vec![node.id()];
        while node.id() != id {
            node = node.branch().all().iter().find(|c| c.owns(id))?;
            path.push(node.id());
        }
        Some(path)
    }

    /// The owning parent of `id`, or `None` for the root and unknown ids.
    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        let path = self.path_to(id)?;
        path.len().checked_sub(2).map(|i| path[i])
    }

    /// True if `id` is `ancestor` or lies anywhere below it, hidden or not.
    pub fn is_within(&self, ancestor: NodeId, id: NodeId) -> bool {
        self.find(ancestor).is_some_and(|n| n.owns(id))
    }

    /// Every id in the subtree rooted at `id`, in pre-order.
    pub fn subtree_ids(&self, id: NodeId) -> Option<Vec<NodeId>> {
        let node = self.find(id)?;
        Some((node.id().0..node.id().0 + node.span()).map(NodeId).collect())
    }

    /// Swap a node between expanded and collapsed.
    ///
    /// Leaves are left untouched and report [`BranchState::Leaf`]; no change
    /// is recorded for them.
    pub fn toggle(&mut self, id: NodeId) -> Result<BranchState, TreeError> {
        let node = self.find_mut(id).ok_or(TreeError::NodeNotFound(id))?;
        if node.state() == BranchState::Leaf {
            return Ok(BranchState::Leaf);
        }
        let state = node.toggle();
        self.record(id, state);
        Ok(state)
    }

    /// Make a node's children visible. No-op if already expanded or a leaf.
    pub fn expand(&mut self, id: NodeId) -> Result<BranchState, TreeError> {
        self.set_state(id, BranchState::Expanded)
    }

    /// Hide a node's children. No-op if already collapsed or a leaf.
    pub fn collapse(&mut self, id: NodeId) -> Result<BranchState, TreeError> {
        self.set_state(id, BranchState::Collapsed)
    }

    fn set_state(&mut self, id: NodeId, wanted: BranchState) -> Result<BranchState, TreeError> {
        let node = self.find_mut(id).ok_or(TreeError::NodeNotFound(id))?;
        let current = node.state();
        if current == BranchState::Leaf || current == wanted {
            return Ok(current);
        }
        let state = node.toggle();
        self.record(id, state);
        Ok(state)
    }

    fn record(&mut self, id: NodeId, state: BranchState) {
        self.revision += 1;
        self.changes.push(TreeChange::Toggled { id, state });
        debug!(%id, %state, revision = self.revision, "node toggled");
    }

    /// Export the current hierarchy, including expand/collapse state.
    pub fn to_record(&self) -> NodeRecord {
        self.root.to_record()
    }

    /// Pre-order walk over every node, hidden ones included.
    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        let mut stack = vec![&self.root];
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(node.branch().all().iter().rev());
            Some(node)
        })
    }
}

fn build_node(record: NodeRecord, next: &mut u32) -> Node {
    let id = NodeId(*next);
    *next += 1;
    let NodeRecord {
        label,
        kind,
        comment,
        visible_children,
        hidden_children,
    } = record;

    let (children, expanded) = match (visible_children.is_empty(), hidden_children.is_empty()) {
        (false, false) => {
            warn!(
                %id,
                label = %label,
                dropped = hidden_children.len(),
                "node has both visible and hidden children; keeping visible"
            );
            (visible_children, true)
        }
        (false, true) => (visible_children, true),
        (true, false) => (hidden_children, false),
        (true, true) => (Vec::new(), true),
    };

    let children: Vec<Node> = children
        .into_iter()
        .map(|child| build_node(child, next))
        .collect();
    let span = *next - id.0;
    Node::from_parts(id, span, label, kind, comment, Branch::new(children, expanded))
}
