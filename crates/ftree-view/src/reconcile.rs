#![forbid(unsafe_code)]

//! Keyed reconciliation between two layouts.
//!
//! [`reconcile`] compares the previously rendered layout with a new one and
//! classifies every node and link along two axes: its phase (entering,
//! updating, exiting) and its mode (animated or immediate). Nodes are keyed
//! by [`NodeId`], links by their `(source, target)` pair.
//!
//! # Invariants
//!
//! 1. Scope membership follows the ownership chain in the [`Tree`], not
//!    screen position: a node hidden under a collapsed ancestor still belongs
//!    to that ancestor's subtree.
//! 2. A link is animated when either endpoint is in scope.
//! 3. Entering elements grow out of the nearest ancestor that was already
//!    on screen; exiting elements shrink into the nearest ancestor that
//!    stays on screen. Without such an ancestor they appear or vanish in
//!    place.
//! 4. An immediate update whose target did not move is a no-op, so
//!    elements still in flight from an earlier batch keep animating.

use std::fmt;
use std::time::Duration;

use ftree_core::animation::EasingFn;
use ftree_core::geometry::Point;
use ftree_layout::{LayoutLink, NodeId, Tree, TreeLayout};
use rustc_hash::FxHashSet;

use crate::driver::{ElementVisual, LinkVisual, TransitionDriver};

/// Which elements a relayout may animate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AnimationScope {
    /// Everything snaps.
    #[default]
    None,
    /// Everything animates (first render of a tree).
    All,
    /// Only this node and its owned descendants animate.
    Subtree(NodeId),
}

impl AnimationScope {
    /// Membership test bound to `tree`.
    pub fn matcher<'t>(&self, tree: &'t Tree) -> ScopeMatcher<'t> {
        match *self {
            Self::None => ScopeMatcher::Nothing,
            Self::All => ScopeMatcher::Everything,
            Self::Subtree(root) => match tree.find(root) {
                Some(node) => ScopeMatcher::Owner(node),
                None => ScopeMatcher::Nothing,
            },
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

impl fmt::Display for AnimationScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("none"),
            Self::All => f.write_str("all"),
            Self::Subtree(id) => write!(f, "subtree({id})"),
        }
    }
}

/// Resolved [`AnimationScope`].
#[derive(Debug, Clone, Copy)]
pub enum ScopeMatcher<'t> {
    Nothing,
    Everything,
    Owner(&'t ftree_layout::Node),
}

impl ScopeMatcher<'_> {
    pub fn includes(&self, id: NodeId) -> bool {
        match self {
            Self::Nothing => false,
            Self::Everything => true,
            Self::Owner(node) => node.owns(id),
        }
    }
}

/// Lifecycle of an element across one relayout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Entering,
    Updating,
    Exiting,
}

/// Whether the transition plays over time or applies at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Animated,
    Immediate,
}

/// One element's planned change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition<K, V> {
    pub key: K,
    pub phase: Phase,
    pub mode: Mode,
    pub from: V,
    pub to: V,
}

pub type NodeTransition = Transition<NodeId, ElementVisual>;
pub type LinkTransition = Transition<LayoutLink, LinkVisual>;

impl<K: Copy, V: Copy + PartialEq> Transition<K, V> {
    /// Hand this transition to `driver`.
    pub fn apply<D>(&self, driver: &mut D, duration: Duration, easing: EasingFn, now: Duration)
    where
        D: TransitionDriver<K, V> + ?Sized,
    {
        match (self.phase, self.mode) {
            (Phase::Exiting, Mode::Animated) => {
                driver.animate(self.key, self.from, self.to, duration, easing, now);
                driver.remove_after(self.key, now.saturating_add(duration));
            }
            (Phase::Exiting, Mode::Immediate) => driver.remove(&self.key),
            (_, Mode::Animated) => driver.animate(self.key, self.from, self.to, duration, easing, now),
            (Phase::Updating, Mode::Immediate)
                if self.from == self.to && driver.contains(&self.key) => {}
            (_, Mode::Immediate) => driver.set_immediate(self.key, self.to),
        }
    }
}

/// Counts per phase and mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlanStats {
    pub entering: usize,
    pub updating: usize,
    pub exiting: usize,
    pub animated: usize,
    pub immediate: usize,
}

impl PlanStats {
    fn record(&mut self, phase: Phase, mode: Mode) {
        match phase {
            Phase::Entering => self.entering += 1,
            Phase::Updating => self.updating += 1,
            Phase::Exiting => self.exiting += 1,
        }
        match mode {
            Mode::Animated => self.animated += 1,
            Mode::Immediate => self.immediate += 1,
        }
    }
}

/// Output of [`reconcile`].
#[derive(Debug, Clone, Default)]
pub struct RenderPlan {
    pub scope: AnimationScope,
    /// Nodes of the new layout in its order, then exiting nodes.
    pub nodes: Vec<NodeTransition>,
    /// Links of the new layout in its order, then exiting links.
    pub links: Vec<LinkTransition>,
}

impl RenderPlan {
    pub fn node(&self, id: NodeId) -> Option<&NodeTransition> {
        self.nodes.iter().find(|t| t.key == id)
    }

    pub fn link(&self, link: LayoutLink) -> Option<&LinkTransition> {
        self.links.iter().find(|t| t.key == link)
    }

    /// Ids of nodes whose transition plays over time.
    pub fn animated_nodes(&self) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|t| t.mode == Mode::Animated)
            .map(|t| t.key)
            .collect()
    }

    pub fn node_stats(&self) -> PlanStats {
        let mut stats = PlanStats::default();
        for t in &self.nodes {
            stats.record(t.phase, t.mode);
        }
        stats
    }

    pub fn link_stats(&self) -> PlanStats {
        let mut stats = PlanStats::default();
        for t in &self.links {
            stats.record(t.phase, t.mode);
        }
        stats
    }

    /// True if anything in the plan plays over time.
    pub fn is_animated(&self) -> bool {
        self.nodes.iter().any(|t| t.mode == Mode::Animated)
            || self.links.iter().any(|t| t.mode == Mode::Animated)
    }

    /// Hand every transition to the given drivers.
    pub fn apply<N, L>(
        &self,
        nodes: &mut N,
        links: &mut L,
        duration: Duration,
        easing: EasingFn,
        now: Duration,
    ) where
        N: TransitionDriver<NodeId, ElementVisual> + ?Sized,
        L: TransitionDriver<LayoutLink, LinkVisual> + ?Sized,
    {
        for t in &self.nodes {
            t.apply(nodes, duration, easing, now);
        }
        for t in &self.links {
            t.apply(links, duration, easing, now);
        }
    }
}

/// Walk up from `start` through `chain` until a node also present in
/// `other` is found; return its position in `other`.
fn nearest_present(chain: &TreeLayout, start: Option<NodeId>, other: &TreeLayout) -> Option<Point> {
    let mut current = start;
    while let Some(id) = current {
        if let Some(node) = other.get(id) {
            return Some(node.position());
        }
        current = chain.get(id).and_then(|n| n.parent);
    }
    None
}

fn mode(animated: bool) -> Mode {
    if animated {
        Mode::Animated
    } else {
        Mode::Immediate
    }
}

/// Classify every node and link of `previous` ∪ `next`.
///
/// `previous` is `None` on the first render of a tree, in which case every
/// element enters.
pub fn reconcile(
    previous: Option<&TreeLayout>,
    next: &TreeLayout,
    scope: AnimationScope,
    tree: &Tree,
) -> RenderPlan {
    let empty = TreeLayout::default();
    let prev = previous.unwrap_or(&empty);
    let in_scope = scope.matcher(tree);

    let mut nodes = Vec::with_capacity(next.len() + prev.len());
    for node in next {
        let to = ElementVisual::shown(node.position());
        let transition = match prev.get(node.id) {
            Some(old) => Transition {
                key: node.id,
                phase: Phase::Updating,
                mode: mode(in_scope.includes(node.id)),
                from: ElementVisual::shown(old.position()),
                to,
            },
            None => {
                let origin = nearest_present(next, node.parent, prev).unwrap_or(node.position());
                Transition {
                    key: node.id,
                    phase: Phase::Entering,
                    mode: mode(in_scope.includes(node.id)),
                    from: ElementVisual::hidden(origin),
                    to,
                }
            }
        };
        nodes.push(transition);
    }
    for old in prev.iter().filter(|n| !next.contains(n.id)) {
        let dest = nearest_present(prev, old.parent, next).unwrap_or(old.position());
        nodes.push(Transition {
            key: old.id,
            phase: Phase::Exiting,
            mode: mode(in_scope.includes(old.id)),
            from: ElementVisual::shown(old.position()),
            to: ElementVisual::hidden(dest),
        });
    }

    let link_visual = |layout: &TreeLayout, link: &LayoutLink| -> Option<LinkVisual> {
        let source = layout.get(link.source)?.position();
        let target = layout.get(link.target)?.position();
        Some(LinkVisual::new(source, target, 1.0))
    };
    let link_mode = |link: &LayoutLink| mode(in_scope.includes(link.source) || in_scope.includes(link.target));

    let prev_links: FxHashSet<LayoutLink> = prev.links().iter().copied().collect();
    let next_links: FxHashSet<LayoutLink> = next.links().iter().copied().collect();

    let mut links = Vec::with_capacity(next.links().len() + prev.links().len());
    for link in next.links() {
        let Some(to) = link_visual(next, link) else {
            continue;
        };
        let transition = match prev_links.contains(link).then(|| link_visual(prev, link)).flatten() {
            Some(from) => Transition {
                key: *link,
                phase: Phase::Updating,
                mode: link_mode(link),
                from,
                to,
            },
            None => {
                let origin = nearest_present(next, Some(link.source), prev).unwrap_or(to.source);
                Transition {
                    key: *link,
                    phase: Phase::Entering,
                    mode: link_mode(link),
                    from: LinkVisual::collapsed(origin),
                    to,
                }
            }
        };
        links.push(transition);
    }
    for link in prev.links().iter().filter(|l| !next_links.contains(l)) {
        let Some(from) = link_visual(prev, link) else {
            continue;
        };
        let dest = nearest_present(prev, Some(link.source), next).unwrap_or(from.source);
        links.push(Transition {
            key: *link,
            phase: Phase::Exiting,
            mode: link_mode(link),
            from,
            to: LinkVisual::collapsed(dest),
        });
    }

    RenderPlan {
        scope,
        nodes,
        links,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::FrameDriver;
    use ftree_core::animation::ease_in_out_cubic;
    use ftree_layout::{FixedMetrics, LayoutConstants, NodeRecord, layout};
    use pretty_assertions::assert_eq;

    // 0 Root
    // ├─ 1 ClassA
    // │  ├─ 2 m1
    // │  └─ 3 m2
    // └─ 4 ClassB
    //    └─ 5 m3
    fn sample() -> Tree {
        Tree::from_record(
            NodeRecord::new("Root")
                .child(
                    NodeRecord::new("ClassA")
                        .child(NodeRecord::new("m1"))
                        .child(NodeRecord::new("m2")),
                )
                .child(NodeRecord::new("ClassB").child(NodeRecord::new("m3"))),
        )
    }

    fn lay(tree: &Tree) -> TreeLayout {
        layout(tree, &FixedMetrics::new(10.0), &LayoutConstants::default())
    }

    #[test]
    fn first_render_enters_everything_animated() {
        let tree = sample();
        let next = lay(&tree);
        let plan = reconcile(None, &next, AnimationScope::All, &tree);
        let stats = plan.node_stats();
        assert_eq!(stats.entering, 6);
        assert_eq!(stats.animated, 6);
        assert_eq!(plan.link_stats().entering, 5);
        // No prior render: fade in at the final position.
        let root = plan.node(NodeId(0)).expect("root");
        assert_eq!(root.from.position, root.to.position);
        assert_eq!(root.from.opacity, 0.0);
    }

    #[test]
    fn collapse_scopes_animation_to_subtree() {
        let mut tree = sample();
        let before = lay(&tree);
        tree.toggle(NodeId(1)).expect("toggle");
        let after = lay(&tree);
        let plan = reconcile(Some(&before), &after, AnimationScope::Subtree(NodeId(1)), &tree);

        let mut animated = plan.animated_nodes();
        animated.sort();
        assert_eq!(animated, vec![NodeId(1), NodeId(2), NodeId(3)]);

        let m1 = plan.node(NodeId(2)).expect("m1");
        assert_eq!(m1.phase, Phase::Exiting);
        // Exiting nodes shrink into the parent's new position.
        assert_eq!(m1.to.position, after.get(NodeId(1)).expect("ClassA").position());
        assert_eq!(m1.to.opacity, 0.0);

        let class_b = plan.node(NodeId(4)).expect("ClassB");
        assert_eq!(class_b.phase, Phase::Updating);
        assert_eq!(class_b.mode, Mode::Immediate);

        let exiting_link = plan
            .link(LayoutLink {
                source: NodeId(1),
                target: NodeId(2),
            })
            .expect("link");
        assert_eq!(exiting_link.phase, Phase::Exiting);
        assert_eq!(exiting_link.mode, Mode::Animated);
        let root_link = plan
            .link(LayoutLink {
                source: NodeId(0),
                target: NodeId(1),
            })
            .expect("link");
        assert_eq!(root_link.mode, Mode::Animated, "target endpoint is in scope");
        let other = plan
            .link(LayoutLink {
                source: NodeId(4),
                target: NodeId(5),
            })
            .expect("link");
        assert_eq!(other.mode, Mode::Immediate);
    }

    #[test]
    fn expand_enters_from_parent_prior_position() {
        let mut tree = sample();
        tree.toggle(NodeId(1)).expect("collapse");
        let before = lay(&tree);
        tree.toggle(NodeId(1)).expect("expand");
        let after = lay(&tree);
        let plan = reconcile(Some(&before), &after, AnimationScope::Subtree(NodeId(1)), &tree);

        let prior = before.get(NodeId(1)).expect("ClassA").position();
        for id in [NodeId(2), NodeId(3)] {
            let t = plan.node(id).expect("entering");
            assert_eq!(t.phase, Phase::Entering);
            assert_eq!(t.mode, Mode::Animated);
            assert_eq!(t.from, ElementVisual::hidden(prior));
        }
        let link = plan
            .link(LayoutLink {
                source: NodeId(1),
                target: NodeId(3),
            })
            .expect("link");
        assert_eq!(link.from, LinkVisual::collapsed(prior));
    }

    #[test]
    fn grandchildren_enter_from_nearest_rendered_ancestor() {
        let mut tree = sample();
        tree.toggle(NodeId(4)).expect("collapse ClassB");
        tree.toggle(NodeId(0)).expect("collapse root");
        let before = lay(&tree);
        tree.toggle(NodeId(0)).expect("expand root");
        tree.toggle(NodeId(4)).expect("expand ClassB");
        let after = lay(&tree);
        let plan = reconcile(Some(&before), &after, AnimationScope::Subtree(NodeId(0)), &tree);
        let m3 = plan.node(NodeId(5)).expect("m3");
        assert_eq!(m3.from.position, before.get(NodeId(0)).expect("root").position());
    }

    #[test]
    fn none_scope_snaps_everything() {
        let tree = sample();
        let a = lay(&tree);
        let plan = reconcile(Some(&a), &a, AnimationScope::None, &tree);
        assert!(!plan.is_animated());
        assert_eq!(plan.node_stats().updating, 6);
    }

    #[test]
    fn hidden_descendants_count_as_in_scope() {
        let mut tree = sample();
        tree.toggle(NodeId(4)).expect("collapse");
        let matcher = AnimationScope::Subtree(NodeId(4)).matcher(&tree);
        assert!(matcher.includes(NodeId(5)));
        assert!(!matcher.includes(NodeId(3)));
        assert!(!AnimationScope::Subtree(NodeId(99)).matcher(&tree).includes(NodeId(0)));
    }

    #[test]
    fn apply_drives_exits_and_keeps_unmoved_elements() {
        let mut tree = sample();
        let before = lay(&tree);
        let mut nodes: FrameDriver<NodeId, ElementVisual> = FrameDriver::new();
        let mut links: FrameDriver<LayoutLink, LinkVisual> = FrameDriver::new();
        let d = Duration::from_millis(750);
        reconcile(None, &before, AnimationScope::None, &tree).apply(
            &mut nodes,
            &mut links,
            d,
            ease_in_out_cubic,
            Duration::ZERO,
        );
        assert_eq!(nodes.len(), 6);

        tree.toggle(NodeId(1)).expect("toggle");
        let after = lay(&tree);
        let now = Duration::from_millis(10);
        reconcile(Some(&before), &after, AnimationScope::Subtree(NodeId(1)), &tree).apply(
            &mut nodes, &mut links, d, ease_in_out_cubic, now,
        );
        assert!(nodes.is_leaving(&NodeId(2)));
        assert!(nodes.is_animating(now));
        nodes.tick(now + d);
        links.tick(now + d);
        assert_eq!(nodes.len(), 4);
        assert_eq!(links.len(), 3);
    }

    #[test]
    fn scope_display() {
        assert_eq!(AnimationScope::Subtree(NodeId(3)).to_string(), "subtree(n3)");
        assert_eq!(AnimationScope::default(), AnimationScope::None);
    }
}
