#![forbid(unsafe_code)]

//! The tree surface: one mounted, interactive tree view.
//!
//! [`TreeSurface`] owns a [`Tree`], the last rendered [`TreeLayout`], the
//! transition drivers, the viewport and the pointer state machine. Hosts feed
//! it events and clock readings and pull [`Frame`]s out of it.
//!
//! ```text
//! toggle / set_tree / resize / set_theme
//!        │
//!        ▼
//!   capture viewport ─► layout ─► reconcile ─► drivers ─► restore viewport
//!                                                  │
//!                           frame(now) ◄───────────┘
//! ```
//!
//! # Invariants
//!
//! 1. A relayout never changes the viewport transform once one exists; only
//!    explicit pan/zoom/reset do.
//! 2. The animation scope set by a relayout is cleared to `None` by
//!    [`tick`](TreeSurface::tick) once the transition duration has elapsed.
//! 3. Column width is computed once per tree.
//! 4. Exiting nodes stay in the frame (not clickable) until their
//!    transition ends.
//!
//! # Failure Modes
//!
//! - No tree: [`frame`](TreeSurface::frame) returns a placeholder and
//!   [`toggle`](TreeSurface::toggle) reports `NodeNotFound`.
//! - A zero-sized container falls back to the configured default.
//! - After [`detach`](TreeSurface::detach), events and toggles are ignored,
//!   pending tree changes stay in the feed, and `tick` only clears the
//!   scope flag.

use std::time::Duration;

use ftree_core::animation::ease_in_out_cubic;
use ftree_core::event::Event;
use ftree_core::geometry::{Point, Size};
use ftree_layout::layout::layout_with_column_width;
use ftree_layout::{
    BranchState, LabelMetrics, LayoutLink, LayoutNode, NodeId, Tree, TreeChange, TreeError,
    TreeLayout, column_width,
};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, info_span, trace};

use crate::config::ViewConfig;
use crate::driver::{ElementVisual, FrameDriver, LinkVisual, TransitionDriver};
use crate::interaction::{HitRegions, Intent, InteractionController};
use crate::reconcile::{AnimationScope, RenderPlan, reconcile};
use crate::scene::{Frame, LinkShape, NodeVisual, PLACEHOLDER_MESSAGE, Scene, TooltipVisual};
use crate::theme::Theme;
use crate::tooltip::{Tooltip, TooltipManager};
use crate::viewport::{ViewportController, ViewportState};

/// Per-node expand/collapse state as seen by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToggleState {
    Leaf,
    Expanded,
    Collapsed,
    /// Expanded, children still animating in.
    Expanding,
    /// Collapsed, children still animating out.
    Collapsing,
}

/// An interactive, animated view of one tree.
#[derive(Debug)]
pub struct TreeSurface<M: LabelMetrics> {
    config: ViewConfig,
    metrics: M,
    theme: Theme,
    tree: Option<Tree>,
    column_width: Option<f64>,
    layout: Option<TreeLayout>,
    /// Every node drawn since the last `set_tree`, kept while it may still
    /// be fading out.
    rendered: FxHashMap<NodeId, LayoutNode>,
    nodes: FrameDriver<NodeId, ElementVisual>,
    links: FrameDriver<LayoutLink, LinkVisual>,
    viewport: ViewportController,
    interaction: InteractionController,
    tooltip: TooltipManager,
    scope: AnimationScope,
    scope_deadline: Option<Duration>,
    /// Toggled nodes whose transition is still running, with its end time.
    pending: FxHashMap<NodeId, Duration>,
    last_plan: Option<RenderPlan>,
    detached: bool,
}

impl<M: LabelMetrics> TreeSurface<M> {
    pub fn new(metrics: M, config: ViewConfig) -> Self {
        Self {
            theme: config.theme,
            viewport: config.viewport(),
            interaction: InteractionController::from_config(&config),
            config,
            metrics,
            tree: None,
            column_width: None,
            layout: None,
            rendered: FxHashMap::default(),
            nodes: FrameDriver::new(),
            links: FrameDriver::new(),
            tooltip: TooltipManager::new(),
            scope: AnimationScope::None,
            scope_deadline: None,
            pending: FxHashMap::default(),
            last_plan: None,
            detached: false,
        }
    }

    // -----------------------------------------------------------------------
    // Tree
    // -----------------------------------------------------------------------

    /// Replace the tree. `None` shows the placeholder.
    ///
    /// A new tree gets a fresh viewport and animates in as a whole.
    pub fn set_tree(&mut self, tree: Option<Tree>, now: Duration) {
        self.detached = false;
        self.viewport.clear();
        self.nodes.clear();
        self.links.clear();
        self.rendered.clear();
        self.pending.clear();
        self.layout = None;
        self.last_plan = None;
        self.close_tooltip();

        match tree {
            Some(mut tree) => {
                // Changes made before mounting are already part of the state.
                tree.drain_changes();
                self.column_width = Some(column_width(&tree, &self.metrics, &self.config.layout));
                debug!(nodes = tree.len(), visible = tree.visible_len(), "tree mounted");
                self.tree = Some(tree);
                self.start_scope(AnimationScope::All, now);
                self.relayout(AnimationScope::All, now);
            }
            None => {
                debug!("no tree; showing placeholder");
                self.tree = None;
                self.column_width = None;
                self.scope = AnimationScope::None;
                self.scope_deadline = None;
            }
        }
    }

    pub fn tree(&self) -> Option<&Tree> {
        self.tree.as_ref()
    }

    /// Mutable access to the tree. Call [`sync`](Self::sync) afterwards to
    /// render any toggles made through it.
    pub fn tree_mut(&mut self) -> Option<&mut Tree> {
        self.tree.as_mut()
    }

    /// Render pending changes from the tree's change feed.
    ///
    /// One change scopes the animation to the toggled node's subtree;
    /// several are scoped to their deepest common ancestor. Returns `true`
    /// if a relayout happened.
    pub fn sync(&mut self, now: Duration) -> bool {
        if self.detached {
            return false;
        }
        let Some(tree) = self.tree.as_mut() else {
            return false;
        };
        let changes = tree.drain_changes();
        if changes.is_empty() {
            return false;
        }
        let until = now.saturating_add(self.config.animation);
        let mut ids = Vec::with_capacity(changes.len());
        for change in &changes {
            match *change {
                TreeChange::Toggled { id, state } => {
                    trace!(%id, %state, "change received");
                    self.pending.insert(id, until);
                    ids.push(id);
                }
            }
        }
        let root = common_ancestor(tree, &ids);
        let scope = AnimationScope::Subtree(root);
        self.start_scope(scope, now);
        self.relayout(scope, now);
        true
    }

    /// Toggle `id` and animate its subtree.
    ///
    /// Leaves are a no-op and report [`BranchState::Leaf`]. A detached
    /// surface leaves the tree alone and reports the current state.
    pub fn toggle(&mut self, id: NodeId, now: Duration) -> Result<BranchState, TreeError> {
        let tree = self.tree.as_mut().ok_or(TreeError::NodeNotFound(id))?;
        if self.detached {
            trace!(%id, "toggle ignored after detach");
            return tree.find(id).map(|node| node.state()).ok_or(TreeError::NodeNotFound(id));
        }
        let state = tree.toggle(id)?;
        if state == BranchState::Leaf {
            trace!(%id, "leaf toggle ignored");
            return Ok(state);
        }
        self.sync(now);
        Ok(state)
    }

    /// What the user sees of `id` at `now`.
    pub fn node_state(&self, id: NodeId, now: Duration) -> Option<ToggleState> {
        let node = self.tree.as_ref()?.find(id)?;
        let in_flight = self.pending.get(&id).is_some_and(|until| now < *until);
        Some(match (node.state(), in_flight) {
            (BranchState::Leaf, _) => ToggleState::Leaf,
            (BranchState::Expanded, false) => ToggleState::Expanded,
            (BranchState::Expanded, true) => ToggleState::Expanding,
            (BranchState::Collapsed, false) => ToggleState::Collapsed,
            (BranchState::Collapsed, true) => ToggleState::Collapsing,
        })
    }

    // -----------------------------------------------------------------------
    // Relayout
    // -----------------------------------------------------------------------

    fn start_scope(&mut self, scope: AnimationScope, now: Duration) {
        self.scope = scope;
        self.scope_deadline = Some(now.saturating_add(self.config.animation));
    }

    fn relayout(&mut self, scope: AnimationScope, now: Duration) {
        let Some(tree) = self.tree.as_ref() else {
            return;
        };
        let _span = info_span!("ftree.relayout", %scope).entered();

        let captured = self.viewport.capture();
        let width = match self.column_width {
            Some(width) => width,
            None => {
                let width = column_width(tree, &self.metrics, &self.config.layout);
                self.column_width = Some(width);
                width
            }
        };
        let next = layout_with_column_width(tree, &self.metrics, &self.config.layout, width);
        let plan = reconcile(self.layout.as_ref(), &next, scope, tree);
        plan.apply(
            &mut self.nodes,
            &mut self.links,
            self.config.animation,
            ease_in_out_cubic,
            now,
        );
        for node in &next {
            self.rendered.insert(node.id, node.clone());
        }
        let view = self.viewport.restore_or_initialize(captured, next.bounds());

        let stats = plan.node_stats();
        debug!(
            visible = next.len(),
            entering = stats.entering,
            updating = stats.updating,
            exiting = stats.exiting,
            animated = stats.animated,
            restored = captured.is_some(),
            scale = view.scale,
            "relayout"
        );
        self.layout = Some(next);
        self.last_plan = Some(plan);
    }

    /// Advance timers and transitions to `now`.
    ///
    /// Returns `true` while anything is still animating.
    pub fn tick(&mut self, now: Duration) -> bool {
        if self.scope_deadline.is_some_and(|at| now >= at) {
            trace!(scope = %self.scope, "animation scope cleared");
            self.scope = AnimationScope::None;
            self.scope_deadline = None;
        }
        if self.detached {
            return false;
        }
        self.pending.retain(|_, until| now < *until);
        let removed = self.nodes.tick(now) + self.links.tick(now);
        if removed > 0 {
            let layout = self.layout.as_ref();
            let nodes = &self.nodes;
            self.rendered
                .retain(|id, _| layout.is_some_and(|l| l.contains(*id)) || nodes.contains(id));
            trace!(removed, "exited elements dropped");
        }
        self.is_animating(now)
    }

    pub fn is_animating(&self, now: Duration) -> bool {
        self.nodes.is_animating(now) || self.links.is_animating(now)
    }

    // -----------------------------------------------------------------------
    // Host inputs
    // -----------------------------------------------------------------------

    /// The container changed size. Zero dimensions use the default.
    ///
    /// The relayout is immediate; transitions already in flight keep their
    /// original timing.
    pub fn resize(&mut self, size: Size, now: Duration) {
        let size = size.or_fallback(self.config.default_container);
        self.viewport.set_container(size);
        self.relayout(AnimationScope::None, now);
    }

    /// Switch colors. Positions and the viewport are untouched.
    pub fn set_theme(&mut self, theme: Theme, now: Duration) {
        self.theme = theme;
        self.relayout(AnimationScope::None, now);
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Route one input event and apply what it asks for.
    ///
    /// Returns the intents that were applied.
    pub fn handle_event(&mut self, event: &Event, now: Duration) -> Vec<Intent> {
        if self.detached {
            return Vec::new();
        }
        let regions = self.hit_regions(now);
        let intents = self.interaction.handle(event, &regions);
        for intent in &intents {
            match *intent {
                Intent::Toggle(id) => {
                    if let Err(err) = self.toggle(id, now) {
                        debug!(%id, error = %err, "toggle from click failed");
                    }
                }
                Intent::OpenTooltip { node, pointer } => {
                    self.open_tooltip(node, pointer);
                }
                Intent::CloseTooltip => {
                    self.close_tooltip();
                }
                Intent::Pan { dx, dy } => self.viewport.pan_by(dx, dy),
                Intent::Zoom { anchor, factor } => self.viewport.zoom_at(anchor, factor),
                Intent::Resize(size) => self.resize(size, now),
            }
        }
        intents
    }

    /// Stop reacting to input: drop pointer capture, the outside-click
    /// listener and the tooltip.
    pub fn detach(&mut self) {
        self.detached = true;
        self.interaction.detach();
        self.tooltip.close();
        debug!("surface detached");
    }

    pub fn is_detached(&self) -> bool {
        self.detached
    }

    // -----------------------------------------------------------------------
    // Tooltip
    // -----------------------------------------------------------------------

    /// Show the comment of `node` near `pointer` (screen coordinates).
    ///
    /// Returns `false` if the node has no comment.
    pub fn open_tooltip(&mut self, node: NodeId, pointer: Point) -> bool {
        let Some(comment) = self
            .tree
            .as_ref()
            .and_then(|t| t.find(node))
            .filter(|n| n.has_comment())
            .and_then(|n| n.comment())
        else {
            return false;
        };
        let style = self.viewport.tooltip_style(&self.config.tooltip);
        let tooltip = Tooltip::layout(
            node,
            comment,
            pointer,
            style,
            &self.metrics,
            &self.config.layout.font.family,
        );
        trace!(%node, "tooltip opened");
        self.tooltip.open(tooltip);
        true
    }

    /// Returns `true` if a tooltip was open.
    pub fn close_tooltip(&mut self) -> bool {
        self.interaction.tooltip_closed();
        self.tooltip.close()
    }

    pub fn tooltip(&self) -> Option<&Tooltip> {
        self.tooltip.current()
    }

    // -----------------------------------------------------------------------
    // Viewport
    // -----------------------------------------------------------------------

    pub fn viewport(&self) -> &ViewportController {
        &self.viewport
    }

    pub fn viewport_state(&self) -> ViewportState {
        self.viewport.state()
    }

    /// Overwrite the transform (scale is clamped).
    pub fn set_viewport(&mut self, state: ViewportState) {
        self.viewport.set_state(state);
    }

    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.viewport.pan_by(dx, dy);
    }

    pub fn zoom_at(&mut self, anchor: Point, factor: f64) {
        self.viewport.zoom_at(anchor, factor);
    }

    pub fn zoom_in(&mut self) {
        self.viewport.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.viewport.zoom_out();
    }

    /// Back to the transform the tree was first shown with.
    pub fn reset_view(&mut self) {
        self.viewport.reset();
    }

    // -----------------------------------------------------------------------
    // Output
    // -----------------------------------------------------------------------

    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    pub fn scope(&self) -> AnimationScope {
        self.scope
    }

    pub fn layout(&self) -> Option<&TreeLayout> {
        self.layout.as_ref()
    }

    /// Plan of the most recent relayout.
    pub fn last_plan(&self) -> Option<&RenderPlan> {
        self.last_plan.as_ref()
    }

    /// Everything to draw at `now`.
    pub fn frame(&self, now: Duration) -> Frame {
        let palette = self.theme.palette();
        let (Some(layout), Some(_)) = (self.layout.as_ref(), self.tree.as_ref()) else {
            return Frame::Placeholder {
                message: PLACEHOLDER_MESSAGE.to_string(),
                background: palette.background,
            };
        };
        let constants = &self.config.layout;

        let mut nodes: Vec<NodeVisual> = layout
            .iter()
            .map(|node| {
                let visual = self
                    .nodes
                    .sample(&node.id, now)
                    .unwrap_or_else(|| ElementVisual::shown(node.position()));
                NodeVisual::new(node, visual, constants, &palette, false)
            })
            .collect();
        let mut leaving: Vec<&LayoutNode> = self
            .rendered
            .values()
            .filter(|n| !layout.contains(n.id) && self.nodes.contains(&n.id))
            .collect();
        leaving.sort_by_key(|n| n.id);
        for node in leaving {
            if let Some(visual) = self.nodes.sample(&node.id, now) {
                nodes.push(NodeVisual::new(node, visual, constants, &palette, true));
            }
        }

        let mut links: Vec<LinkShape> = Vec::with_capacity(layout.links().len());
        let current: FxHashSet<LayoutLink> = layout.links().iter().copied().collect();
        for link in layout.links() {
            let visual = self.links.sample(link, now).or_else(|| {
                let source = layout.get(link.source)?.position();
                let target = layout.get(link.target)?.position();
                Some(LinkVisual::new(source, target, 1.0))
            });
            if let Some(visual) = visual {
                links.push(LinkShape::new(*link, visual, &palette));
            }
        }
        let mut leaving_links: Vec<(LayoutLink, LinkVisual)> = self
            .links
            .iter(now)
            .filter(|(link, _)| !current.contains(link))
            .collect();
        leaving_links.sort_by_key(|(link, _)| (link.source, link.target));
        links.extend(
            leaving_links
                .into_iter()
                .map(|(link, visual)| LinkShape::new(link, visual, &palette)),
        );

        Frame::Scene(Scene {
            viewport: self.viewport.state(),
            background: palette.background,
            links,
            nodes,
            tooltip: self
                .tooltip
                .current()
                .cloned()
                .map(|t| TooltipVisual::new(t, &palette)),
        })
    }

    fn hit_regions(&self, now: Duration) -> HitRegions {
        match self.frame(now) {
            Frame::Scene(scene) => scene.hit_regions(),
            Frame::Placeholder { .. } => HitRegions::new(self.viewport.state()),
        }
    }
}

/// Deepest node whose subtree contains every id in `ids`.
fn common_ancestor(tree: &Tree, ids: &[NodeId]) -> NodeId {
    let mut paths = ids.iter().filter_map(|id| tree.path_to(*id));
    let Some(mut prefix) = paths.next() else {
        return tree.root().id();
    };
    for path in paths {
        let shared = prefix.iter().zip(&path).take_while(|(a, b)| a == b).count();
        prefix.truncate(shared);
    }
    prefix.last().copied().unwrap_or_else(|| tree.root().id())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ftree_core::event::PointerEvent;
    use ftree_layout::{FixedMetrics, NodeRecord};
    use pretty_assertions::assert_eq;
    use tracing_test::traced_test;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    // 0 Root
    // ├─ 1 ClassA "doc"
    // │  ├─ 2 m1
    // │  └─ 3 m2
    // └─ 4 ClassB
    //    └─ 5 m3
    fn tree() -> Tree {
        Tree::from_record(
            NodeRecord::new("Root")
                .child(
                    NodeRecord::new("ClassA")
                        .comment("Holds the A things.")
                        .child(NodeRecord::new("m1"))
                        .child(NodeRecord::new("m2")),
                )
                .child(NodeRecord::new("ClassB").child(NodeRecord::new("m3"))),
        )
    }

    fn surface() -> TreeSurface<FixedMetrics> {
        let mut s = TreeSurface::new(FixedMetrics::new(10.0), ViewConfig::default());
        s.set_tree(Some(tree()), ms(0));
        s
    }

    fn screen_of(s: &TreeSurface<FixedMetrics>, id: NodeId) -> Point {
        let node = s.layout().and_then(|l| l.get(id)).expect("visible");
        s.viewport().world_to_screen(node.position())
    }

    #[test]
    fn placeholder_without_tree() {
        let mut s = TreeSurface::new(FixedMetrics::new(10.0), ViewConfig::default());
        assert!(s.frame(ms(0)).is_placeholder());
        assert!(matches!(
            s.toggle(NodeId(0), ms(0)),
            Err(TreeError::NodeNotFound(NodeId(0)))
        ));
        s.set_tree(Some(tree()), ms(0));
        assert!(!s.frame(ms(0)).is_placeholder());
        s.set_tree(None, ms(10));
        match s.frame(ms(10)) {
            Frame::Placeholder { message, .. } => assert_eq!(message, PLACEHOLDER_MESSAGE),
            Frame::Scene(_) => panic!("expected placeholder"),
        }
    }

    #[test]
    fn first_render_animates_everything_then_clears_scope() {
        let mut s = surface();
        assert_eq!(s.scope(), AnimationScope::All);
        let plan = s.last_plan().expect("plan");
        assert_eq!(plan.animated_nodes().len(), 6);
        assert!(s.tick(ms(100)));
        assert_eq!(s.scope(), AnimationScope::All);
        assert!(!s.tick(ms(750)));
        assert_eq!(s.scope(), AnimationScope::None);
        // Idempotent.
        s.tick(ms(800));
        assert_eq!(s.scope(), AnimationScope::None);
    }

    #[test]
    fn toggle_scopes_to_subtree_and_tracks_state() {
        let mut s = surface();
        s.tick(ms(1000));
        assert_eq!(s.toggle(NodeId(1), ms(1000)).expect("toggle"), BranchState::Collapsed);
        assert_eq!(s.scope(), AnimationScope::Subtree(NodeId(1)));
        assert_eq!(s.node_state(NodeId(1), ms(1100)), Some(ToggleState::Collapsing));
        assert_eq!(s.node_state(NodeId(4), ms(1100)), Some(ToggleState::Expanded));
        assert_eq!(s.node_state(NodeId(2), ms(1100)), Some(ToggleState::Leaf));

        // Children fade out and stay drawn until the transition ends.
        let scene = s.frame(ms(1100));
        let m1 = scene.as_scene().and_then(|sc| sc.node(NodeId(2))).expect("exiting m1");
        assert!(m1.exiting);
        assert!(m1.opacity < 1.0 && m1.opacity > 0.0);

        s.tick(ms(1750));
        assert_eq!(s.scope(), AnimationScope::None);
        assert_eq!(s.node_state(NodeId(1), ms(1750)), Some(ToggleState::Collapsed));
        let frame = s.frame(ms(1750));
        let scene = frame.as_scene().expect("scene");
        assert_eq!(scene.nodes.len(), 4);
        assert_eq!(scene.links.len(), 3);
    }

    #[test]
    fn leaf_toggle_is_noop() {
        let mut s = surface();
        s.tick(ms(1000));
        assert_eq!(s.toggle(NodeId(5), ms(1000)).expect("leaf"), BranchState::Leaf);
        assert_eq!(s.scope(), AnimationScope::None);
    }

    #[test]
    fn sync_scopes_multiple_changes_to_common_ancestor() {
        let mut s = surface();
        s.tick(ms(1000));
        let tree = s.tree_mut().expect("tree");
        tree.toggle(NodeId(1)).expect("a");
        tree.toggle(NodeId(4)).expect("b");
        assert!(s.sync(ms(1000)));
        assert_eq!(s.scope(), AnimationScope::Subtree(NodeId(0)));
        assert!(!s.sync(ms(1001)));
    }

    #[test]
    fn common_ancestor_of_nested_ids() {
        let t = tree();
        assert_eq!(common_ancestor(&t, &[NodeId(2), NodeId(3)]), NodeId(1));
        assert_eq!(common_ancestor(&t, &[NodeId(1), NodeId(2)]), NodeId(1));
        assert_eq!(common_ancestor(&t, &[NodeId(3)]), NodeId(3));
        assert_eq!(common_ancestor(&t, &[]), NodeId(0));
    }

    #[test]
    fn relayouts_preserve_viewport() {
        let mut s = surface();
        let state = ViewportState::new(120.0, 40.0, 1.4);
        s.set_viewport(state);
        s.toggle(NodeId(4), ms(10)).expect("toggle");
        assert_eq!(s.viewport_state(), state);
        s.set_theme(Theme::Dark, ms(20));
        assert_eq!(s.viewport_state(), state);
        s.resize(Size::new(0.0, 0.0), ms(30));
        assert_eq!(s.viewport_state(), state);
        assert_eq!(s.viewport().container(), Size::new(1000.0, 600.0));
    }

    #[test]
    fn theme_changes_colors_only() {
        let mut s = surface();
        s.tick(ms(1000));
        let before = s.frame(ms(1000));
        s.set_theme(Theme::Dark, ms(1000));
        let after = s.frame(ms(1000));
        let (a, b) = (before.as_scene().expect("a"), after.as_scene().expect("b"));
        assert_eq!(b.background, Theme::Dark.palette().background);
        for (x, y) in a.nodes.iter().zip(&b.nodes) {
            assert_eq!(x.position, y.position);
            assert_eq!(y.fill, Theme::Dark.palette().node_fill);
        }
        assert!(!s.last_plan().expect("plan").is_animated());
    }

    #[test]
    fn click_on_node_toggles_it() {
        let mut s = surface();
        s.tick(ms(1000));
        let at = screen_of(&s, NodeId(4));
        s.handle_event(&Event::Pointer(PointerEvent::down(at.x, at.y)), ms(1000));
        let intents = s.handle_event(&Event::Pointer(PointerEvent::up(at.x, at.y)), ms(1001));
        assert_eq!(intents, vec![Intent::Toggle(NodeId(4))]);
        assert_eq!(s.node_state(NodeId(4), ms(1001)), Some(ToggleState::Collapsing));
    }

    #[test]
    fn indicator_click_opens_tooltip_and_outside_click_closes_it() {
        let mut s = surface();
        s.tick(ms(1000));
        let scene = s.frame(ms(1000));
        let ind = scene
            .as_scene()
            .and_then(|sc| sc.node(NodeId(1)))
            .and_then(|n| n.indicator)
            .expect("indicator");
        let at = s.viewport().world_to_screen(ind.center);
        s.handle_event(&Event::Pointer(PointerEvent::down(at.x, at.y)), ms(1000));
        s.handle_event(&Event::Pointer(PointerEvent::up(at.x, at.y)), ms(1000));
        let tip = s.tooltip().expect("tooltip");
        assert_eq!(tip.node, NodeId(1));
        assert_eq!(tip.text, "Holds the A things.");
        // Click on the ClassA node itself: the indicator did not toggle it.
        assert_eq!(s.node_state(NodeId(1), ms(1000)), Some(ToggleState::Expanded));

        // Background click far away.
        s.handle_event(&Event::Pointer(PointerEvent::down(-500.0, -500.0)), ms(1100));
        s.handle_event(&Event::Pointer(PointerEvent::up(-500.0, -500.0)), ms(1100));
        assert!(s.tooltip().is_none());
    }

    #[test]
    fn tooltip_scales_with_viewport() {
        let mut s = surface();
        s.set_viewport(ViewportState::new(0.0, 0.0, 2.0));
        assert!(s.open_tooltip(NodeId(1), Point::new(10.0, 10.0)));
        let tip = s.tooltip().expect("open");
        assert_eq!(tip.style.font_size, 28.0);
        assert_eq!((tip.rect.x, tip.rect.y), (30.0, -10.0));
        assert!(!s.open_tooltip(NodeId(2), Point::ORIGIN), "m1 has no comment");
    }

    #[test]
    fn drag_pans_viewport() {
        let mut s = surface();
        let start = s.viewport_state();
        s.handle_event(&Event::Pointer(PointerEvent::down(-500.0, -500.0)), ms(0));
        s.handle_event(&Event::Pointer(PointerEvent::moved(-480.0, -490.0)), ms(1));
        s.handle_event(&Event::Pointer(PointerEvent::up(-480.0, -490.0)), ms(2));
        let end = s.viewport_state();
        assert_eq!(end.translate_x - start.translate_x, 20.0);
        assert_eq!(end.translate_y - start.translate_y, 10.0);
        assert_eq!(end.scale, start.scale);
    }

    #[test]
    fn detach_ignores_input_but_clears_scope() {
        let mut s = surface();
        s.detach();
        assert!(s.is_detached());
        let at = screen_of(&s, NodeId(4));
        assert!(s.handle_event(&Event::Pointer(PointerEvent::down(at.x, at.y)), ms(1)).is_empty());
        assert!(!s.tick(ms(800)));
        assert_eq!(s.scope(), AnimationScope::None);
    }

    #[test]
    fn resize_mid_toggle_does_not_stretch_the_batch() {
        let mut s = surface();
        s.tick(ms(1000));
        s.toggle(NodeId(1), ms(1000)).expect("collapse");
        s.resize(Size::new(800.0, 500.0), ms(1375));
        assert!(!s.last_plan().expect("plan").is_animated());
        // The collapse still finishes on its own schedule.
        assert!(!s.tick(ms(1750)));
        assert_eq!(s.scope(), AnimationScope::None);

        s.toggle(NodeId(4), ms(2000)).expect("collapse");
        s.set_theme(Theme::Dark, ms(2100));
        assert!(!s.last_plan().expect("plan").is_animated());
        assert!(!s.tick(ms(2750)));
    }

    #[test]
    fn detached_toggle_leaves_tree_and_layout_alone() {
        let mut s = surface();
        s.tick(ms(1000));
        s.detach();
        assert_eq!(s.toggle(NodeId(1), ms(1000)).expect("known"), BranchState::Expanded);
        let class_a = s.tree().and_then(|t| t.find(NodeId(1))).map(|n| n.state());
        assert_eq!(class_a, Some(BranchState::Expanded));
        assert!(s.layout().expect("layout").contains(NodeId(2)));

        // External changes wait in the feed instead of being dropped.
        s.tree_mut().expect("tree").toggle(NodeId(4)).expect("b");
        assert!(!s.sync(ms(1000)));
        assert_eq!(s.tree_mut().expect("tree").drain_changes().len(), 1);
    }

    #[test]
    fn inverted_scale_extent_does_not_panic_on_mount() {
        let config = ViewConfig {
            scale_extent: crate::viewport::ScaleExtent::new(3.0, 2.0),
            ..ViewConfig::default()
        };
        let mut s = TreeSurface::new(FixedMetrics::new(10.0), config);
        s.set_tree(Some(tree()), ms(0));
        assert_eq!(s.viewport_state().scale, 2.0);
        s.zoom_in();
        s.zoom_out();
        assert_eq!(s.viewport_state().scale, 2.0);
    }

    #[traced_test]
    #[test]
    fn relayout_is_logged() {
        let mut s = surface();
        s.toggle(NodeId(1), ms(5)).expect("toggle");
        assert!(logs_contain("relayout"));
        assert!(logs_contain("tree mounted"));
    }
}
