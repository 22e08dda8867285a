#![forbid(unsafe_code)]

//! Backend-neutral display list.
//!
//! A [`Scene`] is everything a renderer needs to draw one frame: the
//! viewport transform, links and nodes in world coordinates with their
//! current animated position and opacity, resolved palette colors, and the
//! open tooltip in screen coordinates. Renderers draw links first, then
//! nodes in order, then the tooltip.
//!
//! # Invariants
//!
//! 1. A comment indicator is present iff the node's comment is non-empty and
//!    not the "no comment" sentinel.
//! 2. Branches carry a toggle glyph (up when expanded, right when
//!    collapsed); leaves carry none.
//! 3. Link paths are horizontal cubic curves whose control points share the
//!    midpoint depth coordinate.

use ftree_core::geometry::{Point, Rect, Size};
use ftree_layout::{BranchState, FontSpec, LayoutConstants, LayoutLink, LayoutNode, NodeId};

use crate::driver::{ElementVisual, LinkVisual};
use crate::interaction::HitRegions;
use crate::theme::{Palette, Rgba};
use crate::tooltip::Tooltip;
use crate::viewport::ViewportState;

/// Shown instead of a scene when no tree is loaded.
pub const PLACEHOLDER_MESSAGE: &str = "No tree data available.";

pub const NODE_CORNER_RADIUS: f64 = 8.0;
pub const NODE_STROKE_WIDTH: f64 = 1.4;
pub const LINK_STROKE_WIDTH: f64 = 1.6;
pub const INDICATOR_RADIUS: f64 = 10.0;

const INDICATOR_MIN_OFFSET: f64 = 24.0;
const INDICATOR_GAP: f64 = 16.0;
const INDICATOR_DY: f64 = -8.0;
const TOGGLE_MIN_OFFSET: f64 = 18.0;
const TOGGLE_DY: f64 = -6.0;

/// Glyph for an expanded branch, relative to its origin.
pub const EXPANDED_GLYPH: &str = "M -6 8 L 0 2 L 6 8 Z";
/// Glyph for a collapsed branch, relative to its origin.
pub const COLLAPSED_GLYPH: &str = "M -3 -6 L 3 0 L -3 6 Z";

/// Horizontal distance from a node's center to its comment indicator.
pub fn indicator_offset(label_width: f64, padding: f64) -> f64 {
    ((label_width.ceil() / 2.0).ceil() + padding + INDICATOR_GAP).max(INDICATOR_MIN_OFFSET)
}

/// Horizontal distance from a node's center to its toggle glyph.
pub fn toggle_offset(label_width: f64, padding: f64) -> f64 {
    ((label_width.ceil() / 2.0).ceil() + padding).max(TOGGLE_MIN_OFFSET)
}

/// Cubic link path from `source` to `target`, bending along the depth axis.
pub fn link_path(source: Point, target: Point) -> String {
    let mx = (source.x + target.x) / 2.0;
    format!(
        "M {},{} C {},{} {},{} {},{}",
        source.x, source.y, mx, source.y, mx, target.y, target.x, target.y
    )
}

// ---------------------------------------------------------------------------
// Elements
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorVisual {
    pub center: Point,
    pub radius: f64,
    pub fill: Rgba,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToggleGlyph {
    pub origin: Point,
    /// SVG path data relative to `origin`.
    pub path: &'static str,
    pub fill: Rgba,
}

/// One node as drawn this frame.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeVisual {
    pub id: NodeId,
    pub label: String,
    pub kind: Option<String>,
    pub state: BranchState,
    /// Animated center.
    pub position: Point,
    pub opacity: f64,
    /// Box around `position`.
    pub bounds: Rect,
    pub corner_radius: f64,
    pub stroke_width: f64,
    pub fill: Rgba,
    pub stroke: Rgba,
    pub text_color: Rgba,
    pub font: FontSpec,
    pub indicator: Option<IndicatorVisual>,
    pub toggle: Option<ToggleGlyph>,
    /// Still fading out after leaving the layout.
    pub exiting: bool,
}

impl NodeVisual {
    pub fn new(
        node: &LayoutNode,
        visual: ElementVisual,
        constants: &LayoutConstants,
        palette: &Palette,
        exiting: bool,
    ) -> Self {
        let at = visual.position;
        let padding = constants.horizontal_padding;
        let indicator = node.has_comment.then(|| IndicatorVisual {
            center: Point::new(at.x + indicator_offset(node.label_width, padding), at.y + INDICATOR_DY),
            radius: INDICATOR_RADIUS,
            fill: palette.indicator,
        });
        let glyph = match node.state {
            BranchState::Leaf => None,
            BranchState::Expanded => Some(EXPANDED_GLYPH),
            BranchState::Collapsed => Some(COLLAPSED_GLYPH),
        };
        let toggle = glyph.map(|path| ToggleGlyph {
            origin: Point::new(at.x + toggle_offset(node.label_width, padding), at.y + TOGGLE_DY),
            path,
            fill: palette.toggle,
        });
        Self {
            id: node.id,
            label: node.label.clone(),
            kind: node.kind.clone(),
            state: node.state,
            position: at,
            opacity: visual.opacity,
            bounds: Rect::centered(at, Size::new(node.box_width, node.box_height)),
            corner_radius: NODE_CORNER_RADIUS,
            stroke_width: NODE_STROKE_WIDTH,
            fill: palette.node_fill,
            stroke: palette.node_stroke,
            text_color: palette.text,
            font: constants.font.clone(),
            indicator,
            toggle,
            exiting,
        }
    }
}

/// One link as drawn this frame.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkShape {
    pub link: LayoutLink,
    pub source: Point,
    pub target: Point,
    pub opacity: f64,
    /// SVG path data, world coordinates.
    pub path: String,
    pub stroke: Rgba,
    pub stroke_width: f64,
}

impl LinkShape {
    pub fn new(link: LayoutLink, visual: LinkVisual, palette: &Palette) -> Self {
        Self {
            link,
            source: visual.source,
            target: visual.target,
            opacity: visual.opacity,
            path: link_path(visual.source, visual.target),
            stroke: palette.link,
            stroke_width: LINK_STROKE_WIDTH,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TooltipVisual {
    pub tooltip: Tooltip,
    pub background: Rgba,
    pub border: Rgba,
    pub text: Rgba,
}

impl TooltipVisual {
    pub fn new(tooltip: Tooltip, palette: &Palette) -> Self {
        Self {
            tooltip,
            background: palette.tooltip_background,
            border: palette.tooltip_border,
            text: palette.tooltip_text,
        }
    }
}

// ---------------------------------------------------------------------------
// Scene / Frame
// ---------------------------------------------------------------------------

/// One frame of a loaded tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub viewport: ViewportState,
    pub background: Rgba,
    pub links: Vec<LinkShape>,
    pub nodes: Vec<NodeVisual>,
    pub tooltip: Option<TooltipVisual>,
}

impl Scene {
    pub fn node(&self, id: NodeId) -> Option<&NodeVisual> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn link(&self, link: LayoutLink) -> Option<&LinkShape> {
        self.links.iter().find(|l| l.link == link)
    }

    /// Clickable regions, in draw order. Exiting nodes are not clickable.
    pub fn hit_regions(&self) -> HitRegions {
        let mut regions = HitRegions::new(self.viewport);
        for node in self.nodes.iter().filter(|n| !n.exiting) {
            regions.push_node(node.id, node.bounds);
            if let Some(ind) = node.indicator {
                regions.push_indicator(node.id, ind.center, ind.radius);
            }
        }
        if let Some(t) = &self.tooltip {
            regions.set_tooltip(t.tooltip.rect, t.tooltip.close_button);
        }
        regions
    }
}

/// What a surface shows.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    /// No tree loaded.
    Placeholder { message: String, background: Rgba },
    Scene(Scene),
}

impl Frame {
    pub fn as_scene(&self) -> Option<&Scene> {
        match self {
            Self::Scene(scene) => Some(scene),
            Self::Placeholder { .. } => None,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn layout_node(label_width: f64, state: BranchState, has_comment: bool) -> LayoutNode {
        let c = LayoutConstants::default();
        LayoutNode {
            id: NodeId(1),
            parent: Some(NodeId(0)),
            label: "x".into(),
            kind: None,
            has_comment,
            state,
            depth: 1,
            sibling_index: 0,
            x: 100.0,
            y: 50.0,
            box_width: c.box_width(label_width),
            box_height: c.node_height,
            label_width,
        }
    }

    #[test]
    fn link_path_is_horizontal_cubic() {
        let d = link_path(Point::new(0.0, 10.0), Point::new(100.0, 50.5));
        assert_eq!(d, "M 0,10 C 50,10 50,50.5 100,50.5");
    }

    #[test]
    fn offsets() {
        // Short labels clamp to the minimum.
        assert_eq!(indicator_offset(0.0, 14.0), 30.0);
        assert_eq!(indicator_offset(0.0, 0.0), 24.0);
        assert_eq!(toggle_offset(0.0, 0.0), 18.0);
        // ceil(ceil(100.2) / 2) = 51
        assert_eq!(indicator_offset(100.2, 14.0), 81.0);
        assert_eq!(toggle_offset(100.2, 14.0), 65.0);
    }

    #[test]
    fn node_decorations_follow_state() {
        let c = LayoutConstants::default();
        let p = Palette::LIGHT;
        let at = ElementVisual::new(Point::new(100.0, 50.0), 0.5);

        let leaf = NodeVisual::new(&layout_node(10.0, BranchState::Leaf, false), at, &c, &p, false);
        assert!(leaf.toggle.is_none());
        assert!(leaf.indicator.is_none());
        assert_eq!(leaf.opacity, 0.5);

        let open = NodeVisual::new(&layout_node(10.0, BranchState::Expanded, true), at, &c, &p, false);
        let glyph = open.toggle.expect("branch glyph");
        // Apex above the base: points up.
        assert_eq!(glyph.path, "M -6 8 L 0 2 L 6 8 Z");
        // max(18, ceil(10 / 2) + 14) = 19
        assert_eq!(glyph.origin, Point::new(100.0 + 19.0, 44.0));
        let ind = open.indicator.expect("indicator");
        assert_eq!(ind.center, Point::new(100.0 + 35.0, 42.0));
        assert_eq!(ind.fill, Rgba::rgb(0xff, 0x99, 0x00));

        let shut = NodeVisual::new(&layout_node(10.0, BranchState::Collapsed, false), at, &c, &p, false);
        assert_eq!(shut.toggle.map(|t| t.path), Some(COLLAPSED_GLYPH));
        assert_eq!(shut.bounds.center(), Point::new(100.0, 50.0));
    }

    #[test]
    fn exiting_nodes_are_not_hit() {
        let c = LayoutConstants::default();
        let p = Palette::LIGHT;
        let at = ElementVisual::shown(Point::new(100.0, 50.0));
        let scene = Scene {
            viewport: ViewportState::IDENTITY,
            background: p.background,
            links: Vec::new(),
            nodes: vec![NodeVisual::new(&layout_node(10.0, BranchState::Leaf, true), at, &c, &p, true)],
            tooltip: None,
        };
        let regions = scene.hit_regions();
        assert_eq!(
            regions.hit(Point::new(100.0, 50.0)),
            crate::interaction::HitTarget::Background
        );
    }
}
