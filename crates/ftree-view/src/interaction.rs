#![forbid(unsafe_code)]

//! Pointer and wheel handling.
//!
//! [`InteractionController`] turns canonical [`Event`]s into [`Intent`]s. It
//! owns no tree or viewport state of its own; the surface hands it a
//! snapshot of what is on screen ([`HitRegions`]) and applies the intents it
//! returns.
//!
//! # Invariants
//!
//! 1. A press that travels no farther than `click_distance` before release
//!    is a click, even if it panned the view slightly on the way.
//! 2. Indicator hits win over node hits; among overlapping elements the one
//!    drawn last wins.
//! 3. The outside-click listener armed by an indicator click never sees the
//!    click that armed it. Arming is deferred to the end of the dispatch.
//! 4. Clicks on any indicator or inside the tooltip are not "outside".
//!
//! # Failure Modes
//!
//! - Non-primary buttons are ignored.
//! - A pointer that leaves the container mid-press drops the press without
//!   emitting a click.

use ftree_core::event::{
    Event, Modifiers, PointerButton, PointerEvent, PointerEventKind, WheelDeltaMode, WheelEvent,
};
use ftree_core::geometry::{Point, Rect, Size};
use ftree_layout::NodeId;
use tracing::trace;

use crate::config::ViewConfig;
use crate::viewport::ViewportState;

// Wheel exponent per delta unit, d3 compatible.
const WHEEL_PIXEL_FACTOR: f64 = 0.002;
const WHEEL_LINE_FACTOR: f64 = 0.05;
const WHEEL_PAGE_FACTOR: f64 = 1.0;

/// What the surface should do in response to an event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Intent {
    /// Toggle a node and relayout with its subtree in scope.
    Toggle(NodeId),
    /// Show the comment of `node` near `pointer` (screen coordinates).
    OpenTooltip { node: NodeId, pointer: Point },
    CloseTooltip,
    /// Translate the view by screen pixels.
    Pan { dx: f64, dy: f64 },
    /// Multiply the scale by `factor`, keeping `anchor` fixed.
    Zoom { anchor: Point, factor: f64 },
    Resize(Size),
}

/// What lies under a screen point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    Node(NodeId),
    Indicator(NodeId),
    Tooltip,
    TooltipClose,
    Background,
}

// ---------------------------------------------------------------------------
// Hit regions
// ---------------------------------------------------------------------------

/// Snapshot of the clickable elements on screen, in draw order.
#[derive(Debug, Clone, Default)]
pub struct HitRegions {
    viewport: ViewportState,
    /// Node boxes, world coordinates.
    nodes: Vec<(NodeId, Rect)>,
    /// Indicator circles (center, radius), world coordinates.
    indicators: Vec<(NodeId, Point, f64)>,
    /// Tooltip body and close button, screen coordinates.
    tooltip: Option<(Rect, Rect)>,
}

impl HitRegions {
    pub fn new(viewport: ViewportState) -> Self {
        Self {
            viewport,
            ..Self::default()
        }
    }

    pub fn push_node(&mut self, id: NodeId, bounds: Rect) {
        self.nodes.push((id, bounds));
    }

    pub fn push_indicator(&mut self, id: NodeId, center: Point, radius: f64) {
        self.indicators.push((id, center, radius));
    }

    pub fn set_tooltip(&mut self, body: Rect, close_button: Rect) {
        self.tooltip = Some((body, close_button));
    }

    /// Topmost target at `screen`.
    pub fn hit(&self, screen: Point) -> HitTarget {
        if let Some((body, close)) = self.tooltip {
            if close.contains(screen) {
                return HitTarget::TooltipClose;
            }
            if body.contains(screen) {
                return HitTarget::Tooltip;
            }
        }
        let world = self.viewport.invert(screen);
        if let Some((id, ..)) = self
            .indicators
            .iter()
            .rev()
            .find(|(_, c, r)| c.distance(world) <= *r)
        {
            return HitTarget::Indicator(*id);
        }
        if let Some((id, _)) = self.nodes.iter().rev().find(|(_, b)| b.contains(world)) {
            return HitTarget::Node(*id);
        }
        HitTarget::Background
    }
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
struct Press {
    origin: Point,
    last: Point,
    target: HitTarget,
    /// Travelled beyond the click distance at some point.
    moved: bool,
}

/// Outside-click listener lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Listener {
    #[default]
    Disarmed,
    /// Registered during the current dispatch; becomes active after it.
    Pending,
    Armed,
}

/// Per-surface pointer state machine.
#[derive(Debug, Clone)]
pub struct InteractionController {
    click_distance: f64,
    zoom_requires_ctrl: bool,
    press: Option<Press>,
    listener: Listener,
}

impl InteractionController {
    pub fn new(click_distance: f64, zoom_requires_ctrl: bool) -> Self {
        Self {
            click_distance,
            zoom_requires_ctrl,
            press: None,
            listener: Listener::Disarmed,
        }
    }

    pub fn from_config(config: &ViewConfig) -> Self {
        Self::new(config.click_distance, config.zoom_requires_ctrl)
    }

    /// Route one event.
    pub fn handle(&mut self, event: &Event, regions: &HitRegions) -> Vec<Intent> {
        let mut intents = Vec::new();
        match event {
            Event::Pointer(pointer) => self.on_pointer(pointer, regions, &mut intents),
            Event::Wheel(wheel) => self.on_wheel(wheel, &mut intents),
            Event::Resize(size) => intents.push(Intent::Resize(*size)),
        }
        // Listeners registered while handling this event start listening now.
        if self.listener == Listener::Pending {
            self.listener = Listener::Armed;
        }
        intents
    }

    fn on_pointer(&mut self, event: &PointerEvent, regions: &HitRegions, out: &mut Vec<Intent>) {
        let at = event.position;
        match event.kind {
            PointerEventKind::Down(PointerButton::Primary) => {
                let target = regions.hit(at);
                self.press = Some(Press {
                    origin: at,
                    last: at,
                    target,
                    moved: false,
                });
            }
            PointerEventKind::Move => {
                let Some(press) = self.press.as_mut() else {
                    return;
                };
                if matches!(press.target, HitTarget::Tooltip | HitTarget::TooltipClose) {
                    return;
                }
                let (dx, dy) = (at.x - press.last.x, at.y - press.last.y);
                press.last = at;
                if press.origin.distance(at) > self.click_distance {
                    press.moved = true;
                }
                if dx != 0.0 || dy != 0.0 {
                    out.push(Intent::Pan { dx, dy });
                }
            }
            PointerEventKind::Up(PointerButton::Primary) => {
                let Some(press) = self.press.take() else {
                    return;
                };
                if press.moved || press.origin.distance(at) > self.click_distance {
                    trace!(?press.origin, ?at, "press travelled; not a click");
                    return;
                }
                self.click(press.target, at, out);
            }
            PointerEventKind::Leave => {
                if self.press.take().is_some() {
                    trace!("pointer left mid-press");
                }
            }
            PointerEventKind::Down(_) | PointerEventKind::Up(_) => {}
        }
    }

    fn click(&mut self, target: HitTarget, at: Point, out: &mut Vec<Intent>) {
        trace!(?target, "click");
        let outside = !matches!(
            target,
            HitTarget::Tooltip | HitTarget::TooltipClose | HitTarget::Indicator(_)
        );
        if self.listener == Listener::Armed && outside {
            self.listener = Listener::Disarmed;
            out.push(Intent::CloseTooltip);
        }
        match target {
            HitTarget::Indicator(node) => {
                out.push(Intent::OpenTooltip { node, pointer: at });
                self.listener = Listener::Pending;
            }
            HitTarget::Node(id) => out.push(Intent::Toggle(id)),
            HitTarget::TooltipClose => {
                self.listener = Listener::Disarmed;
                out.push(Intent::CloseTooltip);
            }
            HitTarget::Tooltip | HitTarget::Background => {}
        }
    }

    fn on_wheel(&mut self, event: &WheelEvent, out: &mut Vec<Intent>) {
        if self.zoom_requires_ctrl && !event.modifiers.contains(Modifiers::CTRL) {
            trace!("wheel ignored without ctrl");
            return;
        }
        let factor = wheel_factor(event.delta_y, event.delta_mode);
        if factor.is_finite() && factor > 0.0 && factor != 1.0 {
            out.push(Intent::Zoom {
                anchor: event.position,
                factor,
            });
        }
    }

    /// True while a press is held.
    pub fn is_pressed(&self) -> bool {
        self.press.is_some()
    }

    /// True once the press has travelled beyond the click distance.
    pub fn is_dragging(&self) -> bool {
        self.press.is_some_and(|p| p.moved)
    }

    /// True while the outside-click listener is active.
    pub fn listener_armed(&self) -> bool {
        self.listener == Listener::Armed
    }

    /// The tooltip was closed by other means; stop listening.
    pub fn tooltip_closed(&mut self) {
        self.listener = Listener::Disarmed;
    }

    /// Drop the press capture and any listener.
    pub fn detach(&mut self) {
        self.press = None;
        self.listener = Listener::Disarmed;
    }
}

impl Default for InteractionController {
    fn default() -> Self {
        Self::from_config(&ViewConfig::default())
    }
}

/// Zoom factor for one wheel step: `2^(-delta * k)`.
pub fn wheel_factor(delta_y: f64, mode: WheelDeltaMode) -> f64 {
    let k = match mode {
        WheelDeltaMode::Pixel => WHEEL_PIXEL_FACTOR,
        WheelDeltaMode::Line => WHEEL_LINE_FACTOR,
        WheelDeltaMode::Page => WHEEL_PAGE_FACTOR,
    };
    (-delta_y * k).exp2()
}
