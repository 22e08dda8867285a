#![forbid(unsafe_code)]

//! Pan/zoom transform owned by one surface.
//!
//! The transform maps world coordinates (layout space) to screen
//! coordinates: `screen = world × scale + translate`.
//!
//! # Invariants
//!
//! 1. `scale` always lies within the controller's [`ScaleExtent`].
//! 2. A captured transform is reapplied bit-for-bit by
//!    [`ViewportController::restore_or_initialize`]; relayouts never move
//!    the view.
//! 3. Translation is unconstrained.
//!
//! # Failure Modes
//!
//! - Non-finite pan or zoom inputs are ignored rather than poisoning the
//!   transform with NaN.

use ftree_core::geometry::{Point, Rect, Sides, Size};
use tracing::trace;

/// Inclusive scale bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleExtent {
    pub min: f64,
    pub max: f64,
}

impl ScaleExtent {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Clamp `scale` into range. NaN maps to `min`. An inverted extent
    /// (`min > max`) resolves to `max` instead of panicking.
    #[must_use]
    pub fn clamp(&self, scale: f64) -> f64 {
        if scale.is_nan() {
            self.min.min(self.max)
        } else {
            scale.max(self.min).min(self.max)
        }
    }

    pub fn contains(&self, scale: f64) -> bool {
        scale >= self.min && scale <= self.max
    }
}

impl Default for ScaleExtent {
    fn default() -> Self {
        Self::new(0.1, 4.0)
    }
}

/// A pan/zoom transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportState {
    pub translate_x: f64,
    pub translate_y: f64,
    pub scale: f64,
}

impl ViewportState {
    pub const IDENTITY: Self = Self::new(0.0, 0.0, 1.0);

    pub const fn new(translate_x: f64, translate_y: f64, scale: f64) -> Self {
        Self {
            translate_x,
            translate_y,
            scale,
        }
    }

    /// World → screen.
    #[inline]
    pub fn apply(&self, world: Point) -> Point {
        Point::new(
            world.x * self.scale + self.translate_x,
            world.y * self.scale + self.translate_y,
        )
    }

    /// Screen → world.
    #[inline]
    pub fn invert(&self, screen: Point) -> Point {
        Point::new(
            (screen.x - self.translate_x) / self.scale,
            (screen.y - self.translate_y) / self.scale,
        )
    }
}

impl Default for ViewportState {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Tooltip chrome dimensions at scale 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TooltipStyle {
    pub font_size: f64,
    pub padding: f64,
    /// Offset from the pointer, screen pixels.
    pub offset_x: f64,
    pub offset_y: f64,
    pub max_width: f64,
    pub border_radius: f64,
}

impl Default for TooltipStyle {
    fn default() -> Self {
        Self {
            font_size: 14.0,
            padding: 8.0,
            offset_x: 10.0,
            offset_y: -10.0,
            max_width: 300.0,
            border_radius: 4.0,
        }
    }
}

impl TooltipStyle {
    /// Every dimension multiplied by `scale`.
    #[must_use]
    pub fn scaled(&self, scale: f64) -> Self {
        Self {
            font_size: self.font_size * scale,
            padding: self.padding * scale,
            offset_x: self.offset_x * scale,
            offset_y: self.offset_y * scale,
            max_width: self.max_width * scale,
            border_radius: self.border_radius * scale,
        }
    }
}

/// Owns the transform of one surface and the rules for changing it.
#[derive(Debug, Clone)]
pub struct ViewportController {
    state: Option<ViewportState>,
    initial: Option<ViewportState>,
    extent: ScaleExtent,
    margins: Sides,
    inset: f64,
    zoom_step: f64,
    container: Size,
}

impl ViewportController {
    pub fn new(extent: ScaleExtent, margins: Sides, inset: f64, zoom_step: f64, container: Size) -> Self {
        Self {
            state: None,
            initial: None,
            extent,
            margins,
            inset,
            zoom_step,
            container,
        }
    }

    /// The transform to reapply after the next relayout, if any.
    pub fn capture(&self) -> Option<ViewportState> {
        self.state
    }

    /// Reapply `previous` unchanged, or compute the initial transform for
    /// `bounds` when there is nothing to restore.
    pub fn restore_or_initialize(
        &mut self,
        previous: Option<ViewportState>,
        bounds: Option<Rect>,
    ) -> ViewportState {
        let state = match previous {
            Some(state) => state,
            None => {
                let initial = self.initial_transform(bounds);
                self.initial = Some(initial);
                trace!(?initial, "viewport initialized");
                initial
            }
        };
        self.state = Some(state);
        state
    }

    /// Left-align the boxes at `margin.left + inset` and center them
    /// vertically in the container minus vertical margins, at scale 1.
    pub fn initial_transform(&self, bounds: Option<Rect>) -> ViewportState {
        let Some(bounds) = bounds else {
            return ViewportState::new(self.margins.left + self.inset, self.margins.top, 1.0);
        };
        let available = self.container.height - self.margins.vertical_sum();
        let tx = self.margins.left + self.inset - bounds.left();
        let ty = self.margins.top + (available - bounds.height) / 2.0 - bounds.top();
        ViewportState::new(tx, ty, self.extent.clamp(1.0))
    }

    /// Current transform; identity before the first layout.
    pub fn state(&self) -> ViewportState {
        self.state.unwrap_or_default()
    }

    /// Overwrite the transform, clamping its scale.
    pub fn set_state(&mut self, state: ViewportState) {
        if !(state.translate_x.is_finite() && state.translate_y.is_finite()) {
            return;
        }
        self.state = Some(ViewportState {
            scale: self.extent.clamp(state.scale),
            ..state
        });
    }

    /// Forget the current and initial transforms; the next relayout
    /// recenters.
    pub fn clear(&mut self) {
        self.state = None;
        self.initial = None;
    }

    /// Back to the transform computed when the tree was first shown.
    pub fn reset(&mut self) {
        if let Some(initial) = self.initial {
            self.state = Some(initial);
        }
    }

    pub fn extent(&self) -> ScaleExtent {
        self.extent
    }

    pub fn container(&self) -> Size {
        self.container
    }

    pub fn set_container(&mut self, container: Size) {
        self.container = container;
    }

    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        if !(dx.is_finite() && dy.is_finite()) {
            return;
        }
        let mut s = self.state();
        s.translate_x += dx;
        s.translate_y += dy;
        self.state = Some(s);
    }

    /// Multiply the scale by `factor`, keeping `anchor` (screen) fixed.
    pub fn zoom_at(&mut self, anchor: Point, factor: f64) {
        if !(factor.is_finite() && factor > 0.0) {
            return;
        }
        let scale = self.state().scale * factor;
        self.scale_to(anchor, scale);
    }

    /// Set the scale to `scale` (clamped), keeping `anchor` fixed.
    pub fn scale_to(&mut self, anchor: Point, scale: f64) {
        if !(anchor.x.is_finite() && anchor.y.is_finite()) {
            return;
        }
        let current = self.state();
        let world = current.invert(anchor);
        let k = self.extent.clamp(scale);
        self.state = Some(ViewportState::new(anchor.x - world.x * k, anchor.y - world.y * k, k));
    }

    /// Step the scale up by the configured step, anchored at the center.
    pub fn zoom_in(&mut self) {
        let scale = self.state().scale + self.zoom_step;
        self.scale_to(self.center(), scale);
    }

    /// Step the scale down by the configured step, anchored at the center.
    pub fn zoom_out(&mut self) {
        let scale = self.state().scale - self.zoom_step;
        self.scale_to(self.center(), scale);
    }

    fn center(&self) -> Point {
        Point::new(self.container.width / 2.0, self.container.height / 2.0)
    }

    pub fn screen_to_world(&self, screen: Point) -> Point {
        self.state().invert(screen)
    }

    pub fn world_to_screen(&self, world: Point) -> Point {
        self.state().apply(world)
    }

    /// Tooltip chrome at the current scale.
    pub fn tooltip_style(&self, base: &TooltipStyle) -> TooltipStyle {
        base.scaled(self.state().scale)
    }
}

impl Default for ViewportController {
    fn default() -> Self {
        Self::new(
            ScaleExtent::default(),
            Sides::new(20.0, 40.0, 20.0, 40.0),
            20.0,
            0.2,
            Size::new(1000.0, 600.0),
        )
    }
}
