#![forbid(unsafe_code)]

//! Canonical pointer/wheel/resize event types.
//!
//! Hosts translate their native input (DOM events, winit, a terminal mouse
//! protocol) into these before handing them to the view. Positions are in
//! container-local screen pixels, origin at the top-left.

use bitflags::bitflags;

use crate::geometry::{Point, Size};

/// Canonical input event consumed by a tree surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event {
    /// A pointer button or motion event.
    Pointer(PointerEvent),

    /// A wheel / trackpad scroll event.
    Wheel(WheelEvent),

    /// The drawing surface changed size.
    Resize(Size),
}

bitflags! {
    /// Modifier keys held during a pointer or wheel event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        /// No modifiers.
        const NONE  = 0b0000;
        /// Shift key.
        const SHIFT = 0b0001;
        /// Alt/Option key.
        const ALT   = 0b0010;
        /// Control key.
        const CTRL  = 0b0100;
        /// Super/Meta/Command key.
        const SUPER = 0b1000;
    }
}

impl Default for Modifiers {
    fn default() -> Self {
        Self::NONE
    }
}

/// Pointer button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerButton {
    /// Primary (usually left) button.
    Primary,

    /// Secondary (usually right) button.
    Secondary,

    /// Middle button.
    Middle,
}

/// The type of pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerEventKind {
    /// Button pressed.
    Down(PointerButton),

    /// Button released.
    Up(PointerButton),

    /// Pointer moved, with or without a button held.
    Move,

    /// Pointer left the surface. Ends any drag in progress.
    Leave,
}

/// A pointer event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    /// The type of pointer event.
    pub kind: PointerEventKind,

    /// Position in container-local screen pixels.
    pub position: Point,

    /// Modifier keys held during the event.
    pub modifiers: Modifiers,
}

impl PointerEvent {
    /// Create a new pointer event without modifiers.
    #[must_use]
    pub const fn new(kind: PointerEventKind, x: f64, y: f64) -> Self {
        Self {
            kind,
            position: Point::new(x, y),
            modifiers: Modifiers::NONE,
        }
    }

    /// Primary-button press at `(x, y)`.
    #[must_use]
    pub const fn down(x: f64, y: f64) -> Self {
        Self::new(PointerEventKind::Down(PointerButton::Primary), x, y)
    }

    /// Primary-button release at `(x, y)`.
    #[must_use]
    pub const fn up(x: f64, y: f64) -> Self {
        Self::new(PointerEventKind::Up(PointerButton::Primary), x, y)
    }

    /// Motion to `(x, y)`.
    #[must_use]
    pub const fn moved(x: f64, y: f64) -> Self {
        Self::new(PointerEventKind::Move, x, y)
    }

    /// Attach modifiers (builder).
    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// Unit of a wheel delta, mirroring the DOM `deltaMode` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WheelDeltaMode {
    /// Delta is in pixels.
    #[default]
    Pixel,

    /// Delta is in lines.
    Line,

    /// Delta is in pages.
    Page,
}

/// A wheel event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelEvent {
    /// Pointer position in container-local screen pixels.
    pub position: Point,

    /// Vertical delta; positive scrolls down (zooms out).
    pub delta_y: f64,

    /// Unit of `delta_y`.
    pub delta_mode: WheelDeltaMode,

    /// Modifier keys held during the event.
    pub modifiers: Modifiers,
}

impl WheelEvent {
    /// Pixel-mode wheel event at `(x, y)` without modifiers.
    #[must_use]
    pub const fn new(x: f64, y: f64, delta_y: f64) -> Self {
        Self {
            position: Point::new(x, y),
            delta_y,
            delta_mode: WheelDeltaMode::Pixel,
            modifiers: Modifiers::NONE,
        }
    }

    /// Attach modifiers (builder).
    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Set the delta unit (builder).
    #[must_use]
    pub const fn with_delta_mode(mut self, delta_mode: WheelDeltaMode) -> Self {
        self.delta_mode = delta_mode;
        self
    }
}
