#![forbid(unsafe_code)]

//! Animated, pannable tree surface.
//!
//! # Role in ftree
//! `ftree-view` turns a [`Tree`](ftree_layout::Tree) and its layout into an
//! interactive view: it reconciles successive layouts into keyed
//! transitions, drives them against a host clock, keeps the pan/zoom
//! transform stable across relayouts, and routes pointer input to toggles,
//! tooltips, panning and zooming.
//!
//! # How it fits in the system
//! The view sits on `ftree-layout` (tree model, tidy layout, label metrics)
//! and `ftree-core` (geometry, tweens, events). It draws nothing itself; a
//! host renders the [`Frame`] returned by [`TreeSurface::frame`].
//!
//! | Module | Responsibility |
//! |--------|----------------|
//! | [`reconcile`] | Enter/update/exit classification and animation scope |
//! | [`driver`] | Transition contract and the built-in frame-stepped driver |
//! | [`viewport`] | Transform capture/restore, pan, zoom, scale bounds |
//! | [`interaction`] | Hit testing, click vs. drag, outside-click listener |
//! | [`tooltip`] | Comment tooltip layout |
//! | [`scene`] | Display list handed to renderers |
//! | [`surface`] | Ties everything together |

pub mod config;
pub mod driver;
pub mod interaction;
pub mod reconcile;
pub mod scene;
pub mod surface;
pub mod theme;
pub mod tooltip;
pub mod viewport;

pub use config::{ConfigError, ViewConfig, ViewConfigParse};
pub use driver::{ElementVisual, FrameDriver, LinkVisual, TransitionDriver};
pub use interaction::{HitTarget, Intent, InteractionController};
pub use reconcile::{AnimationScope, Mode, Phase, RenderPlan, Transition, reconcile};
pub use scene::{Frame, LinkShape, NodeVisual, Scene};
pub use surface::{ToggleState, TreeSurface};
pub use theme::{Palette, Rgba, Theme};
pub use tooltip::{Tooltip, TooltipManager};
pub use viewport::{ScaleExtent, TooltipStyle, ViewportController, ViewportState};
