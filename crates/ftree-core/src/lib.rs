#![forbid(unsafe_code)]

//! Core: world-space geometry, easing and tween primitives, and the pointer
//! event vocabulary shared by the layout and view crates.

pub mod animation;
pub mod event;
pub mod geometry;

pub use geometry::{Point, Rect, Sides, Size};
