#![forbid(unsafe_code)]

//! Geometric primitives in world units.
//!
//! Layout coordinates, node boxes, and viewport math all use `f64` so that
//! identical inputs produce bit-identical outputs across passes.

use std::ops::{Add, Sub};

/// A point in world (or screen) space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// The origin.
    pub const ORIGIN: Self = Self::new(0.0, 0.0);

    /// Create a new point.
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    #[inline]
    pub fn distance(self, other: Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

impl Add for Point {
    type Output = Point;

    #[inline]
    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    #[inline]
    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

/// A width/height pair.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    /// Create a new size.
    #[inline]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// True if either dimension is zero, negative, or NaN.
    #[inline]
    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    /// Replace non-positive dimensions with the corresponding fallback dimension.
    #[must_use]
    pub fn or_fallback(self, fallback: Size) -> Size {
        Size {
            width: if self.width > 0.0 {
                self.width
            } else {
                fallback.width
            },
            height: if self.height > 0.0 {
                self.height
            } else {
                fallback.height
            },
        }
    }
}

/// An axis-aligned rectangle.
///
/// `x`/`y` are the top-left corner; `width`/`height` are never negative when
/// built through [`Rect::centered`] or [`Rect::from_edges`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Create a new rectangle.
    #[inline]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle of the given size centered on `center`.
    #[inline]
    pub fn centered(center: Point, size: Size) -> Self {
        Self::new(
            center.x - size.width / 2.0,
            center.y - size.height / 2.0,
            size.width,
            size.height,
        )
    }

    /// Rectangle spanning the given edges. Swapped edges are normalized.
    pub fn from_edges(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        let (l, r) = if left <= right {
            (left, right)
        } else {
            (right, left)
        };
        let (t, b) = if top <= bottom {
            (top, bottom)
        } else {
            (bottom, top)
        };
        Self::new(l, t, r - l, b - t)
    }

    #[inline]
    pub fn left(&self) -> f64 {
        self.x
    }

    #[inline]
    pub fn top(&self) -> f64 {
        self.y
    }

    #[inline]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Center point.
    #[inline]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Size of the rectangle.
    #[inline]
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Check if a point is inside the rectangle (edges inclusive).
    #[inline]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.left() && p.x <= self.right() && p.y >= self.top() && p.y <= self.bottom()
    }

    /// True if the interiors of the two rectangles overlap.
    ///
    /// Rectangles that only share an edge do not intersect.
    #[inline]
    pub fn intersects(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }

    /// Smallest rectangle containing both.
    pub fn union(&self, other: &Rect) -> Rect {
        Rect::from_edges(
            self.left().min(other.left()),
            self.top().min(other.top()),
            self.right().max(other.right()),
            self.bottom().max(other.bottom()),
        )
    }

    /// Grow (or shrink, for negative margins) by the given sides.
    pub fn outset(&self, sides: Sides) -> Rect {
        Rect::new(
            self.x - sides.left,
            self.y - sides.top,
            (self.width + sides.horizontal_sum()).max(0.0),
            (self.height + sides.vertical_sum()).max(0.0),
        )
    }
}

/// Sides for margins and insets.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Sides {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Sides {
    /// Create new sides with equal values.
    pub const fn all(val: f64) -> Self {
        Self::new(val, val, val, val)
    }

    /// Create new sides with specific values.
    pub const fn new(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    /// Sum of left and right.
    #[inline]
    pub fn horizontal_sum(&self) -> f64 {
        self.left + self.right
    }

    /// Sum of top and bottom.
    #[inline]
    pub fn vertical_sum(&self) -> f64 {
        self.top + self.bottom
    }
}

impl From<(f64, f64)> for Sides {
    fn from((vertical, horizontal): (f64, f64)) -> Self {
        Self::new(vertical, horizontal, vertical, horizontal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_contains_edges() {
        let rect = Rect::new(2.0, 3.0, 4.0, 5.0);
        assert!(rect.contains(Point::new(2.0, 3.0)));
        assert!(rect.contains(Point::new(6.0, 8.0)));
        assert!(!rect.contains(Point::new(6.1, 8.0)));
        assert!(!rect.contains(Point::new(1.9, 3.0)));
    }

    #[test]
    fn centered_rect_round_trips_center() {
        let rect = Rect::centered(Point::new(10.0, -4.0), Size::new(80.0, 44.0));
        assert_eq!(rect.center(), Point::new(10.0, -4.0));
        assert_eq!(rect.left(), -30.0);
        assert_eq!(rect.top(), -26.0);
    }

    #[test]
    fn touching_rects_do_not_intersect() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(10.0, 0.0, 10.0, 10.0);
        assert!(!a.intersects(&b));
        assert!(a.intersects(&Rect::new(9.0, 9.0, 5.0, 5.0)));
    }

    #[test]
    fn from_edges_normalizes() {
        let r = Rect::from_edges(5.0, 5.0, 1.0, 2.0);
        assert_eq!(r, Rect::new(1.0, 2.0, 4.0, 3.0));
    }

    #[test]
    fn union_covers_both() {
        let a = Rect::new(0.0, 0.0, 1.0, 1.0);
        let b = Rect::new(-3.0, 4.0, 1.0, 1.0);
        let u = a.union(&b);
        assert_eq!(u, Rect::new(-3.0, 0.0, 4.0, 5.0));
    }

    #[test]
    fn outset_grows_each_side() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0).outset(Sides::new(1.0, 2.0, 3.0, 4.0));
        assert_eq!(r, Rect::new(-4.0, -1.0, 16.0, 14.0));
    }

    #[test]
    fn size_fallback_replaces_zero_dimensions() {
        let s = Size::new(0.0, 300.0).or_fallback(Size::new(1000.0, 600.0));
        assert_eq!(s, Size::new(1000.0, 300.0));
        assert!(Size::new(0.0, 10.0).is_empty());
        assert!(Size::new(f64::NAN, 10.0).is_empty());
    }
}
