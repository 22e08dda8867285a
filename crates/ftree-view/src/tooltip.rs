#![forbid(unsafe_code)]

//! Comment tooltip.
//!
//! A tooltip floats in screen space next to the pointer that opened it. Its
//! chrome (font, padding, offsets, max width, corner radius) is taken from a
//! [`TooltipStyle`] already scaled to the viewport, so the tooltip grows and
//! shrinks with the tree.
//!
//! # Invariants
//!
//! 1. A [`TooltipManager`] holds at most one tooltip; opening a new one
//!    replaces the old.
//! 2. Content wraps deterministically at `max_width - 2 * padding`.
//! 3. The tooltip is never wider than `max_width`.

use ftree_core::geometry::{Point, Rect};
use ftree_layout::{FontSpec, LabelMetrics, NodeId, measure_or_default};
use tracing::trace;

use crate::viewport::TooltipStyle;

/// Header shown above the comment text.
pub const TOOLTIP_HEADER: &str = "Comment";

/// Line height as a multiple of the font size.
const LINE_HEIGHT: f64 = 1.4;

/// An open tooltip, laid out in screen coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Tooltip {
    /// Node whose indicator opened it.
    pub node: NodeId,
    pub text: String,
    /// Pointer position at the click.
    pub anchor: Point,
    pub style: TooltipStyle,
    /// Wrapped content lines, header excluded.
    pub lines: Vec<String>,
    pub rect: Rect,
    pub close_button: Rect,
}

impl Tooltip {
    /// Lay out a tooltip for `text` at `anchor`.
    ///
    /// `family` is the font family used to measure the text.
    pub fn layout(
        node: NodeId,
        text: &str,
        anchor: Point,
        style: TooltipStyle,
        metrics: &dyn LabelMetrics,
        family: &str,
    ) -> Self {
        let font = FontSpec::new(style.font_size, family);
        let measure = |s: &str| measure_or_default(metrics, s, &font, 0.0);
        let content_width = (style.max_width - 2.0 * style.padding).max(0.0);
        let lines = wrap(text, content_width, measure(" "), &measure);

        let widest = lines
            .iter()
            .map(|l| measure(l.as_str()))
            .chain(std::iter::once(measure(TOOLTIP_HEADER) + style.font_size))
            .fold(0.0f64, f64::max);
        let width = (widest + 2.0 * style.padding).min(style.max_width);
        let line_height = style.font_size * LINE_HEIGHT;
        let height = 2.0 * style.padding + line_height * (lines.len() + 1) as f64;

        let rect = Rect::new(
            anchor.x + style.offset_x,
            anchor.y + style.offset_y,
            width,
            height,
        );
        let button = style.font_size;
        let inset = style.padding * 0.625;
        let close_button = Rect::new(rect.right() - inset - button, rect.top() + inset, button, button);

        Self {
            node,
            text: text.to_string(),
            anchor,
            style,
            lines,
            rect,
            close_button,
        }
    }

    pub fn contains(&self, screen: Point) -> bool {
        self.rect.contains(screen)
    }

    pub fn hits_close_button(&self, screen: Point) -> bool {
        self.close_button.contains(screen)
    }

    /// Baseline origin of the header line.
    pub fn header_origin(&self) -> Point {
        Point::new(
            self.rect.left() + self.style.padding,
            self.rect.top() + self.style.padding + self.style.font_size,
        )
    }

    /// Baseline origin of content line `i`.
    pub fn line_origin(&self, i: usize) -> Point {
        let header = self.header_origin();
        Point::new(
            header.x,
            header.y + self.style.font_size * LINE_HEIGHT * (i + 1) as f64,
        )
    }
}

/// Greedy word wrap. A single word wider than `max_width` gets its own line.
fn wrap(text: &str, max_width: f64, space: f64, measure: &dyn Fn(&str) -> f64) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.lines() {
        if paragraph.trim().is_empty() {
            lines.push(String::new());
            continue;
        }
        let mut line = String::new();
        let mut width = 0.0;
        for word in paragraph.split_whitespace() {
            let w = measure(word);
            if line.is_empty() {
                line.push_str(word);
                width = w;
            } else if width + space + w <= max_width {
                line.push(' ');
                line.push_str(word);
                width += space + w;
            } else {
                lines.push(std::mem::take(&mut line));
                line.push_str(word);
                width = w;
            }
        }
        if !line.is_empty() {
            lines.push(line);
        }
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// Holds the single open tooltip of a surface.
#[derive(Debug, Clone, Default)]
pub struct TooltipManager {
    current: Option<Tooltip>,
}

impl TooltipManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show `tooltip`, replacing any open one.
    pub fn open(&mut self, tooltip: Tooltip) {
        if let Some(old) = self.current.replace(tooltip) {
            trace!(node = %old.node, "tooltip replaced");
        }
    }

    /// Close the open tooltip. Returns `true` if one was open.
    pub fn close(&mut self) -> bool {
        self.current.take().is_some()
    }

    pub fn current(&self) -> Option<&Tooltip> {
        self.current.as_ref()
    }

    /// Node whose indicator owns the open tooltip.
    pub fn owner(&self) -> Option<NodeId> {
        self.current.as_ref().map(|t| t.node)
    }

    pub fn is_open(&self) -> bool {
        self.current.is_some()
    }
}
