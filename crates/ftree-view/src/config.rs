#![forbid(unsafe_code)]

//! Surface configuration.
//!
//! [`ViewConfig::default`] reproduces the stock viewer. Hosts can override
//! a subset through `FTREE_*` environment variables; malformed or invalid
//! values are reported, not fatal, and leave the default in place.
//!
//! | Variable | Field |
//! |---|---|
//! | `FTREE_ANIMATION_MS` | `animation` |
//! | `FTREE_MIN_SCALE` / `FTREE_MAX_SCALE` | `scale_extent` |
//! | `FTREE_FONT_SIZE` / `FTREE_FONT_FAMILY` | `layout.font` |
//! | `FTREE_ZOOM_REQUIRES_CTRL` | `zoom_requires_ctrl` |
//! | `FTREE_THEME` | `theme` |
//! | `FTREE_ROW_SPACING` | `layout.row_spacing` |
//! | `FTREE_MIN_COLUMN_WIDTH` | `layout.min_column_width` |

use std::env;
use std::fmt;
use std::time::Duration;

use ftree_core::geometry::{Sides, Size};
use ftree_layout::LayoutConstants;

use crate::theme::Theme;
use crate::viewport::{ScaleExtent, TooltipStyle, ViewportController};

const ENV_ANIMATION_MS: &str = "FTREE_ANIMATION_MS";
const ENV_MIN_SCALE: &str = "FTREE_MIN_SCALE";
const ENV_MAX_SCALE: &str = "FTREE_MAX_SCALE";
const ENV_FONT_SIZE: &str = "FTREE_FONT_SIZE";
const ENV_FONT_FAMILY: &str = "FTREE_FONT_FAMILY";
const ENV_ZOOM_REQUIRES_CTRL: &str = "FTREE_ZOOM_REQUIRES_CTRL";
const ENV_THEME: &str = "FTREE_THEME";
const ENV_ROW_SPACING: &str = "FTREE_ROW_SPACING";
const ENV_MIN_COLUMN_WIDTH: &str = "FTREE_MIN_COLUMN_WIDTH";

/// Everything a [`TreeSurface`](crate::TreeSurface) needs besides the tree
/// and the label metrics.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewConfig {
    pub layout: LayoutConstants,
    /// Transition duration for animated relayouts.
    pub animation: Duration,
    pub scale_extent: ScaleExtent,
    /// Additive scale step for [`zoom_in`](crate::TreeSurface::zoom_in) /
    /// [`zoom_out`](crate::TreeSurface::zoom_out).
    pub zoom_step: f64,
    /// Wheel zoom only while Ctrl is held.
    pub zoom_requires_ctrl: bool,
    /// Pointer travel (screen px) below which a press-release is a click.
    pub click_distance: f64,
    pub margins: Sides,
    /// Extra left inset for the initial transform.
    pub initial_inset: f64,
    /// Used when the host reports a zero-sized container.
    pub default_container: Size,
    pub tooltip: TooltipStyle,
    pub theme: Theme,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            layout: LayoutConstants::default(),
            animation: Duration::from_millis(750),
            scale_extent: ScaleExtent::default(),
            zoom_step: 0.2,
            zoom_requires_ctrl: false,
            click_distance: 3.0,
            margins: Sides::new(20.0, 40.0, 20.0, 40.0),
            initial_inset: 20.0,
            default_container: Size::new(1000.0, 600.0),
            tooltip: TooltipStyle::default(),
            theme: Theme::Light,
        }
    }
}

/// Configuration parse diagnostics (env + validation).
#[derive(Debug, Clone)]
pub struct ViewConfigParse {
    pub config: ViewConfig,
    pub errors: Vec<ConfigError>,
}

/// Configuration error with field context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub field: &'static str,
    pub value: String,
    pub message: String,
}

impl ConfigError {
    fn new(field: &'static str, value: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={} ({})", self.field, self.value, self.message)
    }
}

impl std::error::Error for ConfigError {}

impl ViewConfig {
    /// Parse config from environment variables.
    #[must_use]
    pub fn from_env() -> ViewConfig {
        Self::from_env_with_diagnostics().config
    }

    /// Parse config from environment variables and return diagnostics.
    #[must_use]
    pub fn from_env_with_diagnostics() -> ViewConfigParse {
        from_env_with(|key| env::var(key).ok())
    }

    /// Validate config constraints and return all violations.
    pub fn validate(&self) -> Result<(), Vec<ConfigError>> {
        let mut errors = Vec::new();
        validate_positive("min_scale", self.scale_extent.min, &mut errors);
        validate_positive("max_scale", self.scale_extent.max, &mut errors);
        if self.scale_extent.min > self.scale_extent.max {
            errors.push(ConfigError::new(
                "scale_extent",
                format!("[{}, {}]", self.scale_extent.min, self.scale_extent.max),
                "min_scale must not exceed max_scale",
            ));
        }
        validate_positive("font_size", self.layout.font.size, &mut errors);
        validate_positive("row_spacing", self.layout.row_spacing, &mut errors);
        validate_positive("min_column_width", self.layout.min_column_width, &mut errors);
        validate_positive("zoom_step", self.zoom_step, &mut errors);
        if self.layout.row_spacing * self.layout.sibling_separation < self.layout.node_height {
            errors.push(ConfigError::new(
                "row_spacing",
                self.layout.row_spacing.to_string(),
                "sibling rows closer than node_height would overlap",
            ));
        }
        if self.click_distance.is_nan() || self.click_distance < 0.0 {
            errors.push(ConfigError::new(
                "click_distance",
                self.click_distance.to_string(),
                "must be >= 0",
            ));
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// A viewport controller configured from this config.
    pub fn viewport(&self) -> ViewportController {
        ViewportController::new(
            self.scale_extent,
            self.margins,
            self.initial_inset,
            self.zoom_step,
            self.default_container,
        )
    }

    /// Put the stock value back for a field named by a [`ConfigError`].
    fn restore_default(&mut self, field: &str) {
        let defaults = ViewConfig::default();
        match field {
            "min_scale" | "max_scale" | "scale_extent" => self.scale_extent = defaults.scale_extent,
            "font_size" => self.layout.font.size = defaults.layout.font.size,
            "row_spacing" => self.layout.row_spacing = defaults.layout.row_spacing,
            "min_column_width" => self.layout.min_column_width = defaults.layout.min_column_width,
            "zoom_step" => self.zoom_step = defaults.zoom_step,
            "click_distance" => self.click_distance = defaults.click_distance,
            _ => {}
        }
    }
}

fn from_env_with<F>(mut get: F) -> ViewConfigParse
where
    F: FnMut(&str) -> Option<String>,
{
    let mut config = ViewConfig::default();
    let mut errors = Vec::new();

    if let Some(value) = get(ENV_ANIMATION_MS) {
        match parse_u64(&value) {
            Some(ms) => config.animation = Duration::from_millis(ms),
            None => errors.push(ConfigError::new(
                "animation",
                value,
                "expected milliseconds (non-negative integer)",
            )),
        }
    }

    if let Some(value) = get(ENV_MIN_SCALE) {
        match parse_f64(&value) {
            Some(parsed) => config.scale_extent.min = parsed,
            None => errors.push(ConfigError::new("min_scale", value, "expected number")),
        }
    }

    if let Some(value) = get(ENV_MAX_SCALE) {
        match parse_f64(&value) {
            Some(parsed) => config.scale_extent.max = parsed,
            None => errors.push(ConfigError::new("max_scale", value, "expected number")),
        }
    }

    if let Some(value) = get(ENV_FONT_SIZE) {
        match parse_f64(&value) {
            Some(parsed) => config.layout.font.size = parsed,
            None => errors.push(ConfigError::new("font_size", value, "expected number")),
        }
    }

    if let Some(value) = get(ENV_FONT_FAMILY) {
        let family = value.trim();
        if family.is_empty() {
            errors.push(ConfigError::new(
                "font_family",
                value,
                "expected non-empty family name",
            ));
        } else {
            config.layout.font.family = family.to_string();
        }
    }

    if let Some(value) = get(ENV_ZOOM_REQUIRES_CTRL) {
        match parse_bool(&value) {
            Some(parsed) => config.zoom_requires_ctrl = parsed,
            None => errors.push(ConfigError::new(
                "zoom_requires_ctrl",
                value,
                "expected bool (1/0/true/false)",
            )),
        }
    }

    if let Some(value) = get(ENV_THEME) {
        match Theme::parse(&value) {
            Some(parsed) => config.theme = parsed,
            None => errors.push(ConfigError::new("theme", value, "expected light|dark")),
        }
    }

    if let Some(value) = get(ENV_ROW_SPACING) {
        match parse_f64(&value) {
            Some(parsed) => config.layout.row_spacing = parsed,
            None => errors.push(ConfigError::new("row_spacing", value, "expected number")),
        }
    }

    if let Some(value) = get(ENV_MIN_COLUMN_WIDTH) {
        match parse_f64(&value) {
            Some(parsed) => config.layout.min_column_width = parsed,
            None => errors.push(ConfigError::new(
                "min_column_width",
                value,
                "expected number",
            )),
        }
    }

    if let Err(mut validation) = config.validate() {
        for error in &validation {
            config.restore_default(error.field);
        }
        errors.append(&mut validation);
    }

    ViewConfigParse { config, errors }
}

#[inline]
fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[inline]
fn parse_u64(value: &str) -> Option<u64> {
    value.trim().parse::<u64>().ok()
}

#[inline]
fn parse_f64(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn validate_positive(field: &'static str, value: f64, errors: &mut Vec<ConfigError>) {
    if !(value.is_finite() && value > 0.0) {
        errors.push(ConfigError::new(field, value.to_string(), "must be > 0"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn parse(vars: &[(&str, &str)]) -> ViewConfigParse {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        from_env_with(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_are_valid() {
        assert_eq!(ViewConfig::default().validate(), Ok(()));
        let parsed = parse(&[]);
        assert!(parsed.errors.is_empty());
        assert_eq!(parsed.config, ViewConfig::default());
    }

    #[test]
    fn env_overrides_apply() {
        let parsed = parse(&[
            ("FTREE_ANIMATION_MS", "300"),
            ("FTREE_MIN_SCALE", "0.5"),
            ("FTREE_MAX_SCALE", "2"),
            ("FTREE_FONT_SIZE", "16"),
            ("FTREE_FONT_FAMILY", " monospace "),
            ("FTREE_ZOOM_REQUIRES_CTRL", "yes"),
            ("FTREE_THEME", "dark"),
            ("FTREE_ROW_SPACING", "60"),
            ("FTREE_MIN_COLUMN_WIDTH", "120"),
        ]);
        assert!(parsed.errors.is_empty(), "{:?}", parsed.errors);
        let c = parsed.config;
        assert_eq!(c.animation, Duration::from_millis(300));
        assert_eq!(c.scale_extent, ScaleExtent::new(0.5, 2.0));
        assert_eq!(c.layout.font.size, 16.0);
        assert_eq!(c.layout.font.family, "monospace");
        assert!(c.zoom_requires_ctrl);
        assert_eq!(c.theme, Theme::Dark);
        assert_eq!(c.layout.row_spacing, 60.0);
        assert_eq!(c.layout.min_column_width, 120.0);
    }

    #[test]
    fn malformed_values_keep_defaults_and_report() {
        let parsed = parse(&[
            ("FTREE_ANIMATION_MS", "-5"),
            ("FTREE_THEME", "sepia"),
            ("FTREE_ZOOM_REQUIRES_CTRL", "maybe"),
            ("FTREE_FONT_SIZE", "NaN"),
        ]);
        let fields: Vec<&str> = parsed.errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec!["animation", "font_size", "zoom_requires_ctrl", "theme"]
        );
        assert_eq!(parsed.config.animation, Duration::from_millis(750));
        assert_eq!(parsed.config.theme, Theme::Light);
    }

    #[test]
    fn validation_collects_every_violation() {
        let mut c = ViewConfig::default();
        c.scale_extent = ScaleExtent::new(3.0, 2.0);
        c.layout.row_spacing = 10.0;
        c.zoom_step = 0.0;
        let errors = c.validate().expect_err("invalid");
        let fields: Vec<&str> = errors.iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["scale_extent", "zoom_step", "row_spacing"]);
    }

    #[test]
    fn error_display() {
        let err = ConfigError::new("theme", "sepia", "expected light|dark");
        assert_eq!(err.to_string(), "theme=sepia (expected light|dark)");
    }

    #[test]
    fn invalid_env_values_fall_back_to_defaults() {
        let parsed = parse(&[
            ("FTREE_MIN_SCALE", "3"),
            ("FTREE_MAX_SCALE", "2"),
            ("FTREE_ROW_SPACING", "10"),
            ("FTREE_ANIMATION_MS", "200"),
        ]);
        let fields: Vec<&str> = parsed.errors.iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["scale_extent", "row_spacing"]);
        let defaults = ViewConfig::default();
        assert_eq!(parsed.config.scale_extent, defaults.scale_extent);
        assert_eq!(parsed.config.layout.row_spacing, defaults.layout.row_spacing);
        // Valid overrides survive.
        assert_eq!(parsed.config.animation, Duration::from_millis(200));
        assert_eq!(parsed.config.validate(), Ok(()));
    }
}
