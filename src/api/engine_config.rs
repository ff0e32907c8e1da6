use serde::{Deserialize, Serialize};

use crate::core::{ClampPolicy, Padding, Viewport, WindowOptions};
use crate::error::{ChartError, ChartResult};
use crate::interaction::ModifierKey;

use super::ZoomAnchor;

/// Public engine bootstrap configuration.
///
/// This type is serializable so host applications can persist/load chart setup
/// without inventing their own ad-hoc format. Custom clamp and zoom-anchor
/// closures are not serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartEngineConfig {
    pub viewport: Viewport,
    #[serde(default)]
    pub x_padding: Padding,
    #[serde(default)]
    pub flip_x: bool,
    #[serde(default)]
    pub clamp: ClampPolicy,
    #[serde(default = "default_points_per_px_threshold")]
    pub points_per_px_threshold: f64,
    #[serde(default = "default_min_points_per_px_threshold")]
    pub min_points_per_px_threshold: f64,
    /// Skip windowing and show every row. `None` enables it for identity
    /// x-accessors only.
    #[serde(default)]
    pub use_whole_data: Option<bool>,
    #[serde(default)]
    pub zoom_anchor: ZoomAnchor,
    #[serde(default = "default_zoom_multiplier")]
    pub zoom_multiplier: f64,
    #[serde(default = "default_enabled")]
    pub zoom_event: bool,
    #[serde(default = "default_enabled")]
    pub pan_event: bool,
    #[serde(default = "default_enabled")]
    pub mouse_move_event: bool,
    /// Modifier that must be held for vertical wheel to zoom.
    #[serde(default)]
    pub wheel_zoom_modifier: Option<ModifierKey>,
    #[serde(default = "default_wheel_pan_end_debounce_ms")]
    pub wheel_pan_end_debounce_ms: f64,
    #[serde(default = "default_enabled")]
    pub maintain_points_per_pixel_on_resize: bool,
}

impl ChartEngineConfig {
    #[must_use]
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            x_padding: Padding::default(),
            flip_x: false,
            clamp: ClampPolicy::None,
            points_per_px_threshold: default_points_per_px_threshold(),
            min_points_per_px_threshold: default_min_points_per_px_threshold(),
            use_whole_data: None,
            zoom_anchor: ZoomAnchor::Mouse,
            zoom_multiplier: default_zoom_multiplier(),
            zoom_event: true,
            pan_event: true,
            mouse_move_event: true,
            wheel_zoom_modifier: None,
            wheel_pan_end_debounce_ms: default_wheel_pan_end_debounce_ms(),
            maintain_points_per_pixel_on_resize: true,
        }
    }

    #[must_use]
    pub fn with_x_padding(mut self, padding: Padding) -> Self {
        self.x_padding = padding;
        self
    }

    #[must_use]
    pub fn with_flip_x(mut self, flip_x: bool) -> Self {
        self.flip_x = flip_x;
        self
    }

    #[must_use]
    pub fn with_clamp(mut self, clamp: ClampPolicy) -> Self {
        self.clamp = clamp;
        self
    }

    /// Sets max/min visible points per horizontal pixel.
    #[must_use]
    pub fn with_points_per_px_thresholds(mut self, max: f64, min: f64) -> Self {
        self.points_per_px_threshold = max;
        self.min_points_per_px_threshold = min;
        self
    }

    #[must_use]
    pub fn with_use_whole_data(mut self, use_whole_data: bool) -> Self {
        self.use_whole_data = Some(use_whole_data);
        self
    }

    #[must_use]
    pub fn with_zoom_anchor(mut self, anchor: ZoomAnchor) -> Self {
        self.zoom_anchor = anchor;
        self
    }

    #[must_use]
    pub fn with_zoom_multiplier(mut self, multiplier: f64) -> Self {
        self.zoom_multiplier = multiplier;
        self
    }

    #[must_use]
    pub fn with_wheel_zoom_modifier(mut self, modifier: Option<ModifierKey>) -> Self {
        self.wheel_zoom_modifier = modifier;
        self
    }

    #[must_use]
    pub fn with_wheel_pan_end_debounce_ms(mut self, debounce_ms: f64) -> Self {
        self.wheel_pan_end_debounce_ms = debounce_ms;
        self
    }

    /// Enables or disables pan, wheel zoom and hover tracking.
    #[must_use]
    pub fn with_events(mut self, pan: bool, zoom: bool, mouse_move: bool) -> Self {
        self.pan_event = pan;
        self.zoom_event = zoom;
        self.mouse_move_event = mouse_move;
        self
    }

    #[must_use]
    pub fn with_maintain_points_per_pixel_on_resize(mut self, maintain: bool) -> Self {
        self.maintain_points_per_pixel_on_resize = maintain;
        self
    }

    pub(crate) fn window_options(&self, identity_x_accessor: bool) -> WindowOptions {
        WindowOptions {
            clamp: self.clamp.clone(),
            points_per_px_threshold: self.points_per_px_threshold,
            min_points_per_px_threshold: self.min_points_per_px_threshold,
            use_whole_data: self.use_whole_data.unwrap_or(identity_x_accessor),
        }
    }

    /// `true` when switching from `self` to `next` invalidates the x-domain.
    #[must_use]
    pub fn requires_reset(&self, next: &Self) -> bool {
        self.x_padding != next.x_padding
            || self.flip_x != next.flip_x
            || self.clamp != next.clamp
            || self.points_per_px_threshold != next.points_per_px_threshold
            || self.min_points_per_px_threshold != next.min_points_per_px_threshold
            || self.use_whole_data != next.use_whole_data
    }

    /// Serializes config to pretty JSON.
    pub fn to_json_pretty(&self) -> ChartResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ChartError::InvalidData(format!("failed to serialize config: {e}")))
    }

    /// Deserializes config from JSON.
    pub fn from_json_str(input: &str) -> ChartResult<Self> {
        serde_json::from_str(input)
            .map_err(|e| ChartError::InvalidData(format!("failed to parse config: {e}")))
    }
}

fn default_points_per_px_threshold() -> f64 {
    2.0
}

fn default_min_points_per_px_threshold() -> f64 {
    1.0 / 100.0
}

fn default_zoom_multiplier() -> f64 {
    1.1
}

fn default_wheel_pan_end_debounce_ms() -> f64 {
    100.0
}

fn default_enabled() -> bool {
    true
}
