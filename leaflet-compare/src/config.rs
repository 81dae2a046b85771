//! Configuration for comparison sessions.
//!
//! `CompareConfig` holds the immutable settings a session is created with.
//! It can be built in code with the `with_*` methods or read from the
//! `[compare]` section of an INI file:
//!
//! ```text
//! [compare]
//! aggressive_prefetch = true
//! split_line_width = 4
//! split_line_color = orange
//! split_edge_margin = 5
//! initial_split_position = 0.5
//! fit_to_view = true
//! pointer_events_only = false
//! mobile = false
//! touch = true
//! ```

use std::str::FromStr;

use ini::Ini;
use thiserror::Error;

/// Section name read by [`CompareConfig::from_ini_str`].
pub const CONFIG_SECTION: &str = "compare";

/// Distance in pixels the split line must keep from either canvas edge.
pub const DEFAULT_SPLIT_EDGE_MARGIN_PX: f64 = 5.0;

/// Split position applied when the split-line widget is first created.
pub const DEFAULT_SPLIT_POSITION: f64 = 0.5;

/// Minimum width of the grab area around the split line.
pub const MIN_SPLIT_CONTAINER_WIDTH_PX: f64 = 16.0;

/// Errors raised while reading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The INI text could not be parsed.
    #[error("failed to parse config: {0}")]
    Parse(String),

    /// A key held a value of the wrong type.
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },
}

/// Input capabilities of the platform hosting the viewer.
///
/// Evaluated once when the alignment tool and split line are built; event
/// families are never re-detected per event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlatformCaps {
    /// Only unified pointer events are available (IE11-class browsers).
    pub pointer_events_only: bool,
    /// Mobile device; mouse events are not listened for.
    pub mobile: bool,
    /// Touch-capable device.
    pub touch: bool,
}

impl PlatformCaps {
    /// Desktop with mouse input only.
    pub fn desktop() -> Self {
        Self::default()
    }

    /// Touch-only mobile device.
    pub fn mobile() -> Self {
        Self {
            pointer_events_only: false,
            mobile: true,
            touch: true,
        }
    }
}

/// Visual style of the split line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SplitLineStyle {
    /// Line width in pixels.
    pub width: Option<f64>,
    /// CSS color of the line.
    pub color: Option<String>,
}

/// Pixel layout derived from a [`SplitLineStyle`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitLineLayout {
    /// Width of the visible line.
    pub line_width: Option<f64>,
    /// Width of the draggable container around the line.
    pub container_width: f64,
    /// Left offset of the line inside its container.
    pub line_left: f64,
}

impl SplitLineStyle {
    /// Compute container and line geometry.
    ///
    /// A configured width is rounded to the nearest even pixel count so the
    /// line centres exactly inside its container.
    pub fn layout(&self) -> SplitLineLayout {
        match self.width {
            Some(width) if width > 0.0 => {
                let width = 2.0 * (width / 2.0).round();
                let container_width = width.max(MIN_SPLIT_CONTAINER_WIDTH_PX);
                SplitLineLayout {
                    line_width: Some(width),
                    container_width,
                    line_left: (container_width - width) / 2.0,
                }
            }
            _ => SplitLineLayout {
                line_width: None,
                container_width: MIN_SPLIT_CONTAINER_WIDTH_PX,
                line_left: 0.0,
            },
        }
    }
}

/// Settings a comparison session is created with.
#[derive(Debug, Clone)]
pub struct CompareConfig {
    /// Platform input capabilities.
    pub platform: PlatformCaps,

    /// Enable aggressive tile prefetching while comparing (ignored on mobile).
    pub aggressive_prefetch: bool,

    /// Split-line appearance.
    pub split_line: SplitLineStyle,

    /// Minimum distance of the split line from the canvas edges.
    pub split_edge_margin_px: f64,

    /// Split fraction applied when the split line is first shown.
    pub initial_split_position: f64,

    /// Fit the camera to the diff scene once a comparison starts.
    pub fit_to_view_on_compare: bool,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            platform: PlatformCaps::default(),
            aggressive_prefetch: true,
            split_line: SplitLineStyle::default(),
            split_edge_margin_px: DEFAULT_SPLIT_EDGE_MARGIN_PX,
            initial_split_position: DEFAULT_SPLIT_POSITION,
            fit_to_view_on_compare: true,
        }
    }
}

impl CompareConfig {
    /// Set the platform capabilities.
    pub fn with_platform(mut self, platform: PlatformCaps) -> Self {
        self.platform = platform;
        self
    }

    /// Set the split-line style.
    pub fn with_split_line(mut self, style: SplitLineStyle) -> Self {
        self.split_line = style;
        self
    }

    /// Enable or disable aggressive prefetching.
    pub fn with_aggressive_prefetch(mut self, enabled: bool) -> Self {
        self.aggressive_prefetch = enabled;
        self
    }

    /// Set the split-line edge margin.
    pub fn with_split_edge_margin(mut self, margin_px: f64) -> Self {
        self.split_edge_margin_px = margin_px;
        self
    }

    /// Whether tile iterators should prefetch aggressively on this platform.
    pub fn prefetch_enabled(&self) -> bool {
        self.aggressive_prefetch && !self.platform.mobile
    }

    /// Read settings from INI text.
    ///
    /// Missing section or keys keep their defaults.
    pub fn from_ini_str(text: &str) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        let mut config = Self::default();

        let Some(section) = ini.section(Some(CONFIG_SECTION)) else {
            return Ok(config);
        };

        if let Some(v) = section.get("aggressive_prefetch") {
            config.aggressive_prefetch = parse_value("aggressive_prefetch", v)?;
        }
        if let Some(v) = section.get("split_line_width") {
            config.split_line.width = Some(parse_value("split_line_width", v)?);
        }
        if let Some(v) = section.get("split_line_color") {
            let color = v.trim();
            if !color.is_empty() {
                config.split_line.color = Some(color.to_string());
            }
        }
        if let Some(v) = section.get("split_edge_margin") {
            config.split_edge_margin_px = parse_value("split_edge_margin", v)?;
        }
        if let Some(v) = section.get("initial_split_position") {
            let position: f64 = parse_value("initial_split_position", v)?;
            if !(0.0..=1.0).contains(&position) {
                return Err(ConfigError::InvalidValue {
                    key: "initial_split_position".to_string(),
                    value: v.to_string(),
                });
            }
            config.initial_split_position = position;
        }
        if let Some(v) = section.get("fit_to_view") {
            config.fit_to_view_on_compare = parse_value("fit_to_view", v)?;
        }
        if let Some(v) = section.get("pointer_events_only") {
            config.platform.pointer_events_only = parse_value("pointer_events_only", v)?;
        }
        if let Some(v) = section.get("mobile") {
            config.platform.mobile = parse_value("mobile", v)?;
        }
        if let Some(v) = section.get("touch") {
            config.platform.touch = parse_value("touch", v)?;
        }

        Ok(config)
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}
