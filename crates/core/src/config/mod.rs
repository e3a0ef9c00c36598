use std::{path::Path, time::Duration};

use serde::{Deserialize, Serialize};

use crate::Result;

/// Top-level configuration structure for the interaction layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub gesture: GestureConfig,
    pub carousel: CarouselConfig,
    pub breakpoints: BreakpointConfig,
    pub scroll: ScrollConfig,
}

impl AppConfig {
    /// Parses a configuration document. Missing sections keep their defaults.
    pub fn from_json_str(source: &str) -> Result<Self> {
        Ok(serde_json::from_str(source)?)
    }

    /// Reads and parses a configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_json_str(&source)
    }
}

/// Tuning values for touch axis-lock disambiguation.
///
/// The defaults reproduce the thresholds the site has always shipped with.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Movement in px on either axis before the axis is locked.
    pub lock_threshold: f64,
    /// Minimum horizontal travel in px for a swipe to navigate.
    pub swipe_threshold: f64,
    /// `|dy| > |dx| * axis_ratio` locks the sequence vertically.
    pub axis_ratio: f64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            lock_threshold: 12.0,
            swipe_threshold: 32.0,
            axis_ratio: 1.35,
        }
    }
}

/// Fan-out geometry for carousel cards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarouselConfig {
    /// Lateral translation per step of distance, in px.
    pub unit_x: f64,
    /// Rotation per step of distance, in degrees.
    pub unit_r: f64,
    /// Vertical lift per step of distance, in px.
    pub unit_y: f64,
    /// Cards further than this from the active one are hidden.
    pub max_fan_out: i64,
}

impl Default for CarouselConfig {
    fn default() -> Self {
        Self {
            unit_x: 56.0,
            unit_r: 6.0,
            unit_y: 14.0,
            max_fan_out: 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BreakpointConfig {
    /// Viewports up to this width (inclusive) are treated as mobile.
    pub mobile_max_width: f64,
    /// Viewports up to this width (inclusive) skip parallax.
    pub parallax_max_width: f64,
}

impl Default for BreakpointConfig {
    fn default() -> Self {
        Self {
            mobile_max_width: 767.0,
            parallax_max_width: 1024.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollConfig {
    /// Quiet window before a burst of resize events is acted on, in ms.
    pub resize_debounce_ms: u64,
    /// Intersection ratio at which a section is revealed.
    pub reveal_threshold: f64,
}

impl ScrollConfig {
    pub fn resize_debounce(&self) -> Duration {
        Duration::from_millis(self.resize_debounce_ms)
    }
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            resize_debounce_ms: 180,
            reveal_threshold: 0.2,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn partial_documents_keep_defaults() {
        let config = AppConfig::from_json_str(r#"{ "gesture": { "swipe_threshold": 48 } }"#)
            .expect("config should parse");

        assert_eq!(config.gesture.swipe_threshold, 48.0);
        assert_eq!(config.gesture.lock_threshold, 12.0);
        assert_eq!(config.carousel, CarouselConfig::default());
        assert_eq!(config.scroll.resize_debounce(), Duration::from_millis(180));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "breakpoints": {{ "mobile_max_width": 600 }} }}"#).unwrap();

        let config = AppConfig::from_path(file.path()).unwrap();
        assert_eq!(config.breakpoints.mobile_max_width, 600.0);
        assert_eq!(config.breakpoints.parallax_max_width, 1024.0);
    }

    #[test]
    fn rejects_malformed_documents() {
        let err = AppConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, crate::GalleryError::Json(_)));
    }
}
