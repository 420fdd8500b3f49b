//! Editor configuration.

use crate::camera::{MAX_ZOOM, MIN_ZOOM, WHEEL_ZOOM_SENSITIVITY};
use crate::presets::{DEFAULT_BASE_RADIUS, PresetGenerator};
use crate::selection::TransformOptions;
use crate::shapes::DEFAULT_COLOR;
use crate::snap::{DEFAULT_LATTICE_STEP, HexLattice, SOFT_SNAP_RATIO, SnapMode};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Default hit tolerance in screen pixels.
pub const DEFAULT_HIT_TOLERANCE_PX: f64 = 10.0;
/// Default rotation snap increment in degrees.
pub const DEFAULT_ROTATE_SNAP_DEGREES: f64 = 15.0;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid config value for {field}: {value}")]
    Invalid { field: &'static str, value: f64 },
}

/// Tunable editor settings. Every field has a default, so a partial JSON
/// object is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorConfig {
    /// Horizontal distance between lattice anchors, in world units.
    pub lattice_step: f64,
    pub zoom_min: f64,
    pub zoom_max: f64,
    /// Hit tolerance in screen pixels; divided by zoom for world space.
    pub hit_tolerance_px: f64,
    /// Soft-snap radius during transforms, as a fraction of the step.
    pub soft_snap_ratio: f64,
    pub rotate_snap_degrees: f64,
    pub preset_base_radius: f64,
    /// Colour of new segments.
    pub default_color: String,
    /// Wheel zoom factor per unit of `delta_y`.
    pub wheel_sensitivity: f64,
    /// Snap mode a fresh editor starts in.
    pub snap_mode: SnapMode,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            lattice_step: DEFAULT_LATTICE_STEP,
            zoom_min: MIN_ZOOM,
            zoom_max: MAX_ZOOM,
            hit_tolerance_px: DEFAULT_HIT_TOLERANCE_PX,
            soft_snap_ratio: SOFT_SNAP_RATIO,
            rotate_snap_degrees: DEFAULT_ROTATE_SNAP_DEGREES,
            preset_base_radius: DEFAULT_BASE_RADIUS,
            default_color: DEFAULT_COLOR.to_string(),
            wheel_sensitivity: WHEEL_ZOOM_SENSITIVITY,
            snap_mode: SnapMode::default(),
        }
    }
}

impl EditorConfig {
    /// Parse and validate a JSON config.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded editor config from {}", path.display());
        Ok(config)
    }

    /// Reject values the geometry cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("latticeStep", self.lattice_step),
            ("zoomMin", self.zoom_min),
            ("zoomMax", self.zoom_max),
            ("presetBaseRadius", self.preset_base_radius),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Invalid { field, value });
            }
        }
        if self.zoom_max < self.zoom_min {
            return Err(ConfigError::Invalid {
                field: "zoomMax",
                value: self.zoom_max,
            });
        }
        let non_negative = [
            ("hitTolerancePx", self.hit_tolerance_px),
            ("softSnapRatio", self.soft_snap_ratio),
            ("rotateSnapDegrees", self.rotate_snap_degrees),
            ("wheelSensitivity", self.wheel_sensitivity),
        ];
        for (field, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::Invalid { field, value });
            }
        }
        Ok(())
    }

    pub fn lattice(&self) -> HexLattice {
        HexLattice::new(self.lattice_step)
    }

    pub fn preset_generator(&self) -> PresetGenerator {
        PresetGenerator::new(self.preset_base_radius)
    }

    /// Rotation snap increment in radians.
    pub fn rotate_snap_increment(&self) -> f64 {
        self.rotate_snap_degrees.to_radians()
    }

    /// Transform options for the given runtime snap state.
    pub fn transform_options(&self, snap_mode: SnapMode, rotate_snap: bool) -> TransformOptions {
        TransformOptions {
            rotate_snap,
            snap_mode,
            lattice: self.lattice(),
            soft_snap_ratio: self.soft_snap_ratio,
            angle_increment: self.rotate_snap_increment(),
        }
    }
}
