//! Tunable constants for calibration editing and hotspot visibility.
//!
//! # Responsibility
//! - Name every empirically fitted constant instead of inlining literals.
//! - Let hosts override any subset of values from JSON.
//!
//! # Invariants
//! - Defaults match the values fitted against the bundled 3D model.
//! - Missing JSON fields fall back to defaults individually.

use crate::model::position::Position;
use serde::{Deserialize, Serialize};

/// Storage key holding the calibration map JSON object.
pub const CALIBRATIONS_STORAGE_KEY: &str = "zeus-body-part-calibrations";
/// Storage key holding the lock flag JSON boolean.
pub const LOCK_STORAGE_KEY: &str = "zeus-calibration-locked";

/// Cosine cut-off for the camera-facing test; slightly past the silhouette.
pub const DEFAULT_OCCLUSION_THRESHOLD: f64 = -0.2;
pub const DEFAULT_AXIS_MIN: f64 = -1.0;
pub const DEFAULT_AXIS_MAX: f64 = 1.0;

/// Occlusion gate parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VisibilityConfig {
    /// A marker renders when `dot(marker_dir, camera_dir)` is strictly greater.
    pub occlusion_threshold: f64,
    /// Geometric center of the model both directions are measured from.
    pub model_center: Position,
}

impl Default for VisibilityConfig {
    fn default() -> Self {
        Self {
            occlusion_threshold: DEFAULT_OCCLUSION_THRESHOLD,
            model_center: Position::ORIGIN,
        }
    }
}

/// Inclusive per-axis range for preview edits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AxisRange {
    pub min: f64,
    pub max: f64,
}

impl Default for AxisRange {
    fn default() -> Self {
        Self {
            min: DEFAULT_AXIS_MIN,
            max: DEFAULT_AXIS_MAX,
        }
    }
}

impl AxisRange {
    /// Clamps `value` into `[min, max]`.
    ///
    /// A reversed range is treated as if its bounds were swapped. A NaN bound
    /// falls back to its default.
    pub fn clamp(&self, value: f64) -> f64 {
        let min = if self.min.is_nan() {
            DEFAULT_AXIS_MIN
        } else {
            self.min
        };
        let max = if self.max.is_nan() {
            DEFAULT_AXIS_MAX
        } else {
            self.max
        };
        let (low, high) = if min <= max { (min, max) } else { (max, min) };
        value.clamp(low, high)
    }
}

/// Full set of calibration tunables.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CalibrationConfig {
    pub visibility: VisibilityConfig,
    pub axis_range: AxisRange,
}

impl CalibrationConfig {
    /// Parses overrides from JSON; absent fields keep their defaults.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}
