//! Camera-facing hemisphere test for hotspot markers.
//!
//! # Invariants
//! - Pure function of marker, camera and config; safe to run every frame or
//!   to skip frames.
//! - No hysteresis: the same inputs always give the same answer.
//! - A point at the model center has no direction and counts as facing
//!   sideways (cosine `0`).

use crate::config::VisibilityConfig;
use crate::model::position::Position;
use nalgebra::Vector3;

/// Cosine of the angle between the marker and camera directions, both
/// measured from `center`.
pub fn facing_cosine(marker: Position, camera: Position, center: Position) -> f64 {
    let marker_dir = direction_from(center, marker);
    let camera_dir = direction_from(center, camera);
    marker_dir.dot(&camera_dir)
}

/// Returns whether a marker at `marker` is on the camera-facing side of the model.
pub fn is_facing_camera(marker: Position, camera: Position, config: &VisibilityConfig) -> bool {
    facing_cosine(marker, camera, config.model_center) > config.occlusion_threshold
}

fn direction_from(center: Position, point: Position) -> Vector3<f64> {
    (point.to_vector() - center.to_vector())
        .try_normalize(f64::EPSILON)
        .unwrap_or_else(Vector3::zeros)
}
