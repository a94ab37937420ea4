//! Model-space coordinate value type.
//!
//! # Responsibility
//! - Represent one `(x, y, z)` point in the 3D model's local space.
//! - Serialize as a plain `[x, y, z]` JSON array to match persisted layout.
//!
//! # Invariants
//! - Components are nominally in `[-1, 1]`; this type does not enforce it.
//!   Clamping belongs to the editing workflow.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Axis selector for per-component slider edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// Parses `x|y|z` (case-insensitive).
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "x" => Some(Self::X),
            "y" => Some(Self::Y),
            "z" => Some(Self::Z),
            _ => None,
        }
    }
}

/// One coordinate in model-local space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 3]", into = "[f64; 3]")]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    /// Model origin, used whenever no better coordinate is known.
    pub const ORIGIN: Self = Self::new(0.0, 0.0, 0.0);

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn axis(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    /// Returns a copy with one component replaced.
    pub fn with_axis(mut self, axis: Axis, value: f64) -> Self {
        match axis {
            Axis::X => self.x = value,
            Axis::Y => self.y = value,
            Axis::Z => self.z = value,
        }
        self
    }

    pub fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    pub fn to_vector(self) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.z)
    }
}

impl From<[f64; 3]> for Position {
    fn from(value: [f64; 3]) -> Self {
        Self::new(value[0], value[1], value[2])
    }
}

impl From<Position> for [f64; 3] {
    fn from(value: Position) -> Self {
        value.to_array()
    }
}

#[cfg(test)]
mod tests {
    use super::{Axis, Position};

    #[test]
    fn serializes_as_plain_array() {
        let json = serde_json::to_string(&Position::new(0.1, -0.5, 1.0)).expect("serialize");
        assert_eq!(json, "[0.1,-0.5,1.0]");

        let parsed: Position = serde_json::from_str("[0.25,0.0,-0.75]").expect("deserialize");
        assert_eq!(parsed, Position::new(0.25, 0.0, -0.75));
    }

    #[test]
    fn rejects_arrays_with_wrong_arity() {
        assert!(serde_json::from_str::<Position>("[0.1,0.2]").is_err());
        assert!(serde_json::from_str::<Position>("[0.1,0.2,0.3,0.4]").is_err());
    }

    #[test]
    fn with_axis_replaces_only_one_component() {
        let moved = Position::new(0.1, 0.2, 0.3).with_axis(Axis::Y, -0.9);
        assert_eq!(moved, Position::new(0.1, -0.9, 0.3));
        assert_eq!(moved.axis(Axis::Y), -0.9);
    }

    #[test]
    fn parses_axis_names() {
        assert_eq!(Axis::parse(" X "), Some(Axis::X));
        assert_eq!(Axis::parse("z"), Some(Axis::Z));
        assert_eq!(Axis::parse("w"), None);
    }
}
