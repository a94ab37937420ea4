//! Static catalog data for the bundled French Bulldog model.

use crate::model::body_part::{BodyPart, BodyPartCategory};
use crate::model::position::Position;

const fn part(id: &'static str, label: &'static str, category: BodyPartCategory) -> BodyPart {
    BodyPart {
        id,
        label,
        category,
    }
}

/// Every calibratable location, in picker order.
pub static BODY_PARTS: &[BodyPart] = &[
    part("front-left-paw", "Front Left Paw", BodyPartCategory::Legs),
    part("front-right-paw", "Front Right Paw", BodyPartCategory::Legs),
    part("back-left-leg", "Back Left Leg", BodyPartCategory::Legs),
    part("back-right-leg", "Back Right Leg", BodyPartCategory::Legs),
    part("left-eye", "Left Eye", BodyPartCategory::Head),
    part("right-eye", "Right Eye", BodyPartCategory::Head),
    part("left-ear", "Left Ear", BodyPartCategory::Head),
    part("right-ear", "Right Ear", BodyPartCategory::Head),
    part("mouth-gum", "Mouth/Gum", BodyPartCategory::Head),
    part("head-top", "Head (top)", BodyPartCategory::Head),
    part("nose", "Nose", BodyPartCategory::Head),
    part("chest", "Chest", BodyPartCategory::Body),
    part("back-spine", "Back/Spine", BodyPartCategory::Body),
    part("tail", "Tail Area", BodyPartCategory::Body),
    part("abdomen", "Abdomen", BodyPartCategory::Body),
];

/// Default coordinates fitted against the bundled model.
pub static DEFAULT_POSITIONS: &[(&str, Position)] = &[
    ("front-left-paw", Position::new(0.26, -0.67, 0.17)),
    ("front-right-paw", Position::new(-0.22, -0.67, 0.18)),
    ("back-left-leg", Position::new(0.25, -0.48, -0.28)),
    ("back-right-leg", Position::new(-0.22, -0.45, -0.28)),
    ("left-eye", Position::new(0.12, 0.08, 0.32)),
    ("right-eye", Position::new(-0.10, 0.08, 0.32)),
    ("left-ear", Position::new(0.22, 0.30, 0.05)),
    ("right-ear", Position::new(-0.20, 0.30, 0.05)),
    ("mouth-gum", Position::new(0.0, -0.12, 0.38)),
    ("head-top", Position::new(0.0, 0.32, 0.12)),
    ("nose", Position::new(0.0, -0.02, 0.42)),
    ("chest", Position::new(0.0, -0.35, 0.22)),
    ("back-spine", Position::new(0.0, -0.15, -0.18)),
    ("tail", Position::new(0.0, -0.32, -0.38)),
    ("abdomen", Position::new(0.0, -0.52, 0.0)),
];
