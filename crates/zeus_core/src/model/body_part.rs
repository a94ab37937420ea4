//! Body-part catalog entry model.
//!
//! # Invariants
//! - `id` is a stable key; persisted calibrations and issue links refer to it.
//! - Entries are defined at build time and never mutated.

use serde::Serialize;

/// Closed grouping set used by the calibrator part picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyPartCategory {
    Legs,
    Head,
    Body,
}

impl BodyPartCategory {
    /// Stable string id used by UI grouping.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Legs => "legs",
            Self::Head => "head",
            Self::Body => "body",
        }
    }
}

/// One calibratable anatomical location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BodyPart {
    pub id: &'static str,
    pub label: &'static str,
    pub category: BodyPartCategory,
}
