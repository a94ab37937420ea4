//! Body-part registry and default coordinate table.
//!
//! # Responsibility
//! - Enumerate every calibratable anatomical location.
//! - Provide id and category lookups over the static catalog.
//! - Provide the default coordinate for each part.
//!
//! # Invariants
//! - Catalog order is stable and preserved by every grouping helper.
//! - Lookups are pure and never fail; unknown ids yield `None`.

mod defaults;

use crate::model::body_part::{BodyPart, BodyPartCategory};
use crate::model::position::Position;
use std::collections::HashMap;

pub use defaults::{BODY_PARTS, DEFAULT_POSITIONS};

/// Returns every body part in catalog order.
pub fn list() -> &'static [BodyPart] {
    BODY_PARTS
}

/// Looks up one body part by stable id.
pub fn by_id(id: &str) -> Option<&'static BodyPart> {
    BODY_PARTS.iter().find(|part| part.id == id)
}

/// Groups body parts by category.
///
/// Groups appear in first-seen order and keep catalog order inside each group.
pub fn by_category() -> Vec<(BodyPartCategory, Vec<&'static BodyPart>)> {
    group_by_category(BODY_PARTS)
}

fn group_by_category(parts: &[BodyPart]) -> Vec<(BodyPartCategory, Vec<&BodyPart>)> {
    let mut groups: Vec<(BodyPartCategory, Vec<&BodyPart>)> = Vec::new();
    for part in parts {
        match groups
            .iter()
            .position(|(category, _)| *category == part.category)
        {
            Some(index) => groups[index].1.push(part),
            None => groups.push((part.category, vec![part])),
        }
    }
    groups
}

/// Default coordinates keyed by body-part id.
///
/// Absent entries resolve to the origin at lookup time.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DefaultPositions {
    entries: HashMap<String, Position>,
}

impl DefaultPositions {
    /// Table shipped with the bundled 3D model.
    pub fn builtin() -> Self {
        Self::from_entries(DEFAULT_POSITIONS.iter().map(|(id, pos)| (*id, *pos)))
    }

    pub fn from_entries<'a>(entries: impl IntoIterator<Item = (&'a str, Position)>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|(id, position)| (id.to_string(), position))
                .collect(),
        }
    }

    pub fn get(&self, id: &str) -> Option<Position> {
        self.entries.get(id).copied()
    }

    /// Returns the default for `id`, or the origin when none exists.
    pub fn get_or_origin(&self, id: &str) -> Position {
        self.get(id).unwrap_or(Position::ORIGIN)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
