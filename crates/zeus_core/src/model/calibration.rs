//! Operator calibration override model.
//!
//! # Responsibility
//! - Define one saved coordinate override and its persisted JSON shape.
//!
//! # Invariants
//! - An entry exists only for parts saved since the last clear; clearing
//!   removes the entry instead of zeroing it.
//! - `calibrated_at` is an ISO-8601 UTC timestamp.

use crate::model::position::Position;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Persisted calibration map keyed by body-part id.
///
/// Ordered so identical state always serializes to identical text.
pub type CalibrationMap = BTreeMap<String, Calibration>;

/// Operator-saved override of one body part's default coordinate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Calibration {
    pub position: Position,
    pub calibrated_at: String,
}

impl Calibration {
    /// Creates an override stamped with the current wall-clock time.
    pub fn stamped_now(position: Position) -> Self {
        Self {
            position,
            calibrated_at: iso_timestamp_now(),
        }
    }
}

/// Current UTC time as `YYYY-MM-DDTHH:MM:SS.mmmZ`.
pub fn iso_timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
