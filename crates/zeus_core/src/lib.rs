//! Core calibration and hotspot visibility logic for the Zeus anatomy viewer.
//! This crate is the single source of truth for calibration invariants.

pub mod catalog;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod visibility;

pub use catalog::DefaultPositions;
pub use config::{
    AxisRange, CalibrationConfig, VisibilityConfig, CALIBRATIONS_STORAGE_KEY, LOCK_STORAGE_KEY,
};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::body_part::{BodyPart, BodyPartCategory};
pub use model::calibration::{Calibration, CalibrationMap};
pub use model::issue::{IssueLink, IssueStatus, StatusFilter};
pub use model::position::{Axis, Position};
pub use repo::kv_repo::{
    KeyValueStore, MemoryKeyValueStore, RepoError, RepoResult, SqliteKeyValueStore,
};
pub use service::calibration_store::{
    resolve_effective_position, CalibrationStats, CalibrationStore, MutationOutcome, StoreError,
    StoreResult,
};
pub use service::calibration_workflow::{
    CalibrationSession, CalibrationWorkflow, WorkflowError, WorkflowPhase, WorkflowResult,
    WorkflowSnapshot, WorkflowState,
};
pub use visibility::{is_facing_camera, resolve_hotspots, visible_hotspots, Hotspot};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
