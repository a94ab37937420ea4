//! FFI calibration API for the Flutter viewer.
//!
//! # Responsibility
//! - Expose calibration store, workflow and visibility operations to Dart via FRB.
//! - Translate core errors into simple response envelopes for UI notices.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Every store read opens fresh persisted state; nothing is cached here.
//! - Reads fall back to default positions when storage cannot be opened.

use log::{info, warn};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};
use zeus_core::db::open_db;
use zeus_core::{
    catalog, core_version as core_version_inner, init_logging as init_logging_inner,
    is_facing_camera, ping as ping_inner, resolve_hotspots as resolve_hotspots_inner, Axis,
    CalibrationConfig, CalibrationStore, CalibrationWorkflow, Hotspot, IssueLink, IssueStatus,
    KeyValueStore, MemoryKeyValueStore, MutationOutcome, Position, SqliteKeyValueStore,
    StatusFilter, WorkflowResult, WorkflowSnapshot,
};

const CALIBRATION_DB_FILE_NAME: &str = "zeus_calibration.sqlite3";
const DB_PATH_ENV: &str = "ZEUS_DB_PATH";

static CALIBRATION_DB_PATH: OnceLock<PathBuf> = OnceLock::new();
static CALIBRATION_CONFIG: OnceLock<Mutex<CalibrationConfig>> = OnceLock::new();
static WORKFLOW: OnceLock<Mutex<CalibrationWorkflow>> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Pins the calibration database file for this process.
///
/// # FFI contract
/// - Sync call; call before the first store read or write.
/// - Repeat calls with the same path are no-ops.
/// - Never panics; returns empty string on success and error message when a
///   different path is already active.
#[flutter_rust_bridge::frb(sync)]
pub fn configure_storage(db_path: String) -> String {
    let requested = PathBuf::from(db_path.trim());
    if requested.as_os_str().is_empty() {
        return "db_path cannot be empty".to_string();
    }
    let active = CALIBRATION_DB_PATH.get_or_init(|| requested.clone());
    if *active == requested {
        String::new()
    } else {
        format!(
            "calibration storage already configured at `{}`",
            active.display()
        )
    }
}

/// Applies tunable overrides (JSON, any subset of fields).
///
/// # FFI contract
/// - Sync call; may be called at any time and replaces earlier overrides.
/// - An open calibration session keeps its selection; later slider edits use
///   the new range.
/// - Never panics; returns empty string on success and error message otherwise.
#[flutter_rust_bridge::frb(sync)]
pub fn configure_calibration(config_json: String) -> String {
    let config = match CalibrationConfig::from_json(config_json.as_str()) {
        Ok(config) => config,
        Err(err) => return format!("invalid calibration config: {err}"),
    };
    *lock_config() = config;
    lock_workflow().set_axis_range(config.axis_range);
    info!(
        "event=calibration_configure module=ffi status=ok occlusion_threshold={} axis_min={} axis_max={}",
        config.visibility.occlusion_threshold, config.axis_range.min, config.axis_range.max
    );
    String::new()
}

/// Model-space coordinate crossing the FFI boundary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FfiPosition {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl From<Position> for FfiPosition {
    fn from(value: Position) -> Self {
        Self {
            x: value.x,
            y: value.y,
            z: value.z,
        }
    }
}

impl From<FfiPosition> for Position {
    fn from(value: FfiPosition) -> Self {
        Position::new(value.x, value.y, value.z)
    }
}

/// Calibration progress for the calibrator header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalibrationStatsItem {
    pub calibrated: u32,
    pub total: u32,
    pub percentage: u32,
}

/// Catalog row for the part picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BodyPartItem {
    pub id: String,
    pub label: String,
    pub category: String,
    pub calibrated: bool,
}

/// Store mutation response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalibrationActionResponse {
    /// `false` only for real failures (storage write, invalid input).
    pub ok: bool,
    /// `false` when the call was a no-op, for example while locked.
    pub applied: bool,
    /// Human-readable message for a transient notice.
    pub message: String,
}

impl CalibrationActionResponse {
    fn from_outcome(outcome: MutationOutcome) -> Self {
        let message = match outcome {
            MutationOutcome::Applied => "Saved.",
            MutationOutcome::Unchanged => "Nothing to change.",
            MutationOutcome::IgnoredLocked => "Calibration is locked.",
        };
        Self {
            ok: true,
            applied: outcome.is_applied(),
            message: message.to_string(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            applied: false,
            message: message.into(),
        }
    }
}

/// Workflow session view for the calibrator panel.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowSnapshotItem {
    /// `closed|no_selection|editing|locked_blocked`.
    pub phase: String,
    pub selected_body_part_id: Option<String>,
    pub preview_position: Option<FfiPosition>,
}

impl From<WorkflowSnapshot> for WorkflowSnapshotItem {
    fn from(value: WorkflowSnapshot) -> Self {
        Self {
            phase: value.phase.as_str().to_string(),
            selected_body_part_id: value.selected_body_part_id,
            preview_position: value.preview_position.map(FfiPosition::from),
        }
    }
}

/// Workflow intent response envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowResponse {
    pub ok: bool,
    pub message: String,
    pub snapshot: WorkflowSnapshotItem,
}

/// Medical issue projection passed in by the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueInput {
    pub issue_id: String,
    /// `active|monitoring|resolved`; unknown values drop the issue.
    pub status: String,
    pub body_part_id: Option<String>,
}

/// Marker ready to draw.
#[derive(Debug, Clone, PartialEq)]
pub struct HotspotItem {
    pub issue_id: String,
    pub body_part_id: String,
    pub status: String,
    pub color: String,
    pub position: FfiPosition,
}

impl From<Hotspot> for HotspotItem {
    fn from(value: Hotspot) -> Self {
        Self {
            issue_id: value.issue_id,
            body_part_id: value.body_part_id,
            status: value.status.as_str().to_string(),
            color: value.color.to_string(),
            position: value.position.into(),
        }
    }
}

/// Effective position for one body part; origin for unknown ids.
///
/// # FFI contract
/// - Sync call, DB-backed read.
/// - Never panics; falls back to default positions when storage cannot be opened.
#[flutter_rust_bridge::frb(sync)]
pub fn get_position(body_part_id: String) -> FfiPosition {
    read_store(|store| store.effective_position(body_part_id.trim())).into()
}

/// Whether `body_part_id` has a saved override.
///
/// # FFI contract
/// - Sync call, DB-backed read.
/// - Never panics; falls back to default positions when storage cannot be opened.
#[flutter_rust_bridge::frb(sync)]
pub fn is_calibrated(body_part_id: String) -> bool {
    read_store(|store| store.is_calibrated(body_part_id.trim()))
}

/// Current lock flag.
///
/// # FFI contract
/// - Sync call, DB-backed read.
/// - Never panics; falls back to default positions when storage cannot be opened.
#[flutter_rust_bridge::frb(sync)]
pub fn is_locked() -> bool {
    read_store(|store| store.is_locked())
}

/// Calibration progress for the calibrator header.
///
/// # FFI contract
/// - Sync call, DB-backed read.
/// - Never panics; falls back to default positions when storage cannot be opened.
#[flutter_rust_bridge::frb(sync)]
pub fn get_stats() -> CalibrationStatsItem {
    let stats = read_store(|store| store.stats());
    CalibrationStatsItem {
        calibrated: saturating_u32(stats.calibrated),
        total: saturating_u32(stats.total),
        percentage: stats.percentage,
    }
}

/// Lists the catalog in picker order with calibration markers.
///
/// # FFI contract
/// - Sync call, DB-backed read.
/// - Never panics; falls back to default positions when storage cannot be opened.
#[flutter_rust_bridge::frb(sync)]
pub fn list_body_parts() -> Vec<BodyPartItem> {
    read_store(|store| {
        catalog::list()
            .iter()
            .map(|part| BodyPartItem {
                id: part.id.to_string(),
                label: part.label.to_string(),
                category: part.category.as_str().to_string(),
                calibrated: store.is_calibrated(part.id),
            })
            .collect()
    })
}

/// Saves `position` as the override for `body_part_id`.
///
/// # FFI contract
/// - Sync call, DB-backed write-through.
/// - Never panics.
/// - `ok=false` only for real failures (unknown id, invalid value, storage write);
///   a locked no-op returns `ok=true, applied=false`.
#[flutter_rust_bridge::frb(sync)]
pub fn commit_position(body_part_id: String, position: FfiPosition) -> CalibrationActionResponse {
    store_action("commit_position", |store| {
        store
            .commit(body_part_id.trim(), position.into())
            .map_err(|err| err.to_string())
    })
}

/// Removes the override for `body_part_id`.
///
/// # FFI contract
/// - Sync call, DB-backed write-through.
/// - Never panics.
/// - `ok=false` only for real failures (unknown id, invalid value, storage write);
///   a locked no-op returns `ok=true, applied=false`.
#[flutter_rust_bridge::frb(sync)]
pub fn clear_position(body_part_id: String) -> CalibrationActionResponse {
    store_action("clear_position", |store| {
        store
            .clear(body_part_id.trim())
            .map_err(|err| err.to_string())
    })
}

/// Removes every override.
///
/// # FFI contract
/// - Sync call, DB-backed write-through.
/// - Never panics.
/// - `ok=false` only for real failures (unknown id, invalid value, storage write);
///   a locked no-op returns `ok=true, applied=false`.
#[flutter_rust_bridge::frb(sync)]
pub fn clear_all_positions() -> CalibrationActionResponse {
    store_action("clear_all_positions", |store| {
        store.clear_all().map_err(|err| err.to_string())
    })
}

/// Flips the lock directly, without the workflow's confirmation step.
///
/// # FFI contract
/// - Sync call, DB-backed write-through; works while locked.
/// - Never panics; `ok=false` only when the lock write fails.
#[flutter_rust_bridge::frb(sync)]
pub fn toggle_lock() -> CalibrationActionResponse {
    store_action("toggle_lock", |store| {
        store
            .toggle_lock()
            .map(|_| MutationOutcome::Applied)
            .map_err(|err| err.to_string())
    })
}

/// Sets the lock flag; works while locked.
///
/// # FFI contract
/// - Sync call, DB-backed write-through.
/// - Never panics; `ok=false` only when the lock write fails.
#[flutter_rust_bridge::frb(sync)]
pub fn set_locked(locked: bool) -> CalibrationActionResponse {
    store_action("set_locked", |store| {
        store
            .set_locked(locked)
            .map(|()| MutationOutcome::Applied)
            .map_err(|err| err.to_string())
    })
}

/// Current calibration session view.
///
/// # FFI contract
/// - Sync call, in-memory only.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn workflow_snapshot() -> WorkflowSnapshotItem {
    lock_workflow().snapshot().into()
}

/// Enters calibration mode with nothing selected.
///
/// # FFI contract
/// - Sync call; serialized with other workflow intents.
/// - Never panics; rejected intents return `ok=false` with the current snapshot.
#[flutter_rust_bridge::frb(sync)]
pub fn workflow_open() -> WorkflowResponse {
    let mut workflow = lock_workflow();
    workflow.open();
    workflow_response(&workflow, Ok(()))
}

/// Leaves calibration mode, discarding any uncommitted preview.
///
/// # FFI contract
/// - Sync call; serialized with other workflow intents.
/// - Never panics; rejected intents return `ok=false` with the current snapshot.
#[flutter_rust_bridge::frb(sync)]
pub fn workflow_close() -> WorkflowResponse {
    let mut workflow = lock_workflow();
    workflow.close();
    workflow_response(&workflow, Ok(()))
}

/// Selects a part for editing, or asks for unlock confirmation while locked.
///
/// # FFI contract
/// - Sync call; serialized with other workflow intents.
/// - Never panics; rejected intents return `ok=false` with the current snapshot.
#[flutter_rust_bridge::frb(sync)]
pub fn workflow_select(body_part_id: String) -> WorkflowResponse {
    workflow_action(|workflow, store| workflow.select(&*store, body_part_id.trim()).map(drop))
}

/// Drops the current selection and its preview.
///
/// # FFI contract
/// - Sync call; serialized with other workflow intents.
/// - Never panics; rejected intents return `ok=false` with the current snapshot.
#[flutter_rust_bridge::frb(sync)]
pub fn workflow_deselect() -> WorkflowResponse {
    let mut workflow = lock_workflow();
    let result = workflow.deselect().map(drop);
    workflow_response(&workflow, result)
}

/// Slider drag on `axis` (`x|y|z`), clamped to the configured range.
///
/// # FFI contract
/// - Sync call; serialized with other workflow intents.
/// - Never panics; rejected intents return `ok=false` with the current snapshot.
#[flutter_rust_bridge::frb(sync)]
pub fn workflow_set_axis(axis: String, value: f64) -> WorkflowResponse {
    let Some(axis) = Axis::parse(axis.as_str()) else {
        let workflow = lock_workflow();
        return failed_workflow_response(&workflow, format!("unknown axis `{axis}`"));
    };
    workflow_action(|workflow, store| workflow.set_axis(&*store, axis, value).map(drop))
}

/// Resets the preview to the catalog default without saving.
///
/// # FFI contract
/// - Sync call; serialized with other workflow intents.
/// - Never panics; rejected intents return `ok=false` with the current snapshot.
#[flutter_rust_bridge::frb(sync)]
pub fn workflow_reset_to_default() -> WorkflowResponse {
    workflow_action(|workflow, store| workflow.reset_to_default(&*store).map(drop))
}

/// Commits the preview for the selected part.
///
/// # FFI contract
/// - Sync call; serialized with other workflow intents.
/// - Never panics; rejected intents return `ok=false` with the current snapshot.
#[flutter_rust_bridge::frb(sync)]
pub fn workflow_save() -> WorkflowResponse {
    workflow_action(|workflow, store| workflow.save(store).map(drop))
}

/// Removes the selected part's override and re-seeds the preview.
///
/// # FFI contract
/// - Sync call; serialized with other workflow intents.
/// - Never panics; rejected intents return `ok=false` with the current snapshot.
#[flutter_rust_bridge::frb(sync)]
pub fn workflow_clear_selected() -> WorkflowResponse {
    workflow_action(|workflow, store| workflow.clear_selected(store).map(drop))
}

/// Removes every override and refreshes the preview.
///
/// # FFI contract
/// - Sync call; serialized with other workflow intents.
/// - Never panics; rejected intents return `ok=false` with the current snapshot.
#[flutter_rust_bridge::frb(sync)]
pub fn workflow_clear_all() -> WorkflowResponse {
    workflow_action(|workflow, store| workflow.clear_all(store).map(drop))
}

/// Lock button: locks at once, or asks for unlock confirmation.
///
/// # FFI contract
/// - Sync call; serialized with other workflow intents.
/// - Never panics; rejected intents return `ok=false` with the current snapshot.
#[flutter_rust_bridge::frb(sync)]
pub fn workflow_toggle_lock() -> WorkflowResponse {
    workflow_action(|workflow, store| workflow.toggle_lock(store).map(drop))
}

/// Confirms a pending unlock request.
///
/// # FFI contract
/// - Sync call; serialized with other workflow intents.
/// - Never panics; rejected intents return `ok=false` with the current snapshot.
#[flutter_rust_bridge::frb(sync)]
pub fn workflow_confirm_unlock() -> WorkflowResponse {
    workflow_action(|workflow, store| workflow.confirm_unlock(store).map(drop))
}

/// Abandons a pending unlock and restores the interrupted state.
///
/// # FFI contract
/// - Sync call; serialized with other workflow intents.
/// - Never panics; rejected intents return `ok=false` with the current snapshot.
#[flutter_rust_bridge::frb(sync)]
pub fn workflow_cancel_unlock() -> WorkflowResponse {
    let mut workflow = lock_workflow();
    let result = workflow.cancel_unlock().map(drop);
    workflow_response(&workflow, result)
}

/// Applies the status filter (`active|active+monitoring|all`) and resolves
/// effective positions. Issues with unknown status strings are dropped.
///
/// # FFI contract
/// - Sync call, DB-backed read.
/// - Never panics; falls back to default positions when storage cannot be opened.
#[flutter_rust_bridge::frb(sync)]
pub fn resolve_hotspots(issues: Vec<IssueInput>, status_filter: String) -> Vec<HotspotItem> {
    let filter = StatusFilter::parse_or_default(status_filter.as_str());
    let links: Vec<IssueLink> = issues
        .into_iter()
        .filter_map(|issue| {
            let status = IssueStatus::parse(issue.status.as_str())?;
            Some(IssueLink {
                issue_id: issue.issue_id,
                status,
                body_part_id: issue.body_part_id,
            })
        })
        .collect();

    read_store(|store| resolve_hotspots_inner(&links, store, filter))
        .into_iter()
        .map(HotspotItem::from)
        .collect()
}

/// Per-frame occlusion gate.
///
/// # FFI contract
/// - Sync call, pure; no storage access, safe to call every frame.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn visible_hotspots(hotspots: Vec<HotspotItem>, camera: FfiPosition) -> Vec<HotspotItem> {
    let config = calibration_config().visibility;
    let camera = Position::from(camera);
    hotspots
        .into_iter()
        .filter(|hotspot| is_facing_camera(hotspot.position.into(), camera, &config))
        .collect()
}

fn lock_config() -> MutexGuard<'static, CalibrationConfig> {
    CALIBRATION_CONFIG
        .get_or_init(|| Mutex::new(CalibrationConfig::default()))
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
}

fn calibration_config() -> CalibrationConfig {
    *lock_config()
}

fn lock_workflow() -> MutexGuard<'static, CalibrationWorkflow> {
    WORKFLOW
        .get_or_init(|| Mutex::new(CalibrationWorkflow::new(calibration_config().axis_range)))
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
}

fn resolve_db_path() -> PathBuf {
    CALIBRATION_DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var(DB_PATH_ENV) {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(CALIBRATION_DB_FILE_NAME)
        })
        .clone()
}

fn read_store<T>(f: impl FnOnce(&CalibrationStore<&dyn KeyValueStore>) -> T) -> T {
    read_store_at(&resolve_db_path(), f)
}

fn read_store_at<T>(
    db_path: &Path,
    f: impl FnOnce(&CalibrationStore<&dyn KeyValueStore>) -> T,
) -> T {
    let fallback = MemoryKeyValueStore::new();
    let conn = match open_db(db_path) {
        Ok(conn) => Some(conn),
        Err(err) => {
            warn!(
                "event=ffi_read module=ffi status=error source=default error={}",
                err
            );
            None
        }
    };
    let sqlite = conn.as_ref().map(SqliteKeyValueStore::new);
    let storage: &dyn KeyValueStore = match &sqlite {
        Some(sqlite) => sqlite,
        None => &fallback,
    };
    f(&CalibrationStore::load(storage))
}

fn store_action(
    action: &str,
    f: impl FnOnce(
        &mut CalibrationStore<SqliteKeyValueStore<'_>>,
    ) -> Result<MutationOutcome, String>,
) -> CalibrationActionResponse {
    let conn = match open_db(resolve_db_path()) {
        Ok(conn) => conn,
        Err(err) => {
            return CalibrationActionResponse::failure(format!(
                "{action} failed: storage unavailable: {err}"
            ))
        }
    };
    let mut store = CalibrationStore::load(SqliteKeyValueStore::new(&conn));
    match f(&mut store) {
        Ok(outcome) => CalibrationActionResponse::from_outcome(outcome),
        Err(err) => CalibrationActionResponse::failure(format!("{action} failed: {err}")),
    }
}

fn workflow_action(
    f: impl FnOnce(
        &mut CalibrationWorkflow,
        &mut CalibrationStore<SqliteKeyValueStore<'_>>,
    ) -> WorkflowResult<()>,
) -> WorkflowResponse {
    let mut workflow = lock_workflow();
    let conn = match open_db(resolve_db_path()) {
        Ok(conn) => conn,
        Err(err) => {
            return failed_workflow_response(&workflow, format!("storage unavailable: {err}"))
        }
    };
    let mut store = CalibrationStore::load(SqliteKeyValueStore::new(&conn));
    let result = f(&mut *workflow, &mut store);
    workflow_response(&workflow, result)
}

fn workflow_response(
    workflow: &CalibrationWorkflow,
    result: WorkflowResult<()>,
) -> WorkflowResponse {
    match result {
        Ok(()) => WorkflowResponse {
            ok: true,
            message: String::new(),
            snapshot: workflow.snapshot().into(),
        },
        Err(err) => failed_workflow_response(workflow, err.to_string()),
    }
}

fn failed_workflow_response(workflow: &CalibrationWorkflow, message: String) -> WorkflowResponse {
    WorkflowResponse {
        ok: false,
        message,
        snapshot: workflow.snapshot().into(),
    }
}

fn saturating_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}
