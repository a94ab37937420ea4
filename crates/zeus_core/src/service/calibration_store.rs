//! Calibration store: operator overrides, lock flag, and their persistence.
//!
//! # Responsibility
//! - Resolve effective positions (override, else default, else origin).
//! - Mutate overrides and the lock flag, writing each change through to
//!   durable storage before the call returns.
//!
//! # Invariants
//! - While locked, `commit`, `clear` and `clear_all` leave state untouched.
//! - Lock mutations are exempt from the lock guard.
//! - In-memory state only changes after the matching storage write succeeds,
//!   so reads never observe a value that was not persisted.
//! - Loading never fails; unreadable or malformed data yields empty defaults.

use crate::catalog::DefaultPositions;
use crate::config::{CALIBRATIONS_STORAGE_KEY, LOCK_STORAGE_KEY};
use crate::model::calibration::{Calibration, CalibrationMap};
use crate::model::position::Position;
use crate::repo::kv_repo::{KeyValueStore, RepoError};
use log::{debug, error, info, warn};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Calibration store failures that must reach the operator.
#[derive(Debug)]
pub enum StoreError {
    /// Id is not in the default-position table, so it can never render.
    UnknownBodyPart(String),
    /// Position has a NaN or infinite component and cannot be persisted.
    InvalidPosition {
        body_part_id: String,
        position: Position,
    },
    Serialize(serde_json::Error),
    /// Durable write failed; in-memory state was left unchanged.
    Persist {
        key: &'static str,
        source: RepoError,
    },
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownBodyPart(id) => write!(f, "unknown body part: {id}"),
            Self::InvalidPosition {
                body_part_id,
                position,
            } => write!(
                f,
                "position for `{body_part_id}` must be finite, got [{}, {}, {}]",
                position.x, position.y, position.z
            ),
            Self::Serialize(err) => write!(f, "failed to serialize calibration state: {err}"),
            Self::Persist { key, source } => {
                write!(f, "failed to save `{key}`: {source}")
            }
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::UnknownBodyPart(_) | Self::InvalidPosition { .. } => None,
            Self::Serialize(err) => Some(err),
            Self::Persist { source, .. } => Some(source),
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialize(value)
    }
}

/// Result of a lock-guarded mutation.
///
/// A locked store is an expected guarded path, so it is reported here
/// rather than as an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    Applied,
    /// Nothing to change (for example clearing a part with no override).
    Unchanged,
    IgnoredLocked,
}

impl MutationOutcome {
    pub fn is_applied(self) -> bool {
        self == Self::Applied
    }
}

/// Calibration progress counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CalibrationStats {
    pub calibrated: usize,
    pub total: usize,
    pub percentage: u32,
}

impl CalibrationStats {
    /// `percentage = round(100 * calibrated / total)`, or `0` when `total == 0`.
    pub fn compute(calibrated: usize, total: usize) -> Self {
        let percentage = if total == 0 {
            0
        } else {
            ((calibrated as f64 / total as f64) * 100.0).round() as u32
        };
        Self {
            calibrated,
            total,
            percentage,
        }
    }
}

/// Two-tier lookup: override if present, else default, else origin.
pub fn resolve_effective_position(
    calibrations: &CalibrationMap,
    defaults: &DefaultPositions,
    body_part_id: &str,
) -> Position {
    calibrations
        .get(body_part_id)
        .map(|calibration| calibration.position)
        .unwrap_or_else(|| defaults.get_or_origin(body_part_id))
}

/// Owner of the calibration map and lock flag for one storage backend.
pub struct CalibrationStore<S: KeyValueStore> {
    storage: S,
    defaults: DefaultPositions,
    calibrations: CalibrationMap,
    locked: bool,
}

impl<S: KeyValueStore> CalibrationStore<S> {
    /// Loads persisted state using the bundled default positions.
    pub fn load(storage: S) -> Self {
        Self::load_with_defaults(storage, DefaultPositions::builtin())
    }

    /// Loads persisted state over a caller-provided default table.
    ///
    /// Both keys are read independently; a failure in one does not discard
    /// the other.
    pub fn load_with_defaults(storage: S, defaults: DefaultPositions) -> Self {
        let calibrations = load_calibrations(&storage);
        let locked = load_lock(&storage);
        Self {
            storage,
            defaults,
            calibrations,
            locked,
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn defaults(&self) -> &DefaultPositions {
        &self.defaults
    }

    pub fn calibrations(&self) -> &CalibrationMap {
        &self.calibrations
    }

    pub fn calibration(&self, body_part_id: &str) -> Option<&Calibration> {
        self.calibrations.get(body_part_id)
    }

    /// Returns the coordinate used for rendering `body_part_id`.
    ///
    /// Never fails; unknown ids resolve to the origin.
    pub fn effective_position(&self, body_part_id: &str) -> Position {
        resolve_effective_position(&self.calibrations, &self.defaults, body_part_id)
    }

    pub fn is_calibrated(&self, body_part_id: &str) -> bool {
        self.calibrations.contains_key(body_part_id)
    }

    /// Progress over the default-position table.
    ///
    /// Persisted entries for ids outside the table are not counted, so
    /// `calibrated <= total` always holds.
    pub fn stats(&self) -> CalibrationStats {
        let calibrated = self
            .calibrations
            .keys()
            .filter(|id| self.defaults.get(id).is_some())
            .count();
        CalibrationStats::compute(calibrated, self.defaults.len())
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Creates or replaces the override for `body_part_id`, stamped now.
    ///
    /// # Errors
    /// - `UnknownBodyPart` for ids outside the default-position table.
    /// - `InvalidPosition` for non-finite components.
    ///
    /// Both are checked only when unlocked.
    /// - `Persist` when the storage write fails; state is unchanged.
    pub fn commit(
        &mut self,
        body_part_id: &str,
        position: Position,
    ) -> StoreResult<MutationOutcome> {
        if self.locked {
            return Ok(skip_locked("calibration_commit", Some(body_part_id)));
        }
        if self.defaults.get(body_part_id).is_none() {
            return Err(StoreError::UnknownBodyPart(body_part_id.to_string()));
        }
        if !position.to_array().iter().all(|value| value.is_finite()) {
            return Err(StoreError::InvalidPosition {
                body_part_id: body_part_id.to_string(),
                position,
            });
        }

        let mut next = self.calibrations.clone();
        next.insert(body_part_id.to_string(), Calibration::stamped_now(position));
        self.replace_calibrations(next)?;

        info!(
            "event=calibration_commit module=calibration status=ok body_part={} calibrated={}",
            body_part_id,
            self.calibrations.len()
        );
        Ok(MutationOutcome::Applied)
    }

    /// Removes the override for `body_part_id`, restoring its default.
    pub fn clear(&mut self, body_part_id: &str) -> StoreResult<MutationOutcome> {
        if self.locked {
            return Ok(skip_locked("calibration_clear", Some(body_part_id)));
        }
        if !self.calibrations.contains_key(body_part_id) {
            return Ok(MutationOutcome::Unchanged);
        }

        let mut next = self.calibrations.clone();
        next.remove(body_part_id);
        self.replace_calibrations(next)?;

        info!(
            "event=calibration_clear module=calibration status=ok body_part={}",
            body_part_id
        );
        Ok(MutationOutcome::Applied)
    }

    /// Removes every override.
    pub fn clear_all(&mut self) -> StoreResult<MutationOutcome> {
        if self.locked {
            return Ok(skip_locked("calibration_clear_all", None));
        }
        if self.calibrations.is_empty() {
            return Ok(MutationOutcome::Unchanged);
        }

        let removed = self.calibrations.len();
        self.replace_calibrations(CalibrationMap::new())?;

        info!(
            "event=calibration_clear_all module=calibration status=ok removed={}",
            removed
        );
        Ok(MutationOutcome::Applied)
    }

    /// Flips the lock flag and returns the new value. Works while locked.
    pub fn toggle_lock(&mut self) -> StoreResult<bool> {
        let next = !self.locked;
        self.set_locked(next)?;
        Ok(next)
    }

    /// Sets the lock flag. Works while locked.
    pub fn set_locked(&mut self, locked: bool) -> StoreResult<()> {
        if self.locked == locked {
            return Ok(());
        }

        let raw = serde_json::to_string(&locked)?;
        self.write(LOCK_STORAGE_KEY, &raw)?;
        self.locked = locked;

        info!(
            "event=calibration_lock module=calibration status=ok locked={}",
            locked
        );
        Ok(())
    }

    fn replace_calibrations(&mut self, next: CalibrationMap) -> StoreResult<()> {
        let raw = serde_json::to_string(&next)?;
        self.write(CALIBRATIONS_STORAGE_KEY, &raw)?;
        self.calibrations = next;
        Ok(())
    }

    fn write(&self, key: &'static str, raw: &str) -> StoreResult<()> {
        self.storage.put(key, raw).map_err(|err| {
            error!(
                "event=calibration_persist module=calibration status=error key={} error={}",
                key, err
            );
            StoreError::Persist { key, source: err }
        })
    }
}

fn skip_locked(event: &str, body_part_id: Option<&str>) -> MutationOutcome {
    debug!(
        "event={} module=calibration status=skip reason=locked body_part={}",
        event,
        body_part_id.unwrap_or("*")
    );
    MutationOutcome::IgnoredLocked
}

fn load_calibrations(storage: &impl KeyValueStore) -> CalibrationMap {
    let raw = match storage.get(CALIBRATIONS_STORAGE_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            info!(
                "event=calibration_load module=calibration status=ok key={} source=default reason=absent",
                CALIBRATIONS_STORAGE_KEY
            );
            return CalibrationMap::new();
        }
        Err(err) => {
            warn!(
                "event=calibration_load module=calibration status=error key={} source=default reason=read_failed error={}",
                CALIBRATIONS_STORAGE_KEY, err
            );
            return CalibrationMap::new();
        }
    };

    match serde_json::from_str::<CalibrationMap>(&raw) {
        Ok(map) => {
            info!(
                "event=calibration_load module=calibration status=ok key={} source=storage count={}",
                CALIBRATIONS_STORAGE_KEY,
                map.len()
            );
            map
        }
        Err(err) => {
            warn!(
                "event=calibration_load module=calibration status=error key={} source=default reason=malformed error={}",
                CALIBRATIONS_STORAGE_KEY, err
            );
            CalibrationMap::new()
        }
    }
}

fn load_lock(storage: &impl KeyValueStore) -> bool {
    match storage.get(LOCK_STORAGE_KEY) {
        Ok(Some(raw)) => match serde_json::from_str::<bool>(&raw) {
            Ok(locked) => locked,
            Err(err) => {
                warn!(
                    "event=calibration_load module=calibration status=error key={} source=default reason=malformed error={}",
                    LOCK_STORAGE_KEY, err
                );
                false
            }
        },
        Ok(None) => false,
        Err(err) => {
            warn!(
                "event=calibration_load module=calibration status=error key={} source=default reason=read_failed error={}",
                LOCK_STORAGE_KEY, err
            );
            false
        }
    }
}
