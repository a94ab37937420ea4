//! Interactive calibration editing session.
//!
//! # Responsibility
//! - Track which body part is being edited and its uncommitted preview.
//! - Route save/clear intents to the calibration store.
//! - Gate part selection behind an explicit unlock confirmation while locked.
//!
//! # Invariants
//! - Preview edits never touch the store; only `save` and the clear intents do.
//! - Selecting a part starts the preview from its current effective position.
//! - Closing discards all session state without side effects.
//! - The store is passed in per call; the workflow never owns it.

use crate::catalog;
use crate::config::AxisRange;
use crate::model::position::{Axis, Position};
use crate::repo::kv_repo::KeyValueStore;
use crate::service::calibration_store::{CalibrationStore, MutationOutcome, StoreError};
use log::{debug, info};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type WorkflowResult<T> = Result<T, WorkflowError>;

/// Intent rejected by the current workflow state, or a store failure.
#[derive(Debug)]
pub enum WorkflowError {
    NotOpen,
    NoSelection,
    UnknownBodyPart(String),
    NoPendingUnlock,
    NonFiniteValue(Axis),
    Store(StoreError),
}

impl Display for WorkflowError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotOpen => write!(f, "calibration mode is not open"),
            Self::NoSelection => write!(f, "no body part is selected"),
            Self::UnknownBodyPart(id) => write!(f, "unknown body part: {id}"),
            Self::NoPendingUnlock => write!(f, "no unlock confirmation is pending"),
            Self::NonFiniteValue(axis) => write!(f, "slider value for {axis:?} is not finite"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for WorkflowError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for WorkflowError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Part under edit and its live, uncommitted coordinate.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationSession {
    pub body_part_id: String,
    pub preview_position: Position,
}

/// Workflow state machine.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum WorkflowState {
    #[default]
    Closed,
    NoSelection,
    Editing(CalibrationSession),
    /// Awaiting unlock confirmation; `resume` is restored on cancel.
    LockedBlocked { resume: Box<WorkflowState> },
}

/// Flat state tag for UI and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowPhase {
    Closed,
    NoSelection,
    Editing,
    LockedBlocked,
}

impl WorkflowPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::NoSelection => "no_selection",
            Self::Editing => "editing",
            Self::LockedBlocked => "locked_blocked",
        }
    }
}

impl WorkflowState {
    pub fn phase(&self) -> WorkflowPhase {
        match self {
            Self::Closed => WorkflowPhase::Closed,
            Self::NoSelection => WorkflowPhase::NoSelection,
            Self::Editing(_) => WorkflowPhase::Editing,
            Self::LockedBlocked { .. } => WorkflowPhase::LockedBlocked,
        }
    }
}

/// Serializable view of the session for the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowSnapshot {
    pub phase: WorkflowPhase,
    pub selected_body_part_id: Option<String>,
    pub preview_position: Option<Position>,
}

/// Calibration editing controller.
#[derive(Debug, Clone, Default)]
pub struct CalibrationWorkflow {
    state: WorkflowState,
    axis_range: AxisRange,
}

impl CalibrationWorkflow {
    pub fn new(axis_range: AxisRange) -> Self {
        Self {
            state: WorkflowState::Closed,
            axis_range,
        }
    }

    pub fn axis_range(&self) -> AxisRange {
        self.axis_range
    }

    /// Replaces the slider range for later edits; the current session is kept.
    pub fn set_axis_range(&mut self, axis_range: AxisRange) {
        self.axis_range = axis_range;
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    pub fn phase(&self) -> WorkflowPhase {
        self.state.phase()
    }

    pub fn is_open(&self) -> bool {
        self.phase() != WorkflowPhase::Closed
    }

    pub fn selected_body_part(&self) -> Option<&str> {
        self.session().map(|session| session.body_part_id.as_str())
    }

    pub fn preview_position(&self) -> Option<Position> {
        self.session().map(|session| session.preview_position)
    }

    pub fn snapshot(&self) -> WorkflowSnapshot {
        WorkflowSnapshot {
            phase: self.phase(),
            selected_body_part_id: self.selected_body_part().map(str::to_string),
            preview_position: self.preview_position(),
        }
    }

    /// Enters calibration mode with nothing selected. No-op when already open.
    pub fn open(&mut self) -> WorkflowPhase {
        if !self.is_open() {
            self.transition(WorkflowState::NoSelection);
        }
        self.phase()
    }

    /// Leaves calibration mode from any open state, discarding the session.
    pub fn close(&mut self) {
        if self.is_open() {
            self.transition(WorkflowState::Closed);
        }
    }

    /// Selects `body_part_id` for editing.
    ///
    /// While the store is locked this enters `LockedBlocked` instead and the
    /// selection is dropped.
    pub fn select<S: KeyValueStore>(
        &mut self,
        store: &CalibrationStore<S>,
        body_part_id: &str,
    ) -> WorkflowResult<WorkflowPhase> {
        match self.state {
            WorkflowState::Closed => return Err(WorkflowError::NotOpen),
            WorkflowState::LockedBlocked { .. } => return Ok(self.phase()),
            _ => {}
        }

        if store.is_locked() {
            self.block_for_unlock();
            return Ok(self.phase());
        }

        let part = catalog::by_id(body_part_id)
            .ok_or_else(|| WorkflowError::UnknownBodyPart(body_part_id.to_string()))?;

        self.transition(WorkflowState::Editing(CalibrationSession {
            body_part_id: part.id.to_string(),
            preview_position: store.effective_position(part.id),
        }));
        Ok(self.phase())
    }

    /// Drops the current selection and its preview.
    pub fn deselect(&mut self) -> WorkflowResult<WorkflowPhase> {
        match self.state {
            WorkflowState::Closed => Err(WorkflowError::NotOpen),
            WorkflowState::Editing(_) => {
                self.transition(WorkflowState::NoSelection);
                Ok(self.phase())
            }
            _ => Ok(self.phase()),
        }
    }

    /// Moves one preview axis, clamped to the configured range.
    ///
    /// Returns `IgnoredLocked` without touching the preview while locked.
    pub fn set_axis<S: KeyValueStore>(
        &mut self,
        store: &CalibrationStore<S>,
        axis: Axis,
        value: f64,
    ) -> WorkflowResult<MutationOutcome> {
        if !value.is_finite() {
            return Err(WorkflowError::NonFiniteValue(axis));
        }
        let clamped = self.axis_range.clamp(value);
        self.edit_preview(store, |preview| preview.with_axis(axis, clamped))
    }

    /// Resets the preview to the part's catalog default. Does not write the store.
    pub fn reset_to_default<S: KeyValueStore>(
        &mut self,
        store: &CalibrationStore<S>,
    ) -> WorkflowResult<MutationOutcome> {
        let default = {
            let session = self.session_or_err()?;
            store.defaults().get_or_origin(&session.body_part_id)
        };
        self.edit_preview(store, |_| default)
    }

    /// Commits the preview position for the selected part.
    pub fn save<S: KeyValueStore>(
        &mut self,
        store: &mut CalibrationStore<S>,
    ) -> WorkflowResult<MutationOutcome> {
        let session = self.session_or_err()?;
        let outcome = store.commit(&session.body_part_id, session.preview_position)?;
        Ok(outcome)
    }

    /// Removes the selected part's override and re-seeds the preview from
    /// the restored default.
    pub fn clear_selected<S: KeyValueStore>(
        &mut self,
        store: &mut CalibrationStore<S>,
    ) -> WorkflowResult<MutationOutcome> {
        let body_part_id = self.session_or_err()?.body_part_id.clone();
        let outcome = store.clear(&body_part_id)?;
        if outcome.is_applied() {
            self.refresh_preview(store);
        }
        Ok(outcome)
    }

    /// Removes every override.
    pub fn clear_all<S: KeyValueStore>(
        &mut self,
        store: &mut CalibrationStore<S>,
    ) -> WorkflowResult<MutationOutcome> {
        if !self.is_open() {
            return Err(WorkflowError::NotOpen);
        }
        let outcome = store.clear_all()?;
        if outcome.is_applied() {
            self.refresh_preview(store);
        }
        Ok(outcome)
    }

    /// Lock toggle intent: locks immediately, but unlocking needs confirmation.
    pub fn toggle_lock<S: KeyValueStore>(
        &mut self,
        store: &mut CalibrationStore<S>,
    ) -> WorkflowResult<WorkflowPhase> {
        if !self.is_open() {
            return Err(WorkflowError::NotOpen);
        }
        if store.is_locked() {
            self.block_for_unlock();
        } else {
            store.set_locked(true)?;
        }
        Ok(self.phase())
    }

    /// Confirms a pending unlock, leaving the workflow with nothing selected.
    ///
    /// The state is unchanged when the lock write fails.
    pub fn confirm_unlock<S: KeyValueStore>(
        &mut self,
        store: &mut CalibrationStore<S>,
    ) -> WorkflowResult<WorkflowPhase> {
        if !matches!(self.state, WorkflowState::LockedBlocked { .. }) {
            return Err(WorkflowError::NoPendingUnlock);
        }
        store.set_locked(false)?;
        self.transition(WorkflowState::NoSelection);
        Ok(self.phase())
    }

    /// Abandons a pending unlock and returns to the state it interrupted.
    pub fn cancel_unlock(&mut self) -> WorkflowResult<WorkflowPhase> {
        let WorkflowState::LockedBlocked { resume } = &self.state else {
            return Err(WorkflowError::NoPendingUnlock);
        };
        let resume = (**resume).clone();
        self.transition(resume);
        Ok(self.phase())
    }

    fn session(&self) -> Option<&CalibrationSession> {
        match &self.state {
            WorkflowState::Editing(session) => Some(session),
            _ => None,
        }
    }

    fn session_or_err(&self) -> WorkflowResult<&CalibrationSession> {
        match &self.state {
            WorkflowState::Closed => Err(WorkflowError::NotOpen),
            WorkflowState::Editing(session) => Ok(session),
            _ => Err(WorkflowError::NoSelection),
        }
    }

    fn edit_preview<S: KeyValueStore>(
        &mut self,
        store: &CalibrationStore<S>,
        edit: impl FnOnce(Position) -> Position,
    ) -> WorkflowResult<MutationOutcome> {
        self.session_or_err()?;
        if store.is_locked() {
            debug!("event=workflow_preview module=workflow status=skip reason=locked");
            return Ok(MutationOutcome::IgnoredLocked);
        }
        match &mut self.state {
            WorkflowState::Editing(session) => {
                session.preview_position = edit(session.preview_position);
                Ok(MutationOutcome::Applied)
            }
            _ => Err(WorkflowError::NoSelection),
        }
    }

    fn refresh_preview<S: KeyValueStore>(&mut self, store: &CalibrationStore<S>) {
        if let WorkflowState::Editing(session) = &mut self.state {
            session.preview_position = store.effective_position(&session.body_part_id);
        }
    }

    fn block_for_unlock(&mut self) {
        if matches!(self.state, WorkflowState::LockedBlocked { .. }) {
            return;
        }
        let resume = Box::new(self.state.clone());
        self.transition(WorkflowState::LockedBlocked { resume });
    }

    fn transition(&mut self, next: WorkflowState) {
        let from = self.phase();
        self.state = next;
        info!(
            "event=workflow_transition module=workflow status=ok from={} to={}",
            from.as_str(),
            self.phase().as_str()
        );
    }
}
