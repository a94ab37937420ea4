//! Hotspot visibility resolution.
//!
//! # Responsibility
//! - Decide which issues are eligible to render under the status filter.
//! - Resolve each eligible issue to a coloured marker at its effective position.
//! - Decide per frame which resolved markers face the camera.
//!
//! # Invariants
//! - Both gates must pass for a marker to render.
//! - Issues without a body-part reference never produce a marker.
//! - Positions are read from the store at resolution time, never cached.

pub mod occlusion;

use crate::config::VisibilityConfig;
use crate::model::issue::{IssueLink, IssueStatus, StatusFilter};
use crate::model::position::Position;
use crate::repo::kv_repo::KeyValueStore;
use crate::service::calibration_store::CalibrationStore;
use serde::Serialize;

pub use occlusion::{facing_cosine, is_facing_camera};

/// One marker ready for the renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Hotspot {
    pub issue_id: String,
    pub body_part_id: String,
    pub status: IssueStatus,
    pub position: Position,
    pub color: &'static str,
}

/// Business-rule gate: does `status` show under `filter`?
pub fn status_passes(filter: StatusFilter, status: IssueStatus) -> bool {
    match filter {
        StatusFilter::ActiveOnly => status == IssueStatus::Active,
        StatusFilter::ActiveAndMonitoring => {
            matches!(status, IssueStatus::Active | IssueStatus::Monitoring)
        }
        StatusFilter::ShowAll => true,
    }
}

/// Status gate for one issue, including the body-part requirement.
pub fn is_issue_eligible(filter: StatusFilter, issue: &IssueLink) -> bool {
    issue.body_part().is_some() && status_passes(filter, issue.status)
}

/// Applies the status gate and resolves surviving issues to markers.
///
/// Output keeps input order.
pub fn resolve_hotspots<S: KeyValueStore>(
    issues: &[IssueLink],
    store: &CalibrationStore<S>,
    filter: StatusFilter,
) -> Vec<Hotspot> {
    issues
        .iter()
        .filter(|issue| status_passes(filter, issue.status))
        .filter_map(|issue| {
            let body_part_id = issue.body_part()?;
            Some(Hotspot {
                issue_id: issue.issue_id.clone(),
                body_part_id: body_part_id.to_string(),
                status: issue.status,
                position: store.effective_position(body_part_id),
                color: issue.status.color_hex(),
            })
        })
        .collect()
}

/// Applies the occlusion gate for one frame.
pub fn visible_hotspots<'a>(
    hotspots: &'a [Hotspot],
    camera: Position,
    config: &VisibilityConfig,
) -> Vec<&'a Hotspot> {
    hotspots
        .iter()
        .filter(|hotspot| is_facing_camera(hotspot.position, camera, config))
        .collect()
}
