//! Medical-issue link and status filter models.
//!
//! # Responsibility
//! - Carry the subset of an external medical issue that hotspot rendering needs.
//! - Define the status filter modes offered by the viewer.
//!
//! # Invariants
//! - `body_part_id` is a lookup key only; issues without one are systemic and
//!   never rendered as a 3D marker.

use serde::{Deserialize, Serialize};

/// Lifecycle status of a medical issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueStatus {
    Active,
    Monitoring,
    Resolved,
}

impl IssueStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Monitoring => "monitoring",
            Self::Resolved => "resolved",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "active" => Some(Self::Active),
            "monitoring" => Some(Self::Monitoring),
            "resolved" => Some(Self::Resolved),
            _ => None,
        }
    }

    /// Marker colour as a CSS hex string.
    pub fn color_hex(self) -> &'static str {
        match self {
            Self::Active => "#ef4444",
            Self::Monitoring => "#eab308",
            Self::Resolved => "#22c55e",
        }
    }
}

/// Viewer-wide status filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum StatusFilter {
    #[default]
    #[serde(rename = "active")]
    ActiveOnly,
    #[serde(rename = "active+monitoring")]
    ActiveAndMonitoring,
    #[serde(rename = "all")]
    ShowAll,
}

const LEGEND_ACTIVE_ONLY: &[IssueStatus] = &[IssueStatus::Active];
const LEGEND_ACTIVE_AND_MONITORING: &[IssueStatus] =
    &[IssueStatus::Active, IssueStatus::Monitoring];
const LEGEND_SHOW_ALL: &[IssueStatus] = &[
    IssueStatus::Active,
    IssueStatus::Monitoring,
    IssueStatus::Resolved,
];

impl StatusFilter {
    /// Stable wire id (`active|active+monitoring|all`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ActiveOnly => "active",
            Self::ActiveAndMonitoring => "active+monitoring",
            Self::ShowAll => "all",
        }
    }

    /// Parses a wire id; unknown values fall back to `ActiveOnly`.
    pub fn parse_or_default(value: &str) -> Self {
        match value.trim() {
            "active+monitoring" => Self::ActiveAndMonitoring,
            "all" => Self::ShowAll,
            _ => Self::ActiveOnly,
        }
    }

    /// Statuses that can appear on screen under this filter, in legend order.
    pub fn legend(self) -> &'static [IssueStatus] {
        match self {
            Self::ActiveOnly => LEGEND_ACTIVE_ONLY,
            Self::ActiveAndMonitoring => LEGEND_ACTIVE_AND_MONITORING,
            Self::ShowAll => LEGEND_SHOW_ALL,
        }
    }
}

/// Hotspot-relevant projection of one medical issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueLink {
    pub issue_id: String,
    pub status: IssueStatus,
    #[serde(default)]
    pub body_part_id: Option<String>,
}

impl IssueLink {
    pub fn new(
        issue_id: impl Into<String>,
        status: IssueStatus,
        body_part_id: Option<&str>,
    ) -> Self {
        Self {
            issue_id: issue_id.into(),
            status,
            body_part_id: body_part_id.map(str::to_string),
        }
    }

    /// Returns the linked body part, ignoring blank references.
    pub fn body_part(&self) -> Option<&str> {
        self.body_part_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::{IssueLink, IssueStatus, StatusFilter};

    #[test]
    fn filter_wire_ids_round_trip() {
        for filter in [
            StatusFilter::ActiveOnly,
            StatusFilter::ActiveAndMonitoring,
            StatusFilter::ShowAll,
        ] {
            assert_eq!(StatusFilter::parse_or_default(filter.as_str()), filter);
        }
        assert_eq!(
            StatusFilter::parse_or_default("bogus"),
            StatusFilter::ActiveOnly
        );
    }

    #[test]
    fn legend_grows_with_filter_breadth() {
        assert_eq!(StatusFilter::ActiveOnly.legend(), &[IssueStatus::Active]);
        assert_eq!(StatusFilter::ActiveAndMonitoring.legend().len(), 2);
        assert_eq!(
            StatusFilter::ShowAll.legend().last(),
            Some(&IssueStatus::Resolved)
        );
    }

    #[test]
    fn blank_body_part_reference_counts_as_absent() {
        let issue = IssueLink::new("allergy", IssueStatus::Active, Some("  "));
        assert_eq!(issue.body_part(), None);
    }

    #[test]
    fn deserializes_issue_without_body_part() {
        let issue: IssueLink =
            serde_json::from_str(r#"{"issueId":"skin-allergy","status":"monitoring"}"#)
                .expect("deserialize");
        assert_eq!(issue.status, IssueStatus::Monitoring);
        assert!(issue.body_part_id.is_none());
    }
}
