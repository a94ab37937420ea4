use zeus_core::visibility::status_passes;
use zeus_core::{
    is_facing_camera, resolve_hotspots, visible_hotspots, CalibrationStore, IssueLink,
    IssueStatus, MemoryKeyValueStore, Position, StatusFilter, VisibilityConfig,
};

fn sample_issues() -> Vec<IssueLink> {
    vec![
        IssueLink::new("leg-injury", IssueStatus::Active, Some("back-right-leg")),
        IssueLink::new("eye-ulcer", IssueStatus::Monitoring, Some("left-eye")),
        IssueLink::new("ear-infection", IssueStatus::Resolved, Some("left-ear")),
        IssueLink::new("skin-allergy", IssueStatus::Active, None),
    ]
}

fn hotspot_ids(filter: StatusFilter) -> Vec<String> {
    let store = CalibrationStore::load(MemoryKeyValueStore::new());
    resolve_hotspots(&sample_issues(), &store, filter)
        .into_iter()
        .map(|hotspot| hotspot.issue_id)
        .collect()
}

#[test]
fn occlusion_gate_reference_cases() {
    let config = VisibilityConfig::default();
    let camera = Position::new(0.0, 0.0, 3.0);

    assert!(is_facing_camera(Position::new(0.0, 0.0, 1.0), camera, &config));
    assert!(!is_facing_camera(Position::new(0.0, 0.0, -1.0), camera, &config));
    assert!(is_facing_camera(Position::new(1.0, 0.0, 0.0), camera, &config));
}

#[test]
fn monitoring_issue_visibility_per_filter() {
    assert!(!status_passes(StatusFilter::ActiveOnly, IssueStatus::Monitoring));
    assert!(status_passes(
        StatusFilter::ActiveAndMonitoring,
        IssueStatus::Monitoring
    ));
    assert!(status_passes(StatusFilter::ShowAll, IssueStatus::Monitoring));
}

#[test]
fn resolve_hotspots_applies_status_gate_and_drops_systemic_issues() {
    assert_eq!(hotspot_ids(StatusFilter::ActiveOnly), vec!["leg-injury"]);
    assert_eq!(
        hotspot_ids(StatusFilter::ActiveAndMonitoring),
        vec!["leg-injury", "eye-ulcer"]
    );
    assert_eq!(
        hotspot_ids(StatusFilter::ShowAll),
        vec!["leg-injury", "eye-ulcer", "ear-infection"]
    );
}

#[test]
fn resolved_hotspots_follow_calibrations_without_caching() {
    let mut store = CalibrationStore::load(MemoryKeyValueStore::new());
    let issues = sample_issues();

    let before = resolve_hotspots(&issues, &store, StatusFilter::ActiveOnly);
    assert_eq!(before[0].position, store.effective_position("back-right-leg"));
    assert_eq!(before[0].color, "#ef4444");

    let moved = Position::new(-0.3, -0.4, -0.3);
    store.commit("back-right-leg", moved).unwrap();
    let after = resolve_hotspots(&issues, &store, StatusFilter::ActiveOnly);
    assert_eq!(after[0].position, moved);
}

#[test]
fn visible_hotspots_changes_with_camera_orbit() {
    let store = CalibrationStore::load(MemoryKeyValueStore::new());
    let issues = vec![
        IssueLink::new("nose-scrape", IssueStatus::Active, Some("nose")),
        IssueLink::new("tail-cyst", IssueStatus::Active, Some("tail")),
    ];
    let hotspots = resolve_hotspots(&issues, &store, StatusFilter::ShowAll);
    let config = VisibilityConfig::default();

    let front: Vec<&str> = visible_hotspots(&hotspots, Position::new(0.0, 0.0, 3.0), &config)
        .into_iter()
        .map(|hotspot| hotspot.issue_id.as_str())
        .collect();
    assert_eq!(front, vec!["nose-scrape"]);

    let behind: Vec<&str> = visible_hotspots(&hotspots, Position::new(0.0, 0.0, -3.0), &config)
        .into_iter()
        .map(|hotspot| hotspot.issue_id.as_str())
        .collect();
    assert_eq!(behind, vec!["tail-cyst"]);
}

#[test]
fn threshold_override_changes_margin() {
    let camera = Position::new(0.0, 0.0, 3.0);
    let side = Position::new(1.0, 0.0, 0.0);
    let strict = VisibilityConfig {
        occlusion_threshold: 0.1,
        ..VisibilityConfig::default()
    };

    assert!(is_facing_camera(side, camera, &VisibilityConfig::default()));
    assert!(!is_facing_camera(side, camera, &strict));
}
