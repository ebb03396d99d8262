// tests/end_to_end_tests.rs
//
// Full pipeline: config -> generator -> aggregator -> CSV bundle on disk.

use decision_sim::output::{DECISIONS_REL_PATH, SESSION_METRICS_REL_PATH};
use decision_sim::table::read_session_metrics_file;
use decision_sim::{
    generate_decision_log, read_decisions_file, summarize_sessions, write_run_outputs, SimConfig,
    SimError,
};

#[test]
fn small_study_produces_expected_shapes() {
    let cfg = SimConfig::new(4, 2, 2, 5, 42);
    let decisions = generate_decision_log(cfg).unwrap();
    assert_eq!(decisions.len(), 40);

    let metrics = summarize_sessions(&decisions);
    assert!(!metrics.is_empty());
    assert!(metrics.len() <= 8);
    for row in &metrics {
        assert!((1..=2).contains(&row.session));
        assert!((0.0..=1.0).contains(&row.ece), "ECE out of range: {row:?}");
        assert!(row.adi >= 0.0);
        assert!(row.eo_gap >= 0.0);
    }

    let keys: Vec<(u32, String)> = metrics
        .iter()
        .map(|r| (r.session, r.assistance_arm.to_string()))
        .collect();
    let mut sorted = keys.clone();
    sorted.sort();
    assert_eq!(keys, sorted);
}

#[test]
fn bundle_round_trips_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = SimConfig::new(6, 2, 3, 8, 9);
    let decisions = generate_decision_log(cfg).unwrap();
    let metrics = summarize_sessions(&decisions);

    let (summary, _) = write_run_outputs(dir.path(), Some(cfg), &decisions, &metrics).unwrap();
    assert_eq!(summary.n_records, 6 * 3 * 8);

    let loaded = read_decisions_file(&dir.path().join(DECISIONS_REL_PATH)).unwrap();
    assert_eq!(loaded, decisions);

    // Re-aggregating the persisted log reproduces the persisted metrics.
    let reloaded_metrics = read_session_metrics_file(&dir.path().join(SESSION_METRICS_REL_PATH))
        .unwrap();
    assert_eq!(summarize_sessions(&loaded), reloaded_metrics);
}

#[test]
fn reruns_report_the_same_checksum() {
    let cfg = SimConfig::new(5, 2, 2, 6, 123);
    let d1 = generate_decision_log(cfg).unwrap();
    let d2 = generate_decision_log(cfg).unwrap();

    let dir1 = tempfile::tempdir().unwrap();
    let dir2 = tempfile::tempdir().unwrap();
    let (s1, _) = write_run_outputs(dir1.path(), Some(cfg), &d1, &summarize_sessions(&d1)).unwrap();
    let (s2, _) = write_run_outputs(dir2.path(), Some(cfg), &d2, &summarize_sessions(&d2)).unwrap();
    assert_eq!(s1.decisions_sha256, s2.decisions_sha256);

    let raw1 = std::fs::read(dir1.path().join(DECISIONS_REL_PATH)).unwrap();
    let raw2 = std::fs::read(dir2.path().join(DECISIONS_REL_PATH)).unwrap();
    assert_eq!(raw1, raw2);
}

#[test]
fn invalid_configuration_surfaces_before_generation() {
    for cfg in [
        SimConfig::new(0, 2, 2, 5, 1),
        SimConfig::new(4, 2, 0, 5, 1),
        SimConfig::new(4, 2, 2, 0, 1),
    ] {
        match generate_decision_log(cfg) {
            Err(SimError::InvalidConfiguration { .. }) => {}
            other => panic!("expected InvalidConfiguration for {cfg:?}, got {other:?}"),
        }
    }
}

#[test]
fn empty_table_aggregates_to_nothing() {
    assert!(summarize_sessions(&[]).is_empty());
}

#[test]
fn tampered_decision_log_is_refused_on_reload() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = SimConfig::new(3, 1, 1, 4, 5);
    let decisions = generate_decision_log(cfg).unwrap();
    write_run_outputs(dir.path(), Some(cfg), &decisions, &summarize_sessions(&decisions)).unwrap();

    // Flip the trailing `correct` flag of the first data row.
    let path = dir.path().join(DECISIONS_REL_PATH);
    let text = std::fs::read_to_string(&path).unwrap();
    let mut lines: Vec<String> = text.lines().map(str::to_string).collect();
    let row = lines[1].clone();
    let (head, last) = row.rsplit_once(',').unwrap();
    let flipped = if last == "1" { "0" } else { "1" };
    lines[1] = format!("{head},{flipped}");
    std::fs::write(&path, lines.join("\n") + "\n").unwrap();

    match read_decisions_file(&path) {
        Err(SimError::Parse { line, .. }) => assert_eq!(line, 2),
        other => panic!("expected parse error, got {other:?}"),
    }
}
