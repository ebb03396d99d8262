// tests/metrics_tests.rs
//
// ConfusionReducer and MetricsAggregator behavior on hand-built tables.

use decision_sim::{
    group_rates, summarize_sessions, AssistanceArm, DecisionRecord, Modality, EPS,
};

fn rec(
    session: u32,
    arm: AssistanceArm,
    group: u8,
    modality: Modality,
    y_true: u8,
    decision: u8,
    conf: f64,
) -> DecisionRecord {
    DecisionRecord {
        worker_id: 1 + u32::from(group),
        team_id: 1,
        session,
        item_id: format!("s{session}_i0"),
        group,
        modality,
        assistance_arm: arm,
        difficulty: 0.3,
        y_true,
        ai_confidence: conf,
        ai_suggestion: u8::from(conf >= 0.5),
        human_decision: decision,
        overridden: 0,
        correct: u8::from(decision == y_true),
    }
}

#[test]
fn reducer_matches_known_counts() {
    // 2 TP, 1 FP, 1 TN, 0 FN
    let rows = [
        rec(1, AssistanceArm::None, 0, Modality::HindiText, 1, 1, 0.7),
        rec(1, AssistanceArm::None, 0, Modality::HindiText, 1, 1, 0.7),
        rec(1, AssistanceArm::None, 0, Modality::HindiText, 0, 1, 0.7),
        rec(1, AssistanceArm::None, 0, Modality::HindiText, 0, 0, 0.3),
    ];
    let m = group_rates(rows.iter());
    assert!((m.tpr - 1.0).abs() < EPS);
    assert!((m.fpr - 0.5).abs() < EPS);
    assert!((m.acc - 0.75).abs() < EPS);
}

#[test]
fn reducer_on_empty_slice_is_zero() {
    let m = group_rates(std::iter::empty::<&DecisionRecord>());
    assert_eq!(m.acc, 0.0);
    assert_eq!(m.tpr, 0.0);
    assert_eq!(m.fpr, 0.0);
}

fn two_by_two_table() -> Vec<DecisionRecord> {
    let mut rows = Vec::new();
    // Insert sessions/arms out of order to make sure the output sort does the work.
    for (session, arm) in [
        (2, AssistanceArm::Rationale),
        (1, AssistanceArm::Rationale),
        (2, AssistanceArm::Calib),
        (1, AssistanceArm::Calib),
    ] {
        for i in 0..10u8 {
            let group = i % 2;
            let y = u8::from(i % 3 == 0);
            let decision = if i % 4 == 0 { 1 - y } else { y };
            let modality = if i < 5 {
                Modality::Feature2G
            } else {
                Modality::Smartphone3G
            };
            rows.push(rec(
                session,
                arm,
                group,
                modality,
                y,
                decision,
                0.05 + 0.09 * f64::from(i),
            ));
        }
    }
    rows
}

#[test]
fn groups_by_session_and_arm_sorted() {
    let out = summarize_sessions(&two_by_two_table());
    let keys: Vec<(u32, &str)> = out
        .iter()
        .map(|r| (r.session, r.assistance_arm.as_str()))
        .collect();
    assert_eq!(
        keys,
        vec![
            (1, "Calib"),
            (1, "Rationale"),
            (2, "Calib"),
            (2, "Rationale"),
        ]
    );
}

#[test]
fn identical_groups_produce_identical_metrics() {
    let out = summarize_sessions(&two_by_two_table());
    for row in &out[1..] {
        assert!((row.eo_gap - out[0].eo_gap).abs() < 1e-12);
        assert!((row.adi - out[0].adi).abs() < 1e-12);
        assert!((row.ece - out[0].ece).abs() < 1e-12);
    }
}

#[test]
fn eo_gap_follows_group_rates() {
    let out = summarize_sessions(&two_by_two_table());
    for row in &out {
        let expected = (row.tpr_a0 - row.tpr_a1).abs() + (row.fpr_a0 - row.fpr_a1).abs();
        assert!((row.eo_gap - expected).abs() < 1e-12);
        assert!(row.adi >= 0.0 && row.adi.is_finite());
        assert!((0.0..=1.0).contains(&row.ece));
    }
}

#[test]
fn input_order_does_not_change_values() {
    let table = two_by_two_table();
    let mut reversed = table.clone();
    reversed.reverse();
    let a = summarize_sessions(&table);
    let b = summarize_sessions(&reversed);
    assert_eq!(a.len(), b.len());
    for (x, y) in a.iter().zip(&b) {
        assert_eq!((x.session, x.assistance_arm), (y.session, y.assistance_arm));
        assert!((x.eo_gap - y.eo_gap).abs() < 1e-12);
        assert!((x.adi - y.adi).abs() < 1e-12);
        assert!((x.ece - y.ece).abs() < 1e-12);
    }
}

#[test]
fn single_group_slice_has_one_sided_gap() {
    // Only A=0 present: A=1 rates collapse to zero and the gap equals A=0's TPR+FPR.
    let rows = vec![
        rec(1, AssistanceArm::Counter, 0, Modality::KannadaVoice, 1, 1, 0.9),
        rec(1, AssistanceArm::Counter, 0, Modality::KannadaVoice, 0, 1, 0.9),
    ];
    let out = summarize_sessions(&rows);
    assert_eq!(out.len(), 1);
    let row = &out[0];
    assert_eq!(row.acc_a1, 0.0);
    assert!((row.eo_gap - (row.tpr_a0 + row.fpr_a0)).abs() < 1e-12);
    assert!((row.eo_gap - 2.0).abs() < 1e-6);
    assert!((row.adi - row.eo_gap).abs() < 1e-12);
}
