// src/aggregate.rs
//
// MetricsAggregator: reduces the raw decision log into one fairness /
// calibration row per (session, assistance arm).
//
// Per group:
//   eo_gap = |TPR_A0 - TPR_A1| + |FPR_A0 - FPR_A1|
//   ADI    = max over modalities present of the same gap on the modality slice
//   ECE    = sum over confidence bins of |mean(correct) - mean(conf)| * n_b / n
//
// Grouping is an explicit keyed pass; the output order comes only from the
// final sort (session ascending, then arm label lexicographically).

use std::collections::{BTreeMap, HashMap};

use crate::confusion::rates_by_group;
use crate::logging::{EventSink, NoopSink, SimEvent};
use crate::types::{AssistanceArm, DecisionRecord, Modality, SessionMetricsRecord};

pub const CALIBRATION_BINS: usize = 10;

/// Upper edge of bin `i - 1`, i.e. the i-th of the 11 equally spaced edges on [0, 1].
fn bin_edge(i: usize) -> f64 {
    if i >= CALIBRATION_BINS {
        1.0
    } else {
        i as f64 * (1.0 / CALIBRATION_BINS as f64)
    }
}

/// Right-closed bins over [0, 1]; the first bin also takes 0.0.
/// Values outside [0, 1] (or NaN) fall in no bin.
pub fn calibration_bin(confidence: f64) -> Option<usize> {
    if !(0.0..=1.0).contains(&confidence) {
        return None;
    }
    if confidence == 0.0 {
        return Some(0);
    }
    (1..=CALIBRATION_BINS)
        .find(|&i| confidence <= bin_edge(i))
        .map(|i| i - 1)
}

/// Confidence-binned calibration error of the AI against stored correctness.
pub fn expected_calibration_error(records: &[&DecisionRecord]) -> f64 {
    let n = records.len();
    if n == 0 {
        return 0.0;
    }

    // (count, sum_conf, sum_correct) per bin
    let mut bins = [(0usize, 0.0f64, 0.0f64); CALIBRATION_BINS];
    for r in records {
        if let Some(b) = calibration_bin(r.ai_confidence) {
            let slot = &mut bins[b];
            slot.0 += 1;
            slot.1 += r.ai_confidence;
            slot.2 += f64::from(r.correct);
        }
    }

    bins.iter()
        .filter(|(count, _, _)| *count > 0)
        .map(|&(count, sum_conf, sum_correct)| {
            let k = count as f64;
            let avg_conf = sum_conf / k;
            let avg_acc = sum_correct / k;
            (avg_acc - avg_conf).abs() * k / n as f64
        })
        .sum()
}

/// EO gap between protected groups within a slice.
pub fn eo_gap(records: &[&DecisionRecord]) -> f64 {
    let (m0, m1) = rates_by_group(records);
    m0.eo_gap(&m1)
}

/// Worst-case EO gap over the modalities present in the slice (0.0 when empty).
pub fn access_disparity_index(records: &[&DecisionRecord]) -> f64 {
    let mut by_modality: BTreeMap<Modality, Vec<&DecisionRecord>> = BTreeMap::new();
    for r in records {
        by_modality.entry(r.modality).or_default().push(*r);
    }
    by_modality
        .values()
        .map(|slice| eo_gap(slice))
        .fold(0.0, f64::max)
}

pub fn metrics_for_group(
    session: u32,
    arm: AssistanceArm,
    records: &[&DecisionRecord],
) -> SessionMetricsRecord {
    let (m0, m1) = rates_by_group(records);
    SessionMetricsRecord {
        session,
        assistance_arm: arm,
        acc_a0: m0.acc,
        acc_a1: m1.acc,
        tpr_a0: m0.tpr,
        tpr_a1: m1.tpr,
        fpr_a0: m0.fpr,
        fpr_a1: m1.fpr,
        eo_gap: m0.eo_gap(&m1),
        adi: access_disparity_index(records),
        ece: expected_calibration_error(records),
    }
}

pub fn summarize_sessions(records: &[DecisionRecord]) -> Vec<SessionMetricsRecord> {
    summarize_sessions_with_sink(records, &mut NoopSink)
}

pub fn summarize_sessions_with_sink(
    records: &[DecisionRecord],
    sink: &mut dyn EventSink,
) -> Vec<SessionMetricsRecord> {
    let mut groups: HashMap<(u32, AssistanceArm), Vec<&DecisionRecord>> = HashMap::new();
    for r in records {
        groups
            .entry((r.session, r.assistance_arm))
            .or_default()
            .push(r);
    }

    let mut keyed: Vec<((u32, AssistanceArm), Vec<&DecisionRecord>)> = groups.into_iter().collect();
    keyed.sort_by(|(a, _), (b, _)| a.0.cmp(&b.0).then_with(|| a.1.as_str().cmp(b.1.as_str())));

    keyed
        .into_iter()
        .map(|((session, arm), slice)| {
            let row = metrics_for_group(session, arm, &slice);
            sink.log_event(&SimEvent::GroupAggregated {
                session,
                arm,
                n_records: slice.len(),
                eo_gap: row.eo_gap,
                adi: row.adi,
                ece: row.ece,
            });
            row
        })
        .collect()
}
