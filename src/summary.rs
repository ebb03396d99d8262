// src/summary.rs
//
// Secondary reductions over the session-metrics table.
// - summary_metrics_by_arm: mean eo_gap / ADI / ECE per assistance arm.
// - sdi_proxy: mean session-over-session change of unaided accuracy, using
//   the `None` arm as the unaided baseline.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::{AssistanceArm, SessionMetricsRecord};

/// Running mean over finite samples. Non-finite samples are ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunningMean {
    n: u64,
    mean: f64,
}

impl RunningMean {
    pub fn add(&mut self, x: f64) {
        if !x.is_finite() {
            return;
        }
        self.n += 1;
        self.mean += (x - self.mean) / (self.n as f64);
    }

    pub fn n(&self) -> u64 {
        self.n
    }

    pub fn mean(&self) -> f64 {
        if self.n == 0 {
            0.0
        } else {
            self.mean
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArmSummary {
    pub assistance_arm: AssistanceArm,
    pub n_sessions: u64,
    pub eo_gap: f64,
    #[serde(rename = "ADI")]
    pub adi: f64,
    #[serde(rename = "ECE")]
    pub ece: f64,
}

impl ArmSummary {
    pub const COLUMNS: [&'static str; 5] = ["assistance_arm", "n_sessions", "eo_gap", "ADI", "ECE"];
}

#[derive(Default)]
struct ArmAccumulator {
    eo_gap: RunningMean,
    adi: RunningMean,
    ece: RunningMean,
}

/// One row per arm seen in `rows`, sorted by arm label.
pub fn summary_metrics_by_arm(rows: &[SessionMetricsRecord]) -> Vec<ArmSummary> {
    let mut acc: HashMap<AssistanceArm, ArmAccumulator> = HashMap::new();
    for row in rows {
        let a = acc.entry(row.assistance_arm).or_default();
        a.eo_gap.add(row.eo_gap);
        a.adi.add(row.adi);
        a.ece.add(row.ece);
    }

    let mut out: Vec<ArmSummary> = acc
        .into_iter()
        .map(|(arm, a)| ArmSummary {
            assistance_arm: arm,
            n_sessions: a.eo_gap.n(),
            eo_gap: a.eo_gap.mean(),
            adi: a.adi.mean(),
            ece: a.ece.mean(),
        })
        .collect();
    out.sort_by(|a, b| a.assistance_arm.as_str().cmp(b.assistance_arm.as_str()));
    out
}

/// Skill-drift proxy.
///
/// U_t = (acc_A0 + acc_A1) / 2 on the `None` rows ordered by session; the proxy
/// is the mean of U_t - U_{t-1}. Returns `None` with fewer than two such rows.
pub fn sdi_proxy(rows: &[SessionMetricsRecord]) -> Option<f64> {
    let mut unaided: Vec<(u32, f64)> = rows
        .iter()
        .filter(|r| r.assistance_arm == AssistanceArm::None)
        .map(|r| (r.session, 0.5 * (r.acc_a0 + r.acc_a1)))
        .collect();
    if unaided.len() < 2 {
        return None;
    }
    unaided.sort_by_key(|(session, _)| *session);

    let mut deltas = RunningMean::default();
    for pair in unaided.windows(2) {
        deltas.add(pair[1].1 - pair[0].1);
    }
    Some(deltas.mean())
}
