// src/confusion.rs
//
// ConfusionReducer: TPR / FPR / accuracy over a slice of decision records.
// Positive class is y_true = 1; the prediction is the human decision.
//
// Ratios are smoothed with EPS in the denominator so empty or one-sided
// slices produce zeros instead of NaN.

use crate::types::DecisionRecord;

pub const EPS: f64 = 1e-9;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfusionCounts {
    pub tp: u64,
    pub fp: u64,
    pub tn: u64,
    pub fn_: u64,
}

impl ConfusionCounts {
    pub fn add(&mut self, y_true: u8, predicted: u8) {
        match (y_true == 1, predicted == 1) {
            (true, true) => self.tp += 1,
            (false, true) => self.fp += 1,
            (false, false) => self.tn += 1,
            (true, false) => self.fn_ += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.tp + self.fp + self.tn + self.fn_
    }

    pub fn rates(&self) -> GroupRates {
        let (tp, fp, tn, fn_) = (
            self.tp as f64,
            self.fp as f64,
            self.tn as f64,
            self.fn_ as f64,
        );
        GroupRates {
            acc: (tp + tn) / (tp + tn + fp + fn_ + EPS),
            tpr: tp / (tp + fn_ + EPS),
            fpr: fp / (fp + tn + EPS),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GroupRates {
    pub acc: f64,
    pub tpr: f64,
    pub fpr: f64,
}

impl GroupRates {
    /// Equalized-odds gap: |dTPR| + |dFPR|.
    pub fn eo_gap(&self, other: &GroupRates) -> f64 {
        (self.tpr - other.tpr).abs() + (self.fpr - other.fpr).abs()
    }
}

pub fn confusion_counts<'a, I>(records: I) -> ConfusionCounts
where
    I: IntoIterator<Item = &'a DecisionRecord>,
{
    let mut counts = ConfusionCounts::default();
    for r in records {
        counts.add(r.y_true, r.human_decision);
    }
    counts
}

pub fn group_rates<'a, I>(records: I) -> GroupRates
where
    I: IntoIterator<Item = &'a DecisionRecord>,
{
    confusion_counts(records).rates()
}

/// Rates for the A=0 and A=1 halves of a slice.
pub fn rates_by_group(records: &[&DecisionRecord]) -> (GroupRates, GroupRates) {
    let mut c0 = ConfusionCounts::default();
    let mut c1 = ConfusionCounts::default();
    for r in records {
        let counts = if r.group == 0 { &mut c0 } else { &mut c1 };
        counts.add(r.y_true, r.human_decision);
    }
    (c0.rates(), c1.rates())
}
