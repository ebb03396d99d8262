// src/types.rs
//
// Core record types shared by the generator, the aggregator and the tabular
// exchange. Serde names match the exchange column keys exactly.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Access modality (device / connectivity / language channel) of a worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Modality {
    #[serde(rename = "feature_2G")]
    Feature2G,
    #[serde(rename = "smartphone_3G")]
    Smartphone3G,
    #[serde(rename = "kannada_voice")]
    KannadaVoice,
    #[serde(rename = "hindi_text")]
    HindiText,
}

impl Modality {
    pub const ALL: [Modality; 4] = [
        Modality::Feature2G,
        Modality::Smartphone3G,
        Modality::KannadaVoice,
        Modality::HindiText,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Modality::Feature2G => "feature_2G",
            Modality::Smartphone3G => "smartphone_3G",
            Modality::KannadaVoice => "kannada_voice",
            Modality::HindiText => "hindi_text",
        }
    }

    /// Skill penalty for working through this channel.
    pub fn penalty(&self) -> f64 {
        match self {
            Modality::Feature2G => 0.08,
            Modality::Smartphone3G => 0.02,
            Modality::KannadaVoice => 0.06,
            Modality::HindiText => 0.03,
        }
    }
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How an assistance arm shifts the human's accuracy and override propensity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArmEffect {
    /// Additive lift on the unaided probability of a correct decision.
    pub accuracy_delta: f64,
    /// Probability that the override gate fires on an item.
    pub override_rate: f64,
}

impl ArmEffect {
    /// Assisted probability of a correct decision, clipped to [0, 1].
    pub fn assisted_prob_correct(&self, unaided_prob_correct: f64) -> f64 {
        (unaided_prob_correct + self.accuracy_delta).clamp(0.0, 1.0)
    }
}

/// Experimental assistance condition, assigned per worker x session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssistanceArm {
    None,
    Rationale,
    Calib,
    Counter,
}

impl AssistanceArm {
    /// Draw order used by the generator.
    pub const ALL: [AssistanceArm; 4] = [
        AssistanceArm::None,
        AssistanceArm::Rationale,
        AssistanceArm::Calib,
        AssistanceArm::Counter,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AssistanceArm::None => "None",
            AssistanceArm::Rationale => "Rationale",
            AssistanceArm::Calib => "Calib",
            AssistanceArm::Counter => "Counter",
        }
    }

    pub fn effect(&self) -> ArmEffect {
        match self {
            AssistanceArm::None => ArmEffect {
                accuracy_delta: 0.0,
                override_rate: 0.0,
            },
            AssistanceArm::Rationale => ArmEffect {
                accuracy_delta: 0.03,
                override_rate: 0.15,
            },
            AssistanceArm::Calib => ArmEffect {
                accuracy_delta: 0.05,
                override_rate: 0.20,
            },
            AssistanceArm::Counter => ArmEffect {
                accuracy_delta: 0.06,
                override_rate: 0.30,
            },
        }
    }
}

impl fmt::Display for AssistanceArm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the raw decision log (worker x session x item).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub worker_id: u32,
    pub team_id: u32,
    pub session: u32,
    pub item_id: String,
    /// Protected group membership, 0 or 1.
    #[serde(rename = "A")]
    pub group: u8,
    #[serde(rename = "M")]
    pub modality: Modality,
    pub assistance_arm: AssistanceArm,
    pub difficulty: f64,
    pub y_true: u8,
    pub ai_confidence: f64,
    pub ai_suggestion: u8,
    pub human_decision: u8,
    #[serde(rename = "override")]
    pub overridden: u8,
    pub correct: u8,
}

impl DecisionRecord {
    pub const COLUMNS: [&'static str; 14] = [
        "worker_id",
        "team_id",
        "session",
        "item_id",
        "A",
        "M",
        "assistance_arm",
        "difficulty",
        "y_true",
        "ai_confidence",
        "ai_suggestion",
        "human_decision",
        "override",
        "correct",
    ];

    /// Record-level invariants: 0/1 flags, the suggestion threshold, and the
    /// derived `correct` column. Returns a message naming the first violation.
    pub fn check_invariants(&self) -> Result<(), String> {
        for (column, value) in [
            ("A", self.group),
            ("y_true", self.y_true),
            ("ai_suggestion", self.ai_suggestion),
            ("human_decision", self.human_decision),
            ("override", self.overridden),
            ("correct", self.correct),
        ] {
            if value > 1 {
                return Err(format!("column {column} must be 0 or 1, found {value}"));
            }
        }
        let expected_suggestion = u8::from(self.ai_confidence >= 0.5);
        if self.ai_suggestion != expected_suggestion {
            return Err(format!(
                "ai_suggestion={} disagrees with ai_confidence={}",
                self.ai_suggestion, self.ai_confidence
            ));
        }
        let expected_correct = u8::from(self.human_decision == self.y_true);
        if self.correct != expected_correct {
            return Err(format!(
                "correct={} disagrees with human_decision={} and y_true={}",
                self.correct, self.human_decision, self.y_true
            ));
        }
        Ok(())
    }
}

/// Fairness / calibration summary for one (session, assistance arm) group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionMetricsRecord {
    pub session: u32,
    pub assistance_arm: AssistanceArm,
    #[serde(rename = "acc_A0")]
    pub acc_a0: f64,
    #[serde(rename = "acc_A1")]
    pub acc_a1: f64,
    #[serde(rename = "tpr_A0")]
    pub tpr_a0: f64,
    #[serde(rename = "tpr_A1")]
    pub tpr_a1: f64,
    #[serde(rename = "fpr_A0")]
    pub fpr_a0: f64,
    #[serde(rename = "fpr_A1")]
    pub fpr_a1: f64,
    pub eo_gap: f64,
    #[serde(rename = "ADI")]
    pub adi: f64,
    #[serde(rename = "ECE")]
    pub ece: f64,
}

impl SessionMetricsRecord {
    pub const COLUMNS: [&'static str; 11] = [
        "session",
        "assistance_arm",
        "acc_A0",
        "acc_A1",
        "tpr_A0",
        "tpr_A1",
        "fpr_A0",
        "fpr_A1",
        "eo_gap",
        "ADI",
        "ECE",
    ];
}
