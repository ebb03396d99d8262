// src/generator.rs
//
// DecisionGenerator: synthesizes the raw decision log.
//
// Causal model per item (draw order is part of the reproducibility contract):
//   difficulty ~ Beta(2, 5)
//   y_true     ~ Bernoulli(0.4 + 0.3 * difficulty)
//   unaided / model accuracy from group, modality penalty and difficulty
//   ai_confidence ~ Normal(model_prob_correct, 0.08), clipped to [0.01, 0.99]
//   override gate ~ Bernoulli(arm override rate)
//   follows AI    ~ Bernoulli(trust) or Bernoulli(1 - trust) when the gate fired
//   override path: sampled correctness, then a coin picks the reconciliation
//
// Records come out worker-major, session-minor, item-minor.

use crate::config::SimConfig;
use crate::error::SimResult;
use crate::logging::{EventSink, NoopSink, SimEvent};
use crate::rng::RandomStream;
use crate::types::{AssistanceArm, DecisionRecord, Modality};

pub const PROTECTED_GROUP_RATE: f64 = 0.4;
pub const MODALITY_WEIGHTS: [f64; 4] = [0.25, 0.25, 0.25, 0.25];

pub const DIFFICULTY_BETA_A: f64 = 2.0;
pub const DIFFICULTY_BETA_B: f64 = 5.0;

pub const AI_CONFIDENCE_SD: f64 = 0.08;
pub const AI_CONFIDENCE_BOUNDS: (f64, f64) = (0.01, 0.99);
pub const SUGGESTION_THRESHOLD: f64 = 0.5;

/// Probability the override path reconciles the sampled correctness against
/// the true label instead of using it directly as the decision.
pub const LABEL_RECONCILE_RATE: f64 = 0.5;

/// Per-worker attributes, fixed for all of a worker's records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerProfile {
    pub worker_id: u32,
    pub team_id: u32,
    pub group: u8,
    pub modality: Modality,
}

/// P(true label is positive) for an item of the given difficulty.
pub fn positive_rate(difficulty: f64) -> f64 {
    0.4 + 0.3 * difficulty
}

/// Unaided human accuracy, clipped to [0.05, 0.95].
pub fn unaided_prob_correct(group: u8, modality: Modality, difficulty: f64) -> f64 {
    let base_skill = 0.65 + 0.05 * (1.0 - f64::from(group));
    (base_skill - modality.penalty() - 0.25 * difficulty).clamp(0.05, 0.95)
}

/// AI model accuracy, clipped to [0.10, 0.98].
pub fn model_prob_correct(group: u8, modality: Modality, difficulty: f64) -> f64 {
    let model_base = 0.75 + 0.03 * (1.0 - f64::from(group));
    (model_base - 0.6 * modality.penalty() - 0.20 * difficulty).clamp(0.10, 0.98)
}

/// Propensity to follow the AI; higher when the AI is confident.
pub fn trust_tendency(ai_confidence: f64) -> f64 {
    (0.6 + 0.5 * (ai_confidence - 0.5)).clamp(0.05, 0.95)
}

/// Human decision on the override path.
///
/// With `reconcile_with_label` the sampled correctness is mapped onto the true
/// label (right answer iff `sampled_correct`); otherwise the correctness bit is
/// used as the decision itself.
pub fn override_decision(y_true: u8, sampled_correct: bool, reconcile_with_label: bool) -> u8 {
    if reconcile_with_label {
        if y_true == 1 {
            u8::from(sampled_correct)
        } else {
            u8::from(!sampled_correct)
        }
    } else {
        u8::from(sampled_correct)
    }
}

#[derive(Debug, Clone)]
pub struct DecisionGenerator {
    cfg: SimConfig,
}

impl DecisionGenerator {
    /// Validates the configuration up front; no draws happen on failure.
    pub fn new(cfg: SimConfig) -> SimResult<Self> {
        cfg.validate()?;
        Ok(Self { cfg })
    }

    pub fn generate(&self, rng: &mut RandomStream) -> SimResult<Vec<DecisionRecord>> {
        self.generate_with_sink(rng, &mut NoopSink)
    }

    pub fn generate_with_sink(
        &self,
        rng: &mut RandomStream,
        sink: &mut dyn EventSink,
    ) -> SimResult<Vec<DecisionRecord>> {
        let cfg = &self.cfg;
        let mut records = Vec::with_capacity(cfg.total_records()?);
        let mut n_overrides = 0usize;

        // Team assignment is a separate pass over all workers, ahead of any
        // per-worker draws.
        let team_ids: Vec<u32> = (1..=cfg.n_teams as u32).collect();
        let mut worker_teams = Vec::with_capacity(cfg.n_workers);
        for _ in 0..cfg.n_workers {
            worker_teams.push(*rng.choose(&team_ids)?);
        }

        for (idx, team_id) in worker_teams.into_iter().enumerate() {
            let worker_id = idx as u32 + 1;
            let group = rng.binomial01(PROTECTED_GROUP_RATE)?;
            let modality = *rng.choose_weighted(&Modality::ALL, &MODALITY_WEIGHTS)?;
            let worker = WorkerProfile {
                worker_id,
                team_id,
                group,
                modality,
            };
            sink.log_event(&SimEvent::WorkerProfile {
                worker_id,
                team_id,
                group,
                modality,
            });

            for session in 1..=cfg.n_sessions as u32 {
                let arm = *rng.choose(&AssistanceArm::ALL)?;
                sink.log_event(&SimEvent::SessionArm {
                    worker_id,
                    session,
                    arm,
                });

                for item in 0..cfg.items_per_session {
                    let record = draw_item(rng, &worker, session, item, arm)?;
                    n_overrides += usize::from(record.overridden);
                    records.push(record);
                }
            }
        }

        sink.log_event(&SimEvent::GenerationComplete {
            n_records: records.len(),
            n_overrides,
        });
        Ok(records)
    }
}

fn draw_item(
    rng: &mut RandomStream,
    worker: &WorkerProfile,
    session: u32,
    item: usize,
    arm: AssistanceArm,
) -> SimResult<DecisionRecord> {
    let difficulty = rng.beta(DIFFICULTY_BETA_A, DIFFICULTY_BETA_B)?;
    let y_true = rng.binomial01(positive_rate(difficulty))?;

    let unaided = unaided_prob_correct(worker.group, worker.modality, difficulty);
    let model = model_prob_correct(worker.group, worker.modality, difficulty);

    let (conf_lo, conf_hi) = AI_CONFIDENCE_BOUNDS;
    let ai_confidence = rng.normal_clipped(model, AI_CONFIDENCE_SD, conf_lo, conf_hi)?;
    let ai_suggestion = u8::from(ai_confidence >= SUGGESTION_THRESHOLD);

    let effect = arm.effect();
    let assisted = effect.assisted_prob_correct(unaided);
    let trust = trust_tendency(ai_confidence);

    // The gate is drawn even for a zero rate so every arm consumes the same
    // number of draws up to this point.
    let gate_fired = rng.bernoulli(effect.override_rate)?;
    let follow_prob = if gate_fired { 1.0 - trust } else { trust };
    let follows_ai = rng.bernoulli(follow_prob)?;

    let (human_decision, overridden) = if follows_ai {
        (ai_suggestion, 0)
    } else {
        let sampled_correct = rng.bernoulli(assisted)?;
        let reconcile = rng.bernoulli(LABEL_RECONCILE_RATE)?;
        (override_decision(y_true, sampled_correct, reconcile), 1)
    };

    Ok(DecisionRecord {
        worker_id: worker.worker_id,
        team_id: worker.team_id,
        session,
        item_id: format!("s{session}_i{item}"),
        group: worker.group,
        modality: worker.modality,
        assistance_arm: arm,
        difficulty,
        y_true,
        ai_confidence,
        ai_suggestion,
        human_decision,
        overridden,
        // Stored correctness always follows the final decision, not the
        // sampled correctness from the override path.
        correct: u8::from(human_decision == y_true),
    })
}

/// Seed a fresh stream from `cfg.seed` and generate the full table.
pub fn generate_decision_log(cfg: SimConfig) -> SimResult<Vec<DecisionRecord>> {
    let generator = DecisionGenerator::new(cfg)?;
    let mut rng = RandomStream::new(cfg.seed);
    generator.generate(&mut rng)
}
