//! decision_sim core library.
//!
//! Two-stage pipeline over a simulated human-AI decision log:
//!
//! 1. [`DecisionGenerator`] draws one [`DecisionRecord`] per
//!    (worker, session, item) from an explicit, seeded [`RandomStream`].
//! 2. [`summarize_sessions`] reduces the log into one
//!    [`SessionMetricsRecord`] per (session, assistance arm): group-conditional
//!    TPR/FPR/accuracy, the equalized-odds gap, the access-disparity index over
//!    modalities, and a confidence-binned calibration error.
//!
//! The binary (`src/main.rs`) is a thin harness that writes both tables plus a
//! run summary to disk.

pub mod aggregate;
pub mod config;
pub mod confusion;
pub mod error;
pub mod generator;
pub mod logging;
pub mod output;
pub mod rng;
pub mod summary;
pub mod table;
pub mod types;

// --- Re-exports for ergonomic external use ---------------------------------

pub use aggregate::{
    access_disparity_index, expected_calibration_error, summarize_sessions,
    summarize_sessions_with_sink,
};
pub use config::SimConfig;
pub use confusion::{group_rates, ConfusionCounts, GroupRates, EPS};
pub use error::{SimError, SimResult};
pub use generator::{generate_decision_log, DecisionGenerator};
pub use logging::{EventSink, JsonlSink, MemorySink, NoopSink, SimEvent};
pub use output::{write_run_outputs, RunSummary};
pub use rng::RandomStream;
pub use summary::{sdi_proxy, summary_metrics_by_arm, ArmSummary};
pub use table::{
    read_decisions_csv, read_decisions_file, read_session_metrics_csv, write_decisions_csv,
    write_session_metrics_csv,
};
pub use types::{AssistanceArm, DecisionRecord, Modality, SessionMetricsRecord};
