// src/output.rs
//
// Run output bundle.
//
// Layout under the output directory:
//   raw/decisions.csv                       full decision log
//   processed/session_metrics.csv           one row per (session, arm)
//   processed/summary_metrics_by_arm.csv    arm means
//   run_summary.json                        config, counts, SDI proxy, checksum
//
// The checksum is SHA-256 over the decision CSV bytes, so two runs with the
// same seed and config must report the same value.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::config::SimConfig;
use crate::error::{SimError, SimResult};
use crate::summary::{sdi_proxy, summary_metrics_by_arm, ArmSummary};
use crate::table::{
    decisions_csv_bytes, write_decisions_file, write_session_metrics_file, write_table,
};
use crate::types::{DecisionRecord, SessionMetricsRecord};

pub const OUTPUT_SCHEMA_VERSION: u32 = 1;

pub const DECISIONS_REL_PATH: &str = "raw/decisions.csv";
pub const SESSION_METRICS_REL_PATH: &str = "processed/session_metrics.csv";
pub const ARM_SUMMARY_REL_PATH: &str = "processed/summary_metrics_by_arm.csv";
pub const RUN_SUMMARY_FILE: &str = "run_summary.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub schema_version: u32,
    /// `None` when the decisions were loaded rather than generated.
    pub config: Option<SimConfig>,
    pub n_records: usize,
    pub n_overrides: usize,
    pub n_session_groups: usize,
    pub arms: Vec<ArmSummary>,
    pub sdi_proxy: Option<f64>,
    /// Hex SHA-256 of the decision CSV bytes.
    pub decisions_sha256: String,
}

impl RunSummary {
    pub fn build(
        config: Option<SimConfig>,
        decisions: &[DecisionRecord],
        metrics: &[SessionMetricsRecord],
    ) -> SimResult<Self> {
        Ok(Self {
            schema_version: OUTPUT_SCHEMA_VERSION,
            config,
            n_records: decisions.len(),
            n_overrides: decisions.iter().filter(|r| r.overridden == 1).count(),
            n_session_groups: metrics.len(),
            arms: summary_metrics_by_arm(metrics),
            sdi_proxy: sdi_proxy(metrics),
            decisions_sha256: decisions_checksum(decisions)?,
        })
    }
}

pub fn decisions_checksum(decisions: &[DecisionRecord]) -> SimResult<String> {
    let mut hasher = Sha256::new();
    hasher.update(decisions_csv_bytes(decisions)?);
    Ok(hex_encode(&hasher.finalize()))
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

fn ensure_parent(path: &Path) -> SimResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| SimError::io(parent.display(), e))?;
    }
    Ok(())
}

pub fn write_arm_summary_file(path: &Path, arms: &[ArmSummary]) -> SimResult<()> {
    let file = File::create(path).map_err(|e| SimError::io(path.display(), e))?;
    write_table(file, &ArmSummary::COLUMNS, arms)
}

/// Paths written by [`write_run_outputs`].
#[derive(Debug, Clone)]
pub struct RunOutputPaths {
    pub decisions: PathBuf,
    pub session_metrics: PathBuf,
    pub arm_summary: PathBuf,
    pub run_summary: PathBuf,
}

/// Write the full output bundle and return the summary that was persisted.
pub fn write_run_outputs(
    output_dir: &Path,
    config: Option<SimConfig>,
    decisions: &[DecisionRecord],
    metrics: &[SessionMetricsRecord],
) -> SimResult<(RunSummary, RunOutputPaths)> {
    let paths = RunOutputPaths {
        decisions: output_dir.join(DECISIONS_REL_PATH),
        session_metrics: output_dir.join(SESSION_METRICS_REL_PATH),
        arm_summary: output_dir.join(ARM_SUMMARY_REL_PATH),
        run_summary: output_dir.join(RUN_SUMMARY_FILE),
    };
    for p in [
        &paths.decisions,
        &paths.session_metrics,
        &paths.arm_summary,
        &paths.run_summary,
    ] {
        ensure_parent(p)?;
    }

    write_decisions_file(&paths.decisions, decisions)?;
    write_session_metrics_file(&paths.session_metrics, metrics)?;

    let summary = RunSummary::build(config, decisions, metrics)?;
    write_arm_summary_file(&paths.arm_summary, &summary.arms)?;

    let file = File::create(&paths.run_summary)
        .map_err(|e| SimError::io(paths.run_summary.display(), e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &summary)
        .map_err(|e| SimError::io(paths.run_summary.display(), e))?;
    writer
        .flush()
        .map_err(|e| SimError::io(paths.run_summary.display(), e))?;

    Ok((summary, paths))
}
