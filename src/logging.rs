// src/logging.rs
//
// Telemetry sinks for the decision-log pipeline.
// - EventSink:   trait used by the generator and the aggregator
// - NoopSink:    discards all events
// - MemorySink:  keeps events in memory (tests, small runs)
// - JsonlSink:   writes one JSON object per event, each tagged with schema_version
//
// Environment variables (JsonlSink::from_env):
// - DECISION_SIM_TELEMETRY_MODE: "off" (default) or "jsonl"
// - DECISION_SIM_TELEMETRY_PATH: target file, required when mode is "jsonl"

use std::env;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::error::{SimError, SimResult};
use crate::types::{AssistanceArm, Modality};

pub const SCHEMA_VERSION: u32 = 1;

pub const ENV_TELEMETRY_MODE: &str = "DECISION_SIM_TELEMETRY_MODE";
pub const ENV_TELEMETRY_PATH: &str = "DECISION_SIM_TELEMETRY_PATH";

/// Structured pipeline events.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SimEvent {
    WorkerProfile {
        worker_id: u32,
        team_id: u32,
        group: u8,
        modality: Modality,
    },
    SessionArm {
        worker_id: u32,
        session: u32,
        arm: AssistanceArm,
    },
    GroupAggregated {
        session: u32,
        arm: AssistanceArm,
        n_records: usize,
        eo_gap: f64,
        adi: f64,
        ece: f64,
    },
    GenerationComplete {
        n_records: usize,
        n_overrides: usize,
    },
}

pub trait EventSink {
    fn log_event(&mut self, event: &SimEvent);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl EventSink for NoopSink {
    fn log_event(&mut self, _event: &SimEvent) {}
}

#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    pub events: Vec<SimEvent>,
}

impl EventSink for MemorySink {
    fn log_event(&mut self, event: &SimEvent) {
        self.events.push(event.clone());
    }
}

#[derive(Serialize)]
struct Envelope<'a> {
    schema_version: u32,
    #[serde(flatten)]
    event: &'a SimEvent,
}

pub struct JsonlSink {
    writer: BufWriter<File>,
}

impl JsonlSink {
    pub fn create(path: &Path) -> SimResult<Self> {
        let file = File::create(path).map_err(|e| SimError::io(path.display(), e))?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }

    /// Returns `Ok(None)` when telemetry is off.
    pub fn from_env() -> SimResult<Option<Self>> {
        let mode = env::var(ENV_TELEMETRY_MODE).unwrap_or_else(|_| "off".to_string());
        match mode.trim().to_ascii_lowercase().as_str() {
            "" | "off" | "0" | "false" => Ok(None),
            "jsonl" => {
                let path = env::var(ENV_TELEMETRY_PATH).map_err(|_| {
                    SimError::config(ENV_TELEMETRY_PATH, "required when telemetry mode is jsonl")
                })?;
                Self::create(Path::new(&path)).map(Some)
            }
            other => Err(SimError::config(
                ENV_TELEMETRY_MODE,
                format!("unknown telemetry mode {other:?} (expected off|jsonl)"),
            )),
        }
    }

    pub fn flush(&mut self) {
        let _ = self.writer.flush();
    }
}

impl EventSink for JsonlSink {
    fn log_event(&mut self, event: &SimEvent) {
        let envelope = Envelope {
            schema_version: SCHEMA_VERSION,
            event,
        };
        // Telemetry must never abort a run; write failures are dropped.
        if let Ok(line) = serde_json::to_string(&envelope) {
            let _ = self.writer.write_all(line.as_bytes());
            let _ = self.writer.write_all(b"\n");
        }
    }
}

impl Drop for JsonlSink {
    fn drop(&mut self) {
        self.flush();
    }
}
