// src/table.rs
//
// Flat CSV exchange for the decision log and the session-metrics table.
//
// Header rows use the exact column keys from `DecisionRecord::COLUMNS` and
// `SessionMetricsRecord::COLUMNS`; the serde renames on both record types map
// those keys onto fields. Floats are written with the shortest representation
// that parses back to the same bits, so a write -> read cycle is lossless and
// two identical tables serialize to identical bytes.
//
// Decision rows are checked against the record invariants on load, so a
// hand-edited log with a stale `correct` or `ai_suggestion` is rejected with
// its line number instead of reaching the aggregator.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{SimError, SimResult};
use crate::types::{DecisionRecord, SessionMetricsRecord};

const STREAM: &str = "<stream>";

fn csv_err(path: &str, e: csv::Error) -> SimError {
    if let csv::ErrorKind::Io(_) = e.kind() {
        return SimError::io(path, &e);
    }
    let line = e.position().map_or(0, |p| p.line() as usize);
    SimError::parse(line, e.to_string())
}

pub(crate) fn write_table<W: Write, T: Serialize>(
    w: W,
    columns: &[&str],
    rows: &[T],
) -> SimResult<()> {
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(w);
    writer
        .write_record(columns)
        .map_err(|e| csv_err(STREAM, e))?;
    for row in rows {
        writer.serialize(row).map_err(|e| csv_err(STREAM, e))?;
    }
    writer.flush().map_err(|e| SimError::io(STREAM, e))
}

pub fn write_decisions_csv<W: Write>(w: W, records: &[DecisionRecord]) -> SimResult<()> {
    write_table(w, &DecisionRecord::COLUMNS, records)
}

pub fn write_session_metrics_csv<W: Write>(w: W, rows: &[SessionMetricsRecord]) -> SimResult<()> {
    write_table(w, &SessionMetricsRecord::COLUMNS, rows)
}

/// Serialized decision table; the bytes the determinism checksum is taken over.
pub fn decisions_csv_bytes(records: &[DecisionRecord]) -> SimResult<Vec<u8>> {
    let mut buf = Vec::new();
    write_decisions_csv(&mut buf, records)?;
    Ok(buf)
}

/// Reads every data row as `T` and runs `check` on it; a failed check is
/// reported against the row's line.
fn read_table<R, T, F>(r: R, columns: &[&str], mut check: F) -> SimResult<Vec<T>>
where
    R: Read,
    T: DeserializeOwned,
    F: FnMut(&T) -> Result<(), String>,
{
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(r);

    let headers = reader.headers().map_err(|e| csv_err(STREAM, e))?.clone();
    if headers.is_empty() {
        return Err(SimError::parse(1, "missing header row"));
    }
    if !headers.iter().eq(columns.iter().copied()) {
        return Err(SimError::parse(
            1,
            format!(
                "header mismatch: expected {}, found {}",
                columns.join(","),
                headers.iter().collect::<Vec<_>>().join(",")
            ),
        ));
    }

    let mut out = Vec::new();
    let mut record = StringRecord::new();
    while reader
        .read_record(&mut record)
        .map_err(|e| csv_err(STREAM, e))?
    {
        let line = record.position().map_or(0, |p| p.line() as usize);
        let row: T = record
            .deserialize(Some(&headers))
            .map_err(|e| SimError::parse(line, e.to_string()))?;
        check(&row).map_err(|message| SimError::parse(line, message))?;
        out.push(row);
    }
    Ok(out)
}

pub fn read_decisions_csv<R: Read>(r: R) -> SimResult<Vec<DecisionRecord>> {
    read_table(r, &DecisionRecord::COLUMNS, DecisionRecord::check_invariants)
}

pub fn read_session_metrics_csv<R: Read>(r: R) -> SimResult<Vec<SessionMetricsRecord>> {
    read_table(r, &SessionMetricsRecord::COLUMNS, |_| Ok(()))
}

pub fn write_decisions_file(path: &Path, records: &[DecisionRecord]) -> SimResult<()> {
    let file = File::create(path).map_err(|e| SimError::io(path.display(), e))?;
    write_decisions_csv(file, records)
}

pub fn read_decisions_file(path: &Path) -> SimResult<Vec<DecisionRecord>> {
    let file = File::open(path).map_err(|e| SimError::io(path.display(), e))?;
    read_decisions_csv(file)
}

pub fn write_session_metrics_file(path: &Path, rows: &[SessionMetricsRecord]) -> SimResult<()> {
    let file = File::create(path).map_err(|e| SimError::io(path.display(), e))?;
    write_session_metrics_csv(file, rows)
}

pub fn read_session_metrics_file(path: &Path) -> SimResult<Vec<SessionMetricsRecord>> {
    let file = File::open(path).map_err(|e| SimError::io(path.display(), e))?;
    read_session_metrics_csv(file)
}
