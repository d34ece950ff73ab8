//! Summary export
//!
//! Each run writes one `summary.csv` into its output directory: a
//! `metric,value` header followed by one row per summary key, in key order.
//! Batch drivers can also render a one-line-per-run overview table.

use crate::orchestrator::{RunResult, SimulationConfig};
use crate::stats::{summary, SimulationSummary};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

pub const SUMMARY_FILE_NAME: &str = "summary.csv";

const SUMMARY_HEADER: [&str; 2] = ["metric", "value"];

const BATCH_HEADER: [&str; 6] = [
    "run",
    "arrival/hr",
    "doctors",
    "service_mean_min",
    "avg_wait_min",
    "wall_seconds",
];

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Malformed summary file {path}: {reason}")]
    Malformed { path: PathBuf, reason: String },
}

/// Write `summary.csv` into `dir`, creating the directory if needed
///
/// # Returns
///
/// Path of the written file
pub fn write_summary(
    dir: impl AsRef<Path>,
    summary: &SimulationSummary,
) -> Result<PathBuf, ExportError> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir).map_err(|source| ExportError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let path = dir.join(SUMMARY_FILE_NAME);
    let file = fs::File::create(&path).map_err(|source| ExportError::Io {
        path: path.clone(),
        source,
    })?;

    let mut wtr = csv::Writer::from_writer(file);
    wtr.write_record(SUMMARY_HEADER)?;
    for (key, value) in summary.iter() {
        wtr.write_record([key, value])?;
    }
    wtr.flush().map_err(|source| ExportError::Io {
        path: path.clone(),
        source,
    })?;

    info!(path = %path.display(), entries = summary.len(), "Wrote summary");
    Ok(path)
}

/// Read a `summary.csv` written by `write_summary`
pub fn read_summary(path: impl AsRef<Path>) -> Result<SimulationSummary, ExportError> {
    let path = path.as_ref();
    let file = fs::File::open(path).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut rdr = csv::Reader::from_reader(file);
    let header = rdr.headers()?.clone();
    if header.iter().ne(SUMMARY_HEADER) {
        return Err(ExportError::Malformed {
            path: path.to_path_buf(),
            reason: format!("unexpected header {:?}", header),
        });
    }

    let mut entries = Vec::new();
    for record in rdr.records() {
        let record = record?;
        match (record.get(0), record.get(1)) {
            (Some(key), Some(value)) => entries.push((key.to_string(), value.to_string())),
            _ => {
                return Err(ExportError::Malformed {
                    path: path.to_path_buf(),
                    reason: format!("short row {:?}", record),
                })
            }
        }
    }
    Ok(entries.into_iter().collect())
}

/// Write the batch overview table, one row per run
///
/// `configs` and `results` are paired by index.
pub fn write_batch_table<W: Write>(
    out: W,
    configs: &[SimulationConfig],
    results: &[RunResult],
) -> Result<(), ExportError> {
    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record(BATCH_HEADER)?;
    for (config, result) in configs.iter().zip(results) {
        let avg_wait = result.summary.get(summary::AVG_WAIT).unwrap_or("0.0000");
        wtr.write_record([
            result.run_id.clone(),
            format!("{:.1}", config.arrival_rate_per_hour),
            config.num_doctors.to_string(),
            format!("{:.1}", config.service_mean_minutes),
            avg_wait.to_string(),
            format!("{:.3}", result.wall_seconds),
        ])?;
    }
    wtr.flush().map_err(|source| ExportError::Io {
        path: PathBuf::from("<batch table>"),
        source,
    })?;
    Ok(())
}
