//! CSV and JSON export of pipeline results.
//!
//! Two tables are written:
//! - **derived**: `Date,Ticker,Close,SMA_short,SMA_long,Signal`, one row per
//!   derived row. Close is the effective close; undefined averages and
//!   signal-free rows are empty fields.
//! - **signals**: `Date,Ticker,Close,Action`, one row per crossover event.
//!
//! Headers are always written, so an empty run still yields a valid file.
//! Both formats can be read back with the `import_*` functions.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use stockdash_core::domain::{Action, SignalEvent};

use crate::engine::DerivedRow;
use crate::pipeline::PipelineOutput;
use crate::summary::RunSummary;

pub const DERIVED_FILE: &str = "filtered_stock_data.csv";
pub const SIGNALS_FILE: &str = "buy_sell_signals.csv";
pub const SUMMARY_FILE: &str = "run_summary.json";

const DERIVED_HEADER: [&str; 6] = ["Date", "Ticker", "Close", "SMA_short", "SMA_long", "Signal"];
const SIGNALS_HEADER: [&str; 4] = ["Date", "Ticker", "Close", "Action"];

/// One line of the derived CSV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedRecord {
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Ticker")]
    pub ticker: String,
    #[serde(rename = "Close")]
    pub close: f64,
    #[serde(rename = "SMA_short")]
    pub sma_short: Option<f64>,
    #[serde(rename = "SMA_long")]
    pub sma_long: Option<f64>,
    #[serde(rename = "Signal")]
    pub signal: Option<Action>,
}

impl From<&DerivedRow> for DerivedRecord {
    fn from(row: &DerivedRow) -> Self {
        Self {
            date: row.date,
            ticker: row.ticker.clone(),
            close: row.effective_close(),
            sma_short: row.sma_short,
            sma_long: row.sma_long,
            signal: row.signal,
        }
    }
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Export the derived table as CSV text.
pub fn export_derived_csv(rows: &[DerivedRow]) -> Result<String> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(vec![]);
    wtr.write_record(DERIVED_HEADER)?;
    for row in rows {
        wtr.serialize(DerivedRecord::from(row))
            .with_context(|| format!("failed to write derived row {} {}", row.ticker, row.date))?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Export crossover events as CSV text.
pub fn export_signals_csv(signals: &[SignalEvent]) -> Result<String> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(vec![]);
    wtr.write_record(SIGNALS_HEADER)?;
    for event in signals {
        wtr.serialize(event)
            .with_context(|| format!("failed to write signal {} {}", event.ticker, event.date))?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── CSV import ─────────────────────────────────────────────────────

/// Parse derived CSV text produced by [`export_derived_csv`].
pub fn import_derived_csv(text: &str) -> Result<Vec<DerivedRecord>> {
    let mut rdr = csv::Reader::from_reader(text.as_bytes());
    rdr.deserialize::<DerivedRecord>()
        .enumerate()
        .map(|(i, rec)| rec.with_context(|| format!("bad derived row {}", i + 1)))
        .collect()
}

/// Parse signal CSV text produced by [`export_signals_csv`].
pub fn import_signals_csv(text: &str) -> Result<Vec<SignalEvent>> {
    let mut rdr = csv::Reader::from_reader(text.as_bytes());
    rdr.deserialize::<SignalEvent>()
        .enumerate()
        .map(|(i, rec)| rec.with_context(|| format!("bad signal row {}", i + 1)))
        .collect()
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Paths written by [`save_outputs`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedOutputs {
    pub derived: PathBuf,
    pub signals: PathBuf,
    pub summary: PathBuf,
}

/// Write the derived table, the signal table and the run summary into
/// `dir`, creating it if needed. Existing files are overwritten.
pub fn save_outputs(output: &PipelineOutput, summary: &RunSummary, dir: &Path) -> Result<SavedOutputs> {
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create output directory {}", dir.display()))?;

    let saved = SavedOutputs {
        derived: dir.join(DERIVED_FILE),
        signals: dir.join(SIGNALS_FILE),
        summary: dir.join(SUMMARY_FILE),
    };

    write_file(&saved.derived, &export_derived_csv(&output.rows)?)?;
    write_file(&saved.signals, &export_signals_csv(&output.signals)?)?;
    let json = summary.to_json().context("failed to serialize run summary")?;
    write_file(&saved.summary, &json)?;

    Ok(saved)
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))
}
