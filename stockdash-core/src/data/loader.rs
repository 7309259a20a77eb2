//! Directory loader: one tabular file per ticker.
//!
//! Every `.csv` (comma) or `.tsv` (tab) file in a directory is parsed into a
//! [`Series`] whose ticker is the file stem. Files are visited in file-name
//! order so duplicate handling downstream is deterministic.
//!
//! A file that fails to parse is reported as a [`FileParseError`] and skipped;
//! the rest of the batch still loads. Only an empty result is fatal.

use crate::domain::{PricePoint, Series};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use csv::StringRecord;
use std::fs::File;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Fatal loader errors. Per-file problems are [`FileParseError`]s instead.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read data directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no data loaded from {dir} ({failed} file(s) failed to parse)")]
    NoData { dir: PathBuf, failed: usize },
}

/// A single file that could not be loaded.
#[derive(Debug, Error)]
#[error("error loading {ticker} ({}): {kind}", .file.display())]
pub struct FileParseError {
    pub ticker: String,
    pub file: PathBuf,
    pub kind: ParseErrorKind,
}

/// Why a file was rejected.
#[derive(Debug, Error)]
pub enum ParseErrorKind {
    #[error("cannot open file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed content: {0}")]
    Csv(#[from] csv::Error),

    #[error("missing required column '{0}'")]
    MissingColumn(&'static str),

    #[error("row {row}: unparseable date '{value}'")]
    BadDate { row: usize, value: String },

    #[error("row {row}: column {column} has invalid number '{value}'")]
    BadNumber {
        row: usize,
        column: &'static str,
        value: String,
    },

    #[error("file has a header but no data rows")]
    Empty,
}

/// Recognized tabular formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    Tsv,
}

impl FileFormat {
    /// Detect the format from a file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "csv" => Some(FileFormat::Csv),
            "tsv" => Some(FileFormat::Tsv),
            _ => None,
        }
    }

    fn delimiter(self) -> u8 {
        match self {
            FileFormat::Csv => b',',
            FileFormat::Tsv => b'\t',
        }
    }
}

/// Outcome of loading a directory: parsed series plus per-file failures.
#[derive(Debug)]
pub struct LoadReport {
    /// Successfully parsed series, in file-name order.
    pub series: Vec<Series>,
    /// Files that were skipped.
    pub failures: Vec<FileParseError>,
}

/// Load every recognized file in `dir`.
///
/// Returns [`LoadError::NoData`] when no file parses successfully.
pub fn load_directory(dir: &Path) -> Result<LoadReport, LoadError> {
    let entries = std::fs::read_dir(dir).map_err(|source| LoadError::ReadDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files: Vec<(PathBuf, FileFormat)> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter_map(|path| FileFormat::from_path(&path).map(|format| (path, format)))
        .collect();
    files.sort_by(|a, b| a.0.file_name().cmp(&b.0.file_name()));

    let mut series = Vec::new();
    let mut failures = Vec::new();

    for (path, format) in files {
        match load_file(&path, format) {
            Ok(s) => {
                debug!(ticker = %s.ticker, rows = s.len(), file = %path.display(), "loaded series");
                series.push(s);
            }
            Err(e) => {
                warn!(ticker = %e.ticker, error = %e.kind, "skipping file");
                failures.push(e);
            }
        }
    }

    if series.is_empty() {
        return Err(LoadError::NoData {
            dir: dir.to_path_buf(),
            failed: failures.len(),
        });
    }

    info!(
        loaded = series.len(),
        failed = failures.len(),
        dir = %dir.display(),
        "data directory loaded"
    );

    Ok(LoadReport { series, failures })
}

/// Ticker symbol for a file: the file name with its extension stripped.
pub fn ticker_from_path(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Parse one file. The file handle is dropped before returning.
pub fn load_file(path: &Path, format: FileFormat) -> Result<Series, FileParseError> {
    let ticker = ticker_from_path(path);
    let wrap = |kind: ParseErrorKind| FileParseError {
        ticker: ticker.clone(),
        file: path.to_path_buf(),
        kind,
    };

    let file = File::open(path).map_err(|e| wrap(e.into()))?;
    let points = parse_reader(file, format, &ticker).map_err(wrap)?;

    Ok(Series {
        ticker: ticker.clone(),
        source: path.to_path_buf(),
        points,
    })
}

/// Parse delimited OHLCV text from any reader.
pub fn parse_reader<R: std::io::Read>(
    reader: R,
    format: FileFormat,
    ticker: &str,
) -> Result<Vec<PricePoint>, ParseErrorKind> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(format.delimiter())
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let columns = ColumnIndex::from_headers(rdr.headers()?)?;

    let mut points = Vec::new();
    for (i, record) in rdr.records().enumerate() {
        let record = record?;
        points.push(columns.parse_row(&record, i + 1, ticker)?);
    }

    if points.is_empty() {
        return Err(ParseErrorKind::Empty);
    }
    Ok(points)
}

/// Positions of the required columns within a header row.
struct ColumnIndex {
    date: usize,
    open: usize,
    high: usize,
    low: usize,
    close: usize,
    volume: usize,
}

impl ColumnIndex {
    fn from_headers(headers: &StringRecord) -> Result<Self, ParseErrorKind> {
        let find = |name: &'static str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
                .ok_or(ParseErrorKind::MissingColumn(name))
        };
        Ok(Self {
            date: find("Date")?,
            open: find("Open")?,
            high: find("High")?,
            low: find("Low")?,
            close: find("Close")?,
            volume: find("Volume")?,
        })
    }

    fn parse_row(
        &self,
        record: &StringRecord,
        row: usize,
        ticker: &str,
    ) -> Result<PricePoint, ParseErrorKind> {
        let field = |idx: usize| record.get(idx).unwrap_or("");

        let raw_date = field(self.date);
        let date = parse_date(raw_date).ok_or_else(|| ParseErrorKind::BadDate {
            row,
            value: raw_date.to_string(),
        })?;

        Ok(PricePoint {
            ticker: ticker.to_string(),
            date,
            open: parse_price(field(self.open), row, "Open")?,
            high: parse_price(field(self.high), row, "High")?,
            low: parse_price(field(self.low), row, "Low")?,
            close: parse_price(field(self.close), row, "Close")?,
            volume: parse_volume(field(self.volume), row)?,
        })
    }
}

/// Parse a calendar date, accepting the common export forms.
///
/// Timestamps keep only their date part.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];
    const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

    let value = value.trim();
    if let Some(date) = DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
    {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.date_naive());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|dt| dt.date())
}

fn parse_price(value: &str, row: usize, column: &'static str) -> Result<f64, ParseErrorKind> {
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ParseErrorKind::BadNumber {
            row,
            column,
            value: value.to_string(),
        })
}

/// Volume is an integer, but many exports write it as `1234.0`.
fn parse_volume(value: &str, row: usize) -> Result<u64, ParseErrorKind> {
    if let Ok(v) = value.parse::<u64>() {
        return Ok(v);
    }
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0 && v.fract() == 0.0 && *v <= u64::MAX as f64)
        .map(|v| v as u64)
        .ok_or_else(|| ParseErrorKind::BadNumber {
            row,
            column: "Volume",
            value: value.to_string(),
        })
}
