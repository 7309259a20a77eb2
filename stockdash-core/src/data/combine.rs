//! Combined multi-ticker table.
//!
//! All loaded series are merged into one table sorted by (ticker, date).
//! Input order is never trusted: rolling windows downstream rely on the sort.
//!
//! Duplicate policy:
//! - Two files for the same ticker: the later file (by file name) replaces
//!   the earlier one.
//! - Repeated dates within one ticker: the last row in file order wins.
//!
//! Both cases are reported as [`CombineWarning`]s.

use crate::domain::{DatasetHash, PricePoint, Series};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::ops::Range;
use std::path::PathBuf;
use thiserror::Error;
use tracing::warn;

/// Non-fatal findings from combining.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CombineWarning {
    #[error("duplicate ticker {ticker}: {} replaced by {}", .replaced.display(), .kept.display())]
    DuplicateTicker {
        ticker: String,
        replaced: PathBuf,
        kept: PathBuf,
    },

    #[error("ticker {ticker}: dropped {dropped} row(s) with repeated dates")]
    DuplicateDate { ticker: String, dropped: usize },
}

/// Result of [`combine`].
#[derive(Debug)]
pub struct Combined {
    pub table: CombinedTable,
    pub warnings: Vec<CombineWarning>,
}

/// Merge loaded series into one table, applying the duplicate policy.
pub fn combine(series: Vec<Series>) -> Combined {
    let mut warnings = Vec::new();
    let mut by_ticker: BTreeMap<String, Series> = BTreeMap::new();

    for s in series {
        if let Some(old) = by_ticker.get(&s.ticker) {
            let warning = CombineWarning::DuplicateTicker {
                ticker: s.ticker.clone(),
                replaced: old.source.clone(),
                kept: s.source.clone(),
            };
            warn!("{warning}");
            warnings.push(warning);
        }
        by_ticker.insert(s.ticker.clone(), s);
    }

    let mut rows = Vec::new();
    for (ticker, s) in by_ticker {
        let mut points = s.points;
        // Stable: equal dates keep file order, so the last one is the latest row.
        points.sort_by_key(|p| p.date);

        let before = points.len();
        let mut deduped: Vec<PricePoint> = Vec::with_capacity(before);
        for p in points {
            if deduped.last().map(|last| last.date) == Some(p.date) {
                let last = deduped.len() - 1;
                deduped[last] = p;
            } else {
                deduped.push(p);
            }
        }

        let dropped = before - deduped.len();
        if dropped > 0 {
            let warning = CombineWarning::DuplicateDate { ticker, dropped };
            warn!("{warning}");
            warnings.push(warning);
        }
        rows.extend(deduped);
    }

    Combined {
        table: CombinedTable::from_rows(rows),
        warnings,
    }
}

/// Rows for all tickers, sorted by (ticker, date), with a per-ticker index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CombinedTable {
    rows: Vec<PricePoint>,
    spans: BTreeMap<String, Range<usize>>,
}

impl CombinedTable {
    /// Build a table from rows in any order. Rows are sorted by (ticker, date);
    /// no deduplication happens here.
    pub fn from_rows(mut rows: Vec<PricePoint>) -> Self {
        rows.sort_by(|a, b| a.ticker.cmp(&b.ticker).then(a.date.cmp(&b.date)));

        let mut spans: BTreeMap<String, Range<usize>> = BTreeMap::new();
        let mut start = 0;
        while start < rows.len() {
            let ticker = &rows[start].ticker;
            let len = rows[start..]
                .iter()
                .take_while(|p| &p.ticker == ticker)
                .count();
            spans.insert(ticker.clone(), start..start + len);
            start += len;
        }

        Self { rows, spans }
    }

    /// All rows, ticker-major then date-ascending.
    pub fn rows(&self) -> &[PricePoint] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Tickers present, ascending.
    pub fn tickers(&self) -> impl Iterator<Item = &str> {
        self.spans.keys().map(|t| t.as_str())
    }

    pub fn contains_ticker(&self, ticker: &str) -> bool {
        self.spans.contains_key(ticker)
    }

    /// Date-ordered rows of one ticker. Empty if the ticker is absent.
    pub fn series(&self, ticker: &str) -> &[PricePoint] {
        match self.spans.get(ticker) {
            Some(span) => &self.rows[span.clone()],
            None => &[],
        }
    }

    /// `(ticker, rows)` for every ticker, ascending by ticker.
    pub fn iter_series(&self) -> impl Iterator<Item = (&str, &[PricePoint])> {
        self.spans
            .iter()
            .map(|(ticker, span)| (ticker.as_str(), &self.rows[span.clone()]))
    }

    /// First and last date of one ticker.
    pub fn date_span(&self, ticker: &str) -> Option<(NaiveDate, NaiveDate)> {
        let s = self.series(ticker);
        Some((s.first()?.date, s.last()?.date))
    }

    /// Earliest and latest date across all tickers.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let min = self.rows.iter().map(|p| p.date).min()?;
        let max = self.rows.iter().map(|p| p.date).max()?;
        Some((min, max))
    }

    /// `(date, volume)` per row of one ticker.
    pub fn volume_series(&self, ticker: &str) -> Vec<(NaiveDate, u64)> {
        self.series(ticker)
            .iter()
            .map(|p| (p.date, p.volume))
            .collect()
    }

    /// Deterministic BLAKE3 hash over every row.
    ///
    /// Rows are already in (ticker, date) order, so the hash does not depend
    /// on file or map iteration order.
    pub fn dataset_hash(&self) -> DatasetHash {
        let mut hasher = blake3::Hasher::new();
        for p in &self.rows {
            hasher.update(p.ticker.as_bytes());
            hasher.update(p.date.to_string().as_bytes());
            hasher.update(&p.open.to_le_bytes());
            hasher.update(&p.high.to_le_bytes());
            hasher.update(&p.low.to_le_bytes());
            hasher.update(&p.close.to_le_bytes());
            hasher.update(&p.volume.to_le_bytes());
        }
        DatasetHash::from_hasher(hasher)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(ticker: &str, date: &str, close: f64) -> PricePoint {
        PricePoint {
            ticker: ticker.into(),
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 1_000,
        }
    }

    fn series(ticker: &str, file: &str, points: Vec<PricePoint>) -> Series {
        Series {
            ticker: ticker.into(),
            source: PathBuf::from(file),
            points,
        }
    }

    #[test]
    fn combine_sorts_unsorted_input() {
        let combined = combine(vec![
            series(
                "MSFT",
                "MSFT.csv",
                vec![point("MSFT", "2024-01-04", 3.0), point("MSFT", "2024-01-02", 1.0)],
            ),
            series(
                "AAPL",
                "AAPL.csv",
                vec![point("AAPL", "2024-01-03", 20.0), point("AAPL", "2024-01-02", 10.0)],
            ),
        ]);

        assert!(combined.warnings.is_empty());
        let table = combined.table;
        assert_eq!(table.tickers().collect::<Vec<_>>(), vec!["AAPL", "MSFT"]);
        assert_eq!(table.len(), 4);

        let aapl = table.series("AAPL");
        assert_eq!(aapl[0].close, 10.0);
        assert_eq!(aapl[1].close, 20.0);

        let msft = table.series("MSFT");
        assert!(msft.windows(2).all(|w| w[0].date < w[1].date));
    }

    #[test]
    fn duplicate_ticker_last_file_wins() {
        let combined = combine(vec![
            series("AAPL", "AAPL.csv", vec![point("AAPL", "2024-01-02", 1.0)]),
            series("AAPL", "AAPL.tsv", vec![point("AAPL", "2024-01-02", 2.0)]),
        ]);

        assert_eq!(combined.table.len(), 1);
        assert_eq!(combined.table.series("AAPL")[0].close, 2.0);
        assert_eq!(
            combined.warnings,
            vec![CombineWarning::DuplicateTicker {
                ticker: "AAPL".into(),
                replaced: PathBuf::from("AAPL.csv"),
                kept: PathBuf::from("AAPL.tsv"),
            }]
        );
    }

    #[test]
    fn duplicate_dates_keep_last_row() {
        let combined = combine(vec![series(
            "AAPL",
            "AAPL.csv",
            vec![
                point("AAPL", "2024-01-02", 1.0),
                point("AAPL", "2024-01-03", 5.0),
                point("AAPL", "2024-01-02", 9.0),
            ],
        )]);

        let aapl = combined.table.series("AAPL");
        assert_eq!(aapl.len(), 2);
        assert_eq!(aapl[0].close, 9.0);
        assert_eq!(
            combined.warnings,
            vec![CombineWarning::DuplicateDate {
                ticker: "AAPL".into(),
                dropped: 1,
            }]
        );
    }

    #[test]
    fn missing_ticker_is_empty_slice() {
        let table = CombinedTable::from_rows(vec![point("AAPL", "2024-01-02", 1.0)]);
        assert!(table.series("GOOG").is_empty());
        assert!(!table.contains_ticker("GOOG"));
        assert_eq!(table.date_span("GOOG"), None);
    }

    #[test]
    fn date_range_spans_all_tickers() {
        let table = CombinedTable::from_rows(vec![
            point("AAPL", "2024-01-05", 1.0),
            point("MSFT", "2024-01-02", 1.0),
            point("AAPL", "2024-01-03", 1.0),
        ]);
        let (min, max) = table.date_range().unwrap();
        assert_eq!(min.to_string(), "2024-01-02");
        assert_eq!(max.to_string(), "2024-01-05");
        assert_eq!(
            table.date_span("AAPL").map(|(a, b)| (a.to_string(), b.to_string())),
            Some(("2024-01-03".to_string(), "2024-01-05".to_string()))
        );
    }

    #[test]
    fn dataset_hash_ignores_input_order() {
        let a = CombinedTable::from_rows(vec![
            point("AAPL", "2024-01-02", 1.0),
            point("MSFT", "2024-01-02", 2.0),
        ]);
        let b = CombinedTable::from_rows(vec![
            point("MSFT", "2024-01-02", 2.0),
            point("AAPL", "2024-01-02", 1.0),
        ]);
        assert_eq!(a.dataset_hash(), b.dataset_hash());

        let c = CombinedTable::from_rows(vec![point("AAPL", "2024-01-02", 1.5)]);
        assert_ne!(a.dataset_hash(), c.dataset_hash());
    }

    #[test]
    fn empty_table() {
        let table = CombinedTable::from_rows(vec![]);
        assert!(table.is_empty());
        assert_eq!(table.tickers().count(), 0);
        assert_eq!(table.date_range(), None);
    }
}
