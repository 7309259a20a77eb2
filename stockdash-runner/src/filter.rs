//! Ticker and date-range selection.

use crate::config::Parameters;
use crate::pipeline::PipelineWarning;
use stockdash_core::data::CombinedTable;
use tracing::debug;

/// Rows of the selected tickers whose date lies in the inclusive range.
///
/// Output is a new table in (ticker, date) order. An empty selection or a
/// start date after the end date yields an empty table. Selected tickers
/// absent from the table are reported as [`PipelineWarning::UnknownTicker`].
pub fn filter_table(
    table: &CombinedTable,
    params: &Parameters,
    warnings: &mut Vec<PipelineWarning>,
) -> CombinedTable {
    let mut rows = Vec::new();

    for ticker in &params.tickers {
        if !table.contains_ticker(ticker) {
            warnings.push(PipelineWarning::UnknownTicker {
                ticker: ticker.clone(),
            });
            continue;
        }

        let before = rows.len();
        rows.extend(
            table
                .series(ticker)
                .iter()
                .filter(|p| params.in_range(p.date))
                .cloned(),
        );
        debug!(ticker = %ticker, rows = rows.len() - before, "filtered");
    }

    CombinedTable::from_rows(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use stockdash_core::domain::PricePoint;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn point(ticker: &str, date: NaiveDate, close: f64) -> PricePoint {
        PricePoint {
            ticker: ticker.into(),
            date,
            open: close,
            high: close,
            low: close,
            close,
            volume: 10,
        }
    }

    fn table() -> CombinedTable {
        let mut rows = Vec::new();
        for day in 1..=10 {
            rows.push(point("AAPL", ymd(2024, 1, day), day as f64));
            rows.push(point("MSFT", ymd(2024, 1, day), 100.0 + day as f64));
            rows.push(point("GOOG", ymd(2024, 1, day), 200.0 + day as f64));
        }
        CombinedTable::from_rows(rows)
    }

    fn params(tickers: &[&str], start: NaiveDate, end: NaiveDate) -> Parameters {
        Parameters {
            tickers: tickers.iter().map(|t| t.to_string()).collect(),
            start_date: start,
            end_date: end,
            ..Parameters::default()
        }
    }

    #[test]
    fn keeps_selected_tickers_in_range() {
        let mut warnings = Vec::new();
        let p = params(&["AAPL", "GOOG"], ymd(2024, 1, 3), ymd(2024, 1, 5));
        let out = filter_table(&table(), &p, &mut warnings);

        assert!(warnings.is_empty());
        assert_eq!(out.tickers().collect::<Vec<_>>(), vec!["AAPL", "GOOG"]);
        let aapl: Vec<f64> = out.series("AAPL").iter().map(|p| p.close).collect();
        assert_eq!(aapl, vec![3.0, 4.0, 5.0]);
        assert_eq!(out.series("GOOG").len(), 3);
        assert!(out.series("MSFT").is_empty());
    }

    #[test]
    fn range_bounds_are_inclusive() {
        let mut warnings = Vec::new();
        let p = params(&["AAPL"], ymd(2024, 1, 4), ymd(2024, 1, 4));
        let out = filter_table(&table(), &p, &mut warnings);
        assert_eq!(out.len(), 1);
        assert_eq!(out.rows()[0].date, ymd(2024, 1, 4));
    }

    #[test]
    fn empty_selection_is_empty_not_error() {
        let mut warnings = Vec::new();
        let p = params(&[], ymd(2024, 1, 1), ymd(2024, 1, 10));
        let out = filter_table(&table(), &p, &mut warnings);
        assert!(out.is_empty());
        assert!(warnings.is_empty());
    }

    #[test]
    fn inverted_range_is_empty() {
        let mut warnings = Vec::new();
        let p = params(&["AAPL"], ymd(2024, 1, 8), ymd(2024, 1, 2));
        assert!(filter_table(&table(), &p, &mut warnings).is_empty());
    }

    #[test]
    fn unknown_ticker_warns() {
        let mut warnings = Vec::new();
        let p = params(&["AAPL", "TSLA"], ymd(2024, 1, 1), ymd(2024, 1, 10));
        let out = filter_table(&table(), &p, &mut warnings);
        assert_eq!(out.len(), 10);
        assert_eq!(
            warnings,
            vec![PipelineWarning::UnknownTicker {
                ticker: "TSLA".into()
            }]
        );
    }
}
