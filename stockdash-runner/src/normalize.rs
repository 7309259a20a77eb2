//! Per-ticker close normalization.
//!
//! Each ticker's closes are divided by its first close inside the filtered
//! range, so every normalized series starts at exactly 1.0. Raw closes are
//! kept untouched next to the normalized values.

use crate::pipeline::PipelineWarning;
use stockdash_core::data::CombinedTable;
use stockdash_core::domain::PricePoint;
use tracing::warn;

/// One ticker's filtered rows, ready for the signal engine.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedSeries {
    pub ticker: String,
    /// Date-ordered raw rows.
    pub points: Vec<PricePoint>,
    /// `close / base` per row. `None` when normalization is off.
    pub normalized: Option<Vec<f64>>,
}

impl PreparedSeries {
    /// Close used for averaging: normalized when present, raw otherwise.
    pub fn effective_close(&self, i: usize) -> f64 {
        match &self.normalized {
            Some(values) => values[i],
            None => self.points[i].close,
        }
    }

    pub fn effective_closes(&self) -> Vec<f64> {
        (0..self.points.len()).map(|i| self.effective_close(i)).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Split the filtered table per ticker, normalizing when `enabled`.
///
/// A ticker whose base close is zero (or whose ratios would not be finite)
/// is dropped with a warning; division is never attempted on a zero base.
pub fn normalize(
    filtered: &CombinedTable,
    enabled: bool,
    warnings: &mut Vec<PipelineWarning>,
) -> Vec<PreparedSeries> {
    let mut prepared = Vec::new();

    for (ticker, rows) in filtered.iter_series() {
        if rows.is_empty() {
            continue;
        }

        let normalized = if enabled {
            match normalized_closes(rows) {
                Ok(values) => Some(values),
                Err(warning) => {
                    warn!("{warning}");
                    warnings.push(warning);
                    continue;
                }
            }
        } else {
            None
        };

        prepared.push(PreparedSeries {
            ticker: ticker.to_string(),
            points: rows.to_vec(),
            normalized,
        });
    }

    prepared
}

fn normalized_closes(rows: &[PricePoint]) -> Result<Vec<f64>, PipelineWarning> {
    let first = &rows[0];
    let base = first.close;

    if base == 0.0 {
        return Err(PipelineWarning::ZeroBase {
            ticker: first.ticker.clone(),
            date: first.date,
        });
    }

    let values: Vec<f64> = rows.iter().map(|p| p.close / base).collect();
    if values.iter().any(|v| !v.is_finite()) {
        return Err(PipelineWarning::NonFiniteRatio {
            ticker: first.ticker.clone(),
            base,
        });
    }

    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn table(ticker: &str, closes: &[f64]) -> CombinedTable {
        let base = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        CombinedTable::from_rows(
            closes
                .iter()
                .enumerate()
                .map(|(i, &close)| PricePoint {
                    ticker: ticker.into(),
                    date: base + chrono::Duration::days(i as i64),
                    open: close,
                    high: close,
                    low: close,
                    close,
                    volume: 1,
                })
                .collect(),
        )
    }

    #[test]
    fn first_value_is_exactly_one() {
        let mut warnings = Vec::new();
        let out = normalize(&table("AAPL", &[4.0, 5.0, 2.0]), true, &mut warnings);

        let values = out[0].normalized.as_ref().unwrap();
        assert_eq!(values[0], 1.0);
        assert_eq!(values[1], 5.0 / 4.0);
        assert_eq!(values[2], 0.5);
        assert!(warnings.is_empty());
    }

    #[test]
    fn raw_close_is_preserved() {
        let mut warnings = Vec::new();
        let out = normalize(&table("AAPL", &[4.0, 8.0]), true, &mut warnings);
        assert_eq!(out[0].points[1].close, 8.0);
        assert_eq!(out[0].effective_close(1), 2.0);
    }

    #[test]
    fn disabled_passes_raw_closes() {
        let mut warnings = Vec::new();
        let out = normalize(&table("AAPL", &[4.0, 8.0]), false, &mut warnings);
        assert!(out[0].normalized.is_none());
        assert_eq!(out[0].effective_closes(), vec![4.0, 8.0]);
    }

    #[test]
    fn zero_base_is_skipped_with_warning() {
        let mut warnings = Vec::new();
        let out = normalize(&table("ZERO", &[0.0, 1.0, 2.0]), true, &mut warnings);
        assert!(out.is_empty());
        assert!(matches!(
            warnings.as_slice(),
            [PipelineWarning::ZeroBase { ticker, .. }] if ticker == "ZERO"
        ));
    }

    #[test]
    fn zero_base_without_normalization_is_fine() {
        let mut warnings = Vec::new();
        let out = normalize(&table("ZERO", &[0.0, 1.0]), false, &mut warnings);
        assert_eq!(out.len(), 1);
        assert!(warnings.is_empty());
    }

    #[test]
    fn overflowing_ratio_is_skipped() {
        let mut warnings = Vec::new();
        let out = normalize(&table("TINY", &[1e-300, 1e300]), true, &mut warnings);
        assert!(out.is_empty());
        assert!(matches!(
            warnings.as_slice(),
            [PipelineWarning::NonFiniteRatio { .. }]
        ));
    }

    #[test]
    fn empty_table_is_noop() {
        let mut warnings = Vec::new();
        assert!(normalize(&CombinedTable::default(), true, &mut warnings).is_empty());
        assert!(warnings.is_empty());
    }
}
