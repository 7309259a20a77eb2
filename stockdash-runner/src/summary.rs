//! Run summary and per-ticker volume view.

use crate::config::Parameters;
use crate::pipeline::PipelineOutput;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use stockdash_core::data::CombinedTable;
use stockdash_core::domain::{Action, DatasetHash, ParamsHash};
use stockdash_core::signals::Regime;

/// Per-ticker line of a [`RunSummary`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerSummary {
    pub ticker: String,
    pub rows: usize,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub buys: usize,
    pub sells: usize,
    pub total_volume: u64,
    /// Short-vs-long regime on the last row, when both averages are defined.
    pub last_regime: Option<Regime>,
}

/// Serializable record of one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub parameters: Parameters,
    pub dataset_hash: DatasetHash,
    pub params_hash: ParamsHash,
    pub tickers: Vec<TickerSummary>,
    pub total_rows: usize,
    pub buys: usize,
    pub sells: usize,
    pub total_volume: u64,
    /// Load failures, combine warnings and pipeline warnings, rendered.
    pub warnings: Vec<String>,
}

impl RunSummary {
    /// Summarize `output`. `load_messages` are prepended to the pipeline
    /// warnings.
    pub fn build(
        params: &Parameters,
        dataset_hash: DatasetHash,
        output: &PipelineOutput,
        load_messages: &[String],
    ) -> Self {
        let mut by_ticker: BTreeMap<&str, TickerSummary> = BTreeMap::new();

        for row in &output.rows {
            let entry = by_ticker
                .entry(row.ticker.as_str())
                .or_insert_with(|| TickerSummary {
                    ticker: row.ticker.clone(),
                    rows: 0,
                    first_date: row.date,
                    last_date: row.date,
                    buys: 0,
                    sells: 0,
                    total_volume: 0,
                    last_regime: None,
                });
            entry.rows += 1;
            entry.first_date = entry.first_date.min(row.date);
            entry.last_date = entry.last_date.max(row.date);
            entry.total_volume = entry.total_volume.saturating_add(row.volume);
            match row.signal {
                Some(Action::Buy) => entry.buys += 1,
                Some(Action::Sell) => entry.sells += 1,
                None => {}
            }
        }

        for (ticker, regime) in &output.final_regimes {
            if let Some(entry) = by_ticker.get_mut(ticker.as_str()) {
                entry.last_regime = Some(*regime);
            }
        }

        let tickers: Vec<TickerSummary> = by_ticker.into_values().collect();
        let warnings = load_messages
            .iter()
            .cloned()
            .chain(output.warnings.iter().map(|w| w.to_string()))
            .collect();

        Self {
            parameters: params.clone(),
            dataset_hash,
            params_hash: params.fingerprint(),
            total_rows: output.rows.len(),
            buys: tickers.iter().map(|t| t.buys).sum(),
            sells: tickers.iter().map(|t| t.sells).sum(),
            total_volume: tickers
                .iter()
                .fold(0u64, |acc, t| acc.saturating_add(t.total_volume)),
            tickers,
            warnings,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

/// `(date, volume)` series per ticker of a table.
pub fn volume_by_ticker(table: &CombinedTable) -> BTreeMap<String, Vec<(NaiveDate, u64)>> {
    table
        .tickers()
        .map(|t| (t.to_string(), table.volume_series(t)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Strategy;
    use crate::pipeline::run_pipeline;
    use stockdash_core::domain::PricePoint;

    fn table() -> CombinedTable {
        let base = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let mut rows = Vec::new();
        for (i, &close) in [1.0, 2.0, 3.0, 2.0, 1.0, 2.0, 3.0, 4.0].iter().enumerate() {
            for ticker in ["A", "B"] {
                rows.push(PricePoint {
                    ticker: ticker.into(),
                    date: base + chrono::Duration::days(i as i64),
                    open: close,
                    high: close,
                    low: close,
                    close,
                    volume: 10 * (i as u64 + 1),
                });
            }
        }
        CombinedTable::from_rows(rows)
    }

    fn params() -> Parameters {
        Parameters {
            tickers: ["A", "B", "C"].into_iter().map(String::from).collect(),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
            normalize: false,
            strategy: Strategy::SmaCrossover {
                short_window: 2,
                long_window: 3,
            },
        }
    }

    #[test]
    fn totals_add_up() {
        let t = table();
        let p = params();
        let out = run_pipeline(&t, &p).unwrap();
        let summary = RunSummary::build(&p, t.dataset_hash(), &out, &["load note".into()]);

        assert_eq!(summary.tickers.len(), 2);
        assert_eq!(summary.total_rows, 16);
        assert_eq!(summary.buys, 2);
        assert_eq!(summary.sells, 2);
        // 10 + 20 + ... + 80 per ticker
        assert_eq!(summary.tickers[0].total_volume, 360);
        assert_eq!(summary.total_volume, 720);
        assert_eq!(summary.tickers[0].last_regime, Some(Regime::Above));
        assert_eq!(summary.warnings.len(), 2);
        assert_eq!(summary.warnings[0], "load note");
        assert!(summary.warnings[1].contains('C'));
    }

    #[test]
    fn json_roundtrip() {
        let t = table();
        let p = params();
        let out = run_pipeline(&t, &p).unwrap();
        let summary = RunSummary::build(&p, t.dataset_hash(), &out, &[]);

        let json = summary.to_json().unwrap();
        assert!(json.contains("\"params_hash\""));
        assert_eq!(RunSummary::from_json(&json).unwrap(), summary);
    }

    #[test]
    fn volume_view_per_ticker() {
        let view = volume_by_ticker(&table());
        assert_eq!(view.len(), 2);
        assert_eq!(view["A"].len(), 8);
        assert_eq!(view["A"][0].1, 10);
        assert_eq!(view["B"][7].1, 80);
    }
}
