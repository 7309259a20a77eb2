//! Signal engine: per-ticker moving averages and crossover events.
//!
//! Each ticker is processed independently over its own date-ordered rows,
//! so averages never span two tickers.

use crate::config::Strategy;
use crate::normalize::PreparedSeries;
use chrono::NaiveDate;
use stockdash_core::domain::{Action, SignalEvent};
use stockdash_core::indicators::{Indicator, Sma};
use stockdash_core::signals::{detect_crossovers, Regime};
use tracing::debug;

/// One output row of the derived table.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedRow {
    pub date: NaiveDate,
    pub ticker: String,
    /// Raw close as loaded.
    pub close: f64,
    /// Close / first close, when normalization ran.
    pub normalized_close: Option<f64>,
    pub sma_short: Option<f64>,
    pub sma_long: Option<f64>,
    pub signal: Option<Action>,
    pub volume: u64,
}

impl DerivedRow {
    /// Normalized close when present, raw close otherwise.
    pub fn effective_close(&self) -> f64 {
        self.normalized_close.unwrap_or(self.close)
    }

    /// Numeric signal: 1 = Buy, -1 = Sell, 0 = none.
    pub fn signal_code(&self) -> i8 {
        self.signal.map_or(0, Action::code)
    }
}

/// Output of one engine run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineOutput {
    /// Every prepared row, ticker-major then date-ascending.
    pub rows: Vec<DerivedRow>,
    /// Rows that carry a signal, in the same order.
    pub signals: Vec<SignalEvent>,
    /// Short-vs-long regime on each ticker's last row, when defined.
    pub final_regimes: Vec<(String, Regime)>,
}

/// Computes moving averages and crossover signals for a strategy.
#[derive(Debug, Clone)]
pub struct SignalEngine {
    strategy: Strategy,
}

impl SignalEngine {
    /// Windows must already be validated (>= 1).
    pub fn new(strategy: Strategy) -> Self {
        Self { strategy }
    }

    pub fn run(&self, series: &[PreparedSeries]) -> EngineOutput {
        let mut out = EngineOutput::default();
        for s in series {
            self.run_series(s, &mut out);
        }
        out
    }

    fn run_series(&self, s: &PreparedSeries, out: &mut EngineOutput) {
        let n = s.len();
        let closes = s.effective_closes();

        let (sma_short, sma_long, signals) = match self.strategy {
            Strategy::None => (vec![None; n], vec![None; n], vec![None; n]),
            Strategy::MovingAverage { window } => {
                (Sma::new(window).compute(&closes), vec![None; n], vec![None; n])
            }
            Strategy::SmaCrossover {
                short_window,
                long_window,
            } => {
                let short = Sma::new(short_window).compute(&closes);
                let long = Sma::new(long_window).compute(&closes);
                let signals = detect_crossovers(&short, &long);
                (short, long, signals)
            }
        };

        let mut signal_count = 0;
        for (i, point) in s.points.iter().enumerate() {
            let signal = signals[i];
            if let Some(action) = signal {
                signal_count += 1;
                out.signals.push(SignalEvent {
                    date: point.date,
                    ticker: s.ticker.clone(),
                    close: closes[i],
                    action,
                });
            }

            out.rows.push(DerivedRow {
                date: point.date,
                ticker: s.ticker.clone(),
                close: point.close,
                normalized_close: s.normalized.as_ref().map(|v| v[i]),
                sma_short: sma_short[i],
                sma_long: sma_long[i],
                signal,
                volume: point.volume,
            });
        }

        if let Some(regime) = n
            .checked_sub(1)
            .and_then(|last| Regime::of(sma_short[last], sma_long[last]))
        {
            out.final_regimes.push((s.ticker.clone(), regime));
        }

        debug!(ticker = %s.ticker, rows = n, signals = signal_count, "signals computed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockdash_core::domain::PricePoint;

    fn prepared(ticker: &str, closes: &[f64]) -> PreparedSeries {
        let base = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        PreparedSeries {
            ticker: ticker.into(),
            points: closes
                .iter()
                .enumerate()
                .map(|(i, &close)| PricePoint {
                    ticker: ticker.into(),
                    date: base + chrono::Duration::days(i as i64),
                    open: close,
                    high: close,
                    low: close,
                    close,
                    volume: 100,
                })
                .collect(),
            normalized: None,
        }
    }

    fn crossover(short_window: usize, long_window: usize) -> SignalEngine {
        SignalEngine::new(Strategy::SmaCrossover {
            short_window,
            long_window,
        })
    }

    #[test]
    fn golden_sequence() {
        let out = crossover(2, 3).run(&[prepared("T", &[1.0, 2.0, 3.0, 2.0, 1.0, 2.0, 3.0, 4.0])]);

        let codes: Vec<i8> = out.rows.iter().map(|r| r.signal_code()).collect();
        assert_eq!(codes, vec![0, 0, 0, 0, -1, 0, 1, 0]);
        assert_eq!(out.signals.len(), 2);
        assert_eq!(out.signals[0].action, Action::Sell);
        assert_eq!(out.signals[0].close, 1.0);
        assert_eq!(out.signals[1].action, Action::Buy);
        assert_eq!(out.signals[1].close, 3.0);
        assert_eq!(out.final_regimes, vec![("T".to_string(), Regime::Above)]);
    }

    #[test]
    fn windows_do_not_leak_across_tickers() {
        let out = crossover(2, 3).run(&[prepared("A", &[1.0, 2.0]), prepared("B", &[3.0, 4.0, 5.0])]);

        let b_rows: Vec<&DerivedRow> = out.rows.iter().filter(|r| r.ticker == "B").collect();
        assert_eq!(b_rows[0].sma_short, None);
        assert_eq!(b_rows[1].sma_short, Some(3.5));
        assert_eq!(b_rows[1].sma_long, None);
        assert_eq!(b_rows[2].sma_long, Some(4.0));
    }

    #[test]
    fn window_longer_than_series_yields_nothing() {
        let out = crossover(5, 50).run(&[prepared("T", &[1.0, 2.0, 3.0, 2.0, 1.0])]);
        assert!(out.signals.is_empty());
        assert!(out.rows.iter().all(|r| r.sma_long.is_none()));
        assert!(out.final_regimes.is_empty());
    }

    #[test]
    fn inverted_windows_are_deterministic() {
        let closes = [1.0, 2.0, 3.0, 2.0, 1.0, 2.0, 3.0, 4.0];
        let a = crossover(3, 2).run(&[prepared("T", &closes)]);
        let b = crossover(3, 2).run(&[prepared("T", &closes)]);
        assert_eq!(a, b);
        // Swapping windows mirrors the actions.
        let actions: Vec<Action> = a.signals.iter().map(|s| s.action).collect();
        assert_eq!(actions, vec![Action::Buy, Action::Sell]);
    }

    #[test]
    fn none_strategy_has_no_averages() {
        let engine = SignalEngine::new(Strategy::None);
        let out = engine.run(&[prepared("T", &[1.0, 2.0, 3.0])]);
        assert_eq!(out.rows.len(), 3);
        assert!(out.signals.is_empty());
        assert!(out.rows.iter().all(|r| r.sma_short.is_none() && r.sma_long.is_none()));
    }

    #[test]
    fn moving_average_fills_short_column_only() {
        let engine = SignalEngine::new(Strategy::MovingAverage { window: 2 });
        let out = engine.run(&[prepared("T", &[1.0, 3.0, 5.0])]);
        let shorts: Vec<Option<f64>> = out.rows.iter().map(|r| r.sma_short).collect();
        assert_eq!(shorts, vec![None, Some(2.0), Some(4.0)]);
        assert!(out.rows.iter().all(|r| r.sma_long.is_none() && r.signal.is_none()));
    }

    #[test]
    fn normalized_series_drives_averages() {
        let mut s = prepared("T", &[2.0, 4.0, 6.0]);
        s.normalized = Some(vec![1.0, 2.0, 3.0]);
        let out = SignalEngine::new(Strategy::MovingAverage { window: 3 }).run(&[s]);
        assert_eq!(out.rows[2].sma_short, Some(2.0));
        assert_eq!(out.rows[2].close, 6.0);
        assert_eq!(out.rows[2].effective_close(), 3.0);
    }
}
