//! Moving average crossover: golden cross and death cross detection.
//!
//! Fires Buy when the short MA crosses above the long MA.
//! Fires Sell when the short MA crosses below the long MA.
//!
//! Ties (short == long) count as "at or below", so:
//! - tie -> above fires Buy
//! - above -> tie fires nothing
//! - tie -> below fires Sell

use crate::domain::Action;
use serde::{Deserialize, Serialize};

/// Relative position of the short MA against the long MA on one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Regime {
    Above,
    AtOrBelow,
}

impl Regime {
    /// Regime of one row, or `None` when either average is undefined.
    pub fn of(short: Option<f64>, long: Option<f64>) -> Option<Self> {
        let (s, l) = (short?, long?);
        Some(if s > l { Regime::Above } else { Regime::AtOrBelow })
    }
}

/// Crossover action on row `i`, if any.
///
/// Requires both averages defined on rows `i` and `i - 1`; row 0 never fires.
pub fn crossover_at(short: &[Option<f64>], long: &[Option<f64>], i: usize) -> Option<Action> {
    if i == 0 {
        return None;
    }

    let short_cur = (*short.get(i)?)?;
    let long_cur = (*long.get(i)?)?;
    let short_prev = (*short.get(i - 1)?)?;
    let long_prev = (*long.get(i - 1)?)?;

    // Buy (golden cross): current short > long, previous short <= long.
    if short_cur > long_cur && short_prev <= long_prev {
        return Some(Action::Buy);
    }

    // Sell (death cross): current short < long, previous short >= long.
    if short_cur < long_cur && short_prev >= long_prev {
        return Some(Action::Sell);
    }

    None
}

/// Crossover action for every row of two aligned series.
pub fn detect_crossovers(short: &[Option<f64>], long: &[Option<f64>]) -> Vec<Option<Action>> {
    debug_assert_eq!(short.len(), long.len(), "MA series must be aligned");
    (0..short.len().min(long.len()))
        .map(|i| crossover_at(short, long, i))
        .collect()
}
