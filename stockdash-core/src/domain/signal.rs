//! Crossover actions and the events derived from them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of a crossover event.
///
/// Serialized as `Buy` / `Sell`, which is also the exported text form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Buy,
    Sell,
}

impl Action {
    /// Numeric signal code: Buy = 1, Sell = -1.
    pub fn code(self) -> i8 {
        match self {
            Action::Buy => 1,
            Action::Sell => -1,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Buy => write!(f, "Buy"),
            Action::Sell => write!(f, "Sell"),
        }
    }
}

/// A crossover observed on one ticker's row.
///
/// `close` is the value the moving averages were computed from, so it is the
/// normalized close when normalization is on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SignalEvent {
    pub date: NaiveDate,
    pub ticker: String,
    pub close: f64,
    pub action: Action,
}
