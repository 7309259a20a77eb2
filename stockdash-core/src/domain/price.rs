//! PricePoint: one daily OHLCV record for one ticker.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Daily OHLCV record tagged with its ticker.
///
/// Created by the loader and never mutated afterwards. Derived values
/// (normalized close, moving averages, signals) live in separate structures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub ticker: String,
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// All rows loaded from one input file.
///
/// `points` is in file order until the combiner sorts it.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub ticker: String,
    /// File the rows came from.
    pub source: PathBuf,
    pub points: Vec<PricePoint>,
}

impl Series {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// True if dates are strictly ascending.
    pub fn is_chronological(&self) -> bool {
        self.points.windows(2).all(|w| w[0].date < w[1].date)
    }
}
