//! Simple Moving Average (SMA).
//!
//! Mean of the trailing `period` closes ending at each row.
//! Lookback: period - 1 (first value at index period-1).
//! A window whose sum overflows has no defined mean and yields `None`.

use super::Indicator;

#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
    name: String,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "SMA period must be >= 1");
        Self {
            period,
            name: format!("sma_{period}"),
        }
    }
}

impl Indicator for Sma {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, closes: &[f64]) -> Vec<Option<f64>> {
        let n = closes.len();
        let mut result = vec![None; n];

        if n < self.period {
            return result;
        }

        // Sum each window from scratch: equal windows must give bit-identical means.
        for (i, window) in closes.windows(self.period).enumerate() {
            let sum: f64 = window.iter().sum();
            let mean = sum / self.period as f64;
            result[i + self.period - 1] = mean.is_finite().then_some(mean);
        }

        result
    }
}
