//! Rolling indicators over a single ticker's close series.
//!
//! Indicators are pure functions: a date-ordered close series in, one value
//! per input row out. Rows inside the warmup window have no value (`None`)
//! rather than NaN, so undefined values can never leak into exported tables.

pub mod sma;

pub use sma::Sma;

/// Trait for indicators.
///
/// # Look-ahead contamination guard
/// The value at row t may only depend on rows 0..=t of the same series.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "sma_20").
    fn name(&self) -> &str;

    /// Number of rows needed before the indicator produces a value.
    fn lookback(&self) -> usize;

    /// Compute the indicator over the whole series.
    ///
    /// Returns a `Vec` of the same length as `closes`; the first `lookback()`
    /// entries are `None`.
    fn compute(&self, closes: &[f64]) -> Vec<Option<f64>>;
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
