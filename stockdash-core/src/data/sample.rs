//! Synthetic sample data for demos and tests.
//!
//! Produces a random walk from a starting price of 100.0, weekdays only.
//! The RNG is seeded from the ticker name, so the same ticker and range
//! always produce the same rows.

use crate::domain::PricePoint;
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::Path;

/// Generate deterministic synthetic rows for `ticker` over `[start, end]`.
pub fn generate_sample_series(ticker: &str, start: NaiveDate, end: NaiveDate) -> Vec<PricePoint> {
    let seed: [u8; 32] = *blake3::hash(ticker.as_bytes()).as_bytes();
    let mut rng = StdRng::from_seed(seed);

    let mut points = Vec::new();
    let mut price = 100.0_f64;
    let mut current = start;

    while current <= end {
        if matches!(current.weekday(), Weekday::Sat | Weekday::Sun) {
            current += Duration::days(1);
            continue;
        }

        let daily_return: f64 = rng.gen_range(-0.03..0.03);
        let open = price;
        let close = price * (1.0 + daily_return);
        let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
        let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));
        let volume = rng.gen_range(500_000..5_000_000u64);

        points.push(PricePoint {
            ticker: ticker.to_string(),
            date: current,
            open,
            high,
            low,
            close,
            volume,
        });

        price = close;
        current += Duration::days(1);
    }

    points
}

/// Write rows as a `Date,Open,High,Low,Close,Volume` CSV file.
pub fn write_sample_csv(path: &Path, points: &[PricePoint]) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(["Date", "Open", "High", "Low", "Close", "Volume"])?;
    for p in points {
        wtr.write_record([
            p.date.to_string(),
            format!("{:.4}", p.open),
            format!("{:.4}", p.high),
            format!("{:.4}", p.low),
            format!("{:.4}", p.close),
            p.volume.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}
