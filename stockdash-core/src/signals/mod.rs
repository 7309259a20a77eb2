//! Crossover signal detection
//!
//! Signals are pure functions of two aligned moving-average series. They
//! never see prices directly, and never carry state between runs.

pub mod crossover;

pub use crossover::{crossover_at, detect_crossovers, Regime};
