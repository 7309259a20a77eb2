//! StockDash Core: domain types, loading, combining, rolling indicators, crossovers.
//!
//! This crate contains the data side of the price dashboard:
//! - Domain types (price points, series, actions, signal events)
//! - Directory loader with per-file failure reporting
//! - Combiner producing one (ticker, date)-sorted table
//! - Simple moving average indicator
//! - Moving average crossover detection
//! - Deterministic synthetic sample data

pub mod data;
pub mod domain;
pub mod indicators;
pub mod signals;
