//! Filter → normalize → signal pipeline.
//!
//! `run_pipeline` is a pure function of the combined table and the
//! parameters. Stage-local problems are collected as warnings next to the
//! partial result; only invalid parameters abort a run.

use crate::config::{ConfigError, Parameters};
use crate::engine::{DerivedRow, SignalEngine};
use crate::filter::filter_table;
use crate::normalize::normalize;
use chrono::NaiveDate;
use stockdash_core::data::CombinedTable;
use stockdash_core::domain::{Action, SignalEvent};
use stockdash_core::signals::Regime;
use thiserror::Error;
use tracing::{info, warn};

/// Non-fatal problem found while running the pipeline.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PipelineWarning {
    #[error("ticker {ticker} selected but not present in the data")]
    UnknownTicker { ticker: String },

    #[error("{ticker}: first close on {date} is zero, cannot normalize; ticker skipped")]
    ZeroBase { ticker: String, date: NaiveDate },

    #[error("{ticker}: normalizing by base {base} overflows; ticker skipped")]
    NonFiniteRatio { ticker: String, base: f64 },
}

/// Everything one pipeline run produces.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput {
    /// Rows kept by the filter, before normalization.
    pub filtered: CombinedTable,
    /// Derived table, ticker-major then date-ascending.
    pub rows: Vec<DerivedRow>,
    pub signals: Vec<SignalEvent>,
    /// Regime on each ticker's last row, when both averages are defined.
    pub final_regimes: Vec<(String, Regime)>,
    pub warnings: Vec<PipelineWarning>,
}

impl PipelineOutput {
    pub fn buy_count(&self) -> usize {
        self.signals.iter().filter(|s| s.action == Action::Buy).count()
    }

    pub fn sell_count(&self) -> usize {
        self.signals.iter().filter(|s| s.action == Action::Sell).count()
    }
}

/// Run filter, normalization and the signal engine over `table`.
pub fn run_pipeline(
    table: &CombinedTable,
    params: &Parameters,
) -> Result<PipelineOutput, ConfigError> {
    params.validate()?;

    let mut warnings = Vec::new();

    let filtered = filter_table(table, params, &mut warnings);
    let prepared = normalize(&filtered, params.normalize, &mut warnings);
    let engine = SignalEngine::new(params.strategy);
    let out = engine.run(&prepared);

    for warning in &warnings {
        if matches!(warning, PipelineWarning::UnknownTicker { .. }) {
            warn!("{warning}");
        }
    }

    info!(
        tickers = prepared.len(),
        filtered_rows = filtered.len(),
        derived_rows = out.rows.len(),
        signals = out.signals.len(),
        warnings = warnings.len(),
        "pipeline complete"
    );

    Ok(PipelineOutput {
        filtered,
        rows: out.rows,
        signals: out.signals,
        final_regimes: out.final_regimes,
        warnings,
    })
}
