//! StockDash Runner: parameters, pipeline, signal engine, export.
//!
//! This crate builds on `stockdash-core` to provide:
//! - Directory loading with combine warnings and dataset hashing
//! - TOML-loadable run parameters and strategy selection
//! - The filter → normalize → signal pipeline
//! - CSV/JSON export of the derived table, the signals and a run summary

pub mod config;
pub mod data_loader;
pub mod engine;
pub mod export;
pub mod filter;
pub mod normalize;
pub mod pipeline;
pub mod summary;

pub use config::{ConfigError, Parameters, Strategy};
pub use data_loader::{load_data, LoadError, LoadedData};
pub use engine::{DerivedRow, EngineOutput, SignalEngine};
pub use export::{
    export_derived_csv, export_signals_csv, import_derived_csv, import_signals_csv, save_outputs,
    DerivedRecord, SavedOutputs,
};
pub use filter::filter_table;
pub use normalize::{normalize, PreparedSeries};
pub use pipeline::{run_pipeline, PipelineOutput, PipelineWarning};
pub use summary::{volume_by_ticker, RunSummary, TickerSummary};
