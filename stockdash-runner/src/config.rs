//! Serializable pipeline parameters.
//!
//! A `Parameters` value captures everything a pipeline run depends on besides
//! the input table. Runs are pure functions of (table, parameters), so two
//! runs with equal parameters over the same data produce equal output.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use stockdash_core::domain::ParamsHash;
use thiserror::Error;

/// Errors from loading or validating parameters.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("{name} must be a positive integer, got {value}")]
    InvalidWindow { name: &'static str, value: usize },
}

/// Immutable parameter set for one pipeline run.
///
/// Missing TOML keys fall back to [`Parameters::default`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Parameters {
    /// Tickers to keep. Empty selects nothing.
    pub tickers: BTreeSet<String>,

    /// First date kept (inclusive)
    pub start_date: NaiveDate,

    /// Last date kept (inclusive)
    pub end_date: NaiveDate,

    /// Rescale each ticker's close to its first in-range close.
    pub normalize: bool,

    pub strategy: Strategy,
}

/// Moving-average strategy applied after filtering and normalization.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Strategy {
    /// No moving averages, no signals.
    None,

    /// Short MA crossing a long MA emits Buy/Sell events.
    SmaCrossover {
        short_window: usize,
        long_window: usize,
    },

    /// Single overlay MA, no signals.
    MovingAverage { window: usize },
}

impl Default for Strategy {
    fn default() -> Self {
        Strategy::SmaCrossover {
            short_window: 20,
            long_window: 50,
        }
    }
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            tickers: ["AAPL", "MSFT"].into_iter().map(String::from).collect(),
            start_date: NaiveDate::from_ymd_opt(2021, 1, 1).unwrap_or_default(),
            end_date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap_or_default(),
            normalize: false,
            strategy: Strategy::default(),
        }
    }
}

impl Parameters {
    /// Load parameters from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse parameters from a TOML string and validate them.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let params: Parameters = toml::from_str(content)?;
        params.validate()?;
        Ok(params)
    }

    /// Check window sizes. Inverted windows (short >= long) are allowed.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.strategy {
            Strategy::None => Ok(()),
            Strategy::SmaCrossover {
                short_window,
                long_window,
            } => {
                check_window("short_window", short_window)?;
                check_window("long_window", long_window)
            }
            Strategy::MovingAverage { window } => check_window("window", window),
        }
    }

    /// True when `date` falls within the inclusive date range.
    pub fn in_range(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    /// Deterministic hash of every parameter.
    ///
    /// `tickers` is a `BTreeSet`, so selection order does not matter.
    pub fn fingerprint(&self) -> ParamsHash {
        let tickers: Vec<&str> = self.tickers.iter().map(|t| t.as_str()).collect();
        let canonical = format!(
            "tickers={}|start={}|end={}|normalize={}|strategy={:?}",
            tickers.join(","),
            self.start_date,
            self.end_date,
            self.normalize,
            self.strategy,
        );
        ParamsHash::from_bytes(canonical.as_bytes())
    }
}

fn check_window(name: &'static str, value: usize) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::InvalidWindow { name, value });
    }
    Ok(())
}
