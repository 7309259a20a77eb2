//! Domain types for StockDash

pub mod ids;
pub mod price;
pub mod signal;

pub use ids::{DatasetHash, ParamsHash};
pub use price::{PricePoint, Series};
pub use signal::{Action, SignalEvent};
