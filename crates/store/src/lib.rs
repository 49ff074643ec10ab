//! Hermes Store
//!
//! Persistent OHLCV history, one file per symbol and timeframe:
//!
//! ```text
//! {root}/{symbol}/{timeframe}/{name}.bin
//! ```
//!
//! Rows are kept sorted by bar time with at most one row per timestamp.
//! Saving a row whose timestamp is already stored replaces the stored row.

mod error;
mod ohlcv;

pub use error::StoreError;
pub use ohlcv::{LoadQuery, OhlcvStore, SaveReport};
