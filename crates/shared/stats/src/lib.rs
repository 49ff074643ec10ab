//! Hermes Stats
//!
//! Technical indicators computed over a window of bars. Every indicator
//! offers two modes:
//! - `offline`: full recompute, one value per bar (`None` during warm-up)
//! - `online`: only the newest value, for the live bar-by-bar path
//!
//! [`IndicatorSet`] groups named indicators so a strategy can compute a
//! whole feature frame or the newest feature row in one call.

mod atr;
mod ema;
mod sma;

pub use atr::Atr;
pub use ema::Ema;
pub use sma::Sma;

use hermes_core::Bar;
use indexmap::IndexMap;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StatsError {
    #[error("Indicator period must be positive, got {0}")]
    InvalidPeriod(usize),
}

fn check_period(period: usize) -> Result<usize, StatsError> {
    if period == 0 {
        Err(StatsError::InvalidPeriod(period))
    } else {
        Ok(period)
    }
}

/// A technical indicator over a window of bars
pub trait Indicator: Send {
    /// Number of bars before the first value is produced
    fn warm_up(&self) -> usize;

    /// One value per bar of `window`
    fn offline(&self, window: &[Bar]) -> Vec<Option<f64>>;

    /// Value at the newest bar of `window`
    fn online(&self, window: &[Bar]) -> Option<f64> {
        self.offline(window).last().copied().flatten()
    }
}

/// Named indicator columns, one value per bar
pub type FeatureFrame = IndexMap<String, Vec<Option<f64>>>;

/// Named indicator values at the newest bar
pub type FeatureRow = IndexMap<String, Option<f64>>;

/// Ordered set of named indicators
#[derive(Default)]
pub struct IndicatorSet {
    indicators: IndexMap<String, Box<dyn Indicator>>,
}

impl IndicatorSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an indicator; a name already present is replaced in place
    pub fn with(mut self, name: impl Into<String>, indicator: impl Indicator + 'static) -> Self {
        self.indicators.insert(name.into(), Box::new(indicator));
        self
    }

    pub fn len(&self) -> usize {
        self.indicators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indicators.is_empty()
    }

    /// Bars needed before every indicator has a value
    pub fn warm_up(&self) -> usize {
        self.indicators
            .values()
            .map(|indicator| indicator.warm_up())
            .max()
            .unwrap_or(0)
    }

    /// Full recompute over `window`
    pub fn offline(&self, window: &[Bar]) -> FeatureFrame {
        self.indicators
            .iter()
            .map(|(name, indicator)| (name.clone(), indicator.offline(window)))
            .collect()
    }

    /// Newest row only
    pub fn online(&self, window: &[Bar]) -> FeatureRow {
        self.indicators
            .iter()
            .map(|(name, indicator)| (name.clone(), indicator.online(window)))
            .collect()
    }
}

#[cfg(test)]
pub(crate) mod test_bars {
    use chrono::{DateTime, Duration, Utc};
    use hermes_core::Bar;

    /// Hourly bars from (high, low, close); open equals the previous close
    pub fn bars(rows: &[(f64, f64, f64)]) -> Vec<Bar> {
        let start = DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap();
        let mut previous = rows.first().map(|row| row.2).unwrap_or(0.0);
        rows.iter()
            .enumerate()
            .map(|(i, &(high, low, close))| {
                let bar = Bar {
                    time: start + Duration::hours(i as i64),
                    open: previous,
                    high,
                    low,
                    close,
                    volume: 100,
                };
                previous = close;
                bar
            })
            .collect()
    }

    /// Bars with a flat range around each close
    pub fn closes(values: &[f64]) -> Vec<Bar> {
        let rows: Vec<_> = values.iter().map(|&c| (c + 0.5, c - 0.5, c)).collect();
        bars(&rows)
    }
}
