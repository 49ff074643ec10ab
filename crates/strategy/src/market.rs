//! Market state shared by the built-in strategies
//!
//! [`History`] buffers closed bars and persists them to the OHLCV store.
//! [`MarketWindow`] keeps the newest bars and their indicator features.

use hermes_core::{Bar, SymbolInfo};
use hermes_stats::{Atr, FeatureRow, IndicatorSet, StatsError};
use hermes_store::{LoadQuery, OhlcvStore, SaveReport};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Indicator and window settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketParams {
    /// ATR lookback in bars
    #[serde(default = "default_atr_period")]
    pub atr_period: usize,

    /// Bars kept for indicator computation
    #[serde(default = "default_window_size")]
    pub window_size: usize,
}

fn default_atr_period() -> usize {
    14
}

fn default_window_size() -> usize {
    100
}

impl Default for MarketParams {
    fn default() -> Self {
        Self {
            atr_period: default_atr_period(),
            window_size: default_window_size(),
        }
    }
}

/// Closed bars not yet written to the store
#[derive(Debug)]
pub struct History {
    store: Option<OhlcvStore>,
    pending: Vec<Bar>,
}

impl History {
    pub fn new(store: Option<OhlcvStore>) -> Self {
        Self {
            store,
            pending: Vec::new(),
        }
    }

    pub fn record(&mut self, bar: &Bar) {
        self.pending.push(*bar);
    }

    pub fn pending(&self) -> &[Bar] {
        &self.pending
    }

    pub fn store(&self) -> Option<&OhlcvStore> {
        self.store.as_ref()
    }

    /// Write pending bars to the store
    ///
    /// Failures are logged and the bars stay pending; a strategy action has
    /// no error channel back to the platform.
    pub fn persist(&mut self) -> Option<SaveReport> {
        let store = self.store.as_ref()?;
        match store.save(&self.pending) {
            Ok(report) => {
                self.pending.clear();
                Some(report)
            }
            Err(e) => {
                log::error!("Failed to persist {} bars: {}", self.pending.len(), e);
                None
            }
        }
    }

    /// Persist, then compact the store file
    pub fn persist_and_compact(&mut self) {
        self.persist();
        if let Some(store) = &self.store {
            if let Err(e) = store.compact() {
                log::error!("Failed to compact {}: {}", store.path().display(), e);
            }
        }
    }

    /// Newest `n` stored bars, or nothing without a store
    pub fn load_tail(&self, n: usize) -> Vec<Bar> {
        let Some(store) = &self.store else {
            return Vec::new();
        };
        store.load(&LoadQuery::tail(n)).unwrap_or_else(|e| {
            log::error!("Failed to load history: {}", e);
            Vec::new()
        })
    }
}

/// Newest bars and their features
pub struct MarketWindow {
    bars: VecDeque<Bar>,
    capacity: usize,
    indicators: IndicatorSet,
    atr_name: String,
    features: FeatureRow,
    symbol: Option<SymbolInfo>,
}

impl MarketWindow {
    pub fn new(params: &MarketParams) -> Result<Self, StatsError> {
        let atr_name = format!("ATR_{}", params.atr_period);
        let indicators = IndicatorSet::new().with(atr_name.clone(), Atr::new(params.atr_period)?);
        Ok(Self {
            bars: VecDeque::with_capacity(params.window_size),
            capacity: params.window_size.max(1),
            indicators,
            atr_name,
            features: FeatureRow::new(),
            symbol: None,
        })
    }

    pub fn set_symbol(&mut self, symbol: SymbolInfo) {
        self.symbol = Some(symbol);
    }

    pub fn symbol(&self) -> Option<&SymbolInfo> {
        self.symbol.as_ref()
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    fn append(&mut self, bar: &Bar) {
        // Replaying the still-forming bar replaces it
        if self.bars.back().is_some_and(|last| last.time == bar.time) {
            self.bars.pop_back();
        }
        self.bars.push_back(*bar);
        while self.bars.len() > self.capacity {
            self.bars.pop_front();
        }
    }

    /// Buffer a bar without recomputing features
    pub fn warm(&mut self, bar: &Bar) {
        self.append(bar);
    }

    /// Replace the window with the newest of `bars` and recompute offline
    pub fn seed(&mut self, bars: &[Bar]) {
        self.bars.clear();
        for bar in bars {
            self.append(bar);
        }
        let window = self.bars.make_contiguous();
        let frame = self.indicators.offline(window);
        self.features = frame
            .into_iter()
            .map(|(name, values)| (name, values.last().copied().flatten()))
            .collect();
    }

    /// Append one bar and recompute the newest features
    pub fn push(&mut self, bar: &Bar) {
        self.append(bar);
        let window = self.bars.make_contiguous();
        self.features = self.indicators.online(window);
    }

    /// Recompute offline over the bars already buffered
    pub fn recompute(&mut self) {
        let bars: Vec<Bar> = self.bars.iter().copied().collect();
        self.seed(&bars);
    }

    pub fn features(&self) -> &FeatureRow {
        &self.features
    }

    /// Newest ATR, once warmed up
    pub fn atr(&self) -> Option<f64> {
        self.features.get(&self.atr_name).copied().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, Utc};

    fn bar(i: i64, range: f64) -> Bar {
        Bar {
            time: DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap() + Duration::hours(i),
            open: 1.0,
            high: 1.0 + range,
            low: 1.0,
            close: 1.0,
            volume: 1,
        }
    }

    #[test]
    fn test_window_caps_and_tracks_atr() {
        let params = MarketParams {
            atr_period: 2,
            window_size: 4,
        };
        let mut window = MarketWindow::new(&params).unwrap();
        for i in 0..6 {
            window.push(&bar(i, 0.01));
        }
        assert_eq!(window.len(), 4);
        assert!((window.atr().unwrap() - 0.01).abs() < 1e-12);
    }

    #[test]
    fn test_same_timestamp_replaces_last_bar() {
        let mut window = MarketWindow::new(&MarketParams::default()).unwrap();
        window.warm(&bar(0, 0.01));
        window.warm(&bar(0, 0.02));
        assert_eq!(window.len(), 1);
    }

    #[test]
    fn test_seed_without_enough_bars_has_no_atr() {
        let mut window = MarketWindow::new(&MarketParams::default()).unwrap();
        window.seed(&[bar(0, 0.01), bar(1, 0.01)]);
        assert_eq!(window.atr(), None);
    }

    #[test]
    fn test_history_without_store_keeps_pending() {
        let mut history = History::new(None);
        history.record(&bar(0, 0.01));
        assert_eq!(history.persist(), None);
        assert_eq!(history.pending().len(), 1);
        assert!(history.load_tail(10).is_empty());
    }
}
