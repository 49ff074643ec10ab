use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One OHLCV interval for a fixed timeframe
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Open time of the interval
    pub time: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    /// Tick volume
    pub volume: i64,
}

impl Bar {
    /// High minus low
    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    /// True range against the previous close
    ///
    /// Falls back to the plain range when there is no previous bar.
    pub fn true_range(&self, previous_close: Option<f64>) -> f64 {
        match previous_close {
            Some(prev) => self
                .range()
                .max((self.high - prev).abs())
                .max((self.low - prev).abs()),
            None => self.range(),
        }
    }
}

/// Instantaneous quote
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    pub ask: f64,
    pub bid: f64,
}

impl Tick {
    /// Ask minus bid
    pub fn spread(&self) -> f64 {
        self.ask - self.bid
    }
}
