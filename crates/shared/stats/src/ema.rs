use hermes_core::Bar;

use crate::{Indicator, StatsError, check_period};

/// Exponential moving average of closes
///
/// alpha = 2 / (period + 1), seeded with the SMA of the first `period`
/// closes.
#[derive(Debug, Clone, Copy)]
pub struct Ema {
    period: usize,
}

impl Ema {
    pub fn new(period: usize) -> Result<Self, StatsError> {
        Ok(Self {
            period: check_period(period)?,
        })
    }

    fn alpha(&self) -> f64 {
        2.0 / (self.period as f64 + 1.0)
    }
}

impl Indicator for Ema {
    fn warm_up(&self) -> usize {
        self.period
    }

    fn offline(&self, window: &[Bar]) -> Vec<Option<f64>> {
        let mut values = vec![None; window.len()];
        if window.len() < self.period {
            return values;
        }
        let seed = window[..self.period].iter().map(|bar| bar.close).sum::<f64>()
            / self.period as f64;
        let alpha = self.alpha();
        let mut ema = seed;
        values[self.period - 1] = Some(seed);
        for (i, bar) in window.iter().enumerate().skip(self.period) {
            ema = alpha * bar.close + (1.0 - alpha) * ema;
            values[i] = Some(ema);
        }
        values
    }
}
