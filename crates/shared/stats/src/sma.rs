use hermes_core::Bar;

use crate::{Indicator, StatsError, check_period};

/// Simple moving average of closes
#[derive(Debug, Clone, Copy)]
pub struct Sma {
    period: usize,
}

impl Sma {
    pub fn new(period: usize) -> Result<Self, StatsError> {
        Ok(Self {
            period: check_period(period)?,
        })
    }
}

impl Indicator for Sma {
    fn warm_up(&self) -> usize {
        self.period
    }

    fn offline(&self, window: &[Bar]) -> Vec<Option<f64>> {
        let mut values = Vec::with_capacity(window.len());
        let mut sum = 0.0;
        for (i, bar) in window.iter().enumerate() {
            sum += bar.close;
            if i >= self.period {
                sum -= window[i - self.period].close;
            }
            values.push((i + 1 >= self.period).then(|| sum / self.period as f64));
        }
        values
    }

    fn online(&self, window: &[Bar]) -> Option<f64> {
        let start = window.len().checked_sub(self.period)?;
        let sum: f64 = window[start..].iter().map(|bar| bar.close).sum();
        Some(sum / self.period as f64)
    }
}
