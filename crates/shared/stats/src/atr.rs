use hermes_core::Bar;

use crate::{Indicator, StatsError, check_period};

/// Average true range with Wilder smoothing
///
/// The first value sits at index `period`: the mean true range of bars
/// `1..=period`, each measured against the previous close. Later values
/// follow `atr = (atr * (period - 1) + tr) / period`.
#[derive(Debug, Clone, Copy)]
pub struct Atr {
    period: usize,
}

impl Atr {
    pub fn new(period: usize) -> Result<Self, StatsError> {
        Ok(Self {
            period: check_period(period)?,
        })
    }
}

impl Indicator for Atr {
    fn warm_up(&self) -> usize {
        self.period + 1
    }

    fn offline(&self, window: &[Bar]) -> Vec<Option<f64>> {
        let mut values = vec![None; window.len()];
        if window.len() <= self.period {
            return values;
        }
        let period = self.period as f64;
        let true_range = |i: usize| window[i].true_range(Some(window[i - 1].close));

        let mut atr = (1..=self.period).map(true_range).sum::<f64>() / period;
        values[self.period] = Some(atr);
        for i in self.period + 1..window.len() {
            atr = (atr * (period - 1.0) + true_range(i)) / period;
            values[i] = Some(atr);
        }
        values
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_bars::bars;

    #[test]
    fn test_atr_wilder_smoothing() {
        let atr = Atr::new(2).unwrap();
        let window = bars(&[
            (1.10, 1.00, 1.05),
            (1.12, 1.04, 1.10), // tr 0.08
            (1.16, 1.10, 1.15), // tr 0.06
            (1.15, 1.03, 1.05), // tr 0.12
        ]);
        let values = atr.offline(&window);
        assert_eq!(values[..2], [None, None]);
        assert!((values[2].unwrap() - 0.07).abs() < 1e-12);
        assert!((values[3].unwrap() - 0.095).abs() < 1e-12);
        assert_eq!(atr.online(&window), values[3]);
    }

    #[test]
    fn test_atr_needs_period_plus_one_bars() {
        let atr = Atr::new(3).unwrap();
        let window = bars(&[(1.0, 0.9, 0.95), (1.0, 0.9, 0.95), (1.0, 0.9, 0.95)]);
        assert_eq!(atr.online(&window), None);
        assert_eq!(atr.warm_up(), 4);
    }
}
