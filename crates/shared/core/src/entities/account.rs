use serde::{Deserialize, Serialize};

/// Account snapshot reported by the platform
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub balance: f64,
    pub equity: f64,
}

/// Static properties of the traded symbol
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SymbolInfo {
    /// Number of decimal digits in a quote
    pub digits: i32,
    /// Price distance of one pip
    pub pip_size: f64,
    /// Smallest price increment
    pub tick_size: f64,
}

impl SymbolInfo {
    /// Convert a price distance into pips
    pub fn to_pips(&self, distance: f64) -> f64 {
        distance / self.pip_size
    }

    /// Convert a pip count into a price distance
    pub fn to_price(&self, pips: f64) -> f64 {
        pips * self.pip_size
    }
}
