use serde::{Deserialize, Serialize};

/// Open position as reported by the platform
///
/// Stop-loss and take-profit are absolute prices; `None` means not set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub volume: f64,
    /// Entry price
    pub entry: f64,
    pub stop_loss: Option<f64>,
    pub take_profit: Option<f64>,
}

/// Which attribute of a position a modification touched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PositionChange {
    Volume,
    StopLoss,
    TakeProfit,
}
