//! Guardian Strategy
//!
//! Manages positions opened by other means (manually or by another robot):
//! scales out half the position once price moves one ATR in favor, moves
//! the stop-loss to break-even, then trails it at a multiple of ATR.
//!
//! The signal machine only keeps market state current (symbol, history,
//! ATR); the risk machine owns the position lifecycle.

mod risk;
mod signal;

use hermes_core::{Account, Bar, Event, Position, Side, SymbolInfo, Tick};
use hermes_stats::StatsError;
use hermes_store::OhlcvStore;
use serde::{Deserialize, Serialize};

use crate::machine::{Machine, MachineError};
use crate::market::{History, MarketParams, MarketWindow};
use crate::strategy::Strategy;

/// Position management settings
///
/// Scales multiply ATR; protection is in pips.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskParams {
    /// Scale-out target distance from entry, in ATR
    #[serde(default = "default_scaling_out_scale")]
    pub scaling_out_scale: f64,

    /// Percentage of the volume closed at the scale-out target
    #[serde(default = "default_scaling_out_percentage")]
    pub scaling_out_percentage: f64,

    /// Break-even offset from entry, in pips
    #[serde(default = "default_scaling_out_protection")]
    pub scaling_out_protection: f64,

    /// Trailing stop distance from price, in ATR
    #[serde(default = "default_trailing_scale")]
    pub trailing_stop_scale: f64,

    /// Price must lead the stop by this many ATR before it trails
    #[serde(default = "default_trailing_scale")]
    pub trailing_activation_scale: f64,
}

fn default_scaling_out_scale() -> f64 {
    1.0
}

fn default_scaling_out_percentage() -> f64 {
    50.0
}

fn default_scaling_out_protection() -> f64 {
    1.0
}

fn default_trailing_scale() -> f64 {
    1.5
}

impl Default for RiskParams {
    fn default() -> Self {
        Self {
            scaling_out_scale: default_scaling_out_scale(),
            scaling_out_percentage: default_scaling_out_percentage(),
            scaling_out_protection: default_scaling_out_protection(),
            trailing_stop_scale: default_trailing_scale(),
            trailing_activation_scale: default_trailing_scale(),
        }
    }
}

/// Position currently under management
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpenPosition {
    pub side: Side,
    pub position: Position,
}

/// Everything the risk machine reads
#[derive(Debug, Clone, PartialEq)]
pub struct RiskState {
    pub params: RiskParams,
    pub atr: Option<f64>,
    pub pip_size: Option<f64>,
    pub open: Option<OpenPosition>,
}

impl RiskState {
    pub fn new(params: RiskParams) -> Self {
        Self {
            params,
            atr: None,
            pip_size: None,
            open: None,
        }
    }

    pub fn side(&self) -> Option<Side> {
        self.open.map(|open| open.side)
    }

    /// Adopt the position carried by a position event
    pub fn sync(&mut self, event: &Event) {
        if let Some((side, position)) = event.position() {
            self.open = Some(OpenPosition {
                side,
                position: *position,
            });
        }
    }

    pub fn clear(&mut self) {
        self.open = None;
    }

    /// Price at which part of the position is taken off
    pub fn scale_out_target(&self) -> Option<f64> {
        let open = self.open?;
        let atr = self.atr?;
        Some(open.position.entry + open.side.sign() * self.params.scaling_out_scale * atr)
    }

    /// Entry plus the protection offset in the favorable direction
    pub fn break_even(&self) -> Option<f64> {
        let open = self.open?;
        let pip = self.pip_size.unwrap_or(0.0);
        Some(open.position.entry + open.side.sign() * self.params.scaling_out_protection * pip)
    }

    /// New stop-loss if `tick` leads the current one by the activation distance
    ///
    /// Buy: `ask - sl >= activation * atr` moves the stop to `ask - scale * atr`.
    /// Sell: `sl - bid >= activation * atr` moves it to `bid + scale * atr`.
    pub fn trail(&self, tick: &Tick) -> Option<f64> {
        let open = self.open?;
        let atr = self.atr?;
        let stop_loss = open.position.stop_loss?;
        let activation = self.params.trailing_activation_scale * atr;
        let distance = self.params.trailing_stop_scale * atr;
        match open.side {
            Side::Buy => (tick.ask - stop_loss >= activation).then(|| tick.ask - distance),
            Side::Sell => (stop_loss - tick.bid >= activation).then(|| tick.bid + distance),
        }
    }
}

/// Context shared by the guardian machines
pub struct GuardianContext {
    pub risk: RiskState,
    pub market: MarketWindow,
    pub history: History,
    pub account: Option<Account>,
    window_size: usize,
}

impl GuardianContext {
    fn set_symbol(&mut self, symbol: SymbolInfo) {
        self.market.set_symbol(symbol);
        self.risk.pip_size = Some(symbol.pip_size);
    }

    fn closed_bar(event: &Event) -> Option<&Bar> {
        match event {
            Event::BarClosed(bar) => Some(bar),
            _ => None,
        }
    }

    /// Buffer a replayed history bar
    fn warm(&mut self, event: &Event) {
        if let Some(bar) = Self::closed_bar(event) {
            self.history.record(bar);
            self.market.warm(bar);
        }
    }

    /// History replay finished: persist it and compute indicators offline
    ///
    /// With a store, the window is reloaded from it so older sessions
    /// count toward warm-up.
    fn prepare(&mut self) {
        self.history.persist();
        let stored = self.history.load_tail(self.window_size);
        if stored.is_empty() {
            self.market.recompute();
        } else {
            self.market.seed(&stored);
        }
        self.risk.atr = self.market.atr();
        log::info!(
            "Market window ready with {} bars, ATR {:?}",
            self.market.len(),
            self.risk.atr
        );
    }

    /// Live bar: record it and update indicators online
    fn track(&mut self, event: &Event) {
        if let Some(bar) = Self::closed_bar(event) {
            self.history.record(bar);
            self.market.push(bar);
            self.risk.atr = self.market.atr();
        }
    }
}

pub struct Guardian {
    risk: RiskParams,
    market: MarketWindow,
    window_size: usize,
    store: Option<OhlcvStore>,
}

impl Guardian {
    pub fn new(
        market: &MarketParams,
        risk: RiskParams,
        store: Option<OhlcvStore>,
    ) -> Result<Self, StatsError> {
        Ok(Self {
            risk,
            market: MarketWindow::new(market)?,
            window_size: market.window_size,
            store,
        })
    }
}

impl Strategy for Guardian {
    type Context = GuardianContext;

    fn name(&self) -> &str {
        "guardian"
    }

    fn build_signal_machine(&self) -> Result<Machine<GuardianContext>, MachineError> {
        signal::build()
    }

    fn build_risk_machine(&self) -> Result<Machine<GuardianContext>, MachineError> {
        risk::build()
    }

    fn into_context(self) -> GuardianContext {
        GuardianContext {
            risk: RiskState::new(self.risk),
            market: self.market,
            history: History::new(self.store),
            account: None,
            window_size: self.window_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(side: Side, entry: f64, stop_loss: Option<f64>) -> RiskState {
        RiskState {
            params: RiskParams::default(),
            atr: Some(0.0030),
            pip_size: Some(0.0001),
            open: Some(OpenPosition {
                side,
                position: Position {
                    volume: 1.0,
                    entry,
                    stop_loss,
                    take_profit: None,
                },
            }),
        }
    }

    #[test]
    fn test_scale_out_and_break_even_follow_side() {
        let buy = state(Side::Buy, 1.2000, None);
        assert!((buy.scale_out_target().unwrap() - 1.2030).abs() < 1e-9);
        assert!((buy.break_even().unwrap() - 1.2001).abs() < 1e-9);

        let sell = state(Side::Sell, 1.2000, None);
        assert!((sell.scale_out_target().unwrap() - 1.1970).abs() < 1e-9);
        assert!((sell.break_even().unwrap() - 1.1999).abs() < 1e-9);
    }

    #[test]
    fn test_trail_buy() {
        let risk = state(Side::Buy, 1.1950, Some(1.2000));
        // 0.0050 >= 0.0045
        let stop = risk.trail(&Tick {
            ask: 1.2050,
            bid: 1.2048,
        });
        assert!((stop.unwrap() - 1.2005).abs() < 1e-9);
        // 0.0040 < 0.0045
        assert_eq!(
            risk.trail(&Tick {
                ask: 1.2040,
                bid: 1.2038
            }),
            None
        );
    }

    #[test]
    fn test_trail_sell_uses_bid() {
        let risk = state(Side::Sell, 1.2050, Some(1.2000));
        let stop = risk.trail(&Tick {
            ask: 1.1952,
            bid: 1.1950,
        });
        assert!((stop.unwrap() - 1.1995).abs() < 1e-9);
    }

    #[test]
    fn test_trail_needs_stop_and_atr() {
        let mut risk = state(Side::Buy, 1.1950, None);
        let tick = Tick {
            ask: 1.3,
            bid: 1.3,
        };
        assert_eq!(risk.trail(&tick), None);
        risk.open = None;
        assert_eq!(risk.trail(&tick), None);
    }

    #[test]
    fn test_params_defaults_from_empty_json() {
        let params: RiskParams = serde_json::from_str("{}").unwrap();
        assert_eq!(params, RiskParams::default());
        assert_eq!(params.scaling_out_percentage, 50.0);
        assert_eq!(params.trailing_activation_scale, 1.5);
    }
}
