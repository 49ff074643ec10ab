//! Fixed-layout payload structs
//!
//! Field order is the wire order. Optional prices are stored as raw
//! sentinel-encoded `f64`.

use chrono::{DateTime, Utc};
use hermes_core::{Account, Bar, Position, Signal, SymbolInfo, Tick};
use serde::{Deserialize, Serialize};

use super::{from_sentinel, to_sentinel};
use crate::error::DecodeError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub(crate) struct AccountWire {
    balance: f64,
    equity: f64,
}

impl From<&Account> for AccountWire {
    fn from(account: &Account) -> Self {
        Self {
            balance: account.balance,
            equity: account.equity,
        }
    }
}

impl From<AccountWire> for Account {
    fn from(wire: AccountWire) -> Self {
        Self {
            balance: wire.balance,
            equity: wire.equity,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub(crate) struct SymbolWire {
    digits: i32,
    pip_size: f64,
    tick_size: f64,
}

impl From<&SymbolInfo> for SymbolWire {
    fn from(symbol: &SymbolInfo) -> Self {
        Self {
            digits: symbol.digits,
            pip_size: symbol.pip_size,
            tick_size: symbol.tick_size,
        }
    }
}

impl From<SymbolWire> for SymbolInfo {
    fn from(wire: SymbolWire) -> Self {
        Self {
            digits: wire.digits,
            pip_size: wire.pip_size,
            tick_size: wire.tick_size,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub(crate) struct PositionWire {
    volume: f64,
    entry: f64,
    stop_loss: f64,
    take_profit: f64,
}

impl From<&Position> for PositionWire {
    fn from(position: &Position) -> Self {
        Self {
            volume: position.volume,
            entry: position.entry,
            stop_loss: to_sentinel(position.stop_loss),
            take_profit: to_sentinel(position.take_profit),
        }
    }
}

impl From<PositionWire> for Position {
    fn from(wire: PositionWire) -> Self {
        Self {
            volume: wire.volume,
            entry: wire.entry,
            stop_loss: from_sentinel(wire.stop_loss),
            take_profit: from_sentinel(wire.take_profit),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub(crate) struct BarWire {
    time_ms: i64,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: i64,
}

impl From<&Bar> for BarWire {
    fn from(bar: &Bar) -> Self {
        Self {
            time_ms: bar.time.timestamp_millis(),
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            volume: bar.volume,
        }
    }
}

impl TryFrom<BarWire> for Bar {
    type Error = DecodeError;

    fn try_from(wire: BarWire) -> Result<Self, Self::Error> {
        let time = DateTime::<Utc>::from_timestamp_millis(wire.time_ms)
            .ok_or(DecodeError::InvalidTimestamp(wire.time_ms))?;
        Ok(Self {
            time,
            open: wire.open,
            high: wire.high,
            low: wire.low,
            close: wire.close,
            volume: wire.volume,
        })
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub(crate) struct TickWire {
    ask: f64,
    bid: f64,
}

impl From<&Tick> for TickWire {
    fn from(tick: &Tick) -> Self {
        Self {
            ask: tick.ask,
            bid: tick.bid,
        }
    }
}

impl From<TickWire> for Tick {
    fn from(wire: TickWire) -> Self {
        Self {
            ask: wire.ask,
            bid: wire.bid,
        }
    }
}

/// Signal payload; direction and sizing live in the discriminant
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub(crate) struct SignalWire {
    amount: f64,
    stop_loss: f64,
    take_profit: f64,
}

impl From<&Signal> for SignalWire {
    fn from(signal: &Signal) -> Self {
        Self {
            amount: signal.amount,
            stop_loss: to_sentinel(signal.stop_loss),
            take_profit: to_sentinel(signal.take_profit),
        }
    }
}

impl SignalWire {
    pub(crate) fn amount(&self) -> f64 {
        self.amount
    }

    pub(crate) fn stop_loss(&self) -> Option<f64> {
        from_sentinel(self.stop_loss)
    }

    pub(crate) fn take_profit(&self) -> Option<f64> {
        from_sentinel(self.take_profit)
    }
}
