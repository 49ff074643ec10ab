//! Transport abstraction layer
//!
//! A transport knows how to reach the platform for one endpoint and hands
//! out a connected [`Channel`]: a duplex byte stream with blocking reads.
//! Framing lives on top of the channel in [`frame`], so every transport
//! gets the same message boundaries.

pub mod channel;
pub mod config;
pub mod frame;
pub mod pipe;

use crate::error::{ConnectError, TransportError};

/// Symbol/timeframe pair a connection serves
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    pub symbol: String,
    pub timeframe: String,
}

impl Endpoint {
    pub fn new(symbol: impl Into<String>, timeframe: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            timeframe: timeframe.into(),
        }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.symbol, self.timeframe)
    }
}

/// Connected duplex byte channel
pub trait Channel {
    /// Write all bytes
    fn send(&mut self, bytes: &[u8]) -> Result<(), TransportError>;

    /// Block until `n` bytes are available
    ///
    /// Returns fewer than `n` bytes only when the peer closed the channel.
    fn receive(&mut self, n: usize) -> Result<Vec<u8>, TransportError>;

    /// Release the channel; further calls fail with `ChannelClosed`
    fn close(&mut self) -> Result<(), TransportError>;
}

/// Factory for connected channels to one endpoint
pub trait Transport {
    type Channel: Channel;

    fn endpoint(&self) -> &Endpoint;

    /// Connect to the platform
    fn connect(&self) -> Result<Self::Channel, ConnectError>;
}
