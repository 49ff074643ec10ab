//! In-process channel transport
//!
//! Duplex byte stream built on two crossbeam unbounded channels. Chunks
//! are reassembled into a stream, so frames may be split or merged
//! arbitrarily by the sender. This is the transport for tests and
//! simulations; [`PlatformPeer`] plays the trading platform.

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, unbounded};
use hermes_core::{Command, Event};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::time::Duration;

use super::frame::read_command;
use super::{Channel, Endpoint, Transport};
use crate::codec::encode_event;
use crate::error::{ConnectError, FrameError, TransportError};

/// One end of an in-process duplex byte stream
#[derive(Debug)]
pub struct ChannelEnd {
    tx: Option<Sender<Vec<u8>>>,
    rx: Receiver<Vec<u8>>,
    pending: VecDeque<u8>,
    read_timeout: Option<Duration>,
    closed: bool,
}

impl ChannelEnd {
    /// Create both ends of a stream
    pub fn pair() -> (ChannelEnd, ChannelEnd) {
        let (a_tx, a_rx) = unbounded();
        let (b_tx, b_rx) = unbounded();
        (
            ChannelEnd::new(a_tx, b_rx),
            ChannelEnd::new(b_tx, a_rx),
        )
    }

    fn new(tx: Sender<Vec<u8>>, rx: Receiver<Vec<u8>>) -> Self {
        Self {
            tx: Some(tx),
            rx,
            pending: VecDeque::new(),
            read_timeout: None,
            closed: false,
        }
    }

    /// Pull one chunk into the pending buffer; false once the peer is gone
    fn fill(&mut self) -> Result<bool, TransportError> {
        let chunk = match self.read_timeout {
            Some(timeout) => match self.rx.recv_timeout(timeout) {
                Ok(chunk) => chunk,
                Err(RecvTimeoutError::Timeout) => return Err(TransportError::Timeout),
                Err(RecvTimeoutError::Disconnected) => return Ok(false),
            },
            None => match self.rx.recv() {
                Ok(chunk) => chunk,
                Err(_) => return Ok(false),
            },
        };
        self.pending.extend(chunk);
        Ok(true)
    }
}

impl Channel for ChannelEnd {
    fn send(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        let tx = self.tx.as_ref().ok_or(TransportError::ChannelClosed)?;
        tx.send(bytes.to_vec())
            .map_err(|_| TransportError::ChannelClosed)
    }

    fn receive(&mut self, n: usize) -> Result<Vec<u8>, TransportError> {
        if self.closed {
            return Err(TransportError::ChannelClosed);
        }
        while self.pending.len() < n {
            if !self.fill()? {
                break;
            }
        }
        let available = n.min(self.pending.len());
        Ok(self.pending.drain(..available).collect())
    }

    fn close(&mut self) -> Result<(), TransportError> {
        if self.closed {
            return Err(TransportError::ChannelClosed);
        }
        self.closed = true;
        // Dropping the sender is what the peer observes as a disconnect
        self.tx = None;
        Ok(())
    }
}

enum Slot {
    Listening(ChannelEnd),
    Connected,
    Offline,
}

/// In-process transport accepting a single client
pub struct ChannelTransport {
    endpoint: Endpoint,
    slot: Mutex<Slot>,
}

impl ChannelTransport {
    /// Create a listening transport and the platform side of its stream
    pub fn pair(endpoint: Endpoint) -> (ChannelTransport, PlatformPeer) {
        let (engine, platform) = ChannelEnd::pair();
        (
            ChannelTransport {
                endpoint,
                slot: Mutex::new(Slot::Listening(engine)),
            },
            PlatformPeer { end: platform },
        )
    }

    /// A transport with nobody listening
    pub fn offline(endpoint: Endpoint) -> ChannelTransport {
        ChannelTransport {
            endpoint,
            slot: Mutex::new(Slot::Offline),
        }
    }

    /// Fail engine-side reads that wait longer than `timeout`
    pub fn with_read_timeout(self, timeout: Duration) -> Self {
        {
            let mut slot = self.slot.lock();
            if let Slot::Listening(end) = &mut *slot {
                end.read_timeout = Some(timeout);
            }
        }
        self
    }
}

impl Transport for ChannelTransport {
    type Channel = ChannelEnd;

    fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    fn connect(&self) -> Result<ChannelEnd, ConnectError> {
        let mut slot = self.slot.lock();
        match std::mem::replace(&mut *slot, Slot::Connected) {
            Slot::Listening(end) => Ok(end),
            Slot::Connected => Err(ConnectError::AlreadyConnected(self.endpoint.to_string())),
            Slot::Offline => {
                *slot = Slot::Offline;
                Err(ConnectError::NotFound(self.endpoint.to_string()))
            }
        }
    }
}

/// Platform side of a [`ChannelTransport`]
///
/// Encodes events and decodes the engine's commands.
#[derive(Debug)]
pub struct PlatformPeer {
    end: ChannelEnd,
}

impl PlatformPeer {
    pub fn send_event(&mut self, event: &Event) -> Result<(), FrameError> {
        let bytes = encode_event(event)?;
        Ok(self.end.send(&bytes)?)
    }

    /// Send raw bytes, for malformed or split frames
    pub fn send_raw(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        self.end.send(bytes)
    }

    /// Block until the engine's next command
    pub fn recv_command(&mut self) -> Result<Command, FrameError> {
        read_command(&mut self.end)
    }

    /// Drain every command the engine already sent, without waiting for more
    pub fn drain_commands(&mut self) -> Vec<Command> {
        while let Ok(chunk) = self.end.rx.try_recv() {
            self.end.pending.extend(chunk);
        }
        let mut commands = Vec::new();
        // The engine writes whole frames, so buffered bytes never end mid-frame
        while !self.end.pending.is_empty() {
            match read_command(&mut self.end) {
                Ok(command) => commands.push(command),
                Err(_) => break,
            }
        }
        commands
    }

    /// Stop sending events
    ///
    /// The engine reads everything already sent, then observes a closed
    /// channel. Commands can still be received afterwards.
    pub fn close(&mut self) {
        self.end.tx = None;
    }
}
