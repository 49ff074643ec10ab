//! Message framing over a byte channel
//!
//! Reads the discriminant byte first, then exactly the payload size that
//! discriminant implies. An unknown discriminant fails before any payload
//! read, so a protocol mismatch never blocks waiting for bytes.

use hermes_core::{Command, Event};

use super::Channel;
use crate::codec::{command_payload_size, decode_command, decode_event, event_payload_size};
use crate::error::{FrameError, TransportError};

fn read_header<C: Channel + ?Sized>(channel: &mut C) -> Result<u8, FrameError> {
    let bytes = channel.receive(1)?;
    bytes
        .first()
        .copied()
        .ok_or(FrameError::Transport(TransportError::ChannelClosed))
}

/// Read one platform event
pub fn read_event<C: Channel + ?Sized>(channel: &mut C) -> Result<Event, FrameError> {
    let header = read_header(channel)?;
    let payload = channel.receive(event_payload_size(header)?)?;
    Ok(decode_event(header, &payload)?)
}

/// Read one engine command
pub fn read_command<C: Channel + ?Sized>(channel: &mut C) -> Result<Command, FrameError> {
    let header = read_header(channel)?;
    let payload = channel.receive(command_payload_size(header)?)?;
    Ok(decode_command(header, &payload)?)
}
