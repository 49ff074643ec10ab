//! Engine → platform messages

use hermes_core::{Command, CommandKind, Signal};

use super::wire::SignalWire;
use super::{frame, from_sentinel, read, sizes, take, to_sentinel, write};
use crate::error::{DecodeError, EncodeError};

fn payload_size(kind: CommandKind) -> usize {
    match kind {
        CommandKind::Complete => 0,
        CommandKind::ModifyVolume
        | CommandKind::ModifyStopLoss
        | CommandKind::ModifyTakeProfit
        | CommandKind::SubscribeAskAbove
        | CommandKind::SubscribeAskBelow
        | CommandKind::SubscribeBidAbove
        | CommandKind::SubscribeBidBelow => sizes::PRICE,
        _ => sizes::SIGNAL,
    }
}

/// Payload size implied by a command discriminant
pub fn command_payload_size(header: u8) -> Result<usize, DecodeError> {
    CommandKind::from_id(header)
        .map(payload_size)
        .ok_or(DecodeError::UnknownDiscriminant(header))
}

/// Encode one command as a complete frame (discriminant + payload)
pub fn encode_command(command: &Command) -> Result<Vec<u8>, EncodeError> {
    let mut bytes = frame(command.kind().id());
    match command {
        Command::Complete => {}
        Command::Signal(signal) => write(&mut bytes, &SignalWire::from(signal))?,
        Command::ModifyVolume(value) => write(&mut bytes, value)?,
        Command::ModifyStopLoss(price) | Command::ModifyTakeProfit(price) => {
            write(&mut bytes, &to_sentinel(*price))?
        }
        Command::SubscribePriceTarget { target, .. } => write(&mut bytes, &to_sentinel(*target))?,
    }
    Ok(bytes)
}

/// Decode one command from its discriminant and payload bytes
pub fn decode_command(header: u8, payload: &[u8]) -> Result<Command, DecodeError> {
    let kind = CommandKind::from_id(header).ok_or(DecodeError::UnknownDiscriminant(header))?;
    let payload = take(header, payload, payload_size(kind))?;

    if let Some((direction, sizing)) = kind.signal_parts() {
        let wire: SignalWire = read(payload)?;
        return Ok(Command::Signal(Signal {
            direction,
            sizing,
            amount: wire.amount(),
            stop_loss: wire.stop_loss(),
            take_profit: wire.take_profit(),
        }));
    }
    if let Some(edge) = kind.subscribed_edge() {
        return Ok(Command::SubscribePriceTarget {
            edge,
            target: from_sentinel(read(payload)?),
        });
    }

    let command = match kind {
        CommandKind::ModifyVolume => Command::ModifyVolume(read(payload)?),
        CommandKind::ModifyStopLoss => Command::ModifyStopLoss(from_sentinel(read(payload)?)),
        CommandKind::ModifyTakeProfit => Command::ModifyTakeProfit(from_sentinel(read(payload)?)),
        _ => Command::Complete,
    };
    Ok(command)
}
