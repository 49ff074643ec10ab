//! Platform → engine messages

use hermes_core::{Bar, Event, EventKind, Position, PositionChange, PriceEdge, Side};

use super::wire::{AccountWire, BarWire, PositionWire, SymbolWire, TickWire};
use super::{frame, read, sizes, take, write};
use crate::error::{DecodeError, EncodeError};

fn payload_size(kind: EventKind) -> usize {
    use EventKind::*;
    match kind {
        Shutdown | Complete => 0,
        Account => sizes::ACCOUNT,
        Symbol => sizes::SYMBOL,
        PositionOpenedBuy
        | PositionOpenedSell
        | PositionModifiedBuyVolume
        | PositionModifiedBuyStopLoss
        | PositionModifiedBuyTakeProfit
        | PositionModifiedSellVolume
        | PositionModifiedSellStopLoss
        | PositionModifiedSellTakeProfit
        | PositionClosedBuy
        | PositionClosedSell => sizes::POSITION,
        BarOpened | BarClosed => sizes::BAR,
        Tick => sizes::TICK,
        AskAboveTarget | AskBelowTarget | BidAboveTarget | BidBelowTarget => sizes::PRICE,
    }
}

/// Payload size implied by an event discriminant
pub fn event_payload_size(header: u8) -> Result<usize, DecodeError> {
    EventKind::from_id(header)
        .map(payload_size)
        .ok_or(DecodeError::UnknownDiscriminant(header))
}

/// Decode one event from its discriminant and payload bytes
///
/// Extra trailing bytes are ignored; missing bytes are `Truncated`.
pub fn decode_event(header: u8, payload: &[u8]) -> Result<Event, DecodeError> {
    let kind = EventKind::from_id(header).ok_or(DecodeError::UnknownDiscriminant(header))?;
    let payload = take(header, payload, payload_size(kind))?;

    let position = |side: Side| -> Result<(Side, Position), DecodeError> {
        let wire: PositionWire = read(payload)?;
        Ok((side, wire.into()))
    };
    let modified = |side: Side, change: PositionChange| -> Result<Event, DecodeError> {
        let (side, position) = position(side)?;
        Ok(Event::PositionModified {
            side,
            change,
            position,
        })
    };
    let crossed = |edge: PriceEdge| -> Result<Event, DecodeError> {
        Ok(Event::PriceTargetCrossed {
            edge,
            price: read(payload)?,
        })
    };

    let event = match kind {
        EventKind::Shutdown => Event::Shutdown,
        EventKind::Complete => Event::Complete,
        EventKind::Account => Event::Account(read::<AccountWire>(payload)?.into()),
        EventKind::Symbol => Event::Symbol(read::<SymbolWire>(payload)?.into()),
        EventKind::PositionOpenedBuy | EventKind::PositionOpenedSell => {
            let side = if kind == EventKind::PositionOpenedBuy {
                Side::Buy
            } else {
                Side::Sell
            };
            let (side, position) = position(side)?;
            Event::PositionOpened { side, position }
        }
        EventKind::PositionModifiedBuyVolume => modified(Side::Buy, PositionChange::Volume)?,
        EventKind::PositionModifiedBuyStopLoss => modified(Side::Buy, PositionChange::StopLoss)?,
        EventKind::PositionModifiedBuyTakeProfit => {
            modified(Side::Buy, PositionChange::TakeProfit)?
        }
        EventKind::PositionModifiedSellVolume => modified(Side::Sell, PositionChange::Volume)?,
        EventKind::PositionModifiedSellStopLoss => {
            modified(Side::Sell, PositionChange::StopLoss)?
        }
        EventKind::PositionModifiedSellTakeProfit => {
            modified(Side::Sell, PositionChange::TakeProfit)?
        }
        EventKind::PositionClosedBuy | EventKind::PositionClosedSell => {
            let side = if kind == EventKind::PositionClosedBuy {
                Side::Buy
            } else {
                Side::Sell
            };
            let (side, position) = position(side)?;
            Event::PositionClosed { side, position }
        }
        EventKind::BarOpened => Event::BarOpened(Bar::try_from(read::<BarWire>(payload)?)?),
        EventKind::BarClosed => Event::BarClosed(Bar::try_from(read::<BarWire>(payload)?)?),
        EventKind::Tick => Event::Tick(read::<TickWire>(payload)?.into()),
        EventKind::AskAboveTarget => crossed(PriceEdge::AskAbove)?,
        EventKind::AskBelowTarget => crossed(PriceEdge::AskBelow)?,
        EventKind::BidAboveTarget => crossed(PriceEdge::BidAbove)?,
        EventKind::BidBelowTarget => crossed(PriceEdge::BidBelow)?,
    };
    Ok(event)
}

/// Encode one event as a complete frame (discriminant + payload)
pub fn encode_event(event: &Event) -> Result<Vec<u8>, EncodeError> {
    let mut bytes = frame(event.kind().id());
    match event {
        Event::Shutdown | Event::Complete => {}
        Event::Account(account) => write(&mut bytes, &AccountWire::from(account))?,
        Event::Symbol(symbol) => write(&mut bytes, &SymbolWire::from(symbol))?,
        Event::PositionOpened { position, .. }
        | Event::PositionModified { position, .. }
        | Event::PositionClosed { position, .. } => {
            write(&mut bytes, &PositionWire::from(position))?
        }
        Event::BarOpened(bar) | Event::BarClosed(bar) => write(&mut bytes, &BarWire::from(bar))?,
        Event::Tick(tick) => write(&mut bytes, &TickWire::from(tick))?,
        Event::PriceTargetCrossed { price, .. } => write(&mut bytes, price)?,
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use hermes_core::{Account, SymbolInfo, Tick};

    fn roundtrip(event: Event) {
        let bytes = encode_event(&event).unwrap();
        assert_eq!(bytes.len(), 1 + event_payload_size(bytes[0]).unwrap());
        assert_eq!(decode_event(bytes[0], &bytes[1..]).unwrap(), event);
    }

    fn bar_bytes(ms: i64) -> Vec<u8> {
        let mut bytes = vec![EventKind::BarClosed.id()];
        bytes.extend_from_slice(&ms.to_le_bytes());
        for value in [1.1000f64, 1.1010, 1.0990, 1.1005] {
            bytes.extend_from_slice(&value.to_le_bytes());
        }
        bytes.extend_from_slice(&100i64.to_le_bytes());
        bytes
    }

    #[test]
    fn test_decode_bar_from_raw_bytes() {
        let bytes = bar_bytes(1_700_000_000_000);
        let event = decode_event(bytes[0], &bytes[1..]).unwrap();

        let Event::BarClosed(bar) = event else {
            panic!("expected BarClosed, got {:?}", event);
        };
        assert_eq!(
            bar.time,
            DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap()
        );
        assert_eq!(bar.time.to_rfc3339(), "2023-11-14T22:13:20+00:00");
        assert_eq!(bar.open, 1.1000);
        assert_eq!(bar.high, 1.1010);
        assert_eq!(bar.low, 1.0990);
        assert_eq!(bar.close, 1.1005);
        assert_eq!(bar.volume, 100);
    }

    #[test]
    fn test_position_sentinel_decodes_to_none() {
        let mut bytes = vec![EventKind::PositionOpenedSell.id()];
        for value in [0.5f64, 1.2345, -1.0, 1.2000] {
            bytes.extend_from_slice(&value.to_le_bytes());
        }
        let event = decode_event(bytes[0], &bytes[1..]).unwrap();
        assert_eq!(
            event,
            Event::PositionOpened {
                side: Side::Sell,
                position: Position {
                    volume: 0.5,
                    entry: 1.2345,
                    stop_loss: None,
                    take_profit: Some(1.2000),
                },
            }
        );
    }

    #[test]
    fn test_unset_stop_loss_encodes_as_sentinel() {
        let event = Event::PositionModified {
            side: Side::Buy,
            change: PositionChange::TakeProfit,
            position: Position {
                volume: 1.0,
                entry: 1.1,
                stop_loss: None,
                take_profit: Some(1.2),
            },
        };
        let bytes = encode_event(&event).unwrap();
        assert_eq!(bytes[0], 8);
        assert_eq!(&bytes[17..25], &(-1.0f64).to_le_bytes());
    }

    #[test]
    fn test_roundtrip_representative_events() {
        let time = DateTime::<Utc>::from_timestamp_millis(1_700_000_060_000).unwrap();
        let position = Position {
            volume: 0.0,
            entry: -0.25,
            stop_loss: None,
            take_profit: None,
        };

        roundtrip(Event::Shutdown);
        roundtrip(Event::Complete);
        roundtrip(Event::Account(Account {
            balance: 10_000.0,
            equity: 9_875.5,
        }));
        roundtrip(Event::Symbol(SymbolInfo {
            digits: 3,
            pip_size: 0.01,
            tick_size: 0.001,
        }));
        roundtrip(Event::PositionOpened {
            side: Side::Buy,
            position,
        });
        roundtrip(Event::PositionModified {
            side: Side::Sell,
            change: PositionChange::StopLoss,
            position: Position {
                stop_loss: Some(0.0),
                ..position
            },
        });
        roundtrip(Event::PositionClosed {
            side: Side::Sell,
            position,
        });
        roundtrip(Event::BarOpened(Bar {
            time,
            open: 0.0,
            high: 0.0,
            low: 0.0,
            close: 0.0,
            volume: 0,
        }));
        roundtrip(Event::Tick(Tick {
            ask: 1.2050,
            bid: 1.2048,
        }));
        roundtrip(Event::PriceTargetCrossed {
            edge: PriceEdge::AskBelow,
            price: 1.1,
        });
    }

    #[test]
    fn test_truncated_payload() {
        let bytes = bar_bytes(0);
        let err = decode_event(bytes[0], &bytes[1..40]).unwrap_err();
        assert_eq!(
            err,
            DecodeError::Truncated {
                header: 15,
                expected: 48,
                actual: 39
            }
        );

        let err = decode_event(EventKind::Tick.id(), &[]).unwrap_err();
        assert!(matches!(err, DecodeError::Truncated { expected: 16, .. }));
    }

    #[test]
    fn test_unknown_discriminant() {
        assert_eq!(
            decode_event(21, &[0u8; 64]),
            Err(DecodeError::UnknownDiscriminant(21))
        );
        assert_eq!(
            event_payload_size(200),
            Err(DecodeError::UnknownDiscriminant(200))
        );
    }

    #[test]
    fn test_out_of_range_timestamp() {
        let bytes = bar_bytes(i64::MAX);
        assert_eq!(
            decode_event(bytes[0], &bytes[1..]),
            Err(DecodeError::InvalidTimestamp(i64::MAX))
        );
    }
}
