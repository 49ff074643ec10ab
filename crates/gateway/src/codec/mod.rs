//! Binary message codec
//!
//! Layout of every message: one discriminant byte, then a fixed-size,
//! little-endian payload packed with bincode's default (fixint) options.
//! Payload sizes are implied by the discriminant; there is no length
//! prefix.
//!
//! Optional prices have no null on the wire. `None` is written as
//! [`SENTINEL`] and reading [`SENTINEL`] yields `None`, for every optional
//! field of every message kind.

mod command;
mod event;
mod wire;

pub use command::{command_payload_size, decode_command, encode_command};
pub use event::{decode_event, encode_event, event_payload_size};

use serde::{Serialize, de::DeserializeOwned};

use crate::error::{DecodeError, EncodeError};

/// Reserved in-band value meaning "not set"
pub const SENTINEL: f64 = -1.0;

/// Map an optional price to its wire value
pub fn to_sentinel(value: Option<f64>) -> f64 {
    value.unwrap_or(SENTINEL)
}

/// Map a wire value back to an optional price
///
/// `-1.0` is exactly representable, so an exact comparison is safe.
pub fn from_sentinel(raw: f64) -> Option<f64> {
    if raw == SENTINEL { None } else { Some(raw) }
}

/// Payload bytes of each message shape
pub mod sizes {
    pub const ACCOUNT: usize = 16;
    pub const SYMBOL: usize = 20;
    pub const POSITION: usize = 32;
    pub const BAR: usize = 48;
    pub const TICK: usize = 16;
    pub const PRICE: usize = 8;
    pub const SIGNAL: usize = 24;
}

/// Slice exactly `expected` bytes of payload, or report truncation
fn take(header: u8, payload: &[u8], expected: usize) -> Result<&[u8], DecodeError> {
    payload.get(..expected).ok_or(DecodeError::Truncated {
        header,
        expected,
        actual: payload.len(),
    })
}

fn read<T: DeserializeOwned>(payload: &[u8]) -> Result<T, DecodeError> {
    bincode::deserialize(payload).map_err(|e| DecodeError::Malformed(e.to_string()))
}

/// Start a frame with its discriminant
fn frame(header: u8) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(1 + sizes::BAR);
    bytes.push(header);
    bytes
}

fn write<T: Serialize>(bytes: &mut Vec<u8>, value: &T) -> Result<(), EncodeError> {
    bincode::serialize_into(bytes, value)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinel_mapping() {
        assert_eq!(to_sentinel(None), -1.0);
        assert_eq!(to_sentinel(Some(1.25)), 1.25);
        assert_eq!(from_sentinel(-1.0), None);
        assert_eq!(from_sentinel(0.0), Some(0.0));
        assert_eq!(from_sentinel(-0.5), Some(-0.5));
    }

    #[test]
    fn test_take_reports_truncation() {
        let bytes = [0u8; 5];
        assert_eq!(take(2, &bytes, 4).map(<[u8]>::len), Ok(4));
        assert_eq!(
            take(2, &bytes, 16),
            Err(DecodeError::Truncated {
                header: 2,
                expected: 16,
                actual: 5
            })
        );
    }
}
