//! Error types for the gateway crate

use thiserror::Error;

/// Failure to establish a connection with the platform
#[derive(Error, Debug)]
pub enum ConnectError {
    /// Nothing is listening on the endpoint
    #[error("Unable to connect to {0}: platform is not listening")]
    NotFound(String),

    /// The platform already serves another client on this endpoint
    #[error("Unable to connect to {0}: another client is connected")]
    AlreadyConnected(String),

    #[error("Unable to connect to {endpoint}: {source}")]
    Io {
        endpoint: String,
        #[source]
        source: std::io::Error,
    },
}

/// Transport-level errors on an established channel
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Channel closed")]
    ChannelClosed,

    #[error("Timeout waiting for data")]
    Timeout,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Inbound bytes that do not form a valid message
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecodeError {
    #[error("Truncated message {header}: expected {expected} payload bytes, got {actual}")]
    Truncated {
        header: u8,
        expected: usize,
        actual: usize,
    },

    #[error("Unknown discriminant {0}")]
    UnknownDiscriminant(u8),

    #[error("Timestamp {0} ms is out of range")]
    InvalidTimestamp(i64),

    #[error("Malformed payload: {0}")]
    Malformed(String),
}

/// Outbound value that could not be serialized
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EncodeError {
    #[error("Serialization failed: {0}")]
    Serialization(String),
}

impl From<bincode::Error> for EncodeError {
    fn from(e: bincode::Error) -> Self {
        EncodeError::Serialization(e.to_string())
    }
}

/// Failure while moving one framed message over a channel
#[derive(Error, Debug)]
pub enum FrameError {
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Encode error: {0}")]
    Encode(#[from] EncodeError),
}
