//! Hermes Gateway
//!
//! Gateway between the engine and the trading platform. Provides:
//! - The binary message codec (events in, commands out, and the mirror
//!   direction for platform-side tooling)
//! - Transport abstraction over a duplex byte channel
//! - An OS pipe transport and an in-process channel transport
//!
//! ## Architecture
//!
//! ```text
//!   Trading platform
//!         │  \\.\pipe\{symbol}\{timeframe}
//!    ┌────▼────┐
//!    │Transport│  connect / send / receive(n) / close
//!    └────┬────┘
//!    ┌────▼────┐
//!    │  Frame  │  1 discriminant byte + fixed payload
//!    └────┬────┘
//!    ┌────▼────┐
//!    │  Codec  │  Event / Command <-> little-endian bytes
//!    └─────────┘
//! ```
//!
//! ## Wire format
//!
//! Every message is one discriminant byte followed by a payload whose
//! size is implied by the discriminant. Optional prices travel as the
//! sentinel `-1.0`.

pub mod codec;
pub mod error;
pub mod transport;

// Re-export commonly used types
pub use codec::{
    SENTINEL, command_payload_size, decode_command, decode_event, encode_command, encode_event,
    event_payload_size,
};
pub use error::{ConnectError, DecodeError, EncodeError, FrameError, TransportError};
pub use transport::{
    Channel, Endpoint, Transport,
    channel::{ChannelEnd, ChannelTransport, PlatformPeer},
    config::PipeConfig,
    frame::{read_command, read_event},
    pipe::{PipeChannel, PipeTransport},
};
