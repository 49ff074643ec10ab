//! Hermes Core Domain
//!
//! Pure domain types for the Hermes execution engine.
//! This crate contains no I/O and is 100% unit testable.
//!
//! Two vocabularies are defined here:
//! - [`Event`]: everything the trading platform tells the engine
//! - [`Command`]: everything the engine asks of the trading platform
//!
//! Both are closed sum types. Their discriminants ([`EventKind`],
//! [`CommandKind`]) are the stable ids shared with the platform.

pub mod entities;
pub mod messages;

pub use entities::{Account, Bar, Position, PositionChange, Side, SymbolInfo, Tick};
pub use messages::{
    Command, CommandKind, Direction, Event, EventKind, PriceEdge, Signal, Sizing,
};
