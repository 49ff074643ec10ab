//! Platform protocol vocabulary
//!
//! Events flow from the platform to the engine; commands flow back.
//! Every event is answered by exactly one command, except `Shutdown`.

mod command;
mod event;

pub use command::{Command, CommandKind, Direction, Signal, Sizing};
pub use event::{Event, EventKind};

use serde::{Deserialize, Serialize};

/// Side of the book and direction of a price-target crossing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PriceEdge {
    AskAbove,
    AskBelow,
    BidAbove,
    BidBelow,
}

impl PriceEdge {
    /// All edges in wire order
    pub const ALL: [PriceEdge; 4] = [
        PriceEdge::AskAbove,
        PriceEdge::AskBelow,
        PriceEdge::BidAbove,
        PriceEdge::BidBelow,
    ];

    /// Offset of this edge inside a block of four consecutive ids
    pub(crate) fn offset(&self) -> u8 {
        match self {
            PriceEdge::AskAbove => 0,
            PriceEdge::AskBelow => 1,
            PriceEdge::BidAbove => 2,
            PriceEdge::BidBelow => 3,
        }
    }

    /// The edge a position on `side` takes profit through
    ///
    /// A buy position is closed at the bid, so it profits when the bid rises.
    pub fn favorable(side: crate::Side) -> Self {
        match side {
            crate::Side::Buy => PriceEdge::BidAbove,
            crate::Side::Sell => PriceEdge::AskBelow,
        }
    }
}
