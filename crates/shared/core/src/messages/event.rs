use crate::entities::{Account, Bar, Position, PositionChange, Side, SymbolInfo, Tick};

use super::PriceEdge;

/// Inbound occurrence reported by the platform
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event {
    /// Platform is terminating the session; no reply is expected
    Shutdown,
    /// Historical replay finished; live events follow
    Complete,
    Account(Account),
    Symbol(SymbolInfo),
    PositionOpened {
        side: Side,
        position: Position,
    },
    PositionModified {
        side: Side,
        change: PositionChange,
        position: Position,
    },
    PositionClosed {
        side: Side,
        position: Position,
    },
    BarOpened(Bar),
    BarClosed(Bar),
    Tick(Tick),
    /// A subscribed price target was crossed at `price`
    PriceTargetCrossed {
        edge: PriceEdge,
        price: f64,
    },
}

/// Discriminant of an [`Event`]; the value is the wire id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum EventKind {
    Shutdown = 0,
    Complete = 1,
    Account = 2,
    Symbol = 3,
    PositionOpenedBuy = 4,
    PositionOpenedSell = 5,
    PositionModifiedBuyVolume = 6,
    PositionModifiedBuyStopLoss = 7,
    PositionModifiedBuyTakeProfit = 8,
    PositionModifiedSellVolume = 9,
    PositionModifiedSellStopLoss = 10,
    PositionModifiedSellTakeProfit = 11,
    PositionClosedBuy = 12,
    PositionClosedSell = 13,
    BarOpened = 14,
    BarClosed = 15,
    Tick = 16,
    AskAboveTarget = 17,
    AskBelowTarget = 18,
    BidAboveTarget = 19,
    BidBelowTarget = 20,
}

impl EventKind {
    /// Every kind in wire order
    pub const ALL: [EventKind; 21] = [
        EventKind::Shutdown,
        EventKind::Complete,
        EventKind::Account,
        EventKind::Symbol,
        EventKind::PositionOpenedBuy,
        EventKind::PositionOpenedSell,
        EventKind::PositionModifiedBuyVolume,
        EventKind::PositionModifiedBuyStopLoss,
        EventKind::PositionModifiedBuyTakeProfit,
        EventKind::PositionModifiedSellVolume,
        EventKind::PositionModifiedSellStopLoss,
        EventKind::PositionModifiedSellTakeProfit,
        EventKind::PositionClosedBuy,
        EventKind::PositionClosedSell,
        EventKind::BarOpened,
        EventKind::BarClosed,
        EventKind::Tick,
        EventKind::AskAboveTarget,
        EventKind::AskBelowTarget,
        EventKind::BidAboveTarget,
        EventKind::BidBelowTarget,
    ];

    /// Wire id
    pub fn id(self) -> u8 {
        self as u8
    }

    /// Look up a kind by wire id
    pub fn from_id(id: u8) -> Option<Self> {
        Self::ALL.get(id as usize).copied()
    }

    pub fn position_opened(side: Side) -> Self {
        match side {
            Side::Buy => EventKind::PositionOpenedBuy,
            Side::Sell => EventKind::PositionOpenedSell,
        }
    }

    pub fn position_modified(side: Side, change: PositionChange) -> Self {
        match (side, change) {
            (Side::Buy, PositionChange::Volume) => EventKind::PositionModifiedBuyVolume,
            (Side::Buy, PositionChange::StopLoss) => EventKind::PositionModifiedBuyStopLoss,
            (Side::Buy, PositionChange::TakeProfit) => EventKind::PositionModifiedBuyTakeProfit,
            (Side::Sell, PositionChange::Volume) => EventKind::PositionModifiedSellVolume,
            (Side::Sell, PositionChange::StopLoss) => EventKind::PositionModifiedSellStopLoss,
            (Side::Sell, PositionChange::TakeProfit) => EventKind::PositionModifiedSellTakeProfit,
        }
    }

    pub fn position_closed(side: Side) -> Self {
        match side {
            Side::Buy => EventKind::PositionClosedBuy,
            Side::Sell => EventKind::PositionClosedSell,
        }
    }

    pub fn target_crossed(edge: PriceEdge) -> Self {
        match edge {
            PriceEdge::AskAbove => EventKind::AskAboveTarget,
            PriceEdge::AskBelow => EventKind::AskBelowTarget,
            PriceEdge::BidAbove => EventKind::BidAboveTarget,
            PriceEdge::BidBelow => EventKind::BidBelowTarget,
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}

impl Event {
    /// The discriminant transitions are registered against
    pub fn kind(&self) -> EventKind {
        match self {
            Event::Shutdown => EventKind::Shutdown,
            Event::Complete => EventKind::Complete,
            Event::Account(_) => EventKind::Account,
            Event::Symbol(_) => EventKind::Symbol,
            Event::PositionOpened { side, .. } => EventKind::position_opened(*side),
            Event::PositionModified { side, change, .. } => {
                EventKind::position_modified(*side, *change)
            }
            Event::PositionClosed { side, .. } => EventKind::position_closed(*side),
            Event::BarOpened(_) => EventKind::BarOpened,
            Event::BarClosed(_) => EventKind::BarClosed,
            Event::Tick(_) => EventKind::Tick,
            Event::PriceTargetCrossed { edge, .. } => EventKind::target_crossed(*edge),
        }
    }

    /// Position payload, for the three position event families
    pub fn position(&self) -> Option<(Side, &Position)> {
        match self {
            Event::PositionOpened { side, position }
            | Event::PositionModified { side, position, .. }
            | Event::PositionClosed { side, position } => Some((*side, position)),
            _ => None,
        }
    }

    /// Bar payload of `BarOpened` / `BarClosed`
    pub fn bar(&self) -> Option<&Bar> {
        match self {
            Event::BarOpened(bar) | Event::BarClosed(bar) => Some(bar),
            _ => None,
        }
    }

    pub fn tick(&self) -> Option<&Tick> {
        match self {
            Event::Tick(tick) => Some(tick),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_dense_and_stable() {
        for (i, kind) in EventKind::ALL.iter().enumerate() {
            assert_eq!(kind.id() as usize, i);
            assert_eq!(EventKind::from_id(i as u8), Some(*kind));
        }
        assert_eq!(EventKind::from_id(21), None);
        assert_eq!(EventKind::from_id(255), None);
    }

    #[test]
    fn test_kind_splits_by_side_and_change() {
        let position = Position {
            volume: 1.0,
            entry: 1.1,
            stop_loss: None,
            take_profit: None,
        };
        let event = Event::PositionModified {
            side: Side::Sell,
            change: PositionChange::StopLoss,
            position,
        };
        assert_eq!(event.kind(), EventKind::PositionModifiedSellStopLoss);
        assert_eq!(event.position(), Some((Side::Sell, &position)));

        let crossed = Event::PriceTargetCrossed {
            edge: PriceEdge::BidAbove,
            price: 1.2,
        };
        assert_eq!(crossed.kind(), EventKind::BidAboveTarget);
        assert_eq!(crossed.position(), None);
    }
}
