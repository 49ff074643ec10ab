use super::PriceEdge;

/// Market bias of a trading signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Bullish,
    Sideways,
    Bearish,
}

/// How the signal amount is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sizing {
    /// Amount is a lot volume
    Fixed,
    /// Amount is a percentage of the account put at risk
    Dynamic,
}

/// Request to open a position
///
/// Stop-loss and take-profit are distances in pips from the entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Signal {
    pub direction: Direction,
    pub sizing: Sizing,
    pub amount: f64,
    pub stop_loss: Option<f64>,
    pub take_profit: Option<f64>,
}

/// Outbound action answering one event
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// Bare acknowledgment
    Complete,
    Signal(Signal),
    /// Close this percentage of the open volume
    ModifyVolume(f64),
    /// Move the stop-loss to an absolute price, or remove it
    ModifyStopLoss(Option<f64>),
    /// Move the take-profit to an absolute price, or remove it
    ModifyTakeProfit(Option<f64>),
    /// Watch a price level; `None` cancels the watch on that edge
    SubscribePriceTarget {
        edge: PriceEdge,
        target: Option<f64>,
    },
}

/// Discriminant of a [`Command`]; the value is the wire id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum CommandKind {
    Complete = 0,
    SignalBullishFixed = 1,
    SignalBullishDynamic = 2,
    SignalSidewaysFixed = 3,
    SignalSidewaysDynamic = 4,
    SignalBearishFixed = 5,
    SignalBearishDynamic = 6,
    ModifyVolume = 7,
    ModifyStopLoss = 8,
    ModifyTakeProfit = 9,
    SubscribeAskAbove = 10,
    SubscribeAskBelow = 11,
    SubscribeBidAbove = 12,
    SubscribeBidBelow = 13,
}

impl CommandKind {
    /// Every kind in wire order
    pub const ALL: [CommandKind; 14] = [
        CommandKind::Complete,
        CommandKind::SignalBullishFixed,
        CommandKind::SignalBullishDynamic,
        CommandKind::SignalSidewaysFixed,
        CommandKind::SignalSidewaysDynamic,
        CommandKind::SignalBearishFixed,
        CommandKind::SignalBearishDynamic,
        CommandKind::ModifyVolume,
        CommandKind::ModifyStopLoss,
        CommandKind::ModifyTakeProfit,
        CommandKind::SubscribeAskAbove,
        CommandKind::SubscribeAskBelow,
        CommandKind::SubscribeBidAbove,
        CommandKind::SubscribeBidBelow,
    ];

    /// Wire id
    pub fn id(self) -> u8 {
        self as u8
    }

    /// Look up a kind by wire id
    pub fn from_id(id: u8) -> Option<Self> {
        Self::ALL.get(id as usize).copied()
    }

    pub fn signal(direction: Direction, sizing: Sizing) -> Self {
        match (direction, sizing) {
            (Direction::Bullish, Sizing::Fixed) => CommandKind::SignalBullishFixed,
            (Direction::Bullish, Sizing::Dynamic) => CommandKind::SignalBullishDynamic,
            (Direction::Sideways, Sizing::Fixed) => CommandKind::SignalSidewaysFixed,
            (Direction::Sideways, Sizing::Dynamic) => CommandKind::SignalSidewaysDynamic,
            (Direction::Bearish, Sizing::Fixed) => CommandKind::SignalBearishFixed,
            (Direction::Bearish, Sizing::Dynamic) => CommandKind::SignalBearishDynamic,
        }
    }

    pub fn subscribe(edge: PriceEdge) -> Self {
        Self::ALL[(CommandKind::SubscribeAskAbove.id() + edge.offset()) as usize]
    }

    /// Direction and sizing of a signal kind
    pub fn signal_parts(self) -> Option<(Direction, Sizing)> {
        match self {
            CommandKind::SignalBullishFixed => Some((Direction::Bullish, Sizing::Fixed)),
            CommandKind::SignalBullishDynamic => Some((Direction::Bullish, Sizing::Dynamic)),
            CommandKind::SignalSidewaysFixed => Some((Direction::Sideways, Sizing::Fixed)),
            CommandKind::SignalSidewaysDynamic => Some((Direction::Sideways, Sizing::Dynamic)),
            CommandKind::SignalBearishFixed => Some((Direction::Bearish, Sizing::Fixed)),
            CommandKind::SignalBearishDynamic => Some((Direction::Bearish, Sizing::Dynamic)),
            _ => None,
        }
    }

    /// Edge of a subscription kind
    pub fn subscribed_edge(self) -> Option<PriceEdge> {
        match self {
            CommandKind::SubscribeAskAbove => Some(PriceEdge::AskAbove),
            CommandKind::SubscribeAskBelow => Some(PriceEdge::AskBelow),
            CommandKind::SubscribeBidAbove => Some(PriceEdge::BidAbove),
            CommandKind::SubscribeBidBelow => Some(PriceEdge::BidBelow),
            _ => None,
        }
    }
}

impl Command {
    pub fn kind(&self) -> CommandKind {
        match self {
            Command::Complete => CommandKind::Complete,
            Command::Signal(signal) => CommandKind::signal(signal.direction, signal.sizing),
            Command::ModifyVolume(_) => CommandKind::ModifyVolume,
            Command::ModifyStopLoss(_) => CommandKind::ModifyStopLoss,
            Command::ModifyTakeProfit(_) => CommandKind::ModifyTakeProfit,
            Command::SubscribePriceTarget { edge, .. } => CommandKind::subscribe(*edge),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_kinds_roundtrip_through_parts() {
        for kind in CommandKind::ALL {
            if let Some((direction, sizing)) = kind.signal_parts() {
                assert_eq!(CommandKind::signal(direction, sizing), kind);
            }
        }
    }

    #[test]
    fn test_subscribe_ids_follow_edge_order() {
        for edge in PriceEdge::ALL {
            let kind = CommandKind::subscribe(edge);
            assert_eq!(kind.subscribed_edge(), Some(edge));
        }
        assert_eq!(CommandKind::subscribe(PriceEdge::BidBelow).id(), 13);
        assert_eq!(CommandKind::from_id(14), None);
    }
}
