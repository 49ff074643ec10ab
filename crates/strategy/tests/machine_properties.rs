//! Property tests for the guarded state machine
//!
//! Machines are generated with random registrations per state, then driven
//! by random event scripts covering every event kind:
//! 1. An event kind with no registration in the current state returns no
//!    command and leaves the state unchanged
//! 2. A registered, unguarded transition always fires

use chrono::{DateTime, Utc};
use hermes_core::{
    Account, Bar, Command, Event, EventKind, Position, PositionChange, PriceEdge, Side,
    SymbolInfo, Tick,
};
use hermes_strategy::{Machine, StateId, Transition};
use proptest::prelude::*;

/// One event of every kind, in wire order
fn every_kind() -> Vec<Event> {
    let position = Position {
        volume: 1.0,
        entry: 1.2,
        stop_loss: None,
        take_profit: None,
    };
    let bar = Bar {
        time: DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap(),
        open: 1.2,
        high: 1.21,
        low: 1.19,
        close: 1.2,
        volume: 10,
    };

    let mut events = vec![
        Event::Shutdown,
        Event::Complete,
        Event::Account(Account {
            balance: 1000.0,
            equity: 1000.0,
        }),
        Event::Symbol(SymbolInfo {
            digits: 5,
            pip_size: 0.0001,
            tick_size: 0.00001,
        }),
    ];
    for side in [Side::Buy, Side::Sell] {
        events.push(Event::PositionOpened { side, position });
    }
    for side in [Side::Buy, Side::Sell] {
        for change in [
            PositionChange::Volume,
            PositionChange::StopLoss,
            PositionChange::TakeProfit,
        ] {
            events.push(Event::PositionModified {
                side,
                change,
                position,
            });
        }
    }
    for side in [Side::Buy, Side::Sell] {
        events.push(Event::PositionClosed { side, position });
    }
    events.push(Event::BarOpened(bar));
    events.push(Event::BarClosed(bar));
    events.push(Event::Tick(Tick { ask: 1.2, bid: 1.2 }));
    events.extend(
        PriceEdge::ALL
            .iter()
            .map(|&edge| Event::PriceTargetCrossed { edge, price: 1.2 }),
    );
    events
}

fn registered(mask: u32, kind: EventKind) -> bool {
    mask & (1 << kind.id()) != 0
}

#[test]
fn test_every_kind_covers_the_table() {
    let kinds: Vec<EventKind> = every_kind().iter().map(Event::kind).collect();
    assert_eq!(kinds, EventKind::ALL.to_vec());
}

#[test]
fn test_bare_state_ignores_every_kind() {
    let mut machine: Machine<()> = Machine::new("Bare");
    let only = machine.create_state("Only", false);
    for event in every_kind() {
        assert_eq!(machine.dispatch(&event, &mut ()), None);
        assert_eq!(machine.current(), Some(only));
    }
}

proptest! {
    #[test]
    fn unregistered_kinds_never_move(
        masks in prop::collection::vec(any::<u32>(), 1..5),
        script in prop::collection::vec(0usize..21, 1..40),
    ) {
        let events = every_kind();
        let mut machine: Machine<()> = Machine::new("Generated");
        let states: Vec<StateId> = (0..masks.len())
            .map(|i| machine.create_state(format!("S{}", i), false))
            .collect();

        // Each state moves to the next one on its registered kinds
        for (i, &mask) in masks.iter().enumerate() {
            let destination = states[(i + 1) % states.len()];
            for &kind in EventKind::ALL.iter().filter(|&&kind| registered(mask, kind)) {
                machine
                    .on(
                        states[i],
                        kind,
                        Transition::to(destination).then(|_: &mut (), _| Some(Command::Complete)),
                    )
                    .unwrap();
            }
        }

        for index in script {
            let event = &events[index];
            let before = machine.current().unwrap();
            let at = states.iter().position(|&s| s == before).unwrap();

            let reply = machine.dispatch(event, &mut ());
            if registered(masks[at], event.kind()) {
                prop_assert_eq!(reply, Some(Command::Complete));
                prop_assert_eq!(machine.current(), Some(states[(at + 1) % states.len()]));
            } else {
                prop_assert_eq!(reply, None);
                prop_assert_eq!(machine.current(), Some(before));
            }
        }
    }
}
