//! Market data machine
//!
//! ```text
//!   Warm Up ──Complete──► Tracking
//!      │                     │
//!   Shutdown              Shutdown
//!      ▼                     ▼
//!     End ◄──────────────────┘
//! ```
//!
//! Never replies; it only keeps the shared market state current.

use hermes_core::{Event, EventKind};

use super::GuardianContext;
use crate::machine::{Machine, MachineError, StateId, Transition};

fn to(state: StateId) -> Transition<GuardianContext> {
    Transition::to(state)
}

pub(super) fn build() -> Result<Machine<GuardianContext>, MachineError> {
    let mut machine = Machine::new("Market Data");
    let warm_up = machine.create_state("Warm Up", false);
    let tracking = machine.create_state("Tracking", false);
    let end = machine.create_state("End", true);

    for state in [warm_up, tracking] {
        machine.on(
            state,
            EventKind::Symbol,
            to(state).then(|ctx, event| {
                if let Event::Symbol(symbol) = event {
                    ctx.set_symbol(*symbol);
                }
                None
            }),
        )?;
        machine.on(
            state,
            EventKind::Account,
            to(state).then(|ctx, event| {
                if let Event::Account(account) = event {
                    ctx.account = Some(*account);
                }
                None
            }),
        )?;
    }

    machine.on(
        warm_up,
        EventKind::BarClosed,
        to(warm_up).then(|ctx, event| {
            ctx.warm(event);
            None
        }),
    )?;
    machine.on(
        warm_up,
        EventKind::Complete,
        to(tracking)
            .then(|ctx, _| {
                ctx.prepare();
                None
            })
            .reason("History Complete"),
    )?;
    machine.on(
        warm_up,
        EventKind::Shutdown,
        to(end)
            .then(|ctx, _| {
                ctx.history.persist();
                None
            })
            .reason("Error"),
    )?;

    machine.on(
        tracking,
        EventKind::BarClosed,
        to(tracking).then(|ctx, event| {
            ctx.track(event);
            None
        }),
    )?;
    machine.on(
        tracking,
        EventKind::Shutdown,
        to(end)
            .then(|ctx, _| {
                ctx.history.persist_and_compact();
                None
            })
            .reason("Terminated"),
    )?;

    Ok(machine)
}
