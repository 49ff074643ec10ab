//! Position lifecycle machine
//!
//! ```text
//!   No Position ──opened──► Waiting SO ──stop-loss moved──► Waiting TSL
//!        ▲                      │                               │
//!        └────────closed────────┴───────────closed──────────────┘
//! ```
//!
//! Waiting SO: subscribed to the scale-out target. Crossing it closes part
//! of the volume; the resulting volume change moves the stop to
//! break-even. Waiting TSL: every tick far enough ahead of the stop trails
//! it. Shutdown ends the machine from any state.
//!
//! A position opened before ATR is known waits in No Position; the first
//! `Complete` or closed bar that brings ATR subscribes it late.

use hermes_core::{Command, Event, EventKind, PositionChange, PriceEdge, Side};

use super::GuardianContext;
use crate::machine::{Machine, MachineError, StateId, Transition};

fn to(state: StateId) -> Transition<GuardianContext> {
    Transition::to(state)
}

fn sync(ctx: &mut GuardianContext, event: &Event) -> Option<Command> {
    ctx.risk.sync(event);
    None
}

fn close(ctx: &mut GuardianContext, _: &Event) -> Option<Command> {
    ctx.risk.clear();
    None
}

/// Subscribe to the scale-out target of the tracked position
fn subscribe(ctx: &mut GuardianContext, _: &Event) -> Option<Command> {
    let side = ctx.risk.side()?;
    let target = ctx.risk.scale_out_target()?;
    Some(Command::SubscribePriceTarget {
        edge: PriceEdge::favorable(side),
        target: Some(target),
    })
}

fn label(side: Side) -> &'static str {
    match side {
        Side::Buy => "Buy",
        Side::Sell => "Sell",
    }
}

pub(super) fn build() -> Result<Machine<GuardianContext>, MachineError> {
    let mut machine = Machine::new("Risk Management");
    let flat = machine.create_state("No Position", false);
    let scaling = machine.create_state("Waiting SO", false);
    let trailing = machine.create_state("Waiting TSL", false);
    let end = machine.create_state("End", true);

    for side in [Side::Buy, Side::Sell] {
        machine.on(
            flat,
            EventKind::position_opened(side),
            to(scaling)
                .when(|ctx, _| ctx.risk.atr.is_some())
                .then(|ctx, event| {
                    ctx.risk.sync(event);
                    subscribe(ctx, event)
                })
                .reason(format!("Opened {} Position", label(side))),
        )?;
        // Without ATR there is no distance to manage by yet
        machine.on(
            flat,
            EventKind::position_opened(side),
            to(flat).then(|ctx, event| {
                log::warn!("Position opened before ATR is known, managing it once ATR is ready");
                ctx.risk.sync(event);
                None
            }),
        )?;
        machine.on(flat, EventKind::position_closed(side), to(flat).then(close))?;

        machine.on(
            scaling,
            EventKind::target_crossed(PriceEdge::favorable(side)),
            to(scaling)
                .when(move |ctx, _| ctx.risk.side() == Some(side))
                .then(|ctx, _| Some(Command::ModifyVolume(ctx.risk.params.scaling_out_percentage)))
                .reason("Scaling Out"),
        )?;
        machine.on(
            scaling,
            EventKind::position_modified(side, PositionChange::Volume),
            to(scaling)
                .then(|ctx, event| {
                    ctx.risk.sync(event);
                    let price = ctx.risk.break_even()?;
                    Some(Command::ModifyStopLoss(Some(price)))
                })
                .reason("Closed Partially"),
        )?;
        machine.on(
            scaling,
            EventKind::position_modified(side, PositionChange::StopLoss),
            to(trailing).then(sync).reason("Moved To Break-Even"),
        )?;
        machine.on(
            scaling,
            EventKind::position_modified(side, PositionChange::TakeProfit),
            to(scaling).then(sync),
        )?;

        for change in [
            PositionChange::Volume,
            PositionChange::StopLoss,
            PositionChange::TakeProfit,
        ] {
            machine.on(
                trailing,
                EventKind::position_modified(side, change),
                to(trailing).then(sync),
            )?;
        }

        for state in [scaling, trailing] {
            machine.on(
                state,
                EventKind::position_closed(side),
                to(flat)
                    .then(close)
                    .reason(format!("Closed {} Position", label(side))),
            )?;
        }
    }

    for kind in [EventKind::Complete, EventKind::BarClosed] {
        machine.on(
            flat,
            kind,
            to(scaling)
                .when(|ctx, _| ctx.risk.open.is_some() && ctx.risk.atr.is_some())
                .then(subscribe)
                .reason("Adopted Open Position"),
        )?;
    }

    machine.on(
        trailing,
        EventKind::Tick,
        to(trailing)
            .when(|ctx, event| event.tick().is_some_and(|tick| ctx.risk.trail(tick).is_some()))
            .then(|ctx, event| {
                let stop_loss = ctx.risk.trail(event.tick()?)?;
                if let Some(open) = ctx.risk.open.as_mut() {
                    open.position.stop_loss = Some(stop_loss);
                }
                Some(Command::ModifyStopLoss(Some(stop_loss)))
            })
            .reason("Trailed Stop-Loss"),
    )?;

    for state in [flat, scaling, trailing] {
        machine.on(state, EventKind::Shutdown, to(end).reason("Terminated"))?;
    }

    Ok(machine)
}
