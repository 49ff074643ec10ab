//! Downloader Strategy
//!
//! Records every closed bar the platform replays or streams and persists
//! them to the OHLCV store when the session ends. It never trades.
//!
//! ```text
//!   History ──Complete──► Live
//!      │                    │
//!   Shutdown             Shutdown
//!      ▼                    ▼
//!     End ◄─────────────────┘
//! ```

use hermes_core::{Command, Event, EventKind};
use hermes_store::OhlcvStore;

use crate::machine::{Machine, MachineError, Transition};
use crate::market::History;
use crate::strategy::Strategy;

/// Context of the downloader machines
#[derive(Debug)]
pub struct Recording {
    pub history: History,
    /// Bars seen since the connection opened
    pub received: usize,
}

impl Recording {
    fn record(&mut self, event: &Event) {
        if let Some(bar) = event.bar() {
            self.history.record(bar);
            self.received += 1;
        }
    }
}

pub struct Downloader {
    store: Option<OhlcvStore>,
}

impl Downloader {
    pub fn new(store: Option<OhlcvStore>) -> Self {
        Self { store }
    }
}

impl Strategy for Downloader {
    type Context = Recording;

    fn name(&self) -> &str {
        "downloader"
    }

    fn build_signal_machine(&self) -> Result<Machine<Recording>, MachineError> {
        let mut machine = Machine::new("Downloader");
        let history = machine.create_state("History", false);
        let live = machine.create_state("Live", false);
        let end = machine.create_state("End", true);

        let record = |ctx: &mut Recording, event: &Event| -> Option<Command> {
            ctx.record(event);
            None
        };

        machine.on(history, EventKind::BarClosed, Transition::to(history).then(record))?;
        machine.on(
            history,
            EventKind::Complete,
            Transition::to(live).reason("History Complete"),
        )?;
        machine.on(
            history,
            EventKind::Shutdown,
            Transition::to(end)
                .then(|ctx: &mut Recording, _| {
                    ctx.history.persist();
                    None
                })
                .reason("Error"),
        )?;

        machine.on(live, EventKind::BarClosed, Transition::to(live).then(record))?;
        machine.on(
            live,
            EventKind::Shutdown,
            Transition::to(end)
                .then(|ctx: &mut Recording, _| {
                    ctx.history.persist_and_compact();
                    None
                })
                .reason("Terminated"),
        )?;

        Ok(machine)
    }

    fn into_context(self) -> Recording {
        Recording {
            history: History::new(self.store),
            received: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use hermes_core::Bar;

    fn bar_closed(ms: i64) -> Event {
        Event::BarClosed(Bar {
            time: DateTime::<Utc>::from_timestamp_millis(ms).unwrap(),
            open: 1.0,
            high: 1.0,
            low: 1.0,
            close: 1.0,
            volume: 1,
        })
    }

    #[test]
    fn test_records_bars_until_shutdown() {
        let strategy = Downloader::new(None);
        let mut machine = strategy.build_signal_machine().unwrap();
        let mut risk = strategy.build_risk_machine().unwrap();
        let mut ctx = strategy.into_context();

        assert!(risk.is_terminal());
        assert_eq!(machine.dispatch(&bar_closed(0), &mut ctx), None);
        assert_eq!(machine.dispatch(&Event::Complete, &mut ctx), None);
        assert_eq!(machine.current_label(), Some("Live"));
        machine.dispatch(&bar_closed(60_000), &mut ctx);
        // Opened bars are not recorded
        machine.dispatch(&Event::BarOpened(*bar_closed(120_000).bar().unwrap()), &mut ctx);
        assert_eq!(ctx.received, 2);

        assert_eq!(risk.dispatch(&Event::Shutdown, &mut ctx), None);
        machine.dispatch(&Event::Shutdown, &mut ctx);
        assert!(machine.is_terminal());
        assert_eq!(ctx.history.pending().len(), 2);
    }
}
