//! Hermes Strategy Framework
//!
//! Provides the infrastructure for wiring trading logic into the engine:
//! - A generic guarded state machine ([`Machine`], [`Transition`])
//! - The [`Strategy`] trait: two machine factories and a shared context
//! - Market state helpers (bar history, indicator window)
//! - Built-in strategies for data collection and position management
//!
//! ## Architecture
//!
//! ```text
//!                 Event (one at a time)
//!                        │
//!          ┌─────────────┴─────────────┐
//!          ▼                           ▼
//!   ┌──────────────┐            ┌──────────────┐
//!   │Signal Machine│            │ Risk Machine │
//!   │  (entries)   │            │ (lifecycle)  │
//!   └──────┬───────┘            └──────┬───────┘
//!          │     &mut Strategy::Context │
//!          └────────────┬──────────────┘
//!                       ▼
//!             Option<Command> x 2 → merged by the orchestrator
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use hermes_strategy::{Machine, Transition};
//! use hermes_core::EventKind;
//!
//! let mut machine = Machine::new("Signal");
//! let waiting = machine.create_state("Waiting", false);
//! let done = machine.create_state("Done", true);
//! machine.on(waiting, EventKind::Shutdown, Transition::to(done).reason("Terminated"))?;
//! ```

pub mod machine;
pub mod market;
pub mod strategies;
pub mod strategy;

// Re-export main types
pub use machine::{Machine, MachineError, StateId, Transition};
pub use market::{History, MarketParams, MarketWindow};
pub use strategies::{Downloader, Guardian, GuardianContext, RiskParams, RiskState};
pub use strategy::Strategy;
