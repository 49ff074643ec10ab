//! Strategy Trait
//!
//! A strategy is a pair of machine factories plus the context both
//! machines share. The orchestrator builds both machines once per
//! connection, then owns the context and lends it to every dispatch.

use crate::machine::{Machine, MachineError};

/// Strategy trait - implement this for your trading strategy
pub trait Strategy {
    /// State shared by the signal and risk machines
    type Context;

    /// Strategy name for logging
    fn name(&self) -> &str;

    /// Decision logic: when to open positions
    fn build_signal_machine(&self) -> Result<Machine<Self::Context>, MachineError> {
        Ok(Machine::idle("Signal"))
    }

    /// Position lifecycle: how open positions are managed
    fn build_risk_machine(&self) -> Result<Machine<Self::Context>, MachineError> {
        Ok(Machine::idle("Risk"))
    }

    /// Consume the strategy into the context its machines run against
    fn into_context(self) -> Self::Context;
}
