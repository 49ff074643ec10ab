//! Strategy Orchestrator
//!
//! Owns one signal machine, one risk machine and the context they share.
//! For every inbound event it dispatches to both machines (signal first,
//! always both), merges their replies into exactly one command, and sends
//! it back. `Shutdown` ends the loop without a reply.
//!
//! ```text
//!  receive ─► decode ─► signal.dispatch ─┐
//!                      risk.dispatch  ───┴─► merge ─► encode ─► send
//! ```

use hermes_core::{Command, Event};
use hermes_gateway::{
    Channel, ConnectError, DecodeError, EncodeError, Endpoint, FrameError, Transport,
    TransportError, encode_command, read_event,
};
use hermes_strategy::{Machine, MachineError, Strategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which machine's reply wins when both produce one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Precedence {
    #[default]
    SignalFirst,
    RiskFirst,
}

/// Reply policy of the orchestrator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DispatchPolicy {
    #[serde(default)]
    pub precedence: Precedence,

    /// Answer `Shutdown` like any other event instead of hanging up silently
    #[serde(default)]
    pub reply_on_shutdown: bool,
}

impl DispatchPolicy {
    /// The single command answering an event; `Complete` when neither replies
    pub fn merge(&self, signal: Option<Command>, risk: Option<Command>) -> Command {
        let merged = match self.precedence {
            Precedence::SignalFirst => signal.or(risk),
            Precedence::RiskFirst => risk.or(signal),
        };
        merged.unwrap_or(Command::Complete)
    }
}

/// Result of handling one event
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    /// Send this command and keep going
    Reply(Command),
    /// Stop; send `reply` first if the policy asks for one
    Shutdown { reply: Option<Command> },
}

/// How a connection ended normally
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Both machines reached a terminal state
    Completed { events: usize },
    /// The platform sent `Shutdown`
    Shutdown { events: usize },
}

/// Fatal to the current connection
#[derive(Error, Debug)]
pub enum RunError {
    #[error("Connect failed: {0}")]
    Connect(#[from] ConnectError),

    #[error("Decode failed: {0}")]
    Decode(#[from] DecodeError),

    #[error("Encode failed: {0}")]
    Encode(#[from] EncodeError),

    #[error("Transport failed: {0}")]
    Transport(#[from] TransportError),
}

impl From<FrameError> for RunError {
    fn from(e: FrameError) -> Self {
        match e {
            FrameError::Transport(e) => RunError::Transport(e),
            FrameError::Decode(e) => RunError::Decode(e),
            FrameError::Encode(e) => RunError::Encode(e),
        }
    }
}

/// Connected channel that closes itself on every exit path
struct Connection<'a, C: Channel> {
    endpoint: &'a Endpoint,
    channel: C,
}

impl<'a, C: Channel> Connection<'a, C> {
    fn open(endpoint: &'a Endpoint, channel: C) -> Self {
        log::info!("API {}: Connected", endpoint);
        Self { endpoint, channel }
    }

    fn send(&mut self, command: &Command) -> Result<(), RunError> {
        let bytes = encode_command(command)?;
        self.channel.send(&bytes)?;
        Ok(())
    }
}

impl<C: Channel> Drop for Connection<'_, C> {
    fn drop(&mut self) {
        if let Err(e) = self.channel.close() {
            log::warn!("API {}: close failed: {}", self.endpoint, e);
        }
        log::info!("API {}: Disconnected", self.endpoint);
    }
}

pub struct StrategyOrchestrator<C> {
    name: String,
    signal: Machine<C>,
    risk: Machine<C>,
    context: C,
    policy: DispatchPolicy,
}

impl<C> StrategyOrchestrator<C> {
    /// Build both machines once and take ownership of the strategy context
    pub fn new<S>(strategy: S) -> Result<Self, MachineError>
    where
        S: Strategy<Context = C>,
    {
        let signal = strategy.build_signal_machine()?;
        let risk = strategy.build_risk_machine()?;
        for machine in [&signal, &risk] {
            if machine.is_empty() {
                return Err(MachineError::NoStates(machine.name().to_string()));
            }
        }
        Ok(Self {
            name: strategy.name().to_string(),
            signal,
            risk,
            context: strategy.into_context(),
            policy: DispatchPolicy::default(),
        })
    }

    pub fn with_policy(mut self, policy: DispatchPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn policy(&self) -> &DispatchPolicy {
        &self.policy
    }

    pub fn context(&self) -> &C {
        &self.context
    }

    pub fn signal(&self) -> &Machine<C> {
        &self.signal
    }

    pub fn risk(&self) -> &Machine<C> {
        &self.risk
    }

    /// Both machines are done
    pub fn is_terminal(&self) -> bool {
        self.signal.is_terminal() && self.risk.is_terminal()
    }

    /// Dispatch one event to both machines and merge their replies
    pub fn step(&mut self, event: &Event) -> Step {
        let signal = self.signal.dispatch(event, &mut self.context);
        let risk = self.risk.dispatch(event, &mut self.context);

        if matches!(event, Event::Shutdown) {
            let reply = self
                .policy
                .reply_on_shutdown
                .then(|| self.policy.merge(signal, risk));
            return Step::Shutdown { reply };
        }
        Step::Reply(self.policy.merge(signal, risk))
    }

    /// Serve one connection until both machines are terminal or the
    /// platform shuts down
    ///
    /// Errors are fatal to this connection only and are logged once with
    /// the endpoint before the channel is released.
    pub fn run<T: Transport>(&mut self, transport: &T) -> Result<RunOutcome, RunError> {
        let endpoint = transport.endpoint();
        let channel = transport.connect().inspect_err(|e| {
            log::error!("API {}: {}", endpoint, e);
        })?;

        let mut connection = Connection::open(endpoint, channel);
        let result = self.pump(&mut connection);
        if let Err(e) = &result {
            log::error!("API {}: {}", endpoint, e);
        }
        result
    }

    fn pump<Ch: Channel>(&mut self, connection: &mut Connection<'_, Ch>) -> Result<RunOutcome, RunError> {
        let mut events = 0;
        while !self.is_terminal() {
            let event = read_event(&mut connection.channel)?;
            events += 1;
            log::debug!("API {}: {:?}", connection.endpoint, event.kind());

            match self.step(&event) {
                Step::Reply(command) => connection.send(&command)?,
                Step::Shutdown { reply } => {
                    log::warn!(
                        "API {}: Shutdown strategy and safely terminate operations",
                        connection.endpoint
                    );
                    if let Some(command) = reply {
                        connection.send(&command)?;
                    }
                    return Ok(RunOutcome::Shutdown { events });
                }
            }
        }
        log::info!(
            "[{}] {} and {} finished",
            self.name,
            self.signal.name(),
            self.risk.name()
        );
        Ok(RunOutcome::Completed { events })
    }
}
