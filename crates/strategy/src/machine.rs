//! Guarded finite-state machine
//!
//! A [`Machine`] owns its states; each state maps an [`EventKind`] to an
//! ordered list of [`Transition`]s. Dispatching an event tries the
//! transitions registered for its kind in registration order and takes the
//! first whose guard passes. Only `dispatch` moves the current state.
//!
//! Guards and actions receive the strategy context explicitly, so every
//! dependency of a transition is visible at its registration site.

use hermes_core::{Command, Event, EventKind};
use indexmap::IndexMap;
use thiserror::Error;

/// Handle to a state, valid for the machine that created it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StateId(usize);

pub type Guard<C> = Box<dyn Fn(&C, &Event) -> bool + Send>;
pub type Action<C> = Box<dyn Fn(&mut C, &Event) -> Option<Command> + Send>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MachineError {
    #[error("Machine {machine} has no state {state}")]
    UnknownState { machine: String, state: usize },

    #[error("Machine {0} has no states")]
    NoStates(String),
}

/// Edge to `destination`, optionally guarded, optionally acting
pub struct Transition<C> {
    guard: Option<Guard<C>>,
    action: Option<Action<C>>,
    destination: StateId,
    reason: Option<String>,
}

impl<C> Transition<C> {
    /// Unguarded, no-op transition to `destination`
    pub fn to(destination: StateId) -> Self {
        Self {
            guard: None,
            action: None,
            destination,
            reason: None,
        }
    }

    /// Only take this transition when `guard` holds
    pub fn when(mut self, guard: impl Fn(&C, &Event) -> bool + Send + 'static) -> Self {
        self.guard = Some(Box::new(guard));
        self
    }

    /// Run `action` when taken; its command is the machine's reply
    pub fn then(
        mut self,
        action: impl Fn(&mut C, &Event) -> Option<Command> + Send + 'static,
    ) -> Self {
        self.action = Some(Box::new(action));
        self
    }

    /// Log the transition with this reason when taken
    pub fn reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    fn passes(&self, context: &C, event: &Event) -> bool {
        self.guard.as_ref().is_none_or(|guard| guard(context, event))
    }
}

struct State<C> {
    label: String,
    terminal: bool,
    transitions: IndexMap<EventKind, Vec<Transition<C>>>,
}

/// Named automaton over a strategy context `C`
pub struct Machine<C> {
    name: String,
    states: Vec<State<C>>,
    current: Option<StateId>,
}

impl<C> Machine<C> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            states: Vec::new(),
            current: None,
        }
    }

    /// Machine with a single terminal state, for strategies that drive only
    /// one of their two machines
    pub fn idle(name: impl Into<String>) -> Self {
        let mut machine = Self::new(name);
        machine.create_state("Idle", true);
        machine
    }

    /// Append a state; the first state created becomes current
    pub fn create_state(&mut self, label: impl Into<String>, terminal: bool) -> StateId {
        let id = StateId(self.states.len());
        self.states.push(State {
            label: label.into(),
            terminal,
            transitions: IndexMap::new(),
        });
        if self.current.is_none() {
            self.current = Some(id);
        }
        id
    }

    fn check(&self, state: StateId) -> Result<(), MachineError> {
        if state.0 < self.states.len() {
            Ok(())
        } else {
            Err(MachineError::UnknownState {
                machine: self.name.clone(),
                state: state.0,
            })
        }
    }

    /// Register `transition` from `state` on events of `kind`
    ///
    /// Registrations for the same state and kind are tried in order.
    pub fn on(
        &mut self,
        state: StateId,
        kind: EventKind,
        transition: Transition<C>,
    ) -> Result<(), MachineError> {
        self.check(state)?;
        self.check(transition.destination)?;
        self.states[state.0]
            .transitions
            .entry(kind)
            .or_default()
            .push(transition);
        Ok(())
    }

    /// Advance at most one step on `event`
    ///
    /// Returns the command of the taken transition's action. With no
    /// registered transition or no passing guard, nothing runs and the
    /// current state is unchanged.
    pub fn dispatch(&mut self, event: &Event, context: &mut C) -> Option<Command> {
        let current = self.current?;
        let candidates = self.states[current.0].transitions.get(&event.kind())?;
        let transition = candidates
            .iter()
            .find(|transition| transition.passes(&*context, event))?;

        let command = transition
            .action
            .as_ref()
            .and_then(|action| action(context, event));
        let destination = transition.destination;
        if let Some(reason) = &transition.reason {
            log::info!(
                "[{}] {} --({})--> {}",
                self.name,
                self.states[current.0].label,
                reason,
                self.states[destination.0].label
            );
        }
        self.current = Some(destination);
        command
    }

    /// Whether the current state is terminal; a machine without states is
    pub fn is_terminal(&self) -> bool {
        self.current
            .is_none_or(|current| self.states[current.0].terminal)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn current(&self) -> Option<StateId> {
        self.current
    }

    pub fn current_label(&self) -> Option<&str> {
        self.current.and_then(|current| self.label(current))
    }

    pub fn label(&self, state: StateId) -> Option<&str> {
        self.states.get(state.0).map(|state| state.label.as_str())
    }

    /// Number of states
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

impl<C> std::fmt::Debug for Machine<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Machine")
            .field("name", &self.name)
            .field("states", &self.states.len())
            .field("current", &self.current_label())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hermes_core::Tick;

    #[derive(Default)]
    struct Counter {
        ticks: u32,
    }

    fn tick(ask: f64) -> Event {
        Event::Tick(Tick { ask, bid: ask })
    }

    #[test]
    fn test_first_state_is_initial() {
        let mut machine: Machine<Counter> = Machine::new("Test");
        assert!(machine.is_terminal());
        let a = machine.create_state("A", false);
        let b = machine.create_state("B", true);
        assert_eq!(machine.current(), Some(a));
        assert_eq!(machine.label(b), Some("B"));
        assert!(!machine.is_terminal());
    }

    #[test]
    fn test_unregistered_kind_is_ignored() {
        let mut machine: Machine<Counter> = Machine::new("Test");
        let a = machine.create_state("A", false);
        let b = machine.create_state("B", false);
        machine
            .on(a, EventKind::Complete, Transition::to(b))
            .unwrap();

        let mut ctx = Counter::default();
        assert_eq!(machine.dispatch(&tick(1.0), &mut ctx), None);
        assert_eq!(machine.current(), Some(a));
        assert_eq!(machine.dispatch(&Event::Shutdown, &mut ctx), None);
        assert_eq!(machine.current(), Some(a));
    }

    #[test]
    fn test_first_passing_guard_wins() {
        let mut machine: Machine<Counter> = Machine::new("Test");
        let a = machine.create_state("A", false);
        let low = machine.create_state("Low", false);
        let high = machine.create_state("High", false);
        let any = machine.create_state("Any", false);

        let above = |threshold: f64| {
            move |_: &Counter, event: &Event| event.tick().is_some_and(|t| t.ask > threshold)
        };
        machine
            .on(a, EventKind::Tick, Transition::to(high).when(above(2.0)))
            .unwrap();
        machine
            .on(a, EventKind::Tick, Transition::to(low).when(above(1.0)))
            .unwrap();
        machine.on(a, EventKind::Tick, Transition::to(any)).unwrap();

        let mut ctx = Counter::default();
        // Both guarded transitions pass; registration order decides
        machine.dispatch(&tick(3.0), &mut ctx);
        assert_eq!(machine.current(), Some(high));
    }

    #[test]
    fn test_no_passing_guard_keeps_state() {
        let mut machine: Machine<Counter> = Machine::new("Test");
        let a = machine.create_state("A", false);
        let b = machine.create_state("B", false);
        machine
            .on(
                a,
                EventKind::Tick,
                Transition::to(b)
                    .when(|ctx: &Counter, _| ctx.ticks > 0)
                    .then(|ctx: &mut Counter, _| {
                        ctx.ticks += 100;
                        None
                    }),
            )
            .unwrap();

        let mut ctx = Counter::default();
        assert_eq!(machine.dispatch(&tick(1.0), &mut ctx), None);
        assert_eq!(machine.current(), Some(a));
        assert_eq!(ctx.ticks, 0);
    }

    #[test]
    fn test_action_mutates_context_and_replies() {
        let mut machine: Machine<Counter> = Machine::new("Test");
        let a = machine.create_state("A", false);
        let done = machine.create_state("Done", true);
        machine
            .on(
                a,
                EventKind::Tick,
                Transition::to(a).then(|ctx: &mut Counter, _| {
                    ctx.ticks += 1;
                    None
                }),
            )
            .unwrap();
        machine
            .on(
                a,
                EventKind::Shutdown,
                Transition::to(done)
                    .then(|ctx: &mut Counter, _| Some(Command::ModifyVolume(ctx.ticks as f64)))
                    .reason("Terminated"),
            )
            .unwrap();

        let mut ctx = Counter::default();
        machine.dispatch(&tick(1.0), &mut ctx);
        machine.dispatch(&tick(1.0), &mut ctx);
        assert_eq!(ctx.ticks, 2);
        assert!(!machine.is_terminal());

        let reply = machine.dispatch(&Event::Shutdown, &mut ctx);
        assert_eq!(reply, Some(Command::ModifyVolume(2.0)));
        assert!(machine.is_terminal());
        assert_eq!(machine.current_label(), Some("Done"));
    }

    #[test]
    fn test_on_rejects_foreign_states() {
        let mut other: Machine<Counter> = Machine::new("Other");
        other.create_state("X", false);
        let foreign = other.create_state("Y", false);

        let mut machine: Machine<Counter> = Machine::new("Test");
        let a = machine.create_state("A", false);
        assert_eq!(
            machine.on(a, EventKind::Tick, Transition::to(foreign)),
            Err(MachineError::UnknownState {
                machine: "Test".to_string(),
                state: 1
            })
        );
        assert!(machine.on(foreign, EventKind::Tick, Transition::to(a)).is_err());
    }

    #[test]
    fn test_idle_is_terminal() {
        let machine: Machine<Counter> = Machine::idle("Risk");
        assert!(machine.is_terminal());
        assert_eq!(machine.current_label(), Some("Idle"));
    }
}
