//! Controller lifecycle state machine.
//!
//! ```text
//! ┌───────────────┐  connected + time set  ┌─────────────┐
//! │ Bootstrapping │ ─────────────────────▶ │ Operational │ ◀─┐ cycle + idle
//! └──────┬────────┘                        └──────┬──────┘ ──┘
//!        │ budget exhausted                       │ reconnect exhausted,
//!        │                                        │ sensor or transport fault
//!        ▼                                        ▼
//!      ┌──────────────────────────────────────────────┐
//!      │ Restarting (terminal)                         │
//!      └──────────────────────────────────────────────┘
//! ```
//!
//! The table is fixed; a transition not listed in a row's `successors` is
//! refused. Nothing leaves `Restarting`: the process ends there.

use core::fmt;

use log::info;

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum StateId {
    Bootstrapping = 0,
    Operational = 1,
    Restarting = 2,
}

impl StateId {
    /// Total number of states, used to size the table array.
    pub const COUNT: usize = 3;

    pub fn name(self) -> &'static str {
        STATE_TABLE[self as usize].name
    }

    pub fn is_terminal(self) -> bool {
        STATE_TABLE[self as usize].successors.is_empty()
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// State table
// ---------------------------------------------------------------------------

/// One row of the transition table.
pub struct StateDescriptor {
    pub id: StateId,
    pub name: &'static str,
    pub successors: &'static [StateId],
}

/// Indexed by `StateId as usize`.
pub static STATE_TABLE: [StateDescriptor; StateId::COUNT] = [
    StateDescriptor {
        id: StateId::Bootstrapping,
        name: "Bootstrapping",
        successors: &[StateId::Operational, StateId::Restarting],
    },
    StateDescriptor {
        id: StateId::Operational,
        name: "Operational",
        successors: &[StateId::Restarting],
    },
    StateDescriptor {
        id: StateId::Restarting,
        name: "Restarting",
        successors: &[],
    },
];

/// A transition the table does not allow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidTransition {
    pub from: StateId,
    pub to: StateId,
}

impl fmt::Display for InvalidTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid transition {} -> {}", self.from, self.to)
    }
}

// ---------------------------------------------------------------------------
// FSM engine
// ---------------------------------------------------------------------------

pub struct Fsm {
    current: StateId,
    /// Number of transitions taken since construction.
    transitions: u32,
}

impl Default for Fsm {
    fn default() -> Self {
        Self::new()
    }
}

impl Fsm {
    /// Every session starts in `Bootstrapping`.
    pub fn new() -> Self {
        info!("FSM starting in state: {}", StateId::Bootstrapping);
        Self {
            current: StateId::Bootstrapping,
            transitions: 0,
        }
    }

    pub fn current_state(&self) -> StateId {
        self.current
    }

    pub fn transitions(&self) -> u32 {
        self.transitions
    }

    /// Move to `next`, returning the state that was left.
    pub fn transition(&mut self, next: StateId) -> Result<StateId, InvalidTransition> {
        let from = self.current;
        if !STATE_TABLE[from as usize].successors.contains(&next) {
            return Err(InvalidTransition { from, to: next });
        }
        info!("FSM transition: {} -> {}", from, next);
        self.current = next;
        self.transitions += 1;
        Ok(from)
    }
}
