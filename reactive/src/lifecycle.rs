//! Per-producer lifecycle state machine.
//!
//! Every producer owns one `Lifecycle`. Transitions are driven only by the
//! signals below and no signal moves a producer out of a terminal state.
//!
//! ```text
//! Created --Subscribe--> Subscribed --Emit--> Emitting --Emit--> Emitting
//!                         |   |                 |   |
//!                         |   +----Complete-----+---+--> Completed
//!                         +--------Fail---------+------> Errored
//! Created | Subscribed | Emitting --Cancel-------------> Cancelled
//! ```
use log::*;
use std::fmt;

use crate::error::Error;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum State {
    #[default]
    Created,
    Subscribed,
    Emitting,
    Completed,
    Errored,
    Cancelled,
}

impl State {
    pub fn is_terminal(self) -> bool {
        matches!(self, State::Completed | State::Errored | State::Cancelled)
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            State::Created => write!(f, "created"),
            State::Subscribed => write!(f, "subscribed"),
            State::Emitting => write!(f, "emitting"),
            State::Completed => write!(f, "completed"),
            State::Errored => write!(f, "errored"),
            State::Cancelled => write!(f, "cancelled"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Subscribe,
    Emit,
    Complete,
    Fail,
    Cancel,
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Signal::Subscribe => write!(f, "subscribe"),
            Signal::Emit => write!(f, "emit"),
            Signal::Complete => write!(f, "complete"),
            Signal::Fail => write!(f, "fail"),
            Signal::Cancel => write!(f, "cancel"),
        }
    }
}

#[derive(Debug, Default)]
pub struct Lifecycle {
    state: State,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// Applies `signal` and returns the new state, or an error when the signal is
    /// not allowed in the current state. A rejected signal leaves the state untouched.
    pub fn advance(&mut self, signal: Signal) -> Result<State, Error> {
        let next = match (self.state, signal) {
            (State::Created, Signal::Subscribe) => State::Subscribed,
            (_, Signal::Subscribe) => return Err(Error::already_subscribed()),
            (State::Subscribed | State::Emitting, Signal::Emit) => State::Emitting,
            (State::Subscribed | State::Emitting, Signal::Complete) => State::Completed,
            (State::Subscribed | State::Emitting, Signal::Fail) => State::Errored,
            (State::Created | State::Subscribed | State::Emitting, Signal::Cancel) => {
                State::Cancelled
            }
            (from, signal) => return Err(Error::invalid_transition(from, signal)),
        };

        if next != self.state {
            trace!("lifecycle {} -> {} on {}", self.state, next, signal);
        }
        self.state = next;
        Ok(next)
    }
}
