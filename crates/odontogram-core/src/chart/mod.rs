//! Condition state machine.
//!
//! [`ToothStates`] owns the canonical per-tooth state and exposes only the
//! transitions (cycle, set surface, set tooth condition, reset). UI code does
//! not call them directly: it builds a [`ChartCommand`] and hands it to
//! [`ChartSession::dispatch`], which records history for undo/redo and the
//! treatment log.

mod command;
mod session;
mod state;

pub use command::*;
pub use session::*;
pub use state::*;
