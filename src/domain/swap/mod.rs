//! Swap domain - the form state machine and its phases

mod state_machine;

pub use state_machine::SwapStateMachine;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SwapPhase {
    /// Fewer than two tokens selected
    Idle,
    TokensSelected,
    /// Waiting for the quote with this sequence number
    Quoting { seq: u64 },
    /// Counterpart known, bounds computed
    Quoted,
}

/// What happened to a quote response handed to the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteOutcome {
    Applied,
    Unavailable,
    /// Superseded by a later edit or token change
    Stale,
}
