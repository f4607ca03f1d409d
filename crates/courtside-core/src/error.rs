// Error taxonomy for draft, roster, budget, and trade operations.
//
// Everything here except `DataSource` is recoverable: the session state is
// left untouched and the operator retries the same cycle.

use thiserror::Error;

use crate::draft::engine::DraftStatus;
use crate::draft::slot::RosterSlot;
use crate::pool::DataSourceError;

#[derive(Debug, Error)]
pub enum DraftError {
    #[error(transparent)]
    DataSource(#[from] DataSourceError),

    #[error("no players left to nominate with {open_slots} roster slots open; refresh the pool")]
    PoolExhausted { open_slots: usize },

    #[error("{participant} has ${balance} but the amount is ${amount}")]
    InsufficientBudget {
        participant: String,
        balance: u32,
        amount: u32,
    },

    #[error("{participant}'s {slot} slot is already held by {occupant}")]
    SlotOccupied {
        participant: String,
        slot: RosterSlot,
        occupant: String,
    },

    #[error("{player} is already rostered by {participant}")]
    AlreadyRostered { player: String, participant: String },

    #[error("crediting ${amount} to {participant} (${balance}) would overflow the balance")]
    BalanceOverflow {
        participant: String,
        balance: u32,
        amount: u32,
    },

    #[error("{participant} has no open roster slots")]
    NoOpenSlot { participant: String },

    #[error("{participant} needs {needed} open slots to receive the trade but has {available}")]
    InsufficientSlots {
        participant: String,
        needed: usize,
        available: usize,
    },

    #[error("invalid trade: {0}")]
    InvalidTrade(String),

    #[error("{participant} has no skips remaining")]
    NoSkipsRemaining { participant: String },

    #[error("unknown participant: {0}")]
    UnknownParticipant(String),

    #[error("{player} is not on {participant}'s roster")]
    PlayerNotOnRoster { participant: String, player: String },

    #[error("participant name `{0}` is already taken")]
    DuplicateParticipant(String),

    #[error("participant names must not be blank")]
    BlankParticipantName,

    #[error("a session needs between 2 and 10 participants, got {0}")]
    InvalidParticipantCount(usize),

    #[error("the draft has already started")]
    AlreadyStarted,

    #[error("the draft is not in progress (status: {status})")]
    NotInProgress { status: DraftStatus },

    #[error("no trade has been proposed")]
    NoPendingTrade,
}

impl DraftError {
    /// Whether the session can carry on after this error.
    ///
    /// Only a failure to obtain any usable player pool is fatal, and only at
    /// session start; callers decide that by context.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, DraftError::DataSource(_))
    }
}
