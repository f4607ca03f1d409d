// Messages between the operator console and the session event loop.

use courtside_core::draft::slot::RosterSlot;
use courtside_core::draft::trade::TradeProposal;
use courtside_core::SessionSnapshot;

/// Commands from the operator to the app orchestrator.
#[derive(Debug, Clone, PartialEq)]
pub enum UserCommand {
    StartDraft,
    ResetSession,
    RefreshPool,
    SubmitBid {
        winner: String,
        amount: u32,
        slot: RosterSlot,
    },
    SubmitSkip,
    MoveRosterSlot {
        participant: String,
        player: String,
        slot: RosterSlot,
    },
    ProposeTrade(TradeProposal),
    ExecuteTrade,
    CancelTrade,
    RenameParticipant {
        from: String,
        to: String,
    },
    /// Re-send the current snapshot without changing anything.
    Show,
    Quit,
}

impl UserCommand {
    /// Short name used when reporting a rejected command.
    pub fn label(&self) -> &'static str {
        match self {
            UserCommand::StartDraft => "start",
            UserCommand::ResetSession => "reset",
            UserCommand::RefreshPool => "refresh",
            UserCommand::SubmitBid { .. } => "bid",
            UserCommand::SubmitSkip => "skip",
            UserCommand::MoveRosterSlot { .. } => "move",
            UserCommand::ProposeTrade(_) => "trade",
            UserCommand::ExecuteTrade => "execute",
            UserCommand::CancelTrade => "cancel",
            UserCommand::RenameParticipant { .. } => "rename",
            UserCommand::Show => "show",
            UserCommand::Quit => "quit",
        }
    }
}

/// Updates pushed from the app orchestrator to the console.
#[derive(Debug, Clone)]
pub enum UiUpdate {
    /// Full session state after a command (or on request).
    Snapshot(Box<SessionSnapshot>),
    /// A command failed; the session is unchanged.
    Rejected {
        command: &'static str,
        message: String,
    },
    /// One-line description of what an accepted command did.
    Notice(String),
}
