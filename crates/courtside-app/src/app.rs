// Application state and orchestration logic.
//
// A single task owns the session and applies operator commands one at a time,
// pushing a notice or rejection plus a fresh snapshot after each.

use tokio::sync::mpsc;
use tracing::{info, warn};

use courtside_core::draft::engine::CycleOutcome;
use courtside_core::pool::PoolSource;
use courtside_core::{DraftError, SessionState};

use crate::protocol::{UiUpdate, UserCommand};

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

pub struct AppState {
    pub session: SessionState,
    /// Supplier used by `RefreshPool`.
    pub source: Box<dyn PoolSource>,
}

impl AppState {
    pub fn new(session: SessionState, source: Box<dyn PoolSource>) -> Self {
        AppState { session, source }
    }

    /// Apply one command. Returns a notice describing what happened.
    pub fn apply(&mut self, cmd: UserCommand) -> Result<Option<String>, DraftError> {
        let session = &mut self.session;
        match cmd {
            UserCommand::StartDraft => {
                session.start_draft()?;
                Ok(Some("Draft started".to_string()))
            }
            UserCommand::ResetSession => {
                session.reset_session();
                Ok(Some("Session reset".to_string()))
            }
            UserCommand::RefreshPool => {
                let size = session.refresh_pool(self.source.as_ref())?;
                Ok(Some(format!("Pool refreshed: {size} players")))
            }
            UserCommand::SubmitBid {
                winner,
                amount,
                slot,
            } => {
                let outcome = session.submit_bid(&winner, amount, slot)?;
                Ok(Some(describe_outcome(&outcome)))
            }
            UserCommand::SubmitSkip => {
                let outcome = session.submit_skip()?;
                Ok(Some(describe_outcome(&outcome)))
            }
            UserCommand::MoveRosterSlot {
                participant,
                player,
                slot,
            } => {
                let bumped = session.move_roster_slot(&participant, &player, slot)?;
                Ok(Some(match bumped {
                    Some(other) => format!("{player} moved to {slot}, {other} swapped out"),
                    None => format!("{player} moved to {slot}"),
                }))
            }
            UserCommand::ProposeTrade(proposal) => {
                let offer = session.propose_trade(proposal)?;
                Ok(Some(format!(
                    "Trade proposed between {} and {}; `execute` to apply",
                    offer.from.participant, offer.to.participant
                )))
            }
            UserCommand::ExecuteTrade => {
                let record = session.execute_trade()?;
                Ok(Some(format!(
                    "Trade executed between {} and {}",
                    record.offer.from.participant, record.offer.to.participant
                )))
            }
            UserCommand::CancelTrade => {
                session.cancel_trade()?;
                Ok(Some("Pending trade cancelled".to_string()))
            }
            UserCommand::RenameParticipant { from, to } => {
                session.rename_participant(&from, &to)?;
                Ok(Some(format!("{} is now {}", from.trim(), to.trim())))
            }
            UserCommand::Show | UserCommand::Quit => Ok(None),
        }
    }
}

fn describe_outcome(outcome: &CycleOutcome) -> String {
    match outcome {
        CycleOutcome::Drafted(pick) => format!(
            "Pick #{}: {} to {} ({}) for ${}",
            pick.pick_number, pick.player_name, pick.participant, pick.slot, pick.price
        ),
        CycleOutcome::Skipped {
            participant,
            nominee,
            removed: true,
        } => format!("{participant} skipped {nominee}; removed from the pool"),
        CycleOutcome::Skipped {
            participant,
            nominee,
            removed: false,
        } => format!("{participant} skipped {nominee}"),
    }
}

// ---------------------------------------------------------------------------
// Event loop
// ---------------------------------------------------------------------------

/// Run the session event loop.
///
/// Sends an initial snapshot, then handles commands until `Quit`, the
/// command channel closing, or Ctrl+C.
pub async fn run(
    mut cmd_rx: mpsc::Receiver<UserCommand>,
    ui_tx: mpsc::Sender<UiUpdate>,
    mut state: AppState,
) -> anyhow::Result<()> {
    info!("Application event loop started");
    send_snapshot(&state, &ui_tx).await;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(UserCommand::Quit) => {
                        info!("Quit command received, shutting down");
                        break;
                    }
                    Some(cmd) => {
                        handle_user_command(&mut state, cmd, &ui_tx).await;
                    }
                    None => {
                        info!("Command channel closed, shutting down");
                        break;
                    }
                }
            }

            _ = &mut ctrl_c => {
                info!("Ctrl+C received, shutting down");
                break;
            }
        }
    }

    info!("Application event loop exiting");
    Ok(())
}

/// Handle a user command from the console.
async fn handle_user_command(
    state: &mut AppState,
    cmd: UserCommand,
    ui_tx: &mpsc::Sender<UiUpdate>,
) {
    let label = cmd.label();
    match state.apply(cmd) {
        Ok(Some(notice)) => {
            let _ = ui_tx.send(UiUpdate::Notice(notice)).await;
            send_snapshot(state, ui_tx).await;
        }
        Ok(None) => send_snapshot(state, ui_tx).await,
        Err(e) => {
            warn!("Rejected {}: {}", label, e);
            let _ = ui_tx
                .send(UiUpdate::Rejected {
                    command: label,
                    message: e.to_string(),
                })
                .await;
        }
    }
}

async fn send_snapshot(state: &AppState, ui_tx: &mpsc::Sender<UiUpdate>) {
    let snapshot = state.session.snapshot();
    let _ = ui_tx.send(UiUpdate::Snapshot(Box::new(snapshot))).await;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
