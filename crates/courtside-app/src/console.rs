// Line-oriented operator console.
//
// Reads commands from stdin, forwards them to the event loop, and prints
// whatever comes back. Arguments containing spaces (participant and player
// names) are written in double quotes:
//
//     bid "Player 1" 50 PG
//     move "Player 2" "Bam Adebayo" C
//     trade "Player 1" "Player 2" give "Trae Young" cash 20 get "Bam Adebayo"

use std::fmt::Write as _;

use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info};

use courtside_core::draft::slot::RosterSlot;
use courtside_core::draft::trade::{TradeProposal, TradeSide};
use courtside_core::SessionSnapshot;

use crate::protocol::{UiUpdate, UserCommand};

pub const HELP: &str = "\
Commands:
  start                              start the draft
  bid <winner> <amount> <slot>       award the nominee (slots: PG SG SF PF C 6th)
  skip                               pass on the nominee
  move <participant> <player> <slot> move a rostered player, swapping if occupied
  trade <from> <to> give <players..> [cash N] get <players..> [cash N]
  execute | cancel                   apply or drop the pending trade
  rename <old> <new>                 rename a participant before the draft
  refresh                            reload the player pool
  reset                              clear the session, keep the pool
  show | json                        print the board (plain or JSON)
  help | quit";

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConsoleError {
    #[error("unterminated quote")]
    UnterminatedQuote,

    #[error("unknown command `{0}`; try `help`")]
    UnknownCommand(String),

    #[error("`{command}` is missing its {argument}")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },

    #[error("`{0}` is not a whole dollar amount")]
    InvalidAmount(String),

    #[error("`{0}` is not a roster slot (PG, SG, SF, PF, C, 6th)")]
    InvalidSlot(String),

    #[error("unexpected `{0}` in trade; start a side with `give` or `get`")]
    TradeSyntax(String),
}

/// What a console line asks for.
#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleAction {
    Send(UserCommand),
    Help,
    /// Print the latest snapshot as JSON.
    Json,
    Nothing,
}

/// Split a line into whitespace-separated tokens, honouring double quotes.
pub fn tokenize(line: &str) -> Result<Vec<String>, ConsoleError> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut has_token = false;

    for c in line.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                has_token = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if has_token {
                    tokens.push(std::mem::take(&mut current));
                    has_token = false;
                }
            }
            c => {
                current.push(c);
                has_token = true;
            }
        }
    }

    if in_quotes {
        return Err(ConsoleError::UnterminatedQuote);
    }
    if has_token {
        tokens.push(current);
    }
    Ok(tokens)
}

pub fn parse_line(line: &str) -> Result<ConsoleAction, ConsoleError> {
    let tokens = tokenize(line)?;
    let Some((head, args)) = tokens.split_first() else {
        return Ok(ConsoleAction::Nothing);
    };

    let send = |cmd: UserCommand| -> Result<ConsoleAction, ConsoleError> {
        Ok(ConsoleAction::Send(cmd))
    };
    match head.to_lowercase().as_str() {
        "start" => send(UserCommand::StartDraft),
        "reset" => send(UserCommand::ResetSession),
        "refresh" => send(UserCommand::RefreshPool),
        "skip" => send(UserCommand::SubmitSkip),
        "execute" => send(UserCommand::ExecuteTrade),
        "cancel" => send(UserCommand::CancelTrade),
        "show" => send(UserCommand::Show),
        "quit" | "exit" => send(UserCommand::Quit),
        "json" => Ok(ConsoleAction::Json),
        "help" | "?" => Ok(ConsoleAction::Help),
        "bid" => {
            let winner = arg(args, 0, "bid", "winner")?;
            let amount = parse_amount(arg(args, 1, "bid", "amount")?)?;
            let slot = parse_slot(arg(args, 2, "bid", "slot")?)?;
            send(UserCommand::SubmitBid {
                winner: winner.to_string(),
                amount,
                slot,
            })
        }
        "move" => {
            let participant = arg(args, 0, "move", "participant")?;
            let player = arg(args, 1, "move", "player")?;
            let slot = parse_slot(arg(args, 2, "move", "slot")?)?;
            send(UserCommand::MoveRosterSlot {
                participant: participant.to_string(),
                player: player.to_string(),
                slot,
            })
        }
        "rename" => {
            let from = arg(args, 0, "rename", "current name")?;
            let to = arg(args, 1, "rename", "new name")?;
            send(UserCommand::RenameParticipant {
                from: from.to_string(),
                to: to.to_string(),
            })
        }
        "trade" => send(UserCommand::ProposeTrade(parse_trade(args)?)),
        other => Err(ConsoleError::UnknownCommand(other.to_string())),
    }
}

fn arg<'a>(
    args: &'a [String],
    idx: usize,
    command: &'static str,
    argument: &'static str,
) -> Result<&'a str, ConsoleError> {
    args.get(idx)
        .map(String::as_str)
        .ok_or(ConsoleError::MissingArgument { command, argument })
}

fn parse_amount(s: &str) -> Result<u32, ConsoleError> {
    s.trim_start_matches('$')
        .parse()
        .map_err(|_| ConsoleError::InvalidAmount(s.to_string()))
}

fn parse_slot(s: &str) -> Result<RosterSlot, ConsoleError> {
    RosterSlot::from_str_slot(s).ok_or_else(|| ConsoleError::InvalidSlot(s.to_string()))
}

/// `<from> <to> give <players..> [cash N] get <players..> [cash N]`.
/// Either side may be omitted.
fn parse_trade(args: &[String]) -> Result<TradeProposal, ConsoleError> {
    let from_name = arg(args, 0, "trade", "first participant")?;
    let to_name = arg(args, 1, "trade", "second participant")?;

    let mut sides = [(Vec::new(), 0u32), (Vec::new(), 0u32)];
    let mut current: Option<usize> = None;
    let mut rest = args[2..].iter();

    while let Some(token) = rest.next() {
        match token.to_lowercase().as_str() {
            "give" => current = Some(0),
            "get" => current = Some(1),
            "cash" => {
                let side = current.ok_or_else(|| ConsoleError::TradeSyntax(token.clone()))?;
                let amount = rest.next().ok_or(ConsoleError::MissingArgument {
                    command: "trade",
                    argument: "cash amount",
                })?;
                sides[side].1 = parse_amount(amount)?;
            }
            _ => {
                let side = current.ok_or_else(|| ConsoleError::TradeSyntax(token.clone()))?;
                sides[side].0.push(token.clone());
            }
        }
    }

    let [(give, give_cash), (get, get_cash)] = sides;
    Ok(TradeProposal {
        from: TradeSide::new(from_name, give, give_cash),
        to: TradeSide::new(to_name, get, get_cash),
    })
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

pub fn render_snapshot(snap: &SessionSnapshot) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "== Draft {} | turn {} | {} spots left | {} of {} players available ==",
        snap.status, snap.turns_taken, snap.spots_remaining, snap.available_count, snap.pool_size
    );

    if let Some(acting) = &snap.acting {
        let _ = write!(out, "On the clock: {acting}");
        if let Some(bid) = snap.suggested_bid {
            let _ = write!(out, " (suggested bid ${bid}, max ${})", snap.max_bid);
        }
        out.push('\n');
    }
    match &snap.nominee {
        Some(p) => {
            let _ = writeln!(
                out,
                "Nominee: {} ({:.1} PPG, {:.1} APG, {:.1} RPG)",
                p.name, p.ppg, p.apg, p.rpg
            );
        }
        None if snap.pool_exhausted => {
            out.push_str("Nominee: none left; refresh the pool\n");
        }
        None => {}
    }

    for p in &snap.participants {
        let _ = write!(out, "\n{} - ${}", p.name, p.budget);
        if let Some(skips) = p.skips_remaining {
            let _ = write!(out, ", {skips} skips left");
        }
        out.push('\n');
        for slot in &p.roster {
            let _ = write!(out, "  {:<8}", slot.slot.display_str());
            match (&slot.player, &slot.stats) {
                (Some(name), Some(s)) => {
                    let _ = writeln!(
                        out,
                        "{name} ({:.1} / {:.1} / {:.1})",
                        s.ppg, s.apg, s.rpg
                    );
                }
                (Some(name), None) => {
                    let _ = writeln!(out, "{name}");
                }
                (None, _) => out.push_str("-\n"),
            }
        }
    }

    if let Some(trade) = &snap.pending_trade {
        let _ = writeln!(
            out,
            "\nPending trade: {} gives {:?} + ${}; {} gives {:?} + ${}",
            trade.from.participant,
            trade.from.players,
            trade.from.cash,
            trade.to.participant,
            trade.to.players,
            trade.to.cash
        );
    }

    out
}

// ---------------------------------------------------------------------------
// Console loop
// ---------------------------------------------------------------------------

/// Read operator input until `quit`, EOF, or the event loop goes away.
pub async fn run(
    mut ui_rx: mpsc::Receiver<UiUpdate>,
    cmd_tx: mpsc::Sender<UserCommand>,
) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut latest: Option<Box<SessionSnapshot>> = None;

    println!("{HELP}");

    loop {
        tokio::select! {
            update = ui_rx.recv() => {
                match update {
                    Some(UiUpdate::Snapshot(snap)) => {
                        println!("{}", render_snapshot(&snap));
                        latest = Some(snap);
                    }
                    Some(UiUpdate::Notice(text)) => println!("{text}"),
                    Some(UiUpdate::Rejected { command, message }) => {
                        println!("{command} rejected: {message}");
                    }
                    None => {
                        debug!("UI channel closed");
                        break;
                    }
                }
            }

            line = lines.next_line() => {
                let Some(line) = line? else {
                    info!("stdin closed");
                    let _ = cmd_tx.send(UserCommand::Quit).await;
                    break;
                };
                match parse_line(&line) {
                    Ok(ConsoleAction::Send(cmd)) => {
                        let quit = cmd == UserCommand::Quit;
                        if cmd_tx.send(cmd).await.is_err() || quit {
                            break;
                        }
                    }
                    Ok(ConsoleAction::Help) => println!("{HELP}"),
                    Ok(ConsoleAction::Json) => match &latest {
                        Some(snap) => println!("{}", serde_json::to_string_pretty(snap)?),
                        None => println!("no snapshot yet"),
                    },
                    Ok(ConsoleAction::Nothing) => {}
                    Err(e) => println!("{e}"),
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_plain_and_quoted() {
        assert_eq!(
            tokenize(r#"bid "Player 1" 50  PG"#).unwrap(),
            vec!["bid", "Player 1", "50", "PG"]
        );
        assert_eq!(tokenize("   ").unwrap(), Vec::<String>::new());
        assert_eq!(tokenize(r#"rename "" x"#).unwrap(), vec!["rename", "", "x"]);
    }

    #[test]
    fn tokenize_unterminated_quote() {
        assert_eq!(
            tokenize(r#"bid "Player 1 50"#),
            Err(ConsoleError::UnterminatedQuote)
        );
    }

    #[test]
    fn parse_bid() {
        let action = parse_line(r#"bid "Player 2" $75 6th"#).unwrap();
        assert_eq!(
            action,
            ConsoleAction::Send(UserCommand::SubmitBid {
                winner: "Player 2".into(),
                amount: 75,
                slot: RosterSlot::SixthMan,
            })
        );
    }

    #[test]
    fn parse_bid_errors() {
        assert_eq!(
            parse_line("bid Ann"),
            Err(ConsoleError::MissingArgument {
                command: "bid",
                argument: "amount"
            })
        );
        assert_eq!(
            parse_line("bid Ann -5 PG"),
            Err(ConsoleError::InvalidAmount("-5".into()))
        );
        assert_eq!(
            parse_line("bid Ann 5 QB"),
            Err(ConsoleError::InvalidSlot("QB".into()))
        );
    }

    #[test]
    fn parse_simple_commands() {
        assert_eq!(
            parse_line("START").unwrap(),
            ConsoleAction::Send(UserCommand::StartDraft)
        );
        assert_eq!(
            parse_line("skip").unwrap(),
            ConsoleAction::Send(UserCommand::SubmitSkip)
        );
        assert_eq!(parse_line("json").unwrap(), ConsoleAction::Json);
        assert_eq!(parse_line("").unwrap(), ConsoleAction::Nothing);
        assert_eq!(
            parse_line("dance"),
            Err(ConsoleError::UnknownCommand("dance".into()))
        );
    }

    #[test]
    fn parse_move_and_rename() {
        assert_eq!(
            parse_line(r#"move Ann "Bam Adebayo" c"#).unwrap(),
            ConsoleAction::Send(UserCommand::MoveRosterSlot {
                participant: "Ann".into(),
                player: "Bam Adebayo".into(),
                slot: RosterSlot::Center,
            })
        );
        assert_eq!(
            parse_line(r#"rename "Player 1" Ann"#).unwrap(),
            ConsoleAction::Send(UserCommand::RenameParticipant {
                from: "Player 1".into(),
                to: "Ann".into(),
            })
        );
    }

    #[test]
    fn parse_trade_both_sides() {
        let action = parse_line(
            r#"trade Ann Bob give "Trae Young" "Clint Capela" cash 20 get "Bam Adebayo""#,
        )
        .unwrap();
        let ConsoleAction::Send(UserCommand::ProposeTrade(p)) = action else {
            panic!("expected trade, got {action:?}");
        };
        assert_eq!(p.from.participant, "Ann");
        assert_eq!(p.from.players, vec!["Trae Young", "Clint Capela"]);
        assert_eq!(p.from.cash, 20);
        assert_eq!(p.to.participant, "Bob");
        assert_eq!(p.to.players, vec!["Bam Adebayo"]);
        assert_eq!(p.to.cash, 0);
    }

    #[test]
    fn parse_trade_cash_only() {
        let action = parse_line("trade Ann Bob get cash 50").unwrap();
        let ConsoleAction::Send(UserCommand::ProposeTrade(p)) = action else {
            panic!("expected trade");
        };
        assert!(p.from.players.is_empty());
        assert_eq!(p.from.cash, 0);
        assert_eq!(p.to.cash, 50);
    }

    #[test]
    fn parse_trade_requires_a_side_marker() {
        assert_eq!(
            parse_line("trade Ann Bob Somebody"),
            Err(ConsoleError::TradeSyntax("Somebody".into()))
        );
        assert_eq!(
            parse_line("trade Ann Bob give cash"),
            Err(ConsoleError::MissingArgument {
                command: "trade",
                argument: "cash amount"
            })
        );
    }
}
