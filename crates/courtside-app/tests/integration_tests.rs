// Integration tests for the operator surface.
//
// Console lines are parsed into commands and pushed through the event loop;
// the updates that come back are checked the way the console would see them.

use courtside_app::app::{self, AppState};
use courtside_app::console::{parse_line, render_snapshot, ConsoleAction};
use courtside_app::protocol::{UiUpdate, UserCommand};
use courtside_core::draft::engine::{DraftRules, DraftStatus, SkipPolicy};
use courtside_core::pool::{PlayerPool, StaticPoolSource};
use courtside_core::session::default_participant_names;
use courtside_core::{SessionSnapshot, SessionState};

use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

// ===========================================================================
// Test helpers
// ===========================================================================

fn source() -> StaticPoolSource {
    let names: Vec<String> = (1..=16).map(|i| format!("Prospect {i:02}")).collect();
    StaticPoolSource::from_stats(
        names
            .iter()
            .enumerate()
            .map(|(i, n)| (n.as_str(), 8.0 + i as f64, 2.0, 4.0)),
    )
}

struct Harness {
    cmd_tx: mpsc::Sender<UserCommand>,
    ui_rx: mpsc::Receiver<UiUpdate>,
    handle: JoinHandle<anyhow::Result<()>>,
}

impl Harness {
    async fn start(rules: DraftRules) -> Self {
        let source = source();
        let pool = PlayerPool::load(&source).unwrap();
        let session = SessionState::new(default_participant_names(2), rules, pool, None)
            .unwrap()
            .with_rng(StdRng::seed_from_u64(99));
        let state = AppState::new(session, Box::new(source));

        let (cmd_tx, cmd_rx) = mpsc::channel(32);
        let (ui_tx, ui_rx) = mpsc::channel(64);
        let handle = tokio::spawn(app::run(cmd_rx, ui_tx, state));
        let mut harness = Harness {
            cmd_tx,
            ui_rx,
            handle,
        };
        harness.snapshot().await;
        harness
    }

    /// Parse a console line and send the resulting command.
    async fn line(&mut self, line: &str) {
        match parse_line(line).unwrap() {
            ConsoleAction::Send(cmd) => self.cmd_tx.send(cmd).await.unwrap(),
            other => panic!("`{line}` did not produce a command: {other:?}"),
        }
    }

    async fn snapshot(&mut self) -> Box<SessionSnapshot> {
        match self.ui_rx.recv().await {
            Some(UiUpdate::Snapshot(snap)) => snap,
            other => panic!("expected snapshot, got {other:?}"),
        }
    }

    async fn notice(&mut self) -> String {
        match self.ui_rx.recv().await {
            Some(UiUpdate::Notice(text)) => text,
            other => panic!("expected notice, got {other:?}"),
        }
    }

    /// Send a line that should succeed; return the notice and new snapshot.
    async fn ok(&mut self, line: &str) -> (String, Box<SessionSnapshot>) {
        self.line(line).await;
        let notice = self.notice().await;
        (notice, self.snapshot().await)
    }

    /// Send a line that should be rejected; return the message.
    async fn rejected(&mut self, line: &str) -> (&'static str, String) {
        self.line(line).await;
        match self.ui_rx.recv().await {
            Some(UiUpdate::Rejected { command, message }) => (command, message),
            other => panic!("expected rejection for `{line}`, got {other:?}"),
        }
    }

    async fn quit(self) {
        self.cmd_tx.send(UserCommand::Quit).await.unwrap();
        self.handle.await.unwrap().unwrap();
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[tokio::test]
async fn console_session_end_to_end() {
    let mut h = Harness::start(DraftRules::default()).await;

    let (notice, snap) = h.ok(r#"rename "Player 1" Ann"#).await;
    assert_eq!(notice, "Player 1 is now Ann");
    assert_eq!(snap.participants[0].name, "Ann");

    let (_, snap) = h.ok("start").await;
    assert_eq!(snap.status, DraftStatus::InProgress);
    assert_eq!(snap.acting.as_deref(), Some("Ann"));
    assert!(render_snapshot(&snap).contains("On the clock: Ann (suggested bid $100, max $1000)"));
    let first = snap.nominee.clone().unwrap().name;

    let (command, message) = h.rejected("rename Ann Annie").await;
    assert_eq!(command, "rename");
    assert!(message.contains("already started"));

    let (notice, snap) = h.ok("bid Ann 120 PG").await;
    assert!(notice.contains(&first));
    assert_eq!(snap.participants[0].budget, 880);
    assert_eq!(snap.acting.as_deref(), Some("Player 2"));

    let (_, message) = h.rejected(r#"bid "Player 2" 1001 C"#).await;
    assert!(message.contains("$1000"));

    let (notice, snap) = h.ok("skip").await;
    assert!(notice.starts_with("Player 2 skipped"));
    assert_eq!(snap.turns_taken, 2);

    // Fill the rest of the league.
    for _ in 0..11 {
        let snap = {
            h.line("show").await;
            h.snapshot().await
        };
        let acting = snap.acting.clone().unwrap();
        let idx = snap
            .participants
            .iter()
            .position(|p| p.name == acting)
            .unwrap();
        let slot = snap.participants[idx]
            .roster
            .iter()
            .find(|s| s.player.is_none())
            .unwrap()
            .slot;
        h.ok(&format!(r#"bid "{acting}" 10 {}"#, slot.display_str()))
            .await;
    }
    h.line("show").await;
    let snap = h.snapshot().await;
    assert_eq!(snap.status, DraftStatus::Complete);
    assert_eq!(snap.spots_remaining, 0);
    assert!(render_snapshot(&snap).contains("Draft complete"));

    // Cash-for-player trade after completion keeps the draft complete.
    let bench = snap.participants[1].roster[5].player.clone().unwrap();
    let ann_bench = snap.participants[0].roster[5].player.clone().unwrap();
    h.ok(&format!(
        r#"trade Ann "Player 2" give "{ann_bench}" cash 15 get "{bench}""#
    ))
    .await;
    let (notice, snap) = h.ok("execute").await;
    assert!(notice.starts_with("Trade executed"));
    assert_eq!(snap.status, DraftStatus::Complete);
    assert_eq!(snap.trades_executed, 1);
    assert_eq!(snap.participants[0].roster[5].player.as_deref(), Some(bench.as_str()));

    let (_, snap) = h.ok("reset").await;
    assert_eq!(snap.status, DraftStatus::NotStarted);
    assert_eq!(snap.participants[0].name, "Ann");
    assert!(snap.participants.iter().all(|p| p.budget == 1000));

    h.quit().await;
}

#[tokio::test]
async fn skip_limit_enforced_through_event_loop() {
    let rules = DraftRules {
        skip_policy: SkipPolicy::Limited(1),
        ..DraftRules::default()
    };
    let mut h = Harness::start(rules).await;
    h.ok("start").await;

    let (_, snap) = h.ok("skip").await;
    assert_eq!(snap.participants[0].skips_remaining, Some(0));
    h.ok("skip").await;

    let before = {
        h.line("show").await;
        h.snapshot().await
    };
    let (command, message) = h.rejected("skip").await;
    assert_eq!(command, "skip");
    assert!(message.contains("no skips remaining"));

    h.line("show").await;
    let after = h.snapshot().await;
    assert_eq!(after, before);

    h.quit().await;
}

#[tokio::test]
async fn trade_rejections_are_reported() {
    let mut h = Harness::start(DraftRules::default()).await;

    let (_, message) = h.rejected("trade Ann Bob give cash 5").await;
    assert!(message.contains("not in progress"));

    h.ok("start").await;
    let (_, message) = h
        .rejected(r#"trade "Player 1" "Player 1" give cash 5"#)
        .await;
    assert!(message.contains("themselves"));

    let (_, message) = h
        .rejected(r#"trade "Player 1" "Player 2" give "Nobody""#)
        .await;
    assert!(message.contains("Nobody"));

    let (command, _) = h.rejected("cancel").await;
    assert_eq!(command, "cancel");

    h.quit().await;
}

#[tokio::test]
async fn refresh_command_reloads_source() {
    let mut h = Harness::start(DraftRules::default()).await;
    h.ok("start").await;
    h.ok(r#"bid "Player 1" 5 C"#).await;
    let (notice, snap) = h.ok("refresh").await;
    assert_eq!(notice, "Pool refreshed: 16 players");
    assert_eq!(snap.drafted.len(), 1);
    assert_eq!(snap.available_count, 15);
    h.quit().await;
}
