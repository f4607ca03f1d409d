// Session state: the single aggregate every operator command runs against.
//
// Owns the pool, rosters, budgets, draft engine, trade engine, and the RNG
// used for nominee draws. Each public operation either completes fully or
// returns an error with the session unchanged.

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::{Config, MAX_PARTICIPANTS, MIN_PARTICIPANTS};
use crate::draft::engine::{
    BidResolution, CycleOutcome, DraftEngine, DraftPick, DraftRules, DraftStatus,
};
use crate::draft::ledger::BudgetLedger;
use crate::draft::roster::RosterBook;
use crate::draft::slot::RosterSlot;
use crate::draft::trade::{TradeEngine, TradeOffer, TradeProposal, TradeRecord};
use crate::error::DraftError;
use crate::pool::{PlayerPool, PlayerRecord, PoolSource};

// ---------------------------------------------------------------------------
// Snapshot types
// ---------------------------------------------------------------------------

/// One roster slot as shown to the operator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotView {
    pub slot: RosterSlot,
    pub player: Option<String>,
    /// `None` when the slot is empty or the player left the pool on refresh.
    pub stats: Option<PlayerRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantView {
    pub name: String,
    pub budget: u32,
    /// `None` when skips are unlimited.
    pub skips_remaining: Option<u32>,
    pub roster: Vec<SlotView>,
}

/// Everything the operator needs to render the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub status: DraftStatus,
    pub participants: Vec<ParticipantView>,
    pub acting: Option<String>,
    pub nominee: Option<PlayerRecord>,
    pub suggested_bid: Option<u32>,
    /// Highest bid anyone could cover: the largest balance in the league.
    pub max_bid: u32,
    pub spots_remaining: usize,
    pub turns_taken: u32,
    pub pool_size: usize,
    pub available_count: usize,
    /// In progress with open slots but nobody left to nominate.
    pub pool_exhausted: bool,
    pub drafted: Vec<String>,
    pub passed: Vec<String>,
    pub picks: Vec<DraftPick>,
    pub pending_trade: Option<TradeOffer>,
    pub trades_executed: usize,
}

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

pub struct SessionState {
    rules: DraftRules,
    seed: Option<u64>,
    pool: PlayerPool,
    book: RosterBook,
    ledger: BudgetLedger,
    engine: DraftEngine,
    trades: TradeEngine,
    pending_trade: Option<TradeOffer>,
    rng: StdRng,
}

impl SessionState {
    /// Set up a fresh, not-started session.
    ///
    /// Participant names are trimmed; there must be 2 to 10 of them, all
    /// non-blank and distinct.
    pub fn new(
        participants: Vec<String>,
        rules: DraftRules,
        pool: PlayerPool,
        seed: Option<u64>,
    ) -> Result<Self, DraftError> {
        let participants = normalize_participants(participants)?;
        let book = RosterBook::new(&participants);
        let ledger = BudgetLedger::new(&participants, rules.starting_budget);
        let engine = DraftEngine::new(rules.clone(), participants.len());

        info!(
            "Session created: {} participants, {} players in pool",
            participants.len(),
            pool.len()
        );

        Ok(SessionState {
            rules,
            seed,
            pool,
            book,
            ledger,
            engine,
            trades: TradeEngine::new(),
            pending_trade: None,
            rng: make_rng(seed),
        })
    }

    pub fn from_config(config: &Config, pool: PlayerPool) -> Result<Self, DraftError> {
        Self::new(
            config.league.participants.clone(),
            config.rules(),
            pool,
            config.draft.seed,
        )
    }

    /// Replace the nominee RNG.
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    // --- accessors ---

    pub fn rules(&self) -> &DraftRules {
        &self.rules
    }

    pub fn status(&self) -> DraftStatus {
        self.engine.status()
    }

    pub fn pool(&self) -> &PlayerPool {
        &self.pool
    }

    pub fn rosters(&self) -> &RosterBook {
        &self.book
    }

    pub fn ledger(&self) -> &BudgetLedger {
        &self.ledger
    }

    pub fn engine(&self) -> &DraftEngine {
        &self.engine
    }

    pub fn participants(&self) -> Vec<String> {
        self.book.participants().map(str::to_string).collect()
    }

    pub fn pending_trade(&self) -> Option<&TradeOffer> {
        self.pending_trade.as_ref()
    }

    pub fn trade_history(&self) -> &[TradeRecord] {
        self.trades.history()
    }

    // --- operator commands ---

    /// `NotStarted -> InProgress`, then draw the first nominee.
    pub fn start_draft(&mut self) -> Result<(), DraftError> {
        self.engine.start(&self.book)?;
        self.prime_nominee();
        Ok(())
    }

    /// Discard budgets, rosters, draft history, skip counters, trades, and
    /// the pinned nominee. The pool and participant names are kept.
    pub fn reset_session(&mut self) {
        let participants = self.participants();
        self.book = RosterBook::new(&participants);
        self.ledger = BudgetLedger::new(&participants, self.rules.starting_budget);
        self.engine = DraftEngine::new(self.rules.clone(), participants.len());
        self.trades = TradeEngine::new();
        self.pending_trade = None;
        self.rng = make_rng(self.seed);
        info!("Session reset");
    }

    /// Reload the pool from `source` and swap it in.
    ///
    /// Draft history is kept, so drafted names missing from the new pool
    /// stay on their rosters. On failure the old pool stays in place.
    pub fn refresh_pool(&mut self, source: &dyn PoolSource) -> Result<usize, DraftError> {
        let pool = PlayerPool::load(source).map_err(|e| {
            warn!("Pool refresh from {} failed: {}", source.describe(), e);
            DraftError::from(e)
        })?;
        let size = pool.len();
        self.pool = pool;
        self.engine.on_pool_replaced(&self.pool);
        info!("Pool refreshed from {}: {} players", source.describe(), size);
        self.prime_nominee();
        Ok(size)
    }

    /// Award the pinned nominee to `winner` for `amount`, into `slot`.
    pub fn submit_bid(
        &mut self,
        winner: &str,
        amount: u32,
        slot: RosterSlot,
    ) -> Result<CycleOutcome, DraftError> {
        self.resolve(BidResolution::Won {
            winner: winner.trim().to_string(),
            amount,
            slot,
        })
    }

    /// Pass on the pinned nominee for the acting participant.
    pub fn submit_skip(&mut self) -> Result<CycleOutcome, DraftError> {
        self.resolve(BidResolution::Skip)
    }

    fn resolve(&mut self, resolution: BidResolution) -> Result<CycleOutcome, DraftError> {
        let outcome = self.engine.resolve(
            resolution,
            &self.pool,
            &mut self.book,
            &mut self.ledger,
            &mut self.rng,
        )?;
        self.prime_nominee();
        Ok(outcome)
    }

    /// Move `player` to `slot` on `participant`'s roster, swapping with any
    /// occupant. Returns the bumped player.
    pub fn move_roster_slot(
        &mut self,
        participant: &str,
        player: &str,
        slot: RosterSlot,
    ) -> Result<Option<String>, DraftError> {
        let bumped = self.book.move_player(participant, player, slot)?;
        info!(
            "{} moved {} to {}{}",
            participant.trim(),
            player.trim(),
            slot,
            bumped
                .as_deref()
                .map(|b| format!(" (swapped with {b})"))
                .unwrap_or_default()
        );
        self.engine.refresh_completion(&self.book);
        Ok(bumped)
    }

    /// Validate a trade and hold it for execution. Replaces any earlier
    /// pending trade.
    pub fn propose_trade(&mut self, proposal: TradeProposal) -> Result<&TradeOffer, DraftError> {
        self.require_trading_open()?;
        let offer = self
            .trades
            .propose(proposal.from, proposal.to, &self.book, &self.ledger)?;
        if self.pending_trade.is_some() {
            debug!("Replacing pending trade");
        }
        Ok(self.pending_trade.insert(offer))
    }

    /// Apply the pending trade. On failure it stays pending and nothing
    /// changes.
    pub fn execute_trade(&mut self) -> Result<TradeRecord, DraftError> {
        self.require_trading_open()?;
        let offer = self.pending_trade.as_ref().ok_or(DraftError::NoPendingTrade)?;
        let record = self.trades.execute(offer, &mut self.book, &mut self.ledger)?;
        self.pending_trade = None;
        self.engine.refresh_completion(&self.book);
        self.prime_nominee();
        Ok(record)
    }

    pub fn cancel_trade(&mut self) -> Result<TradeOffer, DraftError> {
        let offer = self.pending_trade.take().ok_or(DraftError::NoPendingTrade)?;
        info!(
            "Trade between {} and {} cancelled",
            offer.from.participant, offer.to.participant
        );
        Ok(offer)
    }

    /// Rename a participant. Only allowed before the draft starts.
    pub fn rename_participant(&mut self, from: &str, to: &str) -> Result<(), DraftError> {
        if self.engine.status() != DraftStatus::NotStarted {
            return Err(DraftError::AlreadyStarted);
        }
        let idx = self.book.require(from)?;
        let to = to.trim();
        if to.is_empty() {
            return Err(DraftError::BlankParticipantName);
        }
        if let Some(existing) = self.book.index_of(to) {
            if existing != idx {
                return Err(DraftError::DuplicateParticipant(to.to_string()));
            }
            return Ok(());
        }

        info!("Participant {} renamed to {}", self.book.name_at(idx), to);
        self.book.rename(idx, to.to_string());
        self.ledger.rename(idx, to.to_string());
        Ok(())
    }

    /// The pinned nominee, drawing one if needed.
    pub fn nominee(&mut self) -> Result<String, DraftError> {
        self.engine.nominee(&self.pool, &self.book, &mut self.rng)
    }

    // --- rendering ---

    pub fn snapshot(&self) -> SessionSnapshot {
        let status = self.engine.status();

        let participants = (0..self.book.len())
            .map(|idx| ParticipantView {
                name: self.book.name_at(idx).to_string(),
                budget: self.ledger.balance_at(idx),
                skips_remaining: self.engine.skips_remaining(idx),
                roster: self
                    .book
                    .roster_at(idx)
                    .entries()
                    .map(|(slot, player)| SlotView {
                        slot,
                        player: player.map(str::to_string),
                        stats: player.and_then(|p| self.pool.get(p)).cloned(),
                    })
                    .collect(),
            })
            .collect();

        let acting_idx = self.engine.acting_participant(&self.book);
        let acting = acting_idx.map(|idx| self.book.name_at(idx).to_string());
        let suggested_bid =
            acting_idx.map(|idx| self.rules.default_bid.min(self.ledger.balance_at(idx)));

        let nominee = self
            .engine
            .pinned_nominee()
            .and_then(|name| self.pool.get(name))
            .cloned();

        let available_count = self.engine.available(&self.pool).len();
        let spots_remaining = self.book.total_open_slots();

        SessionSnapshot {
            status,
            participants,
            acting,
            nominee,
            suggested_bid,
            max_bid: self.ledger.max_balance(),
            spots_remaining,
            turns_taken: self.engine.turns_taken(),
            pool_size: self.pool.len(),
            available_count,
            pool_exhausted: status == DraftStatus::InProgress
                && available_count == 0
                && spots_remaining > 0,
            drafted: self.engine.drafted().to_vec(),
            passed: self.engine.passed().to_vec(),
            picks: self.engine.picks().to_vec(),
            pending_trade: self.pending_trade.clone(),
            trades_executed: self.trades.history().len(),
        }
    }

    // --- helpers ---

    fn require_trading_open(&self) -> Result<(), DraftError> {
        match self.engine.status() {
            DraftStatus::InProgress | DraftStatus::Complete => Ok(()),
            status => Err(DraftError::NotInProgress { status }),
        }
    }

    /// Pin a nominee for the next cycle if the draft is running.
    fn prime_nominee(&mut self) {
        if self.engine.status() != DraftStatus::InProgress {
            return;
        }
        if let Err(e) = self.nominee() {
            warn!("No nominee available: {}", e);
        }
    }
}

fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

fn normalize_participants(participants: Vec<String>) -> Result<Vec<String>, DraftError> {
    if !(MIN_PARTICIPANTS..=MAX_PARTICIPANTS).contains(&participants.len()) {
        return Err(DraftError::InvalidParticipantCount(participants.len()));
    }
    let mut names: Vec<String> = Vec::with_capacity(participants.len());
    for name in participants {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(DraftError::BlankParticipantName);
        }
        if names.contains(&name) {
            return Err(DraftError::DuplicateParticipant(name));
        }
        names.push(name);
    }
    Ok(names)
}

/// Default display names, `Player 1` .. `Player n`.
pub fn default_participant_names(n: usize) -> Vec<String> {
    (1..=n).map(|i| format!("Player {i}")).collect()
}
