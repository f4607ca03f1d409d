// Draft state machine: nomination, bid resolution, and turn advancement.
//
// One cycle: pin a random nominee from the undrafted pool, take a resolution
// (a winning bid or a skip) for the participant whose turn it is, apply it to
// the roster book and budget ledger, then pass the turn. Rejected
// resolutions leave everything untouched, including the pinned nominee and
// the acting participant.

use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::ledger::BudgetLedger;
use super::roster::RosterBook;
use super::slot::RosterSlot;
use super::turn::TurnSequencer;
use crate::error::DraftError;
use crate::pool::PlayerPool;

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// How many times a participant may pass on their turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipPolicy {
    /// Skipping is always allowed.
    Unlimited,
    /// Each participant gets this many skips for the whole session.
    Limited(u32),
}

/// Session-wide draft rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftRules {
    pub starting_budget: u32,
    pub skip_policy: SkipPolicy,
    /// When set, a skipped nominee never comes up again this session.
    /// Otherwise it goes back into the pool.
    pub skip_removes_nominee: bool,
    /// Upper bound for the suggested bid shown to the operator.
    pub default_bid: u32,
}

impl Default for DraftRules {
    fn default() -> Self {
        DraftRules {
            starting_budget: 1000,
            skip_policy: SkipPolicy::Unlimited,
            skip_removes_nominee: false,
            default_bid: 100,
        }
    }
}

// ---------------------------------------------------------------------------
// State and cycle types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DraftStatus {
    NotStarted,
    InProgress,
    Complete,
}

impl fmt::Display for DraftStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DraftStatus::NotStarted => "not started",
            DraftStatus::InProgress => "in progress",
            DraftStatus::Complete => "complete",
        };
        write!(f, "{s}")
    }
}

/// The operator's verdict on the current nominee.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BidResolution {
    Won {
        winner: String,
        amount: u32,
        slot: RosterSlot,
    },
    Skip,
}

/// A completed draft pick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftPick {
    /// Sequential pick number (1-indexed).
    pub pick_number: u32,
    pub participant: String,
    pub player_name: String,
    pub price: u32,
    pub slot: RosterSlot,
    pub drafted_at: DateTime<Utc>,
}

/// What an accepted resolution did.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    Drafted(DraftPick),
    Skipped {
        participant: String,
        nominee: String,
        /// Whether the nominee left the pool for good.
        removed: bool,
    },
}

// ---------------------------------------------------------------------------
// DraftEngine
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct DraftEngine {
    rules: DraftRules,
    status: DraftStatus,
    turn: TurnSequencer,
    /// Every drafted player, in pick order, across all rosters.
    drafted: Vec<String>,
    /// Nominees removed by a skip under `skip_removes_nominee`.
    passed: Vec<String>,
    /// `drafted` and `passed` combined, for sampling.
    excluded: HashSet<String>,
    /// The pinned nominee for the current cycle.
    nominee: Option<String>,
    /// Remaining skips per participant index. Unused under `Unlimited`.
    skips_remaining: Vec<u32>,
    picks: Vec<DraftPick>,
    turns_taken: u32,
}

impl DraftEngine {
    pub fn new(rules: DraftRules, participant_count: usize) -> Self {
        let per_participant = match rules.skip_policy {
            SkipPolicy::Limited(n) => n,
            SkipPolicy::Unlimited => 0,
        };
        DraftEngine {
            rules,
            status: DraftStatus::NotStarted,
            turn: TurnSequencer::new(),
            drafted: Vec::new(),
            passed: Vec::new(),
            excluded: HashSet::new(),
            nominee: None,
            skips_remaining: vec![per_participant; participant_count],
            picks: Vec::new(),
            turns_taken: 0,
        }
    }

    pub fn status(&self) -> DraftStatus {
        self.status
    }

    pub fn drafted(&self) -> &[String] {
        &self.drafted
    }

    pub fn passed(&self) -> &[String] {
        &self.passed
    }

    pub fn picks(&self) -> &[DraftPick] {
        &self.picks
    }

    pub fn turns_taken(&self) -> u32 {
        self.turns_taken
    }

    /// The pinned nominee, without drawing a new one.
    pub fn pinned_nominee(&self) -> Option<&str> {
        self.nominee.as_deref()
    }

    /// Skips left for the participant at `idx`; `None` when skips are
    /// unlimited.
    pub fn skips_remaining(&self, idx: usize) -> Option<u32> {
        match self.rules.skip_policy {
            SkipPolicy::Limited(_) => self.skips_remaining.get(idx).copied(),
            SkipPolicy::Unlimited => None,
        }
    }

    /// Total of all winning bids so far.
    pub fn total_spent(&self) -> u64 {
        self.picks.iter().map(|p| u64::from(p.price)).sum()
    }

    /// `NotStarted -> InProgress`.
    pub fn start(&mut self, book: &RosterBook) -> Result<(), DraftError> {
        if self.status != DraftStatus::NotStarted {
            return Err(DraftError::AlreadyStarted);
        }
        self.status = DraftStatus::InProgress;
        self.turn.reset();
        info!("Draft started with {} participants", book.len());
        self.refresh_completion(book);
        Ok(())
    }

    fn require_in_progress(&self) -> Result<(), DraftError> {
        if self.status != DraftStatus::InProgress {
            return Err(DraftError::NotInProgress {
                status: self.status,
            });
        }
        Ok(())
    }

    /// Pool names still eligible for nomination.
    pub fn available<'a>(&'a self, pool: &'a PlayerPool) -> Vec<&'a str> {
        pool.available(&self.excluded)
    }

    /// The participant whose turn it is, if anyone still has room.
    pub fn acting_participant(&self, book: &RosterBook) -> Option<usize> {
        if self.status != DraftStatus::InProgress {
            return None;
        }
        self.turn.peek(book)
    }

    /// The nominee for this cycle, drawing and pinning one if needed.
    ///
    /// A pinned nominee that is no longer available (the pool was refreshed
    /// without it) is replaced. Fails with `PoolExhausted` when nobody is left
    /// to nominate; that does not change the draft status.
    pub fn nominee<R: Rng + ?Sized>(
        &mut self,
        pool: &PlayerPool,
        book: &RosterBook,
        rng: &mut R,
    ) -> Result<String, DraftError> {
        self.require_in_progress()?;

        if let Some(pinned) = &self.nominee {
            if pool.contains(pinned) && !self.excluded.contains(pinned) {
                return Ok(pinned.clone());
            }
            debug!("Pinned nominee {} is no longer available", pinned);
        }

        let available = self.available(pool);
        let drawn = available
            .choose(rng)
            .map(|name| name.to_string())
            .ok_or(DraftError::PoolExhausted {
                open_slots: book.total_open_slots(),
            })?;
        debug!("Drew nominee {} from {} available", drawn, available.len());
        self.nominee = Some(drawn.clone());
        Ok(drawn)
    }

    /// Apply the operator's resolution for the current cycle.
    ///
    /// On success the nominee is unpinned, the turn passes, and completion
    /// is re-checked. On failure nothing changes.
    pub fn resolve<R: Rng + ?Sized>(
        &mut self,
        resolution: BidResolution,
        pool: &PlayerPool,
        book: &mut RosterBook,
        ledger: &mut BudgetLedger,
        rng: &mut R,
    ) -> Result<CycleOutcome, DraftError> {
        self.require_in_progress()?;
        let nominee = self.nominee(pool, book, rng)?;
        let acting = self
            .turn
            .current(book)
            .ok_or(DraftError::NotInProgress {
                status: DraftStatus::Complete,
            })?;

        let outcome = match resolution {
            BidResolution::Skip => self.apply_skip(acting, nominee, book)?,
            BidResolution::Won {
                winner,
                amount,
                slot,
            } => self.apply_win(&winner, amount, slot, nominee, book, ledger)?,
        };

        self.finish_cycle(book);
        Ok(outcome)
    }

    fn apply_skip(
        &mut self,
        acting: usize,
        nominee: String,
        book: &RosterBook,
    ) -> Result<CycleOutcome, DraftError> {
        let participant = book.name_at(acting).to_string();

        if let SkipPolicy::Limited(_) = self.rules.skip_policy {
            let remaining = &mut self.skips_remaining[acting];
            if *remaining == 0 {
                return Err(DraftError::NoSkipsRemaining { participant });
            }
            *remaining -= 1;
        }

        let removed = self.rules.skip_removes_nominee;
        if removed {
            self.passed.push(nominee.clone());
            self.excluded.insert(nominee.clone());
        }

        info!(
            "{} skipped {}{}",
            participant,
            nominee,
            if removed { " (removed from pool)" } else { "" }
        );
        Ok(CycleOutcome::Skipped {
            participant,
            nominee,
            removed,
        })
    }

    fn apply_win(
        &mut self,
        winner: &str,
        amount: u32,
        slot: RosterSlot,
        nominee: String,
        book: &mut RosterBook,
        ledger: &mut BudgetLedger,
    ) -> Result<CycleOutcome, DraftError> {
        let idx = book.require(winner)?;
        let participant = book.name_at(idx).to_string();
        let roster = book.roster_at(idx);

        if !roster.has_open_slot() {
            return Err(DraftError::NoOpenSlot { participant });
        }
        let balance = ledger.balance(&participant)?;
        if amount > balance {
            return Err(DraftError::InsufficientBudget {
                participant,
                balance,
                amount,
            });
        }
        if let Some(occupant) = roster.get(slot) {
            return Err(DraftError::SlotOccupied {
                participant,
                slot,
                occupant: occupant.to_string(),
            });
        }

        book.assign(&participant, slot, &nominee)?;
        if let Err(e) = ledger.debit(&participant, amount) {
            book.vacate(&participant, slot)?;
            return Err(e);
        }

        self.drafted.push(nominee.clone());
        self.excluded.insert(nominee.clone());

        let pick = DraftPick {
            pick_number: self.picks.len() as u32 + 1,
            participant,
            player_name: nominee,
            price: amount,
            slot,
            drafted_at: Utc::now(),
        };
        info!(
            "Pick #{}: {} -> {} ({}) for ${}",
            pick.pick_number, pick.player_name, pick.participant, pick.slot, pick.price
        );
        self.picks.push(pick.clone());
        Ok(CycleOutcome::Drafted(pick))
    }

    fn finish_cycle(&mut self, book: &RosterBook) {
        self.nominee = None;
        self.turns_taken += 1;
        self.turn.next(book);
        self.refresh_completion(book);
    }

    /// Re-derive `InProgress`/`Complete` from roster occupancy.
    ///
    /// Called after every accepted resolution and after roster changes made
    /// outside the cycle (trades, slot moves).
    pub fn refresh_completion(&mut self, book: &RosterBook) {
        match (self.status, book.all_full()) {
            (DraftStatus::InProgress, true) => {
                info!("All rosters are full; draft complete");
                self.status = DraftStatus::Complete;
                self.nominee = None;
            }
            (DraftStatus::Complete, false) => {
                info!("Roster slots reopened; draft back in progress");
                self.status = DraftStatus::InProgress;
            }
            _ => {}
        }
    }

    /// Drop the pinned nominee if the pool no longer carries it.
    pub fn on_pool_replaced(&mut self, pool: &PlayerPool) {
        if let Some(pinned) = &self.nominee {
            if !pool.contains(pinned) {
                debug!("Unpinning {} after pool refresh", pinned);
                self.nominee = None;
            }
        }
    }
}
