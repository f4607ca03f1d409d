// Bilateral trades of rostered players and cash.
//
// A trade is validated up front, then applied all-or-nothing: outgoing
// players leave both rosters, incoming players fill the receiver's empty
// slots in canonical order, and only then does cash move. If either side
// lacks room the rosters and budgets are left exactly as they were.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::ledger::BudgetLedger;
use super::roster::{Roster, RosterBook};
use super::slot::RosterSlot;
use crate::error::DraftError;

/// What one participant gives up in a trade.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeSide {
    pub participant: String,
    pub players: Vec<String>,
    pub cash: u32,
}

impl TradeSide {
    pub fn new(participant: impl Into<String>, players: Vec<String>, cash: u32) -> Self {
        TradeSide {
            participant: participant.into().trim().to_string(),
            players: players.into_iter().map(|p| p.trim().to_string()).collect(),
            cash,
        }
    }

    fn is_empty(&self) -> bool {
        self.players.is_empty() && self.cash == 0
    }
}

/// An operator's trade request, before validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeProposal {
    pub from: TradeSide,
    pub to: TradeSide,
}

/// A validated, not yet executed, trade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeOffer {
    /// The proposing participant and what they send.
    pub from: TradeSide,
    /// The counterparty and what they send back.
    pub to: TradeSide,
}

/// Where an incoming player landed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub participant: String,
    pub player: String,
    pub slot: RosterSlot,
}

/// An executed trade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub offer: TradeOffer,
    pub placements: Vec<Placement>,
    pub executed_at: DateTime<Utc>,
}

/// Validates and applies trades, keeping a history of executed ones.
#[derive(Debug, Clone, Default)]
pub struct TradeEngine {
    history: Vec<TradeRecord>,
}

impl TradeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> &[TradeRecord] {
        &self.history
    }

    /// Check an offer against the current rosters and budgets.
    ///
    /// Rejects self-trades, empty trades, players the offering side does
    /// not own, players listed twice, and cash beyond either side's budget.
    pub fn propose(
        &self,
        from: TradeSide,
        to: TradeSide,
        book: &RosterBook,
        ledger: &BudgetLedger,
    ) -> Result<TradeOffer, DraftError> {
        let offer = TradeOffer { from, to };
        validate(&offer, book, ledger)?;
        info!(
            "Trade proposed: {} sends {:?} + ${}, {} sends {:?} + ${}",
            offer.from.participant,
            offer.from.players,
            offer.from.cash,
            offer.to.participant,
            offer.to.players,
            offer.to.cash
        );
        Ok(offer)
    }

    /// Apply a previously proposed offer.
    ///
    /// The offer is validated again because rosters and budgets may have
    /// moved since it was proposed.
    pub fn execute(
        &mut self,
        offer: &TradeOffer,
        book: &mut RosterBook,
        ledger: &mut BudgetLedger,
    ) -> Result<TradeRecord, DraftError> {
        validate(offer, book, ledger)?;

        let from_idx = book.require(&offer.from.participant)?;
        let to_idx = book.require(&offer.to.participant)?;

        // Stage both rosters; nothing is written back unless every incoming
        // player finds a slot.
        let mut from_roster = book.roster_at(from_idx).clone();
        let mut to_roster = book.roster_at(to_idx).clone();

        let outgoing_from = vacate_players(&mut from_roster, &offer.from.players);
        let outgoing_to = vacate_players(&mut to_roster, &offer.to.players);

        let mut placements = Vec::new();
        placements.extend(place_incoming(
            &mut to_roster,
            &offer.to.participant,
            outgoing_from,
        )?);
        placements.extend(place_incoming(
            &mut from_roster,
            &offer.from.participant,
            outgoing_to,
        )?);

        *book.roster_at_mut(from_idx) = from_roster;
        *book.roster_at_mut(to_idx) = to_roster;

        // Cash moves last. `validate` checked both debits and both credits.
        ledger.debit(&offer.from.participant, offer.from.cash)?;
        ledger.debit(&offer.to.participant, offer.to.cash)?;
        ledger.credit(&offer.to.participant, offer.from.cash)?;
        ledger.credit(&offer.from.participant, offer.to.cash)?;

        info!(
            "Trade executed between {} and {} ({} players moved)",
            offer.from.participant,
            offer.to.participant,
            placements.len()
        );

        let record = TradeRecord {
            offer: offer.clone(),
            placements,
            executed_at: Utc::now(),
        };
        self.history.push(record.clone());
        Ok(record)
    }
}

fn validate(
    offer: &TradeOffer,
    book: &RosterBook,
    ledger: &BudgetLedger,
) -> Result<(), DraftError> {
    let from = &offer.from;
    let to = &offer.to;

    if from.participant == to.participant {
        return Err(DraftError::InvalidTrade(format!(
            "{} cannot trade with themselves",
            from.participant
        )));
    }
    if from.is_empty() && to.is_empty() {
        return Err(DraftError::InvalidTrade("the trade is empty".to_string()));
    }

    for (side, other) in [(from, to), (to, from)] {
        let roster = book.roster(&side.participant)?;
        let balance = ledger.balance(&side.participant)?;

        if side.cash > balance {
            return Err(DraftError::InvalidTrade(format!(
                "{} offers ${} but only has ${}",
                side.participant, side.cash, balance
            )));
        }
        if (balance - side.cash).checked_add(other.cash).is_none() {
            return Err(DraftError::BalanceOverflow {
                participant: side.participant.clone(),
                balance: balance - side.cash,
                amount: other.cash,
            });
        }

        let mut seen = HashSet::new();
        for player in &side.players {
            if !seen.insert(player.as_str()) {
                return Err(DraftError::InvalidTrade(format!(
                    "{player} is listed twice"
                )));
            }
            if roster.slot_of(player).is_none() {
                return Err(DraftError::InvalidTrade(format!(
                    "{} does not have {} on their roster",
                    side.participant, player
                )));
            }
        }
    }

    Ok(())
}

/// Remove the named players from a staged roster, returning them in order.
fn vacate_players(roster: &mut Roster, players: &[String]) -> Vec<String> {
    players
        .iter()
        .filter_map(|player| roster.slot_of(player))
        .collect::<Vec<_>>()
        .into_iter()
        .filter_map(|slot| roster.take(slot))
        .collect()
}

/// Put incoming players into a staged roster's empty slots, canonical order.
fn place_incoming(
    roster: &mut Roster,
    participant: &str,
    incoming: Vec<String>,
) -> Result<Vec<Placement>, DraftError> {
    let open = roster.open_slots();
    if incoming.len() > open.len() {
        warn!(
            "Trade rejected: {} needs {} slots, has {}",
            participant,
            incoming.len(),
            open.len()
        );
        return Err(DraftError::InsufficientSlots {
            participant: participant.to_string(),
            needed: incoming.len(),
            available: open.len(),
        });
    }

    let mut placements = Vec::with_capacity(incoming.len());
    for (player, slot) in incoming.into_iter().zip(open) {
        roster.place(slot, player.clone());
        placements.push(Placement {
            participant: participant.to_string(),
            player,
            slot,
        });
    }
    Ok(placements)
}
