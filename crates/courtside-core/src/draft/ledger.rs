// Per-participant spendable balances.

use serde::{Deserialize, Serialize};

use crate::error::DraftError;

/// Balance for each participant, in participant order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetLedger {
    entries: Vec<(String, u32)>,
    starting_budget: u32,
}

impl BudgetLedger {
    /// Give every participant `starting_budget`.
    pub fn new(participants: &[String], starting_budget: u32) -> Self {
        BudgetLedger {
            entries: participants
                .iter()
                .map(|name| (name.clone(), starting_budget))
                .collect(),
            starting_budget,
        }
    }

    fn require(&self, participant: &str) -> Result<usize, DraftError> {
        let participant = participant.trim();
        self.entries
            .iter()
            .position(|(name, _)| name == participant)
            .ok_or_else(|| DraftError::UnknownParticipant(participant.to_string()))
    }

    pub fn balance(&self, participant: &str) -> Result<u32, DraftError> {
        let idx = self.require(participant)?;
        Ok(self.entries[idx].1)
    }

    pub fn balance_at(&self, idx: usize) -> u32 {
        self.entries[idx].1
    }

    /// Remove `amount` from a balance. Fails with `InsufficientBudget` and
    /// leaves the balance alone if `amount` exceeds it.
    pub fn debit(&mut self, participant: &str, amount: u32) -> Result<u32, DraftError> {
        let idx = self.require(participant)?;
        let (name, balance) = &mut self.entries[idx];
        if amount > *balance {
            return Err(DraftError::InsufficientBudget {
                participant: name.clone(),
                balance: *balance,
                amount,
            });
        }
        *balance -= amount;
        Ok(*balance)
    }

    /// Add `amount` to a balance. Fails with `BalanceOverflow` and leaves
    /// the balance alone if the result does not fit.
    pub fn credit(&mut self, participant: &str, amount: u32) -> Result<u32, DraftError> {
        let idx = self.require(participant)?;
        let (name, balance) = &mut self.entries[idx];
        *balance = balance
            .checked_add(amount)
            .ok_or_else(|| DraftError::BalanceOverflow {
                participant: name.clone(),
                balance: *balance,
                amount,
            })?;
        Ok(*balance)
    }

    /// Sum of all current balances.
    pub fn total(&self) -> u64 {
        self.entries.iter().map(|(_, b)| u64::from(*b)).sum()
    }

    /// Sum of all starting balances.
    pub fn total_initial(&self) -> u64 {
        u64::from(self.starting_budget) * self.entries.len() as u64
    }

    /// Largest balance held by anyone.
    pub fn max_balance(&self) -> u32 {
        self.entries.iter().map(|(_, b)| *b).max().unwrap_or(0)
    }

    pub(crate) fn rename(&mut self, idx: usize, new_name: String) {
        self.entries[idx].0 = new_name;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger() -> BudgetLedger {
        BudgetLedger::new(&["Alice".to_string(), "Bob".to_string()], 1000)
    }

    #[test]
    fn starts_at_configured_budget() {
        let ledger = ledger();
        assert_eq!(ledger.balance("Alice").unwrap(), 1000);
        assert_eq!(ledger.balance("Bob").unwrap(), 1000);
        assert_eq!(ledger.total(), 2000);
        assert_eq!(ledger.total_initial(), 2000);
    }

    #[test]
    fn debit_reduces_balance() {
        let mut ledger = ledger();
        assert_eq!(ledger.debit("Alice", 50).unwrap(), 950);
        assert_eq!(ledger.balance("Alice").unwrap(), 950);
        assert_eq!(ledger.balance("Bob").unwrap(), 1000);
    }

    #[test]
    fn debit_entire_balance_allowed() {
        let mut ledger = ledger();
        assert_eq!(ledger.debit("Bob", 1000).unwrap(), 0);
    }

    #[test]
    fn overdraft_rejected_and_balance_unchanged() {
        let mut ledger = ledger();
        ledger.debit("Alice", 900).unwrap();
        let err = ledger.debit("Alice", 101).unwrap_err();
        match err {
            DraftError::InsufficientBudget {
                balance, amount, ..
            } => {
                assert_eq!(balance, 100);
                assert_eq!(amount, 101);
            }
            other => panic!("expected InsufficientBudget, got {other}"),
        }
        assert_eq!(ledger.balance("Alice").unwrap(), 100);
    }

    #[test]
    fn credit_increases_balance() {
        let mut ledger = ledger();
        assert_eq!(ledger.credit("Bob", 25).unwrap(), 1025);
        assert_eq!(ledger.max_balance(), 1025);
    }

    #[test]
    fn credit_overflow_rejected_and_balance_unchanged() {
        let mut ledger = BudgetLedger::new(&["Alice".to_string()], u32::MAX - 10);
        let err = ledger.credit("Alice", 11).unwrap_err();
        assert!(matches!(
            err,
            DraftError::BalanceOverflow { balance, amount: 11, .. } if balance == u32::MAX - 10
        ));
        assert_eq!(ledger.balance("Alice").unwrap(), u32::MAX - 10);
        assert_eq!(ledger.credit("Alice", 10).unwrap(), u32::MAX);
    }

    #[test]
    fn unknown_participant() {
        let mut ledger = ledger();
        assert!(matches!(
            ledger.debit("Zed", 1),
            Err(DraftError::UnknownParticipant(_))
        ));
        assert!(matches!(
            ledger.credit("Zed", 1),
            Err(DraftError::UnknownParticipant(_))
        ));
    }
}
