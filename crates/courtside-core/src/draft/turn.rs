// Turn order: whose turn it is to act, skipping full rosters.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::roster::RosterBook;

/// Round-robin cursor over participants.
///
/// Eligibility is re-checked on every call because trades and skipped turns
/// change who still has room.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnSequencer {
    cursor: usize,
}

impl TurnSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw cursor position (index into participant order).
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// The participant whose turn it is.
    ///
    /// If the participant under the cursor has filled every slot since the
    /// turn began, the cursor moves on as in [`next`](Self::next). Returns
    /// `None` when nobody has an open slot.
    pub fn current(&mut self, book: &RosterBook) -> Option<usize> {
        if book.is_empty() {
            return None;
        }
        self.cursor %= book.len();
        if book.has_open_slot_at(self.cursor) {
            return Some(self.cursor);
        }
        self.next(book)
    }

    /// Who [`current`](Self::current) would return, without moving the
    /// cursor.
    pub fn peek(&self, book: &RosterBook) -> Option<usize> {
        let n = book.len();
        (0..n)
            .map(|step| (self.cursor + step) % n)
            .find(|&idx| book.has_open_slot_at(idx))
    }

    /// Move to the next participant with an open slot.
    ///
    /// Steps `(cursor + 1) mod N` at most `N` times. Returns `None`
    /// ("exhausted") if no participant has room; the cursor then ends where
    /// it started.
    pub fn next(&mut self, book: &RosterBook) -> Option<usize> {
        let n = book.len();
        if n == 0 {
            return None;
        }
        for _ in 0..n {
            self.cursor = (self.cursor + 1) % n;
            if book.has_open_slot_at(self.cursor) {
                debug!("Turn passes to {}", book.name_at(self.cursor));
                return Some(self.cursor);
            }
        }
        debug!("No participant has an open slot; turn order exhausted");
        None
    }

    pub fn reset(&mut self) {
        self.cursor = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::slot::RosterSlot;

    fn names(n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("P{i}")).collect()
    }

    fn fill(book: &mut RosterBook, who: &str) {
        for slot in RosterSlot::ALL {
            if book.roster(who).unwrap().get(slot).is_none() {
                book.assign(who, slot, &format!("{who}-{slot}")).unwrap();
            }
        }
    }

    #[test]
    fn advances_round_robin() {
        let book = RosterBook::new(&names(3));
        let mut seq = TurnSequencer::new();
        assert_eq!(seq.current(&book), Some(0));
        assert_eq!(seq.next(&book), Some(1));
        assert_eq!(seq.next(&book), Some(2));
        assert_eq!(seq.next(&book), Some(0));
    }

    #[test]
    fn skips_full_rosters() {
        let mut book = RosterBook::new(&names(3));
        fill(&mut book, "P2");
        let mut seq = TurnSequencer::new();
        assert_eq!(seq.next(&book), Some(2));
        assert_eq!(seq.next(&book), Some(0));
        assert_eq!(seq.next(&book), Some(2));
    }

    #[test]
    fn current_moves_off_a_full_roster() {
        let mut book = RosterBook::new(&names(3));
        fill(&mut book, "P1");
        let mut seq = TurnSequencer::new();
        assert_eq!(seq.current(&book), Some(1));
        assert_eq!(seq.cursor(), 1);
    }

    #[test]
    fn peek_agrees_with_current_without_moving() {
        let mut book = RosterBook::new(&names(3));
        fill(&mut book, "P1");
        let mut seq = TurnSequencer::new();
        assert_eq!(seq.peek(&book), Some(1));
        assert_eq!(seq.cursor(), 0);
        assert_eq!(seq.current(&book), Some(1));
        fill(&mut book, "P2");
        fill(&mut book, "P3");
        assert_eq!(seq.peek(&book), None);
    }

    #[test]
    fn exhausted_when_everyone_full() {
        let mut book = RosterBook::new(&names(2));
        fill(&mut book, "P1");
        fill(&mut book, "P2");
        let mut seq = TurnSequencer::new();
        assert_eq!(seq.next(&book), None);
        assert_eq!(seq.current(&book), None);
        assert_eq!(seq.cursor(), 0);
    }

    #[test]
    fn only_one_open_participant_keeps_the_turn() {
        let mut book = RosterBook::new(&names(3));
        fill(&mut book, "P1");
        fill(&mut book, "P3");
        let mut seq = TurnSequencer::new();
        assert_eq!(seq.next(&book), Some(1));
        assert_eq!(seq.next(&book), Some(1));
    }

    #[test]
    fn never_returns_full_participant_while_someone_has_room() {
        let mut book = RosterBook::new(&names(4));
        fill(&mut book, "P2");
        fill(&mut book, "P4");
        let mut seq = TurnSequencer::new();
        for _ in 0..20 {
            let idx = seq.next(&book).unwrap();
            assert!(book.has_open_slot_at(idx));
        }
    }

    #[test]
    fn reset_returns_to_first_participant() {
        let book = RosterBook::new(&names(3));
        let mut seq = TurnSequencer::new();
        seq.next(&book);
        seq.reset();
        assert_eq!(seq.cursor(), 0);
    }
}
