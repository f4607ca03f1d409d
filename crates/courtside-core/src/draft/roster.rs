// Per-participant rosters and slot occupancy.

use serde::{Deserialize, Serialize};

use super::slot::RosterSlot;
use crate::error::DraftError;

/// One participant's six fixed slots. Every slot is always present; a slot
/// holds either nothing or the name of a drafted player.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    slots: [Option<String>; 6],
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// The player in `slot`, if any.
    pub fn get(&self, slot: RosterSlot) -> Option<&str> {
        self.slots[slot.sort_order()].as_deref()
    }

    /// Slots in canonical order paired with their occupants.
    pub fn entries(&self) -> impl Iterator<Item = (RosterSlot, Option<&str>)> {
        RosterSlot::ALL.into_iter().map(move |slot| (slot, self.get(slot)))
    }

    /// Occupied slots and their players, in canonical order.
    pub fn players(&self) -> impl Iterator<Item = (RosterSlot, &str)> {
        self.entries().filter_map(|(slot, p)| p.map(|name| (slot, name)))
    }

    /// Empty slots in canonical order.
    pub fn open_slots(&self) -> Vec<RosterSlot> {
        self.entries()
            .filter(|(_, p)| p.is_none())
            .map(|(slot, _)| slot)
            .collect()
    }

    pub fn open_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_none()).count()
    }

    pub fn has_open_slot(&self) -> bool {
        self.open_count() > 0
    }

    pub fn is_full(&self) -> bool {
        self.open_count() == 0
    }

    /// The slot holding `player`, if the player is on this roster.
    pub fn slot_of(&self, player: &str) -> Option<RosterSlot> {
        let player = player.trim();
        self.players()
            .find(|(_, name)| *name == player)
            .map(|(slot, _)| slot)
    }

    /// Put `player` into `slot`. Returns `false` without touching anything
    /// if the slot is occupied.
    pub(crate) fn place(&mut self, slot: RosterSlot, player: String) -> bool {
        let cell = &mut self.slots[slot.sort_order()];
        if cell.is_some() {
            return false;
        }
        *cell = Some(player);
        true
    }

    /// Empty `slot`, returning whoever was there.
    pub(crate) fn take(&mut self, slot: RosterSlot) -> Option<String> {
        self.slots[slot.sort_order()].take()
    }

    /// Exchange the contents of two slots in one step.
    pub(crate) fn swap(&mut self, a: RosterSlot, b: RosterSlot) {
        self.slots.swap(a.sort_order(), b.sort_order());
    }
}

/// Rosters for every participant, in participant order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterBook {
    entries: Vec<(String, Roster)>,
}

impl RosterBook {
    /// Create empty rosters for the given participants.
    pub fn new(participants: &[String]) -> Self {
        RosterBook {
            entries: participants
                .iter()
                .map(|name| (name.clone(), Roster::new()))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Participant names in turn order.
    pub fn participants(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn index_of(&self, participant: &str) -> Option<usize> {
        let participant = participant.trim();
        self.entries.iter().position(|(name, _)| name == participant)
    }

    /// Name of the participant at `idx`.
    pub fn name_at(&self, idx: usize) -> &str {
        &self.entries[idx].0
    }

    pub fn roster_at(&self, idx: usize) -> &Roster {
        &self.entries[idx].1
    }

    pub(crate) fn roster_at_mut(&mut self, idx: usize) -> &mut Roster {
        &mut self.entries[idx].1
    }

    pub fn roster(&self, participant: &str) -> Result<&Roster, DraftError> {
        let idx = self.require(participant)?;
        Ok(self.roster_at(idx))
    }

    /// Index of a known participant, or `UnknownParticipant`.
    pub fn require(&self, participant: &str) -> Result<usize, DraftError> {
        self.index_of(participant)
            .ok_or_else(|| DraftError::UnknownParticipant(participant.trim().to_string()))
    }

    /// Place `player` into an empty slot on `participant`'s roster.
    ///
    /// Fails with `SlotOccupied` if the slot is taken, and with
    /// `AlreadyRostered` if the player sits anywhere in the league.
    pub fn assign(
        &mut self,
        participant: &str,
        slot: RosterSlot,
        player: &str,
    ) -> Result<(), DraftError> {
        let idx = self.require(participant)?;
        let player = player.trim();

        if let Some(occupant) = self.roster_at(idx).get(slot) {
            return Err(DraftError::SlotOccupied {
                participant: self.name_at(idx).to_string(),
                slot,
                occupant: occupant.to_string(),
            });
        }
        if let Some((owner, _)) = self.owner_of(player) {
            return Err(DraftError::AlreadyRostered {
                player: player.to_string(),
                participant: owner.to_string(),
            });
        }

        self.roster_at_mut(idx).place(slot, player.to_string());
        Ok(())
    }

    /// Empty a slot. Returns the player who was there, if any.
    pub fn vacate(
        &mut self,
        participant: &str,
        slot: RosterSlot,
    ) -> Result<Option<String>, DraftError> {
        let idx = self.require(participant)?;
        Ok(self.roster_at_mut(idx).take(slot))
    }

    /// Move `player` to `to` on their owner's roster.
    ///
    /// If `to` is occupied, its occupant moves into the slot `player` left,
    /// as a single swap. Returns the name of the bumped player, if any.
    pub fn move_player(
        &mut self,
        participant: &str,
        player: &str,
        to: RosterSlot,
    ) -> Result<Option<String>, DraftError> {
        let idx = self.require(participant)?;
        let roster = self.roster_at(idx);
        let from = roster
            .slot_of(player)
            .ok_or_else(|| DraftError::PlayerNotOnRoster {
                participant: self.name_at(idx).to_string(),
                player: player.trim().to_string(),
            })?;
        if from == to {
            return Ok(None);
        }
        let bumped = roster.get(to).map(str::to_string);
        self.roster_at_mut(idx).swap(from, to);
        Ok(bumped)
    }

    pub fn has_open_slot(&self, participant: &str) -> Result<bool, DraftError> {
        Ok(self.roster(participant)?.has_open_slot())
    }

    pub fn has_open_slot_at(&self, idx: usize) -> bool {
        self.roster_at(idx).has_open_slot()
    }

    /// Empty slots across the whole league.
    pub fn total_open_slots(&self) -> usize {
        self.entries.iter().map(|(_, r)| r.open_count()).sum()
    }

    /// Whether every slot of every roster is filled.
    pub fn all_full(&self) -> bool {
        self.entries.iter().all(|(_, r)| r.is_full())
    }

    /// Who holds `player`, and in which slot.
    pub fn owner_of(&self, player: &str) -> Option<(&str, RosterSlot)> {
        self.entries.iter().find_map(|(name, roster)| {
            roster.slot_of(player).map(|slot| (name.as_str(), slot))
        })
    }

    pub(crate) fn rename(&mut self, idx: usize, new_name: String) {
        self.entries[idx].0 = new_name;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book() -> RosterBook {
        RosterBook::new(&["Alice".to_string(), "Bob".to_string()])
    }

    #[test]
    fn new_roster_has_six_open_slots() {
        let roster = Roster::new();
        assert_eq!(roster.open_count(), 6);
        assert_eq!(roster.open_slots(), RosterSlot::ALL.to_vec());
        assert!(roster.entries().all(|(_, p)| p.is_none()));
    }

    #[test]
    fn assign_fills_slot() {
        let mut book = book();
        book.assign("Alice", RosterSlot::PointGuard, "Trae Young").unwrap();
        let roster = book.roster("Alice").unwrap();
        assert_eq!(roster.get(RosterSlot::PointGuard), Some("Trae Young"));
        assert_eq!(roster.open_count(), 5);
        assert_eq!(book.total_open_slots(), 11);
    }

    #[test]
    fn assign_to_occupied_slot_fails() {
        let mut book = book();
        book.assign("Alice", RosterSlot::Center, "Joel Embiid").unwrap();
        let err = book
            .assign("Alice", RosterSlot::Center, "Rudy Gobert")
            .unwrap_err();
        match err {
            DraftError::SlotOccupied { slot, occupant, .. } => {
                assert_eq!(slot, RosterSlot::Center);
                assert_eq!(occupant, "Joel Embiid");
            }
            other => panic!("expected SlotOccupied, got {other}"),
        }
        assert_eq!(
            book.roster("Alice").unwrap().get(RosterSlot::Center),
            Some("Joel Embiid")
        );
    }

    #[test]
    fn assign_rejects_player_rostered_elsewhere() {
        let mut book = book();
        book.assign("Alice", RosterSlot::Center, "Joel Embiid").unwrap();
        let err = book
            .assign("Bob", RosterSlot::PowerForward, "Joel Embiid")
            .unwrap_err();
        assert!(matches!(err, DraftError::AlreadyRostered { .. }));
        assert!(book.roster("Bob").unwrap().get(RosterSlot::PowerForward).is_none());
    }

    #[test]
    fn assign_unknown_participant() {
        let mut book = book();
        let err = book
            .assign("Carol", RosterSlot::PointGuard, "X")
            .unwrap_err();
        assert!(matches!(err, DraftError::UnknownParticipant(name) if name == "Carol"));
    }

    #[test]
    fn vacate_returns_previous_occupant() {
        let mut book = book();
        book.assign("Bob", RosterSlot::SixthMan, "Tyler Herro").unwrap();
        let out = book.vacate("Bob", RosterSlot::SixthMan).unwrap();
        assert_eq!(out.as_deref(), Some("Tyler Herro"));
        assert_eq!(book.vacate("Bob", RosterSlot::SixthMan).unwrap(), None);
    }

    #[test]
    fn move_player_into_empty_slot() {
        let mut book = book();
        book.assign("Alice", RosterSlot::PointGuard, "Ja Morant").unwrap();
        let bumped = book
            .move_player("Alice", "Ja Morant", RosterSlot::ShootingGuard)
            .unwrap();
        assert!(bumped.is_none());
        let roster = book.roster("Alice").unwrap();
        assert!(roster.get(RosterSlot::PointGuard).is_none());
        assert_eq!(roster.get(RosterSlot::ShootingGuard), Some("Ja Morant"));
    }

    #[test]
    fn move_player_swaps_with_occupant() {
        let mut book = book();
        book.assign("Alice", RosterSlot::PointGuard, "Ja Morant").unwrap();
        book.assign("Alice", RosterSlot::SixthMan, "Jordan Poole").unwrap();
        let bumped = book
            .move_player("Alice", "Jordan Poole", RosterSlot::PointGuard)
            .unwrap();
        assert_eq!(bumped.as_deref(), Some("Ja Morant"));
        let roster = book.roster("Alice").unwrap();
        assert_eq!(roster.get(RosterSlot::PointGuard), Some("Jordan Poole"));
        assert_eq!(roster.get(RosterSlot::SixthMan), Some("Ja Morant"));
        assert_eq!(roster.open_count(), 4);
    }

    #[test]
    fn move_player_to_same_slot_is_noop() {
        let mut book = book();
        book.assign("Alice", RosterSlot::Center, "Bam Adebayo").unwrap();
        let before = book.clone();
        assert!(book
            .move_player("Alice", "Bam Adebayo", RosterSlot::Center)
            .unwrap()
            .is_none());
        assert_eq!(book, before);
    }

    #[test]
    fn move_player_not_on_roster_fails() {
        let mut book = book();
        book.assign("Bob", RosterSlot::Center, "Bam Adebayo").unwrap();
        let err = book
            .move_player("Alice", "Bam Adebayo", RosterSlot::PointGuard)
            .unwrap_err();
        assert!(matches!(err, DraftError::PlayerNotOnRoster { .. }));
    }

    #[test]
    fn has_open_slot_and_all_full() {
        let mut book = book();
        for (i, slot) in RosterSlot::ALL.iter().enumerate() {
            book.assign("Alice", *slot, &format!("A{i}")).unwrap();
        }
        assert!(!book.has_open_slot("Alice").unwrap());
        assert!(book.has_open_slot("Bob").unwrap());
        assert!(!book.all_full());
        for (i, slot) in RosterSlot::ALL.iter().enumerate() {
            book.assign("Bob", *slot, &format!("B{i}")).unwrap();
        }
        assert!(book.all_full());
        assert_eq!(book.total_open_slots(), 0);
    }

    #[test]
    fn owner_of_finds_player() {
        let mut book = book();
        book.assign("Bob", RosterSlot::SmallForward, "Jimmy Butler").unwrap();
        assert_eq!(
            book.owner_of("Jimmy Butler"),
            Some(("Bob", RosterSlot::SmallForward))
        );
        assert_eq!(book.owner_of("Nobody"), None);
    }
}
