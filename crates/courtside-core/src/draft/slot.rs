// Roster slot designations.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the six fixed roster positions every participant owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RosterSlot {
    PointGuard,
    ShootingGuard,
    SmallForward,
    PowerForward,
    Center,
    SixthMan,
}

impl RosterSlot {
    /// All slots in canonical order (PG, SG, SF, PF, C, 6th Man).
    ///
    /// This order drives roster display and the unattended placement of
    /// incoming players during trades.
    pub const ALL: [RosterSlot; 6] = [
        RosterSlot::PointGuard,
        RosterSlot::ShootingGuard,
        RosterSlot::SmallForward,
        RosterSlot::PowerForward,
        RosterSlot::Center,
        RosterSlot::SixthMan,
    ];

    /// Parse a slot label.
    ///
    /// Accepts the display labels plus a few shorthands operators tend to
    /// type for the bench slot:
    /// - "PG", "SG", "SF", "PF", "C"
    /// - "6th Man", "6TH", "6M", "SIXTH", "6"
    pub fn from_str_slot(s: &str) -> Option<Self> {
        let normalized: String = s
            .trim()
            .to_uppercase()
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        match normalized.as_str() {
            "PG" => Some(RosterSlot::PointGuard),
            "SG" => Some(RosterSlot::ShootingGuard),
            "SF" => Some(RosterSlot::SmallForward),
            "PF" => Some(RosterSlot::PowerForward),
            "C" => Some(RosterSlot::Center),
            "6THMAN" | "6TH" | "6M" | "SIXTH" | "SIXTHMAN" | "6" => Some(RosterSlot::SixthMan),
            _ => None,
        }
    }

    /// Return the display label for this slot.
    pub fn display_str(&self) -> &'static str {
        match self {
            RosterSlot::PointGuard => "PG",
            RosterSlot::ShootingGuard => "SG",
            RosterSlot::SmallForward => "SF",
            RosterSlot::PowerForward => "PF",
            RosterSlot::Center => "C",
            RosterSlot::SixthMan => "6th Man",
        }
    }

    /// Position of this slot in the canonical order.
    pub fn sort_order(&self) -> usize {
        match self {
            RosterSlot::PointGuard => 0,
            RosterSlot::ShootingGuard => 1,
            RosterSlot::SmallForward => 2,
            RosterSlot::PowerForward => 3,
            RosterSlot::Center => 4,
            RosterSlot::SixthMan => 5,
        }
    }
}

impl fmt::Display for RosterSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_str())
    }
}
