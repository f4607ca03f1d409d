// Draft mechanics: slots, rosters, budgets, turn order, the auction cycle,
// and trades.

pub mod engine;
pub mod ledger;
pub mod roster;
pub mod slot;
pub mod trade;
pub mod turn;
