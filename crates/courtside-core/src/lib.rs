// Library root: the auction draft state machine and everything it needs to
// run a session (pool loading, configuration, rosters, budgets, trades).

pub mod config;
pub mod draft;
pub mod error;
pub mod pool;
pub mod session;

pub use error::DraftError;
pub use session::{SessionSnapshot, SessionState};
