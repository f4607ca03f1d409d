// Library root: re-exports the app modules so integration tests can drive
// the event loop and console parser directly.

pub mod app;
pub mod console;
pub mod protocol;
