//! Daily check-in collection.

pub mod signal;
pub mod window;

pub use signal::{AckOutcome, AckSignal};
pub use window::{CheckinController, CheckinWindow, ClosedWindow, WindowState};
