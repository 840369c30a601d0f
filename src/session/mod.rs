//! Session-validity watchdog.
//!
//! There is no server push: validity is reconstructed from the credential
//! cookies on a timer and whenever the page becomes visible again.

mod validator;
mod watchdog;

pub use validator::{SessionState, SessionValidator};
pub use watchdog::{Visibility, WatchdogGuard, spawn_watchdog};
