//! Unauthorized detection and the reaction to it.

mod classifier;
mod fetch;
mod handler;
mod navigation;

pub use classifier::{
    AUTH_FAILURE_PHRASES, AuthFailureSignal, ErrorBody, is_unauthorized, mentions_auth_failure,
};
pub use fetch::GuardedClient;
pub use handler::{AuthFailure, UnauthorizedHandler};
pub use navigation::{Navigation, NavigationMode, Navigator, PendingNavigation};
