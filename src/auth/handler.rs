use std::sync::Arc;

use super::navigation::{Navigation, Navigator};
use crate::credentials::Credentials;

const DEFAULT_REASON: &str = "unauthorized";

/// Terminal auth-failure signal.
///
/// Only [`UnauthorizedHandler::handle`] creates one, after credentials are
/// cleared and navigation to login is requested. Whoever receives it must
/// stop and propagate it (usually as [`Error::Unauthorized`](crate::Error::Unauthorized)).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Session terminated: {reason}")]
#[must_use = "an auth failure must be propagated to stop the caller"]
pub struct AuthFailure {
    reason: String,
}

impl AuthFailure {
    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

/// The single chokepoint for authentication failures: log, clear every
/// credential, full-page navigate to login.
#[derive(Clone)]
pub struct UnauthorizedHandler {
    credentials: Credentials,
    navigator: Arc<dyn Navigator>,
    login_route: String,
}

impl UnauthorizedHandler {
    #[must_use]
    pub fn new(
        credentials: Credentials,
        navigator: Arc<dyn Navigator>,
        login_route: impl Into<String>,
    ) -> Self {
        Self {
            credentials,
            navigator,
            login_route: login_route.into(),
        }
    }

    #[must_use]
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    #[must_use]
    pub fn login_route(&self) -> &str {
        &self.login_route
    }

    /// Tear the session down. Safe to call from anywhere in a fetch call
    /// stack and safe to call repeatedly.
    pub fn handle(&self, reason: Option<&str>) -> AuthFailure {
        let reason = reason.unwrap_or(DEFAULT_REASON);
        tracing::warn!(
            reason = %reason,
            "Unauthorized; clearing credentials and redirecting to login"
        );

        self.credentials.clear_all();
        self.navigator
            .navigate(Navigation::assign(self.login_route.clone()));

        AuthFailure {
            reason: reason.to_owned(),
        }
    }
}
