use std::sync::Arc;

use crate::auth::{Navigation, Navigator};
use crate::config::SessionSettings;
use crate::credentials::Credentials;

/// Outcome of a single validation tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Route is on the public allowlist; credentials were not consulted.
    Public,
    /// `user` and `token` are present.
    Complete,
    /// `user` and `temp_token` are present on the school-selection route.
    PendingSchoolSelection,
    Invalid,
}

impl SessionState {
    #[must_use]
    pub fn is_valid(self) -> bool {
        !matches!(self, Self::Invalid)
    }
}

/// Reconstructs session validity from the credential cookies.
///
/// Read-only except for the redirect on an invalid session, which is
/// idempotent, so overlapping checks are harmless.
pub struct SessionValidator {
    credentials: Credentials,
    navigator: Arc<dyn Navigator>,
    settings: SessionSettings,
}

impl SessionValidator {
    #[must_use]
    pub fn new(
        credentials: Credentials,
        navigator: Arc<dyn Navigator>,
        settings: SessionSettings,
    ) -> Self {
        Self {
            credentials,
            navigator,
            settings,
        }
    }

    #[must_use]
    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    /// Classify the session on `route` without side effects.
    #[must_use]
    pub fn assess(&self, route: &str) -> SessionState {
        let path = route_path(route);

        if self
            .settings
            .public_routes
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
        {
            return SessionState::Public;
        }

        if self.credentials.user().is_none() {
            return SessionState::Invalid;
        }

        if self.credentials.token().is_some() {
            return SessionState::Complete;
        }

        if self.credentials.temp_token().is_some() && path == self.settings.school_selection_route {
            return SessionState::PendingSchoolSelection;
        }

        SessionState::Invalid
    }

    /// Assess `route` and redirect to login (replacing history) when invalid.
    pub fn validate(&self, route: &str) -> SessionState {
        let state = self.assess(route);
        if state == SessionState::Invalid {
            tracing::info!(route = %route, "Session invalid; redirecting to login");
            self.navigator
                .navigate(Navigation::replace(self.settings.login_route.clone()));
        }
        state
    }
}

// Strip query string and fragment.
fn route_path(route: &str) -> &str {
    route
        .split(['?', '#'])
        .next()
        .unwrap_or(route)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{NavigationMode, PendingNavigation};
    use crate::credentials::{AuthCookie, CookieJarStore};

    struct Fixture {
        nav: Arc<PendingNavigation>,
        validator: SessionValidator,
    }

    impl Fixture {
        fn new() -> Self {
            let settings = SessionSettings::for_scheme("https");
            let nav = Arc::new(PendingNavigation::new());
            let creds = Credentials::new(
                Arc::new(CookieJarStore::new()),
                settings.cookie_options().clone(),
            );
            let validator = SessionValidator::new(creds, nav.clone(), settings);
            Self { nav, validator }
        }

        fn with(self, cookie: AuthCookie, value: &str) -> Self {
            self.validator.credentials.set(cookie, value);
            self
        }
    }

    #[test]
    fn public_routes_are_valid_without_cookies() {
        let f = Fixture::new();
        for route in ["/login", "/forgot-password", "/reset-password/abc123", "/login?next=/x"] {
            assert_eq!(f.validator.validate(route), SessionState::Public);
        }
        assert!(f.nav.peek().is_none());
    }

    #[test]
    fn user_and_token_is_complete() {
        let f = Fixture::new()
            .with(AuthCookie::User, r#"{"id":1}"#)
            .with(AuthCookie::Token, "tok");
        assert_eq!(f.validator.validate("/dashboard"), SessionState::Complete);
        assert!(f.nav.peek().is_none());
    }

    #[test]
    fn token_without_user_is_invalid() {
        let f = Fixture::new().with(AuthCookie::Token, "tok");
        assert_eq!(f.validator.validate("/dashboard"), SessionState::Invalid);

        let navigation = f.nav.peek().unwrap();
        assert_eq!(navigation.location, "/login");
        assert_eq!(navigation.mode, NavigationMode::Replace);
    }

    #[test]
    fn malformed_user_is_invalid() {
        let f = Fixture::new()
            .with(AuthCookie::User, "not-json")
            .with(AuthCookie::Token, "tok");
        assert_eq!(f.validator.assess("/dashboard"), SessionState::Invalid);
    }

    #[test]
    fn temp_token_only_valid_on_school_selection() {
        let f = Fixture::new()
            .with(AuthCookie::User, r#"{"id":1}"#)
            .with(AuthCookie::TempToken, "tmp");

        assert_eq!(
            f.validator.validate("/select-school"),
            SessionState::PendingSchoolSelection
        );
        assert!(f.nav.peek().is_none());

        assert_eq!(f.validator.validate("/dashboard"), SessionState::Invalid);
        assert_eq!(f.nav.peek().map(|n| n.location).as_deref(), Some("/login"));
    }

    #[test]
    fn school_selection_match_is_exact() {
        let f = Fixture::new()
            .with(AuthCookie::User, r#"{"id":1}"#)
            .with(AuthCookie::TempToken, "tmp");
        assert_eq!(
            f.validator.assess("/select-school/extra"),
            SessionState::Invalid
        );
        assert_eq!(
            f.validator.assess("/select-school?from=login"),
            SessionState::PendingSchoolSelection
        );
    }

    #[test]
    fn empty_jar_is_invalid() {
        let f = Fixture::new();
        assert!(!f.validator.validate("/").is_valid());
    }
}
