use std::sync::Arc;

use axum_extra::extract::cookie::{Cookie, SameSite};
use serde::Serialize;
use serde::de::DeserializeOwned;
use time::Duration;

use super::names::AuthCookie;
use crate::error::Error;
use crate::types::{PermissionSet, School, SessionCredential, Token, UserRecord};

/// Injectable key/value cookie backend.
///
/// Writers only ever replace whole entries, so implementations need no
/// read-modify-write coordination beyond interior mutability.
pub trait CookieStore: Send + Sync {
    /// Current value of `name`, or `None` if absent or expired.
    fn get(&self, name: &str) -> Option<String>;

    /// Store (or replace) a fully built cookie.
    fn set(&self, cookie: Cookie<'static>);

    /// Remove `name` at `path`. Removing an absent cookie is a no-op.
    fn remove(&self, name: &str, path: &str);
}

/// Attributes applied to every credential write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieOptions {
    pub max_age: Duration,
    pub path: String,
    pub secure: bool,
    pub same_site: SameSite,
}

impl CookieOptions {
    /// Secure defaults: 7 days, `Path=/`, `SameSite=Strict`.
    #[must_use]
    pub fn new(secure: bool) -> Self {
        Self {
            max_age: Duration::days(7),
            path: "/".into(),
            secure,
            same_site: SameSite::Strict,
        }
    }

    /// Defaults with `Secure` tied to the transport scheme.
    #[must_use]
    pub fn for_scheme(scheme: &str) -> Self {
        Self::new(scheme.eq_ignore_ascii_case("https"))
    }

    #[must_use]
    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = max_age;
        self
    }

    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    #[must_use]
    pub fn with_same_site(mut self, same_site: SameSite) -> Self {
        self.same_site = same_site;
        self
    }

    fn build(&self, name: &str, value: String) -> Cookie<'static> {
        Cookie::build((name.to_string(), value))
            .secure(self.secure)
            .same_site(self.same_site)
            .path(self.path.clone())
            .max_age(self.max_age)
            .build()
    }
}

/// Typed accessor over a [`CookieStore`].
#[derive(Clone)]
pub struct Credentials {
    store: Arc<dyn CookieStore>,
    defaults: CookieOptions,
}

impl Credentials {
    #[must_use]
    pub fn new(store: Arc<dyn CookieStore>, defaults: CookieOptions) -> Self {
        Self { store, defaults }
    }

    #[must_use]
    pub fn defaults(&self) -> &CookieOptions {
        &self.defaults
    }

    /// Write `name` with the default attributes.
    pub fn set(&self, name: impl AsRef<str>, value: impl Into<String>) {
        self.set_with(name, value, &self.defaults);
    }

    /// Write `name` with explicit attributes.
    pub fn set_with(&self, name: impl AsRef<str>, value: impl Into<String>, opts: &CookieOptions) {
        self.store.set(opts.build(name.as_ref(), value.into()));
    }

    /// JSON-encode `value` and write it under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] if `value` cannot be serialized.
    pub fn set_json<T: Serialize + ?Sized>(
        &self,
        name: impl AsRef<str>,
        value: &T,
    ) -> Result<(), Error> {
        let encoded = serde_json::to_string(value)?;
        self.set(name, encoded);
        Ok(())
    }

    #[must_use]
    pub fn get(&self, name: impl AsRef<str>) -> Option<String> {
        self.store.get(name.as_ref())
    }

    /// Decode a JSON cookie. Malformed payloads read as absent: a corrupt
    /// cookie and a missing one both mean "unauthenticated".
    #[must_use]
    pub fn get_json<T: DeserializeOwned>(&self, name: impl AsRef<str>) -> Option<T> {
        let name = name.as_ref();
        let raw = self.store.get(name)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::debug!(cookie = name, error = %e, "Discarding malformed JSON cookie");
                None
            }
        }
    }

    pub fn remove(&self, name: impl AsRef<str>) {
        self.store.remove(name.as_ref(), &self.defaults.path);
    }

    /// Remove every known auth cookie. Idempotent.
    pub fn clear_all(&self) {
        for cookie in AuthCookie::ALL {
            self.remove(cookie);
        }
    }

    #[must_use]
    pub fn user(&self) -> Option<UserRecord> {
        self.get_json(AuthCookie::User)
    }

    #[must_use]
    pub fn token(&self) -> Option<Token> {
        self.opaque(AuthCookie::Token)
    }

    #[must_use]
    pub fn temp_token(&self) -> Option<Token> {
        self.opaque(AuthCookie::TempToken)
    }

    #[must_use]
    pub fn selected_school(&self) -> Option<School> {
        self.get_json(AuthCookie::SelectedSchool)
    }

    #[must_use]
    pub fn login_schools(&self) -> Option<Vec<School>> {
        self.get_json(AuthCookie::LoginSchools)
    }

    #[must_use]
    pub fn permissions(&self) -> Option<PermissionSet> {
        self.get_json(AuthCookie::Permissions)
    }

    /// Reassemble the session from its independently-keyed entries.
    #[must_use]
    pub fn session(&self) -> SessionCredential {
        SessionCredential {
            user: self.user(),
            token: self.token(),
            temp_token: self.temp_token(),
            selected_school: self.selected_school(),
            permissions: self.permissions(),
        }
    }

    // Empty strings count as absent.
    fn opaque(&self, cookie: AuthCookie) -> Option<Token> {
        self.get(cookie).filter(|v| !v.is_empty()).map(Token)
    }
}
