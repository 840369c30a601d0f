use std::sync::{Mutex, MutexGuard, PoisonError};

use axum::http::HeaderMap;
use axum_extra::extract::cookie::{Cookie, CookieJar};
use time::Duration;

use super::store::CookieStore;

/// [`CookieStore`] over an axum-extra [`CookieJar`].
///
/// Seed it from inbound `Cookie` headers with [`from_headers`](Self::from_headers)
/// and hand the jar back to axum with [`into_jar`](Self::into_jar) to emit the
/// pending `Set-Cookie` delta. Starts empty in tests.
#[derive(Debug, Default)]
pub struct CookieJarStore {
    jar: Mutex<CookieJar>,
}

impl CookieJarStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            jar: Mutex::new(CookieJar::from_headers(headers)),
        }
    }

    /// The stored cookie with all of its attributes.
    #[must_use]
    pub fn cookie(&self, name: &str) -> Option<Cookie<'static>> {
        self.lock()
            .get(name)
            .filter(|c| !is_expired(c))
            .map(|c| c.clone().into_owned())
    }

    /// Consume the store, returning the jar with its pending delta.
    #[must_use]
    pub fn into_jar(self) -> CookieJar {
        self.jar.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock(&self) -> MutexGuard<'_, CookieJar> {
        self.jar.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn replace(&self, update: impl FnOnce(CookieJar) -> CookieJar) {
        let mut guard = self.lock();
        let jar = std::mem::take(&mut *guard);
        *guard = update(jar);
    }
}

impl CookieStore for CookieJarStore {
    fn get(&self, name: &str) -> Option<String> {
        self.cookie(name).map(|c| c.value().to_owned())
    }

    fn set(&self, cookie: Cookie<'static>) {
        self.replace(|jar| jar.add(cookie));
    }

    fn remove(&self, name: &str, path: &str) {
        let removal = Cookie::build((name.to_string(), ""))
            .path(path.to_string())
            .build();
        self.replace(|jar| jar.remove(removal));
    }
}

fn is_expired(cookie: &Cookie<'_>) -> bool {
    cookie.max_age().is_some_and(|age| age <= Duration::ZERO)
}
