use std::net::SocketAddr;
use std::time::Duration;

use url::Url;

use crate::credentials::CookieOptions;
use crate::error::Error;

/// Forwarding proxy configuration.
///
/// The upstream base URL is the only required value and is a constructor
/// parameter. Everything else has a default and a `with_*` override.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct GatewayConfig {
    pub(crate) upstream: Url,
    pub(crate) listen_addr: SocketAddr,
    pub(crate) upstream_timeout: Duration,
    pub(crate) allowed_origin: String,
    pub(crate) mount_path: String,
}

impl GatewayConfig {
    #[must_use]
    pub fn new(upstream: Url) -> Self {
        Self {
            upstream,
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            upstream_timeout: Duration::from_secs(30),
            allowed_origin: "*".into(),
            mount_path: "/api".into(),
        }
    }

    /// Create config from environment variables.
    ///
    /// # Required env vars
    /// - `PORTAL_UPSTREAM_URL`: base URL of the upstream REST API
    ///
    /// # Optional env vars
    /// - `PORTAL_LISTEN_ADDR`: socket address to bind (default `0.0.0.0:8080`)
    /// - `PORTAL_UPSTREAM_TIMEOUT_SECS`: upstream relay timeout (default 30)
    /// - `PORTAL_ALLOWED_ORIGIN`: `Access-Control-Allow-Origin` value (default `*`)
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the required var is missing or any value is invalid.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let upstream: Url = lookup("PORTAL_UPSTREAM_URL")
            .ok_or_else(|| Error::Config("PORTAL_UPSTREAM_URL is required".into()))?
            .parse()
            .map_err(|e| Error::Config(format!("PORTAL_UPSTREAM_URL: {e}")))?;

        let mut config = Self::new(upstream);

        if let Some(addr) = lookup("PORTAL_LISTEN_ADDR") {
            let addr: SocketAddr = addr
                .parse()
                .map_err(|e| Error::Config(format!("PORTAL_LISTEN_ADDR: {e}")))?;
            config = config.with_listen_addr(addr);
        }
        if let Some(secs) = lookup("PORTAL_UPSTREAM_TIMEOUT_SECS") {
            let secs: u64 = secs
                .parse()
                .map_err(|e| Error::Config(format!("PORTAL_UPSTREAM_TIMEOUT_SECS: {e}")))?;
            config = config.with_upstream_timeout(Duration::from_secs(secs));
        }
        if let Some(origin) = lookup("PORTAL_ALLOWED_ORIGIN") {
            config = config.with_allowed_origin(origin);
        }

        Ok(config)
    }

    #[must_use]
    pub fn with_listen_addr(mut self, addr: SocketAddr) -> Self {
        self.listen_addr = addr;
        self
    }

    #[must_use]
    pub fn with_upstream_timeout(mut self, timeout: Duration) -> Self {
        self.upstream_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_allowed_origin(mut self, origin: impl Into<String>) -> Self {
        self.allowed_origin = origin.into();
        self
    }

    /// Path prefix the proxy families are mounted under (default `/api`).
    #[must_use]
    pub fn with_mount_path(mut self, path: impl Into<String>) -> Self {
        self.mount_path = path.into();
        self
    }

    #[must_use]
    pub fn upstream(&self) -> &Url {
        &self.upstream
    }

    #[must_use]
    pub fn listen_addr(&self) -> SocketAddr {
        self.listen_addr
    }

    #[must_use]
    pub fn upstream_timeout(&self) -> Duration {
        self.upstream_timeout
    }

    #[must_use]
    pub fn allowed_origin(&self) -> &str {
        &self.allowed_origin
    }

    #[must_use]
    pub fn mount_path(&self) -> &str {
        &self.mount_path
    }
}

/// Browser-side session settings shared by the handler and the validator.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct SessionSettings {
    pub(crate) login_route: String,
    pub(crate) public_routes: Vec<String>,
    pub(crate) school_selection_route: String,
    pub(crate) validation_interval: Duration,
    pub(crate) cookie: CookieOptions,
}

impl SessionSettings {
    /// Defaults with `Secure` cookies tied to the page's scheme.
    #[must_use]
    pub fn for_scheme(scheme: &str) -> Self {
        Self {
            login_route: "/login".into(),
            public_routes: vec![
                "/login".into(),
                "/forgot-password".into(),
                "/reset-password".into(),
            ],
            school_selection_route: "/select-school".into(),
            validation_interval: Duration::from_secs(30),
            cookie: CookieOptions::for_scheme(scheme),
        }
    }

    #[must_use]
    pub fn with_login_route(mut self, route: impl Into<String>) -> Self {
        self.login_route = route.into();
        self
    }

    #[must_use]
    pub fn with_public_routes(mut self, routes: Vec<String>) -> Self {
        self.public_routes = routes;
        self
    }

    #[must_use]
    pub fn with_school_selection_route(mut self, route: impl Into<String>) -> Self {
        self.school_selection_route = route.into();
        self
    }

    #[must_use]
    pub fn with_validation_interval(mut self, interval: Duration) -> Self {
        self.validation_interval = interval;
        self
    }

    #[must_use]
    pub fn with_cookie_options(mut self, cookie: CookieOptions) -> Self {
        self.cookie = cookie;
        self
    }

    #[must_use]
    pub fn login_route(&self) -> &str {
        &self.login_route
    }

    #[must_use]
    pub fn public_routes(&self) -> &[String] {
        &self.public_routes
    }

    #[must_use]
    pub fn school_selection_route(&self) -> &str {
        &self.school_selection_route
    }

    #[must_use]
    pub fn validation_interval(&self) -> Duration {
        self.validation_interval
    }

    #[must_use]
    pub fn cookie_options(&self) -> &CookieOptions {
        &self.cookie
    }
}
