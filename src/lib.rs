#![doc = include_str!("../README.md")]

pub mod auth;
pub mod config;
pub mod credentials;
pub mod error;
pub mod filename;
pub mod proxy;
pub mod session;
pub mod types;

// Re-exports for convenient access
pub use auth::{
    AuthFailure, ErrorBody, GuardedClient, Navigation, Navigator, PendingNavigation,
    UnauthorizedHandler, is_unauthorized,
};
pub use config::{GatewayConfig, SessionSettings};
pub use credentials::{AuthCookie, CookieJarStore, CookieOptions, CookieStore, Credentials};
pub use error::Error;
pub use filename::{masterclass_filename, report_filename};
pub use proxy::{ProxyError, gateway_routes};
pub use session::{SessionState, SessionValidator, Visibility, WatchdogGuard, spawn_watchdog};
pub use types::{PermissionSet, School, SchoolId, SessionCredential, Token, UserId, UserRecord};
