//! Browser-persisted credential state.
//!
//! The session is not one object: each field lives in its own cookie with its
//! own lifecycle. [`Credentials`] is the typed accessor; the backend is any
//! [`CookieStore`], so tests and hosts can inject their own.

mod jar;
mod names;
mod store;

pub use jar::CookieJarStore;
pub use names::AuthCookie;
pub use store::{CookieOptions, CookieStore, Credentials};

/// Re-export for callers building [`CookieOptions`] by hand.
pub use axum_extra::extract::cookie::SameSite;
