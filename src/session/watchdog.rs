use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use super::validator::SessionValidator;

/// Page visibility as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Visible,
    Hidden,
}

/// Owns the running watchdog. Dropping it releases the interval timer and
/// the visibility subscription together.
#[must_use = "dropping the guard stops the watchdog"]
#[derive(Debug)]
pub struct WatchdogGuard {
    task: JoinHandle<()>,
}

impl WatchdogGuard {
    /// Stop the watchdog now.
    pub fn stop(self) {}

    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for WatchdogGuard {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Start revalidating the session on `route`.
///
/// Validation runs once immediately, then every
/// [`validation_interval`](crate::SessionSettings::validation_interval),
/// whenever `route` changes, and whenever `visibility` goes from hidden to
/// visible. All triggers feed one task, so checks never overlap.
pub fn spawn_watchdog(
    validator: Arc<SessionValidator>,
    route: watch::Receiver<String>,
    visibility: watch::Receiver<Visibility>,
) -> WatchdogGuard {
    WatchdogGuard {
        task: tokio::spawn(run(validator, route, visibility)),
    }
}

async fn run(
    validator: Arc<SessionValidator>,
    mut route: watch::Receiver<String>,
    mut visibility: watch::Receiver<Visibility>,
) {
    // interval() panics on a zero period
    let period = validator
        .settings()
        .validation_interval()
        .max(Duration::from_millis(1));
    let mut ticker = time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut last_visibility = *visibility.borrow_and_update();
    let mut following_route = true;
    let mut following_visibility = true;

    loop {
        let trigger = tokio::select! {
            _ = ticker.tick() => "interval",
            changed = route.changed(), if following_route => {
                if changed.is_err() {
                    tracing::debug!("Route source closed; keeping the last known route");
                    following_route = false;
                    continue;
                }
                "route"
            }
            changed = visibility.changed(), if following_visibility => {
                if changed.is_err() {
                    tracing::debug!("Visibility source closed; continuing on interval only");
                    following_visibility = false;
                    continue;
                }
                let now = *visibility.borrow_and_update();
                let resumed = last_visibility == Visibility::Hidden && now == Visibility::Visible;
                last_visibility = now;
                if !resumed {
                    continue;
                }
                "visible"
            }
        };

        let current = route.borrow_and_update().clone();
        let state = validator.validate(&current);
        tracing::trace!(trigger, route = %current, ?state, "Session revalidated");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{NavigationMode, PendingNavigation};
    use crate::config::SessionSettings;
    use crate::credentials::{AuthCookie, CookieJarStore, Credentials};

    struct Harness {
        nav: Arc<PendingNavigation>,
        creds: Credentials,
        route_tx: watch::Sender<String>,
        visibility_tx: watch::Sender<Visibility>,
        guard: WatchdogGuard,
    }

    fn start(signed_in: bool) -> Harness {
        start_on("/dashboard", signed_in)
    }

    fn start_on(initial_route: &str, signed_in: bool) -> Harness {
        let settings = SessionSettings::for_scheme("https");
        let nav = Arc::new(PendingNavigation::new());
        let creds = Credentials::new(
            Arc::new(CookieJarStore::new()),
            settings.cookie_options().clone(),
        );
        if signed_in {
            creds.set(AuthCookie::User, r#"{"id":1}"#);
            creds.set(AuthCookie::Token, "tok");
        }
        let validator = Arc::new(SessionValidator::new(creds.clone(), nav.clone(), settings));
        let (route_tx, route_rx) = watch::channel(initial_route.to_string());
        let (visibility_tx, visibility_rx) = watch::channel(Visibility::Visible);
        let guard = spawn_watchdog(validator, route_rx, visibility_rx);
        Harness {
            nav,
            creds,
            route_tx,
            visibility_tx,
            guard,
        }
    }

    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn validates_immediately_on_activation() {
        let h = start(false);
        settle().await;

        let navigation = h.nav.peek().expect("redirect on first tick");
        assert_eq!(navigation.location, "/login");
        assert_eq!(navigation.mode, NavigationMode::Replace);
        assert!(h.guard.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn revalidates_on_interval() {
        let h = start(true);
        settle().await;
        assert!(h.nav.peek().is_none());

        h.creds.remove(AuthCookie::Token);
        time::advance(Duration::from_secs(29)).await;
        settle().await;
        assert!(h.nav.peek().is_none());

        time::advance(Duration::from_secs(1)).await;
        settle().await;
        assert!(h.nav.peek().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn revalidates_when_page_becomes_visible() {
        let h = start(true);
        settle().await;

        h.creds.clear_all();
        h.visibility_tx.send(Visibility::Hidden).unwrap();
        settle().await;
        assert!(h.nav.peek().is_none(), "hiding the page is not a trigger");

        h.visibility_tx.send(Visibility::Visible).unwrap();
        settle().await;
        assert_eq!(h.nav.peek().map(|n| n.location).as_deref(), Some("/login"));
    }

    #[tokio::test(start_paused = true)]
    async fn uses_current_route() {
        let h = start(false);
        h.route_tx.send("/forgot-password".to_string()).unwrap();
        settle().await;
        assert!(h.nav.peek().is_none());

        h.route_tx.send("/leads".to_string()).unwrap();
        time::advance(Duration::from_secs(30)).await;
        settle().await;
        assert!(h.nav.peek().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn revalidates_when_route_changes() {
        let h = start_on("/select-school", false);
        h.creds.set(AuthCookie::User, r#"{"id":1}"#);
        h.creds.set(AuthCookie::TempToken, "pending");
        settle().await;
        assert!(h.nav.peek().is_none(), "temp token is enough on school selection");

        h.route_tx.send("/dashboard".to_string()).unwrap();
        time::advance(Duration::from_secs(5)).await;
        settle().await;

        let navigation = h.nav.peek().expect("leaving school selection redirects");
        assert_eq!(navigation.location, "/login");
        assert_eq!(navigation.mode, NavigationMode::Replace);
    }

    #[tokio::test(start_paused = true)]
    async fn closed_route_source_keeps_interval() {
        let h = start(true);
        settle().await;

        let Harness {
            nav,
            creds,
            route_tx,
            visibility_tx: _visibility_tx,
            guard: _guard,
        } = h;
        drop(route_tx);
        settle().await;
        assert!(nav.peek().is_none());

        creds.remove(AuthCookie::Token);
        time::advance(Duration::from_secs(30)).await;
        settle().await;
        assert!(nav.peek().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_guard_stops_all_triggers() {
        let h = start(true);
        settle().await;

        let Harness {
            nav,
            creds,
            visibility_tx,
            guard,
            ..
        } = h;
        drop(guard);
        settle().await;

        creds.clear_all();
        let _ = visibility_tx.send(Visibility::Hidden);
        let _ = visibility_tx.send(Visibility::Visible);
        time::advance(Duration::from_secs(90)).await;
        settle().await;
        assert!(nav.peek().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn closed_visibility_source_keeps_interval() {
        let h = start(true);
        settle().await;

        let Harness {
            nav,
            creds,
            visibility_tx,
            route_tx: _route_tx,
            guard: _guard,
        } = h;
        drop(visibility_tx);
        settle().await;

        creds.remove(AuthCookie::User);
        time::advance(Duration::from_secs(30)).await;
        settle().await;
        assert!(nav.peek().is_some());
    }
}
