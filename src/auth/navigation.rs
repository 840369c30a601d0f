use std::sync::{Mutex, PoisonError};

/// How the page leaves its current location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationMode {
    /// Full-page load that pushes a history entry.
    Assign,
    /// Full-page load that replaces the current history entry, so back
    /// navigation cannot return to a stale authenticated view.
    Replace,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub location: String,
    pub mode: NavigationMode,
}

impl Navigation {
    #[must_use]
    pub fn assign(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            mode: NavigationMode::Assign,
        }
    }

    #[must_use]
    pub fn replace(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            mode: NavigationMode::Replace,
        }
    }
}

/// Full-page navigation, never a client-side route transition.
pub trait Navigator: Send + Sync {
    fn navigate(&self, navigation: Navigation);
}

/// Navigator that records the first requested navigation for the host to
/// perform. Once a navigation is pending, later requests are ignored: the
/// page is already leaving.
#[derive(Debug, Default)]
pub struct PendingNavigation {
    pending: Mutex<Option<Navigation>>,
}

impl PendingNavigation {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn peek(&self) -> Option<Navigation> {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Hand the pending navigation to the host, resetting the recorder.
    pub fn take(&self) -> Option<Navigation> {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

impl Navigator for PendingNavigation {
    fn navigate(&self, navigation: Navigation) {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(current) = pending.as_ref() {
            tracing::trace!(
                pending = %current.location,
                requested = %navigation.location,
                "Navigation already pending"
            );
            return;
        }
        *pending = Some(navigation);
    }
}
