//! Process-wide session phase and its transition table.
//!
//! The phase is published through a `watch` channel; observers hold a
//! [`SessionWatcher`] and can read or await changes but never write.

use legallens_core::UserProfile;
use tokio::sync::watch;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionPhase {
    /// Startup check has not finished. Neither protected content nor the
    /// login prompt should be shown.
    Checking,
    Authenticated(UserProfile),
    Unauthenticated,
}

impl SessionPhase {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Checking => "checking",
            Self::Authenticated(_) => "authenticated",
            Self::Unauthenticated => "unauthenticated",
        }
    }

    pub fn user(&self) -> Option<&UserProfile> {
        match self {
            Self::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    pub fn is_checking(&self) -> bool {
        matches!(self, Self::Checking)
    }
}

#[derive(Debug, Clone)]
pub enum SessionEvent {
    NoCredentials,
    ProfileLoaded(UserProfile),
    ProfileCheckFailed,
    LoggedIn(UserProfile),
    LoggedOut,
    RenewalFailed,
}

impl SessionEvent {
    fn name(&self) -> &'static str {
        match self {
            Self::NoCredentials => "no_credentials",
            Self::ProfileLoaded(_) => "profile_loaded",
            Self::ProfileCheckFailed => "profile_check_failed",
            Self::LoggedIn(_) => "logged_in",
            Self::LoggedOut => "logged_out",
            Self::RenewalFailed => "renewal_failed",
        }
    }
}

/// Returns the phase `event` leads to from `current`, or `None` when the
/// event has no meaning in that phase.
pub fn next_phase(current: &SessionPhase, event: SessionEvent) -> Option<SessionPhase> {
    use SessionEvent as E;
    use SessionPhase::{Authenticated, Checking, Unauthenticated};

    match (current, event) {
        (Checking, E::ProfileLoaded(user)) => Some(Authenticated(user)),
        (Checking, E::NoCredentials | E::ProfileCheckFailed | E::RenewalFailed | E::LoggedOut) => {
            Some(Unauthenticated)
        }
        (_, E::LoggedIn(user)) => Some(Authenticated(user)),
        (Authenticated(_) | Unauthenticated, E::LoggedOut | E::RenewalFailed) => {
            Some(Unauthenticated)
        }
        _ => None,
    }
}

pub struct SessionState {
    tx: watch::Sender<SessionPhase>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionState {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(SessionPhase::Checking);
        Self { tx }
    }

    pub fn current(&self) -> SessionPhase {
        self.tx.borrow().clone()
    }

    pub fn watch(&self) -> SessionWatcher {
        SessionWatcher {
            rx: self.tx.subscribe(),
        }
    }

    /// Applies `event` and returns whether the phase actually changed.
    pub(crate) fn apply(&self, event: SessionEvent) -> bool {
        let event_name = event.name();
        self.tx.send_if_modified(|phase| match next_phase(phase, event) {
            Some(next) if next != *phase => {
                debug!(
                    from = phase.name(),
                    to = next.name(),
                    event = event_name,
                    "session transition"
                );
                *phase = next;
                true
            }
            Some(_) => false,
            None => {
                debug!(
                    phase = phase.name(),
                    event = event_name,
                    "session event ignored"
                );
                false
            }
        })
    }
}

/// Read-only view of the session phase.
#[derive(Clone)]
pub struct SessionWatcher {
    rx: watch::Receiver<SessionPhase>,
}

impl SessionWatcher {
    pub fn current(&self) -> SessionPhase {
        self.rx.borrow().clone()
    }

    /// Waits for the next phase change. Returns `None` once the session has
    /// been dropped.
    pub async fn changed(&mut self) -> Option<SessionPhase> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }

    /// Waits until the startup check has finished.
    pub async fn settled(&mut self) -> SessionPhase {
        let settled = self
            .rx
            .wait_for(|phase| !phase.is_checking())
            .await
            .map(|phase| (*phase).clone());
        settled.unwrap_or_else(|_| self.current())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> UserProfile {
        UserProfile {
            id: 7,
            email: "user@example.com".to_string(),
            created_at: None,
            last_login: None,
        }
    }

    #[test]
    fn startup_transitions() {
        let checking = SessionPhase::Checking;
        assert_eq!(
            next_phase(&checking, SessionEvent::ProfileLoaded(user())),
            Some(SessionPhase::Authenticated(user()))
        );
        for event in [
            SessionEvent::NoCredentials,
            SessionEvent::ProfileCheckFailed,
            SessionEvent::RenewalFailed,
        ] {
            assert_eq!(
                next_phase(&checking, event),
                Some(SessionPhase::Unauthenticated)
            );
        }
    }

    #[test]
    fn profile_events_only_apply_while_checking() {
        let authenticated = SessionPhase::Authenticated(user());
        assert_eq!(next_phase(&authenticated, SessionEvent::ProfileCheckFailed), None);
        assert_eq!(
            next_phase(&SessionPhase::Unauthenticated, SessionEvent::ProfileLoaded(user())),
            None
        );
        assert_eq!(
            next_phase(&SessionPhase::Unauthenticated, SessionEvent::NoCredentials),
            None
        );
    }

    #[test]
    fn logout_and_renewal_failure_end_session() {
        let authenticated = SessionPhase::Authenticated(user());
        assert_eq!(
            next_phase(&authenticated, SessionEvent::LoggedOut),
            Some(SessionPhase::Unauthenticated)
        );
        assert_eq!(
            next_phase(&authenticated, SessionEvent::RenewalFailed),
            Some(SessionPhase::Unauthenticated)
        );
        assert_eq!(
            next_phase(&SessionPhase::Unauthenticated, SessionEvent::LoggedIn(user())),
            Some(SessionPhase::Authenticated(user()))
        );
    }

    #[test]
    fn apply_reports_changes_once() {
        let state = SessionState::new();
        assert!(state.apply(SessionEvent::LoggedIn(user())));
        assert!(state.apply(SessionEvent::RenewalFailed));
        assert!(!state.apply(SessionEvent::RenewalFailed));
        assert!(!state.apply(SessionEvent::LoggedOut));
        assert_eq!(state.current(), SessionPhase::Unauthenticated);
    }

    #[tokio::test]
    async fn watchers_observe_transitions() {
        let state = SessionState::new();
        let mut watcher = state.watch();
        assert!(watcher.current().is_checking());

        state.apply(SessionEvent::ProfileLoaded(user()));
        let phase = watcher.changed().await.expect("phase change");
        assert_eq!(phase.user().map(|user| user.id), Some(7));
        assert_eq!(watcher.settled().await, SessionPhase::Authenticated(user()));
    }
}
