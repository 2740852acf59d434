//! Shared credential state for password-authenticated clients.
//!
//! Two locks guard a session. `login` serializes login attempts and is held across the login
//! round-trip; `state` guards the ticket fields and is only held long enough to copy or
//! replace them. Requests never wait on each other, only on a login in progress.

use crate::auth::Ticket;
use std::sync::{PoisonError, RwLock, RwLockReadGuard};
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, MutexGuard};

/// Ticket material held between requests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    /// Authentication ticket
    pub ticket: String,
    /// Anti-forgery token for state-changing requests
    pub csrf_token: String,
    /// `PVEAuthCookie` value, when the login response set one
    pub cookie: Option<String>,
    /// When the ticket was obtained
    pub last_login: Option<Instant>,
}

impl SessionState {
    /// True when a ticket is held and younger than `expiry`.
    #[must_use]
    pub fn is_valid(&self, expiry: Duration) -> bool {
        !self.ticket.is_empty() && self.last_login.is_some_and(|at| at.elapsed() < expiry)
    }

    /// Value for the `PVEAuthCookie` cookie: the issued cookie, else the raw ticket.
    #[must_use]
    pub fn cookie_value(&self) -> Option<&str> {
        self.cookie
            .as_deref()
            .or_else(|| (!self.ticket.is_empty()).then_some(self.ticket.as_str()))
    }

    /// The CSRF token, if one is held.
    #[must_use]
    pub fn csrf_token(&self) -> Option<&str> {
        (!self.csrf_token.is_empty()).then_some(self.csrf_token.as_str())
    }
}

#[derive(Debug)]
pub(crate) struct Session {
    login: Mutex<()>,
    state: RwLock<SessionState>,
    expiry: Duration,
}

impl Session {
    pub(crate) fn new(expiry: Duration) -> Self {
        Self {
            login: Mutex::new(()),
            state: RwLock::new(SessionState::default()),
            expiry,
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, SessionState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn is_valid(&self) -> bool {
        self.read().is_valid(self.expiry)
    }

    pub(crate) fn snapshot(&self) -> SessionState {
        self.read().clone()
    }

    /// Wait for exclusive permission to log in.
    pub(crate) async fn lock_login(&self) -> MutexGuard<'_, ()> {
        self.login.lock().await
    }

    pub(crate) fn store(&self, ticket: Ticket) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.ticket = ticket.ticket;
        state.csrf_token = ticket.csrf_token;
        state.cookie = ticket.cookie;
        state.last_login = Some(Instant::now());
    }

    #[cfg(test)]
    pub(crate) fn backdate(&self, by: Duration) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.last_login = state.last_login.and_then(|at| at.checked_sub(by));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticket() -> Ticket {
        Ticket {
            ticket: "PVE:root@pam:ABC".into(),
            csrf_token: "65F0:tok".into(),
            cookie: None,
        }
    }

    #[test]
    fn empty_state_is_invalid() {
        let session = Session::new(Duration::from_secs(3600));
        assert!(!session.is_valid());
        assert_eq!(session.snapshot(), SessionState::default());
    }

    #[test]
    fn stored_ticket_is_valid_until_expiry() {
        let session = Session::new(Duration::from_secs(3600));
        session.store(ticket());
        assert!(session.is_valid());

        session.backdate(Duration::from_secs(3600));
        assert!(!session.is_valid());
    }

    #[test]
    fn empty_ticket_is_invalid() {
        let state = SessionState {
            last_login: Some(Instant::now()),
            ..SessionState::default()
        };
        assert!(!state.is_valid(Duration::from_secs(3600)));
    }

    #[test]
    fn cookie_falls_back_to_ticket() {
        let mut state = SessionState::default();
        assert_eq!(state.cookie_value(), None);

        state.ticket = "PVE:root@pam:ABC".into();
        assert_eq!(state.cookie_value(), Some("PVE:root@pam:ABC"));

        state.cookie = Some("PVE%3Aroot%40pam%3AABC".into());
        assert_eq!(state.cookie_value(), Some("PVE%3Aroot%40pam%3AABC"));
    }

    #[test]
    fn csrf_token_absent_when_empty() {
        let mut state = SessionState::default();
        assert_eq!(state.csrf_token(), None);
        state.csrf_token = "65F0:tok".into();
        assert_eq!(state.csrf_token(), Some("65F0:tok"));
    }
}
