//! Session Model
//!
//! Authentication state for one interactive run. Only the engine mutates
//! it. The pending username exists only while awaiting the password and is
//! dropped on every transition out of that state.

use chrono::{DateTime, Utc};

use crate::config::LoginMode;

/// Where the login gate currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    /// Two-step login: waiting for a username
    AwaitingUsername,
    /// Two-step login: username captured, waiting for the password
    AwaitingPassword,
    /// Single-secret login: waiting for the passcode
    AwaitingPasscode,
    /// Logged in; input is dispatched as commands
    Authenticated,
}

impl AuthState {
    /// The state a fresh session starts in for `mode`
    pub fn initial(mode: LoginMode) -> Self {
        match mode {
            LoginMode::TwoStep => AuthState::AwaitingUsername,
            LoginMode::Passcode => AuthState::AwaitingPasscode,
        }
    }
}

/// Authentication-state holder
#[derive(Debug, Clone)]
pub struct Session {
    mode: LoginMode,
    state: AuthState,
    pending_username: Option<String>,
    /// Bumped on every login and every reset; tags async work to one login
    epoch: u64,
    authenticated_at: Option<DateTime<Utc>>,
}

impl Session {
    /// New unauthenticated session
    pub fn new(mode: LoginMode) -> Self {
        Self {
            mode,
            state: AuthState::initial(mode),
            pending_username: None,
            epoch: 0,
            authenticated_at: None,
        }
    }

    pub fn mode(&self) -> LoginMode {
        self.mode
    }

    pub fn state(&self) -> AuthState {
        self.state
    }

    pub fn pending_username(&self) -> Option<&str> {
        self.pending_username.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state == AuthState::Authenticated
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn authenticated_at(&self) -> Option<DateTime<Utc>> {
        self.authenticated_at
    }

    /// AwaitingUsername -> AwaitingPassword, remembering the username
    pub(crate) fn await_password(&mut self, username: String) {
        debug_assert_eq!(self.state, AuthState::AwaitingUsername);
        self.pending_username = Some(username);
        self.state = AuthState::AwaitingPassword;
    }

    /// Move the pending username out, leaving none behind
    pub(crate) fn take_pending_username(&mut self) -> Option<String> {
        self.pending_username.take()
    }

    /// Any state -> Authenticated
    pub(crate) fn authenticate(&mut self) {
        self.pending_username = None;
        self.state = AuthState::Authenticated;
        self.epoch += 1;
        self.authenticated_at = Some(Utc::now());
    }

    /// Failed credential check: back to the first prompt
    pub(crate) fn reject(&mut self) {
        self.pending_username = None;
        self.state = AuthState::initial(self.mode);
    }

    /// Logout/eject: back to the initial state
    pub(crate) fn reset(&mut self) {
        self.pending_username = None;
        self.state = AuthState::initial(self.mode);
        self.epoch += 1;
        self.authenticated_at = None;
    }
}
