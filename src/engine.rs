//! Session Engine
//!
//! Owns the session, transcript, command history and status board, and
//! turns input lines into transcript output. The engine never sleeps or
//! performs I/O beyond the injected [`SessionStore`]; anything that needs a
//! timer or the network is returned to the host as an [`Effect`].

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::commands::{self, Command};
use crate::config::{Config, LoginMode, PollPolicy};
use crate::credentials::Credentials;
use crate::error::{Error, Result};
use crate::feed::LineFeed;
use crate::history::CommandHistory;
use crate::persistence::SessionStore;
use crate::session::{AuthState, Session};
use crate::status::{StatusBoard, StatusError, StatusSnapshot};
use crate::transcript::Transcript;

pub const USERNAME_PROMPT: &str = "Enter username:";
pub const PASSWORD_PROMPT: &str = "Enter password:";
pub const PASSCODE_PROMPT: &str = "Enter passcode:";
pub const PASSWORD_MASK: &str = "> ********";
pub const ACCESS_GRANTED: &str = "Access granted.";
pub const HELP_HINT: &str = "Type `help` to get started.";
pub const LOGIN_FAILED: &str = "Invalid login.";
pub const PASSCODE_FAILED: &str = "Invalid passcode.";
pub const SESSION_RESTORED: &str = "Session restored.";
pub const STATUS_UNAVAILABLE: &str = "Status unavailable.";
pub const ALL_OPERATIONAL: &str = "All systems operational.";
pub const WARNINGS_DETECTED: &str = "SYSTEM WARNINGS DETECTED:";
pub const EJECT_NOTICE: &str = "Session ejected. Reloading...";

/// Work the host must schedule on the engine's behalf
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Fetch the status feed once and report back with [`FetchKind::Login`]
    RefreshStatus { epoch: u64 },
    /// Fetch on every `every` and report back with [`FetchKind::Poll`]
    StartPolling { epoch: u64, every: Duration },
    /// Abort any running poll loop
    StopPolling,
    /// Discard this engine and boot a fresh one after `after`
    Reload { after: Duration },
}

/// Why a status fetch was made
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchKind {
    /// The fetch that follows a login or restore; announces a health summary
    Login,
    /// A poll tick; updates the board silently
    Poll,
}

/// What to do when a timed feed job finishes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FeedCompletion {
    ShowLoginPrompt,
    RestoreSession,
    Nothing,
}

/// The interactive session state machine
pub struct SessionEngine {
    id: Uuid,
    config: Config,
    credentials: Credentials,
    store: Arc<dyn SessionStore>,
    session: Session,
    transcript: Transcript,
    feed: LineFeed<FeedCompletion>,
    history: CommandHistory,
    board: StatusBoard,
    reloading: bool,
}

impl SessionEngine {
    /// Build an engine from configuration and start the boot sequence.
    ///
    /// Fails only if the configured credential digests are malformed.
    pub fn new(config: Config, store: Arc<dyn SessionStore>) -> Result<Self> {
        let credentials = Credentials::from_config(&config.credentials)?;
        Ok(Self::with_credentials(config, credentials, store))
    }

    /// Build an engine with explicit credentials and start the boot sequence
    pub fn with_credentials(
        config: Config,
        credentials: Credentials,
        store: Arc<dyn SessionStore>,
    ) -> Self {
        let mut engine = Self {
            id: Uuid::new_v4(),
            session: Session::new(config.session.login_mode),
            transcript: Transcript::with_capacity_limit(config.transcript.max_lines),
            feed: LineFeed::new(),
            history: CommandHistory::new(),
            board: StatusBoard::new(),
            reloading: false,
            credentials,
            store,
            config,
        };
        engine.boot();
        engine
    }

    fn boot(&mut self) {
        let remembered = self.config.session.remember_session && self.store.load();
        let banner = self.config.branding.banner.clone();

        if remembered {
            info!(session = %self.id, "Restoring remembered session");
            self.session.authenticate();
            self.feed.enqueue(banner, FeedCompletion::RestoreSession);
        } else {
            info!(session = %self.id, "Booting ({:?} login)", self.session.mode());
            self.feed.enqueue(banner, FeedCompletion::ShowLoginPrompt);
        }
    }

    /// Submit one line of input.
    ///
    /// Rejected with [`Error::InputSuspended`] while the line feed is typing
    /// or a reload is pending.
    pub fn submit(&mut self, input: &str) -> Result<Vec<Effect>> {
        if self.is_input_suspended() {
            return Err(Error::InputSuspended);
        }

        let effects = match self.session.state() {
            AuthState::AwaitingUsername => {
                self.accept_username(input);
                Vec::new()
            }
            AuthState::AwaitingPassword => self.check_password(input),
            AuthState::AwaitingPasscode => self.check_passcode(input),
            AuthState::Authenticated => self.dispatch(input),
        };
        Ok(effects)
    }

    /// Advance the line feed by one line
    pub fn tick(&mut self) -> Vec<Effect> {
        match self.feed.tick(&mut self.transcript) {
            // Completion output belongs directly after the job that produced
            // it, ahead of anything queued behind
            Some(FeedCompletion::ShowLoginPrompt) => {
                let prompt = self.initial_prompt();
                self.feed.flush(&mut self.transcript, [prompt]);
                Vec::new()
            }
            Some(FeedCompletion::RestoreSession) => {
                self.feed
                    .flush(&mut self.transcript, [SESSION_RESTORED, HELP_HINT]);
                self.status_effects()
            }
            Some(FeedCompletion::Nothing) | None => Vec::new(),
        }
    }

    /// Apply the outcome of a status fetch made for `epoch`.
    ///
    /// Results for an older authentication are discarded.
    pub fn apply_status(
        &mut self,
        epoch: u64,
        kind: FetchKind,
        result: std::result::Result<StatusSnapshot, StatusError>,
    ) {
        if self.reloading || !self.session.is_authenticated() || epoch != self.session.epoch() {
            debug!(
                session = %self.id,
                "Discarding status result for epoch {} (current {})",
                epoch,
                self.session.epoch()
            );
            return;
        }

        let announce = kind == FetchKind::Login && result.is_ok();
        self.board.record(result);

        if announce {
            let summary = self.health_summary();
            self.emit(summary);
        }
    }

    fn accept_username(&mut self, input: &str) {
        self.session.await_password(input.to_string());
        let echo = commands::echo_line(input);
        self.emit([echo.as_str(), PASSWORD_PROMPT]);
    }

    fn check_password(&mut self, input: &str) -> Vec<Effect> {
        self.emit([PASSWORD_MASK]);
        let username = self.session.take_pending_username().unwrap_or_default();

        if self.credentials.verify_pair(&username, input) {
            self.grant_access()
        } else {
            warn!(session = %self.id, "Login rejected");
            self.session.reject();
            self.emit([LOGIN_FAILED, "", USERNAME_PROMPT]);
            Vec::new()
        }
    }

    fn check_passcode(&mut self, input: &str) -> Vec<Effect> {
        self.emit([PASSWORD_MASK]);

        if self.credentials.verify_passcode(input) {
            self.grant_access()
        } else {
            warn!(session = %self.id, "Passcode rejected");
            self.session.reject();
            self.emit([PASSCODE_FAILED, "", PASSCODE_PROMPT]);
            Vec::new()
        }
    }

    fn grant_access(&mut self) -> Vec<Effect> {
        self.session.authenticate();
        self.history.clear();
        info!(session = %self.id, epoch = self.session.epoch(), "Access granted");

        if self.config.session.remember_session {
            if let Err(e) = self.store.save() {
                warn!(session = %self.id, "Failed to remember session: {}", e);
            }
        }

        self.emit(["", ACCESS_GRANTED, HELP_HINT]);
        self.status_effects()
    }

    fn status_effects(&self) -> Vec<Effect> {
        let epoch = self.session.epoch();
        let mut effects = vec![Effect::RefreshStatus { epoch }];
        if self.config.status.poll == PollPolicy::Continuous {
            effects.push(Effect::StartPolling {
                epoch,
                every: self.config.status.poll_interval(),
            });
        }
        effects
    }

    fn dispatch(&mut self, input: &str) -> Vec<Effect> {
        let cmd = commands::normalize(input);
        if cmd.is_empty() {
            return Vec::new();
        }

        self.history.record(cmd.as_str());
        let command = Command::parse(&cmd);
        debug!(session = %self.id, "Dispatching {:?}", command);

        if command.echoes() {
            let echo = commands::echo_line(&cmd);
            self.emit([echo]);
        }

        match command {
            Command::Help => self.emit(commands::help_lines()),
            Command::Status => {
                let lines = match self.board.snapshot() {
                    Some(snapshot) => {
                        let mut lines = vec![String::new()];
                        lines.extend(snapshot.display_lines());
                        lines
                    }
                    None => vec![STATUS_UNAVAILABLE.to_string()],
                };
                self.emit(lines);
            }
            Command::Version => {
                let line = commands::version_line(&self.config.branding);
                self.emit([line]);
            }
            Command::Credits => {
                let lines = commands::credits_lines(&self.config.branding);
                self.emit(lines);
            }
            Command::Clear => self.transcript.clear(),
            Command::History => {
                let entries = self.history.entries().to_vec();
                self.emit(entries);
            }
            Command::Whoami => {
                let line = self.config.branding.whoami.clone();
                self.emit([line]);
            }
            Command::Logout => return self.logout(),
            Command::Eject => return self.eject(),
            Command::Unknown(other) => self.emit([commands::unknown_line(&other)]),
        }

        Vec::new()
    }

    fn logout(&mut self) -> Vec<Effect> {
        info!(session = %self.id, "Logout");
        self.end_session();

        let mut lines = self.config.branding.banner.clone();
        lines.push(String::new());
        lines.push(self.initial_prompt().to_string());
        self.transcript.replace(lines);

        vec![Effect::StopPolling]
    }

    fn eject(&mut self) -> Vec<Effect> {
        info!(session = %self.id, "Eject requested, reload scheduled");
        self.end_session();
        self.reloading = true;
        self.transcript.replace([EJECT_NOTICE]);

        vec![
            Effect::StopPolling,
            Effect::Reload {
                after: self.config.feed.reload_delay(),
            },
        ]
    }

    fn end_session(&mut self) {
        if let Err(e) = self.store.clear() {
            warn!(session = %self.id, "Failed to clear remembered session: {}", e);
        }
        self.feed.cancel();
        self.session.reset();
        self.history.clear();
        self.board.clear();
    }

    fn health_summary(&self) -> Vec<String> {
        let mut lines = vec![String::new()];
        let Some(snapshot) = self.board.snapshot() else {
            return lines;
        };

        if snapshot.has_warnings() {
            lines.push(WARNINGS_DETECTED.to_string());
            lines.extend(snapshot.warnings().map(|c| c.display_line()));
        } else {
            lines.push(ALL_OPERATIONAL.to_string());
        }
        lines
    }

    /// Append immediately, or queue behind a running feed job so output
    /// never interleaves with typed lines
    fn emit<I, S>(&mut self, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if self.feed.is_busy() {
            self.feed.enqueue(lines, FeedCompletion::Nothing);
        } else {
            self.feed.flush(&mut self.transcript, lines);
        }
    }

    fn initial_prompt(&self) -> &'static str {
        match self.session.mode() {
            LoginMode::TwoStep => USERNAME_PROMPT,
            LoginMode::Passcode => PASSCODE_PROMPT,
        }
    }

    /// Whether `submit` would currently be rejected
    pub fn is_input_suspended(&self) -> bool {
        self.reloading || self.feed.is_busy()
    }

    /// Whether the line feed has lines left to type
    pub fn is_typing(&self) -> bool {
        self.feed.is_busy()
    }

    /// Whether an eject/reboot is waiting for the host to reload
    pub fn is_reloading(&self) -> bool {
        self.reloading
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn state(&self) -> AuthState {
        self.session.state()
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn history(&self) -> &CommandHistory {
        &self.history
    }

    pub fn status_board(&self) -> &StatusBoard {
        &self.board
    }

    /// Type out everything queued on the feed, collecting effects.
    ///
    /// Useful for tests and non-interactive runs.
    pub fn run_feed_to_idle(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        while self.feed.is_busy() {
            effects.extend(self.tick());
        }
        effects
    }
}

impl std::fmt::Debug for SessionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionEngine")
            .field("id", &self.id)
            .field("state", &self.session.state())
            .field("epoch", &self.session.epoch())
            .field("transcript_lines", &self.transcript.len())
            .field("typing", &self.feed.is_busy())
            .field("reloading", &self.reloading)
            .finish()
    }
}
