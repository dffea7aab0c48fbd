//! OmegaTerm - a scripted terminal session engine
//!
//! OmegaTerm drives an interactive text session: a typed boot banner, a
//! login gate (username + password, or a single passcode), a small table of
//! commands, and a live component-health feed fetched from a status page.
//!
//! ## Module Organization
//!
//! ### Core
//!
//! - [`engine`] - The session state machine and command dispatch
//! - [`session`] - Authentication state
//! - [`feed`] - Paced ("typed") output scheduling
//! - [`transcript`] - The display line buffer
//! - [`commands`] - Command table and static responses
//! - [`history`] - Accepted-command history
//!
//! ### Collaborators
//!
//! - [`status`] - Status feed model and HTTP provider
//! - [`persistence`] - Remembered-session storage
//! - [`credentials`] - Salted digest verification
//! - [`config`] - Configuration files and defaults
//! - [`mod@error`] - Error types and Result aliases
//!
//! ### Host
//!
//! - [`app`] - The tokio event loop that drives an engine against stdin/stdout
//!
//! ## Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use omegaterm::{Config, MemorySessionStore, SessionEngine};
//!
//! let store = Arc::new(MemorySessionStore::new());
//! let mut engine = SessionEngine::new(Config::default(), store).unwrap();
//! engine.run_feed_to_idle();
//! assert_eq!(engine.transcript().last(), Some("Enter username:"));
//! ```
//!
//! ## Architecture
//!
//! The engine is synchronous and owns no timers. It returns [`Effect`]s
//! (fetch status, start/stop polling, reload) and the host in [`app`] turns
//! them into tokio tasks and sleeps. Fetch results flow back through an
//! `mpsc` channel and are applied on the host's single task, so the engine is
//! only ever mutated from one place.

pub mod app;
pub mod commands;
pub mod config;
pub mod credentials;
pub mod engine;
pub mod error;
pub mod feed;
pub mod history;
pub mod persistence;
pub mod session;
pub mod status;
pub mod transcript;

// Re-exports for core functionality
pub use config::loader::ConfigLoader;
pub use config::{Config, LoginMode, PollPolicy};
pub use credentials::{Credentials, SecretDigest};
pub use engine::{Effect, FetchKind, SessionEngine};
pub use error::{Error, Result};
pub use persistence::{FileSessionStore, MemorySessionStore, SessionStore};
pub use session::{AuthState, Session};
pub use status::{ComponentStatus, HttpStatusProvider, StatusProvider, StatusSnapshot};
pub use transcript::Transcript;

/// The current version of OmegaTerm from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The application name from Cargo.toml
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// The application description from Cargo.toml
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Render a startup error with a short remediation hint
pub fn handle_startup_error(error: &Error) -> String {
    match error {
        Error::ConfigLoadFailed { path, reason } => {
            format!(
                "Configuration Error: Failed to load config from '{}': {}\n\nTry:\n• Check configuration file syntax\n• Ensure file permissions are correct",
                path.display(),
                reason
            )
        }
        Error::ConfigParseFailed { format, reason } => {
            format!(
                "Configuration Error: Failed to parse {} config: {}\n\nTry:\n• Ensure file is valid {}",
                format, reason, format
            )
        }
        Error::ConfigValidationFailed { field, reason } => {
            format!(
                "Configuration Error: Validation failed for '{}': {}",
                field, reason
            )
        }
        Error::InvalidCredentialDigest { field, reason } => {
            format!(
                "Credential Error: '{}' is not a valid digest: {}\n\nTry:\n• Generate one with `{} --hash-secret <SECRET>`",
                field, reason, NAME
            )
        }
        _ => format!("Unexpected Error: {}", error),
    }
}
