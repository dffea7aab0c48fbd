//! Configuration management for OmegaTerm
//!
//! Configuration is a tree of `serde` structs with built-in defaults. Files
//! may set any subset of keys; missing keys fall back to the defaults below.

pub mod loader;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default status feed endpoint
pub const DEFAULT_STATUS_ENDPOINT: &str =
    "https://88ykyzk8g5xs.statuspage.io/api/v2/components.json";

/// Default password digest (secret: `v3secure`)
pub const DEFAULT_PASSWORD_DIGEST: &str =
    "sha256$9d41e0b27c5a13f8$7b1d42fc60705c1482db090a1d315661cdb14306760c33095abc514d2a1027eb";

/// Default passcode digest (secret: `v3secure`)
pub const DEFAULT_PASSCODE_DIGEST: &str = DEFAULT_PASSWORD_DIGEST;

/// Main configuration structure for OmegaTerm
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Login and session lifecycle
    pub session: SessionConfig,

    /// Credentials the login gate verifies against
    pub credentials: CredentialConfig,

    /// Typed output pacing
    pub feed: FeedConfig,

    /// Status feed polling
    pub status: StatusConfig,

    /// Transcript retention
    pub transcript: TranscriptConfig,

    /// Static text shown by the boot sequence and informational commands
    pub branding: BrandingConfig,
}

/// Which login flow the engine runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LoginMode {
    /// Username prompt followed by a password prompt
    #[default]
    TwoStep,
    /// A single passcode prompt
    Passcode,
}

/// Session lifecycle configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Login flow
    pub login_mode: LoginMode,

    /// Persist a "logged in" marker so the next start skips the login gate
    pub remember_session: bool,

    /// Override for the marker file location
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_file: Option<PathBuf>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            login_mode: LoginMode::TwoStep,
            remember_session: true,
            state_file: None,
        }
    }
}

/// Credential configuration. Secrets are stored as digests only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialConfig {
    /// Expected username (compared verbatim)
    pub username: String,

    /// Digest of the password, `sha256$<salt-hex>$<digest-hex>`
    pub password_digest: String,

    /// Digest of the passcode, `sha256$<salt-hex>$<digest-hex>`
    pub passcode_digest: String,
}

impl Default for CredentialConfig {
    fn default() -> Self {
        Self {
            username: "omega".to_string(),
            password_digest: DEFAULT_PASSWORD_DIGEST.to_string(),
            passcode_digest: DEFAULT_PASSCODE_DIGEST.to_string(),
        }
    }
}

/// Line feed pacing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Delay between typed lines in milliseconds
    pub line_delay_ms: u64,

    /// Delay between an eject/reboot notice and the reload
    pub reload_delay_ms: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            line_delay_ms: 50,
            reload_delay_ms: 1000,
        }
    }
}

impl FeedConfig {
    /// Delay between typed lines
    pub fn line_delay(&self) -> Duration {
        Duration::from_millis(self.line_delay_ms)
    }

    /// Delay before a scheduled reload fires
    pub fn reload_delay(&self) -> Duration {
        Duration::from_millis(self.reload_delay_ms)
    }
}

/// How the status feed is refreshed after login
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PollPolicy {
    /// Fetch at login, then on every poll interval
    #[default]
    Continuous,
    /// Fetch once at login only
    LoginOnly,
}

/// Status feed configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusConfig {
    /// Components JSON endpoint
    pub endpoint: String,

    /// Refresh policy
    pub poll: PollPolicy,

    /// Seconds between polls under [`PollPolicy::Continuous`]
    pub poll_interval_secs: u64,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_STATUS_ENDPOINT.to_string(),
            poll: PollPolicy::Continuous,
            poll_interval_secs: 15,
            timeout_secs: 10,
        }
    }
}

impl StatusConfig {
    /// Interval between polls
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Per-request timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Transcript retention
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptConfig {
    /// Maximum retained lines; `0` keeps everything
    pub max_lines: usize,
}

impl Default for TranscriptConfig {
    fn default() -> Self {
        Self { max_lines: 10_000 }
    }
}

/// Static text
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrandingConfig {
    /// Product name
    pub product: String,

    /// Build identifier
    pub version: String,

    /// Release date, free-form
    pub release_date: String,

    /// Lines typed at boot, before the first prompt
    pub banner: Vec<String>,

    /// Lines printed by `credits`
    pub credits: Vec<String>,

    /// Line printed by `whoami`
    pub whoami: String,
}

impl Default for BrandingConfig {
    fn default() -> Self {
        Self {
            product: "Omega V3 CLI UX".to_string(),
            version: "v1.3".to_string(),
            release_date: "July 11, 2025".to_string(),
            banner: vec![
                "╔════════════════════════════════════════════════════════════════╗".to_string(),
                "║      OMEGA V3 CLI UX v1.3 - Hermida Enterprise Solutions       ║".to_string(),
                "║         Powered by myhtusa.com | Terminal Access Only          ║".to_string(),
                "╚════════════════════════════════════════════════════════════════╝".to_string(),
                String::new(),
                "System booting...".to_string(),
            ],
            credits: vec![
                "Hermida Enterprise Solutions - Innovating HTUSA+, Fintra+, Omega V3, MyShare, ZeroBreak.".to_string(),
                "Official site: myhtusa.com".to_string(),
            ],
            whoami: "omega@hermida-enterprise (operator session, terminal access only)".to_string(),
        }
    }
}

/// Configuration utilities
pub mod utils {
    use super::*;

    /// Get configuration file format from path
    pub fn get_config_format(path: &Path) -> Option<loader::ConfigFormat> {
        match path.extension()?.to_str()? {
            "toml" => Some(loader::ConfigFormat::Toml),
            "json" => Some(loader::ConfigFormat::Json),
            _ => None,
        }
    }
}
