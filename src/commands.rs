//! Command table
//!
//! Commands are matched exactly after trimming and lower-casing. There is
//! no argument parsing: `help me` is an unknown command.

use crate::config::BrandingConfig;

/// A dispatchable command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Status,
    Version,
    Credits,
    Clear,
    History,
    Whoami,
    Logout,
    /// `eject` or `reboot`
    Eject,
    /// Anything else, carrying the normalized input
    Unknown(String),
}

impl Command {
    /// Match a normalized input line (see [`normalize`])
    pub fn parse(normalized: &str) -> Self {
        match normalized {
            "help" => Command::Help,
            "status" => Command::Status,
            "version" => Command::Version,
            "credits" => Command::Credits,
            "clear" => Command::Clear,
            "history" => Command::History,
            "whoami" => Command::Whoami,
            "logout" => Command::Logout,
            "eject" | "reboot" => Command::Eject,
            other => Command::Unknown(other.to_string()),
        }
    }

    /// Whether the command is echoed as `> cmd` before its output.
    /// Commands that replace the transcript are not.
    pub fn echoes(&self) -> bool {
        !matches!(self, Command::Clear | Command::Logout | Command::Eject)
    }
}

/// Trim and lower-case raw input
pub fn normalize(input: &str) -> String {
    input.trim().to_lowercase()
}

/// Name and one-line description of a command
#[derive(Debug, Clone, Copy)]
pub struct CommandSpec {
    pub name: &'static str,
    pub description: &'static str,
}

/// Commands listed by `help`, in display order
pub const COMMANDS: &[CommandSpec] = &[
    CommandSpec { name: "help", description: "List all commands" },
    CommandSpec { name: "status", description: "Live system status" },
    CommandSpec { name: "version", description: "Current CLI build info" },
    CommandSpec { name: "credits", description: "About Hermida Enterprise" },
    CommandSpec { name: "clear", description: "Clear screen" },
    CommandSpec { name: "history", description: "Show past commands" },
    CommandSpec { name: "whoami", description: "Show session identity" },
    CommandSpec { name: "logout", description: "End session" },
    CommandSpec { name: "eject", description: "Reset session + wipe" },
    CommandSpec { name: "reboot", description: "Same as eject" },
];

/// Output of `help`
pub fn help_lines() -> Vec<String> {
    let mut lines = vec![String::new(), "Available commands:".to_string()];
    lines.extend(
        COMMANDS
            .iter()
            .map(|spec| format!("{:<8} - {}", spec.name, spec.description)),
    );
    lines
}

/// Output of `version`
pub fn version_line(branding: &BrandingConfig) -> String {
    format!(
        "{} {} - Released {}",
        branding.product, branding.version, branding.release_date
    )
}

/// Output of `credits`
pub fn credits_lines(branding: &BrandingConfig) -> Vec<String> {
    let mut lines = vec![String::new()];
    lines.extend(branding.credits.iter().cloned());
    lines
}

/// Response to anything not in the table
pub fn unknown_line(command: &str) -> String {
    format!("unknown command: {}", command)
}

/// Echo of an accepted command
pub fn echo_line(command: &str) -> String {
    format!("> {}", command)
}
