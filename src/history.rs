//! Command history
//!
//! Commands accepted while authenticated, in the order they were entered.
//! Duplicates are kept; `history` shows exactly what was typed.

/// Ordered record of accepted commands
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandHistory {
    entries: Vec<String>,
}

impl CommandHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a command. Blank commands are ignored.
    pub fn record(&mut self, command: impl Into<String>) {
        let command = command.into();
        if command.trim().is_empty() {
            return;
        }
        self.entries.push(command);
    }

    /// All entries in insertion order
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Most recent entry
    pub fn last(&self) -> Option<&str> {
        self.entries.last().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Forget every entry
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
