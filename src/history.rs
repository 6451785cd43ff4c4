//! Input history
//!
//! Stores submitted commands across sessions and serves them back for
//! up/down recall in the input line.

use std::fs;
use std::path::PathBuf;

/// Maximum number of history entries
const HISTORY_LIMIT: usize = 500;

/// Command history storage
pub struct CommandHistory {
    /// All entries (newest last)
    entries: Vec<String>,
    /// File path for persistence; `None` keeps the history in memory only
    file_path: Option<PathBuf>,
    /// Maximum entries
    max_entries: usize,
}

impl Default for CommandHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandHistory {
    /// Create a history backed by `~/.mudterm/history`.
    pub fn new() -> Self {
        Self::with_path(Self::history_path())
    }

    /// Create a history backed by an explicit path (or none).
    pub fn with_path(file_path: Option<PathBuf>) -> Self {
        let mut history = Self {
            entries: Vec::new(),
            file_path,
            max_entries: HISTORY_LIMIT,
        };
        history.load();
        history
    }

    /// Get history file path
    fn history_path() -> Option<PathBuf> {
        if let Some(home) = home_dir() {
            let mudterm_dir = home.join(".mudterm");
            if !mudterm_dir.exists() {
                let _ = fs::create_dir_all(&mudterm_dir);
            }
            return Some(mudterm_dir.join("history"));
        }
        None
    }

    /// Load history from file
    fn load(&mut self) {
        if let Some(ref path) = self.file_path {
            if path.exists() {
                if let Ok(content) = fs::read_to_string(path) {
                    self.entries
                        .extend(content.lines().map(str::to_owned));
                }
            }
        }
    }

    /// Save history to file
    fn save(&self) {
        if let Some(ref path) = self.file_path {
            let _ = fs::write(path, self.entries.join("\n"));
        }
    }

    /// Add a command to history
    pub fn add(&mut self, command: &str) {
        let trimmed = command.trim();
        if trimmed.is_empty() {
            return;
        }

        // Dedup consecutive repeats
        if self.entries.last().map(String::as_str) == Some(trimmed) {
            return;
        }

        // Never record login credentials
        if Self::is_sensitive(trimmed) {
            return;
        }

        self.entries.push(trimmed.to_owned());

        while self.entries.len() > self.max_entries {
            self.entries.remove(0);
        }

        self.save();
    }

    /// Check if a command carries credentials (shouldn't be saved)
    fn is_sensitive(command: &str) -> bool {
        let lower = command.to_lowercase();
        // "connect <name> <password>" is the usual MUD login form
        lower.starts_with("connect ")
            || lower.contains("password")
            || lower.contains("passwd")
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry by index, oldest first.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(String::as_str)
    }
}

// Get home directory
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_history() -> CommandHistory {
        CommandHistory::with_path(None)
    }

    #[test]
    fn test_add_and_get() {
        let mut history = memory_history();
        history.add("look");
        history.add("north");
        assert_eq!(history.len(), 2);
        assert_eq!(history.get(0), Some("look"));
        assert_eq!(history.get(1), Some("north"));
        assert_eq!(history.get(2), None);
    }

    #[test]
    fn test_consecutive_dedup() {
        let mut history = memory_history();
        history.add("look");
        history.add("look");
        history.add("north");
        history.add("look");
        assert_eq!(history.len(), 3);
    }

    #[test]
    fn test_blank_and_sensitive_commands_are_skipped() {
        let mut history = memory_history();
        history.add("   ");
        history.add("connect gandalf mellon");
        history.add("@newpassword foo");
        assert!(history.is_empty());
    }

    #[test]
    fn test_limit_drops_oldest() {
        let mut history = memory_history();
        history.max_entries = 3;
        for command in ["a", "b", "c", "d"] {
            history.add(command);
        }
        assert_eq!(history.len(), 3);
        assert_eq!(history.get(0), Some("b"));
        assert_eq!(history.get(2), Some("d"));
    }
}
