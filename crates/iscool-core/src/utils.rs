//! Utility helpers — data paths and string truncation.

use std::path::PathBuf;

/// Get the IsCool data directory (e.g. `~/.iscool/`).
pub fn get_data_path() -> PathBuf {
    let home = home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(".iscool")
}

/// Get the CLI history file (e.g. `~/.iscool/history/cli_history`).
pub fn get_history_path() -> PathBuf {
    get_data_path().join("history").join("cli_history")
}

/// Truncate a string to `max_len` characters, adding "..." if truncated.
/// Unicode-safe.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}

/// The user's home directory. Every path shown or written goes through this.
pub fn home_dir() -> Option<PathBuf> {
    dirs_next::home_dir()
}
