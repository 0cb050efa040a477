// SessionKeeper platform paths for Linux
// Config: ~/.config/sessionkeeper
// Data:   ~/.local/share/sessionkeeper

use std::env;
use std::path::PathBuf;

/// Returns the configuration directory for SessionKeeper on Linux.
/// Uses `$XDG_CONFIG_HOME/sessionkeeper` if set, otherwise `~/.config/sessionkeeper`.
pub fn get_config_dir() -> PathBuf {
    if let Ok(xdg) = env::var("XDG_CONFIG_HOME") {
        PathBuf::from(xdg).join("sessionkeeper")
    } else {
        let home = env::var("HOME").unwrap_or_else(|_| String::from("/tmp"));
        PathBuf::from(home).join(".config").join("sessionkeeper")
    }
}

/// Returns the data directory for SessionKeeper on Linux.
/// Uses `$XDG_DATA_HOME/sessionkeeper` if set, otherwise `~/.local/share/sessionkeeper`.
pub fn get_data_dir() -> PathBuf {
    if let Ok(xdg) = env::var("XDG_DATA_HOME") {
        PathBuf::from(xdg).join("sessionkeeper")
    } else {
        let home = env::var("HOME").unwrap_or_else(|_| String::from("/tmp"));
        PathBuf::from(home)
            .join(".local")
            .join("share")
            .join("sessionkeeper")
    }
}
