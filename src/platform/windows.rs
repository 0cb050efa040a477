// SessionKeeper platform paths for Windows
// Config: %APPDATA%/SessionKeeper
// Data:   %APPDATA%/SessionKeeper

use std::env;
use std::path::PathBuf;

/// Returns the configuration directory for SessionKeeper on Windows.
/// `%APPDATA%/SessionKeeper`
pub fn get_config_dir() -> PathBuf {
    let appdata = env::var("APPDATA")
        .unwrap_or_else(|_| String::from("C:\\Users\\Default\\AppData\\Roaming"));
    PathBuf::from(appdata).join("SessionKeeper")
}

/// Returns the data directory for SessionKeeper on Windows.
/// `%APPDATA%/SessionKeeper`
pub fn get_data_dir() -> PathBuf {
    let appdata = env::var("APPDATA")
        .unwrap_or_else(|_| String::from("C:\\Users\\Default\\AppData\\Roaming"));
    PathBuf::from(appdata).join("SessionKeeper")
}
