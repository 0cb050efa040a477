// SessionKeeper shared type definitions
// Each submodule defines types used across the application.

pub mod config;
pub mod errors;
pub mod format;
pub mod messages;
pub mod status;
