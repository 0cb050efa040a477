use std::fmt;

// === ConfigError ===

/// Errors related to configuration loading and saving.
#[derive(Debug)]
pub enum ConfigError {
    /// An I/O error occurred while reading or writing the config file.
    IoError(String),
    /// Failed to serialize or deserialize the configuration.
    SerializationError(String),
    /// The provided configuration key is invalid.
    InvalidKey(String),
    /// The provided configuration value is invalid.
    InvalidValue(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::IoError(msg) => write!(f, "Config I/O error: {}", msg),
            ConfigError::SerializationError(msg) => {
                write!(f, "Config serialization error: {}", msg)
            }
            ConfigError::InvalidKey(key) => write!(f, "Invalid config key: {}", key),
            ConfigError::InvalidValue(msg) => write!(f, "Invalid config value: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

// === PlatformError ===

/// Transient errors from the platform capability layer.
///
/// These are always caught per call: the failing operation is logged and
/// abandoned for that target only, never retried outside the existing
/// periodic cadence.
#[derive(Debug)]
pub enum PlatformError {
    /// The target tab no longer exists.
    TabGone(String),
    /// The target window no longer exists.
    WindowGone(String),
    /// The notification host rejected the request.
    NotificationFailed(String),
    /// The capability is not available in this host.
    Unavailable(String),
}

impl fmt::Display for PlatformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlatformError::TabGone(id) => write!(f, "Tab gone: {}", id),
            PlatformError::WindowGone(id) => write!(f, "Window gone: {}", id),
            PlatformError::NotificationFailed(msg) => {
                write!(f, "Notification failed: {}", msg)
            }
            PlatformError::Unavailable(msg) => write!(f, "Capability unavailable: {}", msg),
        }
    }
}

impl std::error::Error for PlatformError {}

// === ProbeError ===

/// Errors from the notebook page probe.
///
/// A probe or verify cycle that hits one of these terminates early without
/// touching the timer chain; the next scheduled tick is the implicit retry.
#[derive(Debug)]
pub enum ProbeError {
    /// An expected page element (button, dialog control) is absent.
    ElementMissing(String),
    /// A dialog control was clicked repeatedly but the dialog did not close.
    DialogStuck(String),
    /// The page itself is gone or navigated away.
    PageGone(String),
}

impl fmt::Display for ProbeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeError::ElementMissing(what) => write!(f, "Cannot find {}", what),
            ProbeError::DialogStuck(msg) => write!(f, "Dialog did not close: {}", msg),
            ProbeError::PageGone(msg) => write!(f, "Page gone: {}", msg),
        }
    }
}

impl std::error::Error for ProbeError {}
