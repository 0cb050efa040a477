use serde::{Deserialize, Serialize};

/// Top-level keeper configuration container.
///
/// Exactly one authoritative copy lives in the Coordinator; every copy held by
/// a PageAgent is a snapshot that is stale until the next configuration push.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KeeperConfig {
    pub automation: AutomationSettings,
    pub rotation: RotationSettings,
    pub notifications: NotificationSettings,
}

impl Default for KeeperConfig {
    fn default() -> Self {
        Self {
            automation: AutomationSettings::default(),
            rotation: RotationSettings::default(),
            notifications: NotificationSettings::default(),
        }
    }
}

/// Settings for the per-page automation loop.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AutomationSettings {
    /// Run the first cell instead of only connecting.
    pub auto_run_first_cell: bool,
    /// Period of the retry timer, in seconds.
    pub retry_interval_secs: u64,
    /// Delay between clicking a control and verifying the result, in seconds.
    pub probe_delay_secs: u64,
    /// Delay before re-arming after a settings push or an online event.
    pub restart_delay_secs: u64,
    /// Dismiss captcha challenge popups instead of waiting for the user.
    pub dismiss_captcha_popups: bool,
}

impl Default for AutomationSettings {
    fn default() -> Self {
        Self {
            auto_run_first_cell: false,
            retry_interval_secs: 60,
            probe_delay_secs: 10,
            restart_delay_secs: 10,
            dismiss_captcha_popups: false,
        }
    }
}

/// Settings for idle-triggered tab rotation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RotationSettings {
    /// Cycle focus through registered notebook tabs while the user is idle.
    pub rotate_on_idle: bool,
    /// Seconds of inactivity before the platform reports the idle state.
    pub idle_threshold_secs: u64,
    /// Minutes between rotation steps.
    pub period_mins: u64,
}

impl Default for RotationSettings {
    fn default() -> Self {
        Self {
            rotate_on_idle: false,
            idle_threshold_secs: 60,
            period_mins: 1,
        }
    }
}

/// Settings for desktop notifications.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NotificationSettings {
    pub enabled: bool,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self { enabled: true }
    }
}
