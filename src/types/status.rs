use serde::{Deserialize, Serialize};

/// Platform tab identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TabId(pub u32);

/// Platform window identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WindowId(pub u32);

/// Platform notification identifier, assigned by the notification host.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NotificationId(pub String);

/// Where a PageAgent is in its retry cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No timers armed (stopped, offline, or not yet initialized).
    Idle,
    /// A click happened and its delayed verification is in flight.
    Probing,
    /// The periodic retry timer is armed and nothing else is pending.
    WaitingRetry,
}

/// Last verified connection state of the notebook page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionStatus {
    Unknown,
    Connected,
    Disconnected,
}

/// Point-in-time status of one PageAgent, as sent to the StatusView.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub auto_run: bool,
    pub enabled: bool,
    pub connection: ConnectionStatus,
    /// Milliseconds since the epoch of the last verified transition.
    pub last_transition_ms: Option<u64>,
}

/// Snapshot of a browser tab as the Coordinator tracks it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TabSnapshot {
    pub id: TabId,
    pub window: WindowId,
    pub url: String,
    pub title: String,
}

/// Display state of a browser window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WindowState {
    Normal,
    Minimized,
    Maximized,
    Fullscreen,
}
