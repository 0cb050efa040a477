use crate::types::config::KeeperConfig;
use crate::types::status::{StatusSnapshot, TabId};

/// System idle state as observed by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdleState {
    Active,
    Idle,
    Locked,
}

/// A request from a PageAgent to show a desktop notification.
#[derive(Debug, Clone, PartialEq)]
pub struct NotifyRequest {
    pub title: String,
    pub body: String,
    /// Timestamp the notified event happened at, in ms since the epoch.
    pub event_time_ms: u64,
}

/// Commands delivered to a PageAgent over the message bus.
#[derive(Debug, Clone, PartialEq)]
pub enum AgentCommand {
    /// Enable automation (from the StatusView toggle).
    Start,
    /// Disable automation and cancel every pending timer.
    Stop,
    /// One-shot status query; answered with a `StatusPush`.
    StatusRequest,
    /// Replacement configuration snapshot pushed by the Coordinator.
    ConfigPush(KeeperConfig),
    NetworkOffline,
    NetworkOnline,
}

/// Messages emitted by a PageAgent for the runtime to route.
#[derive(Debug, Clone, PartialEq)]
pub enum AgentEvent {
    /// Forwarded to the Coordinator, which decides display and binding.
    Notify(NotifyRequest),
    /// Broadcast to any subscribed StatusView.
    StatusPush(StatusSnapshot),
}

/// Messages emitted by the Coordinator for the runtime to route.
#[derive(Debug, Clone, PartialEq)]
pub enum CoordinatorEvent {
    /// Reply to a configuration request from the given tab's PageAgent.
    ConfigReply { tab: TabId, config: KeeperConfig },
    /// Push of a changed configuration to a registered tab's PageAgent.
    ConfigPush { tab: TabId, config: KeeperConfig },
}

/// Commands the StatusView issues toward the active tab's PageAgent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewCommand {
    RequestStatus,
    Start,
    Stop,
}
