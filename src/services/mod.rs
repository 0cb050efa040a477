// SessionKeeper services
// Services are the long-lived components: configuration persistence, the
// per-tab page agent, the central coordinator, and the popup status view.

pub mod config_store;
pub mod coordinator;
pub mod page_agent;
pub mod status_view;
