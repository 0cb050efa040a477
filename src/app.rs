//! App Core for SessionKeeper.
//!
//! Wires the persistent config store to the coordinator and drives the
//! startup load. The runtime owns an `App` and routes platform events into
//! the coordinator through it.

use crate::platform::{IdleHost, NotificationHost, TabHost, TimerHost};
use crate::services::config_store::{ConfigStore, ConfigStoreTrait};
use crate::services::coordinator::{Coordinator, CoordinatorTrait};
use crate::types::errors::ConfigError;
use crate::types::messages::CoordinatorEvent;

/// Central application struct holding the config store and the coordinator.
pub struct App {
    pub config_store: ConfigStore,
    pub coordinator: Coordinator,
}

impl App {
    /// Creates a new App over the given platform hosts.
    ///
    /// `config_path` overrides the platform config file location; tests use
    /// it to point at a temp directory.
    pub fn new(
        tabs: Box<dyn TabHost>,
        notifications: Box<dyn NotificationHost>,
        idle: Box<dyn IdleHost>,
        timers: Box<dyn TimerHost>,
        config_path: Option<String>,
    ) -> Self {
        Self {
            config_store: ConfigStore::new(config_path),
            coordinator: Coordinator::new(tabs, notifications, idle, timers),
        }
    }

    /// Startup sequence: load the configuration from disk and hand it to the
    /// coordinator. A failed load leaves the coordinator unconfigured; the
    /// returned events answer any config requests that were already queued.
    pub fn startup(&mut self) -> Vec<CoordinatorEvent> {
        match self.config_store.load() {
            Ok(config) => self.coordinator.config_loaded(config),
            Err(e) => {
                self.coordinator.config_load_failed(e);
                Vec::new()
            }
        }
    }

    /// Applies one settings change from the options surface: persist it,
    /// then push the new configuration to every registered tab.
    pub fn apply_setting(
        &mut self,
        key: &str,
        value: serde_json::Value,
    ) -> Result<Vec<CoordinatorEvent>, ConfigError> {
        self.config_store.set_value(key, value)?;
        let config = self.config_store.get_config().clone();
        Ok(self.coordinator.update_config(config))
    }
}
