// SessionKeeper Coordinator
// The hub component: owns the canonical configuration copy, the registry of
// automated notebook tabs, idle-driven tab rotation, and the binding of
// notifications to the tabs they came from.

use crate::managers::notification_binder::{ClickTarget, NotificationBinder};
use crate::managers::rotation_manager::RotationManager;
use crate::managers::tab_registry::TabRegistry;
use std::time::Duration;

use crate::platform::{IdleHost, NotificationHost, TabHost, TimerHost, TimerId};
use crate::types::config::KeeperConfig;
use crate::types::errors::ConfigError;
use crate::types::messages::{CoordinatorEvent, IdleState, NotifyRequest};
use crate::types::status::{NotificationId, TabId, TabSnapshot};

/// Trait defining the coordinator interface.
pub trait CoordinatorTrait {
    fn config_loaded(&mut self, config: KeeperConfig) -> Vec<CoordinatorEvent>;
    fn config_load_failed(&mut self, error: ConfigError);
    fn register_page(&mut self, tab: TabSnapshot) -> Vec<CoordinatorEvent>;
    fn handle_config_request(&mut self, requester: TabId) -> Vec<CoordinatorEvent>;
    fn update_config(&mut self, new_config: KeeperConfig) -> Vec<CoordinatorEvent>;
    fn tab_closed(&mut self, tab: TabId);
    fn idle_state_changed(&mut self, state: IdleState);
    fn rotation_timer(&mut self, id: TimerId);
    fn handle_notify_request(&mut self, target: ClickTarget, request: NotifyRequest);
    fn notification_clicked(&mut self, id: &NotificationId);
    fn notification_closed(&mut self, id: &NotificationId);
}

/// Coordinator implementation.
///
/// `config` is the single authoritative copy; it is `None` until the initial
/// load finishes, and configuration requests arriving before that are queued
/// and answered in arrival order once it does. A failed load leaves the
/// coordinator inert: queued requests are never answered.
pub struct Coordinator {
    tabs: Box<dyn TabHost>,
    notifications: Box<dyn NotificationHost>,
    idle: Box<dyn IdleHost>,
    config: Option<KeeperConfig>,
    pending_requests: Vec<TabId>,
    registry: TabRegistry,
    rotation: RotationManager,
    binder: NotificationBinder,
}

impl Coordinator {
    pub fn new(
        tabs: Box<dyn TabHost>,
        notifications: Box<dyn NotificationHost>,
        idle: Box<dyn IdleHost>,
        timers: Box<dyn TimerHost>,
    ) -> Self {
        Self {
            tabs,
            notifications,
            idle,
            config: None,
            pending_requests: Vec::new(),
            registry: TabRegistry::new(),
            rotation: RotationManager::new(timers),
            binder: NotificationBinder::new(),
        }
    }

    /// Tell the platform how much inactivity counts as idle.
    fn apply_idle_threshold(&self, config: &KeeperConfig) {
        self.idle
            .set_detection_threshold(Duration::from_secs(config.rotation.idle_threshold_secs));
    }

    pub fn config(&self) -> Option<&KeeperConfig> {
        self.config.as_ref()
    }

    pub fn registry(&self) -> &TabRegistry {
        &self.registry
    }

    pub fn rotation_active(&self) -> bool {
        self.rotation.is_active()
    }

    pub fn pending_request_count(&self) -> usize {
        self.pending_requests.len()
    }

    fn notifications_enabled(&self) -> bool {
        self.config
            .as_ref()
            .map(|c| c.notifications.enabled)
            .unwrap_or(true)
    }
}

impl CoordinatorTrait for Coordinator {
    /// Initial configuration load finished; answer any deferred requests in
    /// arrival order.
    fn config_loaded(&mut self, config: KeeperConfig) -> Vec<CoordinatorEvent> {
        self.apply_idle_threshold(&config);
        self.config = Some(config.clone());
        let deferred: Vec<TabId> = self.pending_requests.drain(..).collect();
        if !deferred.is_empty() {
            log::debug!("answering {} deferred config requests", deferred.len());
        }
        deferred
            .into_iter()
            .map(|tab| CoordinatorEvent::ConfigReply {
                tab,
                config: config.clone(),
            })
            .collect()
    }

    /// Initial configuration load failed. Deferred requests stay queued and
    /// are never answered; their agents remain idle.
    fn config_load_failed(&mut self, error: ConfigError) {
        log::error!("configuration load failed: {}", error);
    }

    /// A notebook page announced itself: track its tab, surface the per-tab
    /// action indicator, and send it the configuration snapshot (or defer
    /// until the initial load finishes).
    fn register_page(&mut self, tab: TabSnapshot) -> Vec<CoordinatorEvent> {
        let tab_id = tab.id;
        log::info!("notebook page registered in tab {}", tab_id.0);
        self.registry.insert(tab);
        self.rotation.registry_changed();
        self.tabs.show_page_action(tab_id);
        self.handle_config_request(tab_id)
    }

    fn handle_config_request(&mut self, requester: TabId) -> Vec<CoordinatorEvent> {
        match &self.config {
            Some(config) => vec![CoordinatorEvent::ConfigReply {
                tab: requester,
                config: config.clone(),
            }],
            None => {
                log::debug!(
                    "config request from tab {} deferred until load finishes",
                    requester.0
                );
                self.pending_requests.push(requester);
                Vec::new()
            }
        }
    }

    /// Replace the canonical configuration and push it to every registered
    /// tab. Persistence is the caller's job.
    fn update_config(&mut self, new_config: KeeperConfig) -> Vec<CoordinatorEvent> {
        self.apply_idle_threshold(&new_config);
        self.config = Some(new_config.clone());
        self.registry
            .tabs()
            .iter()
            .map(|t| CoordinatorEvent::ConfigPush {
                tab: t.id,
                config: new_config.clone(),
            })
            .collect()
    }

    fn tab_closed(&mut self, tab: TabId) {
        if self.registry.remove(tab) {
            log::info!("automated tab {} closed", tab.0);
            self.rotation.registry_changed();
        }
        self.binder.drop_tab(tab);
        self.pending_requests.retain(|t| *t != tab);
    }

    fn idle_state_changed(&mut self, state: IdleState) {
        match state {
            IdleState::Active => self.rotation.stop_and_restore(&*self.tabs),
            IdleState::Idle | IdleState::Locked => {
                if let Some(config) = &self.config {
                    self.rotation
                        .start_if_eligible(&config.rotation, &self.registry, &*self.tabs);
                }
            }
        }
    }

    fn rotation_timer(&mut self, id: TimerId) {
        self.rotation.handle_timer(id, &self.registry, &*self.tabs);
    }

    /// Show a notification on behalf of a page agent and remember where a
    /// click on it should lead. Dropped entirely while notifications are
    /// disabled; a failed show is logged and leaves no binding.
    fn handle_notify_request(&mut self, target: ClickTarget, request: NotifyRequest) {
        if !self.notifications_enabled() {
            log::debug!("notifications disabled, dropping: {}", request.title);
            return;
        }
        match self
            .notifications
            .show(&request.title, &request.body, request.event_time_ms)
        {
            Ok(id) => self.binder.bind(id, target),
            Err(e) => log::warn!("notification show failed: {}", e),
        }
    }

    /// Bring the notification's source into view. A vanished tab is a silent
    /// no-op; the binding stays until the platform reports the close.
    fn notification_clicked(&mut self, id: &NotificationId) {
        let target = match self.binder.target(id) {
            Some(t) => t.clone(),
            None => {
                log::debug!("click on unbound notification {}", id.0);
                return;
            }
        };
        match target {
            ClickTarget::Tab(tab) => {
                let snapshot = self.tabs.query_tabs().into_iter().find(|t| t.id == tab);
                match snapshot {
                    Some(t) => {
                        if let Err(e) = self.tabs.focus_window(t.window) {
                            log::warn!("could not focus window for notification: {}", e);
                            return;
                        }
                        if let Err(e) = self.tabs.activate_tab(t.id) {
                            log::warn!("could not activate tab for notification: {}", e);
                        }
                    }
                    None => log::info!("notification target tab {} is gone", tab.0),
                }
            }
            ClickTarget::Url(url) => {
                if let Err(e) = self.tabs.open_tab(&url) {
                    log::warn!("could not open {}: {}", url, e);
                }
            }
        }
    }

    fn notification_closed(&mut self, id: &NotificationId) {
        self.binder.unbind(id);
    }
}
