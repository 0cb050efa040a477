//! Production driver for SessionKeeper.
//!
//! A current-thread tokio event loop owning the coordinator, every page
//! agent, and the status view. All component entry points run serialized on
//! one task; timers are sleep tasks that feed fires back through the same
//! queue, so events for any endpoint arrive in the order they were sent.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

use crate::app::App;
use crate::managers::notification_binder::ClickTarget;
use crate::platform::{
    IdleHost, NotebookProbe, NotificationHost, SystemClock, TabHost, TimerHost, TimerId,
};
use crate::services::coordinator::CoordinatorTrait;
use crate::services::page_agent::{PageAgent, PageAgentTrait};
use crate::services::status_view::{StatusView, StatusViewTrait};
use crate::types::messages::{
    AgentCommand, AgentEvent, CoordinatorEvent, IdleState, ViewCommand,
};
use crate::types::status::{NotificationId, TabId, TabSnapshot};

/// Which component a fired timer belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerOwner {
    Coordinator,
    Agent(TabId),
    View,
}

/// Everything the event loop reacts to.
#[derive(Debug)]
pub enum RuntimeEvent {
    TimerFired { owner: TimerOwner, id: TimerId },
    /// A notebook page announced itself from the given tab.
    PageRegistered(TabSnapshot),
    TabClosed(TabId),
    IdleStateChanged(IdleState),
    NetworkOffline,
    NetworkOnline,
    NotificationClicked(NotificationId),
    NotificationClosed(NotificationId),
    ViewOpened,
    ViewToggled(bool),
    ViewClosed,
    /// One settings change from the options surface.
    SettingChanged { key: String, value: serde_json::Value },
    Shutdown,
}

/// `TimerHost` implementation over tokio sleep tasks.
///
/// Each armed timer is a local task that sends `TimerFired` into the runtime
/// queue; `clear` aborts the task. A fire already queued when the abort lands
/// is still delivered and ignored by the owner via id mismatch.
pub struct TokioTimers {
    owner: TimerOwner,
    tx: UnboundedSender<RuntimeEvent>,
    next: Cell<TimerId>,
    tasks: RefCell<HashMap<TimerId, JoinHandle<()>>>,
}

impl TokioTimers {
    /// Must be used from within a `tokio::task::LocalSet`.
    pub fn new(owner: TimerOwner, tx: UnboundedSender<RuntimeEvent>) -> Self {
        Self {
            owner,
            tx,
            next: Cell::new(1),
            tasks: RefCell::new(HashMap::new()),
        }
    }

    fn next_id(&self) -> TimerId {
        let id = self.next.get();
        self.next.set(id + 1);
        id
    }
}

impl TimerHost for TokioTimers {
    fn set_timeout(&self, delay: Duration) -> TimerId {
        let id = self.next_id();
        let tx = self.tx.clone();
        let owner = self.owner;
        let handle = tokio::task::spawn_local(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(RuntimeEvent::TimerFired { owner, id });
        });
        self.tasks.borrow_mut().insert(id, handle);
        id
    }

    fn set_interval(&self, period: Duration) -> TimerId {
        let id = self.next_id();
        let tx = self.tx.clone();
        let owner = self.owner;
        let handle = tokio::task::spawn_local(async move {
            loop {
                tokio::time::sleep(period).await;
                if tx.send(RuntimeEvent::TimerFired { owner, id }).is_err() {
                    break;
                }
            }
        });
        self.tasks.borrow_mut().insert(id, handle);
        id
    }

    fn clear(&self, id: TimerId) {
        if let Some(handle) = self.tasks.borrow_mut().remove(&id) {
            handle.abort();
        }
    }

    fn active_timers(&self) -> usize {
        self.tasks.borrow().len()
    }
}

/// The event loop. Owns the app core, one agent per registered tab, and the
/// status view; routes their outbound messages in arrival order.
pub struct Runtime {
    tx: UnboundedSender<RuntimeEvent>,
    rx: UnboundedReceiver<RuntimeEvent>,
    pub app: App,
    agents: HashMap<TabId, PageAgent>,
    view: StatusView,
    view_tab: Option<TabId>,
    tabs: Rc<dyn TabHost>,
    probes: Box<dyn Fn(TabId) -> Box<dyn NotebookProbe>>,
}

impl Runtime {
    pub fn new(
        tabs: Rc<dyn TabHost>,
        notifications: Rc<dyn NotificationHost>,
        idle: Rc<dyn IdleHost>,
        probes: Box<dyn Fn(TabId) -> Box<dyn NotebookProbe>>,
        config_path: Option<String>,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let app = App::new(
            Box::new(Rc::clone(&tabs)),
            Box::new(notifications),
            Box::new(idle),
            Box::new(TokioTimers::new(TimerOwner::Coordinator, tx.clone())),
            config_path,
        );
        let view = StatusView::new(
            Box::new(TokioTimers::new(TimerOwner::View, tx.clone())),
            Box::new(SystemClock),
        );
        Self {
            tx,
            rx,
            app,
            agents: HashMap::new(),
            view,
            view_tab: None,
            tabs,
            probes,
        }
    }

    /// A handle for feeding events into the loop from the platform side.
    pub fn sender(&self) -> UnboundedSender<RuntimeEvent> {
        self.tx.clone()
    }

    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }

    pub fn view_model(&self) -> &crate::services::status_view::ViewModel {
        self.view.model()
    }

    /// Loads the configuration, then drains the queue until `Shutdown`.
    /// Must be awaited inside a `tokio::task::LocalSet`.
    pub async fn run(mut self) -> Self {
        let events = self.app.startup();
        self.route_coordinator_events(events);
        log::info!("runtime started");
        while let Some(event) = self.rx.recv().await {
            if matches!(event, RuntimeEvent::Shutdown) {
                log::info!("runtime shutting down");
                break;
            }
            self.handle_event(event);
        }
        self
    }

    /// One serialized dispatch step.
    pub fn handle_event(&mut self, event: RuntimeEvent) {
        match event {
            RuntimeEvent::TimerFired { owner, id } => match owner {
                TimerOwner::Coordinator => self.app.coordinator.rotation_timer(id),
                TimerOwner::Agent(tab) => {
                    let events = match self.agents.get_mut(&tab) {
                        Some(agent) => agent.handle_timer(id),
                        None => {
                            log::debug!("timer fire for closed tab {}", tab.0);
                            Vec::new()
                        }
                    };
                    self.route_agent_events(tab, events);
                }
                TimerOwner::View => {
                    self.view.handle_timer(id);
                }
            },
            RuntimeEvent::PageRegistered(snapshot) => {
                let tab = snapshot.id;
                self.agents.entry(tab).or_insert_with(|| {
                    PageAgent::new(
                        (self.probes)(tab),
                        Box::new(TokioTimers::new(TimerOwner::Agent(tab), self.tx.clone())),
                        Box::new(SystemClock),
                    )
                });
                let events = self.app.coordinator.register_page(snapshot);
                self.route_coordinator_events(events);
            }
            RuntimeEvent::TabClosed(tab) => {
                if let Some(mut agent) = self.agents.remove(&tab) {
                    agent.handle_command(AgentCommand::Stop);
                }
                self.app.coordinator.tab_closed(tab);
                if self.view_tab == Some(tab) {
                    self.view_tab = None;
                }
            }
            RuntimeEvent::IdleStateChanged(state) => {
                self.app.coordinator.idle_state_changed(state);
            }
            RuntimeEvent::NetworkOffline => self.broadcast(AgentCommand::NetworkOffline),
            RuntimeEvent::NetworkOnline => self.broadcast(AgentCommand::NetworkOnline),
            RuntimeEvent::NotificationClicked(id) => {
                self.app.coordinator.notification_clicked(&id);
            }
            RuntimeEvent::NotificationClosed(id) => {
                self.app.coordinator.notification_closed(&id);
            }
            RuntimeEvent::ViewOpened => {
                let focused = self.tabs.focused_tab();
                let automated = focused
                    .as_ref()
                    .map(|t| self.app.coordinator.registry().contains(t.id))
                    .unwrap_or(false);
                self.view_tab = if automated { focused.map(|t| t.id) } else { None };
                if let Some(command) = self.view.open(automated) {
                    self.forward_view_command(command);
                }
            }
            RuntimeEvent::ViewToggled(enable) => {
                if let Some(command) = self.view.toggle_enabled(enable) {
                    self.forward_view_command(command);
                }
            }
            RuntimeEvent::ViewClosed => {
                self.view.close();
                self.view_tab = None;
            }
            RuntimeEvent::SettingChanged { key, value } => {
                match self.app.apply_setting(&key, value) {
                    Ok(events) => self.route_coordinator_events(events),
                    Err(e) => log::error!("settings change rejected: {}", e),
                }
            }
            RuntimeEvent::Shutdown => {}
        }
    }

    fn broadcast(&mut self, command: AgentCommand) {
        let tabs: Vec<TabId> = self.agents.keys().copied().collect();
        for tab in tabs {
            let events = self
                .agents
                .get_mut(&tab)
                .map(|a| a.handle_command(command.clone()))
                .unwrap_or_default();
            self.route_agent_events(tab, events);
        }
    }

    fn forward_view_command(&mut self, command: ViewCommand) {
        let tab = match self.view_tab {
            Some(t) => t,
            None => return,
        };
        let agent_command = match command {
            ViewCommand::RequestStatus => AgentCommand::StatusRequest,
            ViewCommand::Start => AgentCommand::Start,
            ViewCommand::Stop => AgentCommand::Stop,
        };
        let events = self
            .agents
            .get_mut(&tab)
            .map(|a| a.handle_command(agent_command))
            .unwrap_or_default();
        self.route_agent_events(tab, events);
    }

    fn route_agent_events(&mut self, tab: TabId, events: Vec<AgentEvent>) {
        for event in events {
            match event {
                AgentEvent::Notify(request) => {
                    self.app
                        .coordinator
                        .handle_notify_request(ClickTarget::Tab(tab), request);
                }
                AgentEvent::StatusPush(snapshot) => {
                    if self.view_tab == Some(tab) {
                        self.view.status_received(snapshot);
                    }
                }
            }
        }
    }

    fn route_coordinator_events(&mut self, events: Vec<CoordinatorEvent>) {
        for event in events {
            match event {
                CoordinatorEvent::ConfigReply { tab, config } => {
                    let events = match self.agents.get_mut(&tab) {
                        Some(agent) => agent.config_received(config),
                        None => {
                            log::debug!("config reply for closed tab {}", tab.0);
                            Vec::new()
                        }
                    };
                    self.route_agent_events(tab, events);
                }
                CoordinatorEvent::ConfigPush { tab, config } => {
                    let events = match self.agents.get_mut(&tab) {
                        Some(agent) => agent.handle_command(AgentCommand::ConfigPush(config)),
                        None => {
                            log::debug!("config push for closed tab {}", tab.0);
                            Vec::new()
                        }
                    };
                    self.route_agent_events(tab, events);
                }
            }
        }
    }
}
