//! In-process implementations of the platform capability contract.
//!
//! Used by the test suites and by the demo binary. Every host keeps its state
//! behind interior mutability so a component can own a boxed handle while the
//! caller keeps a second `Rc` handle to script and inspect the same instance.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashSet};
use std::time::Duration;

use uuid::Uuid;

use crate::platform::{
    Clock, DialogChoice, DialogControls, IdleHost, NotebookProbe, NotificationHost,
    RunControlState, TabHost, TimerHost, TimerId,
};
use crate::types::errors::{PlatformError, ProbeError};
use crate::types::status::{NotificationId, TabId, TabSnapshot, WindowId, WindowState};

// === SimClock ===

/// Manually advanced clock.
pub struct SimClock {
    ms: Cell<u64>,
}

impl SimClock {
    pub fn new(start_ms: u64) -> Self {
        Self {
            ms: Cell::new(start_ms),
        }
    }

    pub fn advance(&self, delta_ms: u64) {
        self.ms.set(self.ms.get() + delta_ms);
    }

    pub fn set(&self, ms: u64) {
        self.ms.set(ms);
    }
}

impl Clock for SimClock {
    fn now_ms(&self) -> u64 {
        self.ms.get()
    }
}

// === SimTimers ===

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SimTimer {
    delay: Duration,
    periodic: bool,
}

/// Timer host that records armed timers without any real scheduling.
///
/// Tests fire a timer by calling the owning component's timer entry point
/// with the armed id; components clear consumed one-shots themselves, so
/// `active_timers` stays exact.
pub struct SimTimers {
    next: Cell<TimerId>,
    armed: RefCell<BTreeMap<TimerId, SimTimer>>,
}

impl SimTimers {
    pub fn new() -> Self {
        Self {
            next: Cell::new(1),
            armed: RefCell::new(BTreeMap::new()),
        }
    }

    fn arm(&self, delay: Duration, periodic: bool) -> TimerId {
        let id = self.next.get();
        self.next.set(id + 1);
        self.armed
            .borrow_mut()
            .insert(id, SimTimer { delay, periodic });
        id
    }

    pub fn is_armed(&self, id: TimerId) -> bool {
        self.armed.borrow().contains_key(&id)
    }

    pub fn delay_of(&self, id: TimerId) -> Option<Duration> {
        self.armed.borrow().get(&id).map(|t| t.delay)
    }

    pub fn armed_intervals(&self) -> usize {
        self.armed.borrow().values().filter(|t| t.periodic).count()
    }

    pub fn armed_oneshots(&self) -> usize {
        self.armed.borrow().values().filter(|t| !t.periodic).count()
    }
}

impl Default for SimTimers {
    fn default() -> Self {
        Self::new()
    }
}

impl TimerHost for SimTimers {
    fn set_timeout(&self, delay: Duration) -> TimerId {
        self.arm(delay, false)
    }

    fn set_interval(&self, period: Duration) -> TimerId {
        self.arm(period, true)
    }

    fn clear(&self, id: TimerId) {
        self.armed.borrow_mut().remove(&id);
    }

    fn active_timers(&self) -> usize {
        self.armed.borrow().len()
    }
}

// === SimTabHost ===

/// A change applied through the tab host, recorded for assertions.
#[derive(Debug, Clone, PartialEq)]
pub enum TabHostOp {
    FocusWindow(WindowId),
    ActivateTab(TabId),
    OpenTab(String),
    SetWindowState(WindowId, WindowState),
}

struct SimWindow {
    state: WindowState,
    active_tab: Option<TabId>,
}

/// Tab/window host over a small in-memory window model.
pub struct SimTabHost {
    next_window: Cell<u32>,
    next_tab: Cell<u32>,
    windows: RefCell<BTreeMap<WindowId, SimWindow>>,
    tabs: RefCell<Vec<TabSnapshot>>,
    focused_window: Cell<Option<WindowId>>,
    page_actions: RefCell<HashSet<TabId>>,
    ops: RefCell<Vec<TabHostOp>>,
}

impl SimTabHost {
    pub fn new() -> Self {
        Self {
            next_window: Cell::new(1),
            next_tab: Cell::new(1),
            windows: RefCell::new(BTreeMap::new()),
            tabs: RefCell::new(Vec::new()),
            focused_window: Cell::new(None),
            page_actions: RefCell::new(HashSet::new()),
            ops: RefCell::new(Vec::new()),
        }
    }

    pub fn add_window(&self, state: WindowState) -> WindowId {
        let id = WindowId(self.next_window.get());
        self.next_window.set(id.0 + 1);
        self.windows.borrow_mut().insert(
            id,
            SimWindow {
                state,
                active_tab: None,
            },
        );
        if self.focused_window.get().is_none() {
            self.focused_window.set(Some(id));
        }
        id
    }

    pub fn add_tab(&self, window: WindowId, url: &str, title: &str) -> TabId {
        let id = TabId(self.next_tab.get());
        self.next_tab.set(id.0 + 1);
        self.tabs.borrow_mut().push(TabSnapshot {
            id,
            window,
            url: url.to_string(),
            title: title.to_string(),
        });
        let mut windows = self.windows.borrow_mut();
        if let Some(w) = windows.get_mut(&window) {
            if w.active_tab.is_none() {
                w.active_tab = Some(id);
            }
        }
        id
    }

    pub fn remove_tab(&self, tab: TabId) {
        self.tabs.borrow_mut().retain(|t| t.id != tab);
        for w in self.windows.borrow_mut().values_mut() {
            if w.active_tab == Some(tab) {
                w.active_tab = None;
            }
        }
    }

    /// The active tab and window pair currently holding focus.
    pub fn focused_pair(&self) -> Option<(TabId, WindowId)> {
        let window = self.focused_window.get()?;
        let tab = self.windows.borrow().get(&window)?.active_tab?;
        Some((tab, window))
    }

    pub fn page_action_shown(&self, tab: TabId) -> bool {
        self.page_actions.borrow().contains(&tab)
    }

    pub fn ops(&self) -> Vec<TabHostOp> {
        self.ops.borrow().clone()
    }
}

impl Default for SimTabHost {
    fn default() -> Self {
        Self::new()
    }
}

impl TabHost for SimTabHost {
    fn query_tabs(&self) -> Vec<TabSnapshot> {
        self.tabs.borrow().clone()
    }

    fn focused_tab(&self) -> Option<TabSnapshot> {
        let (tab, _) = self.focused_pair()?;
        self.tabs.borrow().iter().find(|t| t.id == tab).cloned()
    }

    fn focus_window(&self, window: WindowId) -> Result<(), PlatformError> {
        if !self.windows.borrow().contains_key(&window) {
            return Err(PlatformError::WindowGone(window.0.to_string()));
        }
        self.focused_window.set(Some(window));
        self.ops.borrow_mut().push(TabHostOp::FocusWindow(window));
        Ok(())
    }

    fn activate_tab(&self, tab: TabId) -> Result<(), PlatformError> {
        let window = self
            .tabs
            .borrow()
            .iter()
            .find(|t| t.id == tab)
            .map(|t| t.window)
            .ok_or_else(|| PlatformError::TabGone(tab.0.to_string()))?;
        if let Some(w) = self.windows.borrow_mut().get_mut(&window) {
            w.active_tab = Some(tab);
        }
        self.ops.borrow_mut().push(TabHostOp::ActivateTab(tab));
        Ok(())
    }

    fn open_tab(&self, url: &str) -> Result<TabId, PlatformError> {
        let window = match self.focused_window.get() {
            Some(w) => w,
            None => self.add_window(WindowState::Normal),
        };
        let id = self.add_tab(window, url, url);
        self.ops.borrow_mut().push(TabHostOp::OpenTab(url.to_string()));
        Ok(id)
    }

    fn window_state(&self, window: WindowId) -> Result<WindowState, PlatformError> {
        self.windows
            .borrow()
            .get(&window)
            .map(|w| w.state)
            .ok_or_else(|| PlatformError::WindowGone(window.0.to_string()))
    }

    fn set_window_state(
        &self,
        window: WindowId,
        state: WindowState,
    ) -> Result<(), PlatformError> {
        let mut windows = self.windows.borrow_mut();
        let w = windows
            .get_mut(&window)
            .ok_or_else(|| PlatformError::WindowGone(window.0.to_string()))?;
        w.state = state;
        self.ops
            .borrow_mut()
            .push(TabHostOp::SetWindowState(window, state));
        Ok(())
    }

    fn show_page_action(&self, tab: TabId) {
        self.page_actions.borrow_mut().insert(tab);
    }
}

// === SimIdleHost ===

/// Idle host that records the configured detection threshold.
pub struct SimIdleHost {
    threshold: Cell<Option<Duration>>,
}

impl SimIdleHost {
    pub fn new() -> Self {
        Self {
            threshold: Cell::new(None),
        }
    }

    /// The last threshold applied, if any.
    pub fn threshold(&self) -> Option<Duration> {
        self.threshold.get()
    }
}

impl Default for SimIdleHost {
    fn default() -> Self {
        Self::new()
    }
}

impl IdleHost for SimIdleHost {
    fn set_detection_threshold(&self, threshold: Duration) {
        self.threshold.set(Some(threshold));
    }
}

// === SimNotificationHost ===

/// A notification accepted by the host.
#[derive(Debug, Clone, PartialEq)]
pub struct ShownNotification {
    pub id: NotificationId,
    pub title: String,
    pub body: String,
    pub event_time_ms: u64,
}

/// Notification host that records shown notifications.
pub struct SimNotificationHost {
    shown: RefCell<Vec<ShownNotification>>,
    fail_next: Cell<bool>,
}

impl SimNotificationHost {
    pub fn new() -> Self {
        Self {
            shown: RefCell::new(Vec::new()),
            fail_next: Cell::new(false),
        }
    }

    /// Make the next `show` call fail, like a rejected platform request.
    pub fn fail_next(&self) {
        self.fail_next.set(true);
    }

    pub fn shown(&self) -> Vec<ShownNotification> {
        self.shown.borrow().clone()
    }

    pub fn last_id(&self) -> Option<NotificationId> {
        self.shown.borrow().last().map(|n| n.id.clone())
    }
}

impl Default for SimNotificationHost {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationHost for SimNotificationHost {
    fn show(
        &self,
        title: &str,
        body: &str,
        event_time_ms: u64,
    ) -> Result<NotificationId, PlatformError> {
        if self.fail_next.replace(false) {
            return Err(PlatformError::NotificationFailed(
                "rejected by host".to_string(),
            ));
        }
        let id = NotificationId(Uuid::new_v4().to_string());
        self.shown.borrow_mut().push(ShownNotification {
            id: id.clone(),
            title: title.to_string(),
            body: body.to_string(),
            event_time_ms,
        });
        Ok(id)
    }
}

// === SimNotebook ===

/// A click delivered to the simulated page, recorded for assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeAction {
    DialogCancel,
    DialogAccept,
    Run,
    Connect,
    DismissCaptcha,
}

struct SimDialog {
    controls: DialogControls,
    clicks_to_close: u32,
}

/// Scriptable notebook page standing in for the real DOM probe.
pub struct SimNotebook {
    title: RefCell<String>,
    dialog: RefCell<Option<SimDialog>>,
    run: Cell<Option<RunControlState>>,
    connect: Cell<Option<RunControlState>>,
    captcha: Cell<bool>,
    actions: RefCell<Vec<ProbeAction>>,
}

impl SimNotebook {
    /// A healthy page: both controls present and ready, no dialog, no captcha.
    pub fn new(title: &str) -> Self {
        Self {
            title: RefCell::new(title.to_string()),
            dialog: RefCell::new(None),
            run: Cell::new(Some(RunControlState::Ready)),
            connect: Cell::new(Some(RunControlState::Ready)),
            captcha: Cell::new(false),
            actions: RefCell::new(Vec::new()),
        }
    }

    /// Show a failure dialog that closes after `clicks_to_close` clicks.
    pub fn show_dialog(&self, controls: DialogControls, clicks_to_close: u32) {
        *self.dialog.borrow_mut() = Some(SimDialog {
            controls,
            clicks_to_close,
        });
    }

    pub fn clear_dialog(&self) {
        *self.dialog.borrow_mut() = None;
    }

    /// Script the run control state; `None` removes the control entirely.
    pub fn set_run(&self, state: Option<RunControlState>) {
        self.run.set(state);
    }

    /// Script the connect control state; `None` removes the control entirely.
    pub fn set_connect(&self, state: Option<RunControlState>) {
        self.connect.set(state);
    }

    pub fn set_captcha(&self, present: bool) {
        self.captcha.set(present);
    }

    pub fn actions(&self) -> Vec<ProbeAction> {
        self.actions.borrow().clone()
    }
}

impl NotebookProbe for SimNotebook {
    fn title(&self) -> String {
        self.title.borrow().clone()
    }

    fn dialog(&self) -> Option<DialogControls> {
        self.dialog.borrow().as_ref().map(|d| d.controls)
    }

    fn click_dialog(&self, choice: DialogChoice) -> Result<(), ProbeError> {
        let mut dialog = self.dialog.borrow_mut();
        let d = dialog
            .as_mut()
            .ok_or_else(|| ProbeError::ElementMissing("dialog".to_string()))?;
        self.actions.borrow_mut().push(match choice {
            DialogChoice::Cancel => ProbeAction::DialogCancel,
            DialogChoice::Accept => ProbeAction::DialogAccept,
        });
        d.clicks_to_close = d.clicks_to_close.saturating_sub(1);
        if d.clicks_to_close == 0 {
            *dialog = None;
        }
        Ok(())
    }

    fn run_control(&self) -> Result<RunControlState, ProbeError> {
        self.run
            .get()
            .ok_or_else(|| ProbeError::ElementMissing("run button".to_string()))
    }

    fn connect_control(&self) -> Result<RunControlState, ProbeError> {
        self.connect
            .get()
            .ok_or_else(|| ProbeError::ElementMissing("connect button".to_string()))
    }

    fn click_run(&self) -> Result<(), ProbeError> {
        if self.run.get().is_none() {
            return Err(ProbeError::ElementMissing("run button".to_string()));
        }
        self.actions.borrow_mut().push(ProbeAction::Run);
        Ok(())
    }

    fn click_connect(&self) -> Result<(), ProbeError> {
        if self.connect.get().is_none() {
            return Err(ProbeError::ElementMissing("connect button".to_string()));
        }
        self.actions.borrow_mut().push(ProbeAction::Connect);
        Ok(())
    }

    fn captcha_present(&self) -> bool {
        self.captcha.get()
    }

    fn dismiss_captcha(&self) -> Result<(), ProbeError> {
        self.captcha.set(false);
        self.actions.borrow_mut().push(ProbeAction::DismissCaptcha);
        Ok(())
    }
}
