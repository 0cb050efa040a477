//! Idle-triggered rotation of focus among registered notebook tabs.
//!
//! Focus is a shared resource borrowed from the user: the manager snapshots
//! the focused tab/window before the first step and guarantees restoring it
//! when the user returns. Cross-window steps additionally snapshot the
//! departing window's state so minimized/maximized windows come back as they
//! were.

use std::time::Duration;

use crate::managers::tab_registry::{RotationCursor, TabRegistry};
use crate::platform::{TabHost, TimerHost, TimerId};
use crate::types::config::RotationSettings;
use crate::types::status::{TabId, WindowId, WindowState};

/// Focus state captured before rotation touched it.
#[derive(Debug, Clone, Copy, PartialEq)]
struct FocusSnapshot {
    tab: TabId,
    window: WindowId,
    state: WindowState,
}

struct ActiveRotation {
    timer: TimerId,
    baseline: FocusSnapshot,
    /// Window of the most recent rotation target.
    last_window: WindowId,
    /// State of the window most recently departed on a cross-window step.
    departed: Option<(WindowId, WindowState)>,
}

/// Rotation scheduler owned by the Coordinator.
pub struct RotationManager {
    timers: Box<dyn TimerHost>,
    cursor: RotationCursor,
    active: Option<ActiveRotation>,
}

impl RotationManager {
    pub fn new(timers: Box<dyn TimerHost>) -> Self {
        Self {
            timers,
            cursor: RotationCursor::new(),
            active: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Reset the cursor after any registry mutation.
    pub fn registry_changed(&mut self) {
        self.cursor.invalidate();
    }

    /// Begin rotating if the user just went idle and rotation is eligible:
    /// enabled, not already active, a non-empty registry, and the focused
    /// window not in full-screen (so presentations are left alone).
    pub fn start_if_eligible(
        &mut self,
        settings: &RotationSettings,
        registry: &TabRegistry,
        tabs: &dyn TabHost,
    ) {
        if !settings.rotate_on_idle || self.active.is_some() || registry.is_empty() {
            return;
        }
        let focused = match tabs.focused_tab() {
            Some(t) => t,
            None => {
                log::debug!("no focused tab to rotate from");
                return;
            }
        };
        let state = match tabs.window_state(focused.window) {
            Ok(s) => s,
            Err(e) => {
                log::warn!("cannot read focused window state: {}", e);
                return;
            }
        };
        if state == WindowState::Fullscreen {
            log::info!("focused window is full-screen, not rotating");
            return;
        }

        let timer = self
            .timers
            .set_interval(Duration::from_secs(settings.period_mins * 60));
        self.active = Some(ActiveRotation {
            timer,
            baseline: FocusSnapshot {
                tab: focused.id,
                window: focused.window,
                state,
            },
            last_window: focused.window,
            departed: None,
        });
        log::info!("rotation started over {} tabs", registry.len());
        self.step(registry, tabs);
    }

    /// Periodic rotation tick. Stale ids (a tick queued behind the stop)
    /// are ignored, and an in-flight stop wins over the tick.
    pub fn handle_timer(&mut self, id: TimerId, registry: &TabRegistry, tabs: &dyn TabHost) {
        match &self.active {
            Some(act) if act.timer == id => self.step(registry, tabs),
            _ => log::debug!("ignoring stale rotation timer {}", id),
        }
    }

    /// Advance focus to the next registered tab, wrapping over the live set.
    /// A no-op when the registry is empty; a vanished target is logged and
    /// left for the next tick.
    pub fn step(&mut self, registry: &TabRegistry, tabs: &dyn TabHost) {
        let act = match self.active.as_mut() {
            Some(a) => a,
            None => return,
        };
        let target = match self.cursor.advance(registry) {
            Some(t) => t,
            None => {
                log::debug!("rotation step with empty registry");
                return;
            }
        };
        if target.window != act.last_window {
            match tabs.window_state(act.last_window) {
                Ok(state) => act.departed = Some((act.last_window, state)),
                Err(e) => log::debug!("departing window snapshot failed: {}", e),
            }
            if let Err(e) = tabs.focus_window(target.window) {
                log::warn!("rotation could not focus window: {}", e);
                return;
            }
            act.last_window = target.window;
        }
        if let Err(e) = tabs.activate_tab(target.id) {
            log::warn!("rotation could not activate tab: {}", e);
        }
    }

    /// The user is active again: cancel the timer and return the borrowed
    /// focus — departed window state first, then the pre-idle window's
    /// state, focus, and active tab.
    pub fn stop_and_restore(&mut self, tabs: &dyn TabHost) {
        let act = match self.active.take() {
            Some(a) => a,
            None => return,
        };
        self.timers.clear(act.timer);
        self.cursor.invalidate();

        if let Some((window, state)) = act.departed {
            if let Err(e) = tabs.set_window_state(window, state) {
                log::debug!("could not restore departed window: {}", e);
            }
        }
        if let Err(e) = tabs.set_window_state(act.baseline.window, act.baseline.state) {
            log::debug!("could not restore prior window state: {}", e);
        }
        if let Err(e) = tabs.focus_window(act.baseline.window) {
            log::warn!("could not restore prior window focus: {}", e);
        }
        if let Err(e) = tabs.activate_tab(act.baseline.tab) {
            log::warn!("could not restore prior tab: {}", e);
        }
        log::info!("rotation stopped, prior focus restored");
    }

    #[cfg(test)]
    pub(crate) fn active_timer(&self) -> Option<TimerId> {
        self.active.as_ref().map(|a| a.timer)
    }
}
