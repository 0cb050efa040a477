// SessionKeeper Status View
// The popup-side component: pulls one status snapshot from the active tab's
// agent when opened, receives pushes while open, and keeps a whole-second
// stopwatch running without cumulative drift.

use std::time::Duration;

use crate::platform::{Clock, TimerHost, TimerId};
use crate::types::format::format_duration;
use crate::types::messages::ViewCommand;
use crate::types::status::{ConnectionStatus, StatusSnapshot};

/// Overrun threshold for the stopwatch marker, in seconds.
const OVERRUN_SECS: u64 = 12 * 3600;

/// What the popup renders. The markup itself lives in the host; this is the
/// text it binds.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ViewModel {
    pub status_line: String,
    pub since_line: String,
    pub stopwatch_line: String,
    /// Whether the detail table is visible at all.
    pub show_details: bool,
}

/// Trait defining the status view interface.
pub trait StatusViewTrait {
    fn open(&mut self, automated_tab_active: bool) -> Option<ViewCommand>;
    fn status_received(&mut self, snapshot: StatusSnapshot);
    fn handle_timer(&mut self, id: TimerId) -> bool;
    fn toggle_enabled(&mut self, enable: bool) -> Option<ViewCommand>;
    fn close(&mut self);
    fn model(&self) -> &ViewModel;
}

/// Status view implementation.
///
/// Pull-then-push: `open` issues at most one status request; every later
/// render comes from pushed snapshots. The stopwatch is a chain of one-shots
/// aligned to the next whole second, so the display never drifts no matter
/// how long the popup stays open.
pub struct StatusView {
    timers: Box<dyn TimerHost>,
    clock: Box<dyn Clock>,
    anchor: Option<StatusSnapshot>,
    tick: Option<TimerId>,
    model: ViewModel,
    has_agent: bool,
}

impl StatusView {
    pub fn new(timers: Box<dyn TimerHost>, clock: Box<dyn Clock>) -> Self {
        Self {
            timers,
            clock,
            anchor: None,
            tick: None,
            model: ViewModel::default(),
            has_agent: false,
        }
    }

    fn cancel_tick(&mut self) {
        if let Some(id) = self.tick.take() {
            self.timers.clear(id);
        }
    }

    /// Arm the next stopwatch tick at the next whole-second boundary.
    fn arm_tick(&mut self) {
        let now = self.clock.now_ms();
        let delay = 1000 - now % 1000;
        self.tick = Some(self.timers.set_timeout(Duration::from_millis(delay)));
    }

    fn stopwatch_text(&self, snapshot: &StatusSnapshot) -> String {
        let time = match snapshot.last_transition_ms {
            Some(t) => t,
            None => return String::new(),
        };
        let now = self.clock.now_ms();
        let secs = (now / 1000).saturating_sub(time / 1000);
        if secs == 0 {
            return String::new();
        }
        let overrun = snapshot.connection == ConnectionStatus::Connected && secs >= OVERRUN_SECS;
        format!(
            "{}{}",
            if overrun { "‼️ " } else { "" },
            format_duration(secs)
        )
    }

    fn render(&mut self, snapshot: &StatusSnapshot) {
        if !snapshot.enabled {
            self.model = ViewModel::default();
            return;
        }
        let (up, down) = if snapshot.auto_run {
            ("Running", "Stopped")
        } else {
            ("Connected", "Disconnected")
        };
        let status_line = match snapshot.last_transition_ms {
            Some(_) => match snapshot.connection {
                ConnectionStatus::Connected => format!("▶️ {}", up),
                _ => format!("⏹️ {}", down),
            },
            None => "❓ Unknown".to_string(),
        };
        let since_line = match snapshot.last_transition_ms {
            Some(time) => {
                let secs = (self.clock.now_ms() / 1000).saturating_sub(time / 1000);
                if secs == 0 {
                    "just now".to_string()
                } else {
                    format!("{} ago", format_duration(secs))
                }
            }
            None => String::new(),
        };
        self.model = ViewModel {
            status_line,
            since_line,
            stopwatch_line: self.stopwatch_text(snapshot),
            show_details: true,
        };
    }
}

impl StatusViewTrait for StatusView {
    /// The popup opened. With an automated tab active it renders the loading
    /// state and pulls one snapshot; otherwise it renders the no-data state
    /// and issues nothing.
    fn open(&mut self, automated_tab_active: bool) -> Option<ViewCommand> {
        self.cancel_tick();
        self.anchor = None;
        self.has_agent = automated_tab_active;
        if automated_tab_active {
            self.model = ViewModel {
                status_line: "Loading…".to_string(),
                show_details: true,
                ..ViewModel::default()
            };
            Some(ViewCommand::RequestStatus)
        } else {
            self.model = ViewModel::default();
            None
        }
    }

    /// A pushed snapshot replaces the render anchor entirely.
    fn status_received(&mut self, snapshot: StatusSnapshot) {
        self.cancel_tick();
        self.render(&snapshot);
        let run_stopwatch = snapshot.enabled && snapshot.last_transition_ms.is_some();
        self.anchor = Some(snapshot);
        if run_stopwatch {
            self.arm_tick();
        }
    }

    /// Stopwatch tick: recompute the elapsed text locally and re-arm.
    /// Returns whether the id matched the armed tick.
    fn handle_timer(&mut self, id: TimerId) -> bool {
        if self.tick != Some(id) {
            log::debug!("ignoring stale stopwatch timer {}", id);
            return false;
        }
        self.timers.clear(id);
        self.tick = None;
        if let Some(snapshot) = self.anchor.clone() {
            self.model.stopwatch_line = self.stopwatch_text(&snapshot);
            self.arm_tick();
        }
        true
    }

    /// The enable checkbox changed. Forwards `Start`/`Stop` to the agent and
    /// flips to the waiting/hidden rendering until the next push.
    fn toggle_enabled(&mut self, enable: bool) -> Option<ViewCommand> {
        if !self.has_agent {
            return None;
        }
        if enable {
            self.model = ViewModel {
                status_line: "Waiting…".to_string(),
                show_details: true,
                ..ViewModel::default()
            };
            Some(ViewCommand::Start)
        } else {
            self.cancel_tick();
            self.anchor = None;
            self.model = ViewModel::default();
            Some(ViewCommand::Stop)
        }
    }

    /// The popup closed; nothing may stay armed.
    fn close(&mut self) {
        self.cancel_tick();
        self.anchor = None;
        self.has_agent = false;
    }

    fn model(&self) -> &ViewModel {
        &self.model
    }
}
