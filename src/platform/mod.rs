// SessionKeeper platform abstraction
// The capability contract the core components consume: clocks, timers,
// tabs/windows, notifications, and the notebook page probe. Production
// implementations live in the host embedding; `sim` provides in-process
// implementations for tests and the demo binary.
//
// Also provides platform-specific config/data paths, selected with
// `cfg(target_os)` at compile time.
//
// Host objects are shared handles: trait methods take `&self` and
// implementations use interior mutability, so a component can hold a boxed
// host while tests keep a second handle to the same instance.

use std::path::PathBuf;
use std::rc::Rc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::types::errors::{PlatformError, ProbeError};
use crate::types::status::{NotificationId, TabId, TabSnapshot, WindowId, WindowState};

pub mod sim;

#[cfg(target_os = "linux")]
mod linux;

#[cfg(target_os = "macos")]
mod macos;

#[cfg(target_os = "windows")]
mod windows;

/// Identifier of an armed timer, unique per `TimerHost` instance.
pub type TimerId = u64;

/// Wall-clock time source.
pub trait Clock {
    /// Milliseconds since the Unix epoch.
    fn now_ms(&self) -> u64;
}

/// System wall clock.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }
}

/// One-shot and periodic timer scheduling.
///
/// Fired timers are delivered back into the owning component's event entry
/// point by the runtime. A fire that was already queued when `clear` ran may
/// still be delivered; components ignore it by id mismatch. Components also
/// `clear` a one-shot id when they consume its fire, so `active_timers`
/// counts exactly the timers that can still fire.
pub trait TimerHost {
    fn set_timeout(&self, delay: Duration) -> TimerId;
    fn set_interval(&self, period: Duration) -> TimerId;
    fn clear(&self, id: TimerId);
    fn active_timers(&self) -> usize;
}

/// Tab and window manipulation.
pub trait TabHost {
    fn query_tabs(&self) -> Vec<TabSnapshot>;
    /// The active tab of the focused window, if any.
    fn focused_tab(&self) -> Option<TabSnapshot>;
    fn focus_window(&self, window: WindowId) -> Result<(), PlatformError>;
    fn activate_tab(&self, tab: TabId) -> Result<(), PlatformError>;
    fn open_tab(&self, url: &str) -> Result<TabId, PlatformError>;
    fn window_state(&self, window: WindowId) -> Result<WindowState, PlatformError>;
    fn set_window_state(&self, window: WindowId, state: WindowState)
        -> Result<(), PlatformError>;
    /// Show this extension's per-tab action indicator.
    fn show_page_action(&self, tab: TabId);
}

/// System idle detection.
///
/// Idle/active transitions arrive as runtime events; the host only needs to
/// be told how much inactivity counts as idle.
pub trait IdleHost {
    /// Seconds of inactivity before an `Idle` transition is reported.
    fn set_detection_threshold(&self, threshold: Duration);
}

/// Desktop notification display.
pub trait NotificationHost {
    fn show(
        &self,
        title: &str,
        body: &str,
        event_time_ms: u64,
    ) -> Result<NotificationId, PlatformError>;
}

/// Controls found on a connection-failure dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialogControls {
    /// A cancel control is present (takes priority when dismissing).
    pub has_cancel: bool,
    /// The confirm control continues in a degraded, runtime-less mode.
    pub degraded: bool,
}

/// Which dialog control to click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogChoice {
    Cancel,
    Accept,
}

/// Reported state of the run/connect affordance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunControlState {
    /// Clickable; nothing in flight.
    Ready,
    Queued,
    Executing,
    Interrupting,
    /// The connect control reports an established session.
    AlreadyConnected,
}

/// The page-specific DOM collaborator a PageAgent drives.
///
/// The selectors and heuristics behind these calls are the fragile,
/// page-specific part and live entirely in the implementation.
pub trait NotebookProbe {
    fn title(&self) -> String;
    /// The connection-failure dialog currently on screen, if any.
    fn dialog(&self) -> Option<DialogControls>;
    /// Click one control of the current dialog once.
    fn click_dialog(&self, choice: DialogChoice) -> Result<(), ProbeError>;
    /// State of the run-first-cell control.
    fn run_control(&self) -> Result<RunControlState, ProbeError>;
    /// State of the connect control.
    fn connect_control(&self) -> Result<RunControlState, ProbeError>;
    fn click_run(&self) -> Result<(), ProbeError>;
    fn click_connect(&self) -> Result<(), ProbeError>;
    fn captcha_present(&self) -> bool;
    fn dismiss_captcha(&self) -> Result<(), ProbeError>;
}

impl<T: Clock + ?Sized> Clock for Rc<T> {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }
}

impl<T: TimerHost + ?Sized> TimerHost for Rc<T> {
    fn set_timeout(&self, delay: Duration) -> TimerId {
        (**self).set_timeout(delay)
    }
    fn set_interval(&self, period: Duration) -> TimerId {
        (**self).set_interval(period)
    }
    fn clear(&self, id: TimerId) {
        (**self).clear(id)
    }
    fn active_timers(&self) -> usize {
        (**self).active_timers()
    }
}

impl<T: TabHost + ?Sized> TabHost for Rc<T> {
    fn query_tabs(&self) -> Vec<TabSnapshot> {
        (**self).query_tabs()
    }
    fn focused_tab(&self) -> Option<TabSnapshot> {
        (**self).focused_tab()
    }
    fn focus_window(&self, window: WindowId) -> Result<(), PlatformError> {
        (**self).focus_window(window)
    }
    fn activate_tab(&self, tab: TabId) -> Result<(), PlatformError> {
        (**self).activate_tab(tab)
    }
    fn open_tab(&self, url: &str) -> Result<TabId, PlatformError> {
        (**self).open_tab(url)
    }
    fn window_state(&self, window: WindowId) -> Result<WindowState, PlatformError> {
        (**self).window_state(window)
    }
    fn set_window_state(
        &self,
        window: WindowId,
        state: WindowState,
    ) -> Result<(), PlatformError> {
        (**self).set_window_state(window, state)
    }
    fn show_page_action(&self, tab: TabId) {
        (**self).show_page_action(tab)
    }
}

impl<T: IdleHost + ?Sized> IdleHost for Rc<T> {
    fn set_detection_threshold(&self, threshold: Duration) {
        (**self).set_detection_threshold(threshold)
    }
}

impl<T: NotificationHost + ?Sized> NotificationHost for Rc<T> {
    fn show(
        &self,
        title: &str,
        body: &str,
        event_time_ms: u64,
    ) -> Result<NotificationId, PlatformError> {
        (**self).show(title, body, event_time_ms)
    }
}

impl<T: NotebookProbe + ?Sized> NotebookProbe for Rc<T> {
    fn title(&self) -> String {
        (**self).title()
    }
    fn dialog(&self) -> Option<DialogControls> {
        (**self).dialog()
    }
    fn click_dialog(&self, choice: DialogChoice) -> Result<(), ProbeError> {
        (**self).click_dialog(choice)
    }
    fn run_control(&self) -> Result<RunControlState, ProbeError> {
        (**self).run_control()
    }
    fn connect_control(&self) -> Result<RunControlState, ProbeError> {
        (**self).connect_control()
    }
    fn click_run(&self) -> Result<(), ProbeError> {
        (**self).click_run()
    }
    fn click_connect(&self) -> Result<(), ProbeError> {
        (**self).click_connect()
    }
    fn captcha_present(&self) -> bool {
        (**self).captcha_present()
    }
    fn dismiss_captcha(&self) -> Result<(), ProbeError> {
        (**self).dismiss_captcha()
    }
}

/// Returns the platform-specific configuration directory for SessionKeeper.
///
/// - **Linux**: `~/.config/sessionkeeper` (or `$XDG_CONFIG_HOME/sessionkeeper`)
/// - **macOS**: `~/Library/Application Support/SessionKeeper`
/// - **Windows**: `%APPDATA%/SessionKeeper`
pub fn get_config_dir() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        linux::get_config_dir()
    }
    #[cfg(target_os = "macos")]
    {
        macos::get_config_dir()
    }
    #[cfg(target_os = "windows")]
    {
        windows::get_config_dir()
    }
}

/// Returns the platform-specific data directory for SessionKeeper.
///
/// - **Linux**: `~/.local/share/sessionkeeper` (or `$XDG_DATA_HOME/sessionkeeper`)
/// - **macOS**: `~/Library/Application Support/SessionKeeper`
/// - **Windows**: `%APPDATA%/SessionKeeper`
pub fn get_data_dir() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        linux::get_data_dir()
    }
    #[cfg(target_os = "macos")]
    {
        macos::get_data_dir()
    }
    #[cfg(target_os = "windows")]
    {
        windows::get_data_dir()
    }
}
