// SessionKeeper Page Agent
// The per-tab automation state machine: probes the notebook page on a periodic
// retry timer, clicks the run/connect control when it is ready, verifies the
// outcome after a delay, and reports connection transitions as notification
// requests and status pushes.

use std::time::Duration;

use crate::platform::{
    Clock, DialogChoice, DialogControls, NotebookProbe, RunControlState, TimerHost, TimerId,
};
use crate::types::config::KeeperConfig;
use crate::types::format::format_duration;
use crate::types::messages::{AgentCommand, AgentEvent, NotifyRequest};
use crate::types::status::{ConnectionStatus, Phase, StatusSnapshot};

/// How many times a dialog control is clicked while the dialog keeps
/// reappearing before giving up.
const MAX_DISMISS_CLICKS: usize = 10;

/// What an armed one-shot timer will do when it fires.
#[derive(Debug, Clone, Copy, PartialEq)]
enum OneShot {
    /// First automation pass after the configuration snapshot arrived.
    FirstPass,
    /// Re-arm after a configuration push or an online event.
    Restart,
    /// Delayed verification of a control click.
    Verify { clicked_at_ms: u64 },
}

/// Trait defining the page agent interface.
pub trait PageAgentTrait {
    fn handle_command(&mut self, command: AgentCommand) -> Vec<AgentEvent>;
    fn config_received(&mut self, config: KeeperConfig) -> Vec<AgentEvent>;
    fn handle_timer(&mut self, id: TimerId) -> Vec<AgentEvent>;
    fn snapshot(&self) -> StatusSnapshot;
}

/// Page agent implementation driving one notebook tab.
///
/// All methods are synchronous; outbound messages are returned for the caller
/// (the runtime) to route. At most one periodic timer and one one-shot are
/// armed at any time, and none while disabled.
pub struct PageAgent {
    probe: Box<dyn NotebookProbe>,
    timers: Box<dyn TimerHost>,
    clock: Box<dyn Clock>,
    config: Option<KeeperConfig>,
    enabled: bool,
    phase: Phase,
    connection: ConnectionStatus,
    last_transition_ms: Option<u64>,
    captcha_flagged: bool,
    retry_timer: Option<TimerId>,
    pending: Option<(TimerId, OneShot)>,
}

impl PageAgent {
    /// Creates a new PageAgent. Automation starts enabled; nothing runs until
    /// the configuration snapshot arrives via `config_received`.
    pub fn new(
        probe: Box<dyn NotebookProbe>,
        timers: Box<dyn TimerHost>,
        clock: Box<dyn Clock>,
    ) -> Self {
        Self {
            probe,
            timers,
            clock,
            config: None,
            enabled: true,
            phase: Phase::Idle,
            connection: ConnectionStatus::Unknown,
            last_transition_ms: None,
            captcha_flagged: false,
            retry_timer: None,
            pending: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn connection(&self) -> ConnectionStatus {
        self.connection
    }

    pub fn captcha_flagged(&self) -> bool {
        self.captcha_flagged
    }

    fn auto_run(&self) -> bool {
        self.config
            .as_ref()
            .map(|c| c.automation.auto_run_first_cell)
            .unwrap_or(false)
    }

    fn retry_secs(&self) -> u64 {
        self.config
            .as_ref()
            .map(|c| c.automation.retry_interval_secs)
            .unwrap_or(60)
    }

    fn cancel_all_timers(&mut self) {
        if let Some(id) = self.retry_timer.take() {
            self.timers.clear(id);
        }
        if let Some((id, _)) = self.pending.take() {
            self.timers.clear(id);
        }
    }

    fn arm_one_shot(&mut self, delay_secs: u64, kind: OneShot) {
        if let Some((id, _)) = self.pending.take() {
            self.timers.clear(id);
        }
        let id = self.timers.set_timeout(Duration::from_secs(delay_secs));
        self.pending = Some((id, kind));
    }

    /// Arm the periodic retry timer and perform an immediate probe pass.
    fn begin_cycle(&mut self) -> Vec<AgentEvent> {
        if self.retry_timer.is_none() {
            let id = self
                .timers
                .set_interval(Duration::from_secs(self.retry_secs()));
            self.retry_timer = Some(id);
        }
        self.phase = Phase::WaitingRetry;
        self.probe_pass()
    }

    fn start(&mut self) -> Vec<AgentEvent> {
        if self.enabled {
            log::error!("automation already started");
            return Vec::new();
        }
        self.enabled = true;
        log::info!("automation started");
        let mut events = match self.config {
            Some(_) => self.begin_cycle(),
            None => Vec::new(),
        };
        events.push(AgentEvent::StatusPush(self.snapshot()));
        events
    }

    fn stop(&mut self) -> Vec<AgentEvent> {
        if !self.enabled {
            log::error!("automation already stopped");
            return Vec::new();
        }
        self.cancel_all_timers();
        self.enabled = false;
        self.phase = Phase::Idle;
        log::info!("automation stopped");
        vec![AgentEvent::StatusPush(self.snapshot())]
    }

    fn config_pushed(&mut self, config: KeeperConfig) -> Vec<AgentEvent> {
        self.config = Some(config);
        self.cancel_all_timers();
        self.phase = Phase::Idle;
        if self.enabled {
            let delay = self
                .config
                .as_ref()
                .map(|c| c.automation.restart_delay_secs)
                .unwrap_or(10);
            self.arm_one_shot(delay, OneShot::Restart);
            log::info!("configuration changed, restarting in {}s", delay);
        }
        Vec::new()
    }

    fn network_offline(&mut self) -> Vec<AgentEvent> {
        self.cancel_all_timers();
        self.phase = Phase::Idle;
        log::info!("network offline, automation paused");
        Vec::new()
    }

    fn network_online(&mut self) -> Vec<AgentEvent> {
        if !self.enabled || self.config.is_none() {
            return Vec::new();
        }
        self.cancel_all_timers();
        let delay = self
            .config
            .as_ref()
            .map(|c| c.automation.restart_delay_secs)
            .unwrap_or(10);
        self.arm_one_shot(delay, OneShot::Restart);
        log::info!("network online, resuming in {}s", delay);
        Vec::new()
    }

    /// Dismiss the dialog currently on screen, preferring the cancel control
    /// over the degraded-continue control. The control is clicked repeatedly
    /// while the dialog keeps reappearing.
    fn dismiss_dialog(&self, controls: DialogControls) {
        let choice = if controls.has_cancel {
            DialogChoice::Cancel
        } else if controls.degraded {
            log::error!("cannot find cancel control on degraded dialog");
            return;
        } else {
            DialogChoice::Accept
        };
        for _ in 0..MAX_DISMISS_CLICKS {
            if self.probe.dialog().is_none() {
                return;
            }
            if let Err(e) = self.probe.click_dialog(choice) {
                log::warn!("dialog dismiss failed: {}", e);
                return;
            }
        }
        if self.probe.dialog().is_some() {
            log::error!(
                "dialog control clicked {} times, but dialog did not close",
                MAX_DISMISS_CLICKS
            );
        }
    }

    /// Sweep any stray dialog already on screen before touching the
    /// run/connect control.
    fn sweep_dialogs(&self) {
        if let Some(controls) = self.probe.dialog() {
            log::warn!("stray dialog on screen, dismissing before probing");
            self.dismiss_dialog(controls);
        }
    }

    /// One automation pass: handle a captcha challenge, sweep stray dialogs,
    /// then click the run/connect control if it is ready and arm the delayed
    /// verification. A pass never suppresses or waits for an in-flight
    /// verification; a fresh click replaces the pending one.
    fn probe_pass(&mut self) -> Vec<AgentEvent> {
        let config = match &self.config {
            Some(c) => c.clone(),
            None => {
                log::debug!("probe pass before configuration arrived");
                return Vec::new();
            }
        };

        if self.probe.captcha_present() {
            self.captcha_flagged = true;
            if config.automation.dismiss_captcha_popups {
                if let Err(e) = self.probe.dismiss_captcha() {
                    log::warn!("captcha dismiss failed: {}", e);
                    return Vec::new();
                }
                log::info!("captcha challenge dismissed");
            } else {
                log::info!("captcha challenge on screen, skipping this pass");
                return Vec::new();
            }
        } else {
            self.captcha_flagged = false;
        }

        self.sweep_dialogs();

        let auto_run = config.automation.auto_run_first_cell;
        let control = if auto_run {
            self.probe.run_control()
        } else {
            self.probe.connect_control()
        };
        match control {
            Ok(RunControlState::Ready) => {
                let result = if auto_run {
                    log::info!("connecting and running first cell");
                    self.probe.click_run()
                } else {
                    log::info!("connecting");
                    self.probe.click_connect()
                };
                match result {
                    Ok(()) => {
                        let clicked_at_ms = self.clock.now_ms();
                        self.arm_one_shot(
                            config.automation.probe_delay_secs,
                            OneShot::Verify { clicked_at_ms },
                        );
                        self.phase = Phase::Probing;
                    }
                    Err(e) => log::warn!("control click failed: {}", e),
                }
            }
            Ok(RunControlState::Queued)
            | Ok(RunControlState::Executing)
            | Ok(RunControlState::Interrupting) => {
                log::info!(
                    "notebook already running, will recheck in {}s",
                    self.retry_secs()
                );
            }
            Ok(RunControlState::AlreadyConnected) => {
                log::info!(
                    "notebook already connected, will recheck in {}s",
                    self.retry_secs()
                );
            }
            Err(e) => {
                log::error!(
                    "cannot find {} control: {}",
                    if auto_run { "run" } else { "connect" },
                    e
                );
            }
        }
        Vec::new()
    }

    /// Delayed verification of a control click. Transitions are timestamped
    /// with the click time, matching what the user saw happen.
    fn verify(&mut self, clicked_at_ms: u64) -> Vec<AgentEvent> {
        let auto_run = self.auto_run();
        let title = self.probe.title();
        let mut events = Vec::new();

        // Wording follows the run-first-cell vs connect-only mode.
        let (up, down) = if auto_run {
            ("running", "stopped")
        } else {
            ("connected", "disconnected")
        };

        match self.probe.dialog() {
            Some(controls) => {
                log::info!("unable to connect, will retry in {}s", self.retry_secs());
                self.dismiss_dialog(controls);
                if self.connection == ConnectionStatus::Connected {
                    let uptime = self.elapsed_since_transition(clicked_at_ms);
                    events.push(AgentEvent::Notify(notify(
                        format!("⏹ Notebook has {}", down),
                        format!(
                            "The “{}” notebook has been {} and we are unable to \
                             reconnect. It is likely over the usage limits. It had \
                             been {} for {}.",
                            title, down, up, uptime
                        ),
                        clicked_at_ms,
                    )));
                    self.connection = ConnectionStatus::Disconnected;
                    self.last_transition_ms = Some(clicked_at_ms);
                } else {
                    self.connection = ConnectionStatus::Disconnected;
                }
            }
            None => {
                if self.connection == ConnectionStatus::Connected {
                    let uptime = self.elapsed_since_transition(clicked_at_ms);
                    events.push(AgentEvent::Notify(notify(
                        "🔁 Notebook has reconnected".to_string(),
                        format!(
                            "The “{}” notebook has been reconnected! It had been {} \
                             for {}.",
                            title, up, uptime
                        ),
                        clicked_at_ms,
                    )));
                } else {
                    let mut body = format!("The “{}” notebook is {}!", title, up);
                    if self.last_transition_ms.is_some() {
                        let downtime = self.elapsed_since_transition(clicked_at_ms);
                        body.push_str(&format!(" It had been {} for {}.", down, downtime));
                    }
                    events.push(AgentEvent::Notify(notify(
                        format!("▶ Notebook is {}", up),
                        body,
                        clicked_at_ms,
                    )));
                    self.connection = ConnectionStatus::Connected;
                }
                self.last_transition_ms = Some(clicked_at_ms);
            }
        }

        self.phase = if self.retry_timer.is_some() {
            Phase::WaitingRetry
        } else {
            Phase::Idle
        };
        events.push(AgentEvent::StatusPush(self.snapshot()));
        events
    }

    fn elapsed_since_transition(&self, now_ms: u64) -> String {
        let since = self.last_transition_ms.unwrap_or(now_ms);
        format_duration(now_ms.saturating_sub(since) / 1000)
    }
}

fn notify(title: String, body: String, event_time_ms: u64) -> NotifyRequest {
    NotifyRequest {
        title,
        body: format!("{}\n\nClick to view.", body),
        event_time_ms,
    }
}

impl PageAgentTrait for PageAgent {
    fn handle_command(&mut self, command: AgentCommand) -> Vec<AgentEvent> {
        match command {
            AgentCommand::Start => self.start(),
            AgentCommand::Stop => self.stop(),
            AgentCommand::StatusRequest => vec![AgentEvent::StatusPush(self.snapshot())],
            AgentCommand::ConfigPush(config) => self.config_pushed(config),
            AgentCommand::NetworkOffline => self.network_offline(),
            AgentCommand::NetworkOnline => self.network_online(),
        }
    }

    /// Initial configuration snapshot, answering the agent's one config
    /// request. The first automation pass is delayed to let the page settle.
    fn config_received(&mut self, config: KeeperConfig) -> Vec<AgentEvent> {
        let delay = config.automation.probe_delay_secs;
        self.config = Some(config);
        if self.enabled {
            self.arm_one_shot(delay, OneShot::FirstPass);
            log::debug!("configuration received, first pass in {}s", delay);
        }
        Vec::new()
    }

    /// Timer delivery. A fire queued behind a `clear` no longer matches any
    /// armed id and is ignored.
    fn handle_timer(&mut self, id: TimerId) -> Vec<AgentEvent> {
        if let Some((pending_id, kind)) = self.pending {
            if pending_id == id {
                self.timers.clear(id);
                self.pending = None;
                return match kind {
                    OneShot::FirstPass | OneShot::Restart => self.begin_cycle(),
                    OneShot::Verify { clicked_at_ms } => self.verify(clicked_at_ms),
                };
            }
        }
        if self.retry_timer == Some(id) {
            return self.probe_pass();
        }
        log::debug!("ignoring stale timer {}", id);
        Vec::new()
    }

    fn snapshot(&self) -> StatusSnapshot {
        StatusSnapshot {
            auto_run: self.auto_run(),
            enabled: self.enabled,
            connection: self.connection,
            last_transition_ms: self.last_transition_ms,
        }
    }
}
