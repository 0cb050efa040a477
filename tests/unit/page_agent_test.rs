use std::rc::Rc;
use std::time::Duration;

use sessionkeeper::platform::sim::{ProbeAction, SimClock, SimNotebook, SimTimers};
use sessionkeeper::platform::{DialogControls, NotebookProbe, RunControlState, TimerHost};
use sessionkeeper::services::page_agent::{PageAgent, PageAgentTrait};
use sessionkeeper::types::config::KeeperConfig;
use sessionkeeper::types::messages::{AgentCommand, AgentEvent};
use sessionkeeper::types::status::{ConnectionStatus, Phase};

/// Fresh agent with the given config already delivered. Timer ids are
/// deterministic: 1 = first pass, 2 = retry interval, 3 = first verification.
fn agent_with(
    config: KeeperConfig,
) -> (PageAgent, Rc<SimNotebook>, Rc<SimTimers>, Rc<SimClock>) {
    let probe = Rc::new(SimNotebook::new("MNIST training"));
    let timers = Rc::new(SimTimers::new());
    let clock = Rc::new(SimClock::new(1_000_000));
    let mut agent = PageAgent::new(
        Box::new(Rc::clone(&probe)),
        Box::new(Rc::clone(&timers)),
        Box::new(Rc::clone(&clock)),
    );
    agent.config_received(config);
    (agent, probe, timers, clock)
}

/// Run the first pass and its verification against a healthy page.
fn first_connect(agent: &mut PageAgent, clock: &SimClock) -> Vec<AgentEvent> {
    agent.handle_timer(1);
    clock.advance(10_000);
    agent.handle_timer(3)
}

fn notify_titles(events: &[AgentEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| match e {
            AgentEvent::Notify(r) => Some(r.title.clone()),
            _ => None,
        })
        .collect()
}

#[test]
fn test_first_pass_clicks_connect_and_verifies() {
    let (mut agent, probe, timers, clock) = agent_with(KeeperConfig::default());

    agent.handle_timer(1);
    assert_eq!(probe.actions(), vec![ProbeAction::Connect]);
    assert_eq!(agent.phase(), Phase::Probing);
    assert_eq!(timers.armed_intervals(), 1);
    assert_eq!(timers.armed_oneshots(), 1);

    clock.advance(10_000);
    let events = agent.handle_timer(3);
    assert_eq!(notify_titles(&events), vec!["▶ Notebook is connected"]);
    assert!(matches!(events.last(), Some(AgentEvent::StatusPush(_))));
    assert_eq!(agent.connection(), ConnectionStatus::Connected);
    assert_eq!(agent.phase(), Phase::WaitingRetry);
    // The consumed verification is cleared; only the retry interval stays
    assert_eq!(timers.active_timers(), 1);
}

#[test]
fn test_notification_body_quotes_title_and_ends_with_click_to_view() {
    let (mut agent, _, _, clock) = agent_with(KeeperConfig::default());
    let events = first_connect(&mut agent, &clock);

    let body = match &events[0] {
        AgentEvent::Notify(r) => r.body.clone(),
        _ => panic!("expected a notification"),
    };
    assert!(body.contains("“MNIST training”"));
    assert!(body.ends_with("Click to view."));
}

#[test]
fn test_auto_run_clicks_run_control() {
    let mut config = KeeperConfig::default();
    config.automation.auto_run_first_cell = true;
    let (mut agent, probe, _, clock) = agent_with(config);

    let events = first_connect(&mut agent, &clock);
    assert_eq!(probe.actions(), vec![ProbeAction::Run]);
    assert_eq!(notify_titles(&events), vec!["▶ Notebook is running"]);
}

#[test]
fn test_busy_control_skips_click() {
    let (mut agent, probe, timers, _) = agent_with(KeeperConfig::default());
    probe.set_connect(Some(RunControlState::AlreadyConnected));

    agent.handle_timer(1);
    assert!(probe.actions().is_empty());
    assert_eq!(timers.armed_oneshots(), 0);
    assert_eq!(agent.phase(), Phase::WaitingRetry);
}

#[test]
fn test_executing_run_control_skips_click() {
    let mut config = KeeperConfig::default();
    config.automation.auto_run_first_cell = true;
    let (mut agent, probe, timers, _) = agent_with(config);
    probe.set_run(Some(RunControlState::Executing));

    agent.handle_timer(1);
    assert!(probe.actions().is_empty());
    assert_eq!(timers.armed_oneshots(), 0);
}

#[test]
fn test_missing_control_leaves_retry_armed() {
    let (mut agent, probe, timers, _) = agent_with(KeeperConfig::default());
    probe.set_connect(None);

    agent.handle_timer(1);
    assert!(probe.actions().is_empty());
    assert_eq!(timers.armed_intervals(), 1);
    assert_eq!(agent.phase(), Phase::WaitingRetry);
}

#[test]
fn test_disconnect_notifies_with_uptime() {
    let (mut agent, probe, _, clock) = agent_with(KeeperConfig::default());
    first_connect(&mut agent, &clock); // connected at t=1_000_000

    clock.advance(90_000);
    agent.handle_timer(2); // retry tick clicks again, verify id 4
    probe.show_dialog(
        DialogControls {
            has_cancel: true,
            degraded: true,
        },
        1,
    );
    clock.advance(10_000);
    let events = agent.handle_timer(4);

    assert_eq!(notify_titles(&events), vec!["⏹ Notebook has disconnected"]);
    let body = match &events[0] {
        AgentEvent::Notify(r) => r.body.clone(),
        _ => unreachable!(),
    };
    // Uptime runs from the first connect to the failing click
    assert!(body.contains("1 minute 40 seconds"), "body: {}", body);
    assert!(body.contains("usage limits"));
    assert_eq!(agent.connection(), ConnectionStatus::Disconnected);
    // The degraded dialog was dismissed through its cancel control
    assert!(probe.actions().contains(&ProbeAction::DialogCancel));
    assert!(!probe.actions().contains(&ProbeAction::DialogAccept));
}

#[test]
fn test_repeated_disconnect_notifies_once() {
    let (mut agent, probe, _, clock) = agent_with(KeeperConfig::default());
    first_connect(&mut agent, &clock);

    for verify_id in [4, 5] {
        agent.handle_timer(2);
        probe.show_dialog(
            DialogControls {
                has_cancel: true,
                degraded: false,
            },
            1,
        );
        clock.advance(10_000);
        let events = agent.handle_timer(verify_id);
        if verify_id == 4 {
            assert_eq!(notify_titles(&events).len(), 1);
        } else {
            // Still disconnected: no second stop notification
            assert!(notify_titles(&events).is_empty());
        }
    }
}

#[test]
fn test_reconnect_wording_after_blip() {
    let (mut agent, _, _, clock) = agent_with(KeeperConfig::default());
    first_connect(&mut agent, &clock);

    // A later click verifies clean while still marked connected
    agent.handle_timer(2);
    clock.advance(10_000);
    let events = agent.handle_timer(4);
    assert_eq!(notify_titles(&events), vec!["🔁 Notebook has reconnected"]);
    assert_eq!(agent.connection(), ConnectionStatus::Connected);
}

#[test]
fn test_connect_after_disconnect_mentions_downtime() {
    let (mut agent, probe, _, clock) = agent_with(KeeperConfig::default());
    first_connect(&mut agent, &clock);

    // Disconnect
    agent.handle_timer(2);
    probe.show_dialog(
        DialogControls {
            has_cancel: true,
            degraded: false,
        },
        1,
    );
    clock.advance(10_000);
    agent.handle_timer(4);

    // Recover
    clock.advance(120_000);
    agent.handle_timer(2);
    clock.advance(10_000);
    let events = agent.handle_timer(5);
    assert_eq!(notify_titles(&events), vec!["▶ Notebook is connected"]);
    let body = match &events[0] {
        AgentEvent::Notify(r) => r.body.clone(),
        _ => unreachable!(),
    };
    assert!(body.contains("It had been disconnected for"), "body: {}", body);
}

#[test]
fn test_plain_dialog_accepted_when_no_cancel() {
    let (mut agent, probe, _, clock) = agent_with(KeeperConfig::default());
    first_connect(&mut agent, &clock);

    agent.handle_timer(2);
    probe.show_dialog(
        DialogControls {
            has_cancel: false,
            degraded: false,
        },
        1,
    );
    clock.advance(10_000);
    agent.handle_timer(4);
    assert!(probe.actions().contains(&ProbeAction::DialogAccept));
}

#[test]
fn test_degraded_dialog_without_cancel_is_never_clicked() {
    let (mut agent, probe, _, clock) = agent_with(KeeperConfig::default());
    first_connect(&mut agent, &clock);

    agent.handle_timer(2);
    probe.show_dialog(
        DialogControls {
            has_cancel: false,
            degraded: true,
        },
        1,
    );
    clock.advance(10_000);
    agent.handle_timer(4);
    assert!(!probe.actions().contains(&ProbeAction::DialogAccept));
    assert!(!probe.actions().contains(&ProbeAction::DialogCancel));
    assert!(probe.dialog().is_some());
}

#[test]
fn test_stray_dialog_swept_before_clicking() {
    let (mut agent, probe, _, _) = agent_with(KeeperConfig::default());
    probe.show_dialog(
        DialogControls {
            has_cancel: true,
            degraded: false,
        },
        1,
    );

    agent.handle_timer(1);
    assert_eq!(
        probe.actions(),
        vec![ProbeAction::DialogCancel, ProbeAction::Connect]
    );
}

#[test]
fn test_dismiss_gives_up_after_ten_clicks() {
    let (mut agent, probe, _, _) = agent_with(KeeperConfig::default());
    probe.show_dialog(
        DialogControls {
            has_cancel: true,
            degraded: false,
        },
        50,
    );

    agent.handle_timer(1);
    let cancels = probe
        .actions()
        .iter()
        .filter(|a| **a == ProbeAction::DialogCancel)
        .count();
    assert_eq!(cancels, 10);
    assert!(probe.dialog().is_some());
}

#[test]
fn test_captcha_blocks_pass_by_default() {
    let (mut agent, probe, timers, _) = agent_with(KeeperConfig::default());
    probe.set_captcha(true);

    agent.handle_timer(1);
    assert!(probe.actions().is_empty());
    assert!(agent.captcha_flagged());
    assert_eq!(timers.armed_oneshots(), 0);
}

#[test]
fn test_captcha_dismissed_when_enabled() {
    let mut config = KeeperConfig::default();
    config.automation.dismiss_captcha_popups = true;
    let (mut agent, probe, _, _) = agent_with(config);
    probe.set_captcha(true);

    agent.handle_timer(1);
    assert_eq!(
        probe.actions(),
        vec![ProbeAction::DismissCaptcha, ProbeAction::Connect]
    );
    assert!(agent.captcha_flagged());

    // The flag clears on the next challenge-free pass
    agent.handle_timer(2);
    assert!(!agent.captcha_flagged());
}

#[test]
fn test_config_push_debounces_restart() {
    let (mut agent, _, timers, _) = agent_with(KeeperConfig::default());
    agent.handle_timer(1); // running: interval + verification armed

    let mut new_config = KeeperConfig::default();
    new_config.automation.restart_delay_secs = 5;
    agent.handle_command(AgentCommand::ConfigPush(new_config));

    assert_eq!(timers.armed_intervals(), 0);
    assert_eq!(timers.armed_oneshots(), 1);
    assert_eq!(agent.phase(), Phase::Idle);

    // The restart one-shot brings the cycle back
    agent.handle_timer(4);
    assert_eq!(timers.armed_intervals(), 1);
    assert_eq!(agent.phase(), Phase::Probing);
}

#[test]
fn test_config_push_rearms_with_new_timing() {
    let (mut agent, _, timers, _) = agent_with(KeeperConfig::default());
    agent.handle_timer(1);

    let mut new_config = KeeperConfig::default();
    new_config.automation.retry_interval_secs = 120;
    new_config.automation.restart_delay_secs = 5;
    agent.handle_command(AgentCommand::ConfigPush(new_config));

    // The restart one-shot waits the pushed delay, not the old one
    assert_eq!(timers.delay_of(4), Some(Duration::from_secs(5)));

    // The cycle the restart brings back runs on the pushed interval
    agent.handle_timer(4);
    assert_eq!(timers.armed_intervals(), 1);
    assert_eq!(timers.delay_of(5), Some(Duration::from_secs(120)));
}

#[test]
fn test_config_push_while_disabled_stays_idle() {
    let (mut agent, _, timers, _) = agent_with(KeeperConfig::default());
    agent.handle_command(AgentCommand::Stop);

    agent.handle_command(AgentCommand::ConfigPush(KeeperConfig::default()));
    assert_eq!(timers.active_timers(), 0);
    assert!(!agent.is_enabled());
}

#[test]
fn test_offline_pauses_and_online_resumes() {
    let (mut agent, _, timers, _) = agent_with(KeeperConfig::default());
    agent.handle_timer(1);

    agent.handle_command(AgentCommand::NetworkOffline);
    assert_eq!(timers.active_timers(), 0);
    assert!(agent.is_enabled());
    assert_eq!(agent.phase(), Phase::Idle);

    agent.handle_command(AgentCommand::NetworkOnline);
    assert_eq!(timers.armed_oneshots(), 1);
}

#[test]
fn test_online_while_disabled_does_nothing() {
    let (mut agent, _, timers, _) = agent_with(KeeperConfig::default());
    agent.handle_command(AgentCommand::Stop);

    agent.handle_command(AgentCommand::NetworkOnline);
    assert_eq!(timers.active_timers(), 0);
}

#[test]
fn test_status_request_reports_current_state() {
    let (mut agent, _, _, clock) = agent_with(KeeperConfig::default());
    first_connect(&mut agent, &clock);

    let events = agent.handle_command(AgentCommand::StatusRequest);
    match &events[..] {
        [AgentEvent::StatusPush(snapshot)] => {
            assert!(snapshot.enabled);
            assert!(!snapshot.auto_run);
            assert_eq!(snapshot.connection, ConnectionStatus::Connected);
            assert_eq!(snapshot.last_transition_ms, Some(1_000_000));
        }
        other => panic!("unexpected events: {:?}", other),
    }
}

#[test]
fn test_stop_then_start_restarts_cycle() {
    let (mut agent, probe, timers, clock) = agent_with(KeeperConfig::default());
    first_connect(&mut agent, &clock);

    agent.handle_command(AgentCommand::Stop);
    assert_eq!(timers.active_timers(), 0);

    let events = agent.handle_command(AgentCommand::Start);
    assert!(agent.is_enabled());
    assert_eq!(timers.armed_intervals(), 1);
    // Start probes immediately and pushes its status
    assert!(probe.actions().len() >= 2);
    assert!(matches!(events.last(), Some(AgentEvent::StatusPush(_))));
}

#[test]
fn test_second_stop_is_a_no_op() {
    let (mut agent, _, timers, clock) = agent_with(KeeperConfig::default());
    first_connect(&mut agent, &clock);

    agent.handle_command(AgentCommand::Stop);
    let after_first = agent.snapshot();

    let events = agent.handle_command(AgentCommand::Stop);
    assert!(events.is_empty());
    assert_eq!(agent.snapshot(), after_first);
    assert_eq!(timers.active_timers(), 0);
}

#[test]
fn test_fresh_click_replaces_pending_verification() {
    let (mut agent, _, timers, _) = agent_with(KeeperConfig::default());
    agent.handle_timer(1); // click + verification armed

    // The retry tick fires before the verification does
    agent.handle_timer(2);
    assert_eq!(timers.armed_oneshots(), 1);
    assert!(!timers.is_armed(3));
}
