use std::rc::Rc;
use std::time::Duration;

use sessionkeeper::platform::sim::{SimClock, SimTimers};
use sessionkeeper::platform::TimerHost;
use sessionkeeper::services::status_view::{StatusView, StatusViewTrait};
use sessionkeeper::types::messages::ViewCommand;
use sessionkeeper::types::status::{ConnectionStatus, StatusSnapshot};

fn view_at(now_ms: u64) -> (StatusView, Rc<SimTimers>, Rc<SimClock>) {
    let timers = Rc::new(SimTimers::new());
    let clock = Rc::new(SimClock::new(now_ms));
    let view = StatusView::new(Box::new(Rc::clone(&timers)), Box::new(Rc::clone(&clock)));
    (view, timers, clock)
}

fn connected_since(time_ms: u64) -> StatusSnapshot {
    StatusSnapshot {
        auto_run: false,
        enabled: true,
        connection: ConnectionStatus::Connected,
        last_transition_ms: Some(time_ms),
    }
}

#[test]
fn test_open_pulls_once_when_tab_is_automated() {
    let (mut view, timers, _) = view_at(1_000_000);
    assert_eq!(view.open(true), Some(ViewCommand::RequestStatus));
    assert_eq!(view.model().status_line, "Loading…");
    assert!(view.model().show_details);
    assert_eq!(timers.active_timers(), 0);
}

#[test]
fn test_open_without_automated_tab_is_inert() {
    let (mut view, timers, _) = view_at(1_000_000);
    assert_eq!(view.open(false), None);
    assert!(!view.model().show_details);
    assert_eq!(timers.active_timers(), 0);
    // The toggle has no agent to talk to either
    assert_eq!(view.toggle_enabled(true), None);
}

#[test]
fn test_connected_snapshot_renders_and_starts_stopwatch() {
    let (mut view, timers, _) = view_at(1_050_000);
    view.open(true);
    view.status_received(connected_since(1_000_000));

    assert_eq!(view.model().status_line, "▶️ Connected");
    assert_eq!(view.model().since_line, "50 seconds ago");
    assert_eq!(view.model().stopwatch_line, "50 seconds");
    assert_eq!(timers.armed_oneshots(), 1);
}

#[test]
fn test_auto_run_snapshot_uses_running_wording() {
    let (mut view, _, _) = view_at(1_050_000);
    view.open(true);
    view.status_received(StatusSnapshot {
        auto_run: true,
        enabled: true,
        connection: ConnectionStatus::Disconnected,
        last_transition_ms: Some(1_000_000),
    });
    assert_eq!(view.model().status_line, "⏹️ Stopped");
}

#[test]
fn test_unknown_without_transition_time() {
    let (mut view, timers, _) = view_at(1_000_000);
    view.open(true);
    view.status_received(StatusSnapshot {
        auto_run: false,
        enabled: true,
        connection: ConnectionStatus::Unknown,
        last_transition_ms: None,
    });
    assert_eq!(view.model().status_line, "❓ Unknown");
    assert_eq!(view.model().stopwatch_line, "");
    // No anchor time means no stopwatch to run
    assert_eq!(timers.active_timers(), 0);
}

#[test]
fn test_disabled_snapshot_hides_details() {
    let (mut view, timers, _) = view_at(1_000_000);
    view.open(true);
    view.status_received(StatusSnapshot {
        auto_run: false,
        enabled: false,
        connection: ConnectionStatus::Connected,
        last_transition_ms: Some(999_000),
    });
    assert!(!view.model().show_details);
    assert_eq!(timers.active_timers(), 0);
}

#[test]
fn test_tick_aligns_to_whole_seconds() {
    let (mut view, timers, clock) = view_at(1_000_000);
    clock.set(1_000_450);
    view.open(true);
    view.status_received(connected_since(990_000));
    assert_eq!(timers.delay_of(1), Some(Duration::from_millis(550)));

    // Fire the tick on the second boundary and check the chain re-arms
    clock.set(1_001_000);
    assert!(view.handle_timer(1));
    assert_eq!(timers.delay_of(2), Some(Duration::from_millis(1000)));
    assert_eq!(timers.active_timers(), 1);
}

#[test]
fn test_tick_recomputes_elapsed_locally() {
    let (mut view, _, clock) = view_at(1_010_000);
    view.open(true);
    view.status_received(connected_since(1_000_000));
    assert_eq!(view.model().stopwatch_line, "10 seconds");

    clock.advance(65_000);
    view.handle_timer(1);
    assert_eq!(view.model().stopwatch_line, "1 minute 15 seconds");
}

#[test]
fn test_overrun_marker_after_twelve_hours() {
    let (mut view, _, clock) = view_at(0);
    clock.set(12 * 3600 * 1000 + 1_000);
    view.open(true);
    view.status_received(connected_since(1_000));
    assert!(view.model().stopwatch_line.starts_with("‼️ "));
}

#[test]
fn test_no_overrun_marker_while_disconnected() {
    let (mut view, _, clock) = view_at(0);
    clock.set(13 * 3600 * 1000);
    view.open(true);
    view.status_received(StatusSnapshot {
        auto_run: false,
        enabled: true,
        connection: ConnectionStatus::Disconnected,
        last_transition_ms: Some(0),
    });
    assert!(!view.model().stopwatch_line.starts_with("‼️"));
}

#[test]
fn test_new_snapshot_replaces_anchor_and_tick() {
    let (mut view, timers, _) = view_at(1_030_000);
    view.open(true);
    view.status_received(connected_since(1_000_000));
    view.status_received(connected_since(1_020_000));

    assert!(!timers.is_armed(1));
    assert_eq!(timers.armed_oneshots(), 1);
    assert_eq!(view.model().stopwatch_line, "10 seconds");
}

#[test]
fn test_toggle_emits_start_and_stop() {
    let (mut view, timers, _) = view_at(1_010_000);
    view.open(true);
    view.status_received(connected_since(1_000_000));

    assert_eq!(view.toggle_enabled(false), Some(ViewCommand::Stop));
    assert!(!view.model().show_details);
    assert_eq!(timers.active_timers(), 0);

    assert_eq!(view.toggle_enabled(true), Some(ViewCommand::Start));
    assert_eq!(view.model().status_line, "Waiting…");
}

#[test]
fn test_stale_tick_is_ignored() {
    let (mut view, timers, _) = view_at(1_010_000);
    view.open(true);
    view.status_received(connected_since(1_000_000));

    assert!(!view.handle_timer(77));
    assert_eq!(timers.active_timers(), 1);
}

#[test]
fn test_close_cancels_the_stopwatch() {
    let (mut view, timers, _) = view_at(1_010_000);
    view.open(true);
    view.status_received(connected_since(1_000_000));
    assert_eq!(timers.active_timers(), 1);

    view.close();
    assert_eq!(timers.active_timers(), 0);
}
