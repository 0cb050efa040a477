//! SessionKeeper — keeps cloud notebook sessions alive.
//!
//! Entry point: runs a console demo of every component over the simulated
//! platform hosts, then a short live run on the tokio event loop.

use std::rc::Rc;

use sessionkeeper::platform::sim::{
    SimClock, SimIdleHost, SimNotebook, SimNotificationHost, SimTabHost, SimTimers,
};
use sessionkeeper::platform::{TabHost, TimerHost};
use sessionkeeper::types::config::KeeperConfig;

fn main() {
    env_logger::init();

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║             SessionKeeper v{} — Demo Mode               ║", env!("CARGO_PKG_VERSION"));
    println!("║      Keeps cloud notebook sessions alive and connected     ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    demo_config_store();
    demo_page_agent();
    demo_coordinator();
    demo_rotation();
    demo_status_view();
    demo_live_runtime();

    println!();
    println!("═══════════════════════════════════════════════════════════════");
    println!("  ✅ All components demonstrated successfully!");
    println!("  SessionKeeper is ready for host integration.");
    println!("═══════════════════════════════════════════════════════════════");
}

fn section(name: &str) {
    println!("───────────────────────────────────────────────────────────────");
    println!("  📦 {}", name);
    println!("───────────────────────────────────────────────────────────────");
}

fn temp_config_path() -> String {
    std::env::temp_dir()
        .join(format!("sessionkeeper-demo-{}.json", uuid::Uuid::new_v4()))
        .to_string_lossy()
        .to_string()
}

fn demo_config_store() {
    use sessionkeeper::services::config_store::{ConfigStore, ConfigStoreTrait};
    section("Config Store");

    let mut store = ConfigStore::new(Some(temp_config_path()));
    let config = store.load().expect("Failed to load config");
    println!(
        "  Defaults: retry every {}s, verify after {}s, notifications {}",
        config.automation.retry_interval_secs,
        config.automation.probe_delay_secs,
        if config.notifications.enabled { "on" } else { "off" }
    );

    store
        .set_value("automation.retry_interval_secs", serde_json::json!(120))
        .expect("Failed to set value");
    store
        .set_value("rotation.rotate_on_idle", serde_json::json!(true))
        .expect("Failed to set value");
    println!(
        "  Updated: retry every {}s, rotate on idle = {}",
        store.get_config().automation.retry_interval_secs,
        store.get_config().rotation.rotate_on_idle
    );
    println!("  ✓ Load / dot-notation update / persist OK");
    println!();
}

fn demo_page_agent() {
    use sessionkeeper::services::page_agent::{PageAgent, PageAgentTrait};
    use sessionkeeper::types::messages::AgentEvent;
    section("Page Agent");

    let probe = Rc::new(SimNotebook::new("MNIST training"));
    let timers = Rc::new(SimTimers::new());
    let clock = Rc::new(SimClock::new(1_700_000_000_000));
    let mut agent = PageAgent::new(
        Box::new(Rc::clone(&probe)),
        Box::new(Rc::clone(&timers)),
        Box::new(Rc::clone(&clock)),
    );

    agent.config_received(KeeperConfig::default());
    println!("  Config received, first pass armed ({} timer)", timers.active_timers());

    // First pass: clicks the connect control, arms the verification.
    agent.handle_timer(1);
    println!(
        "  First pass done: {:?}, {} timers armed",
        agent.phase(),
        timers.active_timers()
    );

    // Verification: no dialog on screen, so the session is connected.
    clock.advance(10_000);
    let events = agent.handle_timer(3);
    for event in &events {
        if let AgentEvent::Notify(request) = event {
            println!("  Notification: {}", request.title);
        }
    }
    println!("  Connection: {:?}", agent.connection());
    println!("  ✓ Probe / verify / notify OK");
    println!();
}

fn demo_coordinator() {
    use sessionkeeper::managers::notification_binder::ClickTarget;
    use sessionkeeper::services::coordinator::{Coordinator, CoordinatorTrait};
    use sessionkeeper::types::messages::NotifyRequest;
    use sessionkeeper::types::status::{TabSnapshot, WindowState};
    section("Coordinator");

    let tabs = Rc::new(SimTabHost::new());
    let notes = Rc::new(SimNotificationHost::new());
    let window = tabs.add_window(WindowState::Normal);
    let tab = tabs.add_tab(window, "https://notebooks.example/mnist", "MNIST training");

    let mut coordinator = Coordinator::new(
        Box::new(Rc::clone(&tabs) as Rc<dyn TabHost>),
        Box::new(Rc::clone(&notes)),
        Box::new(SimIdleHost::new()),
        Box::new(Rc::new(SimTimers::new())),
    );

    let deferred = coordinator.register_page(TabSnapshot {
        id: tab,
        window,
        url: "https://notebooks.example/mnist".to_string(),
        title: "MNIST training".to_string(),
    });
    println!(
        "  Registered before load: {} replies, {} deferred",
        deferred.len(),
        coordinator.pending_request_count()
    );

    let replies = coordinator.config_loaded(KeeperConfig::default());
    println!("  Config loaded: {} deferred replies sent", replies.len());

    coordinator.handle_notify_request(
        ClickTarget::Tab(tab),
        NotifyRequest {
            title: "▶ Notebook is connected".to_string(),
            body: "The “MNIST training” notebook is connected!\n\nClick to view.".to_string(),
            event_time_ms: 1_700_000_000_000,
        },
    );
    let id = notes.last_id().expect("Notification not shown");
    coordinator.notification_clicked(&id);
    println!(
        "  Notification shown and clicked through: {} tab ops",
        tabs.ops().len()
    );
    assert!(coordinator.registry().contains(tab));
    println!("  ✓ Registration / config reply / notification binding OK");
    println!();
}

fn demo_rotation() {
    use sessionkeeper::services::coordinator::{Coordinator, CoordinatorTrait};
    use sessionkeeper::types::messages::IdleState;
    use sessionkeeper::types::status::{TabSnapshot, WindowState};
    section("Idle Rotation");

    let tabs = Rc::new(SimTabHost::new());
    let w1 = tabs.add_window(WindowState::Normal);
    let w2 = tabs.add_window(WindowState::Minimized);
    let t1 = tabs.add_tab(w1, "https://notebooks.example/a", "a");
    let t2 = tabs.add_tab(w1, "https://notebooks.example/b", "b");
    let t3 = tabs.add_tab(w2, "https://notebooks.example/c", "c");

    let mut coordinator = Coordinator::new(
        Box::new(Rc::clone(&tabs) as Rc<dyn TabHost>),
        Box::new(Rc::new(SimNotificationHost::new())),
        Box::new(SimIdleHost::new()),
        Box::new(Rc::new(SimTimers::new())),
    );
    let mut config = KeeperConfig::default();
    config.rotation.rotate_on_idle = true;
    coordinator.config_loaded(config);

    for (tab, window, name) in [(t1, w1, "a"), (t2, w1, "b"), (t3, w2, "c")] {
        coordinator.register_page(TabSnapshot {
            id: tab,
            window,
            url: format!("https://notebooks.example/{}", name),
            title: name.to_string(),
        });
    }

    coordinator.idle_state_changed(IdleState::Idle);
    println!("  User idle: rotation active = {}", coordinator.rotation_active());
    coordinator.rotation_timer(1);
    coordinator.rotation_timer(1);
    coordinator.idle_state_changed(IdleState::Active);
    println!(
        "  User back: rotation active = {}, {} tab ops recorded",
        coordinator.rotation_active(),
        tabs.ops().len()
    );
    println!("  ✓ Idle start / step / focus restore OK");
    println!();
}

fn demo_status_view() {
    use sessionkeeper::services::status_view::{StatusView, StatusViewTrait};
    use sessionkeeper::types::status::{ConnectionStatus, StatusSnapshot};
    section("Status View");

    let timers = Rc::new(SimTimers::new());
    let clock = Rc::new(SimClock::new(1_700_000_050_300));
    let mut view = StatusView::new(Box::new(Rc::clone(&timers)), Box::new(Rc::clone(&clock)));

    view.open(true);
    println!("  Opened: {}", view.model().status_line);

    view.status_received(StatusSnapshot {
        auto_run: false,
        enabled: true,
        connection: ConnectionStatus::Connected,
        last_transition_ms: Some(1_700_000_000_000),
    });
    println!(
        "  Snapshot received: {} / since {} / stopwatch {}",
        view.model().status_line,
        view.model().since_line,
        view.model().stopwatch_line
    );

    clock.advance(700);
    view.handle_timer(1);
    println!("  After tick: stopwatch {}", view.model().stopwatch_line);
    view.close();
    println!("  Closed: {} timers armed", timers.active_timers());
    println!("  ✓ Pull-then-push / aligned stopwatch OK");
    println!();
}

fn demo_live_runtime() {
    use sessionkeeper::runtime::{Runtime, RuntimeEvent};
    use sessionkeeper::types::status::{TabSnapshot, WindowState};
    use std::time::Duration;
    section("Live Runtime (tokio)");

    // Quick-reacting configuration so the demo finishes fast.
    let mut config = KeeperConfig::default();
    config.automation.retry_interval_secs = 1;
    config.automation.probe_delay_secs = 0;
    config.automation.restart_delay_secs = 0;
    let config_path = temp_config_path();
    std::fs::write(&config_path, serde_json::to_string_pretty(&config).unwrap())
        .expect("Failed to write demo config");

    let tabs = Rc::new(SimTabHost::new());
    let notes = Rc::new(SimNotificationHost::new());
    let window = tabs.add_window(WindowState::Normal);
    let tab = tabs.add_tab(window, "https://notebooks.example/live", "live");

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .expect("Failed to build tokio runtime");
    let local = tokio::task::LocalSet::new();
    let runtime = local.block_on(&rt, async {
        let runtime = Runtime::new(
            Rc::clone(&tabs) as Rc<dyn TabHost>,
            Rc::clone(&notes) as Rc<dyn sessionkeeper::platform::NotificationHost>,
            Rc::new(SimIdleHost::new()),
            Box::new(|_| Box::new(SimNotebook::new("live"))),
            Some(config_path),
        );
        let tx = runtime.sender();
        tx.send(RuntimeEvent::PageRegistered(TabSnapshot {
            id: tab,
            window,
            url: "https://notebooks.example/live".to_string(),
            title: "live".to_string(),
        }))
        .unwrap();
        tokio::task::spawn_local(async move {
            tokio::time::sleep(Duration::from_millis(400)).await;
            let _ = tx.send(RuntimeEvent::ViewOpened);
            tokio::time::sleep(Duration::from_millis(100)).await;
            let _ = tx.send(RuntimeEvent::Shutdown);
        });
        runtime.run().await
    });

    println!(
        "  Ran for 500ms: {} agent, {} notifications shown",
        runtime.agent_count(),
        notes.shown().len()
    );
    println!("  Popup rendered: {}", runtime.view_model().status_line);
    println!("  ✓ Event loop / timers / routing OK");
    println!();
}
