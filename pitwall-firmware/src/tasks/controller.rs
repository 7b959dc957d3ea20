//! Main controller task
//!
//! Picks the tracked drivers, then alternates between fetch cycles and
//! idling. Button actions recorded by the input task are dispatched
//! between cycles; A opens the driver picker and B toggles the event
//! block.

use core::fmt::Write as _;

use defmt::*;
use embassy_net::Stack;
use embassy_time::{Delay, Instant, Timer};
use heapless::String;

use pitwall_core::api::{Api, TimingClient};
use pitwall_core::config::{ClientConfig, TrackingConfig};
use pitwall_core::orchestrator::{Orchestrator, TrackedTargets};
use pitwall_core::records::{DriverNumber, EventInfo, SessionInfo};
use pitwall_core::scheduler::{idle_until_due, Cadence, InputGate, InputPoller, Wake};
use pitwall_core::traits::{Button, Clock};
use pitwall_display::format::{driver_label, DRIVER_CODES};
use pitwall_display::screen::LINE_LEN;
use pitwall_display::{Picker, PickerEvent, Renderer, Tone, PICKER_ROWS};

use crate::channels::INPUT_GATE;
use crate::net::TcpConnector;
use crate::tasks::display::publish;
use crate::tasks::input::PanelButtons;

/// Longest sleep while idling, so pending actions are seen promptly
const IDLE_STEP_MS: u32 = 50;

type Client = TimingClient<TcpConnector<'static>>;

/// Uptime in milliseconds
struct Uptime;

impl Clock for Uptime {
    fn now_ms(&self) -> u64 {
        Instant::now().as_millis()
    }
}

/// Meeting and session header, fetched on demand
#[derive(Default)]
struct EventBlock {
    visible: bool,
    loaded: bool,
    event: Option<EventInfo>,
    session: Option<SessionInfo>,
}

impl EventBlock {
    async fn load(&mut self, client: &mut Client) {
        self.event = client.event_info().await.unwrap_or_else(|e| {
            warn!("Meeting fetch failed: {:?}", e);
            None
        });
        self.session = client.session_info().await.unwrap_or_else(|e| {
            warn!("Session fetch failed: {:?}", e);
            None
        });
        self.loaded = true;
    }

    fn event(&self) -> Option<&EventInfo> {
        self.event.as_ref().filter(|_| self.visible)
    }

    fn session(&self) -> Option<&SessionInfo> {
        self.session.as_ref().filter(|_| self.visible)
    }
}

/// Controller task - fetch cycles and button dispatch
#[embassy_executor::task]
pub async fn controller_task(
    stack: Stack<'static>,
    buttons: &'static PanelButtons,
    config: &'static ClientConfig,
) {
    info!("Controller task started");

    let clock = Uptime;
    let mut delay = Delay;
    let mut renderer = Renderer::new();

    let api = match Api::new(config.network.base_url.as_str()) {
        Ok(api) => api,
        Err(e) => {
            error!("Invalid base_url: {:?}", e);
            renderer.render_message(&["Invalid base_url", "Check client.toml"], Tone::Alert);
            publish(renderer.screen_mut()).await;
            return;
        }
    };
    let mut client: Client = TimingClient::new(TcpConnector::new(stack, &config.network), api);

    Timer::after_millis(config.polling.startup_delay_ms.into()).await;

    renderer.render_message(&["Loading drivers..."], Tone::Info);
    publish(renderer.screen_mut()).await;

    let targets = initial_targets(&mut client, &config.tracking).await;
    info!("Tracking {} drivers", targets.len());

    let mut header = EventBlock {
        visible: config.display.show_event_info,
        ..Default::default()
    };
    if header.visible {
        header.load(&mut client).await;
    }

    let cadence = Cadence::new(config.polling.interval_ms.into(), clock.now_ms());
    let mut orchestrator: Orchestrator =
        Orchestrator::new(targets, config.tracking.failure_policy, cadence);

    if orchestrator.board_mut().take_dirty() {
        renderer.render_laps(orchestrator.board(), header.event(), header.session());
        publish(renderer.screen_mut()).await;
    }

    loop {
        let wake = idle_until_due(
            &INPUT_GATE,
            orchestrator.cadence(),
            &clock,
            &mut delay,
            IDLE_STEP_MS,
        )
        .await;

        match wake {
            Wake::Due => {
                let report = orchestrator.run_cycle(&mut client, &clock).await;
                debug!(
                    "Cycle: {} fetched, {} no data, {} failed, {} changed",
                    report.fetched, report.no_data, report.failed, report.changed
                );
                if let Some(e) = report.last_error {
                    warn!("{} fetches failed, last error {:?}", report.failed, e);
                }
            }
            Wake::Input(Button::A) => {
                info!("Driver picker opened");
                let changed =
                    choose_driver(&mut renderer, &mut orchestrator, buttons, config).await;
                if changed {
                    info!("Tracked drivers changed");
                }
                orchestrator.board_mut().mark_dirty();
                orchestrator.cadence_mut().restart(clock.now_ms());
            }
            Wake::Input(Button::B) => {
                header.visible = !header.visible;
                info!("Event info {}", if header.visible { "shown" } else { "hidden" });
                if header.visible && !header.loaded {
                    header.load(&mut client).await;
                }
                orchestrator.board_mut().mark_dirty();
                orchestrator.cadence_mut().restart(clock.now_ms());
            }
            Wake::Input(button) => debug!("Ignoring {:?}", button),
        }

        if orchestrator.board_mut().take_dirty() {
            renderer.render_laps(orchestrator.board(), header.event(), header.session());
            publish(renderer.screen_mut()).await;
        }
    }
}

/// Drivers to track at startup
///
/// Ranks the latest session result when enabled, otherwise or on any
/// failure uses the configured defaults.
async fn initial_targets(client: &mut Client, tracking: &TrackingConfig) -> TrackedTargets {
    let defaults = tracking.default_drivers.as_slice();
    let limit = tracking.limit();

    if !tracking.rank_from_session {
        return TrackedTargets::from_defaults(defaults, limit);
    }

    match client.top_drivers(limit, defaults).await {
        Ok(targets) if !targets.is_empty() => targets,
        Ok(_) => {
            warn!("Session result empty, using default drivers");
            TrackedTargets::from_defaults(defaults, limit)
        }
        Err(e) => {
            warn!("Session result fetch failed: {:?}, using default drivers", e);
            TrackedTargets::from_defaults(defaults, limit)
        }
    }
}

/// Button reader for sub-screens
///
/// Starts from the levels held when the sub-screen opened, so the press
/// that opened it is not seen again.
struct SubScreenInput {
    poller: InputPoller<&'static PanelButtons>,
    gate: InputGate,
    period_ms: u64,
}

impl SubScreenInput {
    fn new(buttons: &'static PanelButtons, period_ms: u32) -> Self {
        Self {
            poller: InputPoller::primed(buttons),
            gate: InputGate::new(),
            period_ms: period_ms.into(),
        }
    }

    async fn next_press(&mut self) -> Button {
        loop {
            self.poller.poll_once(&self.gate);
            if let Some(button) = self.gate.take_pending() {
                return button;
            }
            Timer::after_millis(self.period_ms).await;
        }
    }
}

/// Pick a driver from the code table, then the slot it replaces
///
/// Returns whether the tracked list changed. The input task is kept from
/// recording actions until this returns.
async fn choose_driver(
    renderer: &mut Renderer,
    orchestrator: &mut Orchestrator,
    buttons: &'static PanelButtons,
    config: &ClientConfig,
) -> bool {
    let _suspended = INPUT_GATE.suspend_polling();
    let mut input = SubScreenInput::new(buttons, config.polling.button_poll_ms);

    let mut drivers = Picker::new(DRIVER_CODES.len(), PICKER_ROWS);
    let Some(index) = run_picker(
        renderer,
        "Pick driver",
        &mut drivers,
        |i| driver_row(DRIVER_CODES[i].0),
        &mut input,
    )
    .await
    else {
        return false;
    };
    let driver = DRIVER_CODES[index].0;

    let targets = orchestrator.targets().clone();
    let mut slots = Picker::new(targets.len(), PICKER_ROWS);
    let Some(slot) = run_picker(
        renderer,
        "Replace which?",
        &mut slots,
        |i| slot_row(i, targets.get(i)),
        &mut input,
    )
    .await
    else {
        return false;
    };

    info!("Slot {} now tracks driver {}", slot, driver);
    orchestrator.replace_target(slot, driver)
}

async fn run_picker<F>(
    renderer: &mut Renderer,
    title: &str,
    picker: &mut Picker,
    label: F,
    input: &mut SubScreenInput,
) -> Option<usize>
where
    F: Fn(usize) -> String<LINE_LEN>,
{
    loop {
        renderer.render_picker(title, picker, &label);
        publish(renderer.screen_mut()).await;

        match picker.handle(input.next_press().await) {
            PickerEvent::Moved => {}
            PickerEvent::Selected(index) => return Some(index),
            PickerEvent::Cancelled => return None,
        }
    }
}

fn driver_row(driver: DriverNumber) -> String<LINE_LEN> {
    let mut line = String::new();
    let _ = line.push_str(&driver_label(driver));
    line
}

fn slot_row(slot: usize, driver: Option<DriverNumber>) -> String<LINE_LEN> {
    let mut line = String::new();
    match driver {
        Some(driver) => {
            let _ = write!(line, "{}: {}", slot + 1, driver_label(driver).as_str());
        }
        None => {
            let _ = write!(line, "{}: -", slot + 1);
        }
    }
    line
}
