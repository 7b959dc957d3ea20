//! Pitwall - Live Timing Client Firmware
//!
//! Firmware binary for the Raspberry Pi Pico W with a four-button display
//! pack. Joins Wi-Fi, then polls a live timing service for the latest lap
//! of each tracked driver on a fixed cadence.

#![no_std]
#![no_main]

use cyw43::JoinOptions;
use cyw43_pio::{PioSpi, DEFAULT_CLOCK_DIVIDER};
use defmt::*;
use embassy_executor::Spawner;
use embassy_net::StackResources;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::peripherals::PIO0;
use embassy_rp::pio::{InterruptHandler, Pio};
use embassy_time::{Instant, Timer};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use pitwall_core::config::ClientConfig;
use pitwall_display::Renderer;

mod channels;
mod config;
mod display;
mod net;
mod tasks;

use tasks::PanelButtons;

/// Embedded client configuration (compiled into firmware)
/// Edit client.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../client.toml");

const WIFI_SSID: &str = env!("WIFI_SSID");
const WIFI_PASSWORD: Option<&str> = option_env!("WIFI_PASSWORD");

/// Pause between failed join attempts
const JOIN_RETRY_SECS: u64 = 3;

bind_interrupts!(struct Irqs {
    PIO0_IRQ_0 => InterruptHandler<PIO0>;
});

static CLIENT_CONFIG: StaticCell<ClientConfig> = StaticCell::new();
static BUTTONS: StaticCell<PanelButtons> = StaticCell::new();
static RADIO_STATE: StaticCell<cyw43::State> = StaticCell::new();
static NET_RESOURCES: StaticCell<StackResources<4>> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Pitwall firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config: &'static ClientConfig = CLIENT_CONFIG.init(config::load(EMBEDDED_CONFIG));

    // Display pack buttons: A=GPIO12, B=GPIO13, X=GPIO14, Y=GPIO15, active low
    let buttons: &'static PanelButtons = BUTTONS.init(PanelButtons::new(
        Input::new(p.PIN_12, Pull::Up),
        Input::new(p.PIN_13, Pull::Up),
        Input::new(p.PIN_14, Pull::Up),
        Input::new(p.PIN_15, Pull::Up),
    ));

    unwrap!(spawner.spawn(tasks::display_task()));
    unwrap!(spawner.spawn(tasks::input_task(buttons, config.polling.button_poll_ms)));

    let mut renderer = Renderer::new();
    renderer.render_boot();
    tasks::publish(renderer.screen_mut()).await;

    // CYW43 radio on PIO0: PWR=GPIO23, CS=GPIO25, DIO=GPIO24, CLK=GPIO29
    let fw = include_bytes!("../cyw43-firmware/43439A0.bin");
    let clm = include_bytes!("../cyw43-firmware/43439A0_clm.bin");

    let pwr = Output::new(p.PIN_23, Level::Low);
    let cs = Output::new(p.PIN_25, Level::High);
    let mut pio = Pio::new(p.PIO0, Irqs);
    let spi = PioSpi::new(
        &mut pio.common,
        pio.sm0,
        DEFAULT_CLOCK_DIVIDER,
        pio.irq0,
        cs,
        p.PIN_24,
        p.PIN_29,
        p.DMA_CH0,
    );

    let state = RADIO_STATE.init(cyw43::State::new());
    let (net_device, mut control, runner) = cyw43::new(state, pwr, spi, fw).await;
    unwrap!(spawner.spawn(tasks::radio_task(runner)));

    control.init(clm).await;
    control
        .set_power_management(cyw43::PowerManagementMode::None)
        .await;
    info!("Radio initialized");

    // Only seeds local port and sequence number choice
    let seed = 0x9e37_79b9_7f4a_7c15 ^ Instant::now().as_ticks();
    let (stack, net_runner) = embassy_net::new(
        net_device,
        embassy_net::Config::dhcpv4(Default::default()),
        NET_RESOURCES.init(StackResources::new()),
        seed,
    );
    unwrap!(spawner.spawn(tasks::net_task(net_runner)));

    loop {
        let options = match WIFI_PASSWORD {
            Some(password) if !password.is_empty() => JoinOptions::new(password.as_bytes()),
            _ => JoinOptions::new_open(),
        };
        match control.join(WIFI_SSID, options).await {
            Ok(()) => break,
            Err(e) => {
                warn!("Join of {} failed with status {}", WIFI_SSID, e.status);
                Timer::after_secs(JOIN_RETRY_SECS).await;
            }
        }
    }
    info!("Joined {}, waiting for DHCP", WIFI_SSID);

    stack.wait_config_up().await;
    if let Some(v4) = stack.config_v4() {
        info!("Network up, address {}", v4.address);
    }

    unwrap!(spawner.spawn(tasks::controller_task(stack, buttons, config)));

    info!("All tasks spawned, firmware running");

    loop {
        Timer::after_secs(60).await;
        trace!("Main loop heartbeat");
    }
}
