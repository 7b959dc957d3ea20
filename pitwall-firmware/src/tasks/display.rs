//! Display task
//!
//! Draws the shared screen buffer whenever the controller publishes a
//! new screen.

use defmt::*;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;

use pitwall_display::{present, Screen};

use crate::channels::SCREEN_UPDATE;
use crate::display::LogDisplay;

/// Shared screen buffer protected by mutex
pub static SCREEN_BUFFER: Mutex<CriticalSectionRawMutex, Screen> = Mutex::new(Screen::new());

/// Copy `screen` to the display task if it changed
pub async fn publish(screen: &mut Screen) {
    if !screen.is_dirty() {
        return;
    }

    let mut shared = SCREEN_BUFFER.lock().await;
    *shared = screen.clone();
    drop(shared);

    screen.mark_clean();
    SCREEN_UPDATE.signal(());
}

#[embassy_executor::task]
pub async fn display_task() {
    info!("Display task started");

    let mut backend = LogDisplay::new();

    loop {
        SCREEN_UPDATE.wait().await;

        let mut screen = SCREEN_BUFFER.lock().await;
        match present(&mut screen, &mut backend) {
            Ok(true) => trace!("Screen drawn"),
            Ok(false) => {}
            Err(e) => warn!("Display update failed: {:?}", e),
        }
    }
}
