//! Screen output over the defmt log
//!
//! Stands in for the panel driver: every redraw is written to the RTT log
//! row by row, with the row's pen mapped to a log level.

use defmt::*;

use pitwall_display::{DisplayBackend, DisplayError, Tone, SCREEN_COLS, SCREEN_ROWS};

/// Text backend that logs each drawn row
pub struct LogDisplay {
    frames: u32,
}

impl LogDisplay {
    pub fn new() -> Self {
        Self { frames: 0 }
    }
}

impl DisplayBackend for LogDisplay {
    fn clear(&mut self) -> Result<(), DisplayError> {
        self.frames = self.frames.wrapping_add(1);
        info!("---- screen {} ----", self.frames);
        Ok(())
    }

    fn draw_text(&mut self, row: u8, tone: Tone, text: &str) -> Result<(), DisplayError> {
        if usize::from(row) >= SCREEN_ROWS {
            return Err(DisplayError::InvalidCoordinates);
        }
        match tone {
            Tone::Alert => warn!("{=u8} | {=str}", row, text),
            Tone::Good | Tone::Info | Tone::Normal => info!("{=u8} | {=str}", row, text),
        }
        Ok(())
    }

    fn invert_row(&mut self, row: u8) -> Result<(), DisplayError> {
        debug!("row {} selected", row);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), DisplayError> {
        Ok(())
    }

    fn dimensions(&self) -> (u8, u8) {
        (SCREEN_COLS as u8, SCREEN_ROWS as u8)
    }
}
