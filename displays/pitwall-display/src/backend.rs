//! Display backend trait
//!
//! Defines the interface a panel driver implements to show a [`Screen`].

use crate::screen::{Screen, Tone};

/// Display backend errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    /// Communication error with display
    Communication,
    /// Invalid coordinates or dimensions
    InvalidCoordinates,
    /// Display not initialized
    NotInitialized,
}

/// Display backend trait
///
/// Provides a hardware-agnostic interface for text output. Pixel layout
/// and fonts are the implementation's business.
pub trait DisplayBackend {
    /// Clear the entire display
    fn clear(&mut self) -> Result<(), DisplayError>;

    /// Draw one row of text with the given pen
    fn draw_text(&mut self, row: u8, tone: Tone, text: &str) -> Result<(), DisplayError>;

    /// Invert a whole row (for selection highlighting)
    fn invert_row(&mut self, row: u8) -> Result<(), DisplayError>;

    /// Flush buffered content to the display
    fn flush(&mut self) -> Result<(), DisplayError>;

    /// Get the display dimensions
    ///
    /// Returns (columns, rows) in character units
    fn dimensions(&self) -> (u8, u8);
}

/// Draw `screen` if it changed since the last call
///
/// Returns `Ok(false)` when there was nothing to draw.
pub fn present<B: DisplayBackend>(screen: &mut Screen, backend: &mut B) -> Result<bool, DisplayError> {
    if !screen.is_dirty() {
        return Ok(false);
    }

    let (_, rows) = backend.dimensions();
    backend.clear()?;
    for (row, (text, tone)) in screen.lines().enumerate().take(rows as usize) {
        if !text.is_empty() {
            backend.draw_text(row as u8, tone, text)?;
        }
    }
    if let Some(row) = screen.selection() {
        if row < rows {
            backend.invert_row(row)?;
        }
    }
    backend.flush()?;

    screen.mark_clean();
    Ok(true)
}
