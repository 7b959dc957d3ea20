//! Screen buffer types
//!
//! A character screen for the 240x135 panel: ten rows of thirty
//! characters at the 8x12 font's double scale.

use heapless::String;

/// Number of character rows
pub const SCREEN_ROWS: usize = 10;

/// Number of character columns
pub const SCREEN_COLS: usize = 30;

/// Maximum characters per line
pub const LINE_LEN: usize = SCREEN_COLS;

/// Pen used for a row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Tone {
    /// White
    #[default]
    Normal,
    /// Green; fresh lap data
    Good,
    /// Cyan; placeholders, event info and the picker cursor
    Info,
    /// Red; errors
    Alert,
}

/// Text screen with a per-row pen and an optional selected row
#[derive(Clone)]
pub struct Screen {
    lines: [String<LINE_LEN>; SCREEN_ROWS],
    tones: [Tone; SCREEN_ROWS],
    /// Row drawn inverted, if any
    selected: Option<u8>,
    /// Whether the screen needs to be redrawn
    dirty: bool,
}

impl Default for Screen {
    fn default() -> Self {
        Self::new()
    }
}

impl Screen {
    /// Create a new empty screen
    pub const fn new() -> Self {
        const EMPTY: String<LINE_LEN> = String::new();
        Self {
            lines: [EMPTY; SCREEN_ROWS],
            tones: [Tone::Normal; SCREEN_ROWS],
            selected: None,
            dirty: true,
        }
    }

    /// Clear the entire screen
    pub fn clear(&mut self) {
        for line in &mut self.lines {
            line.clear();
        }
        self.tones = [Tone::Normal; SCREEN_ROWS];
        self.selected = None;
        self.dirty = true;
    }

    /// Set the content of a row, truncating to the screen width
    pub fn set_line(&mut self, row: usize, text: &str, tone: Tone) {
        if row >= SCREEN_ROWS {
            return;
        }
        self.lines[row].clear();
        for c in text.chars() {
            if self.lines[row].push(c).is_err() {
                break;
            }
        }
        self.tones[row] = tone;
        self.dirty = true;
    }

    /// Set a row horizontally centered
    pub fn set_centered(&mut self, row: usize, text: &str, tone: Tone) {
        let width = text.chars().count();
        if width >= LINE_LEN {
            self.set_line(row, text, tone);
            return;
        }

        let mut line: String<LINE_LEN> = String::new();
        for _ in 0..(LINE_LEN - width) / 2 {
            let _ = line.push(' ');
        }
        let _ = line.push_str(text);
        self.set_line(row, &line, tone);
    }

    /// Get the content of a specific row
    pub fn get_line(&self, row: usize) -> Option<&str> {
        self.lines.get(row).map(|s| s.as_str())
    }

    pub fn tone(&self, row: usize) -> Tone {
        self.tones.get(row).copied().unwrap_or_default()
    }

    /// Select a row for highlighting
    pub fn set_selection(&mut self, row: usize) {
        if row < SCREEN_ROWS {
            self.selected = Some(row as u8);
            self.dirty = true;
        }
    }

    pub fn selection(&self) -> Option<u8> {
        self.selected
    }

    /// Check if screen needs redrawing
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Mark screen as clean (after rendering)
    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// Get all lines with their pens
    pub fn lines(&self) -> impl Iterator<Item = (&str, Tone)> {
        self.lines.iter().map(|s| s.as_str()).zip(self.tones.iter().copied())
    }

    /// Get number of rows
    pub const fn rows(&self) -> usize {
        SCREEN_ROWS
    }

    /// Get number of columns
    pub const fn cols(&self) -> usize {
        SCREEN_COLS
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Screen {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Screen[");
        for (i, line) in self.lines.iter().enumerate() {
            if line.is_empty() {
                continue;
            }
            if i > 0 {
                defmt::write!(f, " | ");
            }
            defmt::write!(f, "{}", line.as_str());
        }
        defmt::write!(f, "]");
    }
}
