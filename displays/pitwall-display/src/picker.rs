//! Scrollable list selection driven by the four panel buttons
//!
//! A cancels, X moves up, Y moves down (both wrap), B confirms.

use core::ops::Range;

use pitwall_core::traits::Button;

/// Result of one button press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PickerEvent {
    /// Cursor moved; redraw
    Moved,
    /// Item at this index was chosen
    Selected(usize),
    /// Selection abandoned
    Cancelled,
}

/// Cursor and scroll window over `count` items
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Picker {
    count: usize,
    cursor: usize,
    window_start: usize,
    visible: usize,
}

impl Picker {
    pub fn new(count: usize, visible: usize) -> Self {
        Self {
            count,
            cursor: 0,
            window_start: 0,
            visible: visible.max(1),
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Indices currently on screen
    pub fn window(&self) -> Range<usize> {
        self.window_start..(self.window_start + self.visible).min(self.count)
    }

    pub fn handle(&mut self, button: Button) -> PickerEvent {
        if self.count == 0 {
            return PickerEvent::Cancelled;
        }

        match button {
            Button::A => return PickerEvent::Cancelled,
            Button::B => return PickerEvent::Selected(self.cursor),
            Button::X => self.cursor = (self.cursor + self.count - 1) % self.count,
            Button::Y => self.cursor = (self.cursor + 1) % self.count,
        }

        // Keep cursor visible within the window
        if self.cursor < self.window_start {
            self.window_start = self.cursor;
        }
        if self.cursor >= self.window_start + self.visible {
            self.window_start = self.cursor + 1 - self.visible;
        }
        PickerEvent::Moved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wraps_and_scrolls() {
        let mut picker = Picker::new(5, 3);
        assert_eq!(picker.window(), 0..3);

        assert_eq!(picker.handle(Button::X), PickerEvent::Moved);
        assert_eq!(picker.cursor(), 4);
        assert_eq!(picker.window(), 2..5);

        picker.handle(Button::Y);
        assert_eq!(picker.cursor(), 0);
        assert_eq!(picker.window(), 0..3);

        picker.handle(Button::Y);
        picker.handle(Button::Y);
        picker.handle(Button::Y);
        assert_eq!(picker.cursor(), 3);
        assert_eq!(picker.window(), 1..4);
    }

    #[test]
    fn test_confirm_and_cancel() {
        let mut picker = Picker::new(4, 8);
        picker.handle(Button::Y);
        assert_eq!(picker.handle(Button::B), PickerEvent::Selected(1));
        assert_eq!(picker.handle(Button::A), PickerEvent::Cancelled);
        assert_eq!(picker.window(), 0..4);
    }

    #[test]
    fn test_empty_list_cancels() {
        let mut picker = Picker::new(0, 8);
        assert_eq!(picker.handle(Button::B), PickerEvent::Cancelled);
        assert!(picker.window().is_empty());
    }
}
