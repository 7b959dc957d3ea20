//! Physical input and time abstractions

/// Front-panel buttons (Pico Display pack layout)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Button {
    A,
    B,
    X,
    Y,
}

impl Button {
    /// All buttons in priority order
    pub const ALL: [Button; 4] = [Button::A, Button::B, Button::X, Button::Y];

    const fn mask(self) -> u8 {
        match self {
            Button::A => 0b0001,
            Button::B => 0b0010,
            Button::X => 0b0100,
            Button::Y => 0b1000,
        }
    }

    pub(crate) const fn to_byte(self) -> u8 {
        self.mask()
    }

    pub(crate) fn from_byte(byte: u8) -> Option<Self> {
        Button::ALL.into_iter().find(|b| b.mask() == byte)
    }
}

/// Set of buttons currently held down
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonSet(u8);

impl ButtonSet {
    /// No buttons held
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Add a button to the set
    pub const fn with(self, button: Button) -> Self {
        Self(self.0 | button.mask())
    }

    /// Check if a button is in the set
    pub const fn contains(self, button: Button) -> bool {
        self.0 & button.mask() != 0
    }

    /// Check if no button is held
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Buttons held now that were not held in `previous`
    pub const fn pressed_since(self, previous: ButtonSet) -> ButtonSet {
        Self(self.0 & !previous.0)
    }

    /// Highest-priority button in the set
    pub fn first(self) -> Option<Button> {
        Button::ALL.into_iter().find(|b| self.contains(*b))
    }
}

/// Source of raw button levels
pub trait Buttons {
    /// Sample which buttons are currently held
    fn sample(&mut self) -> ButtonSet;
}

/// Monotonic millisecond clock
pub trait Clock {
    /// Milliseconds since an arbitrary fixed origin
    fn now_ms(&self) -> u64;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_set() {
        let set = ButtonSet::empty().with(Button::X).with(Button::B);
        assert!(set.contains(Button::B));
        assert!(!set.contains(Button::A));
        assert_eq!(set.first(), Some(Button::B));
        assert!(ButtonSet::empty().first().is_none());
    }

    #[test]
    fn test_pressed_since() {
        let before = ButtonSet::empty().with(Button::A);
        let now = ButtonSet::empty().with(Button::A).with(Button::Y);
        assert_eq!(now.pressed_since(before).first(), Some(Button::Y));
        assert!(before.pressed_since(now).is_empty());
    }

    #[test]
    fn test_button_byte_roundtrip() {
        for button in Button::ALL {
            assert_eq!(Button::from_byte(button.to_byte()), Some(button));
        }
        assert_eq!(Button::from_byte(0), None);
    }
}
