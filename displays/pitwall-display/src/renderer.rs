//! Screen rendering
//!
//! Builds screens for the client's UI states. Layout: a title row, one
//! row per tracked driver, then the optional event block centered below.

use core::fmt::Write;

use heapless::String;
use pitwall_core::orchestrator::{LapBoard, Status, TargetState};
use pitwall_core::records::{DriverNumber, EventInfo, LapTime, SessionInfo};

use crate::format::{
    driver_code, gap_to_leader, lap_duration, lap_number, DURATION_PLACEHOLDER, GAP_PLACEHOLDER,
    LAP_PLACEHOLDER,
};
use crate::picker::Picker;
use crate::screen::{Screen, Tone, LINE_LEN, SCREEN_ROWS};

/// Picker rows between the title and the hint line
pub const PICKER_ROWS: usize = SCREEN_ROWS - 2;

/// Screen renderer for different UI states
pub struct Renderer {
    screen: Screen,
}

impl Renderer {
    /// Create a new renderer
    pub fn new() -> Self {
        Self {
            screen: Screen::new(),
        }
    }

    /// Get the current screen buffer
    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn screen_mut(&mut self) -> &mut Screen {
        &mut self.screen
    }

    /// Render the boot screen
    pub fn render_boot(&mut self) {
        self.render_message(&["Booting...", "Starting network"], Tone::Info);
    }

    /// Render a few plain lines from the top
    pub fn render_message(&mut self, lines: &[&str], tone: Tone) {
        self.screen.clear();
        for (row, line) in lines.iter().take(SCREEN_ROWS).enumerate() {
            self.screen.set_line(row, line, tone);
        }
    }

    /// Render the lap table
    ///
    /// Gaps are relative to the first tracked driver. `event` and
    /// `session` are drawn only when given.
    pub fn render_laps<const N: usize>(
        &mut self,
        board: &LapBoard<N>,
        event: Option<&EventInfo>,
        session: Option<&SessionInfo>,
    ) {
        self.screen.clear();

        let has_laps = board.iter().any(|(_, state)| state.lap().is_some());
        let title_tone = if has_laps { Tone::Good } else { Tone::Info };
        self.screen.set_line(0, "Latest lap times", title_tone);

        let leader = board
            .iter()
            .next()
            .and_then(|(_, state)| state.lap())
            .map(|lap| lap.lap_duration);

        let mut row = 1;
        for (driver, state) in board.iter() {
            if row >= SCREEN_ROWS {
                break;
            }
            let (line, tone) = lap_row(driver, state, leader);
            self.screen.set_line(row, &line, tone);
            row += 1;
        }

        // Blank spacer row before the event block
        row += 1;
        let mut info = |text: &str| {
            if !text.is_empty() && row < SCREEN_ROWS {
                self.screen.set_centered(row, text, Tone::Info);
                row += 1;
            }
        };
        if let Some(event) = event {
            info(event.meeting_name.as_str());
        }
        if let Some(session) = session {
            info(session.title().as_str());
            info(session.circuit_short_name.as_str());
            info(session.country_name.as_str());
        }
    }

    /// Render a list picker
    ///
    /// `label` formats the item at an index.
    pub fn render_picker<F>(&mut self, title: &str, picker: &Picker, label: F)
    where
        F: Fn(usize) -> String<LINE_LEN>,
    {
        self.screen.clear();
        self.screen.set_line(0, title, Tone::Normal);

        for (i, idx) in picker.window().enumerate() {
            let row = i + 1;
            let mut line: String<LINE_LEN> = String::new();
            let selected = idx == picker.cursor();
            let _ = write!(line, "{} {}", if selected { '>' } else { ' ' }, label(idx));
            if selected {
                self.screen.set_line(row, &line, Tone::Info);
                self.screen.set_selection(row);
            } else {
                self.screen.set_line(row, &line, Tone::Normal);
            }
        }

        self.screen
            .set_line(SCREEN_ROWS - 1, "A back X/Y move B ok", Tone::Info);
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

/// One lap table row and its pen
pub fn lap_row(
    driver: DriverNumber,
    state: TargetState,
    leader: Option<LapTime>,
) -> (String<LINE_LEN>, Tone) {
    let mut line: String<LINE_LEN> = String::new();
    let code = driver_code(Some(driver));

    let tone = match state {
        TargetState::Fresh(lap) | TargetState::Stale(lap, _) => {
            let _ = write!(
                line,
                "{:<4} {} {:>7} {}",
                code.as_str(),
                lap_duration(lap.lap_duration).as_str(),
                gap_to_leader(lap.lap_duration, leader).as_str(),
                lap_number(lap.lap_number).as_str(),
            );
            if state.is_stale() {
                let _ = line.push('*');
                Tone::Normal
            } else {
                Tone::Good
            }
        }
        TargetState::Pending => {
            let _ = write!(
                line,
                "{:<4} {} {:>7} {}",
                code.as_str(),
                DURATION_PLACEHOLDER,
                GAP_PLACEHOLDER,
                LAP_PLACEHOLDER
            );
            Tone::Info
        }
        TargetState::Placeholder(status) => {
            let _ = write!(line, "{:<4} {}", code.as_str(), status);
            match status {
                Status::NoData => Tone::Info,
                _ => Tone::Alert,
            }
        }
    };

    (line, tone)
}
