//! Decoded record types
//!
//! Records are small `Copy`/`Clone` values produced fresh each fetch cycle.
//! They never borrow from the network buffers they were decoded from.

use heapless::String;

/// Racing number identifying a driver
pub type DriverNumber = u16;

/// Maximum length of an event/session text field
pub const MAX_INFO_LEN: usize = 32;

/// Lap duration in whole milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LapTime(u32);

impl LapTime {
    /// Create from milliseconds
    pub const fn from_millis(ms: u32) -> Self {
        Self(ms)
    }

    /// Duration in milliseconds
    pub const fn as_millis(self) -> u32 {
        self.0
    }

    /// Parse a JSON number of seconds (e.g. `91.154`)
    ///
    /// Rounds to the nearest millisecond. Negative values are rejected.
    pub fn from_seconds_str(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() || text.starts_with('-') {
            return None;
        }

        if text.contains(['e', 'E']) {
            let seconds: f32 = text.parse().ok()?;
            if !(0.0..4_000_000.0).contains(&seconds) {
                return None;
            }
            return Some(Self((seconds * 1000.0 + 0.5) as u32));
        }

        let (whole, frac) = match text.split_once('.') {
            Some((w, f)) => (w, f),
            None => (text, ""),
        };
        if whole.is_empty() && frac.is_empty() {
            return None;
        }

        let mut ms: u32 = 0;
        for b in whole.bytes() {
            if !b.is_ascii_digit() {
                return None;
            }
            ms = ms.checked_mul(10)?.checked_add((b - b'0') as u32)?;
        }
        ms = ms.checked_mul(1000)?;

        let mut scale = 100;
        let mut round_up = false;
        for (i, b) in frac.bytes().enumerate() {
            if !b.is_ascii_digit() {
                return None;
            }
            let digit = (b - b'0') as u32;
            if i < 3 {
                ms = ms.checked_add(digit * scale)?;
                scale /= 10;
            } else if i == 3 {
                round_up = digit >= 5;
            }
        }
        if round_up {
            ms = ms.checked_add(1)?;
        }

        Some(Self(ms))
    }
}

/// Lap counter as reported by the service
///
/// An explicit `null` and a missing field are both valid payloads and are
/// kept apart so callers can tell them apart if they care to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LapNumber {
    /// Field present with a value
    Known(u16),
    /// Field present and `null`
    Null,
    /// Field missing from the record
    #[default]
    Absent,
}

impl LapNumber {
    /// The lap number, if one was reported
    pub fn value(self) -> Option<u16> {
        match self {
            LapNumber::Known(n) => Some(n),
            _ => None,
        }
    }
}

/// Latest completed lap for a driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LapRecord {
    /// Driver number as reported in the record (may be missing)
    pub driver_number: Option<DriverNumber>,
    /// Lap duration (required, never null)
    pub lap_duration: LapTime,
    /// Lap counter
    pub lap_number: LapNumber,
}

/// One entry of a standings/classification list
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StandingsEntry {
    /// Driver number (entries without one are never emitted)
    pub driver_number: DriverNumber,
    /// Reported position, if the entry carried one
    pub position: Option<u16>,
    /// Championship or session points
    pub points: Option<f32>,
    /// Zero-based index of the entry within the list
    pub index: u16,
}

impl StandingsEntry {
    /// Effective rank: reported position, or list order when absent
    pub fn rank(&self) -> u16 {
        self.position.unwrap_or(self.index.saturating_add(1))
    }
}

/// Meeting (race weekend) header
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EventInfo {
    pub meeting_name: String<MAX_INFO_LEN>,
}

/// Session header
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SessionInfo {
    pub session_type: String<MAX_INFO_LEN>,
    pub session_name: String<MAX_INFO_LEN>,
    pub circuit_short_name: String<MAX_INFO_LEN>,
    pub country_name: String<MAX_INFO_LEN>,
}

impl SessionInfo {
    /// "Race - Sprint" style label, skipping empty parts
    pub fn title(&self) -> String<{ 2 * MAX_INFO_LEN + 3 }> {
        let mut out = String::new();
        for part in [self.session_type.as_str(), self.session_name.as_str()] {
            if part.is_empty() {
                continue;
            }
            if !out.is_empty() {
                let _ = out.push_str(" - ");
            }
            let _ = out.push_str(part);
        }
        out
    }
}

/// Parse a JSON number (or numeric string contents) into a `u16`
///
/// Fractional parts are truncated, matching how the service's integer
/// fields occasionally arrive as `44.0`.
pub fn parse_u16(text: &str) -> Option<u16> {
    let text = text.trim();
    let whole = match text.split_once('.') {
        Some((w, f)) if f.bytes().all(|b| b.is_ascii_digit()) => w,
        Some(_) => return None,
        None => text,
    };
    if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    whole.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lap_time_parse() {
        assert_eq!(LapTime::from_seconds_str("91.154"), Some(LapTime::from_millis(91_154)));
        assert_eq!(LapTime::from_seconds_str("90"), Some(LapTime::from_millis(90_000)));
        assert_eq!(LapTime::from_seconds_str("90.1"), Some(LapTime::from_millis(90_100)));
        assert_eq!(LapTime::from_seconds_str("1.2e1"), Some(LapTime::from_millis(12_000)));
    }

    #[test]
    fn test_lap_time_rounding() {
        assert_eq!(LapTime::from_seconds_str("89.9996"), Some(LapTime::from_millis(90_000)));
        assert_eq!(LapTime::from_seconds_str("89.9994"), Some(LapTime::from_millis(89_999)));
    }

    #[test]
    fn test_lap_time_rejects_garbage() {
        assert_eq!(LapTime::from_seconds_str("-1.0"), None);
        assert_eq!(LapTime::from_seconds_str("abc"), None);
        assert_eq!(LapTime::from_seconds_str(""), None);
        assert_eq!(LapTime::from_seconds_str("."), None);
    }

    #[test]
    fn test_parse_u16() {
        assert_eq!(parse_u16("44"), Some(44));
        assert_eq!(parse_u16("44.0"), Some(44));
        assert_eq!(parse_u16(" 7 "), Some(7));
        assert_eq!(parse_u16("-3"), None);
        assert_eq!(parse_u16("70000"), None);
        assert_eq!(parse_u16("x1"), None);
    }

    #[test]
    fn test_standings_rank_fallback() {
        let entry = StandingsEntry {
            driver_number: 44,
            position: None,
            points: None,
            index: 4,
        };
        assert_eq!(entry.rank(), 5);

        let entry = StandingsEntry {
            position: Some(2),
            ..entry
        };
        assert_eq!(entry.rank(), 2);
    }

    #[test]
    fn test_session_title() {
        let mut info = SessionInfo::default();
        let _ = info.session_type.push_str("Race");
        assert_eq!(info.title().as_str(), "Race");
        let _ = info.session_name.push_str("Sprint");
        assert_eq!(info.title().as_str(), "Race - Sprint");
    }
}
