//! Text formatting for lap rows

use core::fmt::Write;

use heapless::String;
use pitwall_core::records::{DriverNumber, LapNumber, LapTime};

/// Shown when there is no lap duration
pub const DURATION_PLACEHOLDER: &str = "--:--.---";

/// Shown when there is no gap to compute
pub const GAP_PLACEHOLDER: &str = "+--.---";

/// Shown when the lap counter is unknown
pub const LAP_PLACEHOLDER: &str = "lap --";

/// Three-letter codes of the current grid, sorted by number
pub const DRIVER_CODES: &[(DriverNumber, &str)] = &[
    (1, "NOR"),
    (3, "VER"),
    (5, "BOR"),
    (6, "HAD"),
    (10, "GAS"),
    (11, "PER"),
    (12, "ANT"),
    (14, "ALO"),
    (16, "LEC"),
    (18, "STR"),
    (23, "ALB"),
    (27, "HUL"),
    (30, "LAW"),
    (31, "OCO"),
    (41, "LIN"),
    (43, "COL"),
    (44, "HAM"),
    (55, "SAI"),
    (63, "RUS"),
    (77, "BOT"),
    (81, "PIA"),
    (87, "BEAR"),
];

pub fn driver_code_of(driver: DriverNumber) -> Option<&'static str> {
    DRIVER_CODES
        .binary_search_by_key(&driver, |(n, _)| *n)
        .ok()
        .map(|i| DRIVER_CODES[i].1)
}

/// Code for a driver, the bare number if unknown, `?` if missing
pub fn driver_code(driver: Option<DriverNumber>) -> String<6> {
    let mut out = String::new();
    match driver {
        None => {
            let _ = out.push('?');
        }
        Some(n) => match driver_code_of(n) {
            Some(code) => {
                let _ = out.push_str(code);
            }
            None => {
                let _ = write!(out, "{}", n);
            }
        },
    }
    out
}

/// Picker label, e.g. `HAM #44`
pub fn driver_label(driver: DriverNumber) -> String<12> {
    let mut out = String::new();
    let _ = write!(out, "{} #{}", driver_code(Some(driver)), driver);
    out
}

/// `MM:SS.mmm`
pub fn lap_duration(time: LapTime) -> String<12> {
    let ms = time.as_millis();
    let mut out = String::new();
    let _ = write!(
        out,
        "{:02}:{:02}.{:03}",
        ms / 60_000,
        (ms / 1000) % 60,
        ms % 1000
    );
    out
}

/// Signed gap to the reference lap, e.g. `+0.412` or `-1.030`
pub fn gap_to_leader(time: LapTime, leader: Option<LapTime>) -> String<12> {
    let mut out = String::new();
    let Some(leader) = leader else {
        let _ = out.push_str(GAP_PLACEHOLDER);
        return out;
    };

    let gap = i64::from(time.as_millis()) - i64::from(leader.as_millis());
    let sign = if gap >= 0 { '+' } else { '-' };
    let gap = gap.unsigned_abs();
    let _ = write!(out, "{}{}.{:03}", sign, gap / 1000, gap % 1000);
    out
}

/// `lap 07`, or the placeholder for null and absent counters
pub fn lap_number(lap: LapNumber) -> String<10> {
    let mut out = String::new();
    match lap.value() {
        Some(n) => {
            let _ = write!(out, "lap {:02}", n);
        }
        None => {
            let _ = out.push_str(LAP_PLACEHOLDER);
        }
    }
    out
}
