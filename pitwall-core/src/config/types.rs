//! Configuration type definitions
//!
//! Runtime settings for the client. Buffer sizes are compile-time
//! constants (see [`CHUNK_BYTES`] and [`TAIL_BYTES`]) because they size
//! stack arrays.
//!
//! [`CHUNK_BYTES`]: crate::transport::CHUNK_BYTES
//! [`TAIL_BYTES`]: crate::extract::TAIL_BYTES

use heapless::{String, Vec};

use crate::orchestrator::{FailurePolicy, MAX_TRACKED};
use crate::records::DriverNumber;

/// Maximum length of the service base URL
pub const MAX_BASE_URL_LEN: usize = 96;

/// Service endpoint and socket timeouts
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NetworkConfig {
    /// Base URL, e.g. `http://192.168.26.249:8000`
    pub base_url: String<MAX_BASE_URL_LEN>,
    /// Give up connecting after this long
    pub connect_timeout_ms: u32,
    /// Give up on a single read after this long
    pub read_timeout_ms: u32,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        let mut base_url = String::new();
        let _ = base_url.push_str("http://192.168.26.249:8000");
        Self {
            base_url,
            connect_timeout_ms: 10_000,
            read_timeout_ms: 10_000,
        }
    }
}

/// Cycle timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PollingConfig {
    /// Start-to-start interval of lap fetch cycles
    pub interval_ms: u32,
    /// Pause after boot before the first request
    pub startup_delay_ms: u32,
    /// Button sampling period
    pub button_poll_ms: u32,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_ms: 5_000,
            startup_delay_ms: 1_500,
            button_poll_ms: 20,
        }
    }
}

/// Which drivers to follow
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TrackingConfig {
    /// Number of drivers shown
    pub count: u8,
    /// Used when the session ranking is unavailable, and as padding
    pub default_drivers: Vec<DriverNumber, MAX_TRACKED>,
    /// Seed the tracked list from the latest session result at startup
    pub rank_from_session: bool,
    /// What a failed fetch does to the last good value
    pub failure_policy: FailurePolicy,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        let mut default_drivers = Vec::new();
        let _ = default_drivers.extend_from_slice(&[44, 81, 3]);
        Self {
            count: 3,
            default_drivers,
            rank_from_session: true,
            failure_policy: FailurePolicy::Placeholder,
        }
    }
}

impl TrackingConfig {
    /// Tracked count clamped to capacity
    pub fn limit(&self) -> usize {
        usize::from(self.count).clamp(1, MAX_TRACKED)
    }
}

/// Screen options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DisplayConfig {
    /// Show meeting/session lines under the lap rows
    pub show_event_info: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            show_event_info: true,
        }
    }
}

/// Complete client configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClientConfig {
    pub network: NetworkConfig,
    pub polling: PollingConfig,
    pub tracking: TrackingConfig,
    pub display: DisplayConfig,
}
