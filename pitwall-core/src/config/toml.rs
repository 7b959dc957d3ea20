//! Simple TOML parser for client configuration
//!
//! A minimal, allocation-free parser for the subset used by `client.toml`.
//! It does NOT support the full TOML language.
//!
//! Supported features:
//! - Key = value pairs (string, integer, boolean)
//! - Integer arrays on one line: `default_drivers = [44, 81, 3]`
//! - [section] headers
//! - Comments (# ...)
//!
//! Unknown sections and keys are ignored so older firmware accepts newer
//! files.

use heapless::{String, Vec};

use super::types::ClientConfig;
use crate::orchestrator::FailurePolicy;

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Malformed section header
    InvalidSection,
    /// Line is neither a header nor `key = value`
    InvalidLine,
    /// Value has the wrong type or is out of range
    InvalidValue,
    /// String or array longer than its field allows
    TooLong,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Network,
    Polling,
    Tracking,
    Display,
    Unknown,
}

/// Parse TOML text into a [`ClientConfig`], starting from the defaults
pub fn parse_config(input: &str) -> Result<ClientConfig, ConfigError> {
    let mut config = ClientConfig::default();
    let mut section = Section::Root;

    for line in input.lines() {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.starts_with('[') {
            section = parse_section_header(line)?;
            continue;
        }

        let (key, value) = parse_key_value(line).ok_or(ConfigError::InvalidLine)?;
        apply(&mut config, section, key, value)?;
    }

    Ok(config)
}

fn parse_section_header(line: &str) -> Result<Section, ConfigError> {
    let name = line
        .strip_prefix('[')
        .and_then(|l| l.strip_suffix(']'))
        .ok_or(ConfigError::InvalidSection)?
        .trim();

    Ok(match name {
        "network" => Section::Network,
        "polling" => Section::Polling,
        "tracking" => Section::Tracking,
        "display" => Section::Display,
        "" => return Err(ConfigError::InvalidSection),
        _ => Section::Unknown,
    })
}

fn apply(config: &mut ClientConfig, section: Section, key: &str, value: &str) -> Result<(), ConfigError> {
    match (section, key) {
        (Section::Network, "base_url") => {
            config.network.base_url = parse_bounded_string(value)?;
        }
        (Section::Network, "connect_timeout_ms") => {
            config.network.connect_timeout_ms = parse_int(value)?;
        }
        (Section::Network, "read_timeout_ms") => {
            config.network.read_timeout_ms = parse_int(value)?;
        }
        (Section::Polling, "interval_ms") => {
            config.polling.interval_ms = parse_int(value)?;
            if config.polling.interval_ms == 0 {
                return Err(ConfigError::InvalidValue);
            }
        }
        (Section::Polling, "startup_delay_ms") => {
            config.polling.startup_delay_ms = parse_int(value)?;
        }
        (Section::Polling, "button_poll_ms") => {
            config.polling.button_poll_ms = parse_int(value)?;
            if config.polling.button_poll_ms == 0 {
                return Err(ConfigError::InvalidValue);
            }
        }
        (Section::Tracking, "count") => {
            config.tracking.count = parse_int(value)?;
        }
        (Section::Tracking, "default_drivers") => {
            config.tracking.default_drivers = parse_int_array(value)?;
        }
        (Section::Tracking, "rank_from_session") => {
            config.tracking.rank_from_session = parse_bool(value)?;
        }
        (Section::Tracking, "failure_policy") => {
            config.tracking.failure_policy = match parse_string(value) {
                "placeholder" => FailurePolicy::Placeholder,
                "keep_stale" => FailurePolicy::KeepStale,
                _ => return Err(ConfigError::InvalidValue),
            };
        }
        (Section::Display, "show_event_info") => {
            config.display.show_event_info = parse_bool(value)?;
        }
        _ => {}
    }
    Ok(())
}

/// Split `key = value`, dropping an inline comment
fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let eq_pos = line.find('=')?;
    let key = line[..eq_pos].trim();
    let value = line[eq_pos + 1..].trim();
    if key.is_empty() {
        return None;
    }

    // Remove inline comments
    let value = match value.find('#') {
        // Make sure # is not inside a string
        Some(hash_pos) if value[..hash_pos].matches('"').count() % 2 == 0 => value[..hash_pos].trim(),
        _ => value,
    };

    Some((key, value))
}

/// Parse a string value, with or without quotes
fn parse_string(value: &str) -> &str {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        &value[1..value.len() - 1]
    } else {
        value
    }
}

fn parse_bounded_string<const N: usize>(value: &str) -> Result<String<N>, ConfigError> {
    let mut out = String::new();
    out.push_str(parse_string(value)).map_err(|_| ConfigError::TooLong)?;
    Ok(out)
}

/// Parse an integer value
fn parse_int<T: core::str::FromStr>(value: &str) -> Result<T, ConfigError> {
    strip_underscores(value)?
        .parse()
        .map_err(|_| ConfigError::InvalidValue)
}

/// Parse a boolean value
fn parse_bool(value: &str) -> Result<bool, ConfigError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ConfigError::InvalidValue),
    }
}

/// Parse `[1, 2, 3]`
fn parse_int_array<T: core::str::FromStr, const N: usize>(value: &str) -> Result<Vec<T, N>, ConfigError> {
    let inner = value
        .strip_prefix('[')
        .and_then(|v| v.strip_suffix(']'))
        .ok_or(ConfigError::InvalidValue)?;

    let mut out = Vec::new();
    for item in inner.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        out.push(parse_int(item)?).map_err(|_| ConfigError::TooLong)?;
    }
    Ok(out)
}

/// TOML allows `5_000`
fn strip_underscores(value: &str) -> Result<String<24>, ConfigError> {
    let mut out = String::new();
    for c in value.chars().filter(|c| *c != '_') {
        out.push(c).map_err(|_| ConfigError::InvalidValue)?;
    }
    Ok(out)
}
