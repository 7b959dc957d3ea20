//! Client configuration loading
//!
//! client.toml is embedded at build time and already validated by
//! build.rs. If the on-device parser still rejects it, the compiled
//! defaults are used.

use defmt::*;

use pitwall_core::config::{parse_config, ClientConfig};

/// Parse the embedded configuration, falling back to defaults
pub fn load(text: &str) -> ClientConfig {
    match parse_config(text) {
        Ok(config) => {
            info!(
                "Config: {} every {} ms, tracking {} drivers",
                config.network.base_url.as_str(),
                config.polling.interval_ms,
                config.tracking.limit()
            );
            config
        }
        Err(e) => {
            error!("Failed to parse embedded config: {:?}", e);
            error!("Using compiled defaults");
            ClientConfig::default()
        }
    }
}
