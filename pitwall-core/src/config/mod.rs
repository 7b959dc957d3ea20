//! Client configuration
//!
//! Defines the runtime settings and a small TOML-subset parser for the
//! `client.toml` file embedded in the firmware image.

pub mod toml;
pub mod types;

pub use self::toml::{parse_config, ConfigError};
pub use types::*;
