//! Build script for pitwall-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Checks that the CYW43 radio firmware blobs are present
//! - Requires Wi-Fi credentials in the build environment
//! - Validates client.toml at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Radio firmware files expected next to this script
const RADIO_BLOBS: [&str; 2] = ["cyw43-firmware/43439A0.bin", "cyw43-firmware/43439A0_clm.bin"];

/// Mirrors `MAX_TRACKED` in pitwall-core
const MAX_TRACKED: i64 = 4;

/// Mirrors `MAX_BASE_URL_LEN` in pitwall-core
const MAX_BASE_URL_LEN: usize = 96;

fn main() {
    setup_linker();
    check_radio_firmware();
    check_credentials();
    validate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// The radio blobs are not redistributed with the source
fn check_radio_firmware() {
    let missing: Vec<String> = RADIO_BLOBS
        .iter()
        .inspect(|blob| println!("cargo:rerun-if-changed={}", blob))
        .filter(|blob| !Path::new(blob).exists())
        .map(|blob| format!("missing {}", blob))
        .collect();

    if !missing.is_empty() {
        let mut lines = missing;
        lines.push("Copy them from the embassy repository (cyw43-firmware/).".to_string());
        fail("CYW43 radio firmware not found", &lines);
    }
}

/// Wi-Fi credentials are compiled in, never stored in client.toml
fn check_credentials() {
    println!("cargo:rerun-if-env-changed=WIFI_SSID");
    println!("cargo:rerun-if-env-changed=WIFI_PASSWORD");

    match env::var("WIFI_SSID") {
        Ok(ssid) if !ssid.is_empty() && ssid.len() <= 32 => {}
        Ok(_) => fail("Invalid WIFI_SSID", &["SSID must be 1 to 32 bytes".to_string()]),
        Err(_) => fail(
            "WIFI_SSID not set",
            &[
                "Build with WIFI_SSID=<network> and, unless the network".to_string(),
                "is open, WIFI_PASSWORD=<passphrase>.".to_string(),
            ],
        ),
    }
}

/// Validate client.toml configuration at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=client.toml");

    let config_path = Path::new("client.toml");
    if !config_path.exists() {
        fail(
            "client.toml not found",
            &[
                "The firmware embeds client.toml at build time.".to_string(),
                "Create one in the pitwall-firmware directory.".to_string(),
            ],
        );
    }

    let content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => fail("Failed to read client.toml", &[e.to_string()]),
    };

    let config: toml::Value = match toml::from_str(&content) {
        Ok(value) => value,
        Err(e) => {
            let lines: Vec<String> = e.to_string().lines().map(str::to_string).collect();
            fail("Invalid TOML syntax in client.toml", &lines);
        }
    };

    let mut errors = Vec::new();
    validate_network(&config, &mut errors);
    validate_polling(&config, &mut errors);
    validate_tracking(&config, &mut errors);

    if !errors.is_empty() {
        fail("Invalid client configuration", &errors);
    }

    println!("cargo:warning=client.toml validated successfully");
}

fn validate_network(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(network) = config.get("network") else {
        return;
    };

    match network.get("base_url") {
        Some(toml::Value::String(url)) => {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                errors.push(format!("[network] base_url must be http(s)://, got '{}'", url));
            }
            if url.len() > MAX_BASE_URL_LEN {
                errors.push(format!("[network] base_url longer than {} bytes", MAX_BASE_URL_LEN));
            }
        }
        Some(_) => errors.push("[network] base_url must be a string".to_string()),
        None => {}
    }

    for key in ["connect_timeout_ms", "read_timeout_ms"] {
        check_positive(network, "network", key, errors);
    }
}

fn validate_polling(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(polling) = config.get("polling") else {
        return;
    };

    for key in ["interval_ms", "button_poll_ms"] {
        check_positive(polling, "polling", key, errors);
    }
    if let Some(value) = polling.get("startup_delay_ms") {
        if !matches!(value, toml::Value::Integer(v) if *v >= 0) {
            errors.push("[polling] startup_delay_ms must be a non-negative integer".to_string());
        }
    }
}

fn validate_tracking(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(tracking) = config.get("tracking") else {
        return;
    };

    if let Some(count) = tracking.get("count") {
        match count {
            toml::Value::Integer(n) if (1..=MAX_TRACKED).contains(n) => {}
            _ => errors.push(format!("[tracking] count must be 1-{}", MAX_TRACKED)),
        }
    }

    match tracking.get("default_drivers") {
        Some(toml::Value::Array(drivers)) => {
            if drivers.len() as i64 > MAX_TRACKED {
                errors.push(format!(
                    "[tracking] default_drivers holds at most {} drivers",
                    MAX_TRACKED
                ));
            }
            for driver in drivers {
                if !matches!(driver, toml::Value::Integer(n) if (1..=99).contains(n)) {
                    errors.push(format!("[tracking] invalid driver number {}", driver));
                }
            }
        }
        Some(_) => errors.push("[tracking] default_drivers must be an array".to_string()),
        None => {}
    }

    if let Some(policy) = tracking.get("failure_policy") {
        match policy.as_str() {
            Some("placeholder") | Some("keep_stale") => {}
            _ => errors.push(
                "[tracking] failure_policy must be \"placeholder\" or \"keep_stale\"".to_string(),
            ),
        }
    }
}

fn check_positive(table: &toml::Value, section: &str, key: &str, errors: &mut Vec<String>) {
    if let Some(value) = table.get(key) {
        if !matches!(value, toml::Value::Integer(v) if *v > 0) {
            errors.push(format!("[{}] {} must be a positive integer", section, key));
        }
    }
}

/// Abort the build with a boxed error report
fn fail(title: &str, lines: &[String]) -> ! {
    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<57}║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title,
        format_error_lines(lines)
    );
}

fn format_error_lines(lines: &[String]) -> String {
    lines
        .iter()
        .map(|line| {
            let truncated = if line.chars().count() > 64 {
                format!("{}...", line.chars().take(61).collect::<String>())
            } else {
                line.clone()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
