// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./courier.toml` > `~/.config/courier/courier.toml` > `/etc/courier/courier.toml`
//! with environment variable overrides via `COURIER_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::CourierConfig;

/// Section prefixes in env var names, most specific first.
const ENV_SECTIONS: &[(&str, &str)] = &[
    ("transport_wappi_", "transport.wappi."),
    ("transport_", "transport."),
    ("service_", "service."),
    ("storage_", "storage."),
    ("gateway_", "gateway."),
];

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/courier/courier.toml` (system-wide)
/// 3. `~/.config/courier/courier.toml` (user XDG config)
/// 4. `./courier.toml` (local directory)
/// 5. `COURIER_*` environment variables
pub fn load_config() -> Result<CourierConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env vars).
pub fn load_config_from_str(toml_content: &str) -> Result<CourierConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(CourierConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<CourierConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(CourierConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// TOML files read by [`load_config`], lowest precedence first.
pub fn config_file_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("/etc/courier/courier.toml")];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("courier/courier.toml"));
    }
    paths.push(PathBuf::from("courier.toml"));
    paths
}

/// Build the Figment used for config loading, before extraction.
pub fn build_figment() -> Figment {
    config_file_paths()
        .into_iter()
        .fold(
            Figment::new().merge(Serialized::defaults(CourierConfig::default())),
            |figment, path| figment.merge(Toml::file(path)),
        )
        .merge(env_provider())
}

/// Maps `COURIER_<SECTION>_<KEY>` to `<section>.<key>`.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `COURIER_TRANSPORT_REQUEST_TIMEOUT_SECS` must become
/// `transport.request_timeout_secs`.
fn env_provider() -> Env {
    Env::prefixed("COURIER_").map(|key| map_env_key(key.as_str()).into())
}

fn map_env_key(key: &str) -> String {
    let key = key.to_ascii_lowercase();
    for (prefix, section) in ENV_SECTIONS {
        if let Some(rest) = key.strip_prefix(prefix) {
            return format!("{section}{rest}");
        }
    }
    key
}
