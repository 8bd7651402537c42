// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as valid bind addresses, probability ranges and paired credentials.

use crate::diagnostic::ConfigError;
use crate::model::CourierConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &CourierConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if !LOG_LEVELS.contains(&config.service.log_level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "service.log_level `{}` must be one of: {}",
                config.service.log_level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    let host = config.gateway.host.trim();
    if host.is_empty() {
        errors.push(ConfigError::Validation {
            message: "gateway.host must not be empty".to_string(),
        });
    } else {
        let is_valid_ip = host.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == ':');
        if !is_valid_ip && !is_valid_hostname {
            errors.push(ConfigError::Validation {
                message: format!("gateway.host `{host}` is not a valid IP address or hostname"),
            });
        }
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    let transport = &config.transport;
    if transport.request_timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "transport.request_timeout_secs must be at least 1".to_string(),
        });
    }

    if !(0.0..=1.0).contains(&transport.simulated_success_rate) {
        errors.push(ConfigError::Validation {
            message: format!(
                "transport.simulated_success_rate must be between 0.0 and 1.0, got {}",
                transport.simulated_success_rate
            ),
        });
    }

    let wappi = &transport.wappi;
    if !wappi.base_url.starts_with("http://") && !wappi.base_url.starts_with("https://") {
        errors.push(ConfigError::Validation {
            message: format!(
                "transport.wappi.base_url `{}` must start with http:// or https://",
                wappi.base_url
            ),
        });
    }

    // Token and profile only make sense together.
    match (&wappi.token, &wappi.profile_id) {
        (Some(_), None) => errors.push(ConfigError::Validation {
            message: "transport.wappi.token is set but transport.wappi.profile_id is missing"
                .to_string(),
        }),
        (None, Some(_)) => errors.push(ConfigError::Validation {
            message: "transport.wappi.profile_id is set but transport.wappi.token is missing"
                .to_string(),
        }),
        _ => {}
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
