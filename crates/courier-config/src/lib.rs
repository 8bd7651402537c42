// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Courier configuration: the typed model, layered loading and diagnostics.
//!
//! Settings come from `courier.toml` files and `COURIER_*` environment
//! variables. Parse failures and validation failures both come back as a
//! list of [`ConfigError`]s ready for [`render_errors`].
//!
//! ```no_run
//! let config = match courier_config::load_and_validate() {
//!     Ok(config) => config,
//!     Err(errors) => {
//!         courier_config::render_errors(&errors);
//!         std::process::exit(1);
//!     }
//! };
//! println!("gateway on {}:{}", config.gateway.host, config.gateway.port);
//! ```

use std::path::Path;

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

pub use diagnostic::{ConfigError, render_errors};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::CourierConfig;

/// Loads from the standard file locations plus env overrides, then validates.
pub fn load_and_validate() -> Result<CourierConfig, Vec<ConfigError>> {
    checked(loader::load_config(), || {
        loader::config_file_paths()
            .iter()
            .filter_map(|path| read_source(path))
            .collect()
    })
}

/// Loads one explicit file plus env overrides, then validates.
pub fn load_and_validate_path(path: &Path) -> Result<CourierConfig, Vec<ConfigError>> {
    checked(loader::load_config_from_path(path), || {
        read_source(path).into_iter().collect()
    })
}

/// Loads a TOML string alone, then validates.
pub fn load_and_validate_str(toml_content: &str) -> Result<CourierConfig, Vec<ConfigError>> {
    checked(loader::load_config_from_str(toml_content), || {
        vec![("<inline>".to_string(), toml_content.to_string())]
    })
}

/// Sources are only read when extraction failed and spans are needed.
fn checked(
    extracted: Result<CourierConfig, figment::Error>,
    sources: impl FnOnce() -> Vec<(String, String)>,
) -> Result<CourierConfig, Vec<ConfigError>> {
    let config =
        extracted.map_err(|err| diagnostic::figment_to_config_errors(err, &sources()))?;
    validation::validate_config(&config)?;
    Ok(config)
}

/// Names a file the way figment reports it: by absolute path.
fn read_source(path: &Path) -> Option<(String, String)> {
    let content = std::fs::read_to_string(path).ok()?;
    let name = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    Some((name.display().to_string(), content))
}
