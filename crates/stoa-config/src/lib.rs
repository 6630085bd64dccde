// SPDX-FileCopyrightText: 2026 Stoa Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the Stoa reflection journal.
//!
//! Provides TOML configuration parsing with strict validation (`deny_unknown_fields`),
//! XDG file hierarchy lookup, environment variable overrides, and diagnostic
//! error rendering with typo suggestions.
//!
//! # Usage
//!
//! ```no_run
//! use stoa_config::load_and_validate;
//!
//! let config = load_and_validate().expect("config errors");
//! println!("Model: {}", config.gemini.model);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

use std::path::Path;

pub use diagnostic::{render_errors, ConfigError};
pub use loader::{
    load_config, load_config_from_path, load_config_from_str, resolve_api_key, API_KEY_ENV,
};
pub use model::StoaConfig;

/// Load configuration from the XDG hierarchy and validate it.
///
/// On a Figment error the TOML files are re-read so diagnostics can point at
/// the offending line.
pub fn load_and_validate() -> Result<StoaConfig, Vec<ConfigError>> {
    match loader::load_config() {
        Ok(config) => validated(config),
        Err(err) => Err(diagnostic::figment_to_config_errors(
            err,
            &collect_toml_sources(),
        )),
    }
}

/// Load configuration from one explicit file (plus env overrides) and validate it.
pub fn load_and_validate_path(path: &Path) -> Result<StoaConfig, Vec<ConfigError>> {
    match loader::load_config_from_path(path) {
        Ok(config) => validated(config),
        Err(err) => {
            let sources = read_source(path).into_iter().collect::<Vec<_>>();
            Err(diagnostic::figment_to_config_errors(err, &sources))
        }
    }
}

/// Load configuration from a TOML string and validate it.
pub fn load_and_validate_str(toml_content: &str) -> Result<StoaConfig, Vec<ConfigError>> {
    match loader::load_config_from_str(toml_content) {
        Ok(config) => validated(config),
        Err(err) => {
            let sources = vec![("<inline>".to_string(), toml_content.to_string())];
            Err(diagnostic::figment_to_config_errors(err, &sources))
        }
    }
}

fn validated(config: StoaConfig) -> Result<StoaConfig, Vec<ConfigError>> {
    validation::validate_config(&config)?;
    Ok(config)
}

/// Read every existing config file for error span resolution.
fn collect_toml_sources() -> Vec<(String, String)> {
    loader::config_paths()
        .iter()
        .filter_map(|path| read_source(path))
        .collect()
}

fn read_source(path: &Path) -> Option<(String, String)> {
    let content = std::fs::read_to_string(path).ok()?;
    // Figment records relative files by their absolute path.
    let display = if path.is_relative() {
        std::env::current_dir()
            .map(|d| d.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    } else {
        path.to_path_buf()
    };
    Some((display.display().to_string(), content))
}
