// SPDX-FileCopyrightText: 2026 Stoa Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./stoa.toml` > `~/.config/stoa/stoa.toml` > `/etc/stoa/stoa.toml`
//! with environment variable overrides via `STOA_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use secrecy::SecretString;

use crate::model::{GeminiConfig, StoaConfig};

/// Environment variable consulted when `gemini.api_key` is not configured.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

const SYSTEM_CONFIG: &str = "/etc/stoa/stoa.toml";
const LOCAL_CONFIG: &str = "stoa.toml";

/// Config file locations in merge order (later overrides earlier).
pub fn config_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(SYSTEM_CONFIG)];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("stoa").join("stoa.toml"));
    }
    paths.push(PathBuf::from(LOCAL_CONFIG));
    paths
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/stoa/stoa.toml` (system-wide)
/// 3. `~/.config/stoa/stoa.toml` (user XDG config)
/// 4. `./stoa.toml` (local directory)
/// 5. `STOA_*` environment variables
pub fn load_config() -> Result<StoaConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<StoaConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(StoaConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<StoaConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(StoaConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the layered Figment before extraction.
pub fn build_figment() -> Figment {
    config_paths().into_iter().fold(
        Figment::new().merge(Serialized::defaults(StoaConfig::default())),
        |figment, path| figment.merge(Toml::file(path)),
    )
    .merge(env_provider())
}

/// Resolve the Gemini API key: `gemini.api_key` first, then `GEMINI_API_KEY`.
///
/// Returns `None` when neither is set. Blank values are passed through so
/// the generation client can reject them with a configuration error.
pub fn resolve_api_key(gemini: &GeminiConfig) -> Option<SecretString> {
    resolve_api_key_with(gemini, |name| std::env::var(name).ok())
}

/// [`resolve_api_key`] with an injectable environment lookup.
pub fn resolve_api_key_with(
    gemini: &GeminiConfig,
    env: impl Fn(&str) -> Option<String>,
) -> Option<SecretString> {
    gemini
        .api_key
        .clone()
        .or_else(|| {
            tracing::debug!(var = API_KEY_ENV, "gemini.api_key not set, checking environment");
            env(API_KEY_ENV)
        })
        .map(SecretString::from)
}

/// Environment provider mapping `STOA_SECTION_KEY` to `section.key`.
///
/// Uses `Env::map()` rather than `Env::split("_")` because keys contain
/// underscores: `STOA_GEMINI_TIMEOUT_SECS` must become `gemini.timeout_secs`.
fn env_provider() -> Env {
    Env::prefixed("STOA_").map(|key| {
        key.as_str()
            .replacen("agent_", "agent.", 1)
            .replacen("mentor_", "mentor.", 1)
            .replacen("gemini_", "gemini.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("context_", "context.", 1)
            .into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn configured_key_wins_over_environment() {
        let gemini = GeminiConfig {
            api_key: Some("from-config".into()),
            ..GeminiConfig::default()
        };
        let key = resolve_api_key_with(&gemini, |_| Some("from-env".into())).unwrap();
        assert_eq!(key.expose_secret(), "from-config");
    }

    #[test]
    fn environment_key_used_when_unconfigured() {
        let gemini = GeminiConfig::default();
        let key = resolve_api_key_with(&gemini, |name| {
            (name == API_KEY_ENV).then(|| "from-env".to_string())
        })
        .unwrap();
        assert_eq!(key.expose_secret(), "from-env");
    }

    #[test]
    fn no_key_anywhere_is_none() {
        assert!(resolve_api_key_with(&GeminiConfig::default(), |_| None).is_none());
    }

    #[test]
    fn config_paths_end_with_local_file() {
        let paths = config_paths();
        assert_eq!(paths.first(), Some(&PathBuf::from(SYSTEM_CONFIG)));
        assert_eq!(paths.last(), Some(&PathBuf::from(LOCAL_CONFIG)));
    }
}
