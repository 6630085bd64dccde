// SPDX-FileCopyrightText: 2026 Stoa Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Stoa reflection journal.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Stoa configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StoaConfig {
    /// Application identity and logging.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Mentor persona and greeting.
    #[serde(default)]
    pub mentor: MentorConfig,

    /// Gemini generation service settings.
    #[serde(default)]
    pub gemini: GeminiConfig,

    /// Journal storage settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// How much prior history feeds each reflection.
    #[serde(default)]
    pub context: ContextConfig,
}

/// Application identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name used by the terminal shell.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_agent_name() -> String {
    "stoa".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Mentor persona configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MentorConfig {
    /// Inline persona text. Overridden by `persona_file` if both set.
    #[serde(default)]
    pub persona: Option<String>,

    /// Path to a text file containing the persona.
    /// Takes precedence over `persona` if both are set.
    #[serde(default)]
    pub persona_file: Option<String>,

    /// Greeting shown at the top of a chat. Never sent to the service.
    #[serde(default = "default_greeting")]
    pub greeting: String,
}

impl Default for MentorConfig {
    fn default() -> Self {
        Self {
            persona: None,
            persona_file: None,
            greeting: default_greeting(),
        }
    }
}

fn default_greeting() -> String {
    "Salve, friend. What weighs on your mind today?".to_string()
}

/// Gemini API configuration.
#[derive(Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GeminiConfig {
    /// Gemini API key. `None` falls back to the `GEMINI_API_KEY` environment variable.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Model used for generateContent requests.
    #[serde(default = "default_model")]
    pub model: String,

    /// API root, without the `/models` segment.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("stoa").join("stoa.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("stoa.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// Reflection context configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ContextConfig {
    /// Number of prior entries embedded in each prompt. Must not exceed
    /// `history_limit`.
    #[serde(default = "default_history_window")]
    pub history_window: usize,

    /// Number of entries loaded for the history listing.
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    /// Prior responses longer than this are cut before being embedded.
    #[serde(default = "default_max_response_chars")]
    pub max_response_chars: usize,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            history_window: default_history_window(),
            history_limit: default_history_limit(),
            max_response_chars: default_max_response_chars(),
        }
    }
}

fn default_history_window() -> usize {
    3
}

fn default_history_limit() -> usize {
    10
}

fn default_max_response_chars() -> usize {
    500
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_redacts_api_key() {
        let gemini = GeminiConfig {
            api_key: Some("AIza-secret".to_string()),
            ..GeminiConfig::default()
        };
        let rendered = format!("{gemini:?}");
        assert!(!rendered.contains("AIza-secret"));
        assert!(rendered.contains("[REDACTED]"));
    }

    #[test]
    fn mentor_section_deserializes() {
        let toml_str = r#"
[mentor]
persona = "You are Epictetus."
greeting = "Ave."
"#;
        let config: StoaConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.mentor.persona.as_deref(), Some("You are Epictetus."));
        assert!(config.mentor.persona_file.is_none());
        assert_eq!(config.mentor.greeting, "Ave.");
    }

    #[test]
    fn context_section_rejects_unknown_fields() {
        let toml_str = r#"
[context]
history_windw = 4
"#;
        assert!(toml::from_str::<StoaConfig>(toml_str).is_err());
    }
}
