// SPDX-FileCopyrightText: 2026 Stoa Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.

use crate::diagnostic::ConfigError;
use crate::model::StoaConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every failure rather than stopping at the first.
pub fn validate_config(config: &StoaConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    if config.agent.name.trim().is_empty() {
        fail("agent.name must not be empty".to_string());
    }

    let level = config.agent.log_level.trim().to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        fail(format!(
            "agent.log_level `{}` is not one of {}",
            config.agent.log_level,
            LOG_LEVELS.join(", ")
        ));
    }

    if let Some(path) = &config.mentor.persona_file
        && path.trim().is_empty()
    {
        fail("mentor.persona_file must not be empty when set".to_string());
    }

    if config.gemini.model.trim().is_empty() {
        fail("gemini.model must not be empty".to_string());
    }

    let base_url = config.gemini.base_url.trim();
    if !(base_url.starts_with("https://") || base_url.starts_with("http://")) {
        fail(format!(
            "gemini.base_url `{base_url}` must start with http:// or https://"
        ));
    }

    if config.gemini.timeout_secs == 0 {
        fail("gemini.timeout_secs must be at least 1".to_string());
    }

    if config.storage.database_path.trim().is_empty() {
        fail("storage.database_path must not be empty".to_string());
    }

    if config.context.history_limit == 0 {
        fail("context.history_limit must be at least 1".to_string());
    }

    if config.context.history_window > config.context.history_limit {
        fail(format!(
            "context.history_window ({}) must not exceed context.history_limit ({})",
            config.context.history_window, config.context.history_limit
        ));
    }

    if config.context.max_response_chars == 0 {
        fail("context.max_response_chars must be at least 1".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has_message(errors: &[ConfigError], needle: &str) -> bool {
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains(needle)))
    }

    #[test]
    fn default_config_validates() {
        assert!(validate_config(&StoaConfig::default()).is_ok());
    }

    #[test]
    fn empty_database_path_fails_validation() {
        let mut config = StoaConfig::default();
        config.storage.database_path = "  ".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "database_path"));
    }

    #[test]
    fn zero_timeout_fails_validation() {
        let mut config = StoaConfig::default();
        config.gemini.timeout_secs = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "timeout_secs"));
    }

    #[test]
    fn bad_log_level_and_base_url_are_both_reported() {
        let mut config = StoaConfig::default();
        config.agent.log_level = "loud".to_string();
        config.gemini.base_url = "generativelanguage.googleapis.com".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(has_message(&errors, "log_level"));
        assert!(has_message(&errors, "base_url"));
    }

    #[test]
    fn zero_history_window_is_allowed() {
        let mut config = StoaConfig::default();
        config.context.history_window = 0;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn history_window_above_limit_fails_validation() {
        let mut config = StoaConfig::default();
        config.context.history_window = 5;
        config.context.history_limit = 3;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(has_message(&errors, "history_window"));
    }

    #[test]
    fn history_window_equal_to_limit_is_allowed() {
        let mut config = StoaConfig::default();
        config.context.history_window = 4;
        config.context.history_limit = 4;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn blank_persona_file_fails_validation() {
        let mut config = StoaConfig::default();
        config.mentor.persona_file = Some(String::new());
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "persona_file"));
    }
}
