// SPDX-FileCopyrightText: 2026 Stoa Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mentor persona: the standing instruction that opens every prompt.

use stoa_config::model::MentorConfig;
use tracing::{info, warn};

/// Persona used when none is configured.
pub const DEFAULT_PERSONA: &str = "Act as a wise stoic mentor, in the manner of Marcus Aurelius \
or Seneca. Speak plainly and kindly, and answer in the language the person writes in.";

/// The mentor persona text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Persona {
    text: String,
}

impl Persona {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Resolves the persona from config.
    ///
    /// # Priority
    /// 1. `mentor.persona_file` -- read from disk
    /// 2. `mentor.persona` -- inline string
    /// 3. [`DEFAULT_PERSONA`]
    ///
    /// An unreadable or empty file falls through to the next source.
    pub async fn load(config: &MentorConfig) -> Self {
        if let Some(ref file_path) = config.persona_file {
            match tokio::fs::read_to_string(file_path).await {
                Ok(content) if !content.trim().is_empty() => {
                    info!(path = file_path.as_str(), "loaded mentor persona from file");
                    return Self::new(content.trim());
                }
                Ok(_) => {
                    warn!(path = file_path.as_str(), "persona file is empty, falling back");
                }
                Err(e) => {
                    warn!(
                        path = file_path.as_str(),
                        error = %e,
                        "failed to read persona file, falling back"
                    );
                }
            }
        }

        if let Some(ref persona) = config.persona
            && !persona.trim().is_empty()
        {
            return Self::new(persona.trim());
        }

        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

impl Default for Persona {
    fn default() -> Self {
        Self::new(DEFAULT_PERSONA)
    }
}
