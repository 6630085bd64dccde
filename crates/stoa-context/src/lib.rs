// SPDX-FileCopyrightText: 2026 Stoa Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prompt assembly for Stoa reflections.
//!
//! - **Persona**: the mentor instruction, loaded file > inline > default
//! - **Composer**: persona, recent journal context and the current note,
//!   rendered as one single-turn prompt

pub mod composer;
pub mod persona;

use stoa_config::model::{ContextConfig, MentorConfig};

pub use composer::{context_window, PromptComposer, NO_REMARKS};
pub use persona::{Persona, DEFAULT_PERSONA};

impl PromptComposer {
    /// Builds a composer from the `[mentor]` and `[context]` config sections.
    pub async fn from_config(mentor: &MentorConfig, context: &ContextConfig) -> Self {
        let persona = Persona::load(mentor).await;
        Self::new(persona, context.max_response_chars)
    }
}
