// SPDX-FileCopyrightText: 2026 Stoa Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Builds the single-turn reflection prompt from the persona, recent journal
//! entries and the current note.

use std::fmt::Write as _;

use stoa_core::types::JournalEntry;

use crate::persona::Persona;

/// Stand-in for an absent or blank note. An empty note is never sent as-is.
pub const NO_REMARKS: &str = "no remarks provided";

const BREVITY: &str =
    "Give one short, direct and practical piece of advice in one or two paragraphs.";

/// Composes reflection prompts. Pure: identical inputs give identical output.
#[derive(Debug, Clone)]
pub struct PromptComposer {
    persona: Persona,
    max_response_chars: usize,
}

impl PromptComposer {
    /// `max_response_chars` bounds each prior response embedded as context.
    pub fn new(persona: Persona, max_response_chars: usize) -> Self {
        Self {
            persona,
            max_response_chars,
        }
    }

    pub fn persona(&self) -> &Persona {
        &self.persona
    }

    /// Builds the prompt for `note`, given prior entries ordered oldest first.
    pub fn compose(&self, context: &[JournalEntry], note: &str) -> String {
        let mut prompt = String::with_capacity(512);
        prompt.push_str(self.persona.text());
        prompt.push_str("\n\n");

        if !context.is_empty() {
            prompt.push_str("Earlier entries from this person's journal, oldest first:\n");
            for entry in context {
                let input = remark_or_placeholder(entry.user_input.as_deref().unwrap_or(""));
                let reply = truncate_chars(
                    &collapse_whitespace(&entry.model_response),
                    self.max_response_chars,
                );
                // Writing into a String cannot fail.
                let _ = writeln!(
                    prompt,
                    "- [{}] They wrote: \"{}\". You replied: \"{}\"",
                    entry.created_at.format("%Y-%m-%d"),
                    collapse_whitespace(&input),
                    reply
                );
            }
            prompt.push('\n');
        }

        let _ = writeln!(prompt, "Today they write: \"{}\"", remark_or_placeholder(note));
        prompt.push('\n');
        prompt.push_str(BREVITY);
        prompt
    }
}

/// Selects the `n` newest of `recent_newest_first` and returns them oldest
/// first, ready for [`PromptComposer::compose`].
pub fn context_window(recent_newest_first: &[JournalEntry], n: usize) -> Vec<JournalEntry> {
    let mut window: Vec<JournalEntry> = recent_newest_first.iter().take(n).cloned().collect();
    window.reverse();
    window
}

fn remark_or_placeholder(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        NO_REMARKS.to_string()
    } else {
        trimmed.to_string()
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}
