// SPDX-FileCopyrightText: 2026 Stoa Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `stoa chat` command implementation.
//!
//! Launches an interactive REPL with a colored prompt and readline history.
//! Each line is one turn of a multi-turn conversation with the mentor.

use std::sync::Arc;

use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use stoa_agent::{Conversation, ConversationLog, SaveStatus};
use stoa_core::traits::{GenerationAdapter, JournalStore};
use stoa_core::types::{JournalEntry, UserId};
use stoa_core::StoaError;
use tracing::{info, warn};

use crate::app::App;

/// Options for `stoa chat`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChatOptions {
    /// Record every answered turn in the journal.
    pub save: bool,
    /// Seed the conversation with the most recent journal entries.
    pub resume: bool,
}

/// Runs the `stoa chat` interactive REPL.
pub async fn run_chat(app: &App, user_id: &UserId, options: ChatOptions) -> Result<(), StoaError> {
    let resumed = if options.resume {
        let mut recent = app.service.load_history(user_id).await?;
        recent.reverse();
        info!(entries = recent.len(), "resuming conversation from journal");
        Some(recent)
    } else {
        None
    };
    let (log, greeting) = opening_log(resumed.as_deref(), &app.config.mentor.greeting);

    let mut conversation = Conversation::new(
        Arc::clone(&app.generator) as Arc<dyn GenerationAdapter>,
        app.api_key(),
    )
    .with_log(log);
    if options.save {
        conversation = conversation.persist_turns(
            Arc::clone(&app.journal) as Arc<dyn JournalStore>,
            user_id.clone(),
        );
    }

    let mut rl = DefaultEditor::new()
        .map_err(|e| StoaError::Internal(format!("failed to initialize readline: {e}")))?;

    println!("{}", "stoa chat".bold().green());
    println!("Type {} to exit.\n", "/quit".yellow());
    if let Some(greeting) = greeting {
        println!("{}\n", greeting.italic());
    }

    let prompt = format!("{}> ", user_id.as_str().cyan());
    loop {
        match rl.readline(&prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed == "/quit" || trimmed == "/exit" {
                    break;
                }
                if trimmed.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(&line);

                match conversation.send(trimmed).await {
                    Ok(reply) => {
                        println!("\n{}\n", reply.text);
                        if let SaveStatus::NotSaved(e) = &reply.saved {
                            eprintln!("{}: {}", "warning".yellow(), e.user_message());
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, "chat turn failed");
                        eprintln!("{}: {}", "error".red(), e.user_message());
                    }
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("{}: {e}", "error".red());
                break;
            }
        }
    }

    info!(
        messages = conversation.log().len(),
        "chat session ended"
    );
    Ok(())
}

/// Starting log for a chat and the greeting to show, if any. A resumed
/// chat starts from journal entries (oldest first) and has no greeting.
fn opening_log<'a>(
    resumed: Option<&[JournalEntry]>,
    greeting: &'a str,
) -> (ConversationLog, Option<&'a str>) {
    match resumed {
        Some(entries) => (ConversationLog::from_entries(entries), None),
        None => (ConversationLog::with_greeting(greeting), Some(greeting)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use stoa_core::types::Role;

    fn entry(input: &str, response: &str) -> JournalEntry {
        JournalEntry {
            id: "e1".into(),
            user_id: UserId::from("local"),
            user_input: Some(input.into()),
            model_response: response.into(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn fresh_chat_shows_and_seeds_greeting() {
        let (log, greeting) = opening_log(None, "Ave.");
        assert_eq!(greeting, Some("Ave."));
        assert_eq!(log.len(), 1);
        assert_eq!(log.messages()[0].message.role, Role::Model);
    }

    #[test]
    fn resumed_chat_has_no_greeting() {
        let entries = [entry("Estou ansioso", "Respire e aja.")];
        let (log, greeting) = opening_log(Some(&entries), "Ave.");
        assert_eq!(greeting, None);
        assert_eq!(log.len(), 2);
        assert!(log.messages().iter().all(|m| m.message.text != "Ave."));
    }
}
