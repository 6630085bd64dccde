// SPDX-FileCopyrightText: 2026 Stoa Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! One-shot commands: `stoa reflect`, `stoa history`, `stoa config check`.

use colored::Colorize;
use secrecy::ExposeSecret;
use stoa_agent::JournalSession;
use stoa_config::model::StoaConfig;
use stoa_context::NO_REMARKS;
use stoa_core::traits::JournalStore;
use stoa_core::types::{ApiKey, JournalEntry, UserId};
use stoa_core::StoaError;
use tracing::{debug, warn};

use crate::app::App;

/// Characters of each reply shown by `stoa history`.
const PREVIEW_CHARS: usize = 100;

/// Runs `stoa reflect <note>`.
pub async fn run_reflect(app: &App, user_id: &UserId, note: &str) -> Result<(), StoaError> {
    let session = JournalSession::new(app.service.clone(), user_id.clone());
    if let Err(e) = session.load().await {
        warn!(error = %e, "could not read earlier entries, reflecting without them");
    }

    session.set_draft(note);
    let reflection = session.submit().await?;

    println!("{}", reflection.text);
    if let Some(e) = reflection.saved.error() {
        eprintln!("{}: {}", "warning".yellow(), e.user_message());
    }
    if let Some(e) = &reflection.refresh_error {
        debug!(error = %e, "history refresh failed after reflection");
    }
    Ok(())
}

/// Runs `stoa history`.
pub async fn run_history(
    app: &App,
    user_id: &UserId,
    limit: Option<usize>,
) -> Result<(), StoaError> {
    let limit = limit.unwrap_or_else(|| app.service.history_limit());
    let entries = app.journal.list_recent(user_id, limit).await?;

    if entries.is_empty() {
        println!("{}", "No journal entries yet.".dimmed());
        return Ok(());
    }
    for entry in &entries {
        let (header, body) = format_entry(entry, PREVIEW_CHARS);
        println!("{}\n    {body}", header.bold());
    }

    match app.journal.count_entries(user_id).await {
        Ok(total) => println!("{}", history_footer(entries.len(), total).dimmed()),
        Err(e) => debug!(error = %e, "could not count journal entries"),
    }
    Ok(())
}

/// Closing line of `stoa history`.
pub fn history_footer(shown: usize, total: u64) -> String {
    if shown as u64 >= total {
        format!("{total} entries")
    } else {
        format!("showing {shown} of {total} entries")
    }
}

/// Header line and reply preview for one history row.
pub fn format_entry(entry: &JournalEntry, preview_chars: usize) -> (String, String) {
    let note = entry.user_input.as_deref().unwrap_or(NO_REMARKS);
    let header = format!("{}  {note}", entry.created_at.format("%Y-%m-%d %H:%M"));
    (header, entry.preview(preview_chars))
}

/// Runs `stoa config check`. Fails when no API key is available.
pub fn run_config_check(config: &StoaConfig) -> Result<(), StoaError> {
    let key = stoa_config::resolve_api_key(&config.gemini);
    let has_key = ApiKey::parse(key.as_ref().map(|k| k.expose_secret())).is_ok();

    println!("{}", "configuration OK".green());
    for (key, value) in config_summary(config, has_key) {
        println!("  {key:<24} {value}");
    }

    if !has_key {
        return Err(StoaError::Config(format!(
            "set gemini.api_key or the {} environment variable",
            stoa_config::API_KEY_ENV
        )));
    }
    Ok(())
}

/// Effective settings as key/value rows. The API key is reported only as
/// present or missing.
pub fn config_summary(config: &StoaConfig, has_key: bool) -> Vec<(&'static str, String)> {
    let persona = match (&config.mentor.persona_file, &config.mentor.persona) {
        (Some(path), _) => format!("file {path}"),
        (None, Some(_)) => "inline".to_string(),
        (None, None) => "default".to_string(),
    };
    vec![
        ("agent.name", config.agent.name.clone()),
        ("agent.log_level", config.agent.log_level.clone()),
        ("mentor.persona", persona),
        ("gemini.model", config.gemini.model.clone()),
        ("gemini.base_url", config.gemini.base_url.clone()),
        ("gemini.timeout_secs", config.gemini.timeout_secs.to_string()),
        (
            "gemini.api_key",
            if has_key { "set" } else { "missing" }.to_string(),
        ),
        ("storage.database_path", config.storage.database_path.clone()),
        ("context.history_window", config.context.history_window.to_string()),
        ("context.history_limit", config.context.history_limit.to_string()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn entry(input: Option<&str>, response: &str) -> JournalEntry {
        JournalEntry {
            id: "e1".into(),
            user_id: UserId::from("local"),
            user_input: input.map(str::to_string),
            model_response: response.into(),
            created_at: Utc.with_ymd_and_hms(2026, 5, 4, 7, 15, 0).unwrap(),
        }
    }

    #[test]
    fn history_row_shows_date_note_and_preview() {
        let (header, body) = format_entry(&entry(Some("Estou ansioso"), "Respire e aja."), 7);
        assert_eq!(header, "2026-05-04 07:15  Estou ansioso");
        assert_eq!(body, "Respire...");
    }

    #[test]
    fn history_row_without_note_uses_placeholder() {
        let (header, _) = format_entry(&entry(None, "Rest."), 100);
        assert!(header.ends_with(NO_REMARKS));
    }

    #[test]
    fn footer_reports_total_when_listing_is_truncated() {
        assert_eq!(history_footer(10, 42), "showing 10 of 42 entries");
        assert_eq!(history_footer(3, 3), "3 entries");
    }

    #[test]
    fn summary_never_contains_the_key() {
        let mut config = StoaConfig::default();
        config.gemini.api_key = Some("super-secret-key".into());

        let rows = config_summary(&config, true);
        assert!(rows.iter().all(|(_, v)| !v.contains("super-secret-key")));
        assert!(rows.contains(&("gemini.api_key", "set".to_string())));
    }

    #[test]
    fn config_check_fails_on_blank_key() {
        let mut config = StoaConfig::default();
        config.gemini.api_key = Some("   ".into());
        let err = run_config_check(&config).unwrap_err();
        assert!(err.to_string().contains(stoa_config::API_KEY_ENV));
    }
}
