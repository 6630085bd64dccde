// SPDX-FileCopyrightText: 2026 Stoa Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end reflection flows over a real SQLite journal.

use std::sync::Arc;

use stoa_agent::{Conversation, ConversationLog, SaveStatus};
use stoa_core::traits::{GenerationAdapter, JournalStore};
use stoa_core::types::UserId;
use stoa_core::{ErrorKind, StoaError};
use stoa_test_utils::TestHarness;

#[tokio::test]
async fn first_reflection_is_saved_and_listed_first() {
    let harness = TestHarness::builder()
        .with_mock_responses(vec!["Respire e aja.".to_string()])
        .build()
        .await
        .unwrap();
    let session = harness.session("u1");

    assert!(session.load().await.unwrap().is_empty());
    session.set_draft("Estou ansioso");
    let reflection = session.submit().await.unwrap();

    assert_eq!(reflection.text, "Respire e aja.");
    let saved = reflection.saved.entry().expect("entry saved");
    assert_eq!(saved.user_input.as_deref(), Some("Estou ansioso"));
    assert_eq!(saved.model_response, "Respire e aja.");
    assert_eq!(session.draft(), "");

    let recent = harness
        .journal
        .list_recent(&UserId::from("u1"), 10)
        .await
        .unwrap();
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].id, saved.id);
    assert_eq!(session.history(), recent);
}

#[tokio::test]
async fn connectivity_failure_saves_nothing_and_keeps_draft() {
    let harness = TestHarness::builder().build().await.unwrap();
    harness
        .mock_generator
        .push_error(StoaError::Connectivity {
            message: "network unreachable".into(),
            source: None,
        })
        .await;
    let session = harness.session("u1");

    session.set_draft("Estou ansioso");
    let err = session.submit().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Connectivity);
    assert_eq!(session.draft(), "Estou ansioso");
    assert!(harness
        .journal
        .list_recent(&UserId::from("u1"), 10)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn missing_key_makes_no_calls() {
    let harness = TestHarness::builder()
        .with_api_key(None)
        .build()
        .await
        .unwrap();

    let err = harness.reflect("u1", "hello").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert_eq!(harness.mock_generator.call_count().await, 0);
}

#[tokio::test]
async fn later_reflections_see_earlier_entries_oldest_first() {
    let harness = TestHarness::builder()
        .with_history(2, 10)
        .build()
        .await
        .unwrap();

    for note in ["monday", "tuesday", "wednesday"] {
        harness.reflect("u1", note).await.unwrap();
    }
    harness.reflect("u1", "thursday").await.unwrap();

    let prompt = harness.mock_generator.prompts().await.pop().unwrap();
    assert!(!prompt.contains("\"monday\""));
    let tuesday = prompt.find("\"tuesday\"").unwrap();
    let wednesday = prompt.find("\"wednesday\"").unwrap();
    assert!(tuesday < wednesday);
    assert!(prompt.contains("Today they write: \"thursday\""));
}

#[tokio::test]
async fn users_do_not_see_each_other() {
    let harness = TestHarness::builder().build().await.unwrap();
    harness.reflect("alice", "mine").await.unwrap();

    let bob = harness.reflect("bob", "his").await.unwrap();
    assert_eq!(bob.history.len(), 1);
    assert_eq!(bob.history[0].user_input.as_deref(), Some("his"));
}

#[tokio::test]
async fn persisted_chat_turns_land_in_the_journal() {
    let harness = TestHarness::builder()
        .with_mock_responses(vec!["Know thyself.".to_string()])
        .build()
        .await
        .unwrap();
    let user = UserId::from("u1");

    let chat = Conversation::new(
        Arc::clone(&harness.mock_generator) as Arc<dyn GenerationAdapter>,
        Some("test-key".to_string().into()),
    )
    .with_log(ConversationLog::with_greeting(harness.config.mentor.greeting.clone()))
    .persist_turns(Arc::clone(&harness.journal) as Arc<dyn JournalStore>, user.clone());

    let reply = chat.send("Who am I?").await.unwrap();
    assert!(matches!(reply.saved, SaveStatus::Saved(_)));

    let recent = harness.journal.list_recent(&user, 5).await.unwrap();
    assert_eq!(recent[0].model_response, "Know thyself.");
    assert_eq!(chat.log().len(), 3);
}
