//! Integration Tests
//!
//! End-to-end conversations through the supervisor with deterministic backends.

use super::fixtures::{
    clean_corpus_texts, test_config, KeywordEmbedder, ScriptedCompleter, CASUAL_REPLY,
};
use crate::actors::supervisor::QuestSupervisor;
use crate::models::Role;
use crate::APOLOGY;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tempfile::tempdir;

#[tokio::test]
async fn test_full_conversation_flow() {
    let dir = tempdir().unwrap();
    let completer = Arc::new(ScriptedCompleter::new());
    let supervisor = QuestSupervisor::bootstrap(
        test_config(dir.path()),
        Arc::new(KeywordEmbedder::new()),
        completer.clone(),
    )
    .await
    .unwrap();
    let session = supervisor.open_session().await.unwrap();
    let corpus = clean_corpus_texts();

    // 1. Casual small talk: no passage leaks through.
    let casual = supervisor.chat(&session, "hey, how's it going?").await.unwrap();
    for passage in &corpus {
        assert!(!casual.contains(passage.as_str()));
    }
    assert!(!casual.to_lowercase().contains("hidden words"));
    assert_ne!(casual, CASUAL_REPLY);

    // 2. Explicit request for two passages.
    let wisdom = supervisor
        .chat(&session, "give me two quotes about love")
        .await
        .unwrap();
    let quotes: Vec<&str> = wisdom.split("\n\n").collect();
    assert_eq!(quotes.len(), 2, "Reply was: {}", wisdom);
    for quote in &quotes {
        assert!(corpus.iter().any(|p| p == quote), "Not a corpus passage: {}", quote);
        assert!(!quote.starts_with(|c: char| c.is_ascii_digit()));
    }

    // 3. History alternates user / assistant.
    let history = supervisor.history(&session).await.unwrap();
    assert_eq!(history.len(), 4);
    assert_eq!(
        history.iter().map(|m| m.role).collect::<Vec<_>>(),
        vec![Role::User, Role::Assistant, Role::User, Role::Assistant]
    );
    assert_eq!(history[3].content, wisdom);

    // 4. Only the wisdom turn carried passages to the backend.
    let calls = completer.recorded();
    assert_eq!(calls.len(), 2);
    assert!(!calls[0].user.contains("O Son of"));
    assert!(calls[1].user.contains("Relevant passages:"));
}

#[tokio::test]
async fn test_backend_outage_mid_conversation() {
    let dir = tempdir().unwrap();
    let supervisor = QuestSupervisor::bootstrap(
        test_config(dir.path()),
        Arc::new(KeywordEmbedder::new()),
        Arc::new(ScriptedCompleter::failing()),
    )
    .await
    .unwrap();
    let session = supervisor.open_session().await.unwrap();

    let reply = supervisor.chat(&session, "I'm worried, a quote please").await.unwrap();
    assert_eq!(reply, APOLOGY);

    let history = supervisor.history(&session).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[1].content, APOLOGY);
}

#[tokio::test]
async fn test_restart_reuses_persisted_index() {
    let dir = tempdir().unwrap();

    let first = QuestSupervisor::bootstrap(
        test_config(dir.path()),
        Arc::new(KeywordEmbedder::new()),
        Arc::new(ScriptedCompleter::new()),
    )
    .await
    .unwrap();
    let first_vectors = first.index().await.unwrap().vectors().to_vec();
    first.shutdown().await;

    let embedder = Arc::new(KeywordEmbedder::new());
    let second = QuestSupervisor::bootstrap(
        test_config(dir.path()),
        embedder.clone(),
        Arc::new(ScriptedCompleter::new()),
    )
    .await
    .unwrap();

    assert_eq!(embedder.calls.load(Ordering::SeqCst), 0);
    assert_eq!(second.index().await.unwrap().vectors(), first_vectors.as_slice());
}
