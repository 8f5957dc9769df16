//! Integration tests for chat-history persistence.
//!
//! `update_chat_history` reports failures only through logs, so these
//! tests install a capturing `tracing` layer for the duration of each
//! test and assert on the levels it saw.

use std::sync::{Arc, Mutex};

use chrono::{TimeZone, Utc};
use legaliq_store::{
    AnalysisDraft, ChatHistoryUpdate, DocumentStore, InMemoryDatabase,
    StoreCall, StoreError, StoreOp, create_analysis, load_chat_history,
    save_user_profile, update_chat_history,
};
use legaliq_types::{ChatMessage, Role, User};
use serde_json::json;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::{Context, SubscriberExt};

// =========================================================================
// Log capture
// =========================================================================

/// Records the level of every event.
#[derive(Clone, Default)]
struct CapturedLevels(Arc<Mutex<Vec<Level>>>);

impl CapturedLevels {
    fn count(&self, level: Level) -> usize {
        self.0.lock().unwrap().iter().filter(|l| **l == level).count()
    }
}

impl<S: Subscriber> Layer<S> for CapturedLevels {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        self.0.lock().unwrap().push(*event.metadata().level());
    }
}

/// Captures events on this thread until the guard is dropped.
fn capture_logs() -> (CapturedLevels, tracing::subscriber::DefaultGuard) {
    let levels = CapturedLevels::default();
    let subscriber = tracing_subscriber::registry().with(levels.clone());
    let guard = tracing::subscriber::set_default(subscriber);
    (levels, guard)
}

// =========================================================================
// Helpers
// =========================================================================

const ANALYSIS_PATH: &str = "users/u1/analyses/a1";

fn message(content: &str) -> ChatMessage {
    let ts = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    ChatMessage::new(Role::User, content, ts)
}

fn store_with_analysis() -> DocumentStore<InMemoryDatabase> {
    let store = DocumentStore::new(InMemoryDatabase::new());
    store.database().insert_document(
        ANALYSIS_PATH,
        json!({"title": "Lease", "chatHistory": []})
            .as_object()
            .unwrap()
            .clone(),
    );
    store
}

// =========================================================================
// update_chat_history()
// =========================================================================

#[tokio::test]
async fn test_update_chat_history_empty_user_is_skipped_with_warning() {
    let (logs, _guard) = capture_logs();
    let store = store_with_analysis();

    let outcome = update_chat_history(&store, "", "a1", &[message("hi")]).await;

    assert_eq!(outcome, ChatHistoryUpdate::Skipped);
    assert!(store.database().calls().is_empty());
    assert_eq!(logs.count(Level::WARN), 1);
}

#[tokio::test]
async fn test_update_chat_history_no_messages_is_skipped_with_warning() {
    let (logs, _guard) = capture_logs();
    let store = store_with_analysis();

    let outcome = update_chat_history(&store, "u1", "a1", &[]).await;

    assert_eq!(outcome, ChatHistoryUpdate::Skipped);
    assert!(store.database().calls().is_empty());
    assert_eq!(logs.count(Level::WARN), 1);
}

#[tokio::test]
async fn test_update_chat_history_empty_analysis_is_skipped() {
    let store = store_with_analysis();

    let outcome = update_chat_history(&store, "u1", "", &[message("hi")]).await;

    assert_eq!(outcome, ChatHistoryUpdate::Skipped);
    assert!(store.database().calls().is_empty());
}

#[tokio::test]
async fn test_update_chat_history_appends_with_array_union() {
    let store = store_with_analysis();
    let first = message("Is my lease valid?");
    let second = message("Yes, under the Rent Control Act.");

    let outcome =
        update_chat_history(&store, "u1", "a1", &[first.clone(), second.clone()])
            .await;

    assert_eq!(outcome, ChatHistoryUpdate::Appended);
    let calls = store.database().calls();
    assert_eq!(calls.len(), 1);
    assert!(matches!(&calls[0], StoreCall::Update { path, .. } if path == ANALYSIS_PATH));

    let history = load_chat_history(&store, "u1", "a1").await.unwrap();
    assert_eq!(history, vec![first, second]);
}

#[tokio::test]
async fn test_update_chat_history_repeated_message_is_stored_once() {
    let store = store_with_analysis();
    let msg = message("hello");

    update_chat_history(&store, "u1", "a1", &[msg.clone()]).await;
    update_chat_history(&store, "u1", "a1", &[msg.clone()]).await;

    let history = load_chat_history(&store, "u1", "a1").await.unwrap();
    assert_eq!(history, vec![msg]);
}

#[tokio::test]
async fn test_update_chat_history_failure_is_swallowed_and_logged() {
    let (logs, _guard) = capture_logs();
    let store = store_with_analysis();
    store.database().fail_next(
        StoreOp::Update,
        StoreError::failure("unavailable", "backend down"),
    );

    let outcome = update_chat_history(&store, "u1", "a1", &[message("hi")]).await;

    assert_eq!(outcome, ChatHistoryUpdate::Failed);
    assert_eq!(store.database().calls().len(), 1, "exactly one attempt");
    assert_eq!(logs.count(Level::ERROR), 1);
}

#[tokio::test]
async fn test_update_chat_history_missing_analysis_is_swallowed() {
    let (logs, _guard) = capture_logs();
    let store = DocumentStore::new(InMemoryDatabase::new());

    let outcome = update_chat_history(&store, "u1", "a1", &[message("hi")]).await;

    assert_eq!(outcome, ChatHistoryUpdate::Failed);
    assert_eq!(logs.count(Level::ERROR), 1);
}

// =========================================================================
// create_analysis() / load_chat_history() / save_user_profile()
// =========================================================================

#[tokio::test]
async fn test_create_analysis_then_append() {
    let store = DocumentStore::new(InMemoryDatabase::new());
    let draft = AnalysisDraft {
        title: "Tenancy dispute".into(),
        summary: "Deposit not returned".into(),
    };

    let id = create_analysis(&store, "u1", &draft).await.unwrap();
    let outcome = update_chat_history(&store, "u1", &id, &[message("hi")]).await;

    assert_eq!(outcome, ChatHistoryUpdate::Appended);
    let stored = store
        .database()
        .document(&format!("users/u1/analyses/{id}"))
        .unwrap();
    assert_eq!(stored["title"], json!("Tenancy dispute"));
    assert!(stored["createdAt"].is_string());
    assert_eq!(stored["chatHistory"].as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn test_load_chat_history_missing_analysis_is_not_found() {
    let store = DocumentStore::new(InMemoryDatabase::new());

    let err = load_chat_history(&store, "u1", "nope").await.unwrap_err();

    assert_eq!(err, StoreError::NotFound("users/u1/analyses/nope".into()));
}

#[tokio::test]
async fn test_save_user_profile_merges() {
    let store = DocumentStore::new(InMemoryDatabase::new());
    store.database().insert_document(
        "users/u1",
        json!({"plan": "free"}).as_object().unwrap().clone(),
    );
    let user = User::new("u1")
        .with_email("asha@example.com")
        .with_display_name("Asha");

    save_user_profile(&store, &user).await.unwrap();

    let stored = store.database().document("users/u1").unwrap();
    assert_eq!(stored["plan"], json!("free"));
    assert_eq!(stored["displayName"], json!("Asha"));
    assert_eq!(stored["email"], json!("asha@example.com"));
    assert!(stored["lastSeenAt"].is_string());
}
