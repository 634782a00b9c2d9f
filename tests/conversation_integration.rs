//! End-to-end conversation flow
//!
//! Drives the real conversation store and HTTP transport against an
//! in-process proxy backed by scripted completions.

mod common;

use common::{spawn_proxy, ScriptedProvider};

use chatrelay::chat::{ConversationStore, HttpTransport};
use chatrelay::message::Message;
use chatrelay::storage::ConversationLog;
use std::sync::Arc;
use tempfile::TempDir;

fn temp_storage(dir: &TempDir) -> ConversationLog {
    ConversationLog::new_with_path(dir.path().join("chat.db")).unwrap()
}

#[tokio::test]
async fn test_send_streams_and_persists() {
    let provider = ScriptedProvider::new(&["Hello", " world"]);
    let endpoint = spawn_proxy(Arc::new(provider)).await;

    let dir = TempDir::new().unwrap();
    let transport = HttpTransport::new(endpoint).unwrap();
    let mut store = ConversationStore::new(Box::new(transport), temp_storage(&dir)).unwrap();

    let mut snapshots = Vec::new();
    store
        .send("Hi there", |messages| snapshots.push(messages.to_vec()))
        .await
        .unwrap();

    let expected = vec![Message::user("Hi there"), Message::assistant("Hello world")];
    assert_eq!(store.messages(), expected.as_slice());

    // The reply grew monotonically across full-replace snapshots.
    assert_eq!(snapshots.last().unwrap(), &expected);

    // A fresh store restores the identical ordered sequence.
    let provider = ScriptedProvider::new(&[]);
    let endpoint = spawn_proxy(Arc::new(provider)).await;
    let transport = HttpTransport::new(endpoint).unwrap();
    let restored = ConversationStore::new(Box::new(transport), temp_storage(&dir)).unwrap();
    assert_eq!(restored.messages(), expected.as_slice());
}

#[tokio::test]
async fn test_failed_request_restores_pre_send_state() {
    // Point the client at a path the proxy does not serve.
    let provider = ScriptedProvider::new(&["never"]);
    let endpoint = spawn_proxy(Arc::new(provider)).await;
    let wrong_endpoint = endpoint.replace("/functions/v1/chat", "/nope");

    let dir = TempDir::new().unwrap();
    let transport = HttpTransport::new(wrong_endpoint).unwrap();
    let mut store = ConversationStore::new(Box::new(transport), temp_storage(&dir)).unwrap();

    let result = store.send("Hi", |_| {}).await;
    assert!(result.is_err());

    // Conversation equals its pre-send state, in memory and on disk.
    assert!(store.is_empty());
    assert_eq!(temp_storage(&dir).load().unwrap(), Some(Vec::new()));
}

#[tokio::test]
async fn test_second_turn_sends_full_conversation() {
    let provider = ScriptedProvider::new(&["reply"]);
    let seen = Arc::clone(&provider.seen);
    let endpoint = spawn_proxy(Arc::new(provider)).await;

    let dir = TempDir::new().unwrap();
    let transport = HttpTransport::new(endpoint).unwrap();
    let mut store = ConversationStore::new(Box::new(transport), temp_storage(&dir)).unwrap();

    store.send("One", |_| {}).await.unwrap();
    store.send("Two", |_| {}).await.unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0], vec![Message::user("One")]);
    assert_eq!(
        seen[1],
        vec![
            Message::user("One"),
            Message::assistant("reply"),
            Message::user("Two")
        ]
    );
}

#[tokio::test]
async fn test_clear_removes_persisted_state() {
    let provider = ScriptedProvider::new(&["reply"]);
    let endpoint = spawn_proxy(Arc::new(provider)).await;

    let dir = TempDir::new().unwrap();
    let transport = HttpTransport::new(endpoint).unwrap();
    let mut store = ConversationStore::new(Box::new(transport), temp_storage(&dir)).unwrap();

    store.send("Hi", |_| {}).await.unwrap();
    assert!(!store.is_empty());

    store.clear().unwrap();
    assert!(store.is_empty());
    assert_eq!(temp_storage(&dir).load().unwrap(), None);

    // Clearing again yields the same empty state.
    store.clear().unwrap();
    assert!(store.is_empty());
    assert_eq!(temp_storage(&dir).load().unwrap(), None);
}
