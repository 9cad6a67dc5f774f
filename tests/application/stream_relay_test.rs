use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::stream::{self, StreamExt};

use relaychat::application::ports::{
    ConversationRepository, InferenceError, InferenceEvent, InferenceStream,
};
use relaychat::application::services::{RelayEvent, StreamFailure, relay};
use relaychat::domain::{Conversation, ConversationId, MessageContent, MessageRole};

use crate::helpers::InMemoryConversationRepository;

async fn seeded(repository: &InMemoryConversationRepository) -> ConversationId {
    let (conversation, first) =
        Conversation::start(MessageContent::parse("Say hello", 100).unwrap(), 50);
    repository
        .create_conversation(&conversation, &first)
        .await
        .unwrap();
    conversation.id
}

fn scripted(events: Vec<InferenceEvent>) -> InferenceStream {
    Box::pin(stream::iter(events))
}

fn token(text: &str) -> InferenceEvent {
    InferenceEvent::Token(text.to_string())
}

#[tokio::test]
async fn given_fragments_and_done_when_relaying_then_forwards_tokens_and_stores_full_text_once() {
    let repository = Arc::new(InMemoryConversationRepository::new());
    let conversation_id = seeded(&repository).await;
    let events = scripted(vec![
        token("Hel"),
        token("lo, "),
        token("world"),
        InferenceEvent::Done("Hello, world".to_string()),
    ]);

    let relayed: Vec<RelayEvent> = relay(events, repository.clone(), conversation_id)
        .collect()
        .await;

    assert_eq!(relayed.len(), 4);
    let tokens: Vec<_> = relayed
        .iter()
        .filter_map(|e| match e {
            RelayEvent::Token(t) => Some(t.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(tokens, vec!["Hel", "lo, ", "world"]);

    match relayed.last() {
        Some(RelayEvent::Done(message)) => {
            assert_eq!(message.content, "Hello, world");
            assert_eq!(message.role, MessageRole::Assistant);
        }
        other => panic!("expected done, got {:?}", other),
    }

    assert_eq!(repository.append_count(), 1);
    let stored = repository.messages_of(conversation_id);
    assert_eq!(stored.len(), 2);
    assert_eq!(stored[1].content, "Hello, world");
}

#[tokio::test]
async fn given_error_event_when_relaying_then_fails_once_and_stores_nothing() {
    let repository = Arc::new(InMemoryConversationRepository::new());
    let conversation_id = seeded(&repository).await;
    let events = scripted(vec![
        token("partial"),
        InferenceEvent::Error(InferenceError::Connection("reset".to_string())),
    ]);

    let relayed: Vec<RelayEvent> = relay(events, repository.clone(), conversation_id)
        .collect()
        .await;

    assert_eq!(relayed.len(), 2);
    assert!(matches!(
        relayed.last(),
        Some(RelayEvent::Failed(StreamFailure::Inference(
            InferenceError::Connection(_)
        )))
    ));
    assert_eq!(repository.append_count(), 0);
}

#[tokio::test]
async fn given_upstream_without_terminal_event_when_relaying_then_reports_no_response() {
    let repository = Arc::new(InMemoryConversationRepository::new());
    let conversation_id = seeded(&repository).await;

    let relayed: Vec<RelayEvent> = relay(scripted(vec![]), repository.clone(), conversation_id)
        .collect()
        .await;

    assert_eq!(relayed.len(), 1);
    assert!(matches!(
        relayed[0],
        RelayEvent::Failed(StreamFailure::Inference(InferenceError::NoResponse))
    ));
    assert_eq!(repository.append_count(), 0);
}

#[tokio::test]
async fn given_non_terminal_client_error_when_relaying_then_relay_still_stops() {
    let repository = Arc::new(InMemoryConversationRepository::new());
    let conversation_id = seeded(&repository).await;
    let events = scripted(vec![
        token("a"),
        InferenceEvent::Error(InferenceError::Response("bad line".to_string())),
        token("b"),
        InferenceEvent::Done("ab".to_string()),
    ]);

    let relayed: Vec<RelayEvent> = relay(events, repository.clone(), conversation_id)
        .collect()
        .await;

    assert_eq!(relayed.len(), 2);
    assert!(matches!(relayed[1], RelayEvent::Failed(_)));
    assert_eq!(repository.append_count(), 0);
}

#[tokio::test]
async fn given_events_after_done_when_relaying_then_they_are_not_forwarded() {
    let repository = Arc::new(InMemoryConversationRepository::new());
    let conversation_id = seeded(&repository).await;
    let events = scripted(vec![
        token("one"),
        InferenceEvent::Done("one".to_string()),
        token("late"),
        InferenceEvent::Done("one late".to_string()),
    ]);

    let relayed: Vec<RelayEvent> = relay(events, repository.clone(), conversation_id)
        .collect()
        .await;

    assert_eq!(relayed.len(), 2);
    assert!(matches!(relayed[1], RelayEvent::Done(_)));
    assert_eq!(repository.append_count(), 1);
}

#[tokio::test]
async fn given_storage_failure_when_done_then_reports_persistence_failure() {
    let repository = Arc::new(InMemoryConversationRepository::failing_appends());
    let conversation_id = seeded(&repository).await;
    let events = scripted(vec![token("hi"), InferenceEvent::Done("hi".to_string())]);

    let relayed: Vec<RelayEvent> = relay(events, repository.clone(), conversation_id)
        .collect()
        .await;

    assert_eq!(relayed.len(), 2);
    assert!(matches!(
        relayed[1],
        RelayEvent::Failed(StreamFailure::Persistence(_))
    ));
    assert_eq!(repository.append_count(), 1);
}

#[tokio::test]
async fn given_subscriber_leaves_early_when_relaying_then_nothing_is_stored() {
    let repository = Arc::new(InMemoryConversationRepository::new());
    let conversation_id = seeded(&repository).await;
    let events = scripted(vec![
        token("Hel"),
        token("lo"),
        InferenceEvent::Done("Hello".to_string()),
    ]);

    let mut relayed = relay(events, repository.clone(), conversation_id);
    let first = relayed.next().await;
    drop(relayed);

    assert!(matches!(first, Some(RelayEvent::Token(_))));
    assert_eq!(repository.append_count(), 0);
    assert_eq!(repository.messages_of(conversation_id).len(), 1);
}

/// Sets its flag when the owning upstream stream is dropped.
struct DropFlag(Arc<AtomicBool>);

impl Drop for DropFlag {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

fn watched(events: Vec<InferenceEvent>, dropped: Arc<AtomicBool>) -> InferenceStream {
    let guard = DropFlag(dropped);
    Box::pin(stream::iter(events).map(move |event| {
        let _owned = &guard;
        event
    }))
}

#[tokio::test]
async fn given_subscriber_leaves_early_when_relaying_then_upstream_is_released() {
    let repository = Arc::new(InMemoryConversationRepository::new());
    let conversation_id = seeded(&repository).await;
    let dropped = Arc::new(AtomicBool::new(false));
    let events = watched(
        vec![token("Hel"), token("lo"), InferenceEvent::Done("Hello".to_string())],
        Arc::clone(&dropped),
    );

    let mut relayed = relay(events, repository.clone(), conversation_id);
    assert!(matches!(relayed.next().await, Some(RelayEvent::Token(_))));
    assert!(!dropped.load(Ordering::SeqCst));

    drop(relayed);

    assert!(dropped.load(Ordering::SeqCst));
    assert_eq!(repository.append_count(), 0);
}
