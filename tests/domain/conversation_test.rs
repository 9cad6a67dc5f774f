use relaychat::domain::{Conversation, MessageContent, MessageRole, derive_title};

#[test]
fn given_short_first_message_when_starting_then_title_is_message() {
    let content = MessageContent::parse("What is Rust?", 10_000).unwrap();

    let (conversation, message) = Conversation::start(content, 50);

    assert_eq!(conversation.title, "What is Rust?");
    assert_eq!(message.role, MessageRole::User);
    assert_eq!(message.conversation_id, conversation.id);
    assert_eq!(message.content, "What is Rust?");
}

#[test]
fn given_long_first_message_when_starting_then_title_is_truncated_with_ellipsis() {
    let text = "x".repeat(80);
    let content = MessageContent::parse(&text, 10_000).unwrap();

    let (conversation, _) = Conversation::start(content, 50);

    assert_eq!(conversation.title, format!("{}...", "x".repeat(50)));
}

#[test]
fn given_new_conversation_when_started_then_contains_first_message_and_shared_timestamps() {
    let content = MessageContent::parse("hello", 10_000).unwrap();

    let (conversation, message) = Conversation::start(content, 50);

    assert_eq!(conversation.messages, vec![message.clone()]);
    assert_eq!(conversation.created_at, message.created_at);
    assert_eq!(conversation.updated_at, message.created_at);
}

#[test]
fn given_text_exactly_at_title_length_when_deriving_then_no_ellipsis() {
    let text = "y".repeat(50);
    assert_eq!(derive_title(&text, 50), text);
}

#[test]
fn given_multibyte_text_when_deriving_title_then_cuts_on_character_boundary() {
    let text = "日本語のテキスト";
    assert_eq!(derive_title(text, 3), "日本語...");
}
