use async_openai::types::{CreateMessageRequest, MessageContent};

use crate::ais::{Message, Role};

// region --- Message Constructors

pub fn user_msg(content: impl Into<String>) -> CreateMessageRequest {
    CreateMessageRequest {
        role: "user".to_string(),
        content: content.into(),
        ..Default::default()
    }
}

// endregion --- Message Constructors

// region --- Content Extractors

/// Text of the first content item. Image content has no text.
pub fn text_content(content: Vec<MessageContent>) -> Option<String> {
    match content.into_iter().next()? {
        MessageContent::Text(text) => Some(text.text.value),
        MessageContent::ImageFile(_) => None,
    }
}

/// First assistant-authored message of a newest-first list.
pub fn latest_assistant_msg(messages: &[Message]) -> Option<&Message> {
    messages.iter().find(|msg| msg.role == Role::Assistant)
}

// endregion --- Content Extractors
