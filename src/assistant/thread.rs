use crate::assistant::{AssistantReply, BackendError};
use crate::render::GeneratedComponent;
use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: u64,
    pub role: Role,
    pub content: String,
    /// Seconds since the Unix epoch.
    pub timestamp: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_component: Option<GeneratedComponent>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ThreadState {
    pub messages: Vec<ChatMessage>,
    pub is_generating: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ThreadError {
    #[error("a reply is still being generated")]
    Busy,
    #[error("message is empty")]
    EmptyMessage,
}

/// Conversation state. One turn is outstanding at a time; a new message is
/// refused until the current turn completes or fails.
#[derive(Debug, Default)]
pub struct ChatThread {
    state: ThreadState,
    next_id: u64,
}

impl ChatThread {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ThreadState {
        &self.state
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.state.messages
    }

    pub fn is_generating(&self) -> bool {
        self.state.is_generating
    }

    pub fn error(&self) -> Option<&str> {
        self.state.error.as_deref()
    }

    /// Records the user's message and returns the history to send.
    pub fn begin_turn(&mut self, content: &str) -> Result<Vec<ChatMessage>, ThreadError> {
        if self.state.is_generating {
            return Err(ThreadError::Busy);
        }
        let content = content.trim();
        if content.is_empty() {
            return Err(ThreadError::EmptyMessage);
        }

        let message = self.message(Role::User, content.to_string(), None);
        self.state.messages.push(message);
        self.state.is_generating = true;
        self.state.error = None;
        Ok(self.state.messages.clone())
    }

    pub fn complete_turn(&mut self, reply: AssistantReply) -> &ChatMessage {
        let message = self.message(Role::Assistant, reply.content, reply.component);
        self.state.messages.push(message);
        self.state.is_generating = false;
        &self.state.messages[self.state.messages.len() - 1]
    }

    pub fn fail_turn(&mut self, error: &BackendError) {
        self.state.is_generating = false;
        self.state.error = Some(error.to_string());
    }

    pub fn dismiss_error(&mut self) {
        self.state.error = None;
    }

    pub fn clear(&mut self) {
        self.state = ThreadState::default();
    }

    pub fn latest_component(&self) -> Option<&GeneratedComponent> {
        self.state
            .messages
            .iter()
            .rev()
            .find_map(|message| message.generated_component.as_ref())
    }

    fn message(
        &mut self,
        role: Role,
        content: String,
        generated_component: Option<GeneratedComponent>,
    ) -> ChatMessage {
        self.next_id += 1;
        ChatMessage {
            id: self.next_id,
            role,
            content,
            timestamp: timestamp(),
            generated_component,
        }
    }
}

fn timestamp() -> u64 {
    match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(duration) => duration.as_secs(),
        Err(_) => 0,
    }
}
