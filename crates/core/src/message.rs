//! Message and ConversationLog domain types.
//!
//! These are the core value objects that flow through the entire system:
//! a Human question enters the log → the supervisor delegates → sub-agents
//! report back as Tool messages → the supervisor produces the final answer.
//!
//! The log is append-only and enforces the tool-call pairing invariant:
//! every tool call issued by an Assistant message must be answered by exactly
//! one Tool message before the next Assistant message may be appended.
//! Violations are construction errors, never silently repaired — a repaired
//! history would no longer match what the provider has already seen.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::HistoryError;

/// The role of a message sender in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Fixed instructions for an agent
    System,
    /// The end user, or a synthetic task handed to a sub-agent
    Human,
    /// A model-produced turn
    Assistant,
    /// Tool execution result
    Tool,
}

/// One part of a multimodal message body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    /// A text segment.
    Text { text: String },
    /// A base64-encoded image.
    Image { media_type: String, data: String },
}

/// Message body: plain text for the common case, ordered parts when an
/// image attachment is injected for a vision-capable agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

impl MessageContent {
    /// All text segments concatenated. Image parts contribute nothing.
    pub fn text(&self) -> String {
        match self {
            MessageContent::Text(t) => t.clone(),
            MessageContent::Parts(parts) => parts
                .iter()
                .filter_map(|p| match p {
                    ContentPart::Text { text } => Some(text.as_str()),
                    ContentPart::Image { .. } => None,
                })
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }

    /// Whether any part carries image data.
    pub fn has_images(&self) -> bool {
        match self {
            MessageContent::Text(_) => false,
            MessageContent::Parts(parts) => {
                parts.iter().any(|p| matches!(p, ContentPart::Image { .. }))
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            MessageContent::Text(t) => t.is_empty(),
            MessageContent::Parts(parts) => parts.is_empty(),
        }
    }
}

impl From<String> for MessageContent {
    fn from(s: String) -> Self {
        MessageContent::Text(s)
    }
}

impl From<&str> for MessageContent {
    fn from(s: &str) -> Self {
        MessageContent::Text(s.to_string())
    }
}

/// A single message in a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Unique message ID
    pub id: String,

    /// Who sent this message
    pub role: Role,

    /// The message body
    pub content: MessageContent,

    /// Which agent produced/owns this message, if attributed.
    /// Scoped views are carved out of the shared log by this field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Tool calls requested by the assistant (if any)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<MessageToolCall>,

    /// If this is a tool result, which tool call it responds to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,

    /// Timestamp
    pub timestamp: DateTime<Utc>,
}

impl Message {
    fn base(role: Role, content: MessageContent) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content,
            name: None,
            tool_calls: Vec::new(),
            tool_call_id: None,
            timestamp: Utc::now(),
        }
    }

    /// Create a new system message.
    pub fn system(content: impl Into<MessageContent>) -> Self {
        Self::base(Role::System, content.into())
    }

    /// Create a new human message.
    pub fn human(content: impl Into<MessageContent>) -> Self {
        Self::base(Role::Human, content.into())
    }

    /// Create a new assistant message.
    pub fn assistant(content: impl Into<MessageContent>) -> Self {
        Self::base(Role::Assistant, content.into())
    }

    /// Create a tool result message answering the given call id.
    pub fn tool_result(
        tool_call_id: impl Into<String>,
        content: impl Into<MessageContent>,
    ) -> Self {
        let mut msg = Self::base(Role::Tool, content.into());
        msg.tool_call_id = Some(tool_call_id.into());
        msg
    }

    /// Attribute this message to an agent.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Attach tool calls to this (assistant) message.
    pub fn with_tool_calls(mut self, calls: Vec<MessageToolCall>) -> Self {
        self.tool_calls = calls;
        self
    }

    /// Shorthand for the concatenated text body.
    pub fn text(&self) -> String {
        self.content.text()
    }
}

/// A tool call embedded in an assistant message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageToolCall {
    /// Unique ID for this tool call
    pub id: String,

    /// Name of the tool to invoke
    pub name: String,

    /// Arguments as JSON string
    pub arguments: String,
}

/// The shared, append-only conversation log for one run.
///
/// Owned exclusively by the workflow driver. Sub-agents never hold a
/// reference to it; each bubble gets a fresh log of its own. The only
/// mutation is `append`, which checks the pairing invariant.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversationLog {
    messages: Vec<Message>,
}

impl ConversationLog {
    /// Create a new empty log.
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
        }
    }

    /// Create a log seeded with initial messages (used when opening a
    /// sub-agent bubble: system prompt + task message).
    pub fn seeded(initial: Vec<Message>) -> Self {
        Self { messages: initial }
    }

    /// Append a message, enforcing the tool-call pairing invariant:
    ///
    /// - An `Assistant` message may not be appended while a prior tool call
    ///   is still unanswered.
    /// - A `Tool` message must answer exactly one currently-unanswered call.
    pub fn append(&mut self, message: Message) -> Result<(), HistoryError> {
        match message.role {
            Role::Assistant => {
                let pending = self.unanswered_call_ids();
                if !pending.is_empty() {
                    tracing::error!(?pending, "Refusing assistant append with unanswered tool calls");
                    return Err(HistoryError::UnansweredToolCalls { ids: pending });
                }
            }
            Role::Tool => {
                let Some(id) = message.tool_call_id.as_deref() else {
                    return Err(HistoryError::MissingToolCallId);
                };
                if !self.unanswered_call_ids().iter().any(|p| p == id) {
                    tracing::error!(call_id = id, "Tool response does not answer a pending call");
                    return Err(HistoryError::UnmatchedToolResponse(id.to_string()));
                }
            }
            Role::System | Role::Human => {}
        }

        self.messages.push(message);
        Ok(())
    }

    /// The ordered messages.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Tool call ids issued by the most recent assistant message that have
    /// not yet been answered by a Tool message.
    pub fn unanswered_call_ids(&self) -> Vec<String> {
        let Some(last_assistant) = self
            .messages
            .iter()
            .rposition(|m| m.role == Role::Assistant)
        else {
            return Vec::new();
        };

        let issued = &self.messages[last_assistant].tool_calls;
        if issued.is_empty() {
            return Vec::new();
        }

        issued
            .iter()
            .map(|tc| tc.id.clone())
            .filter(|id| {
                !self.messages[last_assistant + 1..]
                    .iter()
                    .any(|m| m.role == Role::Tool && m.tool_call_id.as_deref() == Some(id))
            })
            .collect()
    }

    /// The id of the first tool call on the most recent assistant message
    /// that carries tool calls. This is the call a sub-agent report must be
    /// paired with.
    pub fn last_tool_call_id(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::Assistant && !m.tool_calls.is_empty())
            .map(|m| m.tool_calls[0].id.as_str())
    }
}
