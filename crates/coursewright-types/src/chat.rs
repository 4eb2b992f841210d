//! Session, message, and conversation progress types for coursewright.
//!
//! These types model one conversation with the course design service:
//! the session identity, the append-only message log entries, and the
//! server-owned progress metadata that is merged after every exchange.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Format a timestamp the way the service does (`2024-05-01T09:30:00.000Z`).
pub fn iso_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Assistant,
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sender::User => write!(f, "user"),
            Sender::Assistant => write!(f, "assistant"),
        }
    }
}

impl FromStr for Sender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(Sender::User),
            "assistant" => Ok(Sender::Assistant),
            other => Err(format!("invalid sender: '{other}'")),
        }
    }
}

/// How a message should be presented.
///
/// User messages and ordinary replies are `Normal`. Failed sends produce a
/// synthetic assistant message of type `Error`; content-policy replies from
/// the service are tagged `SafetyNotice`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    #[default]
    Normal,
    Error,
    SafetyNotice,
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageType::Normal => write!(f, "normal"),
            MessageType::Error => write!(f, "error"),
            MessageType::SafetyNotice => write!(f, "safety_notice"),
        }
    }
}

/// Message identifier.
///
/// Locally created messages use a millisecond ordinal; the service may hand
/// back numbers or opaque strings for the messages it creates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageId {
    Ordinal(i64),
    Text(String),
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageId::Ordinal(n) => write!(f, "{n}"),
            MessageId::Text(s) => write!(f, "{s}"),
        }
    }
}

/// A single entry in the conversation log. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub sender: Sender,
    pub content: String,
    /// ISO-8601 timestamp string, kept verbatim from the service.
    pub timestamp: String,
    #[serde(default, deserialize_with = "crate::serde_util::null_as_default")]
    pub message_type: MessageType,
}

impl Message {
    /// A message typed by the user, stamped now.
    pub fn user(id: i64, content: impl Into<String>) -> Self {
        Self {
            id: MessageId::Ordinal(id),
            sender: Sender::User,
            content: content.into(),
            timestamp: iso_timestamp(Utc::now()),
            message_type: MessageType::Normal,
        }
    }

    /// A synthetic assistant message describing a failed send.
    pub fn assistant_error(id: i64, content: impl Into<String>) -> Self {
        Self {
            id: MessageId::Ordinal(id),
            sender: Sender::Assistant,
            content: content.into(),
            timestamp: iso_timestamp(Utc::now()),
            message_type: MessageType::Error,
        }
    }
}

/// The server-side conversation identity held for one interaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            created_at: Utc::now(),
        }
    }
}

/// Conversation progress as reported by the service.
///
/// Never computed locally. Fields the client does not model are kept in
/// `extra` so a later delta can still overwrite them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationMetadata {
    #[serde(default, deserialize_with = "crate::serde_util::null_as_default")]
    pub current_step: u32,
    #[serde(default, deserialize_with = "crate::serde_util::null_as_default")]
    pub total_steps: u32,
    #[serde(default, deserialize_with = "crate::serde_util::null_as_default")]
    pub completion_percentage: f64,
    #[serde(default, deserialize_with = "crate::serde_util::null_as_default")]
    pub framework_areas_covered: BTreeSet<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ConversationMetadata {
    /// Shallow-merge a delta: every field present in the delta replaces the
    /// current value, everything else is carried over.
    pub fn merged(&self, delta: &MetadataDelta) -> ConversationMetadata {
        let mut extra = self.extra.clone();
        for (key, value) in &delta.extra {
            extra.insert(key.clone(), value.clone());
        }

        ConversationMetadata {
            current_step: delta.current_step.unwrap_or(self.current_step),
            total_steps: delta.total_steps.unwrap_or(self.total_steps),
            completion_percentage: delta
                .completion_percentage
                .unwrap_or(self.completion_percentage),
            framework_areas_covered: delta
                .framework_areas_covered
                .clone()
                .unwrap_or_else(|| self.framework_areas_covered.clone()),
            extra,
        }
    }
}

/// A partial update to [`ConversationMetadata`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataDelta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_step: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_steps: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion_percentage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub framework_areas_covered: Option<BTreeSet<String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Result of a successful session creation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatedSession {
    pub session_id: String,
    #[serde(default, deserialize_with = "crate::serde_util::null_as_default")]
    pub conversation: ConversationMetadata,
    pub welcome_message: Message,
}

/// Result of a successful message post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageExchange {
    pub ai_response: Message,
    #[serde(default, deserialize_with = "crate::serde_util::null_as_default")]
    pub conversation_update: MetadataDelta,
    #[serde(default, deserialize_with = "crate::serde_util::null_as_default")]
    pub safety_violation: bool,
}

/// Lifecycle phase of the session manager.
///
/// Errors are not a phase: a failed send returns to `Ready` with the error
/// slot populated, and sending stays possible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ManagerPhase {
    Uninitialized,
    Initializing,
    Ready,
    Sending,
}

impl fmt::Display for ManagerPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ManagerPhase::Uninitialized => write!(f, "uninitialized"),
            ManagerPhase::Initializing => write!(f, "initializing"),
            ManagerPhase::Ready => write!(f, "ready"),
            ManagerPhase::Sending => write!(f, "sending"),
        }
    }
}

/// Which guard of the send gate was not satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendBlock {
    EmptyInput,
    NoSession,
    AlreadySending,
    Offline,
}

/// What happened to a send request.
///
/// A blocked send is a silent no-op, not an error: nothing was appended and
/// the transport was not called.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    Blocked(SendBlock),
    /// Assistant reply appended and progress merged.
    Delivered,
    /// Assistant reply appended, progress withheld.
    SafetyWithheld,
    /// Synthetic error message appended and error slot set.
    Failed,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sender_roundtrip() {
        for sender in [Sender::User, Sender::Assistant] {
            let s = sender.to_string();
            let parsed: Sender = s.parse().unwrap();
            assert_eq!(sender, parsed);
        }
        assert!("bot".parse::<Sender>().is_err());
    }

    #[test]
    fn test_message_type_defaults_to_normal() {
        let msg: Message = serde_json::from_value(json!({
            "id": 1,
            "sender": "assistant",
            "content": "Welcome!",
            "timestamp": "2024-05-01T09:30:00"
        }))
        .unwrap();
        assert_eq!(msg.message_type, MessageType::Normal);
        assert_eq!(msg.id, MessageId::Ordinal(1));
        // Timestamps are kept verbatim, even without a zone suffix.
        assert_eq!(msg.timestamp, "2024-05-01T09:30:00");
    }

    #[test]
    fn test_message_type_serde() {
        let json = serde_json::to_string(&MessageType::SafetyNotice).unwrap();
        assert_eq!(json, "\"safety_notice\"");
        let parsed: MessageType = serde_json::from_str("\"error\"").unwrap();
        assert_eq!(parsed, MessageType::Error);
    }

    #[test]
    fn test_message_id_accepts_strings() {
        let msg: Message = serde_json::from_value(json!({
            "id": "msg-42",
            "sender": "assistant",
            "content": "hi",
            "timestamp": "2024-05-01T09:30:00Z",
            "message_type": "safety_notice"
        }))
        .unwrap();
        assert_eq!(msg.id, MessageId::Text("msg-42".to_string()));
        assert_eq!(msg.message_type, MessageType::SafetyNotice);
    }

    #[test]
    fn test_assistant_error_constructor() {
        let msg = Message::assistant_error(7, "rate limited");
        assert_eq!(msg.sender, Sender::Assistant);
        assert_eq!(msg.message_type, MessageType::Error);
        assert!(msg.timestamp.ends_with('Z'));
    }

    #[test]
    fn test_iso_timestamp_millis() {
        let at = DateTime::parse_from_rfc3339("2024-05-01T09:30:00Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(iso_timestamp(at), "2024-05-01T09:30:00.000Z");
    }

    #[test]
    fn test_metadata_merge_is_shallow() {
        let base: ConversationMetadata = serde_json::from_value(json!({
            "current_step": 1,
            "total_steps": 5,
            "completion_percentage": 0.0,
            "status": "in_progress"
        }))
        .unwrap();
        let delta: MetadataDelta = serde_json::from_value(json!({
            "current_step": 2,
            "completion_percentage": 20.0,
            "framework_areas_covered": ["ethics"]
        }))
        .unwrap();

        let merged = base.merged(&delta);
        assert_eq!(merged.current_step, 2);
        assert_eq!(merged.total_steps, 5);
        assert_eq!(merged.completion_percentage, 20.0);
        assert!(merged.framework_areas_covered.contains("ethics"));
        assert_eq!(merged.extra.get("status"), Some(&json!("in_progress")));
    }

    #[test]
    fn test_metadata_merge_overwrites_extra_keys() {
        let base: ConversationMetadata =
            serde_json::from_value(json!({"status": "in_progress"})).unwrap();
        let delta: MetadataDelta = serde_json::from_value(json!({"status": "completed"})).unwrap();
        let merged = base.merged(&delta);
        assert_eq!(merged.extra.get("status"), Some(&json!("completed")));
    }

    #[test]
    fn test_message_exchange_defaults() {
        let exchange: MessageExchange = serde_json::from_value(json!({
            "ai_response": {
                "id": 2,
                "sender": "assistant",
                "content": "Tell me more.",
                "timestamp": "2024-05-01T09:31:00Z"
            }
        }))
        .unwrap();
        assert!(!exchange.safety_violation);
        assert_eq!(exchange.conversation_update, MetadataDelta::default());
    }

    #[test]
    fn test_message_exchange_null_update() {
        let exchange: MessageExchange = serde_json::from_value(json!({
            "ai_response": {
                "id": 3,
                "sender": "assistant",
                "content": "I can't help with that.",
                "timestamp": "2024-05-01T09:32:00Z",
                "message_type": null
            },
            "conversation_update": null,
            "safety_violation": true
        }))
        .unwrap();
        assert!(exchange.safety_violation);
        assert_eq!(exchange.conversation_update, MetadataDelta::default());
        assert_eq!(exchange.ai_response.message_type, MessageType::Normal);
    }

    #[test]
    fn test_null_safety_flag_means_no_violation() {
        let exchange: MessageExchange = serde_json::from_value(json!({
            "ai_response": {
                "id": 4,
                "sender": "assistant",
                "content": "ok",
                "timestamp": "2024-05-01T09:33:00Z"
            },
            "safety_violation": null
        }))
        .unwrap();
        assert!(!exchange.safety_violation);
    }

    #[test]
    fn test_created_session_null_metadata_fields() {
        let created: CreatedSession = serde_json::from_value(json!({
            "session_id": "abc",
            "conversation": {
                "current_step": 1,
                "total_steps": null,
                "completion_percentage": null,
                "framework_areas_covered": null
            },
            "welcome_message": {
                "id": 1,
                "sender": "assistant",
                "content": "Welcome!",
                "timestamp": "2024-05-01T09:30:00Z"
            }
        }))
        .unwrap();
        assert_eq!(created.conversation.current_step, 1);
        assert_eq!(created.conversation.total_steps, 0);
        assert_eq!(created.conversation.completion_percentage, 0.0);
        assert!(created.conversation.framework_areas_covered.is_empty());
    }

    #[test]
    fn test_created_session_null_conversation() {
        let created: CreatedSession = serde_json::from_value(json!({
            "session_id": "abc",
            "conversation": null,
            "welcome_message": {
                "id": 1,
                "sender": "assistant",
                "content": "Welcome!",
                "timestamp": "2024-05-01T09:30:00Z"
            }
        }))
        .unwrap();
        assert_eq!(created.conversation, ConversationMetadata::default());
    }

    #[test]
    fn test_delta_null_field_is_absent() {
        let delta: MetadataDelta = serde_json::from_value(json!({
            "current_step": 3,
            "framework_areas_covered": null
        }))
        .unwrap();
        assert_eq!(delta.current_step, Some(3));
        assert!(delta.framework_areas_covered.is_none());
    }
}
