//! Wire types for the niti chat backend

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Message author
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A single message within a conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    pub role: Role,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Preview of the most recent message, as built by the list endpoint
/// (content is truncated server-side to 50 characters).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LastMessage {
    pub role: Role,
    pub content: String,
}

/// Conversation as returned by the list endpoint (no message bodies)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationSummary {
    pub id: i64,
    pub title: String,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub message_count: u32,
    #[serde(default)]
    pub last_message: Option<LastMessage>,
}

/// Conversation as returned by the detail endpoint, messages included
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationDetail {
    pub id: i64,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(default)]
    pub message_count: u32,
}

/// The user message and the assistant message that answers it, as returned
/// by the add-message and update-message endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub user_message: Message,
    pub assistant_message: Message,
}

/// Document processing status.
///
/// The server owns transitions (`pending -> processing -> completed|failed`);
/// the client only ever reads this. `Unknown` absorbs any wire value a newer
/// backend might send so deserialization never fails on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    Pending,
    Processing,
    Completed,
    Failed,
    #[serde(other)]
    Unknown,
}

impl DocumentStatus {
    /// Whether no further transition can occur from this status
    pub fn is_terminal(&self) -> bool {
        matches!(self, DocumentStatus::Completed | DocumentStatus::Failed)
    }
}

/// An uploaded PDF document and its processing metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: i64,
    pub filename: String,
    pub status: DocumentStatus,
    #[serde(default)]
    pub num_pages: Option<u32>,
    #[serde(default)]
    pub num_chunks: Option<u32>,
    #[serde(default)]
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub processed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub file_url: Option<String>,
}

/// Login credentials
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Registration payload
#[derive(Debug, Clone, Serialize)]
pub struct Signup {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Authenticated user profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: String,
}

/// Token and profile returned by login/signup
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_terminal() {
        assert!(DocumentStatus::Completed.is_terminal());
        assert!(DocumentStatus::Failed.is_terminal());
        assert!(!DocumentStatus::Pending.is_terminal());
        assert!(!DocumentStatus::Processing.is_terminal());
        assert!(!DocumentStatus::Unknown.is_terminal());
    }

    #[test]
    fn test_status_unknown_wire_value() {
        let status: DocumentStatus = serde_json::from_str("\"queued\"").unwrap();
        assert_eq!(status, DocumentStatus::Unknown);
    }

    #[test]
    fn test_document_deserializes_minimal_fields() {
        // Optional metadata may be absent while a document is still pending
        let json = r#"{
            "id": 7,
            "filename": "act.pdf",
            "status": "pending",
            "created_at": "2024-03-01T10:00:00Z"
        }"#;
        let doc: Document = serde_json::from_str(json).unwrap();
        assert_eq!(doc.status, DocumentStatus::Pending);
        assert!(doc.num_pages.is_none());
        assert!(doc.error_message.is_none());
    }

    #[test]
    fn test_turn_deserialization() {
        let json = r#"{
            "user_message": {"id": 1, "role": "user", "content": "hi", "created_at": "2024-03-01T10:00:00Z"},
            "assistant_message": {"id": 2, "role": "assistant", "content": "hello", "created_at": "2024-03-01T10:00:01Z"}
        }"#;
        let turn: Turn = serde_json::from_str(json).unwrap();
        assert_eq!(turn.user_message.role, Role::User);
        assert_eq!(turn.assistant_message.role, Role::Assistant);
    }
}
