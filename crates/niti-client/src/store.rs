//! Conversation state and reconciliation against the server

use std::sync::Arc;

use chrono::{DateTime, Utc};
use niti_api::{ConversationSummary, Message, Role};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    backend::Backend,
    error::{Error, Result},
};

/// Title given to a conversation at creation, before the first message
/// names it (matches the server-side model default).
pub const DEFAULT_TITLE: &str = "New Chat";

/// Maximum characters of the first message used as the conversation title
const TITLE_MAX_CHARS: usize = 50;

/// A message as held by the store: either server-confirmed or an optimistic
/// placeholder awaiting acknowledgment.
///
/// The pending variant carries a local UUID instead of a server id, so
/// reconciliation by identity can never accidentally match a real server id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ChatMessage {
    /// Server-authoritative message
    Confirmed(Message),
    /// Locally inserted user message, alive only between send-initiation
    /// and server acknowledgment
    Pending {
        local_id: Uuid,
        content: String,
        created_at: DateTime<Utc>,
    },
}

impl ChatMessage {
    /// Message author; pending messages are always user messages
    pub fn role(&self) -> Role {
        match self {
            ChatMessage::Confirmed(m) => m.role,
            ChatMessage::Pending { .. } => Role::User,
        }
    }

    /// Message body
    pub fn content(&self) -> &str {
        match self {
            ChatMessage::Confirmed(m) => &m.content,
            ChatMessage::Pending { content, .. } => content,
        }
    }

    /// Creation time used for chronological ordering
    pub fn created_at(&self) -> DateTime<Utc> {
        match self {
            ChatMessage::Confirmed(m) => m.created_at,
            ChatMessage::Pending { created_at, .. } => *created_at,
        }
    }

    /// Whether this entry is still awaiting server acknowledgment
    pub fn is_pending(&self) -> bool {
        matches!(self, ChatMessage::Pending { .. })
    }

    /// Server id, if confirmed
    pub fn server_id(&self) -> Option<i64> {
        match self {
            ChatMessage::Confirmed(m) => Some(m.id),
            ChatMessage::Pending { .. } => None,
        }
    }

    fn local_id(&self) -> Option<Uuid> {
        match self {
            ChatMessage::Confirmed(_) => None,
            ChatMessage::Pending { local_id, .. } => Some(*local_id),
        }
    }
}

/// Holds the active conversation's ordered message list and the
/// recency-ordered conversation list; the server is the source of truth and
/// every optimistic change is reconciled or rolled back on response.
///
/// Invariant: `messages` is non-decreasing in `created_at` after every
/// operation. The design assumes at most one send/edit in flight at a time;
/// the caller gates input while an operation is running.
pub struct ConversationStore {
    backend: Arc<dyn Backend>,
    active: Option<i64>,
    messages: Vec<ChatMessage>,
    conversations: Vec<ConversationSummary>,
    use_rag: bool,
}

impl ConversationStore {
    /// Create a store over a backend
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            active: None,
            messages: Vec::new(),
            conversations: Vec::new(),
            use_rag: true,
        }
    }

    /// Id of the active conversation, if any
    pub fn active_conversation_id(&self) -> Option<i64> {
        self.active
    }

    /// Messages of the active conversation, in chronological order
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Cached conversation list, most recently updated first
    pub fn conversations(&self) -> &[ConversationSummary] {
        &self.conversations
    }

    /// Toggle retrieval-augmented answers for subsequent sends
    pub fn set_use_rag(&mut self, use_rag: bool) {
        self.use_rag = use_rag;
    }

    /// Refresh the conversation list from the server.
    ///
    /// Read-path degradation: on error the prior list is retained and the
    /// failure is only logged.
    pub async fn load_conversations(&mut self) {
        match self.backend.list_conversations().await {
            Ok(list) => self.conversations = list,
            Err(e) => tracing::warn!("failed to load conversations: {}", e),
        }
    }

    /// Make a conversation active, replacing `messages` wholesale with the
    /// server's record. On error state is left untouched.
    pub async fn open_conversation(&mut self, id: i64) -> Result<()> {
        let detail = self.backend.get_conversation(id).await?;
        self.messages = detail
            .messages
            .into_iter()
            .map(ChatMessage::Confirmed)
            .collect();
        self.active = Some(id);
        Ok(())
    }

    /// Create a conversation server-side and make it active.
    ///
    /// Not optimistic: the server-assigned id is required for sends, so the
    /// store waits for confirmation before touching local state.
    pub async fn start_new_conversation(&mut self) -> Result<i64> {
        let detail = self.backend.create_conversation(DEFAULT_TITLE).await?;
        self.conversations.insert(
            0,
            ConversationSummary {
                id: detail.id,
                title: detail.title,
                updated_at: detail.updated_at,
                message_count: 0,
                last_message: None,
            },
        );
        self.active = Some(detail.id);
        self.messages.clear();
        Ok(detail.id)
    }

    /// Send a user message.
    ///
    /// Creates a conversation first when none is active. The message appears
    /// locally right away as a pending entry; on success it is replaced by
    /// the server's user+assistant pair, on failure it is removed with no
    /// other state touched.
    pub async fn send(&mut self, content: impl Into<String>) -> Result<()> {
        let content = content.into();
        let conversation_id = match self.active {
            Some(id) => id,
            None => self.start_new_conversation().await?,
        };

        let first_message = self.messages.is_empty();
        let local_id = self.push_pending(&content);

        match self
            .backend
            .add_message(conversation_id, &content, self.use_rag)
            .await
        {
            Ok(turn) => {
                self.messages.retain(|m| m.local_id() != Some(local_id));
                self.messages.push(ChatMessage::Confirmed(turn.user_message));
                self.messages
                    .push(ChatMessage::Confirmed(turn.assistant_message));
                self.sort_messages();

                if first_message {
                    self.apply_first_message_title(conversation_id, &content).await;
                }
                Ok(())
            }
            Err(e) => {
                self.messages.retain(|m| m.local_id() != Some(local_id));
                Err(e.into())
            }
        }
    }

    /// Edit a user message; the server regenerates the assistant answer.
    ///
    /// Reconciliation: the old user message is removed, and when the entry
    /// immediately after it is an assistant message that answer is treated
    /// as superseded and removed too. The fresh pair is then inserted and
    /// the list re-sorted. Adjacency plus role is the only turn signal.
    pub async fn edit(&mut self, message_id: i64, new_content: &str) -> Result<()> {
        if new_content.trim().is_empty() {
            return Err(Error::Validation("message content cannot be empty".into()));
        }

        let turn = self.backend.update_message(message_id, new_content).await?;

        // A stale or foreign id means there is nothing to reconcile against;
        // the local list stays untouched rather than gaining a turn it never
        // displayed.
        let Some(pos) = self
            .messages
            .iter()
            .position(|m| m.server_id() == Some(message_id))
        else {
            tracing::warn!("edited message {} not present locally", message_id);
            return Ok(());
        };

        let superseded_answer = self
            .messages
            .get(pos + 1)
            .is_some_and(|m| m.role() == Role::Assistant);
        if superseded_answer {
            self.messages.remove(pos + 1);
        }
        self.messages.remove(pos);

        self.messages.push(ChatMessage::Confirmed(turn.user_message));
        self.messages
            .push(ChatMessage::Confirmed(turn.assistant_message));
        self.sort_messages();
        Ok(())
    }

    /// Delete a message. Fail-closed: the local entry is removed only after
    /// the server confirms the deletion.
    pub async fn delete_message(&mut self, message_id: i64) -> Result<()> {
        self.backend.delete_message(message_id).await?;
        self.messages.retain(|m| m.server_id() != Some(message_id));
        Ok(())
    }

    /// Delete a conversation. Fail-closed like `delete_message`; deleting
    /// the active conversation also clears the message list.
    pub async fn delete_conversation(&mut self, id: i64) -> Result<()> {
        self.backend.delete_conversation(id).await?;
        self.conversations.retain(|c| c.id != id);
        if self.active == Some(id) {
            self.active = None;
            self.messages.clear();
        }
        Ok(())
    }

    /// Insert the optimistic placeholder for an outgoing message
    fn push_pending(&mut self, content: &str) -> Uuid {
        let local_id = Uuid::new_v4();
        self.messages.push(ChatMessage::Pending {
            local_id,
            content: content.to_string(),
            created_at: Utc::now(),
        });
        local_id
    }

    /// After the first message of a conversation, name it after the message.
    /// The local summary is patched optimistically; the server write and the
    /// following list refresh supersede it. Failures here are not fatal to
    /// the send that triggered them.
    async fn apply_first_message_title(&mut self, conversation_id: i64, content: &str) {
        let title = truncate_title(content, TITLE_MAX_CHARS);
        if let Some(summary) = self
            .conversations
            .iter_mut()
            .find(|c| c.id == conversation_id)
        {
            summary.title = title.clone();
        }
        if let Err(e) = self
            .backend
            .update_conversation(conversation_id, &title)
            .await
        {
            tracing::warn!("failed to update conversation title: {}", e);
            return;
        }
        self.load_conversations().await;
    }

    /// Restore non-decreasing `created_at` order. The sort is stable, so a
    /// user message and its answer keep their relative order when the server
    /// assigns them the same timestamp.
    fn sort_messages(&mut self) {
        self.messages
            .sort_by(|a, b| a.created_at().cmp(&b.created_at()));
    }
}

/// Prefix of `content` capped at `max` characters, safe on multibyte text
fn truncate_title(content: &str, max: usize) -> String {
    content.chars().take(max).collect()
}
