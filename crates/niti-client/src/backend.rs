//! Backend abstraction over the HTTP API

use async_trait::async_trait;
use niti_api::{ApiClient, ConversationDetail, ConversationSummary, Document, Result, Turn};

/// The server operations the state layer depends on.
///
/// `ApiClient` is the production implementation; tests substitute mocks so
/// store logic runs without a network.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn list_conversations(&self) -> Result<Vec<ConversationSummary>>;
    async fn create_conversation(&self, title: &str) -> Result<ConversationDetail>;
    async fn get_conversation(&self, id: i64) -> Result<ConversationDetail>;
    async fn update_conversation(&self, id: i64, title: &str) -> Result<ConversationDetail>;
    async fn delete_conversation(&self, id: i64) -> Result<()>;

    async fn add_message(&self, conversation_id: i64, content: &str, use_rag: bool)
    -> Result<Turn>;
    async fn update_message(&self, message_id: i64, content: &str) -> Result<Turn>;
    async fn delete_message(&self, message_id: i64) -> Result<()>;

    async fn list_documents(&self) -> Result<Vec<Document>>;
    async fn upload_document(
        &self,
        filename: &str,
        bytes: Vec<u8>,
        conversation_id: Option<i64>,
    ) -> Result<Document>;
    async fn get_document(&self, id: i64) -> Result<Document>;
    async fn delete_document(&self, id: i64) -> Result<()>;
}

#[async_trait]
impl Backend for ApiClient {
    async fn list_conversations(&self) -> Result<Vec<ConversationSummary>> {
        ApiClient::list_conversations(self).await
    }

    async fn create_conversation(&self, title: &str) -> Result<ConversationDetail> {
        ApiClient::create_conversation(self, title).await
    }

    async fn get_conversation(&self, id: i64) -> Result<ConversationDetail> {
        ApiClient::get_conversation(self, id).await
    }

    async fn update_conversation(&self, id: i64, title: &str) -> Result<ConversationDetail> {
        ApiClient::update_conversation(self, id, title).await
    }

    async fn delete_conversation(&self, id: i64) -> Result<()> {
        ApiClient::delete_conversation(self, id).await
    }

    async fn add_message(
        &self,
        conversation_id: i64,
        content: &str,
        use_rag: bool,
    ) -> Result<Turn> {
        ApiClient::add_message(self, conversation_id, content, use_rag).await
    }

    async fn update_message(&self, message_id: i64, content: &str) -> Result<Turn> {
        ApiClient::update_message(self, message_id, content).await
    }

    async fn delete_message(&self, message_id: i64) -> Result<()> {
        ApiClient::delete_message(self, message_id).await
    }

    async fn list_documents(&self) -> Result<Vec<Document>> {
        ApiClient::list_documents(self).await
    }

    async fn upload_document(
        &self,
        filename: &str,
        bytes: Vec<u8>,
        conversation_id: Option<i64>,
    ) -> Result<Document> {
        ApiClient::upload_document(self, filename, bytes, conversation_id).await
    }

    async fn get_document(&self, id: i64) -> Result<Document> {
        ApiClient::get_document(self, id).await
    }

    async fn delete_document(&self, id: i64) -> Result<()> {
        ApiClient::delete_document(self, id).await
    }
}
