//! Read-mostly registry of uploaded documents

use std::sync::Arc;

use niti_api::{Document, DocumentStatus};

use crate::{backend::Backend, error::Result};

/// Presentation tone of a status badge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeTone {
    Neutral,
    Info,
    Success,
    Error,
}

/// Status badge for a document in the list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Badge {
    pub label: &'static str,
    pub tone: BadgeTone,
}

/// Total mapping from document status to its badge. An unrecognized wire
/// status gets `pending`'s presentation, never an error.
pub fn status_badge(status: DocumentStatus) -> Badge {
    match status {
        DocumentStatus::Pending | DocumentStatus::Unknown => Badge {
            label: "Pending",
            tone: BadgeTone::Neutral,
        },
        DocumentStatus::Processing => Badge {
            label: "Processing",
            tone: BadgeTone::Info,
        },
        DocumentStatus::Completed => Badge {
            label: "Ready",
            tone: BadgeTone::Success,
        },
        DocumentStatus::Failed => Badge {
            label: "Failed",
            tone: BadgeTone::Error,
        },
    }
}

/// The user's uploaded documents across all conversations. Independent of
/// the conversation store; refreshed wholesale and mutated only by
/// server-confirmed deletion.
pub struct DocumentRegistry {
    backend: Arc<dyn Backend>,
    documents: Vec<Document>,
}

impl DocumentRegistry {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            documents: Vec::new(),
        }
    }

    /// Cached document list, newest first (server ordering)
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    /// Look up a document by id
    pub fn get(&self, id: i64) -> Option<&Document> {
        self.documents.iter().find(|d| d.id == id)
    }

    /// Replace the list with the server's current set. On error the prior
    /// list is retained and the failure is only logged.
    pub async fn refresh(&mut self) {
        match self.backend.list_documents().await {
            Ok(documents) => self.documents = documents,
            Err(e) => tracing::warn!("failed to refresh documents: {}", e),
        }
    }

    /// Delete a document. Fail-closed: local removal only after server
    /// confirmation. The yes/no confirmation gate belongs to the caller.
    pub async fn remove(&mut self, id: i64) -> Result<()> {
        self.backend.delete_document(id).await?;
        self.documents.retain(|d| d.id != id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use niti_api::{ConversationDetail, ConversationSummary, Turn};
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn document(id: i64, status: DocumentStatus) -> Document {
        Document {
            id,
            filename: format!("doc-{}.pdf", id),
            status,
            num_pages: None,
            num_chunks: None,
            error_message: None,
            created_at: DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap(),
            processed_at: None,
            file_url: None,
        }
    }

    struct MockBackend {
        documents: Mutex<Vec<Document>>,
        fail: AtomicBool,
    }

    impl MockBackend {
        fn new(documents: Vec<Document>) -> Self {
            Self {
                documents: Mutex::new(documents),
                fail: AtomicBool::new(false),
            }
        }
    }

    #[async_trait]
    impl Backend for MockBackend {
        async fn list_conversations(&self) -> niti_api::Result<Vec<ConversationSummary>> {
            unimplemented!("not used by registry tests")
        }

        async fn create_conversation(&self, _: &str) -> niti_api::Result<ConversationDetail> {
            unimplemented!("not used by registry tests")
        }

        async fn get_conversation(&self, _: i64) -> niti_api::Result<ConversationDetail> {
            unimplemented!("not used by registry tests")
        }

        async fn update_conversation(
            &self,
            _: i64,
            _: &str,
        ) -> niti_api::Result<ConversationDetail> {
            unimplemented!("not used by registry tests")
        }

        async fn delete_conversation(&self, _: i64) -> niti_api::Result<()> {
            unimplemented!("not used by registry tests")
        }

        async fn add_message(&self, _: i64, _: &str, _: bool) -> niti_api::Result<Turn> {
            unimplemented!("not used by registry tests")
        }

        async fn update_message(&self, _: i64, _: &str) -> niti_api::Result<Turn> {
            unimplemented!("not used by registry tests")
        }

        async fn delete_message(&self, _: i64) -> niti_api::Result<()> {
            unimplemented!("not used by registry tests")
        }

        async fn list_documents(&self) -> niti_api::Result<Vec<Document>> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(niti_api::Error::api(500, "boom"));
            }
            Ok(self.documents.lock().clone())
        }

        async fn upload_document(
            &self,
            _: &str,
            _: Vec<u8>,
            _: Option<i64>,
        ) -> niti_api::Result<Document> {
            unimplemented!("not used by registry tests")
        }

        async fn get_document(&self, _: i64) -> niti_api::Result<Document> {
            unimplemented!("not used by registry tests")
        }

        async fn delete_document(&self, id: i64) -> niti_api::Result<()> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(niti_api::Error::api(500, "boom"));
            }
            self.documents.lock().retain(|d| d.id != id);
            Ok(())
        }
    }

    fn registry_with(mock: &Arc<MockBackend>) -> DocumentRegistry {
        let backend: Arc<dyn Backend> = mock.clone();
        DocumentRegistry::new(backend)
    }

    #[tokio::test]
    async fn test_refresh_replaces_list() {
        let mock = Arc::new(MockBackend::new(vec![
            document(1, DocumentStatus::Completed),
            document(2, DocumentStatus::Processing),
        ]));
        let mut registry = registry_with(&mock);

        registry.refresh().await;

        assert_eq!(registry.documents().len(), 2);
        assert_eq!(registry.get(2).unwrap().status, DocumentStatus::Processing);
    }

    #[tokio::test]
    async fn test_refresh_error_retains_prior_list() {
        let mock = Arc::new(MockBackend::new(vec![document(1, DocumentStatus::Completed)]));
        let mut registry = registry_with(&mock);
        registry.refresh().await;

        mock.fail.store(true, Ordering::SeqCst);
        registry.refresh().await;

        assert_eq!(registry.documents().len(), 1);
    }

    #[tokio::test]
    async fn test_remove_fail_closed() {
        let mock = Arc::new(MockBackend::new(vec![document(1, DocumentStatus::Completed)]));
        let mut registry = registry_with(&mock);
        registry.refresh().await;

        mock.fail.store(true, Ordering::SeqCst);
        assert!(registry.remove(1).await.is_err());
        assert_eq!(registry.documents().len(), 1);
    }

    #[tokio::test]
    async fn test_remove_after_confirmation() {
        let mock = Arc::new(MockBackend::new(vec![
            document(1, DocumentStatus::Completed),
            document(2, DocumentStatus::Failed),
        ]));
        let mut registry = registry_with(&mock);
        registry.refresh().await;

        registry.remove(1).await.unwrap();

        assert!(registry.get(1).is_none());
        assert_eq!(registry.documents().len(), 1);
    }

    #[test]
    fn test_badge_mapping_total() {
        assert_eq!(status_badge(DocumentStatus::Pending).label, "Pending");
        assert_eq!(status_badge(DocumentStatus::Processing).label, "Processing");
        assert_eq!(status_badge(DocumentStatus::Completed).label, "Ready");
        assert_eq!(status_badge(DocumentStatus::Failed).label, "Failed");
    }

    #[test]
    fn test_badge_unknown_presents_as_pending() {
        assert_eq!(
            status_badge(DocumentStatus::Unknown),
            status_badge(DocumentStatus::Pending)
        );
    }
}
