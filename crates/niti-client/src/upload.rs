//! Document upload and processing-status polling

use std::{sync::Arc, time::Duration};

use niti_api::{Document, DocumentStatus};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::{
    backend::Backend,
    error::{Error, Result},
};

/// Client-side upload size cap (10 MiB)
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// User-facing notice for a failed upload call
const UPLOAD_FAILED_NOTICE: &str = "Upload failed. Please try again.";

/// User-facing notice when the server reports failure without detail
const PROCESSING_FAILED_NOTICE: &str = "Document processing failed.";

/// A file candidate for upload
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    /// Local validation, performed before any network call. The extension
    /// check is case-sensitive, matching the server's own check.
    fn validate(&self) -> Result<()> {
        if !self.name.ends_with(".pdf") {
            return Err(Error::Validation("only PDF files are supported".into()));
        }
        if self.bytes.len() > MAX_UPLOAD_BYTES {
            return Err(Error::Validation(
                "file exceeds the 10 MiB upload limit".into(),
            ));
        }
        Ok(())
    }
}

/// Lifecycle of one upload attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadPhase {
    Idle,
    Uploading,
    Processing,
    Done,
    Error,
}

/// Status-polling schedule. Defaults bound worst-case polling to
/// 60 checks x 5s = 300 seconds.
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Delay between status checks
    pub interval: Duration,
    /// Maximum number of non-terminal checks before giving up
    pub max_attempts: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            max_attempts: 60,
        }
    }
}

/// Events emitted over the upload lifecycle
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UploadEvent {
    /// The controller moved to a new phase
    PhaseChanged { phase: UploadPhase },
    /// Processing reached `completed`; carries the full document record
    Completed { document: Document },
    /// Upload or processing failed; `message` is ready to surface
    Failed { message: String },
}

struct UploadState {
    phase: UploadPhase,
    attempts: u32,
    document_id: Option<i64>,
}

/// Drives one upload at a time: local validation, the multipart upload call,
/// then a bounded, cancellable poll loop against the document resource.
///
/// The caller's control surface is expected to disable itself while
/// `is_busy()`; the controller does not guard re-entrant submits. Dropping
/// the controller cancels any in-flight poll task, so a poll scheduled
/// before teardown can never write stale state afterwards.
pub struct UploadController {
    backend: Arc<dyn Backend>,
    config: PollConfig,
    state: Arc<Mutex<UploadState>>,
    event_tx: broadcast::Sender<UploadEvent>,
    cancel: CancellationToken,
}

impl UploadController {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self::with_config(backend, PollConfig::default())
    }

    pub fn with_config(backend: Arc<dyn Backend>, config: PollConfig) -> Self {
        let (event_tx, _) = broadcast::channel(64);
        Self {
            backend,
            config,
            state: Arc::new(Mutex::new(UploadState {
                phase: UploadPhase::Idle,
                attempts: 0,
                document_id: None,
            })),
            event_tx,
            cancel: CancellationToken::new(),
        }
    }

    /// Subscribe to upload lifecycle events
    pub fn subscribe(&self) -> broadcast::Receiver<UploadEvent> {
        self.event_tx.subscribe()
    }

    /// Current phase
    pub fn phase(&self) -> UploadPhase {
        self.state.lock().phase
    }

    /// Number of status checks performed for the current upload
    pub fn attempts(&self) -> u32 {
        self.state.lock().attempts
    }

    /// Server id of the document being tracked, once the upload succeeded
    pub fn document_id(&self) -> Option<i64> {
        self.state.lock().document_id
    }

    /// Whether an upload or its processing is still in flight
    pub fn is_busy(&self) -> bool {
        matches!(self.phase(), UploadPhase::Uploading | UploadPhase::Processing)
    }

    /// Validate and upload a file, then start polling its processing status
    /// in the background.
    ///
    /// Validation failures and upload transport failures return immediately;
    /// on success the returned document is still `pending` and the terminal
    /// outcome arrives as an `UploadEvent`.
    pub async fn submit(
        &self,
        file: UploadFile,
        conversation_id: Option<i64>,
    ) -> Result<Document> {
        file.validate()?;
        let UploadFile { name, bytes } = file;

        self.set_phase(UploadPhase::Uploading);
        {
            let mut state = self.state.lock();
            state.attempts = 0;
            state.document_id = None;
        }

        let document = match self
            .backend
            .upload_document(&name, bytes, conversation_id)
            .await
        {
            Ok(document) => document,
            Err(e) => {
                tracing::warn!("upload of {} failed: {}", name, e);
                self.set_phase(UploadPhase::Error);
                let _ = self.event_tx.send(UploadEvent::Failed {
                    message: UPLOAD_FAILED_NOTICE.to_string(),
                });
                return Err(e.into());
            }
        };

        self.state.lock().document_id = Some(document.id);
        self.set_phase(UploadPhase::Processing);
        self.spawn_poll(document.id);
        Ok(document)
    }

    fn set_phase(&self, phase: UploadPhase) {
        transition(&self.state, &self.event_tx, phase);
    }

    fn spawn_poll(&self, document_id: i64) {
        let backend = Arc::clone(&self.backend);
        let config = self.config.clone();
        let state = Arc::clone(&self.state);
        let event_tx = self.event_tx.clone();
        let cancel = self.cancel.child_token();

        tokio::spawn(async move {
            poll_loop(backend, config, state, event_tx, cancel, document_id).await;
        });
    }
}

impl Drop for UploadController {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

fn transition(
    state: &Mutex<UploadState>,
    event_tx: &broadcast::Sender<UploadEvent>,
    phase: UploadPhase,
) {
    state.lock().phase = phase;
    let _ = event_tx.send(UploadEvent::PhaseChanged { phase });
}

/// One armed timer per attempt: the next check is scheduled only after the
/// previous response was processed, so polls never overlap. Stops on a
/// terminal status, on the attempt budget, on a fetch error, or when the
/// owning controller is dropped.
async fn poll_loop(
    backend: Arc<dyn Backend>,
    config: PollConfig,
    state: Arc<Mutex<UploadState>>,
    event_tx: broadcast::Sender<UploadEvent>,
    cancel: CancellationToken,
    document_id: i64,
) {
    let mut attempts = 0u32;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = tokio::time::sleep(config.interval) => {}
        }

        let document = match backend.get_document(document_id).await {
            Ok(document) => document,
            Err(e) => {
                // Soft abort: stop polling and clear the busy phase without
                // a user-facing notice. The document keeps its last known
                // status server-side; the registry will pick it up later.
                tracing::warn!("status poll for document {} failed: {}", document_id, e);
                transition(&state, &event_tx, UploadPhase::Idle);
                return;
            }
        };

        match document.status {
            DocumentStatus::Completed => {
                transition(&state, &event_tx, UploadPhase::Done);
                let _ = event_tx.send(UploadEvent::Completed { document });
                return;
            }
            DocumentStatus::Failed => {
                transition(&state, &event_tx, UploadPhase::Error);
                let error = Error::Processing(
                    document
                        .error_message
                        .clone()
                        .unwrap_or_else(|| PROCESSING_FAILED_NOTICE.to_string()),
                );
                let _ = event_tx.send(UploadEvent::Failed {
                    message: error.to_string(),
                });
                return;
            }
            _ => {
                attempts += 1;
                state.lock().attempts = attempts;
                if attempts >= config.max_attempts {
                    transition(&state, &event_tx, UploadPhase::Error);
                    let error = Error::PollTimeout { attempts };
                    let _ = event_tx.send(UploadEvent::Failed {
                        message: error.to_string(),
                    });
                    return;
                }
            }
        }
    }
}
