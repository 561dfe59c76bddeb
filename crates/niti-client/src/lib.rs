//! niti-client: Conversation, upload, and document state management
//!
//! This crate keeps client-held state consistent with the backend: the
//! conversation store (optimistic sends, edit reconciliation, fail-closed
//! deletes), the upload controller (validate, upload, bounded status
//! polling), and the read-mostly document registry. All network access goes
//! through the `Backend` trait so state logic is testable without a server.

pub mod backend;
pub mod error;
pub mod registry;
pub mod store;
pub mod upload;

pub use backend::Backend;
pub use error::{Error, Result};
pub use registry::{Badge, BadgeTone, DocumentRegistry, status_badge};
pub use store::{ChatMessage, ConversationStore};
pub use upload::{MAX_UPLOAD_BYTES, PollConfig, UploadController, UploadEvent, UploadFile, UploadPhase};
