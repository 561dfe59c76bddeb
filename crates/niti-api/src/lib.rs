//! niti-api: Typed HTTP client for the niti chat backend
//!
//! This crate covers the wire contract of the backend service: auth,
//! conversations, messages, and document upload/status endpoints. State
//! management on top of these calls lives in `niti-client`.

pub mod client;
pub mod error;
pub mod session;
pub mod types;

pub use client::ApiClient;
pub use error::{Error, Result};
pub use session::Session;
pub use types::*;
