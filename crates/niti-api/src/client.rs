//! HTTP client for the niti backend

use reqwest::multipart;
use serde_json::json;

use crate::{
    error::{Error, Result},
    session::Session,
    types::{
        AuthResponse, ConversationDetail, ConversationSummary, Credentials, Document, Signup, Turn,
    },
};

/// Client for the backend REST API.
///
/// Attaches the session's bearer token to every request and funnels all
/// responses through one status check: a 401 invalidates the session
/// (exactly once), any other non-success status becomes `Error::Api` with
/// the response body as message.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: Session,
}

impl ApiClient {
    /// Create a client against a base URL, e.g. `http://localhost:8000/api`
    pub fn new(base_url: impl Into<String>, session: Session) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            base_url,
            session,
        }
    }

    /// The session this client authenticates with
    pub fn session(&self) -> &Session {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send a request with auth attached and centralized status handling
    async fn execute(&self, builder: reqwest::RequestBuilder) -> Result<reqwest::Response> {
        let builder = match self.session.token() {
            Some(token) => builder.header("Authorization", format!("Bearer {}", token)),
            None => builder,
        };

        let response = builder.send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            self.session.invalidate();
            return Err(Error::Unauthorized);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!(status = status.as_u16(), body = %body, "API request failed");
            return Err(Error::api(status.as_u16(), body));
        }

        Ok(response)
    }

    // ---- Auth ----

    /// Register a new account; stores the returned token in the session
    pub async fn signup(&self, signup: &Signup) -> Result<AuthResponse> {
        let response = self
            .execute(self.http.post(self.url("/auth/signup/")).json(signup))
            .await?;
        let auth: AuthResponse = response.json().await?;
        self.session.set_token(&auth.token);
        Ok(auth)
    }

    /// Log in; stores the returned token in the session
    pub async fn login(&self, credentials: &Credentials) -> Result<AuthResponse> {
        let response = self
            .execute(self.http.post(self.url("/auth/login/")).json(credentials))
            .await?;
        let auth: AuthResponse = response.json().await?;
        self.session.set_token(&auth.token);
        Ok(auth)
    }

    /// Log out. The local token is cleared even if the server call fails;
    /// either the server token is gone or the server is unreachable, and in
    /// both cases the client must re-authenticate.
    pub async fn logout(&self) -> Result<()> {
        let result = self.execute(self.http.post(self.url("/auth/logout/"))).await;
        self.session.clear();
        result.map(|_| ())
    }

    // ---- Conversations ----

    /// List the user's conversations, most recently updated first
    pub async fn list_conversations(&self) -> Result<Vec<ConversationSummary>> {
        let response = self
            .execute(self.http.get(self.url("/conversations/")))
            .await?;
        Ok(response.json().await?)
    }

    /// Create a conversation with the given title
    pub async fn create_conversation(&self, title: &str) -> Result<ConversationDetail> {
        let response = self
            .execute(
                self.http
                    .post(self.url("/conversations/"))
                    .json(&json!({ "title": title })),
            )
            .await?;
        Ok(response.json().await?)
    }

    /// Fetch a conversation with its full message history
    pub async fn get_conversation(&self, id: i64) -> Result<ConversationDetail> {
        let response = self
            .execute(self.http.get(self.url(&format!("/conversations/{}/", id))))
            .await?;
        Ok(response.json().await?)
    }

    /// Update a conversation's title
    pub async fn update_conversation(&self, id: i64, title: &str) -> Result<ConversationDetail> {
        let response = self
            .execute(
                self.http
                    .put(self.url(&format!("/conversations/{}/", id)))
                    .json(&json!({ "title": title })),
            )
            .await?;
        Ok(response.json().await?)
    }

    /// Delete a conversation and all its messages
    pub async fn delete_conversation(&self, id: i64) -> Result<()> {
        self.execute(
            self.http
                .delete(self.url(&format!("/conversations/{}/", id))),
        )
        .await?;
        Ok(())
    }

    // ---- Messages ----

    /// Post a user message; the server answers with the stored user message
    /// and the generated assistant message
    pub async fn add_message(
        &self,
        conversation_id: i64,
        content: &str,
        use_rag: bool,
    ) -> Result<Turn> {
        let response = self
            .execute(
                self.http
                    .post(self.url(&format!("/conversations/{}/add_message/", conversation_id)))
                    .json(&json!({ "content": content, "use_rag": use_rag })),
            )
            .await?;
        Ok(response.json().await?)
    }

    /// Edit a user message; the server regenerates the assistant answer and
    /// returns the fresh pair
    pub async fn update_message(&self, message_id: i64, content: &str) -> Result<Turn> {
        let response = self
            .execute(
                self.http
                    .put(self.url(&format!("/messages/{}/", message_id)))
                    .json(&json!({ "content": content })),
            )
            .await?;
        Ok(response.json().await?)
    }

    /// Delete a single message
    pub async fn delete_message(&self, message_id: i64) -> Result<()> {
        self.execute(self.http.delete(self.url(&format!("/messages/{}/", message_id))))
            .await?;
        Ok(())
    }

    // ---- Documents ----

    /// List the user's uploaded documents, newest first
    pub async fn list_documents(&self) -> Result<Vec<Document>> {
        let response = self.execute(self.http.get(self.url("/documents/"))).await?;
        Ok(response.json().await?)
    }

    /// Upload a PDF; the returned document starts in `pending` status
    pub async fn upload_document(
        &self,
        filename: &str,
        bytes: Vec<u8>,
        conversation_id: Option<i64>,
    ) -> Result<Document> {
        let part = multipart::Part::bytes(bytes)
            .file_name(filename.to_string())
            .mime_str("application/pdf")?;
        let mut form = multipart::Form::new().part("file", part);
        if let Some(id) = conversation_id {
            form = form.text("conversation_id", id.to_string());
        }

        let response = self
            .execute(self.http.post(self.url("/documents/")).multipart(form))
            .await?;
        Ok(response.json().await?)
    }

    /// Fetch a document's current status and metadata
    pub async fn get_document(&self, id: i64) -> Result<Document> {
        let response = self
            .execute(self.http.get(self.url(&format!("/documents/{}/", id))))
            .await?;
        Ok(response.json().await?)
    }

    /// Delete a document
    pub async fn delete_document(&self, id: i64) -> Result<()> {
        self.execute(self.http.delete(self.url(&format!("/documents/{}/", id))))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_path() {
        let client = ApiClient::new("http://localhost:8000/api", Session::new());
        assert_eq!(
            client.url("/conversations/3/"),
            "http://localhost:8000/api/conversations/3/"
        );
    }

    #[test]
    fn test_url_strips_trailing_slash_from_base() {
        let client = ApiClient::new("http://localhost:8000/api/", Session::new());
        assert_eq!(client.url("/documents/"), "http://localhost:8000/api/documents/");
    }

    #[tokio::test]
    async fn test_logout_clears_token_when_server_unreachable() {
        // Port 9 (discard) refuses connections, so the request itself fails
        let session = Session::with_token("tok");
        let client = ApiClient::new("http://127.0.0.1:9/api", session.clone());

        let result = client.logout().await;

        assert!(result.is_err());
        assert!(!session.is_authenticated());
        assert!(session.token().is_none());
    }
}
