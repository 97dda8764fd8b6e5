//! Client for the external magazine REST API.
//!
//! Every view talks to the API through this client. It owns the base URL, the
//! optional bearer token and the mapping of non-success statuses onto `AppError`.

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::Config;
use crate::errors::AppError;
use crate::models::{
    CommentPage, Issue, IssueDraft, ListResponse, NewComment, PostOutcome, SubscribeReply,
    SubscribeRequest,
};

/// Thin typed wrapper over the external REST API.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    http: Client,
    base_url: String,
    token: Option<String>,
}

impl UpstreamClient {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
        Self::with_client(Client::new(), base_url, token)
    }

    fn with_client(http: Client, base_url: impl Into<String>, token: Option<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http,
            base_url,
            token,
        }
    }

    /// Build a client from configuration.
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.http_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self::with_client(
            http,
            config.api_base_url.clone(),
            config.api_token.clone(),
        ))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http.request(method, self.url(path));
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send a request, turning transport failures and non-success statuses into errors.
    async fn send(&self, builder: RequestBuilder) -> Result<Response, AppError> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = extract_message(&body).unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string()
        });
        tracing::warn!("Upstream answered {}: {}", status, message);

        Err(AppError::Upstream {
            status: status.as_u16(),
            message,
        })
    }

    async fn json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, AppError> {
        let response = self.send(builder).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Read a body that may legitimately be empty.
    async fn optional_json(&self, builder: RequestBuilder) -> Result<Value, AppError> {
        let response = self.send(builder).await?;
        let bytes = response.bytes().await?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    // ==================== ISSUES ====================

    /// GET /issues/ - list issues, tolerating either envelope.
    pub async fn list_issues(&self) -> Result<Vec<Issue>, AppError> {
        let list: ListResponse<Issue> = self.json(self.request(Method::GET, "/issues/")).await?;
        Ok(list.into_items())
    }

    /// DELETE /issues/{id}/
    pub async fn delete_issue(&self, id: i64) -> Result<(), AppError> {
        let path = format!("/issues/{}/", id);
        self.send(self.request(Method::DELETE, &path)).await?;
        Ok(())
    }

    /// POST /issues/
    pub async fn create_issue(&self, draft: &IssueDraft) -> Result<Issue, AppError> {
        self.json(self.request(Method::POST, "/issues/").json(draft))
            .await
    }

    /// PUT /issues/{id}/
    pub async fn update_issue(&self, id: i64, draft: &IssueDraft) -> Result<Issue, AppError> {
        let path = format!("/issues/{}/", id);
        self.json(self.request(Method::PUT, &path).json(draft)).await
    }

    // ==================== DISCUSSION ====================

    /// GET /api/discussion/comments?discussionId=&page=&pageSize=
    pub async fn list_comments(
        &self,
        discussion_id: &str,
        page: u32,
        page_size: u32,
    ) -> Result<CommentPage, AppError> {
        let builder = self
            .request(Method::GET, "/api/discussion/comments")
            .query(&[
                ("discussionId", discussion_id.to_string()),
                ("page", page.to_string()),
                ("pageSize", page_size.to_string()),
            ]);
        self.json(builder).await
    }

    /// POST /api/discussion/comments
    pub async fn post_comment(&self, comment: &NewComment) -> Result<PostOutcome, AppError> {
        let echo = self
            .optional_json(
                self.request(Method::POST, "/api/discussion/comments")
                    .json(comment),
            )
            .await?;
        Ok(PostOutcome::from_echo(&echo))
    }

    // ==================== TESTIMONIALS ====================

    /// GET /api/testimonials - the raw body; callers normalize its shape.
    pub async fn fetch_testimonials(&self) -> Result<Value, AppError> {
        self.json(self.request(Method::GET, "/api/testimonials"))
            .await
    }

    // ==================== SUBSCRIPTIONS ====================

    /// POST /subscribe/
    ///
    /// Failed requests still carry a reply body worth surfacing, so the status is
    /// returned alongside it instead of being folded into an error.
    pub async fn subscribe(&self, email: &str) -> Result<(StatusCode, SubscribeReply), AppError> {
        let request = SubscribeRequest {
            email: email.to_string(),
        };
        let response = self
            .request(Method::POST, "/subscribe/")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let bytes = response.bytes().await?;
        let reply = serde_json::from_slice(&bytes).unwrap_or_default();
        if !status.is_success() {
            tracing::warn!("Subscription rejected upstream with {}", status);
        }
        Ok((status, reply))
    }
}

/// Pull a human-readable message out of an error body.
fn extract_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["error", "message", "detail"]
        .iter()
        .filter_map(|key| value.get(*key))
        .find_map(|v| match v {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Object(inner) => inner
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string),
            _ => None,
        })
}
