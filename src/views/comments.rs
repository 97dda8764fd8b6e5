//! Discussion comment form and paginated comment list.

use std::sync::Arc;

use serde::Serialize;

use super::{LoadState, ViewScope};
use crate::errors::AppError;
use crate::models::{Comment, NewComment, PostOutcome};
use crate::upstream::UpstreamClient;

/// Longest comment body accepted, counted in characters.
pub const MAX_COMMENT_LENGTH: usize = 2000;

const POSTED_MESSAGE: &str = "Comment posted.";
const POST_FAILED_MESSAGE: &str = "Could not post comment. Please try again.";

/// Check a comment body, returning the trimmed text to send.
pub fn validate_body(body: &str) -> Result<String, AppError> {
    let body = body.trim();
    if body.is_empty() {
        return Err(AppError::Validation("Comment cannot be empty.".to_string()));
    }
    if body.chars().count() > MAX_COMMENT_LENGTH {
        return Err(AppError::Validation(format!(
            "Comment is too long (maximum {} characters).",
            MAX_COMMENT_LENGTH
        )));
    }
    Ok(body.to_string())
}

/// Total pages for a discussion; an empty discussion still has one page.
pub fn page_count(total: u64, page_size: u32) -> u32 {
    let page_size = u64::from(page_size.max(1));
    let pages = total.div_ceil(page_size).max(1);
    u32::try_from(pages).unwrap_or(u32::MAX)
}

/// Inline text shown under the comment form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "text", rename_all = "lowercase")]
pub enum Feedback {
    Success(String),
    Error(String),
}

/// Serializable snapshot of the comment form.
#[derive(Debug, Clone, Serialize)]
pub struct CommentFormView {
    pub author: String,
    pub body: String,
    pub state: LoadState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<Feedback>,
}

/// The "leave a comment" form.
pub struct CommentForm {
    client: Arc<UpstreamClient>,
    scope: ViewScope,
    discussion_id: String,
    author: String,
    body: String,
    state: LoadState,
    feedback: Option<Feedback>,
}

impl CommentForm {
    pub fn new(client: Arc<UpstreamClient>, discussion_id: impl Into<String>) -> Self {
        Self {
            client,
            scope: ViewScope::new(),
            discussion_id: discussion_id.into(),
            author: String::new(),
            body: String::new(),
            state: LoadState::Idle,
            feedback: None,
        }
    }

    /// Tie the form's requests to `parent`, so unmounting the parent cancels them.
    pub fn within(mut self, parent: &ViewScope) -> Self {
        self.scope = parent.child();
        self
    }

    pub fn set_author(&mut self, author: impl Into<String>) {
        self.author = author.into();
    }

    pub fn set_body(&mut self, body: impl Into<String>) {
        self.body = body.into();
    }

    pub fn snapshot(&self) -> CommentFormView {
        CommentFormView {
            author: self.author.clone(),
            body: self.body.clone(),
            state: self.state.clone(),
            feedback: self.feedback.clone(),
        }
    }

    /// Validate and post the comment.
    ///
    /// Validation failures are reported inline and never reach the network. A failed
    /// post carries the same text that is shown inline.
    pub async fn submit(&mut self) -> Result<PostOutcome, AppError> {
        let body = match validate_body(&self.body) {
            Ok(body) => body,
            Err(e) => {
                self.feedback = Some(Feedback::Error(e.message()));
                self.state = LoadState::Error(e.message());
                return Err(e);
            }
        };

        let author = Some(self.author.trim())
            .filter(|a| !a.is_empty())
            .map(str::to_string);
        let comment = NewComment {
            discussion_id: self.discussion_id.clone(),
            author,
            body,
        };

        self.state = LoadState::Loading;
        self.feedback = None;

        match self.scope.run(self.client.post_comment(&comment)).await {
            Ok(outcome) => {
                self.author.clear();
                self.body.clear();
                self.feedback = Some(Feedback::Success(POSTED_MESSAGE.to_string()));
                self.state = LoadState::Success;
                Ok(outcome)
            }
            Err(e @ AppError::Cancelled(_)) => Err(e),
            Err(e) => {
                tracing::warn!(
                    "Failed to post comment to discussion {}: {}",
                    self.discussion_id,
                    e
                );
                let text = e.server_message().unwrap_or(POST_FAILED_MESSAGE).to_string();
                self.feedback = Some(Feedback::Error(text.clone()));
                self.state = LoadState::Error(text.clone());
                Err(match e {
                    AppError::Upstream { status, .. } => AppError::Upstream {
                        status,
                        message: text,
                    },
                    _ => AppError::Network(text),
                })
            }
        }
    }
}

/// Serializable snapshot of one page of a discussion.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentsView {
    pub discussion_id: String,
    pub state: LoadState,
    pub page: u32,
    pub page_size: u32,
    pub page_count: u32,
    pub total: u64,
    pub has_prev: bool,
    pub has_next: bool,
    pub comments: Vec<Comment>,
}

/// Paginated list of comments in one discussion.
pub struct CommentsList {
    client: Arc<UpstreamClient>,
    scope: ViewScope,
    discussion_id: String,
    page: u32,
    page_size: u32,
    total: u64,
    comments: Vec<Comment>,
    state: LoadState,
}

impl CommentsList {
    pub fn new(client: Arc<UpstreamClient>, discussion_id: impl Into<String>, page_size: u32) -> Self {
        Self {
            client,
            scope: ViewScope::new(),
            discussion_id: discussion_id.into(),
            page: 1,
            page_size: page_size.max(1),
            total: 0,
            comments: Vec::new(),
            state: LoadState::Idle,
        }
    }

    /// Tie the list's requests to `parent`, so unmounting the parent cancels them.
    pub fn within(mut self, parent: &ViewScope) -> Self {
        self.scope = parent.child();
        self
    }

    pub fn page_count(&self) -> u32 {
        page_count(self.total, self.page_size)
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.page_count()
    }

    pub fn snapshot(&self) -> CommentsView {
        CommentsView {
            discussion_id: self.discussion_id.clone(),
            state: self.state.clone(),
            page: self.page,
            page_size: self.page_size,
            page_count: self.page_count(),
            total: self.total,
            has_prev: self.has_prev(),
            has_next: self.has_next(),
            comments: self.comments.clone(),
        }
    }

    /// Fetch the current page.
    pub async fn load(&mut self) -> Result<(), AppError> {
        self.state = LoadState::Loading;

        let request = self
            .client
            .list_comments(&self.discussion_id, self.page, self.page_size);
        match self.scope.run(request).await {
            Ok(page) => {
                self.comments = page.comments;
                self.total = page.total;
                self.state = LoadState::Success;
                Ok(())
            }
            Err(e @ AppError::Cancelled(_)) => Err(e),
            Err(e) => {
                tracing::warn!(
                    "Failed to load comments for discussion {}: {}",
                    self.discussion_id,
                    e
                );
                self.state = LoadState::Error(e.message());
                Err(e)
            }
        }
    }

    /// Jump to `page` (at least 1) and fetch it.
    pub async fn goto(&mut self, page: u32) -> Result<(), AppError> {
        self.page = page.max(1);
        self.load().await
    }

    /// Advance one page; returns `false` without fetching on the last page.
    pub async fn next(&mut self) -> Result<bool, AppError> {
        if !self.has_next() {
            return Ok(false);
        }
        self.page += 1;
        self.load().await?;
        Ok(true)
    }

    /// Go back one page; returns `false` without fetching on the first page.
    pub async fn prev(&mut self) -> Result<bool, AppError> {
        if !self.has_prev() {
            return Ok(false);
        }
        self.page -= 1;
        self.load().await?;
        Ok(true)
    }

    /// Fold a freshly posted comment into the list.
    ///
    /// An echoed record goes to the top without a fetch; otherwise the current
    /// page is reloaded once.
    pub async fn apply_posted(&mut self, outcome: PostOutcome) -> Result<(), AppError> {
        match outcome {
            PostOutcome::Created(mut comment) => {
                if comment.discussion_id.is_empty() {
                    comment.discussion_id = self.discussion_id.clone();
                }
                if !self.comments.iter().any(|c| c.id == comment.id) {
                    self.comments.insert(0, comment);
                    self.total += 1;
                }
                Ok(())
            }
            PostOutcome::CreatedUnknown => self.load().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offline_client() -> Arc<UpstreamClient> {
        Arc::new(UpstreamClient::new("http://127.0.0.1:9", None))
    }

    fn comment(id: &str) -> Comment {
        Comment {
            id: id.to_string(),
            discussion_id: "issue-1".to_string(),
            author: None,
            body: format!("body {}", id),
            approved: true,
            created_at: None,
            moderator_id: None,
            avatar_url: None,
        }
    }

    #[test]
    fn test_validate_body_bounds() {
        assert!(validate_body("   ").is_err());
        assert!(validate_body(&"a".repeat(MAX_COMMENT_LENGTH)).is_ok());
        assert_eq!(
            validate_body(&"a".repeat(MAX_COMMENT_LENGTH + 1)),
            Err(AppError::Validation(
                "Comment is too long (maximum 2000 characters).".to_string()
            ))
        );
    }

    #[test]
    fn test_validate_body_counts_characters_not_bytes() {
        let accented = "é".repeat(MAX_COMMENT_LENGTH);
        assert_eq!(validate_body(&accented), Ok(accented.clone()));
    }

    #[test]
    fn test_page_count() {
        assert_eq!(page_count(0, 10), 1);
        assert_eq!(page_count(10, 10), 1);
        assert_eq!(page_count(11, 10), 2);
        assert_eq!(page_count(95, 10), 10);
        assert_eq!(page_count(3, 0), 3);
    }

    #[tokio::test]
    async fn test_paging_stops_at_edges_without_fetching() {
        let mut list = CommentsList::new(offline_client(), "issue-1", 10);
        list.total = 5;

        assert_eq!(list.prev().await, Ok(false));
        assert_eq!(list.next().await, Ok(false));
        assert_eq!(list.page, 1);
        assert_eq!(list.state, LoadState::Idle);
    }

    #[tokio::test]
    async fn test_created_comment_is_prepended_once() {
        let mut list = CommentsList::new(offline_client(), "issue-1", 10);
        list.comments = vec![comment("c1")];
        list.total = 1;

        let mut echoed = comment("c9");
        echoed.discussion_id.clear();
        list.apply_posted(PostOutcome::Created(echoed.clone()))
            .await
            .unwrap();
        list.apply_posted(PostOutcome::Created(echoed)).await.unwrap();

        assert_eq!(list.comments.len(), 2);
        assert_eq!(list.comments[0].id, "c9");
        assert_eq!(list.comments[0].discussion_id, "issue-1");
        assert_eq!(list.total, 2);
    }

    #[tokio::test]
    async fn test_empty_body_reports_inline() {
        let mut form = CommentForm::new(offline_client(), "issue-1");
        form.set_body("  ");

        let result = form.submit().await;
        assert!(matches!(result, Err(AppError::Validation(_))));
        assert_eq!(
            form.snapshot().feedback,
            Some(Feedback::Error("Comment cannot be empty.".to_string()))
        );
    }

    #[tokio::test]
    async fn test_network_failure_reports_inline_text() {
        let mut form = CommentForm::new(offline_client(), "issue-1");
        form.set_author("Ana");
        form.set_body("Lovely issue");

        let result = form.submit().await;

        assert_eq!(result, Err(AppError::Network(POST_FAILED_MESSAGE.to_string())));
        let view = form.snapshot();
        assert_eq!(
            view.feedback,
            Some(Feedback::Error(POST_FAILED_MESSAGE.to_string()))
        );
        assert_eq!(view.body, "Lovely issue");
        assert_eq!(view.author, "Ana");
    }
}
