//! Discussion endpoints.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use super::{success, ApiResult};
use crate::models::{Comment, PostOutcome};
use crate::views::{CommentForm, CommentFormView, CommentsList, CommentsView, Feedback};
use crate::AppState;

/// Page selection for the comments list.
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default = "first_page")]
    pub page: u32,
    /// Move one page from `page`; a no-op at either edge
    #[serde(default)]
    pub step: Option<PageStep>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageStep {
    Next,
    Prev,
}

fn first_page() -> u32 {
    1
}

/// Request body for posting a comment.
#[derive(Debug, Deserialize)]
pub struct PostCommentRequest {
    #[serde(default)]
    pub author: Option<String>,
    pub body: String,
}

/// Result of posting a comment.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostedComment {
    pub message: String,
    pub form: CommentFormView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<Comment>,
    /// True when the server did not echo the record and the page was refetched
    pub refetched: bool,
    /// First page with the new comment folded in; absent if it could not be loaded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<CommentsView>,
}

/// GET /discussions/:id/comments - One page of a discussion.
pub async fn list_comments(
    State(state): State<AppState>,
    Path(discussion_id): Path<String>,
    Query(query): Query<PageQuery>,
) -> ApiResult<CommentsView> {
    let mut list = CommentsList::new(
        state.upstream.clone(),
        discussion_id,
        state.config.comments_page_size,
    )
    .within(&state.views);

    list.goto(query.page).await?;
    match query.step {
        Some(PageStep::Next) => {
            list.next().await?;
        }
        Some(PageStep::Prev) => {
            list.prev().await?;
        }
        None => {}
    }
    success(list.snapshot())
}

/// POST /discussions/:id/comments - Post a comment and return the updated first page.
pub async fn post_comment(
    State(state): State<AppState>,
    Path(discussion_id): Path<String>,
    Json(request): Json<PostCommentRequest>,
) -> ApiResult<PostedComment> {
    let mut form = CommentForm::new(state.upstream.clone(), discussion_id.clone())
        .within(&state.views);
    form.set_author(request.author.unwrap_or_default());
    form.set_body(request.body);

    let outcome = form.submit().await?;
    let form = form.snapshot();
    let message = match &form.feedback {
        Some(Feedback::Success(text)) | Some(Feedback::Error(text)) => text.clone(),
        None => String::new(),
    };

    let mut list = CommentsList::new(
        state.upstream.clone(),
        discussion_id,
        state.config.comments_page_size,
    )
    .within(&state.views);

    let (comment, refetched) = match &outcome {
        PostOutcome::Created(comment) => (Some(comment.clone()), false),
        PostOutcome::CreatedUnknown => (None, true),
    };
    let merged = match outcome {
        PostOutcome::Created(_) => match list.load().await {
            Ok(()) => list.apply_posted(outcome).await,
            Err(e) => Err(e),
        },
        PostOutcome::CreatedUnknown => list.apply_posted(outcome).await,
    };
    let page = match merged {
        Ok(()) => Some(list.snapshot()),
        Err(e) => {
            tracing::warn!("Comment posted but the discussion could not be reloaded: {}", e);
            None
        }
    };

    success(PostedComment {
        message,
        form,
        comment,
        refetched,
        page,
    })
}
