//! Admin issue endpoints.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use super::{success, ApiResult};
use crate::errors::AppError;
use crate::models::{Issue, IssueDraft};
use crate::views::{DeleteOutcome, EditorView, IssueEditor, IssueList, IssueListView};
use crate::AppState;

/// Query parameters for deletes; `confirm=true` is the operator's answer to the dialog.
#[derive(Debug, Deserialize)]
pub struct DeleteQuery {
    #[serde(default)]
    pub confirm: bool,
}

#[derive(Debug, Serialize)]
pub struct DeletedIssue {
    pub deleted: i64,
}

/// A saved issue with the editor and the list it was folded into.
#[derive(Debug, Serialize)]
pub struct SavedIssue {
    pub issue: Issue,
    pub editor: EditorView,
    pub list: IssueListView,
}

/// GET /admin/issues - The issue list.
pub async fn list_issues(State(state): State<AppState>) -> ApiResult<IssueListView> {
    let mut list = IssueList::new(state.upstream.clone()).within(&state.views);
    list.load().await?;
    success(list.snapshot())
}

/// DELETE /admin/issues/:id - Delete an issue once confirmed.
pub async fn delete_issue(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<DeleteQuery>,
) -> ApiResult<DeletedIssue> {
    let mut list = IssueList::new(state.upstream.clone()).within(&state.views);
    list.load().await?;

    match list.delete(id, |_| query.confirm).await {
        DeleteOutcome::Deleted => success(DeletedIssue { deleted: id }),
        DeleteOutcome::Declined => Err(AppError::BadRequest(
            "Deletion was not confirmed".to_string(),
        )),
        DeleteOutcome::AlreadyDeleting => Err(AppError::BadRequest(format!(
            "Issue {} is already being deleted",
            id
        ))),
        DeleteOutcome::NotFound => Err(AppError::NotFound(format!("Issue {} not found", id))),
        DeleteOutcome::Failed(e) => Err(e),
    }
}

/// POST /admin/issues - Create an issue.
pub async fn create_issue(
    State(state): State<AppState>,
    Json(draft): Json<IssueDraft>,
) -> ApiResult<SavedIssue> {
    let editor = IssueEditor::create(state.upstream.clone(), draft).within(&state.views);
    save(&state, editor).await
}

/// PUT /admin/issues/:id - Replace an issue.
pub async fn update_issue(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(draft): Json<IssueDraft>,
) -> ApiResult<SavedIssue> {
    let editor = IssueEditor::edit(state.upstream.clone(), id, draft).within(&state.views);
    save(&state, editor).await
}

/// Save through the editor, then reflect the result in a fresh list.
///
/// The list may not show the new record yet, so the saved issue is upserted
/// rather than trusted to the refetch.
async fn save(state: &AppState, mut editor: IssueEditor) -> ApiResult<SavedIssue> {
    let issue = editor.save().await?;

    let mut list = IssueList::new(state.upstream.clone()).within(&state.views);
    if let Err(e) = list.load().await {
        tracing::warn!("Saved issue {} but could not reload the list: {}", issue.id, e);
    }
    list.upsert(issue.clone());

    success(SavedIssue {
        issue,
        editor: editor.snapshot(),
        list: list.snapshot(),
    })
}
