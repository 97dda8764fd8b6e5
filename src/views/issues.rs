//! Admin issue list and issue editor.

use std::sync::Arc;

use serde::Serialize;

use super::{LoadState, ViewScope};
use crate::errors::AppError;
use crate::models::{Issue, IssueDraft};
use crate::upstream::UpstreamClient;

/// Placeholder cards rendered while the list is loading.
pub const SKELETON_ROWS: usize = 6;

/// Longest title the editor accepts.
pub const MAX_TITLE_LENGTH: usize = 200;

/// An issue as shown in the admin list.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct IssueRow {
    #[serde(flatten)]
    pub issue: Issue,
    /// Set while a delete request for this row is in flight
    pub deleting: bool,
}

/// Result of a delete attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum DeleteOutcome {
    Deleted,
    /// The operator declined the confirmation; nothing was sent.
    Declined,
    /// A delete for this row is already in flight; nothing was sent.
    AlreadyDeleting,
    NotFound,
    Failed(AppError),
}

/// A confirmed delete whose request has not been sent yet.
pub struct PendingDelete {
    client: Arc<UpstreamClient>,
    scope: ViewScope,
    id: i64,
}

impl PendingDelete {
    /// Issue the single `DELETE /issues/{id}/`.
    pub async fn send(self) -> DeleteSent {
        let result = self.scope.run(self.client.delete_issue(self.id)).await;
        DeleteSent {
            id: self.id,
            result,
        }
    }
}

/// Upstream answer for a [`PendingDelete`].
pub struct DeleteSent {
    id: i64,
    result: Result<(), AppError>,
}

/// Serializable snapshot of the issue list.
#[derive(Debug, Clone, Serialize)]
pub struct IssueListView {
    pub state: LoadState,
    pub skeletons: usize,
    pub issues: Vec<IssueRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert: Option<String>,
}

/// The admin issue list.
pub struct IssueList {
    client: Arc<UpstreamClient>,
    scope: ViewScope,
    state: LoadState,
    rows: Vec<IssueRow>,
    alert: Option<String>,
}

impl IssueList {
    pub fn new(client: Arc<UpstreamClient>) -> Self {
        Self {
            client,
            scope: ViewScope::new(),
            state: LoadState::Idle,
            rows: Vec::new(),
            alert: None,
        }
    }

    /// Tie the list's requests to `parent`, so unmounting the parent cancels them.
    pub fn within(mut self, parent: &ViewScope) -> Self {
        self.scope = parent.child();
        self
    }

    /// Number of skeleton placeholders to render right now.
    pub fn skeletons(&self) -> usize {
        if self.state.is_loading() {
            SKELETON_ROWS
        } else {
            0
        }
    }

    pub fn snapshot(&self) -> IssueListView {
        IssueListView {
            state: self.state.clone(),
            skeletons: self.skeletons(),
            issues: self.rows.clone(),
            alert: self.alert.clone(),
        }
    }

    /// Fetch every issue, replacing the current rows.
    pub async fn load(&mut self) -> Result<(), AppError> {
        self.state = LoadState::Loading;

        match self.scope.run(self.client.list_issues()).await {
            Ok(issues) => {
                tracing::debug!("Loaded {} issues", issues.len());
                self.rows = issues
                    .into_iter()
                    .map(|issue| IssueRow {
                        issue,
                        deleting: false,
                    })
                    .collect();
                self.state = LoadState::Success;
                Ok(())
            }
            Err(e @ AppError::Cancelled(_)) => Err(e),
            Err(e) => {
                tracing::warn!("Failed to load issues: {}", e);
                self.state = LoadState::Error(e.message());
                Err(e)
            }
        }
    }

    /// Delete an issue after the operator confirms.
    ///
    /// `confirm` receives the prompt text and blocks until the operator answers.
    pub async fn delete<F>(&mut self, id: i64, confirm: F) -> DeleteOutcome
    where
        F: FnOnce(&str) -> bool,
    {
        match self.begin_delete(id, confirm) {
            Ok(pending) => {
                let sent = pending.send().await;
                self.complete_delete(sent)
            }
            Err(outcome) => outcome,
        }
    }

    /// Confirm and mark the row as deleting without sending anything yet.
    ///
    /// Returns the final outcome instead when nothing will be sent.
    pub fn begin_delete<F>(&mut self, id: i64, confirm: F) -> Result<PendingDelete, DeleteOutcome>
    where
        F: FnOnce(&str) -> bool,
    {
        let Some(row) = self.rows.iter_mut().find(|r| r.issue.id == id) else {
            return Err(DeleteOutcome::NotFound);
        };
        if row.deleting {
            return Err(DeleteOutcome::AlreadyDeleting);
        }

        let prompt = format!("Delete \"{}\"? This cannot be undone.", row.issue.title);
        if !confirm(&prompt) {
            return Err(DeleteOutcome::Declined);
        }
        row.deleting = true;

        Ok(PendingDelete {
            client: self.client.clone(),
            scope: self.scope.clone(),
            id,
        })
    }

    /// Apply the answer to a delete started with [`IssueList::begin_delete`].
    pub fn complete_delete(&mut self, sent: DeleteSent) -> DeleteOutcome {
        let DeleteSent { id, result } = sent;
        match result {
            Ok(()) => {
                tracing::info!("Deleted issue {}", id);
                self.rows.retain(|r| r.issue.id != id);
                DeleteOutcome::Deleted
            }
            Err(e) => {
                if let Some(row) = self.rows.iter_mut().find(|r| r.issue.id == id) {
                    row.deleting = false;
                }
                if !matches!(e, AppError::Cancelled(_)) {
                    tracing::warn!("Failed to delete issue {}: {}", id, e);
                    self.alert = Some(format!("Failed to delete issue: {}", e.message()));
                }
                DeleteOutcome::Failed(e)
            }
        }
    }

    /// Reflect a saved issue in the list without refetching.
    pub fn upsert(&mut self, issue: Issue) {
        match self.rows.iter_mut().find(|r| r.issue.id == issue.id) {
            Some(row) => row.issue = issue,
            None => self.rows.insert(
                0,
                IssueRow {
                    issue,
                    deleting: false,
                },
            ),
        }
    }
}

/// Serializable snapshot of the issue editor.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorView {
    pub state: LoadState,
    pub is_new: bool,
    pub draft: IssueDraft,
}

/// Create or edit a single issue.
pub struct IssueEditor {
    client: Arc<UpstreamClient>,
    scope: ViewScope,
    issue_id: Option<i64>,
    draft: IssueDraft,
    state: LoadState,
}

impl IssueEditor {
    /// Editor for a brand new issue.
    pub fn create(client: Arc<UpstreamClient>, draft: IssueDraft) -> Self {
        Self {
            client,
            scope: ViewScope::new(),
            issue_id: None,
            draft,
            state: LoadState::Idle,
        }
    }

    /// Editor for an existing issue.
    pub fn edit(client: Arc<UpstreamClient>, issue_id: i64, draft: IssueDraft) -> Self {
        Self {
            issue_id: Some(issue_id),
            ..Self::create(client, draft)
        }
    }

    /// Tie the editor's requests to `parent`, so unmounting the parent cancels them.
    pub fn within(mut self, parent: &ViewScope) -> Self {
        self.scope = parent.child();
        self
    }

    pub fn snapshot(&self) -> EditorView {
        EditorView {
            state: self.state.clone(),
            is_new: self.issue_id.is_none(),
            draft: self.draft.clone(),
        }
    }

    /// Check the draft and fill in the derived slug.
    pub fn validate(&self) -> Result<IssueDraft, AppError> {
        let mut draft = self.draft.clone();

        draft.title = draft.title.trim().to_string();
        if draft.title.is_empty() {
            return Err(AppError::Validation("Title is required.".to_string()));
        }
        if draft.title.chars().count() > MAX_TITLE_LENGTH {
            return Err(AppError::Validation(format!(
                "Title is too long (maximum {} characters).",
                MAX_TITLE_LENGTH
            )));
        }

        let source = match draft.slug.as_deref().map(str::trim) {
            Some(s) if !s.is_empty() => s.to_string(),
            _ => draft.title.clone(),
        };
        let slug = slug::slugify(&source);
        if slug.is_empty() {
            return Err(AppError::Validation(
                "Slug must contain at least one letter or digit.".to_string(),
            ));
        }
        draft.slug = Some(slug);

        for url in [&draft.cover_image, &draft.cover_thumbnail]
            .into_iter()
            .flatten()
        {
            if !(url.starts_with("https://") || url.starts_with("http://")) {
                return Err(AppError::Validation(format!(
                    "Cover URL must be absolute: {}",
                    url
                )));
            }
        }

        draft.summary = draft.summary.trim().to_string();
        Ok(draft)
    }

    /// Validate and persist the draft, returning the stored issue.
    pub async fn save(&mut self) -> Result<Issue, AppError> {
        let draft = match self.validate() {
            Ok(draft) => draft,
            Err(e) => {
                self.state = LoadState::Error(e.message());
                return Err(e);
            }
        };

        self.state = LoadState::Loading;
        let saved = match self.issue_id {
            Some(id) => self.scope.run(self.client.update_issue(id, &draft)).await,
            None => self.scope.run(self.client.create_issue(&draft)).await,
        };

        match saved {
            Ok(issue) => {
                tracing::info!("Saved issue {} ({})", issue.id, issue.slug);
                self.issue_id = Some(issue.id);
                self.draft = IssueDraft::from(&issue);
                self.state = LoadState::Success;
                Ok(issue)
            }
            Err(e @ AppError::Cancelled(_)) => Err(e),
            Err(e) => {
                tracing::warn!("Failed to save issue: {}", e);
                self.state = LoadState::Error(e.message());
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offline_client() -> Arc<UpstreamClient> {
        Arc::new(UpstreamClient::new("http://127.0.0.1:9", None))
    }

    fn issue(id: i64, title: &str) -> Issue {
        Issue {
            id,
            title: title.to_string(),
            slug: slug::slugify(title),
            summary: String::new(),
            cover_image: None,
            cover_thumbnail: None,
            published: false,
            published_at: None,
        }
    }

    #[test]
    fn test_skeletons_only_while_loading() {
        let mut list = IssueList::new(offline_client());
        assert_eq!(list.skeletons(), 0);

        list.state = LoadState::Loading;
        assert_eq!(list.skeletons(), SKELETON_ROWS);
    }

    #[tokio::test]
    async fn test_declined_delete_keeps_row() {
        let mut list = IssueList::new(offline_client());
        list.upsert(issue(1, "Spring"));

        let mut prompt_seen = String::new();
        let outcome = list
            .delete(1, |prompt| {
                prompt_seen = prompt.to_string();
                false
            })
            .await;

        assert_eq!(outcome, DeleteOutcome::Declined);
        assert_eq!(prompt_seen, "Delete \"Spring\"? This cannot be undone.");
        assert_eq!(list.rows.len(), 1);
        assert!(!list.rows[0].deleting);
    }

    #[tokio::test]
    async fn test_delete_in_flight_row_is_ignored() {
        let mut list = IssueList::new(offline_client());
        list.upsert(issue(1, "Spring"));
        list.rows[0].deleting = true;

        let outcome = list.delete(1, |_| panic!("must not prompt twice")).await;
        assert_eq!(outcome, DeleteOutcome::AlreadyDeleting);
    }

    #[tokio::test]
    async fn test_row_is_deleting_until_answer_applied() {
        let mut list = IssueList::new(offline_client());
        list.upsert(issue(1, "Spring"));

        let pending = list.begin_delete(1, |_| true).unwrap();
        assert!(list.rows[0].deleting);
        assert!(matches!(
            list.begin_delete(1, |_| true),
            Err(DeleteOutcome::AlreadyDeleting)
        ));

        let sent = pending.send().await;
        let outcome = list.complete_delete(sent);

        assert!(matches!(outcome, DeleteOutcome::Failed(AppError::Network(_))));
        assert!(!list.rows[0].deleting);
        assert!(list.alert.as_deref().unwrap().starts_with("Failed to delete issue: "));
    }

    #[tokio::test]
    async fn test_cancelled_save_leaves_state_alone() {
        let root = ViewScope::new();
        root.unmount();
        let mut editor = IssueEditor::create(
            offline_client(),
            IssueDraft {
                title: "Spring".to_string(),
                ..Default::default()
            },
        )
        .within(&root);

        let result = editor.save().await;

        assert!(matches!(result, Err(AppError::Cancelled(_))));
        assert_eq!(editor.snapshot().state, LoadState::Loading);
    }

    #[tokio::test]
    async fn test_delete_unknown_row() {
        let mut list = IssueList::new(offline_client());
        assert_eq!(list.delete(5, |_| true).await, DeleteOutcome::NotFound);
    }

    #[test]
    fn test_upsert_replaces_or_prepends() {
        let mut list = IssueList::new(offline_client());
        list.upsert(issue(1, "Spring"));
        list.upsert(issue(2, "Summer"));
        list.upsert(issue(1, "Spring Revised"));

        let titles: Vec<_> = list.rows.iter().map(|r| r.issue.title.as_str()).collect();
        assert_eq!(titles, vec!["Summer", "Spring Revised"]);
    }

    #[test]
    fn test_editor_derives_slug_from_title() {
        let editor = IssueEditor::create(
            offline_client(),
            IssueDraft {
                title: "  The Winter Issue: Cold Light  ".to_string(),
                ..Default::default()
            },
        );

        let draft = editor.validate().unwrap();
        assert_eq!(draft.title, "The Winter Issue: Cold Light");
        assert_eq!(draft.slug.as_deref(), Some("the-winter-issue-cold-light"));
    }

    #[test]
    fn test_editor_normalizes_explicit_slug() {
        let editor = IssueEditor::edit(
            offline_client(),
            4,
            IssueDraft {
                title: "Autumn".to_string(),
                slug: Some("Autumn 2024".to_string()),
                ..Default::default()
            },
        );

        assert!(!editor.snapshot().is_new);
        assert_eq!(
            editor.validate().unwrap().slug.as_deref(),
            Some("autumn-2024")
        );
    }

    #[test]
    fn test_editor_rejects_bad_drafts() {
        let blank = IssueEditor::create(offline_client(), IssueDraft::default());
        assert_eq!(
            blank.validate(),
            Err(AppError::Validation("Title is required.".to_string()))
        );

        let relative_cover = IssueEditor::create(
            offline_client(),
            IssueDraft {
                title: "Spring".to_string(),
                cover_image: Some("/covers/spring.jpg".to_string()),
                ..Default::default()
            },
        );
        assert!(matches!(
            relative_cover.validate(),
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_invalid_draft_never_reaches_network() {
        let mut editor = IssueEditor::create(offline_client(), IssueDraft::default());
        let result = editor.save().await;

        assert!(matches!(result, Err(AppError::Validation(_))));
        assert_eq!(
            editor.snapshot().state,
            LoadState::Error("Title is required.".to_string())
        );
    }
}
