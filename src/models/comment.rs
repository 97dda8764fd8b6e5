//! Discussion comment models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{lenient_datetime, optional_string_or_number, string_or_number};

/// A single comment in a discussion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub discussion_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub approved: bool,
    #[serde(
        default,
        deserialize_with = "lenient_datetime",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(
        default,
        deserialize_with = "optional_string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub moderator_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

/// Request body for posting a comment.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewComment {
    pub discussion_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    pub body: String,
}

/// One page of a discussion, however the server chose to wrap it.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(from = "CommentPageWire")]
pub struct CommentPage {
    pub comments: Vec<Comment>,
    pub total: u64,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CommentPageWire {
    Bare(Vec<Comment>),
    Enveloped {
        #[serde(alias = "results", alias = "items")]
        comments: Vec<Comment>,
        #[serde(default, alias = "count")]
        total: Option<u64>,
    },
}

impl From<CommentPageWire> for CommentPage {
    fn from(wire: CommentPageWire) -> Self {
        match wire {
            CommentPageWire::Bare(comments) => Self {
                total: comments.len() as u64,
                comments,
            },
            CommentPageWire::Enveloped { comments, total } => Self {
                total: total.unwrap_or(comments.len() as u64),
                comments,
            },
        }
    }
}

/// What the server told us after a successful post.
#[derive(Debug, Clone, PartialEq)]
pub enum PostOutcome {
    /// The server echoed the stored record; it can be merged locally.
    Created(Comment),
    /// The post succeeded but the record was not echoed; the list must be refetched.
    CreatedUnknown,
}

impl PostOutcome {
    /// Classify a post response body.
    ///
    /// The record may arrive bare or nested under `comment` / `data`. Only an
    /// object with a non-empty `id` counts as an echo.
    pub fn from_echo(echo: &Value) -> Self {
        let record = ["comment", "data"]
            .iter()
            .filter_map(|key| echo.get(*key))
            .find(|v| v.is_object())
            .unwrap_or(echo);

        let has_id = match record.get("id") {
            Some(Value::String(id)) => !id.is_empty(),
            Some(Value::Number(_)) => true,
            _ => false,
        };

        if has_id {
            if let Ok(comment) = serde_json::from_value::<Comment>(record.clone()) {
                return PostOutcome::Created(comment);
            }
        }

        PostOutcome::CreatedUnknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_numeric_ids_become_strings() {
        let comment: Comment =
            serde_json::from_value(json!({"id": 42, "discussionId": 7, "body": "hello"})).unwrap();

        assert_eq!(comment.id, "42");
        assert_eq!(comment.discussion_id, "7");
        assert!(!comment.approved);
    }

    #[test]
    fn test_page_total_defaults_to_length() {
        let bare: CommentPage = serde_json::from_value(json!([{"id": "a"}, {"id": "b"}])).unwrap();
        assert_eq!(bare.total, 2);

        let wrapped: CommentPage =
            serde_json::from_value(json!({"results": [{"id": "a"}], "count": 31})).unwrap();
        assert_eq!(wrapped.comments.len(), 1);
        assert_eq!(wrapped.total, 31);
    }

    #[test]
    fn test_numeric_moderator_id_decodes() {
        let page: CommentPage = serde_json::from_value(json!({
            "results": [{"id": 1, "body": "x", "approved": true, "moderatorId": 7}],
            "total": 1
        }))
        .unwrap();

        assert_eq!(page.total, 1);
        assert_eq!(page.comments[0].moderator_id.as_deref(), Some("7"));

        let unmoderated: Comment =
            serde_json::from_value(json!({"id": 2, "moderatorId": null})).unwrap();
        assert_eq!(unmoderated.moderator_id, None);
    }

    #[test]
    fn test_echo_with_id_is_created() {
        let outcome = PostOutcome::from_echo(&json!({"id": "c9", "body": "hi"}));
        match outcome {
            PostOutcome::Created(c) => {
                assert_eq!(c.id, "c9");
                assert_eq!(c.body, "hi");
            }
            PostOutcome::CreatedUnknown => panic!("expected an echoed record"),
        }
    }

    #[test]
    fn test_nested_echo_is_created() {
        let outcome = PostOutcome::from_echo(&json!({"ok": true, "comment": {"id": 3}}));
        assert!(matches!(outcome, PostOutcome::Created(ref c) if c.id == "3"));
    }

    #[test]
    fn test_echo_without_id_is_unknown() {
        assert_eq!(
            PostOutcome::from_echo(&json!({"ok": true})),
            PostOutcome::CreatedUnknown
        );
        assert_eq!(
            PostOutcome::from_echo(&json!({"id": ""})),
            PostOutcome::CreatedUnknown
        );
        assert_eq!(PostOutcome::from_echo(&Value::Null), PostOutcome::CreatedUnknown);
    }

    #[test]
    fn test_new_comment_omits_blank_author() {
        let body = serde_json::to_value(NewComment {
            discussion_id: "issue-12".to_string(),
            author: None,
            body: "Great read".to_string(),
        })
        .unwrap();

        assert_eq!(body, json!({"discussionId": "issue-12", "body": "Great read"}));
    }
}
