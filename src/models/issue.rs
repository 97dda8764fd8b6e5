//! Issue model matching the external API's issue resource.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::lenient_datetime;

/// A published (or draft) magazine issue.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Issue {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_thumbnail: Option<String>,
    #[serde(default)]
    pub published: bool,
    #[serde(
        default,
        deserialize_with = "lenient_datetime",
        skip_serializing_if = "Option::is_none"
    )]
    pub published_at: Option<DateTime<Utc>>,
}

/// Request body for creating or replacing an issue.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct IssueDraft {
    pub title: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub cover_thumbnail: Option<String>,
    #[serde(default)]
    pub published: bool,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
}

impl From<&Issue> for IssueDraft {
    fn from(issue: &Issue) -> Self {
        Self {
            title: issue.title.clone(),
            slug: Some(issue.slug.clone()),
            summary: issue.summary.clone(),
            cover_image: issue.cover_image.clone(),
            cover_thumbnail: issue.cover_thumbnail.clone(),
            published: issue.published,
            published_at: issue.published_at,
        }
    }
}
