//! Reader testimonials widget.
//!
//! The reviews endpoint has answered with several different shapes over time, so
//! the widget normalizes whatever it gets and falls back to a fixed list when it
//! cannot make sense of the response.

use std::sync::Arc;

use chrono::DateTime;
use serde::Serialize;
use serde_json::{Map, Value};

use super::{LoadState, ViewScope};
use crate::cache::SessionCache;
use crate::errors::AppError;
use crate::models::{Review, MAX_RATING};
use crate::upstream::UpstreamClient;

/// Session cache key holding the resolved review list.
pub const TESTIMONIALS_CACHE_KEY: &str = "zine.testimonials.v1";

const LIST_KEYS: [&str; 5] = ["reviews", "results", "data", "testimonials", "items"];
const NESTED_PARENTS: [&str; 2] = ["data", "result"];
const NESTED_LIST_KEYS: [&str; 2] = ["reviews", "results"];

const AUTHOR_KEYS: [&str; 3] = ["author", "author_name", "name"];
const RATING_KEYS: [&str; 3] = ["rating", "stars", "score"];
const TEXT_KEYS: [&str; 5] = ["text", "comment", "body", "content", "review"];
const AVATAR_KEYS: [&str; 4] = ["avatar", "avatar_url", "profile_photo_url", "photo"];
const TIME_KEYS: [&str; 4] = ["time", "relative_time_description", "date", "created_at"];

/// Where the widget's current reviews came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewSource {
    Cache,
    Network,
    Fallback,
}

/// Reviews shown whenever the live list cannot be resolved.
pub fn default_reviews() -> Vec<Review> {
    vec![
        Review {
            id: "default-1".to_string(),
            author: "Margaret L.".to_string(),
            rating: 5,
            text: "Every issue feels like a conversation with a well-read friend. \
                   I read it cover to cover."
                .to_string(),
            avatar: None,
            time: None,
        },
        Review {
            id: "default-2".to_string(),
            author: "Devon A.".to_string(),
            rating: 5,
            text: "Thoughtful essays, beautiful photography, and a comment section \
                   that is actually worth reading."
                .to_string(),
            avatar: None,
            time: None,
        },
        Review {
            id: "default-3".to_string(),
            author: "Priya S.".to_string(),
            rating: 4,
            text: "The contributor lineup keeps surprising me. My favourite \
                   subscription by far."
                .to_string(),
            avatar: None,
            time: None,
        },
    ]
}

/// Turn any recognised response shape into reviews.
///
/// Returns `None` when the shape is unrecognised or yields no usable review.
pub fn normalize(value: &Value) -> Option<Vec<Review>> {
    let items = locate_list(value)?;
    let reviews: Vec<Review> = items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| normalize_item(index, item))
        .collect();

    if reviews.is_empty() {
        None
    } else {
        Some(reviews)
    }
}

fn locate_list(value: &Value) -> Option<&Vec<Value>> {
    if let Value::Array(items) = value {
        return Some(items);
    }

    let direct = LIST_KEYS.iter().find_map(|key| value.get(*key)?.as_array());
    if direct.is_some() {
        return direct;
    }

    NESTED_PARENTS.iter().find_map(|parent| {
        let inner = value.get(*parent)?;
        NESTED_LIST_KEYS
            .iter()
            .find_map(|key| inner.get(*key)?.as_array())
    })
}

fn normalize_item(index: usize, item: &Value) -> Option<Review> {
    let fields = item.as_object()?;
    let text = first_string(fields, &TEXT_KEYS)?;

    let author = first_author(fields).unwrap_or_else(|| "Anonymous".to_string());
    let rating = RATING_KEYS
        .iter()
        .find_map(|key| fields.get(*key))
        .map(coerce_rating)
        .unwrap_or(0);
    let id = ["id", "review_id"]
        .iter()
        .find_map(|key| match fields.get(*key)? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .unwrap_or_else(|| format!("review-{}", index));

    Some(Review {
        id,
        author,
        rating,
        text,
        avatar: first_string(fields, &AVATAR_KEYS),
        time: first_time(fields),
    })
}

fn first_string(fields: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match fields.get(*key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    })
}

fn first_author(fields: &Map<String, Value>) -> Option<String> {
    AUTHOR_KEYS
        .iter()
        .find_map(|key| match fields.get(*key)? {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Object(inner) => first_string(inner, &["name", "display_name"]),
            _ => None,
        })
        .or_else(|| first_string(fields.get("user")?.as_object()?, &["name"]))
}

fn first_time(fields: &Map<String, Value>) -> Option<String> {
    TIME_KEYS.iter().find_map(|key| match fields.get(*key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => DateTime::from_timestamp(n.as_i64()?, 0)
            .map(|dt| dt.format("%Y-%m-%d").to_string()),
        _ => None,
    })
}

/// Numbers and numeric strings are rounded and clamped to the star range.
fn coerce_rating(value: &Value) -> u8 {
    let raw = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match raw {
        Some(r) if r.is_finite() => r.round().clamp(0.0, f64::from(MAX_RATING)) as u8,
        _ => 0,
    }
}

/// Serializable snapshot of the widget.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestimonialsView {
    pub state: LoadState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<ReviewSource>,
    pub reviews: Vec<Review>,
    pub total: usize,
    pub showing_all: bool,
    pub has_more: bool,
}

/// "What readers say" carousel.
pub struct TestimonialsWidget {
    client: Arc<UpstreamClient>,
    cache: Arc<dyn SessionCache>,
    scope: ViewScope,
    preview: usize,
    show_all: bool,
    reviews: Vec<Review>,
    source: Option<ReviewSource>,
    state: LoadState,
}

impl TestimonialsWidget {
    pub fn new(client: Arc<UpstreamClient>, cache: Arc<dyn SessionCache>, preview: usize) -> Self {
        Self {
            client,
            cache,
            scope: ViewScope::new(),
            preview,
            show_all: false,
            reviews: Vec::new(),
            source: None,
            state: LoadState::Idle,
        }
    }

    /// Tie the widget's requests to `parent`, so unmounting the parent cancels them.
    pub fn within(mut self, parent: &ViewScope) -> Self {
        self.scope = parent.child();
        self
    }

    /// Reviews currently on screen.
    pub fn visible(&self) -> &[Review] {
        if self.show_all {
            &self.reviews
        } else {
            &self.reviews[..self.preview.min(self.reviews.len())]
        }
    }

    pub fn has_more(&self) -> bool {
        self.reviews.len() > self.preview
    }

    /// Flip between "show first N" and "show all".
    pub fn toggle(&mut self) {
        self.show_all = !self.show_all;
    }

    pub fn snapshot(&self) -> TestimonialsView {
        TestimonialsView {
            state: self.state.clone(),
            source: self.source,
            reviews: self.visible().to_vec(),
            total: self.reviews.len(),
            showing_all: self.show_all,
            has_more: self.has_more(),
        }
    }

    /// Resolve the review list from cache, network or the built-in defaults.
    ///
    /// Only unmounting can make this fail; every other problem ends in the fallback.
    pub async fn resolve(&mut self) -> Result<ReviewSource, AppError> {
        if let Some(cached) = self.cached() {
            self.apply(cached, ReviewSource::Cache);
            return Ok(ReviewSource::Cache);
        }

        self.state = LoadState::Loading;
        let fetched = match self.scope.run(self.client.fetch_testimonials()).await {
            Ok(body) => normalize(&body),
            Err(e @ AppError::Cancelled(_)) => return Err(e),
            Err(e) => {
                tracing::warn!("Failed to fetch testimonials: {}", e);
                None
            }
        };

        let (reviews, source) = match fetched {
            Some(reviews) => (reviews, ReviewSource::Network),
            None => {
                tracing::info!("Using default testimonials");
                (default_reviews(), ReviewSource::Fallback)
            }
        };

        match serde_json::to_string(&reviews) {
            Ok(encoded) => self.cache.set(TESTIMONIALS_CACHE_KEY, encoded),
            Err(e) => tracing::warn!("Failed to cache testimonials: {}", e),
        }
        self.apply(reviews, source);
        Ok(source)
    }

    fn cached(&self) -> Option<Vec<Review>> {
        let raw = self.cache.get(TESTIMONIALS_CACHE_KEY)?;
        match serde_json::from_str::<Vec<Review>>(&raw) {
            Ok(reviews) if !reviews.is_empty() => Some(reviews),
            Ok(_) => None,
            Err(e) => {
                tracing::debug!("Discarding unreadable testimonials cache: {}", e);
                self.cache.remove(TESTIMONIALS_CACHE_KEY);
                None
            }
        }
    }

    fn apply(&mut self, reviews: Vec<Review>, source: ReviewSource) {
        self.reviews = reviews;
        self.source = Some(source);
        self.state = LoadState::Success;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use serde_json::json;

    #[test]
    fn test_normalize_bare_array() {
        let reviews = normalize(&json!([
            {"id": 11, "author": "Ana", "rating": 4, "text": "Lovely"}
        ]))
        .unwrap();

        assert_eq!(
            reviews,
            vec![Review {
                id: "11".to_string(),
                author: "Ana".to_string(),
                rating: 4,
                text: "Lovely".to_string(),
                avatar: None,
                time: None,
            }]
        );
    }

    #[test]
    fn test_normalize_envelopes() {
        let shapes = [
            json!({"reviews": [{"text": "a"}]}),
            json!({"results": [{"text": "a"}]}),
            json!({"data": [{"text": "a"}]}),
            json!({"testimonials": [{"text": "a"}]}),
            json!({"data": {"reviews": [{"text": "a"}]}}),
            json!({"result": {"reviews": [{"text": "a"}]}}),
        ];

        for shape in shapes {
            let reviews = normalize(&shape).unwrap_or_else(|| panic!("shape {} rejected", shape));
            assert_eq!(reviews.len(), 1);
            assert_eq!(reviews[0].author, "Anonymous");
            assert_eq!(reviews[0].id, "review-0");
        }
    }

    #[test]
    fn test_normalize_rejects_unknown_or_empty() {
        assert!(normalize(&json!({"status": "ok"})).is_none());
        assert!(normalize(&json!("reviews")).is_none());
        assert!(normalize(&json!([])).is_none());
        assert!(normalize(&json!([{"author": "No text"}])).is_none());
    }

    #[test]
    fn test_rating_is_coerced_and_clamped() {
        assert_eq!(coerce_rating(&json!(9)), 5);
        assert_eq!(coerce_rating(&json!(-2)), 0);
        assert_eq!(coerce_rating(&json!(3.6)), 4);
        assert_eq!(coerce_rating(&json!("4")), 4);
        assert_eq!(coerce_rating(&json!("five")), 0);
        assert_eq!(coerce_rating(&json!(null)), 0);
    }

    #[test]
    fn test_places_style_fields() {
        let reviews = normalize(&json!({"result": {"reviews": [{
            "author_name": "Kim",
            "rating": 5,
            "text": "Superb",
            "profile_photo_url": "https://example.test/kim.png",
            "time": 1_700_000_000
        }]}}))
        .unwrap();

        assert_eq!(reviews[0].author, "Kim");
        assert_eq!(
            reviews[0].avatar.as_deref(),
            Some("https://example.test/kim.png")
        );
        assert_eq!(reviews[0].time.as_deref(), Some("2023-11-14"));
    }

    #[test]
    fn test_nested_author_object() {
        let reviews = normalize(&json!([
            {"user": {"name": "Lee"}, "comment": "Great"},
            {"author": {"display_name": "Mo"}, "body": "Fine"}
        ]))
        .unwrap();

        assert_eq!(reviews[0].author, "Lee");
        assert_eq!(reviews[1].author, "Mo");
    }

    #[tokio::test]
    async fn test_cache_hit_skips_network() {
        let cache = Arc::new(MemoryCache::new());
        let cached = vec![Review {
            id: "x".to_string(),
            author: "Cached".to_string(),
            rating: 3,
            text: "From session".to_string(),
            avatar: None,
            time: None,
        }];
        cache.set(
            TESTIMONIALS_CACHE_KEY,
            serde_json::to_string(&cached).unwrap(),
        );

        // Nothing listens here; a network attempt would fall back instead.
        let client = Arc::new(UpstreamClient::new("http://127.0.0.1:9", None));
        let mut widget = TestimonialsWidget::new(client, cache, 3);

        assert_eq!(widget.resolve().await, Ok(ReviewSource::Cache));
        assert_eq!(widget.reviews, cached);
    }

    #[test]
    fn test_visible_and_toggle() {
        let client = Arc::new(UpstreamClient::new("http://127.0.0.1:9", None));
        let mut widget = TestimonialsWidget::new(client, Arc::new(MemoryCache::new()), 2);
        widget.apply(default_reviews(), ReviewSource::Fallback);

        assert_eq!(widget.visible().len(), 2);
        assert!(widget.has_more());

        widget.toggle();
        assert_eq!(widget.visible().len(), 3);
        assert!(widget.snapshot().showing_all);

        widget.toggle();
        assert_eq!(widget.visible().len(), 2);
    }
}
