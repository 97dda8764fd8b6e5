//! Testimonials endpoint.

use axum::{
    extract::{Query, State},
    http::HeaderMap,
};
use serde::Deserialize;

use super::{success, ApiResult};
use crate::cache::SESSION_HEADER;
use crate::views::{TestimonialsView, TestimonialsWidget};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct TestimonialsQuery {
    /// Show every review instead of the preview
    #[serde(default)]
    pub all: bool,
}

/// GET /testimonials - Resolved reviews for the widget.
///
/// Reviews are cached per reader session (`x-zine-session`); without one the
/// widget resolves from scratch.
pub async fn get_testimonials(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<TestimonialsQuery>,
) -> ApiResult<TestimonialsView> {
    let session = headers.get(SESSION_HEADER).and_then(|v| v.to_str().ok());
    let mut widget = TestimonialsWidget::new(
        state.upstream.clone(),
        state.sessions.cache_for(session),
        state.config.testimonials_preview,
    )
    .within(&state.views);

    widget.resolve().await?;
    if query.all {
        widget.toggle();
    }
    success(widget.snapshot())
}
