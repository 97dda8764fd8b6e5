//! Newsletter subscription endpoint.

use axum::{extract::State, Json};
use serde::Deserialize;

use super::{success, ApiResult};
use crate::views::{SubscribeForm, SubscribeView};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SubscribeBody {
    #[serde(default)]
    pub email: String,
}

/// POST /subscribe - Sign up for the newsletter.
pub async fn subscribe(
    State(state): State<AppState>,
    Json(body): Json<SubscribeBody>,
) -> ApiResult<SubscribeView> {
    let mut form = SubscribeForm::new(state.upstream.clone()).within(&state.views);
    form.set_email(body.email);

    form.submit().await?;
    success(form.snapshot())
}
