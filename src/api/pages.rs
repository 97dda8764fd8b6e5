//! Static policy page endpoints.

use axum::extract::Path;

use super::{success, ApiResult};
use crate::errors::AppError;
use crate::models::PolicyPage;
use crate::views::{find_page, policy_pages};

/// GET /pages - Every policy page.
pub async fn list_pages() -> ApiResult<&'static [PolicyPage]> {
    success(policy_pages())
}

/// GET /pages/:slug - One policy page.
pub async fn get_page(Path(slug): Path<String>) -> ApiResult<&'static PolicyPage> {
    match find_page(&slug) {
        Some(page) => success(page),
        None => Err(AppError::NotFound(format!("Page {} not found", slug))),
    }
}
