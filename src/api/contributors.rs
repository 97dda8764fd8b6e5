//! Contributor directory endpoints.

use axum::extract::{Path, Query};
use serde::Deserialize;

use super::{success, ApiResult};
use crate::errors::AppError;
use crate::models::Contributor;
use crate::views::ContributorDirectory;

/// Optional filters for the directory.
#[derive(Debug, Deserialize)]
pub struct DirectoryQuery {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub q: Option<String>,
}

/// GET /contributors - The directory, optionally filtered.
pub async fn list_contributors(Query(query): Query<DirectoryQuery>) -> ApiResult<Vec<Contributor>> {
    let directory = ContributorDirectory::default();

    let by_role = query.role.as_deref().map(|role| directory.by_role(role));
    let found: Vec<&Contributor> = match (query.q.as_deref(), by_role) {
        (Some(term), Some(allowed)) => directory
            .search(term)
            .into_iter()
            .filter(|c| allowed.iter().any(|a| a.id == c.id))
            .collect(),
        (Some(term), None) => directory.search(term),
        (None, Some(allowed)) => allowed,
        (None, None) => directory.all().iter().collect(),
    };

    success(found.into_iter().cloned().collect())
}

/// GET /contributors/roles - Distinct roles for the filter menu.
pub async fn list_roles() -> ApiResult<Vec<String>> {
    let directory = ContributorDirectory::default();
    success(directory.roles().into_iter().map(str::to_string).collect())
}

/// GET /contributors/:id - A single contributor.
pub async fn get_contributor(Path(id): Path<String>) -> ApiResult<Contributor> {
    match ContributorDirectory::default().find(&id) {
        Some(contributor) => success(contributor.clone()),
        None => Err(AppError::NotFound(format!("Contributor {} not found", id))),
    }
}
