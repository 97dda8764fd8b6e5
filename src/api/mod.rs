//! HTTP surface of the front end.
//!
//! Each handler mounts one view model, drives it through a single cycle and
//! returns its snapshot inside the success envelope.

mod contributors;
mod discussion;
mod issues;
mod pages;
mod subscribe;
mod testimonials;

pub use contributors::*;
pub use discussion::*;
pub use issues::*;
pub use pages::*;
pub use subscribe::*;
pub use testimonials::*;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::errors::AppError;

/// Success response envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Response type that can be either success or error.
pub type ApiResult<T> = Result<ApiResponse<T>, AppError>;

/// Create a successful API response.
pub fn success<T: Serialize>(data: T) -> ApiResult<T> {
    Ok(ApiResponse::new(data))
}
