use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::dashboard::DashboardError;
use crate::favorites::FavoritesError;
use crate::feeds::FeedError;
use crate::orbit::OrbitError;

pub const PROXY_ERROR: &str = "Error fetching SatNOGS data";

pub enum ApiError {
    Validation(String),
    NotFound(String),
    Favorites(FavoritesError),
    Orbit(OrbitError),
    Proxy(FeedError),
}

impl From<DashboardError> for ApiError {
    fn from(e: DashboardError) -> Self {
        match e {
            DashboardError::NotFound(name) => ApiError::NotFound(name),
            DashboardError::Orbit(e) => ApiError::Orbit(e),
            DashboardError::Favorites(e) => ApiError::Favorites(e),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::with_message("validation_failed", &msg)),
            )
                .into_response(),
            ApiError::NotFound(name) => (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::with_message("object_not_found", &name)),
            )
                .into_response(),
            ApiError::Favorites(FavoritesError::EmptyName) => (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::with_message(
                    "validation_failed",
                    &FavoritesError::EmptyName.to_string(),
                )),
            )
                .into_response(),
            ApiError::Favorites(e) => {
                log::error!("favorites not saved: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse::with_message("storage_error", &e.to_string())),
                )
                    .into_response()
            }
            ApiError::Orbit(e @ OrbitError::Missing(_)) => (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::with_message("orbit_unavailable", &e.to_string())),
            )
                .into_response(),
            ApiError::Orbit(e) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ErrorResponse::with_message("propagation_failed", &e.to_string())),
            )
                .into_response(),
            ApiError::Proxy(e) => {
                log::warn!("proxy request failed: {}", e);
                let status = match e {
                    FeedError::UpstreamStatus(code) => {
                        StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_GATEWAY)
                    }
                    FeedError::Network(_) | FeedError::Format(_) => {
                        StatusCode::INTERNAL_SERVER_ERROR
                    }
                };
                (
                    status,
                    Json(ErrorResponse::with_message(PROXY_ERROR, &e.to_string())),
                )
                    .into_response()
            }
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorResponse {
    pub fn with_message(error: &str, message: &str) -> Self {
        ErrorResponse {
            error: error.to_string(),
            message: Some(message.to_string()),
        }
    }
}
