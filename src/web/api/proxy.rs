use axum::{
    body::Bytes,
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
};

use crate::feeds::FeedError;
use crate::web::api::error::{ApiError, ApiResult};
use crate::web::state::AppState;

/// Upstream the signals proxy forwards to.
pub struct ProxyTarget {
    client: reqwest::Client,
    url: String,
}

impl ProxyTarget {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    /// Returns the upstream body untouched once it is known to be JSON.
    pub async fn forward(&self) -> Result<Bytes, FeedError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| FeedError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::UpstreamStatus(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FeedError::Network(e.to_string()))?;
        serde_json::from_slice::<serde::de::IgnoredAny>(&body)
            .map_err(|e| FeedError::Format(e.to_string()))?;
        Ok(body)
    }
}

#[utoipa::path(
    get,
    path = "/api/satnogs",
    tag = "proxy",
    responses(
        (status = 200, description = "Upstream signals JSON, verbatim"),
        (status = 500, description = "Upstream unreachable or not JSON", body = super::error::ErrorResponse)
    )
)]
pub async fn satnogs(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let body = state.proxy.forward().await.map_err(ApiError::Proxy)?;
    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        body,
    ))
}
