use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{Duration, Utc};
use serde::Deserialize;

use crate::dashboard::{
    AnomaliesView, CatalogView, PassesView, PositionsView, SignalsView, SourceStatus,
};
use crate::feeds::SourceKind;
use crate::model::{TypeFilter, TypeFilterParseError};
use crate::orbit::TrackPoint;
use crate::web::api::error::{ApiError, ApiResult};
use crate::web::state::AppState;

const DEFAULT_TRACK_MINUTES: i64 = 90;
const DEFAULT_TRACK_STEP_SECONDS: i64 = 60;
const MAX_TRACK_POINTS: i64 = 10_000;
const MAX_TRACK_MINUTES: i64 = 7 * 24 * 60;
const MAX_TRACK_STEP_SECONDS: i64 = 24 * 60 * 60;

#[derive(Debug, Default, Deserialize)]
pub struct CatalogQuery {
    #[serde(default)]
    pub query: String,
    #[serde(default, rename = "type")]
    pub object_type: Option<String>,
}

impl CatalogQuery {
    fn type_filter(&self) -> ApiResult<TypeFilter> {
        self.object_type
            .as_deref()
            .unwrap_or("ALL")
            .parse()
            .map_err(|e: TypeFilterParseError| ApiError::Validation(e.to_string()))
    }
}

#[derive(Debug, Deserialize)]
pub struct TrackQuery {
    pub minutes: Option<i64>,
    pub step_seconds: Option<i64>,
}

#[utoipa::path(
    get,
    path = "/api/status",
    tag = "sources",
    responses((status = 200, description = "Refresh status of every source", body = Vec<SourceStatus>))
)]
pub async fn status(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.dashboard.statuses())
}

#[utoipa::path(
    get,
    path = "/api/catalog",
    tag = "sources",
    params(
        ("query" = Option<String>, Query, description = "Case-insensitive name substring"),
        ("type" = Option<String>, Query, description = "ALL, PAYLOAD, ROCKET_BODY, DEBRIS or OTHER")
    ),
    responses(
        (status = 200, description = "Filtered catalog", body = CatalogView),
        (status = 400, description = "Unknown type filter", body = super::error::ErrorResponse)
    )
)]
pub async fn catalog(
    State(state): State<AppState>,
    Query(query): Query<CatalogQuery>,
) -> ApiResult<impl IntoResponse> {
    let type_filter = query.type_filter()?;
    Ok(Json(state.dashboard.catalog(&query.query, type_filter).await))
}

#[utoipa::path(
    get,
    path = "/api/catalog/positions",
    tag = "sources",
    params(
        ("query" = Option<String>, Query, description = "Case-insensitive name substring"),
        ("type" = Option<String>, Query, description = "ALL, PAYLOAD, ROCKET_BODY, DEBRIS or OTHER")
    ),
    responses(
        (status = 200, description = "Current positions of the filtered catalog", body = PositionsView),
        (status = 400, description = "Unknown type filter", body = super::error::ErrorResponse)
    )
)]
pub async fn positions(
    State(state): State<AppState>,
    Query(query): Query<CatalogQuery>,
) -> ApiResult<impl IntoResponse> {
    let type_filter = query.type_filter()?;
    Ok(Json(
        state
            .dashboard
            .positions(&query.query, type_filter, Utc::now())
            .await,
    ))
}

#[utoipa::path(
    get,
    path = "/api/catalog/{name}/track",
    tag = "sources",
    params(
        ("name" = String, Path, description = "Catalog object name"),
        ("minutes" = Option<i64>, Query, description = "Track length from now (default 90, at most one week)"),
        ("step_seconds" = Option<i64>, Query, description = "Sample spacing (default 60, at most one day)")
    ),
    responses(
        (status = 200, description = "Ground track", body = Vec<TrackPoint>),
        (status = 400, description = "Invalid parameters", body = super::error::ErrorResponse),
        (status = 404, description = "Unknown object or no orbit", body = super::error::ErrorResponse)
    )
)]
pub async fn track(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<TrackQuery>,
) -> ApiResult<impl IntoResponse> {
    let minutes = query.minutes.unwrap_or(DEFAULT_TRACK_MINUTES);
    let step_seconds = query.step_seconds.unwrap_or(DEFAULT_TRACK_STEP_SECONDS);

    if minutes <= 0 || step_seconds <= 0 {
        return Err(ApiError::Validation(
            "minutes and step_seconds must be positive".into(),
        ));
    }
    if minutes > MAX_TRACK_MINUTES || step_seconds > MAX_TRACK_STEP_SECONDS {
        return Err(ApiError::Validation(format!(
            "minutes must be at most {} and step_seconds at most {}",
            MAX_TRACK_MINUTES, MAX_TRACK_STEP_SECONDS
        )));
    }
    if minutes * 60 / step_seconds > MAX_TRACK_POINTS {
        return Err(ApiError::Validation(format!(
            "track would exceed {} points",
            MAX_TRACK_POINTS
        )));
    }

    let points = state.dashboard.track(
        &name,
        Utc::now(),
        Duration::minutes(minutes),
        Duration::seconds(step_seconds),
    )?;
    Ok(Json(points))
}

#[utoipa::path(
    get,
    path = "/api/signals",
    tag = "sources",
    responses((status = 200, description = "Latest signal reports", body = SignalsView))
)]
pub async fn signals(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.dashboard.signals())
}

#[utoipa::path(
    get,
    path = "/api/signals/anomalies",
    tag = "sources",
    responses((status = 200, description = "Signals outside the nominal band", body = AnomaliesView))
)]
pub async fn anomalies(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.dashboard.anomalies())
}

#[utoipa::path(
    get,
    path = "/api/passes",
    tag = "sources",
    responses((status = 200, description = "Visible pass predictions", body = PassesView))
)]
pub async fn passes(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.dashboard.passes())
}

#[utoipa::path(
    post,
    path = "/api/sources/{source}/refresh",
    tag = "sources",
    params(("source" = String, Path, description = "catalog, signals or passes")),
    responses(
        (status = 202, description = "Refresh requested", body = SourceStatus),
        (status = 400, description = "Unknown source", body = super::error::ErrorResponse)
    )
)]
pub async fn refresh(
    State(state): State<AppState>,
    Path(source): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let source: SourceKind = source.parse().map_err(ApiError::Validation)?;
    state.dashboard.refresh(source);
    Ok((StatusCode::ACCEPTED, Json(state.dashboard.status(source))))
}
