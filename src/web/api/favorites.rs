use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::web::api::error::ApiResult;
use crate::web::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct FavoritesResponse {
    pub names: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ToggleResponse {
    pub name: String,
    pub favorite: bool,
}

#[utoipa::path(
    get,
    path = "/api/favorites",
    tag = "favorites",
    responses((status = 200, description = "Favorite object names, sorted", body = FavoritesResponse))
)]
pub async fn list_favorites(State(state): State<AppState>) -> impl IntoResponse {
    Json(FavoritesResponse {
        names: state.dashboard.favorites().await,
    })
}

#[utoipa::path(
    post,
    path = "/api/favorites/{name}",
    tag = "favorites",
    params(("name" = String, Path, description = "Catalog object name")),
    responses(
        (status = 200, description = "New membership", body = ToggleResponse),
        (status = 500, description = "Favorites could not be saved", body = super::error::ErrorResponse)
    )
)]
pub async fn toggle_favorite(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let favorite = state.dashboard.toggle_favorite(&name).await?;
    Ok(Json(ToggleResponse { name, favorite }))
}
