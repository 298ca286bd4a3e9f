use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use service::db::disclaimer_service::{self, DisclaimerInput, DisclaimerView};

use crate::errors::JsonApiError;
use crate::state::AppState;

#[utoipa::path(get, path = "/api/intake-disclaimer", tag = "intake", responses((status = 200, description = "Newest first")))]
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<DisclaimerView>>, JsonApiError> {
    Ok(Json(disclaimer_service::list_disclaimers(&state.db).await?))
}

#[utoipa::path(
    post, path = "/api/intake-disclaimer", tag = "intake",
    request_body = crate::openapi::DisclaimerInputDoc,
    responses(
        (status = 201, description = "Created; an active version replaces the previous one"),
        (status = 400, description = "Validation Error"),
        (status = 409, description = "Version already exists")
    )
)]
pub async fn create(State(state): State<AppState>, Json(input): Json<DisclaimerInput>) -> Result<(StatusCode, Json<DisclaimerView>), JsonApiError> {
    Ok((StatusCode::CREATED, Json(disclaimer_service::create_disclaimer(&state.db, input).await?)))
}

#[utoipa::path(
    get, path = "/api/intake-disclaimer/active", tag = "intake",
    responses((status = 200, description = "Active disclaimer"), (status = 404, description = "No active disclaimer found"))
)]
pub async fn active(State(state): State<AppState>) -> Result<Json<DisclaimerView>, JsonApiError> {
    Ok(Json(disclaimer_service::active_disclaimer(&state.db).await?))
}

#[utoipa::path(
    get, path = "/api/intake-disclaimer/{id}", tag = "intake",
    params(("id" = i32, Path, description = "Disclaimer ID")),
    responses((status = 200, description = "OK"), (status = 404, description = "Not Found"))
)]
pub async fn get(State(state): State<AppState>, Path(id): Path<i32>) -> Result<Json<DisclaimerView>, JsonApiError> {
    Ok(Json(disclaimer_service::get_disclaimer(&state.db, id).await?))
}

#[utoipa::path(
    post, path = "/api/intake-disclaimer/{id}/activate", tag = "admin",
    params(("id" = i32, Path, description = "Disclaimer ID")),
    responses((status = 200, description = "Now the only active version"), (status = 404, description = "Not Found"))
)]
pub async fn activate(State(state): State<AppState>, Path(id): Path<i32>) -> Result<Json<DisclaimerView>, JsonApiError> {
    Ok(Json(disclaimer_service::activate_disclaimer(&state.db, id).await?))
}
