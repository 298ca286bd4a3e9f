use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use service::db::package_service::{self, PackageFilter, PackageInput, PackagePatch, PackageView};

use crate::errors::JsonApiError;
use crate::state::AppState;

#[utoipa::path(
    get, path = "/api/packages", tag = "packages",
    params(("active" = Option<bool>, Query, description = "Only active / inactive packages")),
    responses((status = 200, description = "List OK"))
)]
pub async fn list(State(state): State<AppState>, Query(f): Query<PackageFilter>) -> Result<Json<Vec<PackageView>>, JsonApiError> {
    Ok(Json(package_service::list_packages(&state.db, &f).await?))
}

#[utoipa::path(
    post, path = "/api/packages", tag = "packages",
    request_body = crate::openapi::PackageInputDoc,
    responses(
        (status = 201, description = "Created"),
        (status = 400, description = "Validation Error"),
        (status = 409, description = "Name already in use")
    )
)]
pub async fn create(State(state): State<AppState>, Json(input): Json<PackageInput>) -> Result<(StatusCode, Json<PackageView>), JsonApiError> {
    Ok((StatusCode::CREATED, Json(package_service::create_package(&state.db, input).await?)))
}

#[utoipa::path(
    get, path = "/api/packages/{id}", tag = "packages",
    params(("id" = i32, Path, description = "Package ID")),
    responses((status = 200, description = "OK"), (status = 404, description = "Not Found"))
)]
pub async fn get(State(state): State<AppState>, Path(id): Path<i32>) -> Result<Json<PackageView>, JsonApiError> {
    Ok(Json(package_service::get_package(&state.db, id).await?))
}

#[utoipa::path(
    patch, path = "/api/packages/{id}", tag = "packages",
    params(("id" = i32, Path, description = "Package ID")),
    request_body = crate::openapi::PackagePatchDoc,
    responses(
        (status = 200, description = "Updated"),
        (status = 400, description = "Validation Error"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update(State(state): State<AppState>, Path(id): Path<i32>, Json(patch): Json<PackagePatch>) -> Result<Json<PackageView>, JsonApiError> {
    Ok(Json(package_service::update_package(&state.db, id, patch).await?))
}

#[utoipa::path(
    delete, path = "/api/packages/{id}", tag = "packages",
    params(("id" = i32, Path, description = "Package ID")),
    responses((status = 204, description = "Deleted"), (status = 404, description = "Not Found"))
)]
pub async fn delete(State(state): State<AppState>, Path(id): Path<i32>) -> Result<StatusCode, JsonApiError> {
    package_service::delete_package(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
