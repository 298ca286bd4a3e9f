use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use service::db::catalog_service::{self, ServiceFilter, ServiceInput, ServicePatch, ServiceView};

use crate::errors::JsonApiError;
use crate::state::AppState;

#[utoipa::path(
    get, path = "/api/services", tag = "catalog",
    params(
        ("active" = Option<bool>, Query, description = "Only active / inactive services"),
        ("search" = Option<String>, Query, description = "Matches name or description"),
        ("page" = Option<u32>, Query, description = "1-based page"),
        ("per_page" = Option<u32>, Query, description = "Page size (max 100)")
    ),
    responses((status = 200, description = "List OK"))
)]
pub async fn list(State(state): State<AppState>, Query(f): Query<ServiceFilter>) -> Result<Json<Vec<ServiceView>>, JsonApiError> {
    Ok(Json(catalog_service::list_services(&state.db, &f).await?))
}

#[utoipa::path(
    post, path = "/api/services", tag = "catalog",
    request_body = crate::openapi::ServiceInputDoc,
    responses(
        (status = 201, description = "Created"),
        (status = 400, description = "Validation Error")
    )
)]
pub async fn create(State(state): State<AppState>, Json(input): Json<ServiceInput>) -> Result<(StatusCode, Json<ServiceView>), JsonApiError> {
    let v = catalog_service::create_service(&state.db, input).await?;
    Ok((StatusCode::CREATED, Json(v)))
}

#[utoipa::path(
    get, path = "/api/services/{id}", tag = "catalog",
    params(("id" = i32, Path, description = "Service ID")),
    responses(
        (status = 200, description = "OK"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get(State(state): State<AppState>, Path(id): Path<i32>) -> Result<Json<ServiceView>, JsonApiError> {
    Ok(Json(catalog_service::get_service(&state.db, id).await?))
}

#[utoipa::path(
    patch, path = "/api/services/{id}", tag = "catalog",
    params(("id" = i32, Path, description = "Service ID")),
    request_body = crate::openapi::ServicePatchDoc,
    responses(
        (status = 200, description = "Updated"),
        (status = 400, description = "Validation Error"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update(State(state): State<AppState>, Path(id): Path<i32>, Json(patch): Json<ServicePatch>) -> Result<Json<ServiceView>, JsonApiError> {
    Ok(Json(catalog_service::update_service(&state.db, id, patch).await?))
}

#[utoipa::path(
    delete, path = "/api/services/{id}", tag = "catalog",
    params(("id" = i32, Path, description = "Service ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Still referenced by bookings")
    )
)]
pub async fn delete(State(state): State<AppState>, Path(id): Path<i32>) -> Result<StatusCode, JsonApiError> {
    catalog_service::delete_service(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
