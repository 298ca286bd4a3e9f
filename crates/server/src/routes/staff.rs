use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use service::db::staff_service::{self, StaffFilter, StaffInput, StaffPatch, StaffView};

use crate::errors::JsonApiError;
use crate::state::AppState;

#[utoipa::path(
    get, path = "/api/staff", tag = "staff",
    params(
        ("active" = Option<bool>, Query, description = "Only active / inactive staff"),
        ("service" = Option<i32>, Query, description = "Only staff offering this service"),
        ("search" = Option<String>, Query, description = "Matches name or email"),
        ("page" = Option<u32>, Query, description = "1-based page"),
        ("per_page" = Option<u32>, Query, description = "Page size (max 100)")
    ),
    responses((status = 200, description = "List OK"))
)]
pub async fn list(State(state): State<AppState>, Query(f): Query<StaffFilter>) -> Result<Json<Vec<StaffView>>, JsonApiError> {
    Ok(Json(staff_service::list_staff(&state.db, &f).await?))
}

#[utoipa::path(
    post, path = "/api/staff", tag = "staff",
    request_body = crate::openapi::StaffInputDoc,
    responses(
        (status = 201, description = "Created"),
        (status = 400, description = "Validation Error"),
        (status = 409, description = "Email already in use")
    )
)]
pub async fn create(State(state): State<AppState>, Json(input): Json<StaffInput>) -> Result<(StatusCode, Json<StaffView>), JsonApiError> {
    let v = staff_service::create_staff(&state.db, input).await?;
    Ok((StatusCode::CREATED, Json(v)))
}

#[utoipa::path(
    get, path = "/api/staff/{id}", tag = "staff",
    params(("id" = i32, Path, description = "Staff ID")),
    responses(
        (status = 200, description = "OK"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get(State(state): State<AppState>, Path(id): Path<i32>) -> Result<Json<StaffView>, JsonApiError> {
    Ok(Json(staff_service::get_staff(&state.db, id).await?))
}

#[utoipa::path(
    patch, path = "/api/staff/{id}", tag = "staff",
    params(("id" = i32, Path, description = "Staff ID")),
    request_body = crate::openapi::StaffPatchDoc,
    responses(
        (status = 200, description = "Updated"),
        (status = 400, description = "Validation Error"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update(State(state): State<AppState>, Path(id): Path<i32>, Json(patch): Json<StaffPatch>) -> Result<Json<StaffView>, JsonApiError> {
    Ok(Json(staff_service::update_staff(&state.db, id, patch).await?))
}

#[utoipa::path(
    delete, path = "/api/staff/{id}", tag = "staff",
    params(("id" = i32, Path, description = "Staff ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Still referenced by bookings")
    )
)]
pub async fn delete(State(state): State<AppState>, Path(id): Path<i32>) -> Result<StatusCode, JsonApiError> {
    staff_service::delete_staff(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
