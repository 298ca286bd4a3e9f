use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use service::db::session_service::{self, EnrollInput, SessionFilter, SessionInput, SessionPatch, SessionView};

use crate::errors::JsonApiError;
use crate::state::AppState;

#[utoipa::path(
    get, path = "/api/sessions", tag = "sessions",
    params(
        ("active" = Option<bool>, Query, description = "Only active / inactive sessions"),
        ("upcoming" = Option<bool>, Query, description = "Only sessions starting from now"),
        ("page" = Option<u32>, Query, description = "1-based page"),
        ("per_page" = Option<u32>, Query, description = "Page size (max 100)")
    ),
    responses((status = 200, description = "List OK"))
)]
pub async fn list(State(state): State<AppState>, Query(f): Query<SessionFilter>) -> Result<Json<Vec<SessionView>>, JsonApiError> {
    Ok(Json(session_service::list_sessions(&state.db, state.policy.rules.offset, &f).await?))
}

#[utoipa::path(
    post, path = "/api/sessions", tag = "sessions",
    request_body = crate::openapi::SessionInputDoc,
    responses(
        (status = 201, description = "Created"),
        (status = 400, description = "Validation Error")
    )
)]
pub async fn create(State(state): State<AppState>, Json(input): Json<SessionInput>) -> Result<(StatusCode, Json<SessionView>), JsonApiError> {
    let v = session_service::create_session(&state.db, state.policy.rules.offset, input).await?;
    Ok((StatusCode::CREATED, Json(v)))
}

#[utoipa::path(
    get, path = "/api/sessions/{id}", tag = "sessions",
    params(("id" = i32, Path, description = "Session ID")),
    responses((status = 200, description = "OK"), (status = 404, description = "Not Found"))
)]
pub async fn get(State(state): State<AppState>, Path(id): Path<i32>) -> Result<Json<SessionView>, JsonApiError> {
    Ok(Json(session_service::get_session(&state.db, id).await?))
}

#[utoipa::path(
    patch, path = "/api/sessions/{id}", tag = "sessions",
    params(("id" = i32, Path, description = "Session ID")),
    request_body = crate::openapi::SessionPatchDoc,
    responses(
        (status = 200, description = "Updated"),
        (status = 400, description = "Validation Error"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update(State(state): State<AppState>, Path(id): Path<i32>, Json(patch): Json<SessionPatch>) -> Result<Json<SessionView>, JsonApiError> {
    Ok(Json(session_service::update_session(&state.db, state.policy.rules.offset, id, patch).await?))
}

#[utoipa::path(
    delete, path = "/api/sessions/{id}", tag = "sessions",
    params(("id" = i32, Path, description = "Session ID")),
    responses((status = 204, description = "Deleted"), (status = 404, description = "Not Found"))
)]
pub async fn delete(State(state): State<AppState>, Path(id): Path<i32>) -> Result<StatusCode, JsonApiError> {
    session_service::delete_session(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post, path = "/api/sessions/{id}/enroll", tag = "sessions",
    params(("id" = i32, Path, description = "Session ID")),
    request_body = crate::openapi::EnrollDoc,
    responses(
        (status = 200, description = "Enrolled"),
        (status = 400, description = "Session inactive"),
        (status = 404, description = "Unknown session or client"),
        (status = 409, description = "Session full or client already enrolled")
    )
)]
pub async fn enroll(State(state): State<AppState>, Path(id): Path<i32>, Json(input): Json<EnrollInput>) -> Result<Json<SessionView>, JsonApiError> {
    Ok(Json(session_service::enroll(&state.db, id, input.client).await?))
}

#[utoipa::path(
    post, path = "/api/sessions/{id}/unenroll", tag = "sessions",
    params(("id" = i32, Path, description = "Session ID")),
    request_body = crate::openapi::EnrollDoc,
    responses(
        (status = 200, description = "Unenrolled"),
        (status = 404, description = "Client not enrolled")
    )
)]
pub async fn unenroll(State(state): State<AppState>, Path(id): Path<i32>, Json(input): Json<EnrollInput>) -> Result<Json<SessionView>, JsonApiError> {
    Ok(Json(session_service::unenroll(&state.db, id, input.client).await?))
}
