//! Intake profiles. Mounted under both `/api/intake` and `/api/intake-profiles`.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use common::types::Affected;
use service::db::intake_service::{self, EmailQuery, IntakeInput, IntakePatch, IntakeProfileView, IntakeStatus};

use crate::errors::JsonApiError;
use crate::state::AppState;

#[utoipa::path(get, path = "/api/intake", tag = "intake", responses((status = 200, description = "Newest first")))]
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<IntakeProfileView>>, JsonApiError> {
    Ok(Json(intake_service::list_profiles(&state.db).await?))
}

#[utoipa::path(
    post, path = "/api/intake", tag = "intake",
    request_body = crate::openapi::IntakeInputDoc,
    responses(
        (status = 201, description = "Completed intake"),
        (status = 400, description = "Validation Error or missing consent"),
        (status = 409, description = "Email already has a profile")
    )
)]
pub async fn create(State(state): State<AppState>, Json(input): Json<IntakeInput>) -> Result<(StatusCode, Json<IntakeProfileView>), JsonApiError> {
    let v = intake_service::create_profile(&state.db, state.booking.intake_validity_days, input).await?;
    Ok((StatusCode::CREATED, Json(v)))
}

#[utoipa::path(
    get, path = "/api/intake/{id}", tag = "intake",
    params(("id" = i32, Path, description = "Intake profile ID")),
    responses((status = 200, description = "OK"), (status = 404, description = "Not Found"))
)]
pub async fn get(State(state): State<AppState>, Path(id): Path<i32>) -> Result<Json<IntakeProfileView>, JsonApiError> {
    Ok(Json(intake_service::get_profile(&state.db, id).await?))
}

#[utoipa::path(
    patch, path = "/api/intake/{id}", tag = "intake",
    params(("id" = i32, Path, description = "Intake profile ID")),
    request_body = crate::openapi::IntakePatchDoc,
    responses(
        (status = 200, description = "Updated"),
        (status = 400, description = "Validation Error or missing consent"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update(State(state): State<AppState>, Path(id): Path<i32>, Json(patch): Json<IntakePatch>) -> Result<Json<IntakeProfileView>, JsonApiError> {
    Ok(Json(intake_service::update_profile(&state.db, id, patch).await?))
}

#[utoipa::path(
    delete, path = "/api/intake/{id}", tag = "intake",
    params(("id" = i32, Path, description = "Intake profile ID")),
    responses((status = 204, description = "Deleted"), (status = 404, description = "Not Found"))
)]
pub async fn delete(State(state): State<AppState>, Path(id): Path<i32>) -> Result<StatusCode, JsonApiError> {
    intake_service::delete_profile(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get, path = "/api/intake/status", tag = "intake",
    params(("email" = String, Query, description = "Client email")),
    responses(
        (status = 200, description = "Intake status, `exists: false` for unknown emails"),
        (status = 400, description = "Email parameter required")
    )
)]
pub async fn status(State(state): State<AppState>, Query(q): Query<EmailQuery>) -> Result<Json<IntakeStatus>, JsonApiError> {
    Ok(Json(intake_service::status(&state.db, &q).await?))
}

#[utoipa::path(
    get, path = "/api/intake/by_email", tag = "intake",
    params(("email" = String, Query, description = "Client email")),
    responses(
        (status = 200, description = "Full profile"),
        (status = 400, description = "Email parameter required"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn by_email(State(state): State<AppState>, Query(q): Query<EmailQuery>) -> Result<Json<IntakeProfileView>, JsonApiError> {
    Ok(Json(intake_service::by_email(&state.db, &q).await?))
}

#[utoipa::path(
    post, path = "/api/intake/{id}/expire", tag = "admin",
    params(("id" = i32, Path, description = "Intake profile ID")),
    responses((status = 200, description = "Expired"), (status = 404, description = "Not Found"))
)]
pub async fn expire(State(state): State<AppState>, Path(id): Path<i32>) -> Result<Json<IntakeProfileView>, JsonApiError> {
    Ok(Json(intake_service::expire_profile(&state.db, id).await?))
}

#[utoipa::path(post, path = "/api/intake/expire-all", tag = "admin", responses((status = 200, description = "Number of profiles expired")))]
pub async fn expire_all(State(state): State<AppState>) -> Result<Json<Affected>, JsonApiError> {
    Ok(Json(Affected { updated: intake_service::expire_all(&state.db).await? }))
}
