//! Business hours, staff schedules, closures and staff leave.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use service::db::schedule_service::{
    self as schedules, BusinessHoursInput, BusinessHoursPatch, BusinessHoursView, ClosureFilter, ClosureInput, ClosurePatch,
    ClosureView, StaffFilterQuery, StaffLeaveInput, StaffLeavePatch, StaffLeaveView, StaffScheduleInput, StaffSchedulePatch,
    StaffScheduleView,
};

use crate::errors::JsonApiError;
use crate::state::AppState;

type Created<T> = Result<(StatusCode, Json<T>), JsonApiError>;

#[utoipa::path(get, path = "/api/business-hours", tag = "schedules", responses((status = 200, description = "Ordered Monday first")))]
pub async fn list_business_hours(State(state): State<AppState>) -> Result<Json<Vec<BusinessHoursView>>, JsonApiError> {
    Ok(Json(schedules::list_business_hours(&state.db).await?))
}

#[utoipa::path(
    post, path = "/api/business-hours", tag = "schedules",
    request_body = crate::openapi::BusinessHoursInputDoc,
    responses(
        (status = 201, description = "Created"),
        (status = 400, description = "Validation Error"),
        (status = 409, description = "Day already configured")
    )
)]
pub async fn create_business_hours(State(state): State<AppState>, Json(input): Json<BusinessHoursInput>) -> Created<BusinessHoursView> {
    Ok((StatusCode::CREATED, Json(schedules::create_business_hours(&state.db, input).await?)))
}

#[utoipa::path(
    get, path = "/api/business-hours/{id}", tag = "schedules",
    params(("id" = i32, Path, description = "Business hours ID")),
    responses((status = 200, description = "OK"), (status = 404, description = "Not Found"))
)]
pub async fn get_business_hours(State(state): State<AppState>, Path(id): Path<i32>) -> Result<Json<BusinessHoursView>, JsonApiError> {
    Ok(Json(schedules::get_business_hours(&state.db, id).await?))
}

#[utoipa::path(
    patch, path = "/api/business-hours/{id}", tag = "schedules",
    params(("id" = i32, Path, description = "Business hours ID")),
    request_body = crate::openapi::BusinessHoursPatchDoc,
    responses(
        (status = 200, description = "Updated"),
        (status = 400, description = "Validation Error"),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Day already configured")
    )
)]
pub async fn update_business_hours(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(patch): Json<BusinessHoursPatch>,
) -> Result<Json<BusinessHoursView>, JsonApiError> {
    Ok(Json(schedules::update_business_hours(&state.db, id, patch).await?))
}

#[utoipa::path(
    delete, path = "/api/business-hours/{id}", tag = "schedules",
    params(("id" = i32, Path, description = "Business hours ID")),
    responses((status = 204, description = "Deleted"), (status = 404, description = "Not Found"))
)]
pub async fn delete_business_hours(State(state): State<AppState>, Path(id): Path<i32>) -> Result<StatusCode, JsonApiError> {
    schedules::delete_business_hours(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get, path = "/api/staff-schedules", tag = "schedules",
    params(("staff" = Option<i32>, Query, description = "Staff ID")),
    responses((status = 200, description = "List OK"))
)]
pub async fn list_staff_schedules(
    State(state): State<AppState>,
    Query(q): Query<StaffFilterQuery>,
) -> Result<Json<Vec<StaffScheduleView>>, JsonApiError> {
    Ok(Json(schedules::list_staff_schedules(&state.db, &q).await?))
}

#[utoipa::path(
    post, path = "/api/staff-schedules", tag = "schedules",
    request_body = crate::openapi::StaffScheduleInputDoc,
    responses(
        (status = 201, description = "Created"),
        (status = 400, description = "Validation Error"),
        (status = 404, description = "Unknown staff"),
        (status = 409, description = "Day already configured for this staff member")
    )
)]
pub async fn create_staff_schedule(State(state): State<AppState>, Json(input): Json<StaffScheduleInput>) -> Created<StaffScheduleView> {
    Ok((StatusCode::CREATED, Json(schedules::create_staff_schedule(&state.db, input).await?)))
}

#[utoipa::path(
    get, path = "/api/staff-schedules/{id}", tag = "schedules",
    params(("id" = i32, Path, description = "Staff schedule ID")),
    responses((status = 200, description = "OK"), (status = 404, description = "Not Found"))
)]
pub async fn get_staff_schedule(State(state): State<AppState>, Path(id): Path<i32>) -> Result<Json<StaffScheduleView>, JsonApiError> {
    Ok(Json(schedules::get_staff_schedule(&state.db, id).await?))
}

#[utoipa::path(
    patch, path = "/api/staff-schedules/{id}", tag = "schedules",
    params(("id" = i32, Path, description = "Staff schedule ID")),
    request_body = crate::openapi::StaffSchedulePatchDoc,
    responses(
        (status = 200, description = "Updated"),
        (status = 400, description = "Validation Error"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update_staff_schedule(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(patch): Json<StaffSchedulePatch>,
) -> Result<Json<StaffScheduleView>, JsonApiError> {
    Ok(Json(schedules::update_staff_schedule(&state.db, id, patch).await?))
}

#[utoipa::path(
    delete, path = "/api/staff-schedules/{id}", tag = "schedules",
    params(("id" = i32, Path, description = "Staff schedule ID")),
    responses((status = 204, description = "Deleted"), (status = 404, description = "Not Found"))
)]
pub async fn delete_staff_schedule(State(state): State<AppState>, Path(id): Path<i32>) -> Result<StatusCode, JsonApiError> {
    schedules::delete_staff_schedule(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get, path = "/api/closures", tag = "schedules",
    params(
        ("date_from" = Option<String>, Query, description = "YYYY-MM-DD, inclusive"),
        ("date_to" = Option<String>, Query, description = "YYYY-MM-DD, inclusive")
    ),
    responses((status = 200, description = "Newest first"))
)]
pub async fn list_closures(State(state): State<AppState>, Query(f): Query<ClosureFilter>) -> Result<Json<Vec<ClosureView>>, JsonApiError> {
    Ok(Json(schedules::list_closures(&state.db, &f).await?))
}

#[utoipa::path(
    post, path = "/api/closures", tag = "schedules",
    request_body = crate::openapi::ClosureInputDoc,
    responses((status = 201, description = "Created"), (status = 400, description = "Validation Error"))
)]
pub async fn create_closure(State(state): State<AppState>, Json(input): Json<ClosureInput>) -> Created<ClosureView> {
    Ok((StatusCode::CREATED, Json(schedules::create_closure(&state.db, input).await?)))
}

#[utoipa::path(
    get, path = "/api/closures/{id}", tag = "schedules",
    params(("id" = i32, Path, description = "Closure ID")),
    responses((status = 200, description = "OK"), (status = 404, description = "Not Found"))
)]
pub async fn get_closure(State(state): State<AppState>, Path(id): Path<i32>) -> Result<Json<ClosureView>, JsonApiError> {
    Ok(Json(schedules::get_closure(&state.db, id).await?))
}

#[utoipa::path(
    patch, path = "/api/closures/{id}", tag = "schedules",
    params(("id" = i32, Path, description = "Closure ID")),
    request_body = crate::openapi::ClosurePatchDoc,
    responses(
        (status = 200, description = "Updated"),
        (status = 400, description = "Validation Error"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update_closure(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(patch): Json<ClosurePatch>,
) -> Result<Json<ClosureView>, JsonApiError> {
    Ok(Json(schedules::update_closure(&state.db, id, patch).await?))
}

#[utoipa::path(
    delete, path = "/api/closures/{id}", tag = "schedules",
    params(("id" = i32, Path, description = "Closure ID")),
    responses((status = 204, description = "Deleted"), (status = 404, description = "Not Found"))
)]
pub async fn delete_closure(State(state): State<AppState>, Path(id): Path<i32>) -> Result<StatusCode, JsonApiError> {
    schedules::delete_closure(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get, path = "/api/staff-leave", tag = "schedules",
    params(("staff" = Option<i32>, Query, description = "Staff ID")),
    responses((status = 200, description = "Most recent first"))
)]
pub async fn list_staff_leave(State(state): State<AppState>, Query(q): Query<StaffFilterQuery>) -> Result<Json<Vec<StaffLeaveView>>, JsonApiError> {
    Ok(Json(schedules::list_staff_leave(&state.db, &q).await?))
}

#[utoipa::path(
    post, path = "/api/staff-leave", tag = "schedules",
    request_body = crate::openapi::StaffLeaveInputDoc,
    responses(
        (status = 201, description = "Created"),
        (status = 400, description = "Validation Error"),
        (status = 404, description = "Unknown staff")
    )
)]
pub async fn create_staff_leave(State(state): State<AppState>, Json(input): Json<StaffLeaveInput>) -> Created<StaffLeaveView> {
    Ok((StatusCode::CREATED, Json(schedules::create_staff_leave(&state.db, input).await?)))
}

#[utoipa::path(
    get, path = "/api/staff-leave/{id}", tag = "schedules",
    params(("id" = i32, Path, description = "Staff leave ID")),
    responses((status = 200, description = "OK"), (status = 404, description = "Not Found"))
)]
pub async fn get_staff_leave(State(state): State<AppState>, Path(id): Path<i32>) -> Result<Json<StaffLeaveView>, JsonApiError> {
    Ok(Json(schedules::get_staff_leave(&state.db, id).await?))
}

#[utoipa::path(
    patch, path = "/api/staff-leave/{id}", tag = "schedules",
    params(("id" = i32, Path, description = "Staff leave ID")),
    request_body = crate::openapi::StaffLeavePatchDoc,
    responses(
        (status = 200, description = "Updated"),
        (status = 400, description = "Validation Error"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update_staff_leave(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(patch): Json<StaffLeavePatch>,
) -> Result<Json<StaffLeaveView>, JsonApiError> {
    Ok(Json(schedules::update_staff_leave(&state.db, id, patch).await?))
}

#[utoipa::path(
    delete, path = "/api/staff-leave/{id}", tag = "schedules",
    params(("id" = i32, Path, description = "Staff leave ID")),
    responses((status = 204, description = "Deleted"), (status = 404, description = "Not Found"))
)]
pub async fn delete_staff_leave(State(state): State<AppState>, Path(id): Path<i32>) -> Result<StatusCode, JsonApiError> {
    schedules::delete_staff_leave(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
