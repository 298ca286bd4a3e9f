use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Response,
    Json,
};
use common::types::Affected;
use service::{
    clock,
    db::booking_service::{self, BookingFilter, BookingInput, BookingPatch, BookingView, BulkStatusInput, SlotList, SlotQuery},
    errors::ServiceError,
    export,
};

use super::{clients::ExportQuery, csv_response};
use crate::errors::JsonApiError;
use crate::metrics::{BOOKINGS_CANCELLED_TOTAL, BOOKINGS_CREATED_TOTAL, EXPORTS_TOTAL, SLOT_CONFLICTS_TOTAL};
use crate::state::AppState;

#[utoipa::path(
    get, path = "/api/bookings", tag = "bookings",
    params(
        ("status" = Option<String>, Query, description = "pending, confirmed, completed, cancelled or no_show"),
        ("staff" = Option<i32>, Query, description = "Staff ID"),
        ("service" = Option<i32>, Query, description = "Service ID"),
        ("client" = Option<i32>, Query, description = "Client ID"),
        ("date_from" = Option<String>, Query, description = "YYYY-MM-DD, inclusive"),
        ("date_to" = Option<String>, Query, description = "YYYY-MM-DD, inclusive"),
        ("search" = Option<String>, Query, description = "Client name / email or notes"),
        ("page" = Option<u32>, Query, description = "1-based page"),
        ("per_page" = Option<u32>, Query, description = "Page size (max 100)")
    ),
    responses(
        (status = 200, description = "List OK"),
        (status = 400, description = "Unknown status")
    )
)]
pub async fn list(State(state): State<AppState>, Query(f): Query<BookingFilter>) -> Result<Json<Vec<BookingView>>, JsonApiError> {
    Ok(Json(booking_service::list_bookings(&state.db, &state.policy, &f).await?))
}

#[utoipa::path(
    post, path = "/api/bookings", tag = "bookings",
    request_body = crate::openapi::BookingInputDoc,
    responses(
        (status = 201, description = "Created"),
        (status = 400, description = "Validation Error"),
        (status = 409, description = "Time slot not available")
    )
)]
pub async fn create(State(state): State<AppState>, Json(input): Json<BookingInput>) -> Result<(StatusCode, Json<BookingView>), JsonApiError> {
    match booking_service::create_booking(&state.db, &state.policy, input).await {
        Ok(v) => {
            BOOKINGS_CREATED_TOTAL.inc();
            Ok((StatusCode::CREATED, Json(v)))
        }
        Err(e @ ServiceError::Conflict(_)) => {
            SLOT_CONFLICTS_TOTAL.inc();
            Err(e.into())
        }
        Err(e) => Err(e.into()),
    }
}

#[utoipa::path(
    get, path = "/api/bookings/{id}", tag = "bookings",
    params(("id" = i32, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "OK"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get(State(state): State<AppState>, Path(id): Path<i32>) -> Result<Json<BookingView>, JsonApiError> {
    Ok(Json(booking_service::get_booking(&state.db, &state.policy, id).await?))
}

#[utoipa::path(
    patch, path = "/api/bookings/{id}", tag = "bookings",
    params(("id" = i32, Path, description = "Booking ID")),
    request_body = crate::openapi::BookingPatchDoc,
    responses(
        (status = 200, description = "Updated"),
        (status = 400, description = "Validation Error"),
        (status = 404, description = "Not Found"),
        (status = 409, description = "New time slot not available")
    )
)]
pub async fn update(State(state): State<AppState>, Path(id): Path<i32>, Json(patch): Json<BookingPatch>) -> Result<Json<BookingView>, JsonApiError> {
    Ok(Json(booking_service::update_booking(&state.db, &state.policy, id, patch).await?))
}

#[utoipa::path(
    delete, path = "/api/bookings/{id}", tag = "bookings",
    params(("id" = i32, Path, description = "Booking ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete(State(state): State<AppState>, Path(id): Path<i32>) -> Result<StatusCode, JsonApiError> {
    booking_service::delete_booking(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post, path = "/api/bookings/{id}/cancel", tag = "bookings",
    params(("id" = i32, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Cancelled"),
        (status = 400, description = "Completed bookings cannot be cancelled"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn cancel(State(state): State<AppState>, Path(id): Path<i32>) -> Result<Json<BookingView>, JsonApiError> {
    let (v, changed) = booking_service::cancel_booking(&state.db, &state.policy, id).await?;
    if changed {
        BOOKINGS_CANCELLED_TOTAL.inc();
    }
    Ok(Json(v))
}

#[utoipa::path(
    get, path = "/api/bookings/slots", tag = "bookings",
    params(
        ("staff_id" = i32, Query, description = "Staff ID"),
        ("service_id" = i32, Query, description = "Service ID"),
        ("date" = String, Query, description = "YYYY-MM-DD")
    ),
    responses(
        (status = 200, description = "Every candidate slot with availability"),
        (status = 404, description = "Unknown staff or service")
    )
)]
pub async fn slots(State(state): State<AppState>, Query(q): Query<SlotQuery>) -> Result<Json<SlotList>, JsonApiError> {
    Ok(Json(booking_service::slots(&state.db, &state.policy, &q).await?))
}

#[utoipa::path(
    post, path = "/api/bookings/bulk-status", tag = "admin",
    request_body = crate::openapi::BulkStatusDoc,
    responses(
        (status = 200, description = "Number of bookings updated"),
        (status = 400, description = "Validation Error")
    )
)]
pub async fn bulk_status(State(state): State<AppState>, Json(input): Json<BulkStatusInput>) -> Result<Json<Affected>, JsonApiError> {
    let updated = booking_service::bulk_update_status(&state.db, input).await?;
    Ok(Json(Affected { updated }))
}

#[utoipa::path(
    get, path = "/api/bookings/export", tag = "admin",
    params(ExportQuery),
    responses(
        (status = 200, description = "CSV attachment", body = String, content_type = "text/csv"),
        (status = 400, description = "Malformed filter or ids")
    )
)]
pub async fn export_csv(
    State(state): State<AppState>,
    Query(f): Query<BookingFilter>,
    Query(q): Query<ExportQuery>,
) -> Result<Response, JsonApiError> {
    let ids = export::parse_ids(q.ids.as_deref())?;
    let now = clock::now(state.policy.rules.offset);
    let out = export::bookings_csv(&state.db, &state.policy, &state.booking.currency_symbol, &f, ids.as_deref(), now).await?;
    EXPORTS_TOTAL.with_label_values(&["bookings"]).inc();
    Ok(csv_response(out))
}
