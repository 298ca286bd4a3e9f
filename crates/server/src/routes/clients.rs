use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Response,
    Json,
};
use serde::Deserialize;
use service::{
    clock,
    db::client_service::{self, ClientFilter, ClientInput, ClientPatch, ClientView},
    export,
};

use super::csv_response;
use crate::errors::JsonApiError;
use crate::metrics::EXPORTS_TOTAL;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ExportQuery {
    /// Comma-separated client ids; all clients when absent.
    pub ids: Option<String>,
}

#[utoipa::path(
    get, path = "/api/clients", tag = "clients",
    params(
        ("search" = Option<String>, Query, description = "Matches name, email or phone"),
        ("page" = Option<u32>, Query, description = "1-based page"),
        ("per_page" = Option<u32>, Query, description = "Page size (max 100)")
    ),
    responses((status = 200, description = "List OK"))
)]
pub async fn list(State(state): State<AppState>, Query(f): Query<ClientFilter>) -> Result<Json<Vec<ClientView>>, JsonApiError> {
    Ok(Json(client_service::list_clients(&state.db, state.policy.rules.offset, &f).await?))
}

#[utoipa::path(
    post, path = "/api/clients", tag = "clients",
    request_body = crate::openapi::ClientInputDoc,
    responses(
        (status = 201, description = "Created"),
        (status = 400, description = "Validation Error"),
        (status = 409, description = "Email already in use")
    )
)]
pub async fn create(State(state): State<AppState>, Json(input): Json<ClientInput>) -> Result<(StatusCode, Json<ClientView>), JsonApiError> {
    let v = client_service::create_client(&state.db, input).await?;
    Ok((StatusCode::CREATED, Json(v)))
}

#[utoipa::path(
    get, path = "/api/clients/{id}", tag = "clients",
    params(("id" = i32, Path, description = "Client ID")),
    responses(
        (status = 200, description = "OK"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get(State(state): State<AppState>, Path(id): Path<i32>) -> Result<Json<ClientView>, JsonApiError> {
    Ok(Json(client_service::get_client(&state.db, state.policy.rules.offset, id).await?))
}

#[utoipa::path(
    patch, path = "/api/clients/{id}", tag = "clients",
    params(("id" = i32, Path, description = "Client ID")),
    request_body = crate::openapi::ClientPatchDoc,
    responses(
        (status = 200, description = "Updated"),
        (status = 400, description = "Validation Error"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update(State(state): State<AppState>, Path(id): Path<i32>, Json(patch): Json<ClientPatch>) -> Result<Json<ClientView>, JsonApiError> {
    Ok(Json(client_service::update_client(&state.db, state.policy.rules.offset, id, patch).await?))
}

/// Also deletes the client's bookings.
#[utoipa::path(
    delete, path = "/api/clients/{id}", tag = "clients",
    params(("id" = i32, Path, description = "Client ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete(State(state): State<AppState>, Path(id): Path<i32>) -> Result<StatusCode, JsonApiError> {
    client_service::delete_client(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get, path = "/api/clients/export", tag = "admin",
    params(ExportQuery),
    responses(
        (status = 200, description = "CSV attachment", body = String, content_type = "text/csv"),
        (status = 400, description = "Malformed ids")
    )
)]
pub async fn export_csv(State(state): State<AppState>, Query(q): Query<ExportQuery>) -> Result<Response, JsonApiError> {
    let ids = export::parse_ids(q.ids.as_deref())?;
    let now = clock::now(state.policy.rules.offset);
    let out = export::clients_csv(&state.db, &state.booking.currency_symbol, ids.as_deref(), now).await?;
    EXPORTS_TOTAL.with_label_values(&["clients"]).inc();
    Ok(csv_response(out))
}
