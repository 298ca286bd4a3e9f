pub mod bookings;
pub mod catalog;
pub mod clients;
pub mod disclaimer;
pub mod intake;
pub mod packages;
pub mod schedules;
pub mod sessions;
pub mod staff;

use axum::{
    http::header,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use common::types::Health;
use service::export::CsvExport;

use crate::metrics::encode_metrics;
use crate::openapi::ApiDoc;
use crate::state::AppState;

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "OK", body = crate::openapi::HealthResponse)))]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

async fn metrics() -> impl IntoResponse {
    let (status, body) = encode_metrics();
    (status, [(header::CONTENT_TYPE, "text/plain; version=0.0.4")], body)
}

/// CSV body served as a download.
pub(crate) fn csv_response(export: CsvExport) -> Response {
    let disposition = format!("attachment; filename=\"{}\"", export.filename);
    ([(header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()), (header::CONTENT_DISPOSITION, disposition)], export.body).into_response()
}

fn intake_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(intake::list).post(intake::create))
        .route("/status", get(intake::status))
        .route("/by_email", get(intake::by_email))
        .route("/expire-all", post(intake::expire_all))
        .route("/:id", get(intake::get).patch(intake::update).put(intake::update).delete(intake::delete))
        .route("/:id/expire", post(intake::expire))
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/services", get(catalog::list).post(catalog::create))
        .route("/services/:id", get(catalog::get).patch(catalog::update).put(catalog::update).delete(catalog::delete))
        .route("/staff", get(staff::list).post(staff::create))
        .route("/staff/:id", get(staff::get).patch(staff::update).put(staff::update).delete(staff::delete))
        .route("/clients", get(clients::list).post(clients::create))
        .route("/clients/export", get(clients::export_csv))
        .route("/clients/:id", get(clients::get).patch(clients::update).put(clients::update).delete(clients::delete))
        .route("/bookings", get(bookings::list).post(bookings::create))
        .route("/bookings/slots", get(bookings::slots))
        .route("/bookings/export", get(bookings::export_csv))
        .route("/bookings/bulk-status", post(bookings::bulk_status))
        .route("/bookings/:id", get(bookings::get).patch(bookings::update).put(bookings::update).delete(bookings::delete))
        .route("/bookings/:id/cancel", post(bookings::cancel))
        .route("/business-hours", get(schedules::list_business_hours).post(schedules::create_business_hours))
        .route(
            "/business-hours/:id",
            get(schedules::get_business_hours)
                .patch(schedules::update_business_hours)
                .put(schedules::update_business_hours)
                .delete(schedules::delete_business_hours),
        )
        .route("/staff-schedules", get(schedules::list_staff_schedules).post(schedules::create_staff_schedule))
        .route(
            "/staff-schedules/:id",
            get(schedules::get_staff_schedule)
                .patch(schedules::update_staff_schedule)
                .put(schedules::update_staff_schedule)
                .delete(schedules::delete_staff_schedule),
        )
        .route("/closures", get(schedules::list_closures).post(schedules::create_closure))
        .route(
            "/closures/:id",
            get(schedules::get_closure).patch(schedules::update_closure).put(schedules::update_closure).delete(schedules::delete_closure),
        )
        .route("/staff-leave", get(schedules::list_staff_leave).post(schedules::create_staff_leave))
        .route(
            "/staff-leave/:id",
            get(schedules::get_staff_leave)
                .patch(schedules::update_staff_leave)
                .put(schedules::update_staff_leave)
                .delete(schedules::delete_staff_leave),
        )
        .route("/sessions", get(sessions::list).post(sessions::create))
        .route("/sessions/:id", get(sessions::get).patch(sessions::update).put(sessions::update).delete(sessions::delete))
        .route("/sessions/:id/enroll", post(sessions::enroll))
        .route("/sessions/:id/unenroll", post(sessions::unenroll))
        .route("/packages", get(packages::list).post(packages::create))
        .route("/packages/:id", get(packages::get).patch(packages::update).put(packages::update).delete(packages::delete))
        .nest("/intake", intake_routes())
        .nest("/intake-profiles", intake_routes())
        .route("/intake-disclaimer", get(disclaimer::list).post(disclaimer::create))
        .route("/intake-disclaimer/active", get(disclaimer::active))
        .route("/intake-disclaimer/:id", get(disclaimer::get))
        .route("/intake-disclaimer/:id/activate", post(disclaimer::activate))
}

/// Build the full application router: REST API, health, metrics and docs.
pub fn build_router(state: AppState, cors: CorsLayer) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .nest("/api", api_routes())
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                // 5xx and transport failures
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
