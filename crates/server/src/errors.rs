use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use service::errors::ServiceError;
use tracing::{error, warn};

/// Error body shared by every JSON endpoint: `{"error": .., "detail": ..}`.
#[derive(Debug)]
pub struct JsonApiError {
    pub status: StatusCode,
    pub error: &'static str,
    pub detail: Option<String>,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<&'a str>,
}

impl JsonApiError {
    pub fn new(status: StatusCode, error: &'static str, detail: Option<String>) -> Self { Self { status, error, detail } }

    pub fn bad_request(detail: impl Into<String>) -> Self { Self::new(StatusCode::BAD_REQUEST, "Validation Error", Some(detail.into())) }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody { error: self.error, detail: self.detail.as_deref() };
        (self.status, Json(body)).into_response()
    }
}

impl From<ServiceError> for JsonApiError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::Validation(msg) => JsonApiError::bad_request(msg),
            ServiceError::Model(m) => JsonApiError::bad_request(strip_prefix(&m.to_string())),
            ServiceError::NotFound(msg) => JsonApiError::new(StatusCode::NOT_FOUND, "Not Found", Some(msg)),
            ServiceError::Conflict(msg) => {
                warn!(detail = %msg, "request_conflict");
                JsonApiError::new(StatusCode::CONFLICT, "Conflict", Some(msg))
            }
            ServiceError::Db(msg) => {
                error!(error = %msg, "database_error");
                JsonApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error", Some(msg))
            }
        }
    }
}

/// `"validation error: name: required"` reads better as `"name: required"`.
fn strip_prefix(msg: &str) -> String {
    msg.strip_prefix("validation error: ").unwrap_or(msg).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::errors::ModelError;

    #[test]
    fn service_errors_map_to_status() {
        let cases = [
            (ServiceError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (ServiceError::Model(ModelError::field("name", "required")), StatusCode::BAD_REQUEST),
            (ServiceError::NotFound("booking not found".into()), StatusCode::NOT_FOUND),
            (ServiceError::Conflict("slot taken".into()), StatusCode::CONFLICT),
            (ServiceError::Db("boom".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(JsonApiError::from(err).status, status);
        }
    }

    #[test]
    fn model_errors_drop_the_prefix() {
        let e = JsonApiError::from(ServiceError::Model(ModelError::field("name", "required")));
        assert_eq!(e.detail.as_deref(), Some("name: required"));
    }
}
