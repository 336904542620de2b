use crate::error::AppError;
use actix_web::{
    error::{JsonPayloadError, PathError, QueryPayloadError},
    http::StatusCode,
    HttpRequest, HttpResponse,
};
use error_types::{error_codes, error_types as kinds, ErrorResponse};

/// Map domain errors to an HTTP status and the shared error body
pub fn map_error(err: &AppError) -> (StatusCode, ErrorResponse) {
    let status =
        StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let (error_type, code) = match err {
        AppError::BadRequest(_) => (kinds::VALIDATION_ERROR, error_codes::VALIDATION_ERROR),
        AppError::SelfReference(_) => (kinds::VALIDATION_ERROR, error_codes::SELF_REFERENCE),
        AppError::Unauthorized => (kinds::AUTHENTICATION_ERROR, error_codes::UNAUTHORIZED),
        AppError::Forbidden(_) => (kinds::AUTHORIZATION_ERROR, error_codes::FORBIDDEN),
        AppError::NotFound(_) => (kinds::NOT_FOUND_ERROR, error_codes::NOT_FOUND),
        AppError::Conflict(_) => (kinds::CONFLICT_ERROR, error_codes::CONFLICT),
        AppError::Database(_) => (kinds::SERVER_ERROR, error_codes::DATABASE_ERROR),
        AppError::Config(_) | AppError::StartServer(_) | AppError::Internal(_) => {
            (kinds::SERVER_ERROR, error_codes::INTERNAL_ERROR)
        }
    };

    // driver and config detail stays in the logs
    let message = if err.is_server_error() {
        tracing::error!(error = %err, "request failed");
        "An internal error occurred".to_string()
    } else {
        err.to_string()
    };

    let response = ErrorResponse::for_status(status.as_u16(), &message, error_type, code);

    (status, response)
}

pub fn into_response(err: &AppError) -> HttpResponse {
    let (status, body) = map_error(err);
    HttpResponse::build(status).json(body)
}

pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::BadRequest(format!("Invalid request body: {err}")).into()
}

pub fn query_error_handler(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::BadRequest(format!("Invalid query string: {err}")).into()
}

pub fn path_error_handler(err: PathError, _req: &HttpRequest) -> actix_web::Error {
    AppError::BadRequest(format!("Invalid path parameter: {err}")).into()
}
