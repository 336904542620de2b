use crate::state::AppState;
use actix_web::{get, web, HttpResponse};
use error_types::{error_codes, error_types as kinds, ErrorResponse};

#[get("/health")]
pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    match state.repo().health_check().await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({ "status": "ok" })),
        Err(e) => {
            tracing::error!(error = %e, "health check failed");
            HttpResponse::ServiceUnavailable().json(ErrorResponse::for_status(
                503,
                "Storage backend unavailable",
                kinds::SERVICE_UNAVAILABLE_ERROR,
                error_codes::SERVICE_UNAVAILABLE,
            ))
        }
    }
}

#[get("/metrics")]
pub async fn metrics() -> HttpResponse {
    match actix_middleware::metrics::render() {
        Ok(body) => HttpResponse::Ok()
            .content_type("text/plain; version=0.0.4")
            .body(body),
        Err(e) => {
            tracing::error!(error = %e, "failed to encode metrics");
            HttpResponse::InternalServerError().finish()
        }
    }
}
