use crate::error::AppError;
use crate::services::auth_service::{AuthService, LoginRequest, RegisterRequest};
use crate::state::AppState;
use actix_web::{post, web, HttpResponse};

/// Issue a bearer token
/// POST /api/auth/login
#[post("/auth/login")]
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    let session = AuthService::login(state.repo(), body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(session))
}

/// Create an identity and issue a token
/// POST /api/auth/register
#[post("/auth/register")]
pub async fn register(
    state: web::Data<AppState>,
    body: web::Json<RegisterRequest>,
) -> Result<HttpResponse, AppError> {
    let registered = AuthService::register(state.repo(), body.into_inner()).await?;
    Ok(HttpResponse::Created().json(registered))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(login).service(register);
}
