use crate::error::AppError;
use crate::models::NewContact;
use crate::services::contact_service::{ContactService, CONTACT_ACK};
use crate::state::AppState;
use actix_web::{post, web, HttpResponse};

/// Unauthenticated contact form intake
/// POST /api/contact
#[post("/contact")]
pub async fn submit_contact(
    state: web::Data<AppState>,
    body: web::Json<NewContact>,
) -> Result<HttpResponse, AppError> {
    ContactService::submit(state.repo(), body.into_inner()).await?;
    Ok(HttpResponse::Created().json(serde_json::json!({ "message": CONTACT_ACK })))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(submit_contact);
}
