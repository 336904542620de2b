use crate::error::AppError;
use crate::middleware::guards::User;
use crate::models::SendMessageRequest;
use crate::services::MessageService;
use crate::state::AppState;
use actix_web::{get, patch, post, web, HttpResponse};
use uuid::Uuid;

/// GET /api/conversations/{id}/messages
#[get("/conversations/{id}/messages")]
pub async fn list_messages(
    state: web::Data<AppState>,
    user: User,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let messages = MessageService::list(state.repo(), user.id, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(messages))
}

/// GET /api/conversations/{id}/messages/{mid}
#[get("/conversations/{id}/messages/{mid}")]
pub async fn get_message(
    state: web::Data<AppState>,
    user: User,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse, AppError> {
    let (conversation_id, message_id) = path.into_inner();
    let message =
        MessageService::retrieve(state.repo(), user.id, conversation_id, message_id).await?;
    Ok(HttpResponse::Ok().json(message))
}

/// POST /api/conversations/{id}/send_message
#[post("/conversations/{id}/send_message")]
pub async fn send_message(
    state: web::Data<AppState>,
    user: User,
    path: web::Path<Uuid>,
    body: web::Json<SendMessageRequest>,
) -> Result<HttpResponse, AppError> {
    let message =
        MessageService::append(state.repo(), user.id, path.into_inner(), &body.content).await?;
    Ok(HttpResponse::Created().json(message))
}

/// PATCH /api/conversations/{id}/messages/{mid}/mark_read
#[patch("/conversations/{id}/messages/{mid}/mark_read")]
pub async fn mark_read(
    state: web::Data<AppState>,
    user: User,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse, AppError> {
    let (conversation_id, message_id) = path.into_inner();
    let outcome =
        MessageService::mark_read(state.repo(), user.id, conversation_id, message_id).await?;
    Ok(HttpResponse::Ok().json(outcome))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_messages)
        .service(get_message)
        .service(send_message)
        .service(mark_read);
}
