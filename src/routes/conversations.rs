use crate::error::AppError;
use crate::middleware::guards::User;
use crate::services::ConversationService;
use crate::state::AppState;
use actix_web::{get, post, web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct ResolveConversationRequest {
    pub other_user_id: Option<Uuid>,
}

/// GET /api/conversations
#[get("/conversations")]
pub async fn list_conversations(
    state: web::Data<AppState>,
    user: User,
) -> Result<HttpResponse, AppError> {
    let conversations = ConversationService::list(state.repo(), user.id).await?;
    Ok(HttpResponse::Ok().json(conversations))
}

/// Find or create the conversation with `other_user_id`.
/// 201 when created, 200 when it already existed.
/// POST /api/conversations
#[post("/conversations")]
pub async fn resolve_conversation(
    state: web::Data<AppState>,
    user: User,
    body: web::Json<ResolveConversationRequest>,
) -> Result<HttpResponse, AppError> {
    let other_user_id = body
        .other_user_id
        .ok_or_else(|| AppError::BadRequest("other_user_id is required".into()))?;

    let (view, created) = ConversationService::resolve(state.repo(), user.id, other_user_id).await?;

    if created {
        Ok(HttpResponse::Created().json(view))
    } else {
        Ok(HttpResponse::Ok().json(view))
    }
}

/// GET /api/conversations/{id}
#[get("/conversations/{id}")]
pub async fn get_conversation(
    state: web::Data<AppState>,
    user: User,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let view = ConversationService::retrieve(state.repo(), user.id, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(view))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_conversations)
        .service(resolve_conversation)
        .service(get_conversation);
}
