//! Authorization guards
//!
//! Every operation scoped to a conversation goes through
//! [`ConversationParticipant::verify`] before touching it.

use actix_middleware::UserId;
use actix_web::{web, Error, FromRequest, HttpMessage, HttpRequest};
use std::future::Future;
use std::pin::Pin;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::Conversation;
use crate::repository::MatchRepository;
use crate::state::AppState;

/// An authenticated caller whose identity still exists.
///
/// A token outlives the identity it was issued for when the account is
/// deleted, so the id from the claims is checked against the store.
#[derive(Debug, Clone, Copy)]
pub struct User {
    pub id: Uuid,
}

impl User {
    pub async fn resolve(
        repo: &dyn MatchRepository,
        user_id: Option<Uuid>,
    ) -> Result<Self, AppError> {
        let id = user_id.ok_or(AppError::Unauthorized)?;
        if repo.find_identity(id).await?.is_none() {
            tracing::info!(user_id = %id, "token refers to a deleted identity");
            return Err(AppError::Unauthorized);
        }
        Ok(User { id })
    }
}

impl FromRequest for User {
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        let user_id = req.extensions().get::<UserId>().map(|u| u.0);
        let state = req.app_data::<web::Data<AppState>>().cloned();
        Box::pin(async move {
            let state = state
                .ok_or_else(|| AppError::Internal("application state not configured".into()))?;
            Ok(User::resolve(state.repo(), user_id).await?)
        })
    }
}

/// A caller verified to be a participant of `conversation`
#[derive(Debug, Clone)]
pub struct ConversationParticipant {
    pub user_id: Uuid,
    pub conversation: Conversation,
}

impl ConversationParticipant {
    /// NOT_FOUND when the conversation does not exist,
    /// FORBIDDEN when `user_id` is not among its current participants.
    pub async fn verify(
        repo: &dyn MatchRepository,
        user_id: Uuid,
        conversation_id: Uuid,
    ) -> Result<Self, AppError> {
        let conversation = repo
            .find_conversation(conversation_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Conversation not found".into()))?;

        if !conversation.is_participant(user_id) {
            tracing::warn!(
                user_id = %user_id,
                conversation_id = %conversation_id,
                "non-participant denied access to conversation"
            );
            return Err(AppError::Forbidden(
                "You are not a participant in this conversation".into(),
            ));
        }

        Ok(Self {
            user_id,
            conversation,
        })
    }

    pub fn conversation_id(&self) -> Uuid {
        self.conversation.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewIdentity, ParticipantPair};
    use crate::repository::MemoryRepository;

    async fn identity(repo: &MemoryRepository, username: &str) -> Uuid {
        repo.create_identity(NewIdentity {
            username: username.into(),
            email: format!("{username}@example.com"),
            first_name: String::new(),
            last_name: String::new(),
            password_hash: "x".into(),
        })
        .await
        .unwrap()
        .id
    }

    #[tokio::test]
    async fn test_participant_is_admitted() {
        let repo = MemoryRepository::new();
        let a = identity(&repo, "ann").await;
        let b = identity(&repo, "bob").await;
        let (conv, _) = repo
            .insert_conversation_if_absent(ParticipantPair::new(a, b).unwrap())
            .await
            .unwrap();

        let guard = ConversationParticipant::verify(&repo, b, conv.id).await.unwrap();
        assert_eq!(guard.conversation_id(), conv.id);
        assert_eq!(guard.user_id, b);
    }

    #[tokio::test]
    async fn test_outsider_is_forbidden() {
        let repo = MemoryRepository::new();
        let a = identity(&repo, "ann").await;
        let b = identity(&repo, "bob").await;
        let c = identity(&repo, "cat").await;
        let (conv, _) = repo
            .insert_conversation_if_absent(ParticipantPair::new(a, b).unwrap())
            .await
            .unwrap();

        let err = ConversationParticipant::verify(&repo, c, conv.id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_user_requires_live_identity() {
        let repo = MemoryRepository::new();
        let a = identity(&repo, "ann").await;

        let user = User::resolve(&repo, Some(a)).await.unwrap();
        assert_eq!(user.id, a);

        assert!(matches!(
            User::resolve(&repo, None).await.unwrap_err(),
            AppError::Unauthorized
        ));

        repo.delete_identity(a).await.unwrap();
        assert!(matches!(
            User::resolve(&repo, Some(a)).await.unwrap_err(),
            AppError::Unauthorized
        ));
    }

    #[tokio::test]
    async fn test_missing_conversation_is_not_found() {
        let repo = MemoryRepository::new();
        let err = ConversationParticipant::verify(&repo, Uuid::new_v4(), Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
