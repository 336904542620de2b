use serde::Serialize;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::guards::ConversationParticipant;
use crate::models::{Message, MessageView};
use crate::repository::MatchRepository;

#[derive(Debug, Serialize)]
pub struct MarkReadOutcome {
    pub status: &'static str,
    pub id: Uuid,
    pub is_read: bool,
}

fn message_not_found() -> AppError {
    AppError::NotFound("Message not found".into())
}

pub struct MessageService;

impl MessageService {
    /// Append `content` on behalf of `sender_id` after the participant check
    pub async fn append(
        repo: &dyn MatchRepository,
        sender_id: Uuid,
        conversation_id: Uuid,
        content: &str,
    ) -> AppResult<MessageView> {
        let participant = ConversationParticipant::verify(repo, sender_id, conversation_id).await?;

        let content = content.trim();
        if content.is_empty() {
            return Err(AppError::BadRequest("content: This field may not be blank.".into()));
        }

        let message = repo
            .insert_message(participant.conversation_id(), sender_id, content)
            .await?;

        tracing::info!(
            message_id = %message.id,
            conversation_id = %conversation_id,
            sender_id = %sender_id,
            "message appended"
        );

        Self::view(repo, message).await
    }

    /// Messages of the conversation, oldest first
    pub async fn list(
        repo: &dyn MatchRepository,
        caller: Uuid,
        conversation_id: Uuid,
    ) -> AppResult<Vec<MessageView>> {
        let participant = ConversationParticipant::verify(repo, caller, conversation_id).await?;
        let messages = repo.list_messages(participant.conversation_id()).await?;

        let mut views = Vec::with_capacity(messages.len());
        for message in messages {
            views.push(Self::view(repo, message).await?);
        }
        Ok(views)
    }

    pub async fn retrieve(
        repo: &dyn MatchRepository,
        caller: Uuid,
        conversation_id: Uuid,
        message_id: Uuid,
    ) -> AppResult<MessageView> {
        let participant = ConversationParticipant::verify(repo, caller, conversation_id).await?;
        let message = Self::find_in_conversation(repo, &participant, message_id).await?;
        Self::view(repo, message).await
    }

    /// Flip is_read for a message the caller received.
    ///
    /// Marking one's own message succeeds without changing it, since is_read
    /// means read by the other participant.
    pub async fn mark_read(
        repo: &dyn MatchRepository,
        caller: Uuid,
        conversation_id: Uuid,
        message_id: Uuid,
    ) -> AppResult<MarkReadOutcome> {
        let participant = ConversationParticipant::verify(repo, caller, conversation_id).await?;
        let message = Self::find_in_conversation(repo, &participant, message_id).await?;

        let message = if message.sender_id == caller || message.is_read {
            message
        } else {
            let updated = repo
                .mark_message_read(message.id)
                .await?
                .ok_or_else(message_not_found)?;
            tracing::debug!(message_id = %updated.id, reader = %caller, "message marked read");
            updated
        };

        Ok(MarkReadOutcome {
            status: "message marked as read",
            id: message.id,
            is_read: message.is_read,
        })
    }

    pub(crate) async fn view(repo: &dyn MatchRepository, message: Message) -> AppResult<MessageView> {
        let sender = repo.find_profile_by_user(message.sender_id).await?;
        Ok(MessageView::new(message, sender))
    }

    async fn find_in_conversation(
        repo: &dyn MatchRepository,
        participant: &ConversationParticipant,
        message_id: Uuid,
    ) -> AppResult<Message> {
        repo.find_message(message_id)
            .await?
            .filter(|m| m.conversation_id == participant.conversation_id())
            .ok_or_else(message_not_found)
    }
}
