use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{
    ContactSubmission, Conversation, Identity, Interest, MatchFilter, Message, NewContact,
    NewIdentity, ParticipantPair, Profile, ProfileData,
};

/// Storage interface for the whole service.
/// Implemented by `PostgresRepository` and by the process-local `MemoryRepository`.
#[async_trait::async_trait]
pub trait MatchRepository: Send + Sync {
    /// Create an identity. A taken username is `AppError::Conflict`.
    async fn create_identity(&self, new: NewIdentity) -> AppResult<Identity>;

    async fn find_identity(&self, id: Uuid) -> AppResult<Option<Identity>>;

    async fn find_identity_by_username(&self, username: &str) -> AppResult<Option<Identity>>;

    /// Delete an identity; its profile, participations, sent messages and
    /// interests go with it. Returns false when nothing was deleted.
    async fn delete_identity(&self, id: Uuid) -> AppResult<bool>;

    /// Create the profile of `user_id`. A second profile is `AppError::Conflict`.
    async fn create_profile(&self, user_id: Uuid, data: &ProfileData) -> AppResult<Profile>;

    async fn find_profile_by_user(&self, user_id: Uuid) -> AppResult<Option<Profile>>;

    /// Replace the writable fields and bump `updated_at`
    async fn update_profile(&self, user_id: Uuid, data: &ProfileData)
        -> AppResult<Option<Profile>>;

    /// Every profile except `exclude_user`'s, newest first, narrowed by `filter`
    async fn search_profiles(
        &self,
        exclude_user: Uuid,
        filter: Option<&MatchFilter>,
    ) -> AppResult<Vec<Profile>>;

    /// Record interest once per ordered pair.
    /// Returns: Some(created) or None when the pair already existed
    async fn insert_interest_if_absent(
        &self,
        sender_id: Uuid,
        receiver_id: Uuid,
    ) -> AppResult<Option<Interest>>;

    /// Atomic find-or-create keyed on the canonical pair.
    /// Returns: (conversation, created)
    async fn insert_conversation_if_absent(
        &self,
        pair: ParticipantPair,
    ) -> AppResult<(Conversation, bool)>;

    async fn find_conversation(&self, id: Uuid) -> AppResult<Option<Conversation>>;

    /// Conversations `user_id` participates in, most recently updated first
    async fn list_conversations_for(&self, user_id: Uuid) -> AppResult<Vec<Conversation>>;

    /// Append a message and bump the conversation's `updated_at`
    async fn insert_message(
        &self,
        conversation_id: Uuid,
        sender_id: Uuid,
        content: &str,
    ) -> AppResult<Message>;

    /// Messages of a conversation, oldest first
    async fn list_messages(&self, conversation_id: Uuid) -> AppResult<Vec<Message>>;

    async fn find_message(&self, id: Uuid) -> AppResult<Option<Message>>;

    /// Set is_read = true. Idempotent.
    async fn mark_message_read(&self, id: Uuid) -> AppResult<Option<Message>>;

    /// Unread messages in the conversation not sent by `viewer`
    async fn count_unread(&self, conversation_id: Uuid, viewer: Uuid) -> AppResult<i64>;

    async fn last_message(&self, conversation_id: Uuid) -> AppResult<Option<Message>>;

    async fn insert_contact(&self, new: &NewContact) -> AppResult<ContactSubmission>;

    async fn health_check(&self) -> AppResult<()>;
}
