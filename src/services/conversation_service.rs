use std::collections::HashSet;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::guards::ConversationParticipant;
use crate::models::{Conversation, ConversationView, ParticipantPair};
use crate::repository::MatchRepository;
use crate::services::message_service::MessageService;

/// Keep the first conversation per other participant, in input order.
///
/// Conversations without another live participant are dropped. The pair
/// constraint prevents new duplicates; this still covers rows that predate it.
pub fn dedup_by_other_participant(
    conversations: Vec<Conversation>,
    viewer: Uuid,
) -> Vec<Conversation> {
    let mut seen = HashSet::new();
    conversations
        .into_iter()
        .filter(|c| match c.other_participant(viewer) {
            Some(other) => seen.insert(other),
            None => false,
        })
        .collect()
}

pub struct ConversationService;

impl ConversationService {
    /// Return the single conversation between `caller` and `other_user_id`,
    /// creating it if absent.
    /// Returns: (view, created)
    pub async fn resolve(
        repo: &dyn MatchRepository,
        caller: Uuid,
        other_user_id: Uuid,
    ) -> AppResult<(ConversationView, bool)> {
        let pair = ParticipantPair::new(caller, other_user_id)?;

        if repo.find_profile_by_user(other_user_id).await?.is_none() {
            return Err(AppError::NotFound(format!(
                "Profile for user ID {other_user_id} not found"
            )));
        }
        if repo.find_profile_by_user(caller).await?.is_none() {
            return Err(AppError::BadRequest(
                "Your profile is not set up properly".into(),
            ));
        }

        let (conversation, created) = repo.insert_conversation_if_absent(pair).await?;
        if created {
            tracing::info!(
                conversation_id = %conversation.id,
                caller = %caller,
                other = %other_user_id,
                "conversation created"
            );
        } else {
            tracing::debug!(
                conversation_id = %conversation.id,
                caller = %caller,
                "existing conversation reused"
            );
        }

        let view = Self::build_view(repo, conversation, caller).await?;
        Ok((view, created))
    }

    /// Conversations of `viewer`, most recently active first, one per other participant
    pub async fn list(repo: &dyn MatchRepository, viewer: Uuid) -> AppResult<Vec<ConversationView>> {
        let conversations = repo.list_conversations_for(viewer).await?;
        let total = conversations.len();
        let unique = dedup_by_other_participant(conversations, viewer);

        if unique.len() != total {
            tracing::debug!(
                viewer = %viewer,
                total,
                shown = unique.len(),
                "collapsed duplicate or degenerate conversations"
            );
        }

        let mut views = Vec::with_capacity(unique.len());
        for conversation in unique {
            views.push(Self::build_view(repo, conversation, viewer).await?);
        }
        Ok(views)
    }

    pub async fn retrieve(
        repo: &dyn MatchRepository,
        caller: Uuid,
        conversation_id: Uuid,
    ) -> AppResult<ConversationView> {
        let participant = ConversationParticipant::verify(repo, caller, conversation_id).await?;
        Self::build_view(repo, participant.conversation, caller).await
    }

    async fn build_view(
        repo: &dyn MatchRepository,
        conversation: Conversation,
        viewer: Uuid,
    ) -> AppResult<ConversationView> {
        let mut participants = Vec::with_capacity(conversation.participants.len());
        for user_id in &conversation.participants {
            if let Some(profile) = repo.find_profile_by_user(*user_id).await? {
                participants.push(profile);
            }
        }

        let other_participant = conversation
            .other_participant(viewer)
            .and_then(|other| participants.iter().find(|p| p.user_id() == other).cloned());

        let last_message = match repo.last_message(conversation.id).await? {
            Some(message) => Some(MessageService::view(repo, message).await?),
            None => None,
        };

        let unread_count = repo.count_unread(conversation.id, viewer).await?;

        Ok(ConversationView {
            id: conversation.id,
            participants,
            other_participant,
            created_at: conversation.created_at,
            updated_at: conversation.updated_at,
            last_message,
            unread_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::profile::tests::sample_data;
    use crate::models::NewIdentity;
    use crate::repository::MemoryRepository;
    use chrono::Utc;

    async fn member(repo: &MemoryRepository, username: &str, with_profile: bool) -> Uuid {
        let id = repo
            .create_identity(NewIdentity {
                username: username.into(),
                email: format!("{username}@example.com"),
                first_name: username.into(),
                last_name: String::new(),
                password_hash: "x".into(),
            })
            .await
            .unwrap()
            .id;
        if with_profile {
            repo.create_profile(id, &sample_data()).await.unwrap();
        }
        id
    }

    fn conv(participants: Vec<Uuid>) -> Conversation {
        Conversation {
            id: Uuid::new_v4(),
            participants,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_fold_keeps_first_per_other_participant() {
        let me = Uuid::new_v4();
        let b = Uuid::new_v4();
        let c = Uuid::new_v4();
        let first_b = conv(vec![me, b]);
        let with_c = conv(vec![c, me]);
        let dup_b = conv(vec![b, me]);
        let degenerate = conv(vec![me]);

        let kept = dedup_by_other_participant(
            vec![first_b.clone(), degenerate, with_c.clone(), dup_b],
            me,
        );
        let ids: Vec<Uuid> = kept.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![first_b.id, with_c.id]);
    }

    #[tokio::test]
    async fn test_resolve_is_idempotent() {
        let repo = MemoryRepository::new();
        let a = member(&repo, "ann", true).await;
        let b = member(&repo, "bob", true).await;

        let (first, created) = ConversationService::resolve(&repo, a, b).await.unwrap();
        assert!(created);
        let (second, created) = ConversationService::resolve(&repo, a, b).await.unwrap();
        assert!(!created);
        assert_eq!(first.id, second.id);

        let (from_other_side, created) = ConversationService::resolve(&repo, b, a).await.unwrap();
        assert!(!created);
        assert_eq!(from_other_side.id, first.id);
    }

    #[tokio::test]
    async fn test_resolve_validation_order() {
        let repo = MemoryRepository::new();
        let no_profile = member(&repo, "ann", false).await;
        let b = member(&repo, "bob", true).await;
        let ghost = member(&repo, "cat", false).await;

        assert!(matches!(
            ConversationService::resolve(&repo, no_profile, no_profile).await,
            Err(AppError::SelfReference(_))
        ));
        assert!(matches!(
            ConversationService::resolve(&repo, no_profile, ghost).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            ConversationService::resolve(&repo, no_profile, b).await,
            Err(AppError::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_concurrent_first_contact_creates_one_conversation() {
        let repo = std::sync::Arc::new(MemoryRepository::new());
        let a = member(&repo, "ann", true).await;
        let b = member(&repo, "bob", true).await;

        let mut handles = Vec::new();
        for i in 0..8 {
            let repo = repo.clone();
            let (x, y) = if i % 2 == 0 { (a, b) } else { (b, a) };
            handles.push(tokio::spawn(async move {
                ConversationService::resolve(repo.as_ref(), x, y)
                    .await
                    .unwrap()
            }));
        }

        let mut ids = HashSet::new();
        let mut created = 0;
        for handle in handles {
            let (view, was_created) = handle.await.unwrap();
            ids.insert(view.id);
            created += usize::from(was_created);
        }
        assert_eq!(ids.len(), 1);
        assert_eq!(created, 1);
    }

    #[tokio::test]
    async fn test_list_collapses_legacy_duplicates() {
        let repo = MemoryRepository::new();
        let a = member(&repo, "ann", true).await;
        let b = member(&repo, "bob", true).await;

        let legacy_one = repo.import_conversation(vec![a, b]).await;
        let legacy_two = repo.import_conversation(vec![b, a]).await;

        let listed = ConversationService::list(&repo, a).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, legacy_two.id);
        assert_ne!(listed[0].id, legacy_one.id);

        // resolve picks the earliest created row
        let (resolved, created) = ConversationService::resolve(&repo, a, b).await.unwrap();
        assert!(!created);
        assert_eq!(resolved.id, legacy_one.id);
    }

    #[tokio::test]
    async fn test_view_shape() {
        let repo = MemoryRepository::new();
        let a = member(&repo, "ann", true).await;
        let b = member(&repo, "bob", true).await;

        let (view, _) = ConversationService::resolve(&repo, a, b).await.unwrap();
        assert_eq!(view.participants.len(), 2);
        assert_eq!(view.other_participant.as_ref().map(|p| p.user_id()), Some(b));
        assert!(view.last_message.is_none());
        assert_eq!(view.unread_count, 0);
    }

    #[tokio::test]
    async fn test_deleted_partner_drops_out_of_list() {
        let repo = MemoryRepository::new();
        let a = member(&repo, "ann", true).await;
        let b = member(&repo, "bob", true).await;
        ConversationService::resolve(&repo, a, b).await.unwrap();

        repo.delete_identity(b).await.unwrap();
        assert!(ConversationService::list(&repo, a).await.unwrap().is_empty());
    }
}
