use serde::Serialize;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::repository::MatchRepository;

#[derive(Debug, Serialize)]
pub struct InterestOutcome {
    pub detail: String,
    pub already_expressed: bool,
    pub user_id: Uuid,
    pub user_name: String,
}

pub struct InterestService;

impl InterestService {
    /// Record that `sender_id` is interested in `target_user_id`.
    /// A repeat is reported through `already_expressed`, not as an error.
    pub async fn express(
        repo: &dyn MatchRepository,
        sender_id: Uuid,
        target_user_id: Uuid,
    ) -> AppResult<InterestOutcome> {
        if sender_id == target_user_id {
            return Err(AppError::SelfReference(
                "You cannot express interest in your own profile".into(),
            ));
        }

        let target = repo
            .find_profile_by_user(target_user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Target profile not found".into()))?;

        let created = repo
            .insert_interest_if_absent(sender_id, target_user_id)
            .await?
            .is_some();

        tracing::info!(
            sender_id = %sender_id,
            receiver_id = %target_user_id,
            created,
            "interest recorded"
        );

        let detail = if created {
            "Interest expressed successfully"
        } else {
            "You have already expressed interest in this profile"
        };

        Ok(InterestOutcome {
            detail: detail.into(),
            already_expressed: !created,
            user_id: target_user_id,
            user_name: target.user.first_name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::profile::tests::sample_data;
    use crate::models::NewIdentity;
    use crate::repository::MemoryRepository;

    async fn identity(repo: &MemoryRepository, username: &str) -> Uuid {
        repo.create_identity(NewIdentity {
            username: username.into(),
            email: format!("{username}@example.com"),
            first_name: username.to_uppercase(),
            last_name: String::new(),
            password_hash: "x".into(),
        })
        .await
        .unwrap()
        .id
    }

    #[tokio::test]
    async fn test_second_expression_is_flagged_not_duplicated() {
        let repo = MemoryRepository::new();
        let a = identity(&repo, "ann").await;
        let b = identity(&repo, "bob").await;
        repo.create_profile(b, &sample_data()).await.unwrap();

        let first = InterestService::express(&repo, a, b).await.unwrap();
        assert!(!first.already_expressed);
        assert_eq!(first.user_name, "BOB");

        let second = InterestService::express(&repo, a, b).await.unwrap();
        assert!(second.already_expressed);
        assert!(repo.insert_interest_if_absent(a, b).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_self_interest_checked_before_profile_lookup() {
        let repo = MemoryRepository::new();
        let a = identity(&repo, "ann").await;
        let err = InterestService::express(&repo, a, a).await.unwrap_err();
        assert!(matches!(err, AppError::SelfReference(_)));
    }

    #[tokio::test]
    async fn test_target_without_profile_not_found() {
        let repo = MemoryRepository::new();
        let a = identity(&repo, "ann").await;
        let b = identity(&repo, "bob").await;
        let err = InterestService::express(&repo, a, b).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
