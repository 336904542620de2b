use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::models::{MatchFilter, Profile, ProfileData, ProfilePatch};
use crate::repository::MatchRepository;

fn profile_not_found() -> AppError {
    AppError::NotFound("Profile not found".into())
}

pub struct ProfileService;

impl ProfileService {
    /// The caller's own profile as a list (empty when none exists)
    pub async fn list_own(repo: &dyn MatchRepository, user_id: Uuid) -> AppResult<Vec<Profile>> {
        Ok(repo.find_profile_by_user(user_id).await?.into_iter().collect())
    }

    pub async fn create(
        repo: &dyn MatchRepository,
        user_id: Uuid,
        data: ProfileData,
    ) -> AppResult<Profile> {
        let already_exists = || AppError::BadRequest("Profile already exists for this user".into());

        if repo.find_profile_by_user(user_id).await?.is_some() {
            return Err(already_exists());
        }
        data.validate()?;

        let profile = repo
            .create_profile(user_id, &data)
            .await
            .map_err(|e| match e {
                AppError::Conflict(_) => already_exists(),
                other => other,
            })?;

        tracing::info!(user_id = %user_id, profile_id = %profile.id, "profile created");
        Ok(profile)
    }

    pub async fn my_profile(repo: &dyn MatchRepository, user_id: Uuid) -> AppResult<Profile> {
        repo.find_profile_by_user(user_id)
            .await?
            .ok_or_else(profile_not_found)
    }

    /// Merge `patch` over the stored profile and re-validate the result
    pub async fn update(
        repo: &dyn MatchRepository,
        user_id: Uuid,
        patch: ProfilePatch,
    ) -> AppResult<Profile> {
        let current = Self::my_profile(repo, user_id).await?;
        let merged = patch.apply(&current.data);
        merged.validate()?;

        repo.update_profile(user_id, &merged)
            .await?
            .ok_or_else(profile_not_found)
    }

    /// Delete the profile together with the identity that owns it
    pub async fn delete(repo: &dyn MatchRepository, user_id: Uuid) -> AppResult<()> {
        Self::my_profile(repo, user_id).await?;
        if !repo.delete_identity(user_id).await? {
            return Err(profile_not_found());
        }
        tracing::info!(user_id = %user_id, "profile and identity deleted");
        Ok(())
    }

    /// Everyone else's profile. Filters only apply once the caller has a profile.
    pub async fn potential_matches(
        repo: &dyn MatchRepository,
        user_id: Uuid,
        filter: &MatchFilter,
    ) -> AppResult<Vec<Profile>> {
        let has_profile = repo.find_profile_by_user(user_id).await?.is_some();
        let filter = has_profile.then_some(filter);
        repo.search_profiles(user_id, filter).await
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
            first_name: username.into(),
            last_name: String::new(),
            password_hash: "x".into(),
        })
        .await
        .unwrap()
        .id
    }

    #[tokio::test]
    async fn test_second_profile_rejected() {
        let repo = MemoryRepository::new();
        let a = identity(&repo, "ann").await;
        ProfileService::create(&repo, a, sample_data()).await.unwrap();

        let err = ProfileService::create(&repo, a, sample_data())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Profile already exists for this user");
    }

    #[tokio::test]
    async fn test_list_own_is_empty_without_profile() {
        let repo = MemoryRepository::new();
        let a = identity(&repo, "ann").await;
        assert!(ProfileService::list_own(&repo, a).await.unwrap().is_empty());

        ProfileService::create(&repo, a, sample_data()).await.unwrap();
        assert_eq!(ProfileService::list_own(&repo, a).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_revalidates_merged_profile() {
        let repo = MemoryRepository::new();
        let a = identity(&repo, "ann").await;
        ProfileService::create(&repo, a, sample_data()).await.unwrap();

        let bad = ProfilePatch {
            preferred_age_min: Some(50),
            ..Default::default()
        };
        assert!(matches!(
            ProfileService::update(&repo, a, bad).await,
            Err(AppError::BadRequest(_))
        ));

        let good = ProfilePatch {
            occupation: Some("Architect".into()),
            ..Default::default()
        };
        let updated = ProfileService::update(&repo, a, good).await.unwrap();
        assert_eq!(updated.data.occupation, "Architect");
        assert_eq!(updated.data.age, sample_data().age);
    }

    #[tokio::test]
    async fn test_delete_removes_identity() {
        let repo = MemoryRepository::new();
        let a = identity(&repo, "ann").await;
        assert!(matches!(
            ProfileService::delete(&repo, a).await,
            Err(AppError::NotFound(_))
        ));

        ProfileService::create(&repo, a, sample_data()).await.unwrap();
        ProfileService::delete(&repo, a).await.unwrap();
        assert!(repo.find_identity(a).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_filters_ignored_until_caller_has_profile() {
        let repo = MemoryRepository::new();
        let a = identity(&repo, "ann").await;
        let b = identity(&repo, "bob").await;
        let c = identity(&repo, "cat").await;

        ProfileService::create(&repo, b, sample_data()).await.unwrap();
        let mut older = sample_data();
        older.age = 45;
        ProfileService::create(&repo, c, older).await.unwrap();

        let filter = MatchFilter {
            age_min: Some(25),
            age_max: Some(35),
            ..Default::default()
        };

        let unfiltered = ProfileService::potential_matches(&repo, a, &filter)
            .await
            .unwrap();
        assert_eq!(unfiltered.len(), 2);

        ProfileService::create(&repo, a, sample_data()).await.unwrap();
        let filtered = ProfileService::potential_matches(&repo, a, &filter)
            .await
            .unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].user_id(), b);
    }

    #[tokio::test]
    async fn test_text_filters_are_exact_match() {
        let repo = MemoryRepository::new();
        let a = identity(&repo, "ann").await;
        let b = identity(&repo, "bob").await;
        ProfileService::create(&repo, a, sample_data()).await.unwrap();
        ProfileService::create(&repo, b, sample_data()).await.unwrap();

        let partial = MatchFilter {
            location: Some("Pun".into()),
            ..Default::default()
        };
        assert!(ProfileService::potential_matches(&repo, a, &partial)
            .await
            .unwrap()
            .is_empty());

        let exact = MatchFilter {
            marital_status: Some("NEVER_MARRIED".into()),
            location: Some("Pune".into()),
            ..Default::default()
        };
        assert_eq!(
            ProfileService::potential_matches(&repo, a, &exact)
                .await
                .unwrap()
                .len(),
            1
        );
    }
}
