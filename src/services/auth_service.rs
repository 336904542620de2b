use crypto_core::{jwt, password};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::models::NewIdentity;
use crate::repository::MatchRepository;

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 150))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    pub password: String,
    #[serde(default)]
    #[validate(length(max = 150))]
    pub first_name: String,
    #[serde(default)]
    #[validate(length(max = 150))]
    pub last_name: String,
}

/// Both fields are optional so that a missing one yields the login error
/// message instead of a generic body error.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub token: String,
    pub user_id: Uuid,
    pub email: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user_id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

fn issue_token(user_id: Uuid, username: &str, email: &str) -> AppResult<String> {
    jwt::generate_token(user_id, username, email)
        .map_err(|e| AppError::Internal(format!("token generation failed: {e}")))
}

pub struct AuthService;

impl AuthService {
    pub async fn register(
        repo: &dyn MatchRepository,
        req: RegisterRequest,
    ) -> AppResult<RegisterResponse> {
        req.validate()?;
        password::validate_password_strength(&req.password)?;

        if repo.find_identity_by_username(&req.username).await?.is_some() {
            return Err(AppError::BadRequest(
                "A user with that username already exists.".into(),
            ));
        }

        let password_hash = password::hash_password(&req.password)?;
        let identity = repo
            .create_identity(NewIdentity {
                username: req.username,
                email: req.email,
                first_name: req.first_name,
                last_name: req.last_name,
                password_hash,
            })
            .await
            .map_err(|e| match e {
                AppError::Conflict(_) => {
                    AppError::BadRequest("A user with that username already exists.".into())
                }
                other => other,
            })?;

        tracing::info!(user_id = %identity.id, "identity registered");

        Ok(RegisterResponse {
            token: issue_token(identity.id, &identity.username, &identity.email)?,
            user_id: identity.id,
            email: identity.email,
            message: "User registered successfully".into(),
        })
    }

    pub async fn login(repo: &dyn MatchRepository, req: LoginRequest) -> AppResult<LoginResponse> {
        let (username, password_input) = match (req.username, req.password) {
            (Some(u), Some(p)) if !u.is_empty() && !p.is_empty() => (u, p),
            _ => {
                return Err(AppError::BadRequest(
                    "Please provide both username and password".into(),
                ))
            }
        };

        let invalid = || AppError::BadRequest("Invalid credentials".into());

        let identity = repo
            .find_identity_by_username(&username)
            .await?
            .ok_or_else(invalid)?;

        if !password::verify_password(&password_input, &identity.password_hash)? {
            tracing::info!(user_id = %identity.id, "login rejected");
            return Err(invalid());
        }

        Ok(LoginResponse {
            token: issue_token(identity.id, &identity.username, &identity.email)?,
            user_id: identity.id,
            email: identity.email,
            first_name: identity.first_name,
            last_name: identity.last_name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MemoryRepository;

    fn init_jwt() {
        let _ = jwt::initialize_jwt_secret("auth-service-test-secret-0123456789ab", 1);
    }

    fn register_req(username: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.into(),
            email: format!("{username}@example.com"),
            password: password.into(),
            first_name: "Ann".into(),
            last_name: "Lee".into(),
        }
    }

    #[tokio::test]
    async fn test_register_then_login() {
        init_jwt();
        let repo = MemoryRepository::new();
        let registered = AuthService::register(&repo, register_req("ann", "s3cret-pass"))
            .await
            .unwrap();

        let claims = jwt::validate_token(&registered.token).unwrap().claims;
        assert_eq!(claims.user_id().unwrap(), registered.user_id);

        let login = AuthService::login(
            &repo,
            LoginRequest {
                username: Some("ann".into()),
                password: Some("s3cret-pass".into()),
            },
        )
        .await
        .unwrap();
        assert_eq!(login.user_id, registered.user_id);
        assert_eq!(login.first_name, "Ann");
    }

    #[tokio::test]
    async fn test_duplicate_username_is_validation_error() {
        init_jwt();
        let repo = MemoryRepository::new();
        AuthService::register(&repo, register_req("ann", "s3cret-pass"))
            .await
            .unwrap();
        let err = AuthService::register(&repo, register_req("ann", "other-pass"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_weak_password_rejected() {
        init_jwt();
        let repo = MemoryRepository::new();
        for weak in ["short", "12345678"] {
            let err = AuthService::register(&repo, register_req("bob", weak))
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::BadRequest(_)));
        }
    }

    #[tokio::test]
    async fn test_login_failures_are_validation_errors() {
        init_jwt();
        let repo = MemoryRepository::new();
        AuthService::register(&repo, register_req("ann", "s3cret-pass"))
            .await
            .unwrap();

        let err = AuthService::login(
            &repo,
            LoginRequest {
                username: Some("ann".into()),
                password: None,
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "Please provide both username and password");

        let err = AuthService::login(
            &repo,
            LoginRequest {
                username: Some("ann".into()),
                password: Some("wrong-pass".into()),
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "Invalid credentials");
    }
}
