/// Shared JWT module
///
/// Tokens are signed with HS256 using a single service secret. The same
/// process issues tokens on login/register and validates them on every
/// authenticated request, so no asymmetric key distribution is needed.
///
/// ## Usage
///
/// Call `initialize_jwt_secret()` once during startup before any JWT operations:
///
/// ```ignore
/// use crypto_core::jwt;
///
/// let secret = std::env::var("JWT_SECRET")?;
/// jwt::initialize_jwt_secret(&secret, 24)?;
/// ```
use anyhow::{anyhow, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, Algorithm, DecodingKey, EncodingKey, Header, TokenData, Validation,
};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Minimum secret length in bytes (256 bits)
pub const MIN_SECRET_LENGTH: usize = 32;

const JWT_ALGORITHM: Algorithm = Algorithm::HS256;

/// JWT claims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (identity id as UUID string)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    pub username: String,
    pub email: String,
}

impl Claims {
    pub fn user_id(&self) -> Result<Uuid> {
        Uuid::parse_str(&self.sub).map_err(|e| anyhow!("malformed subject: {e}"))
    }
}

struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_hours: i64,
}

static JWT_KEYS: OnceCell<JwtKeys> = OnceCell::new();

/// Initialize the signing secret and token lifetime.
///
/// Can only succeed once per process. Secrets shorter than
/// [`MIN_SECRET_LENGTH`] bytes are rejected.
pub fn initialize_jwt_secret(secret: &str, ttl_hours: i64) -> Result<()> {
    if secret.len() < MIN_SECRET_LENGTH {
        return Err(anyhow!(
            "JWT secret must be at least {MIN_SECRET_LENGTH} bytes"
        ));
    }
    if ttl_hours <= 0 {
        return Err(anyhow!("JWT lifetime must be positive"));
    }

    JWT_KEYS
        .set(JwtKeys {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl_hours,
        })
        .map_err(|_| anyhow!("JWT secret already initialized"))
}

/// Whether `initialize_jwt_secret` has completed
pub fn is_initialized() -> bool {
    JWT_KEYS.get().is_some()
}

fn keys() -> Result<&'static JwtKeys> {
    JWT_KEYS.get().ok_or_else(|| {
        anyhow!("JWT secret not initialized. Call initialize_jwt_secret() during startup.")
    })
}

/// Issue an access token for an identity
pub fn generate_token(user_id: Uuid, username: &str, email: &str) -> Result<String> {
    let keys = keys()?;
    let now = Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        iat: now.timestamp(),
        exp: (now + Duration::hours(keys.ttl_hours)).timestamp(),
        username: username.to_string(),
        email: email.to_string(),
    };

    encode(&Header::new(JWT_ALGORITHM), &claims, &keys.encoding)
        .map_err(|e| anyhow!("Failed to encode token: {e}"))
}

/// Validate signature and expiry; only HS256 is accepted.
pub fn validate_token(token: &str) -> Result<TokenData<Claims>> {
    let keys = keys()?;
    let mut validation = Validation::new(JWT_ALGORITHM);
    validation.validate_exp = true;
    validation.leeway = 30;

    decode::<Claims>(token, &keys.decoding, &validation)
        .map_err(|e| anyhow!("Token validation failed: {e}"))
}
