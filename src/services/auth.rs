//! Authentication service: credential checks and personal access tokens

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};
use once_cell::sync::Lazy;
use rand::{distributions::Alphanumeric, Rng};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use validator::Validate;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult, FieldErrors},
    models::{LoginRequest, User, UserProfile},
    repository::Repository,
};

const SECRET_LENGTH: usize = 40;

/// Checked when no account matches, so an unknown email costs as much as a wrong password
static DUMMY_HASH: Lazy<Option<String>> = Lazy::new(|| hash_password(&generate_secret()).ok());

#[derive(Clone)]
pub struct AuthService {
    repository: Repository,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Check credentials and issue a new bearer token.
    ///
    /// Unknown email and wrong password fail the same way. The account status
    /// is only looked at once the password matched.
    pub async fn login(&self, request: LoginRequest) -> AppResult<UserProfile> {
        request
            .validate()
            .map_err(|e| AppError::Validation(FieldErrors::from(e)))?;

        let email = request.email.unwrap_or_default();
        let password = request.password.unwrap_or_default();

        let Some(user) = self.repository.users_get_by_email(&email).await? else {
            if let Some(hash) = DUMMY_HASH.as_deref() {
                verify_password(hash, &password);
            }
            return Err(AppError::InvalidCredentials);
        };

        if !verify_password(&user.password, &password) {
            tracing::info!("Failed login attempt for user {}", user.id);
            return Err(AppError::InvalidCredentials);
        }

        if !user.is_enabled() {
            tracing::info!("Login refused for disabled user {}", user.id);
            return Err(AppError::AccountDisabled);
        }

        let token = self.issue_token(&user).await?;
        tracing::info!("User {} logged in", user.id);

        Ok(UserProfile::new(&user, Some(token)))
    }

    async fn issue_token(&self, user: &User) -> AppResult<String> {
        let secret = generate_secret();
        let expires_at = self
            .config
            .token_ttl_hours
            .map(|hours| Utc::now() + Duration::hours(hours));

        let record = self
            .repository
            .tokens_create(user.id, &self.config.token_name, &hash_secret(&secret), expires_at)
            .await?;

        Ok(format!("{}|{}", record.id, secret))
    }

    /// Resolve a plain `"{id}|{secret}"` bearer token to its owner
    pub async fn resolve_token(&self, plain: &str) -> AppResult<User> {
        let (id, secret) = split_token(plain)
            .ok_or_else(|| AppError::Unauthenticated("malformed bearer token".to_string()))?;

        let record = self
            .repository
            .tokens_get_by_id(id)
            .await?
            .ok_or_else(|| AppError::Unauthenticated(format!("unknown token {}", id)))?;

        if !constant_time_eq(hash_secret(secret).as_bytes(), record.token.trim().as_bytes()) {
            return Err(AppError::Unauthenticated(format!("secret mismatch for token {}", id)));
        }

        let now = Utc::now();
        if record.is_expired(now) {
            return Err(AppError::Unauthenticated(format!("token {} expired", id)));
        }

        self.repository.tokens_touch(record.id, now).await?;

        self.repository
            .users_get_by_id(record.user_id)
            .await?
            .ok_or_else(|| AppError::Unauthenticated(format!("owner of token {} is gone", id)))
    }

    /// Create the account unless one with this email already exists
    pub async fn ensure_user(&self, name: &str, email: &str, password: &str) -> AppResult<User> {
        if let Some(user) = self.repository.users_get_by_email(email).await? {
            tracing::debug!("User {} already exists", email);
            return Ok(user);
        }

        let user = self
            .repository
            .users_create(name, email, &hash_password(password)?)
            .await?;
        tracing::info!("Created user {} ({})", user.id, email);
        Ok(user)
    }
}

/// Hash a password using Argon2
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
    Ok(hash.to_string())
}

/// `false` on a mismatch, and for a stored hash that is not an Argon2 PHC string
pub fn verify_password(hash: &str, password: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::warn!("Unreadable stored password hash: {}", e);
            false
        }
    }
}

/// Random secret half of a new token
pub fn generate_secret() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SECRET_LENGTH)
        .map(char::from)
        .collect()
}

/// SHA-256 hex digest, the form secrets are stored in
pub fn hash_secret(secret: &str) -> String {
    hex::encode(Sha256::digest(secret.as_bytes()))
}

/// Split `"{id}|{secret}"`
pub fn split_token(plain: &str) -> Option<(i64, &str)> {
    let (id, secret) = plain.trim().split_once('|')?;
    let id = id.parse::<i64>().ok()?;
    if secret.is_empty() {
        return None;
    }
    Some((id, secret))
}

pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.ct_eq(b).into()
}
